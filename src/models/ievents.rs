//! # Sliding Door Event Definitions

//! This module defines the `DoorEvent` record and the `DoorEventKind` enum. Together they form the observability hook of
//! the controller: every state change, reversal, rejected request, pending-slot movement, occupancy correction and cue
//! start is recorded here so a host can log, count or forward it without the controller knowing who is listening.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use derive_more::Display;
use crate::audio::CuePlayback;
use crate::models::istates::{Direction, DoorState, OperationMode};
use crate::models::ipending::PendingOperation;
use crate::models::local_now;

/// A request made against the state machine, kept for rejection reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum DoorRequest {
    #[display("open(triggered_by_sensor: {triggered_by_sensor})")]
    Open { triggered_by_sensor: bool },
    #[display("close(force: {force})")]
    Close { force: bool },
}

/// Why a request was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum RejectReason {
    /// Locking is enabled and the door is locked.
    #[display("door is locked")]
    Locked,
    /// A manual open arrived while the door only honours the proximity sensor.
    #[display("manual open ignored in proximity sensor mode")]
    SensorModeOnly,
    /// A non-forced close arrived while occupants are still inside the region.
    #[display("{_0} occupant(s) inside")]
    Occupied(u32),
}

/// Represents the different things a sliding door reports about itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DoorEventKind {
    /// The door moved to a new state
    StateChanged { old: DoorState, new: DoorState },
    /// An in-flight transition was reversed; `progress` is the re-derived progress of the new direction
    TransitionReversed { to: Direction, progress: f32 },
    /// A request was refused by a guard
    RequestRejected { request: DoorRequest, reason: RejectReason },
    /// An operation was stored in the pending slot, possibly overwriting an opposite one
    PendingQueued { operation: PendingOperation, replaced: Option<PendingOperation> },
    /// A pending operation was replayed after a transition completed
    PendingDrained { operation: PendingOperation },
    /// A pending operation was dropped without being replayed
    PendingDiscarded { operation: PendingOperation },
    /// The occupancy count changed
    OccupancyChanged { old: u32, new: u32 },
    /// An exit arrived while the count was already zero
    OccupancyUnderflow,
    /// A fresh re-query disagreed with the accumulated count and replaced it
    OccupancyReconciled { stale: u32, fresh: u32 },
    /// The lock flag changed; `effective` also accounts for the locking feature being enabled
    LockChanged { locked: bool, effective: bool },
    /// The operation mode changed
    ModeChanged { old: OperationMode, new: OperationMode },
    /// A cue started playing at the given offset and rate
    CueStarted(CuePlayback),
    /// A grace-delayed close was scheduled for the given controller clock time
    DelayedCloseScheduled { due_at: f64 },
    /// A grace-delayed close fired but the region was occupied again
    DelayedCloseSkipped { occupancy: u32 },
    /// The door was snapped closed without animating
    Cleared,
}

/// A single observability record emitted by a sliding door controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoorEvent {
    /// The name of the door that emitted the event
    pub door_name: String,
    /// The wall-clock time the event was recorded
    pub timestamp: NaiveDateTime,
    /// What happened
    pub kind: DoorEventKind,
}

impl DoorEvent {
    pub fn new(door_name: &str, kind: DoorEventKind) -> Self {
        Self {
            door_name: door_name.to_string(),
            timestamp: local_now(),
            kind,
        }
    }

    /// Whether the event signals something a host should look at.
    pub fn is_anomaly(&self) -> bool {
        matches!(
            self.kind,
            DoorEventKind::OccupancyUnderflow | DoorEventKind::OccupancyReconciled { .. }
        )
    }
}
