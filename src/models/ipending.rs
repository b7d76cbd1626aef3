//! # Pending Operations

//! A pending operation is a transition request that could not be applied when it arrived
//! (an animation was in flight in the other direction or the region was still occupied)
//! and is replayed once the door reaches a terminal state.

use serde::{Deserialize, Serialize};
use derive_more::Display;
use crate::models::istates::Direction;

/// The kind of transition that was deferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum PendingKind {
    Open,
    Close,
}

impl PendingKind {
    /// The direction a drained operation of this kind starts.
    pub fn direction(self) -> Direction {
        match self {
            PendingKind::Open => Direction::Opening,
            PendingKind::Close => Direction::Closing,
        }
    }
}

impl From<Direction> for PendingKind {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Opening => PendingKind::Open,
            Direction::Closing => PendingKind::Close,
        }
    }
}

/// A deferred open or close request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingOperation {
    pub kind: PendingKind,
    /// Restored when a deferred open is replayed, so the sensor-mode guard sees the original origin.
    pub triggered_by_sensor: bool,
}

impl PendingOperation {
    pub fn open(triggered_by_sensor: bool) -> Self {
        Self { kind: PendingKind::Open, triggered_by_sensor }
    }

    pub fn close() -> Self {
        Self { kind: PendingKind::Close, triggered_by_sensor: false }
    }
}

/// What happened when an operation was offered to the pending slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingOffer {
    /// The slot was empty and now holds the operation.
    Queued,
    /// An operation of the same kind was already waiting; nothing changed.
    AlreadyPending,
    /// An operation of the opposite kind was overwritten.
    Replaced(PendingOperation),
}
