use crate::models::{PendingKind, PendingOffer, PendingOperation};

/// Single-slot queue for one deferred transition.
///
/// A second offer of the same kind is a no-op; an offer of the opposite kind replaces the
/// waiting one (last writer wins).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingSlot {
    slot: Option<PendingOperation>,
}

impl PendingSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn peek(&self) -> Option<PendingOperation> {
        self.slot
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }

    pub fn offer(&mut self, operation: PendingOperation) -> PendingOffer {
        match self.slot {
            Some(existing) if existing.kind == operation.kind => PendingOffer::AlreadyPending,
            Some(existing) => {
                self.slot = Some(operation);
                PendingOffer::Replaced(existing)
            }
            None => {
                self.slot = Some(operation);
                PendingOffer::Queued
            }
        }
    }

    /// Removes and returns the waiting operation if it is of `kind`.
    pub fn take_kind(&mut self, kind: PendingKind) -> Option<PendingOperation> {
        match self.slot {
            Some(op) if op.kind == kind => self.slot.take(),
            _ => None,
        }
    }

    /// Removes and returns the waiting operation if it is an open raised by the proximity sensor.
    pub fn take_sensor_open(&mut self) -> Option<PendingOperation> {
        match self.slot {
            Some(op) if op.kind == PendingKind::Open && op.triggered_by_sensor => self.slot.take(),
            _ => None,
        }
    }

    pub fn take(&mut self) -> Option<PendingOperation> {
        self.slot.take()
    }
}
