use tracing::warn;

/// Outcome of an exit report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    /// Someone left but others remain.
    StillOccupied(u32),
    /// The last occupant left.
    BecameEmpty,
    /// The count was already zero; the exit was clamped.
    Underflow,
}

/// Counts entities inside the sensed region.
///
/// Entities are paired only by enter/exit calls; the adapter is expected to report a matching
/// exit for every enter. The count never goes below zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccupancyTracker {
    count: u32,
}

impl OccupancyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Records an arrival and returns the new count.
    pub fn enter(&mut self) -> u32 {
        self.count = self.count.saturating_add(1);
        self.count
    }

    /// Records a departure.
    pub fn exit(&mut self) -> ExitOutcome {
        match self.count {
            0 => {
                warn!("Occupancy exit reported with no occupants; an enter event was probably missed upstream");
                ExitOutcome::Underflow
            }
            1 => {
                self.count = 0;
                ExitOutcome::BecameEmpty
            }
            n => {
                self.count = n - 1;
                ExitOutcome::StillOccupied(self.count)
            }
        }
    }

    /// Clears the count and returns the previous value.
    pub fn reset(&mut self) -> u32 {
        std::mem::take(&mut self.count)
    }

    /// Overwrites the count with a freshly re-queried value and returns the previous one.
    pub fn set(&mut self, count: u32) -> u32 {
        std::mem::replace(&mut self.count, count)
    }
}
