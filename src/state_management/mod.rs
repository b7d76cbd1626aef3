pub mod occupancy_tracker;
pub mod lock_gate;
pub mod pending_slot;
pub mod deferred_calls;

pub use occupancy_tracker::{ExitOutcome, OccupancyTracker};
pub use lock_gate::LockGate;
pub use pending_slot::PendingSlot;
pub use deferred_calls::{DeferredCall, DeferredCalls};
