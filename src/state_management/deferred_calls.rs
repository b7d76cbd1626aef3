//! Deferred calls re-delivered to the tick context after a delay.
//!
//! There is no cancel token: a deferred call decides at fire time whether it still applies.

/// A call that can be scheduled for later delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredCall {
    /// Close the door if the region is still empty when the grace period ends.
    DelayedClose,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ScheduledCall {
    due_at: f64,
    call: DeferredCall,
}

#[derive(Debug, Clone, Default)]
pub struct DeferredCalls {
    scheduled: Vec<ScheduledCall>,
}

impl DeferredCalls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `call` for `now + delay` and returns the due time.
    pub fn schedule(&mut self, now: f64, delay: f64, call: DeferredCall) -> f64 {
        let due_at = now + delay.max(0.0);
        self.scheduled.push(ScheduledCall { due_at, call });
        due_at
    }

    /// Removes and returns every call due at or before `now`, earliest first.
    pub fn take_due(&mut self, now: f64) -> Vec<DeferredCall> {
        let mut due: Vec<ScheduledCall> = Vec::new();
        self.scheduled.retain(|entry| {
            if entry.due_at <= now {
                due.push(*entry);
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| a.due_at.total_cmp(&b.due_at));
        due.into_iter().map(|entry| entry.call).collect()
    }

    pub fn clear(&mut self) {
        self.scheduled.clear();
    }

    pub fn len(&self) -> usize {
        self.scheduled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scheduled.is_empty()
    }
}
