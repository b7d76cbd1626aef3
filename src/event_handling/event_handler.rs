use tokio::sync::mpsc;
use tracing::{info, warn};
use crate::models::{DoorEvent, DoorEventKind};

/// Counts of what a door reported over a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventSummary {
    pub events: usize,
    pub state_changes: usize,
    pub reversals: usize,
    pub rejections: usize,
    pub pending_drained: usize,
    pub reconciliations: usize,
    pub underflows: usize,
}

impl EventSummary {
    /// Folds one event into the counts.
    pub fn record(&mut self, event: &DoorEvent) {
        self.events += 1;
        match event.kind {
            DoorEventKind::StateChanged { .. } => self.state_changes += 1,
            DoorEventKind::TransitionReversed { .. } => self.reversals += 1,
            DoorEventKind::RequestRejected { .. } => self.rejections += 1,
            DoorEventKind::PendingDrained { .. } => self.pending_drained += 1,
            DoorEventKind::OccupancyReconciled { .. } => self.reconciliations += 1,
            DoorEventKind::OccupancyUnderflow => self.underflows += 1,
            _ => {}
        }
    }
}

/// Consumes door events from a channel, logs them and keeps a summary.
pub struct EventHandler {
    event_queue: mpsc::Receiver<DoorEvent>,
    summary: EventSummary,
}

impl EventHandler {
    pub fn new(event_queue: mpsc::Receiver<DoorEvent>) -> Self {
        Self { event_queue, summary: EventSummary::default() }
    }

    /// Runs until every sender is dropped and returns the summary.
    pub async fn run(mut self) -> EventSummary {
        info!("Door event handler started");
        while let Some(event) = self.event_queue.recv().await {
            self.handle_event(&event);
        }
        info!("Door event handler finished after {} events", self.summary.events);
        self.summary
    }

    fn handle_event(&mut self, event: &DoorEvent) {
        if event.is_anomaly() {
            warn!("[{}] {} {:?}", event.door_name, event.timestamp, event.kind);
        } else {
            info!("[{}] {} {:?}", event.door_name, event.timestamp, event.kind);
        }
        self.summary.record(event);
    }
}
