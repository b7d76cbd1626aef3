use tokio::sync::mpsc;
use crate::errors::{DoorError, DoorResult};
use crate::models::DoorEvent;
use tracing::{debug, error};

/// Forwards door events to whoever holds the receiving end of the channel.
///
/// Sending never waits, so the dispatcher can be called straight from the tick loop.
pub struct EventDispatcher {
    /// The sender end of a channel for dispatching events.
    event_sender: mpsc::Sender<DoorEvent>,
}

impl EventDispatcher {
    /// Creates a new `EventDispatcher`.
    ///
    /// # Arguments
    ///
    /// * `event_sender` - The sender end of a channel for dispatching events.
    pub fn new(event_sender: mpsc::Sender<DoorEvent>) -> Self {
        Self { event_sender }
    }

    /// Creates a dispatcher together with the receiver for its events.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<DoorEvent>) {
        let (event_sender, event_receiver) = mpsc::channel(capacity);
        (Self::new(event_sender), event_receiver)
    }

    /// Dispatches an event.
    ///
    /// # Returns
    ///
    /// A `DoorResult` that is an error when the channel is full or closed.
    pub fn dispatch_event(&self, event: DoorEvent) -> DoorResult<()> {
        debug!("Dispatching event: {:?}", event.kind);
        self.event_sender.try_send(event)
            .map_err(|e| {
                error!("Failed to dispatch event: {}", e);
                DoorError::from(e)
            })
    }

    /// Dispatches multiple events, stopping at the first failure.
    pub fn dispatch_events(&self, events: Vec<DoorEvent>) -> DoorResult<()> {
        for event in events {
            self.dispatch_event(event)?;
        }
        Ok(())
    }

    /// Checks if the event channel is still open and able to send events.
    pub fn is_channel_open(&self) -> bool {
        !self.event_sender.is_closed()
    }
}
