pub mod event_dispatcher;
pub mod event_handler;

pub use event_dispatcher::EventDispatcher;
pub use event_handler::{EventHandler, EventSummary};
