//! Sync lifecycle events and the listener bus.

mod bus;
mod sync_event;

pub use bus::{EventBus, Subscription};
pub use sync_event::SyncEvent;
