//! Connectivity state shared across the offline data layer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::info;

use crate::events::{EventBus, SyncEvent};

/// Process-wide online/offline flag.
///
/// The platform layer (browser events, a heartbeat probe, tests) reports
/// transitions via [`ConnectivityMonitor::set_online`]; everything else only
/// reads the flag. Transitions are broadcast as [`SyncEvent::Online`] /
/// [`SyncEvent::Offline`] - repeated reports of the same state are ignored.
#[derive(Clone)]
pub struct ConnectivityMonitor {
    online: Arc<AtomicBool>,
    events: EventBus,
}

impl ConnectivityMonitor {
    /// Create a monitor starting in the given state.
    pub fn new(events: EventBus, initially_online: bool) -> Self {
        Self {
            online: Arc::new(AtomicBool::new(initially_online)),
            events,
        }
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Report the current connectivity state.
    ///
    /// Emits an event only on an actual transition.
    pub fn set_online(&self, online: bool) {
        let previous = self.online.swap(online, Ordering::SeqCst);
        if previous == online {
            return;
        }

        info!(
            "Connectivity changed: {}",
            if online { "online" } else { "offline" }
        );
        self.events.emit(if online {
            &SyncEvent::Online
        } else {
            &SyncEvent::Offline
        });
    }
}
