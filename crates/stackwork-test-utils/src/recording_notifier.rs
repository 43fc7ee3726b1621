//! Event notifier that keeps every event for assertions.

use stackwork_ops::{EventNotifier, MarketEvent};
use std::sync::{Arc, Mutex};

/// Records events in order. Clones share the log.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    events: Arc<Mutex<Vec<MarketEvent>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<MarketEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Event names in emission order.
    pub fn names(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().iter().map(|e| e.name()).collect()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl EventNotifier for RecordingNotifier {
    fn notify(&self, event: MarketEvent) {
        self.events.lock().unwrap().push(event);
    }
}
