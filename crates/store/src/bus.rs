//! Recording event bus
//!
//! Test-grade implementation of the [`EventBus`] collaborator: records
//! every dispatched (channel, payload) pair so tests can assert on the
//! post-success notifications an operation produced.

use entitydb_core::{EventBus, Value};
use parking_lot::RwLock;
use std::sync::Arc;

/// Event bus that remembers every dispatch
#[derive(Clone, Default)]
pub struct RecordingEventBus {
    dispatched: Arc<RwLock<Vec<(String, Value)>>>,
}

impl RecordingEventBus {
    /// An empty bus
    pub fn new() -> Self {
        RecordingEventBus::default()
    }

    /// Every (channel, payload) pair dispatched so far, in order
    pub fn dispatched(&self) -> Vec<(String, Value)> {
        self.dispatched.read().clone()
    }

    /// Channels dispatched so far, in order
    pub fn channels(&self) -> Vec<String> {
        self.dispatched
            .read()
            .iter()
            .map(|(channel, _)| channel.clone())
            .collect()
    }

    /// Number of dispatches on the named channel
    pub fn count(&self, channel: &str) -> usize {
        self.dispatched
            .read()
            .iter()
            .filter(|(c, _)| c == channel)
            .count()
    }

    /// Forget everything recorded so far
    pub fn clear(&self) {
        self.dispatched.write().clear();
    }
}

impl EventBus for RecordingEventBus {
    fn dispatch(&self, channels: &[String], payload: &Value) {
        let mut dispatched = self.dispatched.write();
        for channel in channels {
            dispatched.push((channel.clone(), payload.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_dispatch_order() {
        let bus = RecordingEventBus::new();
        bus.dispatch(
            &["entities[page].saved".to_string(), "entities.saved".to_string()],
            &Value::Null,
        );
        assert_eq!(
            bus.channels(),
            vec![
                "entities[page].saved".to_string(),
                "entities.saved".to_string()
            ]
        );
        assert_eq!(bus.count("entities.saved"), 1);
        assert_eq!(bus.count("entities.loaded"), 0);
    }

    #[test]
    fn clear_resets_history() {
        let bus = RecordingEventBus::new();
        bus.dispatch(&["entities.saved".to_string()], &Value::Null);
        bus.clear();
        assert!(bus.dispatched().is_empty());
    }
}
