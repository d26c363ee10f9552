//! Console event sink trait and implementations.

use std::sync::{Arc, Mutex};

use super::{ConsoleEvent, NotificationLevel};

/// Receives console events.
///
/// `emit()` must be fast and non-blocking. Failure to deliver an event never
/// affects the command that produced it.
pub trait ConsoleEventSink: Send + Sync {
    /// Emit a single console event.
    fn emit(&self, event: ConsoleEvent);

    /// Emit multiple console events in order.
    fn emit_batch(&self, events: Vec<ConsoleEvent>) {
        for event in events {
            self.emit(event);
        }
    }
}

/// Discards every event.
#[derive(Clone, Default)]
pub struct NoOpConsoleEventSink;

impl ConsoleEventSink for NoOpConsoleEventSink {
    fn emit(&self, _event: ConsoleEvent) {}
}

/// Mock sink for testing - collects emitted events.
#[derive(Clone, Default)]
pub struct MockConsoleEventSink {
    events: Arc<Mutex<Vec<ConsoleEvent>>>,
}

impl MockConsoleEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected events.
    pub fn events(&self) -> Vec<ConsoleEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Messages of collected notifications at `level`, in order.
    pub fn messages(&self, level: NotificationLevel) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|event| match event {
                ConsoleEvent::Notification { level: l, message } if *l == level => {
                    Some(message.clone())
                }
                _ => None,
            })
            .collect()
    }

    /// Clears collected events.
    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    /// Returns the number of collected events.
    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    /// Returns true if no events have been collected.
    pub fn is_empty(&self) -> bool {
        self.events.lock().unwrap().is_empty()
    }
}

impl ConsoleEventSink for MockConsoleEventSink {
    fn emit(&self, event: ConsoleEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_sink_does_not_panic() {
        let sink = NoOpConsoleEventSink;
        sink.emit(ConsoleEvent::info("hello"));
        sink.emit_batch(vec![ConsoleEvent::error("a"), ConsoleEvent::error("b")]);
    }

    #[test]
    fn test_mock_sink_collects_events() {
        let sink = MockConsoleEventSink::new();
        assert!(sink.is_empty());

        sink.emit(ConsoleEvent::success("Child added successfully!"));
        sink.emit_batch(vec![
            ConsoleEvent::error("Error fetching rooms: boom"),
            ConsoleEvent::success("Room updated successfully!"),
        ]);
        assert_eq!(sink.len(), 3);
        assert_eq!(
            sink.messages(NotificationLevel::Success),
            vec!["Child added successfully!", "Room updated successfully!"]
        );

        sink.clear();
        assert!(sink.is_empty());
    }
}
