use daycare_core::events::{ConsoleEvent, ConsoleEventSink};
use serde_json::Value;
use tokio::sync::broadcast;

/// Envelope carried to SSE clients: event name plus optional JSON payload.
#[derive(Clone, Debug)]
pub struct ServerEvent {
    pub name: &'static str,
    pub payload: Option<Value>,
}

impl ServerEvent {
    pub fn with_payload(name: &'static str, payload: Value) -> Self {
        Self {
            name,
            payload: Some(payload),
        }
    }
}

impl From<&ConsoleEvent> for ServerEvent {
    fn from(event: &ConsoleEvent) -> Self {
        match serde_json::to_value(event) {
            Ok(payload) => Self::with_payload(event.kind(), payload),
            Err(_) => Self {
                name: event.kind(),
                payload: None,
            },
        }
    }
}

/// Lightweight broadcast bus that fans out events to any connected clients.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ServerEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: ServerEvent) {
        // Lagging listeners are ignored to avoid blocking producers.
        let _ = self.sender.send(event);
    }
}

/// Forwards console events onto the bus.
#[derive(Clone)]
pub struct BusEventSink {
    bus: EventBus,
}

impl BusEventSink {
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }
}

impl ConsoleEventSink for BusEventSink {
    fn emit(&self, event: ConsoleEvent) {
        tracing::debug!("console event: {}", event.kind());
        self.bus.publish(ServerEvent::from(&event));
    }
}
