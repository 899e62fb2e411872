use dues_core::events::{DomainEvent, DomainEventSink};
use serde_json::Value;
use tokio::sync::broadcast;

/// Canonical event names pushed to connected clients.
pub const DUE_TYPES_CHANGED: &str = "catalog:due-types-changed";
pub const PERIOD_CATALOG_CHANGED: &str = "catalog:period-changed";
pub const OBLIGATIONS_CHANGED: &str = "ledger:obligations-changed";
pub const PAYMENT_RECORDED: &str = "ledger:payment-recorded";
pub const CREDIT_CHANGED: &str = "ledger:credit-changed";

/// Serializable envelope that carries event names and optional payloads.
#[derive(Clone, Debug)]
pub struct ServerEvent {
    pub name: &'static str,
    pub payload: Option<Value>,
}

impl ServerEvent {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            payload: None,
        }
    }

    pub fn with_payload(name: &'static str, payload: Value) -> Self {
        Self {
            name,
            payload: Some(payload),
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

fn event_name(event: &DomainEvent) -> &'static str {
    match event {
        DomainEvent::DueTypesChanged { .. } => DUE_TYPES_CHANGED,
        DomainEvent::PeriodCatalogChanged { .. } => PERIOD_CATALOG_CHANGED,
        DomainEvent::ObligationsChanged { .. } => OBLIGATIONS_CHANGED,
        DomainEvent::PaymentRecorded { .. } => PAYMENT_RECORDED,
        DomainEvent::CreditChanged { .. } => CREDIT_CHANGED,
    }
}

/// Forwards domain events to the bus so clients can invalidate cached views.
pub struct BusDomainEventSink {
    bus: EventBus,
}

impl BusDomainEventSink {
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }
}

impl DomainEventSink for BusDomainEventSink {
    fn emit(&self, event: DomainEvent) {
        let name = event_name(&event);
        match serde_json::to_value(&event) {
            Ok(payload) => self.bus.publish(ServerEvent::with_payload(name, payload)),
            Err(err) => {
                tracing::warn!("Failed to serialize domain event {}: {}", name, err);
                self.bus.publish(ServerEvent::new(name));
            }
        }
    }
}
