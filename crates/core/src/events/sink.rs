use super::DomainEvent;

/// Receives the change notifications of committed ledger writes.
///
/// Services call `emit` only after the repository call and before the audit
/// record. An implementation must not block and must not fail the write:
/// the database is the source of truth and a lost notification only delays
/// a view refresh.
pub trait DomainEventSink: Send + Sync {
    fn emit(&self, event: DomainEvent);
}

#[cfg(test)]
pub use recording::RecordingEventSink;
