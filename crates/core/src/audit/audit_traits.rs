use std::time::Duration;

use async_trait::async_trait;
use log::{info, warn};

use super::audit_model::NewAuditEntry;
use crate::errors::Result;

/// Upper bound for a single audit write.
pub const AUDIT_TIMEOUT: Duration = Duration::from_secs(2);

/// Destination of the audit trail.
#[async_trait]
pub trait AuditSinkTrait: Send + Sync {
    async fn record(&self, entry: NewAuditEntry) -> Result<()>;
}

/// Audit sink that only writes to the application log.
#[derive(Clone, Default)]
pub struct LogAuditSink;

#[async_trait]
impl AuditSinkTrait for LogAuditSink {
    async fn record(&self, entry: NewAuditEntry) -> Result<()> {
        info!(
            "audit: {} {} {}/{}{}",
            entry.actor_id,
            entry.action,
            entry.entity,
            entry.entity_id,
            entry
                .details
                .as_deref()
                .map(|d| format!(" ({})", d))
                .unwrap_or_default()
        );
        Ok(())
    }
}

/// Records an audit entry without ever failing the caller.
///
/// Errors and timeouts are logged and swallowed.
pub async fn record_audit(sink: &dyn AuditSinkTrait, entry: NewAuditEntry) {
    let action = entry.action.clone();
    match tokio::time::timeout(AUDIT_TIMEOUT, sink.record(entry)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("Failed to record audit entry '{}': {}", action, e),
        Err(_) => warn!(
            "Recording audit entry '{}' timed out after {:?}",
            action, AUDIT_TIMEOUT
        ),
    }
}
