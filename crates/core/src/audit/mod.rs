//! Audit module - fire-and-forget activity trail for ledger mutations.

mod audit_model;
mod audit_traits;

pub use audit_model::{AuditEntry, NewAuditEntry};
pub use audit_traits::{record_audit, AuditSinkTrait, LogAuditSink, AUDIT_TIMEOUT};
