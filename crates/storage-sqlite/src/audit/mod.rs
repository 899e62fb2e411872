//! Audit trail persisted next to the ledger.

mod model;
mod repository;

pub use model::AuditEntryDB;
pub use repository::AuditRepository;
