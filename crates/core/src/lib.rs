//! Dues Core - Domain entities, services, and traits.
//!
//! This crate contains the business logic of the dues and credit reconciliation
//! engine. It is database-agnostic and defines traits that are implemented
//! by the `storage-sqlite` crate.

pub mod access;
pub mod audit;
pub mod credits;
pub mod debts;
pub mod due_types;
pub mod errors;
pub mod events;
pub mod members;
pub mod obligations;
pub mod payments;
pub mod period_dues;
pub mod settings;
pub mod utils;

pub use access::{Caller, Role};
pub use utils::period::Period;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
