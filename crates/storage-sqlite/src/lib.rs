//! SQLite storage implementation for the dues engine.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `dues-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - Repository implementations for all domain entities
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! Reads go through the r2d2 pool. Every write is a job on the single writer
//! actor and runs in one `IMMEDIATE` transaction, so amounts and the credit
//! they consume always change together.
//!
//! ```text
//!       core (domain, traits, services)
//!                  │
//!                  ▼
//!          storage-sqlite (this crate)
//!                  │
//!                  ▼
//!              SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;
pub mod utils;

// Repository implementations
pub mod audit;
pub mod credits;
pub mod debts;
pub mod due_types;
pub mod members;
pub mod obligations;
pub mod payments;
pub mod period_dues;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle, DEFAULT_WRITE_TIMEOUT,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export repositories
pub use audit::AuditRepository;
pub use credits::CreditRepository;
pub use debts::DebtRepository;
pub use due_types::DueTypeRepository;
pub use members::MemberRepository;
pub use obligations::ObligationRepository;
pub use payments::PaymentRepository;
pub use period_dues::PeriodDueRepository;

// Re-export from dues-core for convenience
pub use dues_core::errors::{DatabaseError, Error, Result};
