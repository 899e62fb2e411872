//! SQLite storage implementation for member credit.
//!
//! `ledger` holds the in-transaction helpers that the obligation, debt and
//! payment repositories call so that credit moves in the same transaction as
//! the amounts it settles.

pub(crate) mod ledger;
mod model;
mod repository;

pub use model::{CreditMovementDB, MemberCreditDB};
pub use repository::CreditRepository;
