//! SQLite storage implementation for member obligations.

mod model;
pub(crate) mod repository;

pub use model::MemberObligationDB;
pub use repository::ObligationRepository;
