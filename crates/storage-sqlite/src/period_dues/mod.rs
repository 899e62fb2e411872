//! SQLite storage implementation for per-period due instances.

mod model;
mod repository;

pub use model::PeriodDueDB;
pub use repository::PeriodDueRepository;
