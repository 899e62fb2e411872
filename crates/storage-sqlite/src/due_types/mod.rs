//! SQLite storage implementation for the due-type catalog.

mod model;
mod repository;

pub use model::DueTypeDB;
pub use repository::DueTypeRepository;
