//! SQLite mirror of the member directory.

mod model;
mod repository;

pub use model::MemberDB;
pub use repository::MemberRepository;
