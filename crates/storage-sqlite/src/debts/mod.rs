//! SQLite storage implementation for initial debts and assistance dues.

mod model;
pub(crate) mod repository;

pub use model::{AssistanceDueDB, InitialDebtDB};
pub use repository::DebtRepository;
