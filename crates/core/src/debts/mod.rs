//! Debts module - initial debts and one-off assistance dues.

mod debts_model;
mod debts_service;
mod debts_traits;


pub use debts_model::{AssistanceDue, InitialDebt, MemberDebts, NewAssistanceDue, NewInitialDebt};
pub use debts_service::DebtService;
pub use debts_traits::{DebtRepositoryTrait, DebtServiceTrait};
