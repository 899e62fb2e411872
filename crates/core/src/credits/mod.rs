//! Credits module - member prepaid balances and their ledger.

mod credits_model;
mod credits_service;
mod credits_traits;


pub use credits_model::{
    adjusted_balance, apply_credit_to_settlement, consume_credit, CreditAdjustment,
    CreditApplication, CreditMovement, CreditMovementKind, CreditSummary, MemberCredit,
    NewCreditMovement,
};
pub use credits_service::CreditService;
pub use credits_traits::{CreditRepositoryTrait, CreditServiceTrait};
