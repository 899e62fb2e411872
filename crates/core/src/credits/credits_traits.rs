use async_trait::async_trait;
use rust_decimal::Decimal;

use super::credits_model::{CreditAdjustment, CreditApplication, CreditMovement, CreditSummary, MemberCredit};
use crate::access::Caller;
use crate::errors::Result;

/// Trait defining the contract for credit persistence.
#[async_trait]
pub trait CreditRepositoryTrait: Send + Sync {
    /// Current balance; zero for members without a credit row.
    fn get_balance(&self, member_id: &str) -> Result<MemberCredit>;

    /// Ledger history, newest first.
    fn list_movements(&self, member_id: &str) -> Result<Vec<CreditMovement>>;

    /// Adds a signed manual adjustment. Fails with `Error::Precondition`
    /// when the balance would become negative.
    async fn adjust_balance(
        &self,
        member_id: &str,
        adjustment: CreditAdjustment,
    ) -> Result<MemberCredit>;

    /// Atomically deducts `min(balance, outstanding)` and records the
    /// consumption. The caller writes the consumed amount back to the
    /// obligation it settles.
    async fn apply_credit(&self, member_id: &str, outstanding: Decimal) -> Result<CreditApplication>;
}

/// Trait defining the contract for credit operations.
#[async_trait]
pub trait CreditServiceTrait: Send + Sync {
    fn get_credit(&self, caller: &Caller, member_id: &str) -> Result<CreditSummary>;

    async fn adjust_credit(
        &self,
        caller: &Caller,
        member_id: &str,
        adjustment: CreditAdjustment,
    ) -> Result<MemberCredit>;

    async fn apply_credit(
        &self,
        caller: &Caller,
        member_id: &str,
        outstanding: Decimal,
    ) -> Result<CreditApplication>;
}
