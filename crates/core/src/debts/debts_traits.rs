use async_trait::async_trait;

use super::debts_model::{AssistanceDue, InitialDebt, MemberDebts, NewAssistanceDue, NewInitialDebt};
use crate::access::Caller;
use crate::errors::Result;

/// Trait defining the contract for one-off debt persistence.
#[async_trait]
pub trait DebtRepositoryTrait: Send + Sync {
    fn get_initial_debt(&self, debt_id: &str) -> Result<InitialDebt>;

    fn get_assistance_due(&self, assistance_id: &str) -> Result<AssistanceDue>;

    /// Oldest first. `open_only` keeps non-cancelled rows with something left to pay.
    fn list_initial_debts(&self, member_id: &str, open_only: bool) -> Result<Vec<InitialDebt>>;

    /// Oldest first. `open_only` keeps non-cancelled rows with something left to pay.
    fn list_assistance_dues(&self, member_id: &str, open_only: bool)
        -> Result<Vec<AssistanceDue>>;

    /// Inserts the debt and consumes available member credit toward it.
    async fn create_initial_debt(
        &self,
        new_debt: NewInitialDebt,
        created_by: &str,
    ) -> Result<InitialDebt>;

    /// Inserts the assistance due and consumes available member credit toward it.
    async fn create_assistance_due(
        &self,
        new_assistance: NewAssistanceDue,
        created_by: &str,
    ) -> Result<AssistanceDue>;
}

/// Trait defining the contract for one-off debt operations.
#[async_trait]
pub trait DebtServiceTrait: Send + Sync {
    fn list_member_debts(&self, caller: &Caller, member_id: &str) -> Result<MemberDebts>;

    async fn create_initial_debt(
        &self,
        caller: &Caller,
        new_debt: NewInitialDebt,
    ) -> Result<InitialDebt>;

    async fn create_assistance_due(
        &self,
        caller: &Caller,
        new_assistance: NewAssistanceDue,
    ) -> Result<AssistanceDue>;
}
