use async_trait::async_trait;

use super::period_dues_model::{NewPeriodDue, PeriodDue, PeriodDueDetails};
use crate::access::Caller;
use crate::errors::Result;
use crate::utils::period::Period;

/// Trait defining the contract for period due persistence.
#[async_trait]
pub trait PeriodDueRepositoryTrait: Send + Sync {
    fn get_by_id(&self, period_due_id: &str) -> Result<PeriodDue>;

    /// Lists every entry of a period (cancelled included), ordered by the due
    /// type's display order, then due type name.
    fn list_for_period(&self, period: &Period) -> Result<Vec<PeriodDueDetails>>;

    /// Inserts an entry. Duplicate (period, due type, beneficiary) rows and a
    /// second active flat fee in the same period fail with `Error::Conflict`.
    async fn create(&self, new_period_due: NewPeriodDue) -> Result<PeriodDue>;

    /// Marks an entry cancelled. Cancelling twice is a no-op.
    async fn cancel(&self, period_due_id: &str) -> Result<PeriodDue>;
}

/// Trait defining the contract for the period due catalog.
#[async_trait]
pub trait PeriodDueServiceTrait: Send + Sync {
    fn list_period_dues(
        &self,
        period: &Period,
        include_cancelled: bool,
    ) -> Result<Vec<PeriodDueDetails>>;

    /// Non-cancelled entries, the input of amount computation.
    fn list_active_period_dues(&self, period: &Period) -> Result<Vec<PeriodDueDetails>>;

    async fn create_period_due(
        &self,
        caller: &Caller,
        new_period_due: NewPeriodDue,
    ) -> Result<PeriodDue>;

    async fn cancel_period_due(&self, caller: &Caller, period_due_id: &str) -> Result<PeriodDue>;
}
