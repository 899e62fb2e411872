use async_trait::async_trait;

use super::obligations_model::{
    BatchInsertOutcome, GenerationRequest, GenerationSummary, MemberObligation, ObligationBatch,
    ObligationPatch,
};
use crate::access::Caller;
use crate::errors::Result;
use crate::settings::OverpaymentPolicy;
use crate::utils::period::Period;

/// Trait defining the contract for obligation persistence.
///
/// Every write runs in a single transaction together with the credit
/// movements it causes.
#[async_trait]
pub trait ObligationRepositoryTrait: Send + Sync {
    fn get_by_id(&self, obligation_id: &str) -> Result<MemberObligation>;

    fn list_for_period(&self, period: &Period) -> Result<Vec<MemberObligation>>;

    /// All obligations of a member, newest period first.
    fn list_for_member(&self, member_id: &str) -> Result<Vec<MemberObligation>>;

    /// Non-cancelled obligations with something left to pay, oldest first.
    fn list_open_for_member(&self, member_id: &str) -> Result<Vec<MemberObligation>>;

    /// Persists a generation batch.
    ///
    /// Fails with `Error::Conflict` when the period already has non-cancelled
    /// obligations and `batch.allow_existing` is false. Rows hitting the
    /// (member, period) uniqueness are skipped and counted. Available member
    /// credit is consumed for each created row.
    async fn insert_period_batch(&self, batch: ObligationBatch) -> Result<BatchInsertOutcome>;

    /// Re-reads the row, applies the patch, and books refunds or credit
    /// consumption caused by a price change.
    async fn update_with_patch(
        &self,
        obligation_id: &str,
        patch: ObligationPatch,
        policy: OverpaymentPolicy,
    ) -> Result<MemberObligation>;

    /// Cancels an obligation on which nothing was paid.
    async fn cancel(&self, obligation_id: &str) -> Result<MemberObligation>;

    /// Consumes available member credit toward the obligation.
    async fn apply_member_credit(&self, obligation_id: &str) -> Result<MemberObligation>;
}

/// Trait defining the contract for batch generation.
#[async_trait]
pub trait DueAssignmentServiceTrait: Send + Sync {
    async fn generate_for_period(
        &self,
        caller: &Caller,
        request: GenerationRequest,
    ) -> Result<GenerationSummary>;
}

/// Trait defining the contract for obligation reads and edits.
#[async_trait]
pub trait ObligationServiceTrait: Send + Sync {
    fn get_obligation(&self, caller: &Caller, obligation_id: &str) -> Result<MemberObligation>;

    fn list_member_obligations(
        &self,
        caller: &Caller,
        member_id: &str,
    ) -> Result<Vec<MemberObligation>>;

    fn list_period_obligations(
        &self,
        caller: &Caller,
        period: &Period,
    ) -> Result<Vec<MemberObligation>>;

    async fn update_obligation(
        &self,
        caller: &Caller,
        obligation_id: &str,
        patch: ObligationPatch,
    ) -> Result<MemberObligation>;

    async fn cancel_obligation(
        &self,
        caller: &Caller,
        obligation_id: &str,
    ) -> Result<MemberObligation>;

    async fn apply_credit_to_obligation(
        &self,
        caller: &Caller,
        obligation_id: &str,
    ) -> Result<MemberObligation>;
}
