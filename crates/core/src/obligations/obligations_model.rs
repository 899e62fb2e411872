//! Member obligation domain models.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::settlement::{ObligationKind, ObligationRef, ObligationStatus, Settleable, Settlement};
use crate::errors::{Error, Result};
use crate::settings::OverpaymentPolicy;
use crate::utils::period::Period;

/// What one member owes for one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberObligation {
    pub id: String,
    pub period: Period,
    pub year: i32,
    pub month: u32,
    /// Due type of the period's flat fee.
    pub due_type_id: String,
    pub member_id: String,
    pub amount_expected: Decimal,
    pub amount_paid: Decimal,
    pub amount_remaining: Decimal,
    pub due_date: NaiveDate,
    pub status: ObligationStatus,
    pub description: String,
    pub source_period_due_id: String,
    pub created_by: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl MemberObligation {
    pub fn is_open(&self) -> bool {
        self.status != ObligationStatus::Cancelled && self.amount_remaining > Decimal::ZERO
    }
}

impl Settleable for MemberObligation {
    fn obligation_ref(&self) -> ObligationRef {
        ObligationRef::new(ObligationKind::MonthlyDue, self.id.clone())
    }

    fn owner_id(&self) -> &str {
        &self.member_id
    }

    fn settlement(&self) -> Settlement {
        Settlement {
            amount_expected: self.amount_expected,
            amount_paid: self.amount_paid,
            amount_remaining: self.amount_remaining,
            status: self.status,
        }
    }

    fn set_settlement(&mut self, settlement: Settlement) {
        self.amount_expected = settlement.amount_expected;
        self.amount_paid = settlement.amount_paid;
        self.amount_remaining = settlement.amount_remaining;
        self.status = settlement.status;
    }
}

/// A computed, not yet persisted obligation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMemberObligation {
    pub period: Period,
    pub due_type_id: String,
    pub member_id: String,
    pub amount_expected: Decimal,
    pub due_date: NaiveDate,
    pub description: String,
    pub source_period_due_id: String,
    pub created_by: String,
}

impl NewMemberObligation {
    /// Opening amounts: nothing paid, everything remaining.
    pub fn settlement(&self) -> Settlement {
        Settlement::new(self.amount_expected)
    }
}

/// All obligations of one generation run, persisted as one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct ObligationBatch {
    pub period: Period,
    pub obligations: Vec<NewMemberObligation>,
    /// When false, any existing non-cancelled obligation for the period fails
    /// the whole batch with `Error::Conflict`.
    pub allow_existing: bool,
}

/// What the storage layer did with a batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchInsertOutcome {
    pub created: Vec<MemberObligation>,
    pub skipped_duplicates: usize,
    pub credit_applied_count: usize,
}

/// Partial edit of an obligation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObligationPatch {
    pub amount_expected: Option<Decimal>,
    pub due_date: Option<NaiveDate>,
    pub description: Option<String>,
    /// Overrides the derived status when set.
    pub status: Option<ObligationStatus>,
}

/// Side effects of applying an [`ObligationPatch`] that the ledger must book.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PatchOutcome {
    /// Paid amount above the new expected amount, to be returned as credit.
    pub refund_to_credit: Decimal,
    /// The expected amount went up, so available credit may be consumed.
    pub amount_increased: bool,
}

impl ObligationPatch {
    pub fn is_empty(&self) -> bool {
        self.amount_expected.is_none()
            && self.due_date.is_none()
            && self.description.is_none()
            && self.status.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(amount) = self.amount_expected {
            if amount < Decimal::ZERO {
                return Err(Error::invalid(format!(
                    "Expected amount cannot be negative, got {}",
                    amount
                )));
            }
        }
        if self.status == Some(ObligationStatus::Cancelled) {
            return Err(Error::invalid(
                "Use the cancel operation to cancel an obligation",
            ));
        }
        Ok(())
    }

    /// Applies the patch in place.
    ///
    /// Cancelled obligations are immutable. Lowering the amount below what
    /// was already paid either refunds the difference or, under
    /// [`OverpaymentPolicy::Reject`], fails.
    pub fn apply_to(
        &self,
        obligation: &mut MemberObligation,
        policy: OverpaymentPolicy,
    ) -> Result<PatchOutcome> {
        if obligation.status == ObligationStatus::Cancelled {
            return Err(Error::Precondition(format!(
                "Obligation '{}' is cancelled and cannot be edited",
                obligation.id
            )));
        }

        let mut outcome = PatchOutcome::default();
        if let Some(new_expected) = self.amount_expected {
            if new_expected != obligation.amount_expected {
                if new_expected < obligation.amount_paid
                    && policy == OverpaymentPolicy::Reject
                {
                    return Err(Error::invalid(format!(
                        "New amount {} is below the {} already paid",
                        new_expected, obligation.amount_paid
                    )));
                }
                outcome.amount_increased = new_expected > obligation.amount_expected;
                let mut settlement = obligation.settlement();
                outcome.refund_to_credit = settlement.reprice(new_expected);
                obligation.set_settlement(settlement);
            }
        }
        if let Some(due_date) = self.due_date {
            obligation.due_date = due_date;
        }
        if let Some(description) = &self.description {
            obligation.description = description.clone();
        }
        if let Some(status) = self.status {
            obligation.status = status;
        }
        Ok(outcome)
    }
}

/// Input of a batch generation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub year: i32,
    pub month: u32,
    /// Restricts the run to these due types; empty means all active ones.
    #[serde(default)]
    pub due_type_ids: Vec<String>,
    /// Restricts the run to these members; `None` means every eligible member.
    #[serde(default)]
    pub member_ids: Option<Vec<String>>,
    /// Completes a period that a previous run left partially generated.
    #[serde(default)]
    pub resume_partial: bool,
}

/// A non-fatal problem met while generating a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationError {
    pub member_id: Option<String>,
    pub message: String,
}

/// Result of a batch generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSummary {
    pub period: Period,
    pub created_count: usize,
    pub skipped_duplicates: usize,
    pub credit_applied_count: usize,
    pub errors: Vec<GenerationError>,
}
