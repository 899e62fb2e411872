//! One-off debts owed outside the monthly cycle.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::obligations::{ObligationKind, ObligationRef, ObligationStatus, Settleable, Settlement};

/// Balance a member carried over when joining the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialDebt {
    pub id: String,
    pub member_id: String,
    pub description: String,
    pub amount_expected: Decimal,
    pub amount_paid: Decimal,
    pub amount_remaining: Decimal,
    pub status: ObligationStatus,
    pub created_by: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// One-off assistance contribution owed toward a beneficiary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistanceDue {
    pub id: String,
    pub member_id: String,
    pub beneficiary_member_id: Option<String>,
    pub description: String,
    pub amount_expected: Decimal,
    pub amount_paid: Decimal,
    pub amount_remaining: Decimal,
    pub due_date: Option<NaiveDate>,
    pub status: ObligationStatus,
    pub created_by: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

macro_rules! impl_settleable {
    ($ty:ty, $kind:expr) => {
        impl Settleable for $ty {
            fn obligation_ref(&self) -> ObligationRef {
                ObligationRef::new($kind, self.id.clone())
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

        impl $ty {
            pub fn is_open(&self) -> bool {
                self.status != ObligationStatus::Cancelled
                    && self.amount_remaining > Decimal::ZERO
            }
        }
    };
}

impl_settleable!(InitialDebt, ObligationKind::InitialDebt);
impl_settleable!(AssistanceDue, ObligationKind::Assistance);

fn validate_debt(member_id: &str, description: &str, amount: Decimal) -> Result<()> {
    if member_id.trim().is_empty() {
        return Err(Error::invalid("Member id is required"));
    }
    if description.trim().is_empty() {
        return Err(Error::invalid("Description is required"));
    }
    if amount <= Decimal::ZERO {
        return Err(Error::invalid(format!(
            "Amount must be greater than zero, got {}",
            amount
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInitialDebt {
    pub member_id: String,
    pub description: String,
    pub amount: Decimal,
}

impl NewInitialDebt {
    pub fn validate(&self) -> Result<()> {
        validate_debt(&self.member_id, &self.description, self.amount)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAssistanceDue {
    pub member_id: String,
    #[serde(default)]
    pub beneficiary_member_id: Option<String>,
    pub description: String,
    pub amount: Decimal,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

impl NewAssistanceDue {
    pub fn validate(&self) -> Result<()> {
        validate_debt(&self.member_id, &self.description, self.amount)?;
        if let Some(beneficiary) = &self.beneficiary_member_id {
            if beneficiary.trim().is_empty() {
                return Err(Error::invalid("Beneficiary member id cannot be blank"));
            }
        }
        Ok(())
    }
}

/// Every one-off debt of a member.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDebts {
    pub initial_debts: Vec<InitialDebt>,
    pub assistance_dues: Vec<AssistanceDue>,
}
