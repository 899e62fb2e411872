//! Member credit domain models and the pure credit arithmetic.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::obligations::{ObligationRef, Settlement};

/// Prepaid balance of a member. Never negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberCredit {
    pub member_id: String,
    pub balance: Decimal,
    pub updated_at: Option<NaiveDateTime>,
}

impl MemberCredit {
    /// Balance of a member that never had credit.
    pub fn empty(member_id: &str) -> Self {
        Self {
            member_id: member_id.to_string(),
            balance: Decimal::ZERO,
            updated_at: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreditMovementKind {
    /// Administrator grant or correction.
    ManualAdjustment,
    /// Excess of a payment over what was owed.
    Overpayment,
    /// Credit used to settle an obligation.
    Consumption,
    /// Paid amount returned after an obligation was repriced below it.
    RepricingRefund,
}

impl CreditMovementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CreditMovementKind::ManualAdjustment => "MANUAL_ADJUSTMENT",
            CreditMovementKind::Overpayment => "OVERPAYMENT",
            CreditMovementKind::Consumption => "CONSUMPTION",
            CreditMovementKind::RepricingRefund => "REPRICING_REFUND",
        }
    }
}

impl fmt::Display for CreditMovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CreditMovementKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "MANUAL_ADJUSTMENT" => Ok(CreditMovementKind::ManualAdjustment),
            "OVERPAYMENT" => Ok(CreditMovementKind::Overpayment),
            "CONSUMPTION" => Ok(CreditMovementKind::Consumption),
            "REPRICING_REFUND" => Ok(CreditMovementKind::RepricingRefund),
            other => Err(Error::invalid(format!("Unknown credit movement kind '{}'", other))),
        }
    }
}

/// One entry of the credit ledger. Positive amounts add credit, negative
/// amounts consume it; the balance is the sum of all movements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditMovement {
    pub id: String,
    pub member_id: String,
    pub amount: Decimal,
    pub kind: CreditMovementKind,
    pub obligation: Option<ObligationRef>,
    pub payment_id: Option<String>,
    pub note: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCreditMovement {
    pub member_id: String,
    pub amount: Decimal,
    pub kind: CreditMovementKind,
    pub obligation: Option<ObligationRef>,
    pub payment_id: Option<String>,
    pub note: Option<String>,
}

impl NewCreditMovement {
    pub fn consumption(member_id: &str, consumed: Decimal, obligation: Option<ObligationRef>) -> Self {
        Self {
            member_id: member_id.to_string(),
            amount: -consumed,
            kind: CreditMovementKind::Consumption,
            obligation,
            payment_id: None,
            note: None,
        }
    }
}

/// Administrator request to grant (positive) or withdraw (negative) credit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditAdjustment {
    pub amount: Decimal,
    #[serde(default)]
    pub note: Option<String>,
}

impl CreditAdjustment {
    pub fn validate(&self) -> Result<()> {
        if self.amount.is_zero() {
            return Err(Error::invalid("Credit adjustment amount cannot be zero"));
        }
        Ok(())
    }
}

/// Balance plus ledger history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditSummary {
    pub credit: MemberCredit,
    pub movements: Vec<CreditMovement>,
}

/// Result of applying a credit balance to an outstanding amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditApplication {
    pub consumed: Decimal,
    pub remaining_owed: Decimal,
    pub balance_after: Decimal,
}

/// Consumes `min(balance, outstanding)`. Negative inputs count as zero.
pub fn consume_credit(balance: Decimal, outstanding: Decimal) -> CreditApplication {
    let balance = balance.max(Decimal::ZERO);
    let outstanding = outstanding.max(Decimal::ZERO);
    let consumed = balance.min(outstanding);
    CreditApplication {
        consumed,
        remaining_owed: outstanding - consumed,
        balance_after: balance - consumed,
    }
}

/// Settles as much of `settlement` as `balance` allows.
pub fn apply_credit_to_settlement(balance: Decimal, settlement: &mut Settlement) -> CreditApplication {
    if settlement.is_cancelled() {
        return consume_credit(balance, Decimal::ZERO);
    }
    let application = consume_credit(balance, settlement.amount_remaining);
    settlement.settle(application.consumed);
    application
}

/// Balance after a manual adjustment; refuses to go below zero.
pub fn adjusted_balance(balance: Decimal, delta: Decimal) -> Result<Decimal> {
    let next = balance + delta;
    if next < Decimal::ZERO {
        return Err(Error::Precondition(format!(
            "Adjustment of {} would leave a negative credit balance (current {})",
            delta, balance
        )));
    }
    Ok(next)
}
