//! Amount bookkeeping shared by every kind of obligation.
//!
//! Monthly dues, initial debts and assistance dues all carry the same
//! expected/paid/remaining triple and derive their status from it with
//! [`derive_status`]. Nothing else in the crate computes a status.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObligationStatus {
    #[default]
    Pending,
    PartiallyPaid,
    Paid,
    Overdue,
    Cancelled,
}

impl ObligationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObligationStatus::Pending => "PENDING",
            ObligationStatus::PartiallyPaid => "PARTIALLY_PAID",
            ObligationStatus::Paid => "PAID",
            ObligationStatus::Overdue => "OVERDUE",
            ObligationStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for ObligationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObligationStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "PENDING" => Ok(ObligationStatus::Pending),
            "PARTIALLY_PAID" => Ok(ObligationStatus::PartiallyPaid),
            "PAID" => Ok(ObligationStatus::Paid),
            "OVERDUE" => Ok(ObligationStatus::Overdue),
            "CANCELLED" => Ok(ObligationStatus::Cancelled),
            other => Err(Error::invalid(format!("Unknown obligation status '{}'", other))),
        }
    }
}

/// The three kinds of debt a payment or a credit movement can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObligationKind {
    MonthlyDue,
    InitialDebt,
    Assistance,
}

impl ObligationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObligationKind::MonthlyDue => "MONTHLY_DUE",
            ObligationKind::InitialDebt => "INITIAL_DEBT",
            ObligationKind::Assistance => "ASSISTANCE",
        }
    }
}

impl fmt::Display for ObligationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObligationKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "MONTHLY_DUE" => Ok(ObligationKind::MonthlyDue),
            "INITIAL_DEBT" => Ok(ObligationKind::InitialDebt),
            "ASSISTANCE" => Ok(ObligationKind::Assistance),
            other => Err(Error::invalid(format!("Unknown obligation kind '{}'", other))),
        }
    }
}

/// Reference to one obligation of any kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObligationRef {
    pub kind: ObligationKind,
    pub id: String,
}

impl ObligationRef {
    pub fn new(kind: ObligationKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

/// Derives an obligation status from its amounts.
///
/// Cancelled is terminal. A fully covered obligation is Paid. Otherwise an
/// Overdue flag is kept, and the rest is PartiallyPaid or Pending depending
/// on whether anything was paid.
pub fn derive_status(
    amount_paid: Decimal,
    amount_remaining: Decimal,
    prior: ObligationStatus,
) -> ObligationStatus {
    if prior == ObligationStatus::Cancelled {
        return ObligationStatus::Cancelled;
    }
    if amount_remaining <= Decimal::ZERO {
        ObligationStatus::Paid
    } else if prior == ObligationStatus::Overdue {
        ObligationStatus::Overdue
    } else if amount_paid > Decimal::ZERO {
        ObligationStatus::PartiallyPaid
    } else {
        ObligationStatus::Pending
    }
}

/// Expected/paid/remaining amounts of an obligation plus its status.
///
/// Every mutation keeps `amount_paid + amount_remaining == amount_expected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settlement {
    pub amount_expected: Decimal,
    pub amount_paid: Decimal,
    pub amount_remaining: Decimal,
    pub status: ObligationStatus,
}

impl Settlement {
    /// A fresh, unpaid obligation. A zero amount is immediately Paid.
    pub fn new(amount_expected: Decimal) -> Self {
        let amount_expected = amount_expected.max(Decimal::ZERO);
        Self {
            amount_expected,
            amount_paid: Decimal::ZERO,
            amount_remaining: amount_expected,
            status: derive_status(Decimal::ZERO, amount_expected, ObligationStatus::Pending),
        }
    }

    pub fn is_balanced(&self) -> bool {
        self.amount_paid >= Decimal::ZERO
            && self.amount_remaining >= Decimal::ZERO
            && self.amount_paid + self.amount_remaining == self.amount_expected
    }

    pub fn is_settled(&self) -> bool {
        self.amount_remaining <= Decimal::ZERO
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == ObligationStatus::Cancelled
    }

    pub fn refresh_status(&mut self) {
        self.status = derive_status(self.amount_paid, self.amount_remaining, self.status);
    }

    /// Applies `amount` toward what is still owed.
    ///
    /// Returns the part of `amount` that could not be absorbed. Remaining
    /// never goes below zero.
    pub fn settle(&mut self, amount: Decimal) -> Decimal {
        let amount = amount.max(Decimal::ZERO);
        let applied = amount.min(self.amount_remaining);
        self.amount_paid += applied;
        self.amount_remaining -= applied;
        self.refresh_status();
        amount - applied
    }

    /// Changes the expected amount.
    ///
    /// Remaining becomes `max(0, new_expected - paid)`. When the new amount is
    /// below what was already paid, paid is capped and the overpaid part is
    /// returned so the caller can refund it.
    pub fn reprice(&mut self, new_expected: Decimal) -> Decimal {
        let new_expected = new_expected.max(Decimal::ZERO);
        self.amount_expected = new_expected;
        let overpaid = if self.amount_paid > new_expected {
            let overpaid = self.amount_paid - new_expected;
            self.amount_paid = new_expected;
            overpaid
        } else {
            Decimal::ZERO
        };
        self.amount_remaining = new_expected - self.amount_paid;
        self.refresh_status();
        overpaid
    }
}

/// An obligation whose amounts can be read and written as a [`Settlement`].
pub trait Settleable {
    fn obligation_ref(&self) -> ObligationRef;
    fn owner_id(&self) -> &str;
    fn settlement(&self) -> Settlement;
    fn set_settlement(&mut self, settlement: Settlement);
}
