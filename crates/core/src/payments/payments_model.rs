//! Payment domain models and the rules for applying a payment to a debt.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::debts::{AssistanceDue, InitialDebt};
use crate::errors::{Error, Result};
use crate::obligations::{MemberObligation, ObligationKind, ObligationRef, Settleable};
use crate::settings::OverpaymentPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Check,
    Transfer,
    Card,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "CASH",
            PaymentMethod::Check => "CHECK",
            PaymentMethod::Transfer => "TRANSFER",
            PaymentMethod::Card => "CARD",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CASH" => Ok(PaymentMethod::Cash),
            "CHECK" => Ok(PaymentMethod::Check),
            "TRANSFER" => Ok(PaymentMethod::Transfer),
            "CARD" => Ok(PaymentMethod::Card),
            other => Err(Error::invalid(format!("Unknown payment method '{}'", other))),
        }
    }
}

/// A recorded payment. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    pub member_id: String,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub method: PaymentMethod,
    pub reference: Option<String>,
    pub description: Option<String>,
    pub member_obligation_id: Option<String>,
    pub initial_debt_id: Option<String>,
    pub assistance_id: Option<String>,
    /// Part of `amount` that went to the member's credit.
    pub credited_amount: Decimal,
    pub created_by: String,
    pub created_at: NaiveDateTime,
}

impl Payment {
    pub fn target(&self) -> Option<ObligationRef> {
        target_of(
            self.member_obligation_id.as_deref(),
            self.initial_debt_id.as_deref(),
            self.assistance_id.as_deref(),
        )
        .ok()
    }
}

fn target_of(
    member_obligation_id: Option<&str>,
    initial_debt_id: Option<&str>,
    assistance_id: Option<&str>,
) -> Result<ObligationRef> {
    let targets: Vec<ObligationRef> = [
        (ObligationKind::MonthlyDue, member_obligation_id),
        (ObligationKind::InitialDebt, initial_debt_id),
        (ObligationKind::Assistance, assistance_id),
    ]
    .into_iter()
    .filter_map(|(kind, id)| id.map(|id| ObligationRef::new(kind, id)))
    .collect();

    match targets.as_slice() {
        [single] if !single.id.trim().is_empty() => Ok(single.clone()),
        [_] => Err(Error::invalid("Payment target id cannot be blank")),
        [] => Err(Error::invalid(
            "A payment must target a monthly due, an initial debt or an assistance due",
        )),
        _ => Err(Error::invalid("A payment can only target one obligation")),
    }
}

/// Input model for recording a payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPayment {
    pub member_id: String,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    #[serde(default)]
    pub method: PaymentMethod,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub member_obligation_id: Option<String>,
    #[serde(default)]
    pub initial_debt_id: Option<String>,
    #[serde(default)]
    pub assistance_id: Option<String>,
}

impl NewPayment {
    /// Validates the input and returns the single obligation it targets.
    pub fn validate(&self) -> Result<ObligationRef> {
        if self.member_id.trim().is_empty() {
            return Err(Error::invalid("Member id is required"));
        }
        if self.amount <= Decimal::ZERO {
            return Err(Error::invalid(format!(
                "Payment amount must be greater than zero, got {}",
                self.amount
            )));
        }
        target_of(
            self.member_obligation_id.as_deref(),
            self.initial_debt_id.as_deref(),
            self.assistance_id.as_deref(),
        )
    }
}

/// How a payment was split between the target and the member's credit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaymentApplication {
    pub applied: Decimal,
    pub credited: Decimal,
}

/// Applies `amount` paid by `member_id` to `target`.
///
/// The target must belong to the payer, be neither cancelled nor fully paid.
/// The excess over what is owed is reported as `credited`, or refused under
/// [`OverpaymentPolicy::Reject`]. Nothing is mutated on error.
pub fn apply_payment<T: Settleable>(
    target: &mut T,
    member_id: &str,
    amount: Decimal,
    policy: OverpaymentPolicy,
) -> Result<PaymentApplication> {
    let reference = target.obligation_ref();
    if target.owner_id() != member_id {
        return Err(Error::invalid(format!(
            "{} '{}' does not belong to member '{}'",
            reference.kind, reference.id, member_id
        )));
    }

    let mut settlement = target.settlement();
    if settlement.is_cancelled() {
        return Err(Error::Precondition(format!(
            "{} '{}' is cancelled",
            reference.kind, reference.id
        )));
    }
    if settlement.is_settled() {
        return Err(Error::Precondition(format!(
            "{} '{}' is already fully paid",
            reference.kind, reference.id
        )));
    }
    if amount > settlement.amount_remaining && policy == OverpaymentPolicy::Reject {
        return Err(Error::invalid(format!(
            "Payment of {} exceeds the {} still owed",
            amount, settlement.amount_remaining
        )));
    }

    let credited = settlement.settle(amount);
    target.set_settlement(settlement);
    Ok(PaymentApplication {
        applied: amount - credited,
        credited,
    })
}

/// Everything a member still has to pay, by kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenObligations {
    pub debts: Vec<InitialDebt>,
    pub monthly_dues: Vec<MemberObligation>,
    pub assistances: Vec<AssistanceDue>,
}
