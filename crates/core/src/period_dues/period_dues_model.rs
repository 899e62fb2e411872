//! Period due domain models.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::utils::period::Period;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PeriodDueStatus {
    #[default]
    Active,
    Cancelled,
}

impl PeriodDueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodDueStatus::Active => "ACTIVE",
            PeriodDueStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for PeriodDueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodDueStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ACTIVE" => Ok(PeriodDueStatus::Active),
            "CANCELLED" => Ok(PeriodDueStatus::Cancelled),
            other => Err(Error::invalid(format!("Unknown period due status '{}'", other))),
        }
    }
}

/// A due type instantiated for one period.
///
/// `base_amount` is frozen at creation; later catalog price changes do not
/// affect periods already opened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodDue {
    pub id: String,
    pub period: Period,
    pub due_type_id: String,
    pub base_amount: Decimal,
    pub beneficiary_member_id: Option<String>,
    pub due_date: NaiveDate,
    pub status: PeriodDueStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl PeriodDue {
    pub fn is_active(&self) -> bool {
        self.status == PeriodDueStatus::Active
    }
}

/// A period due joined with its due type and beneficiary, for display and
/// amount computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodDueDetails {
    #[serde(flatten)]
    pub period_due: PeriodDue,
    pub due_type_name: String,
    pub display_order: i32,
    pub requires_beneficiary: bool,
    pub beneficiary_name: Option<String>,
}

impl PeriodDueDetails {
    /// An entry without a beneficiary is the flat fee, whatever its due type
    /// currently declares. This matches the one-flat-fee-per-period index.
    pub fn is_flat_fee(&self) -> bool {
        self.period_due.beneficiary_member_id.is_none()
    }

    pub fn is_active(&self) -> bool {
        self.period_due.is_active()
    }
}

/// Returns the single active flat-fee entry of a period catalog, if any.
pub fn find_flat_fee_anchor(dues: &[PeriodDueDetails]) -> Option<&PeriodDueDetails> {
    dues.iter().find(|d| d.is_active() && d.is_flat_fee())
}

/// Input model for opening a due in a period.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPeriodDue {
    pub period: Period,
    pub due_type_id: String,
    pub base_amount: Decimal,
    pub beneficiary_member_id: Option<String>,
    pub due_date: NaiveDate,
}

impl NewPeriodDue {
    pub fn validate(&self) -> Result<()> {
        if self.due_type_id.trim().is_empty() {
            return Err(Error::invalid("Due type id is required"));
        }
        if self.base_amount < Decimal::ZERO {
            return Err(Error::invalid(format!(
                "Base amount cannot be negative, got {}",
                self.base_amount
            )));
        }
        if let Some(beneficiary) = &self.beneficiary_member_id {
            if beneficiary.trim().is_empty() {
                return Err(Error::invalid("Beneficiary member id cannot be blank"));
            }
        }
        Ok(())
    }
}
