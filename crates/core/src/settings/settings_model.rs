//! Engine policies that are decided by the association, not by the code.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// Who is charged for a beneficiary-targeted assistance due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssistancePolicy {
    /// Every eligible member contributes (solidarity pool), the beneficiary included.
    #[default]
    Pooled,
    /// Every eligible member except the beneficiary contributes.
    PooledExcludingBeneficiary,
    /// Only the beneficiary is charged.
    BeneficiaryOnly,
}

impl AssistancePolicy {
    /// Whether `member_id` owes the assistance that supports `beneficiary_id`.
    pub fn applies_to(&self, member_id: &str, beneficiary_id: Option<&str>) -> bool {
        match self {
            AssistancePolicy::Pooled => true,
            AssistancePolicy::PooledExcludingBeneficiary => beneficiary_id != Some(member_id),
            AssistancePolicy::BeneficiaryOnly => beneficiary_id == Some(member_id),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AssistancePolicy::Pooled => "POOLED",
            AssistancePolicy::PooledExcludingBeneficiary => "POOLED_EXCLUDING_BENEFICIARY",
            AssistancePolicy::BeneficiaryOnly => "BENEFICIARY_ONLY",
        }
    }
}

impl fmt::Display for AssistancePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssistancePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "POOLED" => Ok(AssistancePolicy::Pooled),
            "POOLED_EXCLUDING_BENEFICIARY" => Ok(AssistancePolicy::PooledExcludingBeneficiary),
            "BENEFICIARY_ONLY" => Ok(AssistancePolicy::BeneficiaryOnly),
            other => Err(Error::invalid(format!("Unknown assistance policy '{}'", other))),
        }
    }
}

/// What happens to the part of a payment that exceeds what is still owed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverpaymentPolicy {
    /// The excess is added to the member's credit balance.
    #[default]
    ConvertToCredit,
    /// The payment is refused.
    Reject,
}

impl OverpaymentPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverpaymentPolicy::ConvertToCredit => "CONVERT_TO_CREDIT",
            OverpaymentPolicy::Reject => "REJECT",
        }
    }
}

impl fmt::Display for OverpaymentPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OverpaymentPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CONVERT_TO_CREDIT" | "CREDIT" => Ok(OverpaymentPolicy::ConvertToCredit),
            "REJECT" => Ok(OverpaymentPolicy::Reject),
            other => Err(Error::invalid(format!("Unknown overpayment policy '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EngineSettings {
    pub assistance_policy: AssistancePolicy,
    pub overpayment_policy: OverpaymentPolicy,
}
