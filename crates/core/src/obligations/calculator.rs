//! Amount computation for one member and one period.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::members::Member;
use crate::period_dues::{find_flat_fee_anchor, PeriodDueDetails};
use crate::settings::AssistancePolicy;
use crate::utils::period::Period;

/// One contributing due in a computed amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DueLine {
    pub period_due_id: String,
    pub label: String,
    pub amount: Decimal,
    pub beneficiary_member_id: Option<String>,
}

/// What a member owes for a period, with the breakdown behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DueComputation {
    pub amount_total: Decimal,
    pub lines: Vec<DueLine>,
    pub description: String,
}

/// Computes the amount a member owes from a period's active dues.
pub trait DueCalculatorTrait: Send + Sync {
    fn compute_due(
        &self,
        member: &Member,
        period: &Period,
        active_dues: &[PeriodDueDetails],
    ) -> Result<DueComputation>;
}

/// Flat fee plus every applicable assistance due.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardDueCalculator {
    policy: AssistancePolicy,
}

impl StandardDueCalculator {
    pub fn new(policy: AssistancePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> AssistancePolicy {
        self.policy
    }
}

impl DueCalculatorTrait for StandardDueCalculator {
    fn compute_due(
        &self,
        member: &Member,
        period: &Period,
        active_dues: &[PeriodDueDetails],
    ) -> Result<DueComputation> {
        let anchor = find_flat_fee_anchor(active_dues).ok_or_else(|| {
            Error::Precondition(format!("Period {} has no active flat fee", period))
        })?;

        let mut lines = vec![DueLine {
            period_due_id: anchor.period_due.id.clone(),
            label: anchor.due_type_name.clone(),
            amount: anchor.period_due.base_amount,
            beneficiary_member_id: None,
        }];

        for due in active_dues
            .iter()
            .filter(|d| d.is_active() && !d.is_flat_fee())
        {
            let beneficiary_id = due.period_due.beneficiary_member_id.as_deref();
            if !self.policy.applies_to(&member.id, beneficiary_id) {
                continue;
            }
            let label = match (&due.beneficiary_name, beneficiary_id) {
                (Some(name), _) => format!("{} (beneficiary: {})", due.due_type_name, name),
                (None, Some(id)) => format!("{} (beneficiary: {})", due.due_type_name, id),
                (None, None) => due.due_type_name.clone(),
            };
            lines.push(DueLine {
                period_due_id: due.period_due.id.clone(),
                label,
                amount: due.period_due.base_amount,
                beneficiary_member_id: beneficiary_id.map(str::to_string),
            });
        }

        let amount_total: Decimal = lines.iter().map(|l| l.amount).sum();
        let mut description: Vec<String> = lines
            .iter()
            .map(|l| format!("{}: {:.2}", l.label, l.amount))
            .collect();
        description.push(format!("Total {}: {:.2}", period, amount_total));

        Ok(DueComputation {
            amount_total,
            lines,
            description: description.join("\n"),
        })
    }
}
