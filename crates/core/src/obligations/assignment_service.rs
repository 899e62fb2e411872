use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};

use super::calculator::DueCalculatorTrait;
use super::obligations_model::{
    GenerationError, GenerationRequest, GenerationSummary, NewMemberObligation, ObligationBatch,
};
use super::obligations_traits::{DueAssignmentServiceTrait, ObligationRepositoryTrait};
use crate::access::Caller;
use crate::audit::{record_audit, AuditSinkTrait, NewAuditEntry};
use crate::errors::{Error, Result};
use crate::events::{DomainEvent, DomainEventSink};
use crate::members::{Member, MemberDirectoryTrait};
use crate::period_dues::{find_flat_fee_anchor, PeriodDueDetails, PeriodDueRepositoryTrait};
use crate::utils::period::Period;

/// Generates the obligations of every eligible member for a period.
pub struct DueAssignmentService {
    period_due_repository: Arc<dyn PeriodDueRepositoryTrait>,
    obligation_repository: Arc<dyn ObligationRepositoryTrait>,
    member_directory: Arc<dyn MemberDirectoryTrait>,
    calculator: Arc<dyn DueCalculatorTrait>,
    event_sink: Arc<dyn DomainEventSink>,
    audit_sink: Arc<dyn AuditSinkTrait>,
}

impl DueAssignmentService {
    pub fn new(
        period_due_repository: Arc<dyn PeriodDueRepositoryTrait>,
        obligation_repository: Arc<dyn ObligationRepositoryTrait>,
        member_directory: Arc<dyn MemberDirectoryTrait>,
        calculator: Arc<dyn DueCalculatorTrait>,
        event_sink: Arc<dyn DomainEventSink>,
        audit_sink: Arc<dyn AuditSinkTrait>,
    ) -> Self {
        Self {
            period_due_repository,
            obligation_repository,
            member_directory,
            calculator,
            event_sink,
            audit_sink,
        }
    }

    fn load_catalog(&self, period: &Period, due_type_ids: &[String]) -> Result<Vec<PeriodDueDetails>> {
        let dues: Vec<PeriodDueDetails> = self
            .period_due_repository
            .list_for_period(period)?
            .into_iter()
            .filter(|d| d.is_active())
            .filter(|d| due_type_ids.is_empty() || due_type_ids.contains(&d.period_due.due_type_id))
            .collect();

        if dues.is_empty() {
            return Err(Error::NotFound(format!(
                "No active dues are open for period {}",
                period
            )));
        }
        Ok(dues)
    }

    /// Active non-admin members, ordered by display name, optionally
    /// restricted to `member_ids`. Requested ids that are unknown or not
    /// eligible are reported, not fatal.
    fn eligible_members(
        &self,
        member_ids: Option<&[String]>,
        errors: &mut Vec<GenerationError>,
    ) -> Result<Vec<Member>> {
        let mut members: Vec<Member> = self
            .member_directory
            .list_members(true)?
            .into_iter()
            .filter(Member::owes_dues)
            .collect();

        if let Some(requested) = member_ids {
            let wanted: HashSet<&str> = requested.iter().map(String::as_str).collect();
            let known: HashSet<String> = members.iter().map(|m| m.id.clone()).collect();
            for id in requested {
                if !known.contains(id) {
                    errors.push(GenerationError {
                        member_id: Some(id.clone()),
                        message: format!("Member '{}' is unknown or not eligible for dues", id),
                    });
                }
            }
            members.retain(|m| wanted.contains(m.id.as_str()));
        }

        members.sort_by(|a, b| {
            a.display_name
                .cmp(&b.display_name)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(members)
    }
}

#[async_trait]
impl DueAssignmentServiceTrait for DueAssignmentService {
    async fn generate_for_period(
        &self,
        caller: &Caller,
        request: GenerationRequest,
    ) -> Result<GenerationSummary> {
        caller.ensure_admin()?;
        let period = Period::new(request.year, request.month)?;

        let catalog = self.load_catalog(&period, &request.due_type_ids)?;
        let anchor = find_flat_fee_anchor(&catalog).ok_or_else(|| {
            Error::Precondition(format!("Period {} has no active flat fee", period))
        })?;

        let mut errors = Vec::new();
        let members = self.eligible_members(request.member_ids.as_deref(), &mut errors)?;
        if members.is_empty() {
            return Err(Error::Precondition(format!(
                "No eligible members to generate period {} for",
                period
            )));
        }

        let mut obligations = Vec::with_capacity(members.len());
        for member in &members {
            match self.calculator.compute_due(member, &period, &catalog) {
                Ok(computation) => obligations.push(NewMemberObligation {
                    period,
                    due_type_id: anchor.period_due.due_type_id.clone(),
                    member_id: member.id.clone(),
                    amount_expected: computation.amount_total,
                    due_date: anchor.period_due.due_date,
                    description: computation.description,
                    source_period_due_id: anchor.period_due.id.clone(),
                    created_by: caller.member_id.clone(),
                }),
                Err(e) => {
                    warn!("Could not compute dues of member {} for {}: {}", member.id, period, e);
                    errors.push(GenerationError {
                        member_id: Some(member.id.clone()),
                        message: e.to_string(),
                    });
                }
            }
        }

        if obligations.is_empty() {
            return Ok(GenerationSummary {
                period,
                created_count: 0,
                skipped_duplicates: 0,
                credit_applied_count: 0,
                errors,
            });
        }

        debug!(
            "Persisting {} obligations for period {} (resume_partial={})",
            obligations.len(),
            period,
            request.resume_partial
        );
        let outcome = self
            .obligation_repository
            .insert_period_batch(ObligationBatch {
                period,
                obligations,
                allow_existing: request.resume_partial,
            })
            .await?;

        info!(
            "Generated period {}: {} created, {} skipped, {} settled from credit, {} errors",
            period,
            outcome.created.len(),
            outcome.skipped_duplicates,
            outcome.credit_applied_count,
            errors.len()
        );

        if !outcome.created.is_empty() {
            let member_ids: Vec<String> =
                outcome.created.iter().map(|o| o.member_id.clone()).collect();
            self.event_sink.emit(DomainEvent::obligations_changed(
                member_ids.clone(),
                vec![period.key()],
            ));
            if outcome.credit_applied_count > 0 {
                self.event_sink.emit(DomainEvent::credit_changed(member_ids));
            }
        }

        let summary = GenerationSummary {
            period,
            created_count: outcome.created.len(),
            skipped_duplicates: outcome.skipped_duplicates,
            credit_applied_count: outcome.credit_applied_count,
            errors,
        };
        record_audit(
            self.audit_sink.as_ref(),
            NewAuditEntry::new(caller, "generate", "period", &period.key()).with_details(format!(
                "created={} skipped={} credit_applied={} errors={}",
                summary.created_count,
                summary.skipped_duplicates,
                summary.credit_applied_count,
                summary.errors.len()
            )),
        )
        .await;
        Ok(summary)
    }
}
