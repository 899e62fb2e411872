use std::sync::Arc;

use async_trait::async_trait;
use log::debug;

use super::period_dues_model::{find_flat_fee_anchor, NewPeriodDue, PeriodDue, PeriodDueDetails};
use super::period_dues_traits::{PeriodDueRepositoryTrait, PeriodDueServiceTrait};
use crate::access::Caller;
use crate::audit::{record_audit, AuditSinkTrait, NewAuditEntry};
use crate::due_types::DueTypeRepositoryTrait;
use crate::errors::{Error, Result};
use crate::events::{DomainEvent, DomainEventSink};
use crate::members::MemberDirectoryTrait;
use crate::utils::period::Period;

/// Service for opening and cancelling dues in a period.
pub struct PeriodDueService {
    repository: Arc<dyn PeriodDueRepositoryTrait>,
    due_type_repository: Arc<dyn DueTypeRepositoryTrait>,
    member_directory: Arc<dyn MemberDirectoryTrait>,
    event_sink: Arc<dyn DomainEventSink>,
    audit_sink: Arc<dyn AuditSinkTrait>,
}

impl PeriodDueService {
    pub fn new(
        repository: Arc<dyn PeriodDueRepositoryTrait>,
        due_type_repository: Arc<dyn DueTypeRepositoryTrait>,
        member_directory: Arc<dyn MemberDirectoryTrait>,
        event_sink: Arc<dyn DomainEventSink>,
        audit_sink: Arc<dyn AuditSinkTrait>,
    ) -> Self {
        Self {
            repository,
            due_type_repository,
            member_directory,
            event_sink,
            audit_sink,
        }
    }
}

#[async_trait]
impl PeriodDueServiceTrait for PeriodDueService {
    fn list_period_dues(
        &self,
        period: &Period,
        include_cancelled: bool,
    ) -> Result<Vec<PeriodDueDetails>> {
        let dues = self.repository.list_for_period(period)?;
        if include_cancelled {
            return Ok(dues);
        }
        Ok(dues.into_iter().filter(|d| d.is_active()).collect())
    }

    fn list_active_period_dues(&self, period: &Period) -> Result<Vec<PeriodDueDetails>> {
        self.list_period_dues(period, false)
    }

    async fn create_period_due(
        &self,
        caller: &Caller,
        new_period_due: NewPeriodDue,
    ) -> Result<PeriodDue> {
        caller.ensure_admin()?;
        new_period_due.validate()?;

        let due_type = self
            .due_type_repository
            .get_by_id(&new_period_due.due_type_id)
            .map_err(|_| Error::not_found("Due type", &new_period_due.due_type_id))?;
        if !due_type.active {
            return Err(Error::Precondition(format!(
                "Due type '{}' is inactive and cannot be opened for a period",
                due_type.name
            )));
        }

        match (
            due_type.requires_beneficiary,
            new_period_due.beneficiary_member_id.as_deref(),
        ) {
            (true, None) => {
                return Err(Error::invalid(format!(
                    "Due type '{}' requires a beneficiary member",
                    due_type.name
                )))
            }
            (false, Some(_)) => {
                return Err(Error::invalid(format!(
                    "Due type '{}' is a flat fee and cannot have a beneficiary",
                    due_type.name
                )))
            }
            (true, Some(beneficiary_id)) => {
                self.member_directory
                    .get_member(beneficiary_id)
                    .map_err(|_| Error::not_found("Member", beneficiary_id))?;
            }
            (false, None) => {
                let existing = self.list_active_period_dues(&new_period_due.period)?;
                if let Some(anchor) = find_flat_fee_anchor(&existing) {
                    return Err(Error::Conflict(format!(
                        "Period {} already has an active flat fee ('{}')",
                        new_period_due.period, anchor.due_type_name
                    )));
                }
            }
        }

        debug!(
            "Opening due type '{}' for period {}",
            due_type.name, new_period_due.period
        );
        let created = self.repository.create(new_period_due).await?;

        self.event_sink.emit(DomainEvent::period_catalog_changed(vec![
            created.period.key(),
        ]));
        record_audit(
            self.audit_sink.as_ref(),
            NewAuditEntry::new(caller, "create", "period_due", &created.id).with_details(format!(
                "{} {} {}",
                created.period, due_type.name, created.base_amount
            )),
        )
        .await;
        Ok(created)
    }

    async fn cancel_period_due(&self, caller: &Caller, period_due_id: &str) -> Result<PeriodDue> {
        caller.ensure_admin()?;

        let existing = self.repository.get_by_id(period_due_id)?;
        if !existing.is_active() {
            return Ok(existing);
        }

        let cancelled = self.repository.cancel(period_due_id).await?;

        self.event_sink.emit(DomainEvent::period_catalog_changed(vec![
            cancelled.period.key(),
        ]));
        record_audit(
            self.audit_sink.as_ref(),
            NewAuditEntry::new(caller, "cancel", "period_due", period_due_id),
        )
        .await;
        Ok(cancelled)
    }
}
