use std::sync::Arc;

use async_trait::async_trait;
use log::info;

use super::debts_model::{AssistanceDue, InitialDebt, MemberDebts, NewAssistanceDue, NewInitialDebt};
use super::debts_traits::{DebtRepositoryTrait, DebtServiceTrait};
use crate::access::Caller;
use crate::audit::{record_audit, AuditSinkTrait, NewAuditEntry};
use crate::errors::{Error, Result};
use crate::events::{DomainEvent, DomainEventSink};
use crate::members::MemberDirectoryTrait;

/// Service for initial debts and one-off assistance dues.
pub struct DebtService {
    repository: Arc<dyn DebtRepositoryTrait>,
    member_directory: Arc<dyn MemberDirectoryTrait>,
    event_sink: Arc<dyn DomainEventSink>,
    audit_sink: Arc<dyn AuditSinkTrait>,
}

impl DebtService {
    pub fn new(
        repository: Arc<dyn DebtRepositoryTrait>,
        member_directory: Arc<dyn MemberDirectoryTrait>,
        event_sink: Arc<dyn DomainEventSink>,
        audit_sink: Arc<dyn AuditSinkTrait>,
    ) -> Self {
        Self {
            repository,
            member_directory,
            event_sink,
            audit_sink,
        }
    }

    fn ensure_member_exists(&self, member_id: &str) -> Result<()> {
        self.member_directory
            .get_member(member_id)
            .map(|_| ())
            .map_err(|_| Error::not_found("Member", member_id))
    }

    fn emit_created(&self, member_id: &str, credit_used: bool) {
        self.event_sink.emit(DomainEvent::obligations_changed(
            vec![member_id.to_string()],
            Vec::new(),
        ));
        if credit_used {
            self.event_sink
                .emit(DomainEvent::credit_changed(vec![member_id.to_string()]));
        }
    }
}

#[async_trait]
impl DebtServiceTrait for DebtService {
    fn list_member_debts(&self, caller: &Caller, member_id: &str) -> Result<MemberDebts> {
        caller.ensure_can_read_member(member_id)?;
        Ok(MemberDebts {
            initial_debts: self.repository.list_initial_debts(member_id, false)?,
            assistance_dues: self.repository.list_assistance_dues(member_id, false)?,
        })
    }

    async fn create_initial_debt(
        &self,
        caller: &Caller,
        new_debt: NewInitialDebt,
    ) -> Result<InitialDebt> {
        caller.ensure_admin()?;
        new_debt.validate()?;
        self.ensure_member_exists(&new_debt.member_id)?;

        let debt = self
            .repository
            .create_initial_debt(new_debt, &caller.member_id)
            .await?;
        info!(
            "Created initial debt {} of {} for {} (settled from credit: {})",
            debt.id, debt.amount_expected, debt.member_id, debt.amount_paid
        );

        self.emit_created(&debt.member_id, !debt.amount_paid.is_zero());
        record_audit(
            self.audit_sink.as_ref(),
            NewAuditEntry::new(caller, "create", "initial_debt", &debt.id)
                .with_details(format!("{} {}", debt.member_id, debt.amount_expected)),
        )
        .await;
        Ok(debt)
    }

    async fn create_assistance_due(
        &self,
        caller: &Caller,
        new_assistance: NewAssistanceDue,
    ) -> Result<AssistanceDue> {
        caller.ensure_admin()?;
        new_assistance.validate()?;
        self.ensure_member_exists(&new_assistance.member_id)?;
        if let Some(beneficiary) = &new_assistance.beneficiary_member_id {
            self.ensure_member_exists(beneficiary)?;
        }

        let assistance = self
            .repository
            .create_assistance_due(new_assistance, &caller.member_id)
            .await?;
        info!(
            "Created assistance due {} of {} for {} (settled from credit: {})",
            assistance.id, assistance.amount_expected, assistance.member_id, assistance.amount_paid
        );

        self.emit_created(&assistance.member_id, !assistance.amount_paid.is_zero());
        record_audit(
            self.audit_sink.as_ref(),
            NewAuditEntry::new(caller, "create", "assistance_due", &assistance.id).with_details(
                format!("{} {}", assistance.member_id, assistance.amount_expected),
            ),
        )
        .await;
        Ok(assistance)
    }
}
