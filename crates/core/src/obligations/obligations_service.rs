use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use rust_decimal::Decimal;

use super::edit_window::ensure_editable;
use super::obligations_model::{MemberObligation, ObligationPatch};
use super::obligations_traits::{ObligationRepositoryTrait, ObligationServiceTrait};
use super::settlement::ObligationStatus;
use crate::access::Caller;
use crate::audit::{record_audit, AuditSinkTrait, NewAuditEntry};
use crate::errors::{Error, Result};
use crate::events::{DomainEvent, DomainEventSink};
use crate::settings::EngineSettings;
use crate::utils::period::Period;
use crate::utils::time_utils::Clock;

/// Reads and edits individual obligations.
pub struct ObligationService {
    repository: Arc<dyn ObligationRepositoryTrait>,
    clock: Arc<dyn Clock>,
    settings: EngineSettings,
    event_sink: Arc<dyn DomainEventSink>,
    audit_sink: Arc<dyn AuditSinkTrait>,
}

impl ObligationService {
    pub fn new(
        repository: Arc<dyn ObligationRepositoryTrait>,
        clock: Arc<dyn Clock>,
        settings: EngineSettings,
        event_sink: Arc<dyn DomainEventSink>,
        audit_sink: Arc<dyn AuditSinkTrait>,
    ) -> Self {
        Self {
            repository,
            clock,
            settings,
            event_sink,
            audit_sink,
        }
    }

    fn emit_changed(&self, obligation: &MemberObligation, credit_moved: bool) {
        self.event_sink.emit(DomainEvent::obligations_changed(
            vec![obligation.member_id.clone()],
            vec![obligation.period.key()],
        ));
        if credit_moved {
            self.event_sink
                .emit(DomainEvent::credit_changed(vec![obligation.member_id.clone()]));
        }
    }
}

#[async_trait]
impl ObligationServiceTrait for ObligationService {
    fn get_obligation(&self, caller: &Caller, obligation_id: &str) -> Result<MemberObligation> {
        let obligation = self.repository.get_by_id(obligation_id)?;
        caller.ensure_can_read_member(&obligation.member_id)?;
        Ok(obligation)
    }

    fn list_member_obligations(
        &self,
        caller: &Caller,
        member_id: &str,
    ) -> Result<Vec<MemberObligation>> {
        caller.ensure_can_read_member(member_id)?;
        self.repository.list_for_member(member_id)
    }

    fn list_period_obligations(
        &self,
        caller: &Caller,
        period: &Period,
    ) -> Result<Vec<MemberObligation>> {
        caller.ensure_admin()?;
        self.repository.list_for_period(period)
    }

    async fn update_obligation(
        &self,
        caller: &Caller,
        obligation_id: &str,
        patch: ObligationPatch,
    ) -> Result<MemberObligation> {
        caller.ensure_admin()?;
        patch.validate()?;

        let existing = self.repository.get_by_id(obligation_id)?;
        ensure_editable(&existing.period, self.clock.today())?;
        if existing.status == ObligationStatus::Cancelled {
            return Err(Error::Precondition(format!(
                "Obligation '{}' is cancelled and cannot be edited",
                obligation_id
            )));
        }
        if patch.is_empty() {
            return Ok(existing);
        }

        debug!("Updating obligation {} of {}", obligation_id, existing.member_id);
        let updated = self
            .repository
            .update_with_patch(obligation_id, patch, self.settings.overpayment_policy)
            .await?;

        let credit_moved = updated.amount_expected != existing.amount_expected;
        self.emit_changed(&updated, credit_moved);
        record_audit(
            self.audit_sink.as_ref(),
            NewAuditEntry::new(caller, "update", "member_obligation", obligation_id).with_details(
                format!(
                    "expected {} -> {}, paid {}, remaining {}, status {}",
                    existing.amount_expected,
                    updated.amount_expected,
                    updated.amount_paid,
                    updated.amount_remaining,
                    updated.status
                ),
            ),
        )
        .await;
        Ok(updated)
    }

    async fn cancel_obligation(
        &self,
        caller: &Caller,
        obligation_id: &str,
    ) -> Result<MemberObligation> {
        caller.ensure_admin()?;

        let existing = self.repository.get_by_id(obligation_id)?;
        if existing.status == ObligationStatus::Cancelled {
            return Ok(existing);
        }
        if existing.amount_paid > Decimal::ZERO {
            return Err(Error::Precondition(format!(
                "Obligation '{}' already has {} paid and cannot be cancelled",
                obligation_id, existing.amount_paid
            )));
        }

        let cancelled = self.repository.cancel(obligation_id).await?;
        self.emit_changed(&cancelled, false);
        record_audit(
            self.audit_sink.as_ref(),
            NewAuditEntry::new(caller, "cancel", "member_obligation", obligation_id),
        )
        .await;
        Ok(cancelled)
    }

    async fn apply_credit_to_obligation(
        &self,
        caller: &Caller,
        obligation_id: &str,
    ) -> Result<MemberObligation> {
        caller.ensure_admin()?;

        let existing = self.repository.get_by_id(obligation_id)?;
        if !existing.is_open() {
            return Err(Error::Precondition(format!(
                "Obligation '{}' has nothing left to settle",
                obligation_id
            )));
        }

        let updated = self.repository.apply_member_credit(obligation_id).await?;
        if updated.amount_paid != existing.amount_paid {
            self.emit_changed(&updated, true);
            record_audit(
                self.audit_sink.as_ref(),
                NewAuditEntry::new(caller, "apply_credit", "member_obligation", obligation_id)
                    .with_details(format!(
                        "consumed {}",
                        updated.amount_paid - existing.amount_paid
                    )),
            )
            .await;
        }
        Ok(updated)
    }
}
