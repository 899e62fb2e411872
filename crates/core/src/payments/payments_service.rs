use std::sync::Arc;

use async_trait::async_trait;
use log::info;
use rust_decimal::Decimal;

use super::payments_model::{NewPayment, OpenObligations, Payment};
use super::payments_traits::{PaymentRepositoryTrait, PaymentServiceTrait};
use crate::access::Caller;
use crate::audit::{record_audit, AuditSinkTrait, NewAuditEntry};
use crate::debts::DebtRepositoryTrait;
use crate::errors::{Error, Result};
use crate::events::{DomainEvent, DomainEventSink};
use crate::members::MemberDirectoryTrait;
use crate::obligations::{ObligationKind, ObligationRef, ObligationRepositoryTrait};
use crate::settings::EngineSettings;

/// Service for recording payments against obligations.
pub struct PaymentService {
    repository: Arc<dyn PaymentRepositoryTrait>,
    obligation_repository: Arc<dyn ObligationRepositoryTrait>,
    debt_repository: Arc<dyn DebtRepositoryTrait>,
    member_directory: Arc<dyn MemberDirectoryTrait>,
    settings: EngineSettings,
    event_sink: Arc<dyn DomainEventSink>,
    audit_sink: Arc<dyn AuditSinkTrait>,
}

impl PaymentService {
    pub fn new(
        repository: Arc<dyn PaymentRepositoryTrait>,
        obligation_repository: Arc<dyn ObligationRepositoryTrait>,
        debt_repository: Arc<dyn DebtRepositoryTrait>,
        member_directory: Arc<dyn MemberDirectoryTrait>,
        settings: EngineSettings,
        event_sink: Arc<dyn DomainEventSink>,
        audit_sink: Arc<dyn AuditSinkTrait>,
    ) -> Self {
        Self {
            repository,
            obligation_repository,
            debt_repository,
            member_directory,
            settings,
            event_sink,
            audit_sink,
        }
    }

    /// Fails with `NotFound` when the target does not exist and returns the
    /// period key of monthly dues for event scoping.
    fn ensure_target_exists(&self, target: &ObligationRef) -> Result<Option<String>> {
        match target.kind {
            ObligationKind::MonthlyDue => self
                .obligation_repository
                .get_by_id(&target.id)
                .map(|o| Some(o.period.key())),
            ObligationKind::InitialDebt => {
                self.debt_repository.get_initial_debt(&target.id).map(|_| None)
            }
            ObligationKind::Assistance => {
                self.debt_repository.get_assistance_due(&target.id).map(|_| None)
            }
        }
    }
}

#[async_trait]
impl PaymentServiceTrait for PaymentService {
    async fn record_payment(&self, caller: &Caller, new_payment: NewPayment) -> Result<Payment> {
        caller.ensure_admin()?;
        let target = new_payment.validate()?;
        self.member_directory
            .get_member(&new_payment.member_id)
            .map_err(|_| Error::not_found("Member", &new_payment.member_id))?;
        let period = self.ensure_target_exists(&target)?;

        let payment = self
            .repository
            .record(
                new_payment,
                &caller.member_id,
                self.settings.overpayment_policy,
            )
            .await?;
        info!(
            "Recorded payment {} of {} from {} on {} {} (credited {})",
            payment.id,
            payment.amount,
            payment.member_id,
            target.kind,
            target.id,
            payment.credited_amount
        );

        self.event_sink.emit(DomainEvent::payment_recorded(
            payment.member_id.clone(),
            payment.id.clone(),
        ));
        self.event_sink.emit(DomainEvent::obligations_changed(
            vec![payment.member_id.clone()],
            period.into_iter().collect(),
        ));
        if payment.credited_amount > Decimal::ZERO {
            self.event_sink
                .emit(DomainEvent::credit_changed(vec![payment.member_id.clone()]));
        }
        record_audit(
            self.audit_sink.as_ref(),
            NewAuditEntry::new(caller, "record", "payment", &payment.id).with_details(format!(
                "{} {} on {} {}",
                payment.amount, payment.method, target.kind, target.id
            )),
        )
        .await;
        Ok(payment)
    }

    fn list_member_payments(&self, caller: &Caller, member_id: &str) -> Result<Vec<Payment>> {
        caller.ensure_can_read_member(member_id)?;
        self.repository.list_for_member(member_id)
    }

    fn list_open_obligations(&self, caller: &Caller, member_id: &str) -> Result<OpenObligations> {
        caller.ensure_can_read_member(member_id)?;
        Ok(OpenObligations {
            debts: self.debt_repository.list_initial_debts(member_id, true)?,
            monthly_dues: self.obligation_repository.list_open_for_member(member_id)?,
            assistances: self.debt_repository.list_assistance_dues(member_id, true)?,
        })
    }
}
