use std::sync::Arc;

use async_trait::async_trait;
use log::info;
use rust_decimal::Decimal;

use super::credits_model::{CreditAdjustment, CreditApplication, CreditSummary, MemberCredit};
use super::credits_traits::{CreditRepositoryTrait, CreditServiceTrait};
use crate::access::Caller;
use crate::audit::{record_audit, AuditSinkTrait, NewAuditEntry};
use crate::errors::{Error, Result};
use crate::events::{DomainEvent, DomainEventSink};
use crate::members::MemberDirectoryTrait;

/// Service for member credit balances.
pub struct CreditService {
    repository: Arc<dyn CreditRepositoryTrait>,
    member_directory: Arc<dyn MemberDirectoryTrait>,
    event_sink: Arc<dyn DomainEventSink>,
    audit_sink: Arc<dyn AuditSinkTrait>,
}

impl CreditService {
    pub fn new(
        repository: Arc<dyn CreditRepositoryTrait>,
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
}

#[async_trait]
impl CreditServiceTrait for CreditService {
    fn get_credit(&self, caller: &Caller, member_id: &str) -> Result<CreditSummary> {
        caller.ensure_can_read_member(member_id)?;
        Ok(CreditSummary {
            credit: self.repository.get_balance(member_id)?,
            movements: self.repository.list_movements(member_id)?,
        })
    }

    async fn adjust_credit(
        &self,
        caller: &Caller,
        member_id: &str,
        adjustment: CreditAdjustment,
    ) -> Result<MemberCredit> {
        caller.ensure_admin()?;
        adjustment.validate()?;
        self.ensure_member_exists(member_id)?;

        let amount = adjustment.amount;
        let note = adjustment.note.clone();
        let credit = self.repository.adjust_balance(member_id, adjustment).await?;
        info!(
            "Adjusted credit of {} by {}, balance now {}",
            member_id, amount, credit.balance
        );

        self.event_sink
            .emit(DomainEvent::credit_changed(vec![member_id.to_string()]));
        let details = match note {
            Some(note) => format!("{} ({})", amount, note),
            None => amount.to_string(),
        };
        record_audit(
            self.audit_sink.as_ref(),
            NewAuditEntry::new(caller, "adjust", "member_credit", member_id).with_details(details),
        )
        .await;
        Ok(credit)
    }

    async fn apply_credit(
        &self,
        caller: &Caller,
        member_id: &str,
        outstanding: Decimal,
    ) -> Result<CreditApplication> {
        caller.ensure_admin()?;
        if outstanding < Decimal::ZERO {
            return Err(Error::invalid(format!(
                "Outstanding amount cannot be negative, got {}",
                outstanding
            )));
        }

        let application = self.repository.apply_credit(member_id, outstanding).await?;
        if application.consumed > Decimal::ZERO {
            self.event_sink
                .emit(DomainEvent::credit_changed(vec![member_id.to_string()]));
            record_audit(
                self.audit_sink.as_ref(),
                NewAuditEntry::new(caller, "consume", "member_credit", member_id)
                    .with_details(application.consumed.to_string()),
            )
            .await;
        }
        Ok(application)
    }
}
