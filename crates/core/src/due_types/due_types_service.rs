use std::sync::Arc;

use async_trait::async_trait;
use log::debug;

use super::due_types_model::{DueType, DueTypeUpdate, NewDueType};
use super::due_types_traits::{DueTypeRepositoryTrait, DueTypeServiceTrait};
use crate::access::Caller;
use crate::audit::{record_audit, AuditSinkTrait, NewAuditEntry};
use crate::errors::{Error, Result};
use crate::events::{DomainEvent, DomainEventSink};

/// Service for managing the due type catalog.
pub struct DueTypeService {
    repository: Arc<dyn DueTypeRepositoryTrait>,
    event_sink: Arc<dyn DomainEventSink>,
    audit_sink: Arc<dyn AuditSinkTrait>,
}

impl DueTypeService {
    pub fn new(
        repository: Arc<dyn DueTypeRepositoryTrait>,
        event_sink: Arc<dyn DomainEventSink>,
        audit_sink: Arc<dyn AuditSinkTrait>,
    ) -> Self {
        Self {
            repository,
            event_sink,
            audit_sink,
        }
    }
}

#[async_trait]
impl DueTypeServiceTrait for DueTypeService {
    fn list_due_types(&self) -> Result<Vec<DueType>> {
        self.repository.list()
    }

    fn get_due_type(&self, due_type_id: &str) -> Result<DueType> {
        self.repository.get_by_id(due_type_id)
    }

    async fn create_due_type(&self, caller: &Caller, new_due_type: NewDueType) -> Result<DueType> {
        caller.ensure_admin()?;
        new_due_type.validate()?;
        debug!("Creating due type '{}'", new_due_type.name);

        let created = self.repository.create(new_due_type).await?;

        self.event_sink
            .emit(DomainEvent::due_types_changed(vec![created.id.clone()]));
        record_audit(
            self.audit_sink.as_ref(),
            NewAuditEntry::new(caller, "create", "due_type", &created.id)
                .with_details(format!("{} {}", created.name, created.unit_amount)),
        )
        .await;
        Ok(created)
    }

    async fn update_due_type(
        &self,
        caller: &Caller,
        due_type_id: &str,
        update: DueTypeUpdate,
    ) -> Result<DueType> {
        caller.ensure_admin()?;
        update.validate()?;
        if update.is_empty() {
            return self.repository.get_by_id(due_type_id);
        }

        let updated = self.repository.update(due_type_id, update).await?;

        self.event_sink
            .emit(DomainEvent::due_types_changed(vec![updated.id.clone()]));
        record_audit(
            self.audit_sink.as_ref(),
            NewAuditEntry::new(caller, "update", "due_type", &updated.id),
        )
        .await;
        Ok(updated)
    }

    async fn delete_due_type(&self, caller: &Caller, due_type_id: &str) -> Result<()> {
        caller.ensure_admin()?;

        let deleted = self.repository.delete(due_type_id).await?;
        if deleted == 0 {
            return Err(Error::not_found("Due type", due_type_id));
        }

        self.event_sink
            .emit(DomainEvent::due_types_changed(vec![due_type_id.to_string()]));
        record_audit(
            self.audit_sink.as_ref(),
            NewAuditEntry::new(caller, "delete", "due_type", due_type_id),
        )
        .await;
        Ok(())
    }
}
