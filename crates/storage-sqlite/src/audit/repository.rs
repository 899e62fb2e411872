use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::sync::Arc;

use super::model::AuditEntryDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::audit_entries;
use dues_core::audit::{AuditEntry, AuditSinkTrait, NewAuditEntry};
use dues_core::Result;

pub struct AuditRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl AuditRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }

    /// History of one entity, oldest first.
    pub fn list_for_entity(&self, entity: &str, entity_id: &str) -> Result<Vec<AuditEntry>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(audit_entries::table
            .filter(audit_entries::entity.eq(entity))
            .filter(audit_entries::entity_id.eq(entity_id))
            .order(audit_entries::created_at.asc())
            .select(AuditEntryDB::as_select())
            .load(&mut conn)
            .into_core()?
            .into_iter()
            .map(AuditEntry::from)
            .collect())
    }
}

#[async_trait]
impl AuditSinkTrait for AuditRepository {
    async fn record(&self, entry: NewAuditEntry) -> Result<()> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::insert_into(audit_entries::table)
                    .values(AuditEntryDB::from(entry))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }
}
