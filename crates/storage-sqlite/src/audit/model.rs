use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::utils::{new_id, timestamp};
use dues_core::audit::{AuditEntry, NewAuditEntry};

#[derive(Queryable, Identifiable, Insertable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::audit_entries)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AuditEntryDB {
    pub id: String,
    pub actor_id: String,
    pub action: String,
    pub entity: String,
    pub entity_id: String,
    pub details: Option<String>,
    pub created_at: NaiveDateTime,
}

impl From<NewAuditEntry> for AuditEntryDB {
    fn from(entry: NewAuditEntry) -> Self {
        Self {
            id: new_id(),
            actor_id: entry.actor_id,
            action: entry.action,
            entity: entry.entity,
            entity_id: entry.entity_id,
            details: entry.details,
            created_at: timestamp(),
        }
    }
}

impl From<AuditEntryDB> for AuditEntry {
    fn from(db: AuditEntryDB) -> Self {
        Self {
            id: db.id,
            actor_id: db.actor_id,
            action: db.action,
            entity: db.entity,
            entity_id: db.entity_id,
            details: db.details,
            created_at: db.created_at,
        }
    }
}
