use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::access::Caller;

/// A persisted audit trail entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: String,
    pub actor_id: String,
    pub action: String,
    pub entity: String,
    pub entity_id: String,
    pub details: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Input model for recording an audit entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAuditEntry {
    pub actor_id: String,
    pub action: String,
    pub entity: String,
    pub entity_id: String,
    pub details: Option<String>,
}

impl NewAuditEntry {
    pub fn new(caller: &Caller, action: &str, entity: &str, entity_id: &str) -> Self {
        Self {
            actor_id: caller.member_id.clone(),
            action: action.to_string(),
            entity: entity.to_string(),
            entity_id: entity_id.to_string(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}
