//! Database models for due types.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::utils::{new_id, parse_decimal, timestamp};
use dues_core::due_types::{DueType, NewDueType};
use dues_core::Error;

#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::due_types)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct DueTypeDB {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub unit_amount: String,
    pub mandatory: bool,
    pub active: bool,
    pub display_order: i32,
    pub requires_beneficiary: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<DueTypeDB> for DueType {
    type Error = Error;

    fn try_from(db: DueTypeDB) -> Result<Self, Self::Error> {
        Ok(DueType {
            unit_amount: parse_decimal(&db.unit_amount, "unit_amount")?,
            id: db.id,
            name: db.name,
            description: db.description,
            mandatory: db.mandatory,
            active: db.active,
            display_order: db.display_order,
            requires_beneficiary: db.requires_beneficiary,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

impl From<DueType> for DueTypeDB {
    fn from(domain: DueType) -> Self {
        Self {
            id: domain.id,
            name: domain.name,
            description: domain.description,
            unit_amount: domain.unit_amount.to_string(),
            mandatory: domain.mandatory,
            active: domain.active,
            display_order: domain.display_order,
            requires_beneficiary: domain.requires_beneficiary,
            created_at: domain.created_at,
            updated_at: domain.updated_at,
        }
    }
}

impl From<NewDueType> for DueTypeDB {
    fn from(domain: NewDueType) -> Self {
        let now = timestamp();
        Self {
            id: new_id(),
            name: domain.name.trim().to_string(),
            description: domain.description,
            unit_amount: domain.unit_amount.to_string(),
            mandatory: domain.mandatory,
            active: domain.active,
            display_order: domain.display_order,
            requires_beneficiary: domain.requires_beneficiary,
            created_at: now,
            updated_at: now,
        }
    }
}
