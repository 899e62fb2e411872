//! Database models for period dues.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::utils::{new_id, parse_decimal, parse_enum, timestamp};
use dues_core::period_dues::{NewPeriodDue, PeriodDue, PeriodDueStatus};
use dues_core::Error;

#[derive(Queryable, Identifiable, Insertable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::period_dues)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PeriodDueDB {
    pub id: String,
    pub period: String,
    pub due_type_id: String,
    pub base_amount: String,
    pub beneficiary_member_id: Option<String>,
    pub due_date: NaiveDate,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<PeriodDueDB> for PeriodDue {
    type Error = Error;

    fn try_from(db: PeriodDueDB) -> Result<Self, Self::Error> {
        Ok(PeriodDue {
            period: db.period.parse()?,
            base_amount: parse_decimal(&db.base_amount, "base_amount")?,
            status: parse_enum(&db.status, "status")?,
            id: db.id,
            due_type_id: db.due_type_id,
            beneficiary_member_id: db.beneficiary_member_id,
            due_date: db.due_date,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

impl From<NewPeriodDue> for PeriodDueDB {
    fn from(domain: NewPeriodDue) -> Self {
        let now = timestamp();
        Self {
            id: new_id(),
            period: domain.period.key(),
            due_type_id: domain.due_type_id,
            base_amount: domain.base_amount.to_string(),
            beneficiary_member_id: domain.beneficiary_member_id,
            due_date: domain.due_date,
            status: PeriodDueStatus::Active.as_str().to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}
