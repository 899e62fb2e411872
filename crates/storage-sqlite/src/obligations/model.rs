//! Database models for member obligations.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use std::convert::TryFrom;

use crate::utils::{new_id, parse_decimal, parse_enum, timestamp};
use dues_core::obligations::{MemberObligation, NewMemberObligation};
use dues_core::Error;

#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::member_obligations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MemberObligationDB {
    pub id: String,
    pub period: String,
    pub year: i32,
    pub month: i32,
    pub due_type_id: String,
    pub member_id: String,
    pub amount_expected: String,
    pub amount_paid: String,
    pub amount_remaining: String,
    pub due_date: NaiveDate,
    pub status: String,
    pub description: String,
    pub source_period_due_id: String,
    pub created_by: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<MemberObligationDB> for MemberObligation {
    type Error = Error;

    fn try_from(db: MemberObligationDB) -> Result<Self, Self::Error> {
        Ok(MemberObligation {
            period: db.period.parse()?,
            year: db.year,
            month: db.month as u32,
            amount_expected: parse_decimal(&db.amount_expected, "amount_expected")?,
            amount_paid: parse_decimal(&db.amount_paid, "amount_paid")?,
            amount_remaining: parse_decimal(&db.amount_remaining, "amount_remaining")?,
            status: parse_enum(&db.status, "status")?,
            id: db.id,
            due_type_id: db.due_type_id,
            member_id: db.member_id,
            due_date: db.due_date,
            description: db.description,
            source_period_due_id: db.source_period_due_id,
            created_by: db.created_by,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

impl From<MemberObligation> for MemberObligationDB {
    fn from(domain: MemberObligation) -> Self {
        Self {
            id: domain.id,
            period: domain.period.key(),
            year: domain.year,
            month: domain.month as i32,
            due_type_id: domain.due_type_id,
            member_id: domain.member_id,
            amount_expected: domain.amount_expected.to_string(),
            amount_paid: domain.amount_paid.to_string(),
            amount_remaining: domain.amount_remaining.to_string(),
            due_date: domain.due_date,
            status: domain.status.as_str().to_string(),
            description: domain.description,
            source_period_due_id: domain.source_period_due_id,
            created_by: domain.created_by,
            created_at: domain.created_at,
            updated_at: domain.updated_at,
        }
    }
}

/// Builds the opening state of a generated obligation.
pub(crate) fn open_obligation(new: NewMemberObligation) -> MemberObligation {
    let settlement = new.settlement();
    let now = timestamp();
    MemberObligation {
        id: new_id(),
        period: new.period,
        year: new.period.year(),
        month: new.period.month(),
        due_type_id: new.due_type_id,
        member_id: new.member_id,
        amount_expected: settlement.amount_expected,
        amount_paid: settlement.amount_paid,
        amount_remaining: settlement.amount_remaining,
        due_date: new.due_date,
        status: settlement.status,
        description: new.description,
        source_period_due_id: new.source_period_due_id,
        created_by: new.created_by,
        created_at: now,
        updated_at: now,
    }
}
