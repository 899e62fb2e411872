//! Database models for one-off debts.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::utils::{new_id, parse_decimal, parse_enum, timestamp};
use dues_core::debts::{AssistanceDue, InitialDebt, NewAssistanceDue, NewInitialDebt};
use dues_core::obligations::Settlement;
use dues_core::Error;

#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::initial_debts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct InitialDebtDB {
    pub id: String,
    pub member_id: String,
    pub description: String,
    pub amount_expected: String,
    pub amount_paid: String,
    pub amount_remaining: String,
    pub status: String,
    pub created_by: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::assistance_dues)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AssistanceDueDB {
    pub id: String,
    pub member_id: String,
    pub beneficiary_member_id: Option<String>,
    pub description: String,
    pub amount_expected: String,
    pub amount_paid: String,
    pub amount_remaining: String,
    pub due_date: Option<NaiveDate>,
    pub status: String,
    pub created_by: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<InitialDebtDB> for InitialDebt {
    type Error = Error;

    fn try_from(db: InitialDebtDB) -> Result<Self, Self::Error> {
        Ok(InitialDebt {
            amount_expected: parse_decimal(&db.amount_expected, "amount_expected")?,
            amount_paid: parse_decimal(&db.amount_paid, "amount_paid")?,
            amount_remaining: parse_decimal(&db.amount_remaining, "amount_remaining")?,
            status: parse_enum(&db.status, "status")?,
            id: db.id,
            member_id: db.member_id,
            description: db.description,
            created_by: db.created_by,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

impl From<InitialDebt> for InitialDebtDB {
    fn from(domain: InitialDebt) -> Self {
        Self {
            id: domain.id,
            member_id: domain.member_id,
            description: domain.description,
            amount_expected: domain.amount_expected.to_string(),
            amount_paid: domain.amount_paid.to_string(),
            amount_remaining: domain.amount_remaining.to_string(),
            status: domain.status.as_str().to_string(),
            created_by: domain.created_by,
            created_at: domain.created_at,
            updated_at: domain.updated_at,
        }
    }
}

impl TryFrom<AssistanceDueDB> for AssistanceDue {
    type Error = Error;

    fn try_from(db: AssistanceDueDB) -> Result<Self, Self::Error> {
        Ok(AssistanceDue {
            amount_expected: parse_decimal(&db.amount_expected, "amount_expected")?,
            amount_paid: parse_decimal(&db.amount_paid, "amount_paid")?,
            amount_remaining: parse_decimal(&db.amount_remaining, "amount_remaining")?,
            status: parse_enum(&db.status, "status")?,
            id: db.id,
            member_id: db.member_id,
            beneficiary_member_id: db.beneficiary_member_id,
            description: db.description,
            due_date: db.due_date,
            created_by: db.created_by,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

impl From<AssistanceDue> for AssistanceDueDB {
    fn from(domain: AssistanceDue) -> Self {
        Self {
            id: domain.id,
            member_id: domain.member_id,
            beneficiary_member_id: domain.beneficiary_member_id,
            description: domain.description,
            amount_expected: domain.amount_expected.to_string(),
            amount_paid: domain.amount_paid.to_string(),
            amount_remaining: domain.amount_remaining.to_string(),
            due_date: domain.due_date,
            status: domain.status.as_str().to_string(),
            created_by: domain.created_by,
            created_at: domain.created_at,
            updated_at: domain.updated_at,
        }
    }
}

pub(crate) fn open_initial_debt(new: NewInitialDebt, created_by: &str) -> InitialDebt {
    let settlement = Settlement::new(new.amount);
    let now = timestamp();
    InitialDebt {
        id: new_id(),
        member_id: new.member_id,
        description: new.description.trim().to_string(),
        amount_expected: settlement.amount_expected,
        amount_paid: settlement.amount_paid,
        amount_remaining: settlement.amount_remaining,
        status: settlement.status,
        created_by: created_by.to_string(),
        created_at: now,
        updated_at: now,
    }
}

pub(crate) fn open_assistance_due(new: NewAssistanceDue, created_by: &str) -> AssistanceDue {
    let settlement = Settlement::new(new.amount);
    let now = timestamp();
    AssistanceDue {
        id: new_id(),
        member_id: new.member_id,
        beneficiary_member_id: new.beneficiary_member_id,
        description: new.description.trim().to_string(),
        amount_expected: settlement.amount_expected,
        amount_paid: settlement.amount_paid,
        amount_remaining: settlement.amount_remaining,
        due_date: new.due_date,
        status: settlement.status,
        created_by: created_by.to_string(),
        created_at: now,
        updated_at: now,
    }
}
