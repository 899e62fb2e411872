//! Database models for payments.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use rust_decimal::Decimal;

use crate::utils::{new_id, parse_decimal, parse_enum, timestamp};
use dues_core::payments::{NewPayment, Payment};
use dues_core::Error;

#[derive(Queryable, Identifiable, Insertable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::payments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PaymentDB {
    pub id: String,
    pub member_id: String,
    pub amount: String,
    pub payment_date: NaiveDate,
    pub method: String,
    pub reference: Option<String>,
    pub description: Option<String>,
    pub member_obligation_id: Option<String>,
    pub initial_debt_id: Option<String>,
    pub assistance_id: Option<String>,
    pub credited_amount: String,
    pub created_by: String,
    pub created_at: NaiveDateTime,
}

impl PaymentDB {
    pub fn new(payment: NewPayment, credited_amount: Decimal, created_by: &str) -> Self {
        Self {
            id: new_id(),
            member_id: payment.member_id,
            amount: payment.amount.to_string(),
            payment_date: payment.payment_date,
            method: payment.method.as_str().to_string(),
            reference: payment.reference,
            description: payment.description,
            member_obligation_id: payment.member_obligation_id,
            initial_debt_id: payment.initial_debt_id,
            assistance_id: payment.assistance_id,
            credited_amount: credited_amount.to_string(),
            created_by: created_by.to_string(),
            created_at: timestamp(),
        }
    }
}

impl TryFrom<PaymentDB> for Payment {
    type Error = Error;

    fn try_from(db: PaymentDB) -> Result<Self, Self::Error> {
        Ok(Payment {
            amount: parse_decimal(&db.amount, "amount")?,
            method: parse_enum(&db.method, "method")?,
            credited_amount: parse_decimal(&db.credited_amount, "credited_amount")?,
            id: db.id,
            member_id: db.member_id,
            payment_date: db.payment_date,
            reference: db.reference,
            description: db.description,
            member_obligation_id: db.member_obligation_id,
            initial_debt_id: db.initial_debt_id,
            assistance_id: db.assistance_id,
            created_by: db.created_by,
            created_at: db.created_at,
        })
    }
}
