use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::debug;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::model::PaymentDB;
use crate::credits::ledger::book_movement;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::debts::repository::{
    load_assistance_due, load_initial_debt, save_assistance_due, save_initial_debt,
};
use crate::errors::StorageError;
use crate::obligations::repository::{load_obligation, save_obligation};
use crate::schema::payments;
use dues_core::credits::{CreditMovementKind, NewCreditMovement};
use dues_core::obligations::{ObligationKind, ObligationRef};
use dues_core::payments::{
    apply_payment, NewPayment, Payment, PaymentApplication, PaymentRepositoryTrait,
};
use dues_core::settings::OverpaymentPolicy;
use dues_core::{Error, Result};

pub struct PaymentRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl PaymentRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

/// Applies the payment to its target row and stores the target.
fn settle_target(
    conn: &mut SqliteConnection,
    target: &ObligationRef,
    member_id: &str,
    amount: Decimal,
    policy: OverpaymentPolicy,
) -> Result<PaymentApplication> {
    match target.kind {
        ObligationKind::MonthlyDue => {
            let mut obligation = load_obligation(conn, &target.id)?;
            let application = apply_payment(&mut obligation, member_id, amount, policy)?;
            save_obligation(conn, obligation)?;
            Ok(application)
        }
        ObligationKind::InitialDebt => {
            let mut debt = load_initial_debt(conn, &target.id)?;
            let application = apply_payment(&mut debt, member_id, amount, policy)?;
            save_initial_debt(conn, debt)?;
            Ok(application)
        }
        ObligationKind::Assistance => {
            let mut assistance = load_assistance_due(conn, &target.id)?;
            let application = apply_payment(&mut assistance, member_id, amount, policy)?;
            save_assistance_due(conn, assistance)?;
            Ok(application)
        }
    }
}

fn record_payment(
    conn: &mut SqliteConnection,
    new_payment: NewPayment,
    created_by: &str,
    policy: OverpaymentPolicy,
) -> Result<Payment> {
    let target = new_payment.validate()?;
    let member_id = new_payment.member_id.clone();
    let application = settle_target(conn, &target, &member_id, new_payment.amount, policy)?;
    debug!(
        "Payment from {} applied {} to {} {}",
        member_id, application.applied, target.kind, target.id
    );

    let payment: Payment = diesel::insert_into(payments::table)
        .values(PaymentDB::new(new_payment, application.credited, created_by))
        .returning(PaymentDB::as_returning())
        .get_result(conn)
        .map_err(StorageError::from)?
        .try_into()?;

    if application.credited > Decimal::ZERO {
        book_movement(
            conn,
            NewCreditMovement {
                member_id,
                amount: application.credited,
                kind: CreditMovementKind::Overpayment,
                obligation: Some(target),
                payment_id: Some(payment.id.clone()),
                note: None,
            },
        )?;
    }
    Ok(payment)
}

#[async_trait]
impl PaymentRepositoryTrait for PaymentRepository {
    fn get_by_id(&self, payment_id: &str) -> Result<Payment> {
        let mut conn = get_connection(&self.pool)?;
        payments::table
            .find(payment_id)
            .select(PaymentDB::as_select())
            .first(&mut conn)
            .optional()
            .map_err(StorageError::from)?
            .ok_or_else(|| Error::not_found("Payment", payment_id))?
            .try_into()
    }

    fn list_for_member(&self, member_id: &str) -> Result<Vec<Payment>> {
        let mut conn = get_connection(&self.pool)?;
        payments::table
            .filter(payments::member_id.eq(member_id))
            .order((payments::payment_date.desc(), payments::created_at.desc()))
            .select(PaymentDB::as_select())
            .load(&mut conn)
            .map_err(StorageError::from)?
            .into_iter()
            .map(Payment::try_from)
            .collect()
    }

    async fn record(
        &self,
        new_payment: NewPayment,
        created_by: &str,
        policy: OverpaymentPolicy,
    ) -> Result<Payment> {
        let created_by = created_by.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| {
                record_payment(conn, new_payment, &created_by, policy)
            })
            .await
    }
}
