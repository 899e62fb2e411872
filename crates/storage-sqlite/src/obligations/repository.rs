use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::{debug, info};
use rust_decimal::Decimal;
use std::sync::Arc;

use super::model::{open_obligation, MemberObligationDB};
use crate::credits::ledger::{book_movement, settle_from_credit};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::member_obligations;
use crate::utils::timestamp;
use dues_core::credits::{CreditMovementKind, NewCreditMovement};
use dues_core::obligations::{
    BatchInsertOutcome, MemberObligation, ObligationBatch, ObligationPatch,
    ObligationRepositoryTrait, ObligationStatus, Settleable,
};
use dues_core::settings::OverpaymentPolicy;
use dues_core::{Error, Period, Result};

pub struct ObligationRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl ObligationRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

pub(crate) fn load_obligation(
    conn: &mut SqliteConnection,
    obligation_id: &str,
) -> Result<MemberObligation> {
    member_obligations::table
        .find(obligation_id)
        .select(MemberObligationDB::as_select())
        .first(conn)
        .optional()
        .map_err(StorageError::from)?
        .ok_or_else(|| Error::not_found("Obligation", obligation_id))?
        .try_into()
}

pub(crate) fn save_obligation(
    conn: &mut SqliteConnection,
    mut obligation: MemberObligation,
) -> Result<MemberObligation> {
    obligation.updated_at = timestamp();
    let row = MemberObligationDB::from(obligation);
    diesel::update(member_obligations::table.find(&row.id))
        .set(&row)
        .returning(MemberObligationDB::as_returning())
        .get_result(conn)
        .map_err(StorageError::from)?
        .try_into()
}

fn to_domain(rows: Vec<MemberObligationDB>) -> Result<Vec<MemberObligation>> {
    rows.into_iter().map(MemberObligation::try_from).collect()
}

fn insert_batch(conn: &mut SqliteConnection, batch: ObligationBatch) -> Result<BatchInsertOutcome> {
    let period_key = batch.period.key();
    if !batch.allow_existing {
        let existing: i64 = member_obligations::table
            .filter(member_obligations::period.eq(&period_key))
            .filter(member_obligations::status.ne(ObligationStatus::Cancelled.as_str()))
            .count()
            .get_result(conn)
            .map_err(StorageError::from)?;
        if existing > 0 {
            return Err(Error::Conflict(format!(
                "Period {} already has {} obligations; resume the run to complete it",
                batch.period, existing
            )));
        }
    }

    let mut outcome = BatchInsertOutcome::default();
    for new in batch.obligations {
        let duplicate: i64 = member_obligations::table
            .filter(member_obligations::member_id.eq(&new.member_id))
            .filter(member_obligations::period.eq(&period_key))
            .count()
            .get_result(conn)
            .map_err(StorageError::from)?;
        if duplicate > 0 {
            debug!(
                "Skipping {} for {}: obligation already exists",
                new.member_id, batch.period
            );
            outcome.skipped_duplicates += 1;
            continue;
        }

        let mut obligation = open_obligation(new);
        if settle_from_credit(conn, &mut obligation)? > Decimal::ZERO {
            outcome.credit_applied_count += 1;
        }
        let stored: MemberObligation = diesel::insert_into(member_obligations::table)
            .values(MemberObligationDB::from(obligation))
            .returning(MemberObligationDB::as_returning())
            .get_result(conn)
            .map_err(StorageError::from)?
            .try_into()?;
        outcome.created.push(stored);
    }
    Ok(outcome)
}

#[async_trait]
impl ObligationRepositoryTrait for ObligationRepository {
    fn get_by_id(&self, obligation_id: &str) -> Result<MemberObligation> {
        let mut conn = get_connection(&self.pool)?;
        load_obligation(&mut conn, obligation_id)
    }

    fn list_for_period(&self, period: &Period) -> Result<Vec<MemberObligation>> {
        let mut conn = get_connection(&self.pool)?;
        to_domain(
            member_obligations::table
                .filter(member_obligations::period.eq(period.key()))
                .order(member_obligations::member_id.asc())
                .select(MemberObligationDB::as_select())
                .load(&mut conn)
                .map_err(StorageError::from)?,
        )
    }

    fn list_for_member(&self, member_id: &str) -> Result<Vec<MemberObligation>> {
        let mut conn = get_connection(&self.pool)?;
        to_domain(
            member_obligations::table
                .filter(member_obligations::member_id.eq(member_id))
                .order(member_obligations::period.desc())
                .select(MemberObligationDB::as_select())
                .load(&mut conn)
                .map_err(StorageError::from)?,
        )
    }

    fn list_open_for_member(&self, member_id: &str) -> Result<Vec<MemberObligation>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = member_obligations::table
            .filter(member_obligations::member_id.eq(member_id))
            .filter(member_obligations::status.ne(ObligationStatus::Cancelled.as_str()))
            .order((member_obligations::period.asc(), member_obligations::due_date.asc()))
            .select(MemberObligationDB::as_select())
            .load(&mut conn)
            .map_err(StorageError::from)?;
        Ok(to_domain(rows)?
            .into_iter()
            .filter(MemberObligation::is_open)
            .collect())
    }

    async fn insert_period_batch(&self, batch: ObligationBatch) -> Result<BatchInsertOutcome> {
        let period = batch.period;
        let requested = batch.obligations.len();
        let outcome = self
            .writer
            .exec(move |conn: &mut SqliteConnection| insert_batch(conn, batch))
            .await?;
        info!(
            "Stored {} of {} obligations for {} ({} duplicates skipped, {} settled from credit)",
            outcome.created.len(),
            requested,
            period,
            outcome.skipped_duplicates,
            outcome.credit_applied_count
        );
        Ok(outcome)
    }

    async fn update_with_patch(
        &self,
        obligation_id: &str,
        patch: ObligationPatch,
        policy: OverpaymentPolicy,
    ) -> Result<MemberObligation> {
        let obligation_id = obligation_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<MemberObligation> {
                let mut obligation = load_obligation(conn, &obligation_id)?;
                let outcome = patch.apply_to(&mut obligation, policy)?;

                if outcome.refund_to_credit > Decimal::ZERO {
                    book_movement(
                        conn,
                        NewCreditMovement {
                            member_id: obligation.member_id.clone(),
                            amount: outcome.refund_to_credit,
                            kind: CreditMovementKind::RepricingRefund,
                            obligation: Some(obligation.obligation_ref()),
                            payment_id: None,
                            note: None,
                        },
                    )?;
                }
                if outcome.amount_increased {
                    settle_from_credit(conn, &mut obligation)?;
                }
                // An explicit status wins over the one derived by settlement.
                if let Some(status) = patch.status {
                    obligation.status = status;
                }
                save_obligation(conn, obligation)
            })
            .await
    }

    async fn cancel(&self, obligation_id: &str) -> Result<MemberObligation> {
        let obligation_id = obligation_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<MemberObligation> {
                let mut obligation = load_obligation(conn, &obligation_id)?;
                if obligation.status == ObligationStatus::Cancelled {
                    return Ok(obligation);
                }
                if obligation.amount_paid > Decimal::ZERO {
                    return Err(Error::Precondition(format!(
                        "Obligation '{}' already received {} and cannot be cancelled",
                        obligation.id, obligation.amount_paid
                    )));
                }
                obligation.status = ObligationStatus::Cancelled;
                save_obligation(conn, obligation)
            })
            .await
    }

    async fn apply_member_credit(&self, obligation_id: &str) -> Result<MemberObligation> {
        let obligation_id = obligation_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<MemberObligation> {
                let mut obligation = load_obligation(conn, &obligation_id)?;
                if !obligation.is_open() {
                    return Err(Error::Precondition(format!(
                        "Obligation '{}' has nothing left to settle",
                        obligation.id
                    )));
                }
                settle_from_credit(conn, &mut obligation)?;
                save_obligation(conn, obligation)
            })
            .await
    }
}
