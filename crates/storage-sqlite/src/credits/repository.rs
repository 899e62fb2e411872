use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::ledger::{book_movement, load_balance};
use super::model::{CreditMovementDB, MemberCreditDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{credit_movements, member_credits};
use dues_core::credits::{
    consume_credit, CreditAdjustment, CreditApplication, CreditMovement, CreditMovementKind,
    CreditRepositoryTrait, MemberCredit, NewCreditMovement,
};
use dues_core::Result;

pub struct CreditRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl CreditRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl CreditRepositoryTrait for CreditRepository {
    fn get_balance(&self, member_id: &str) -> Result<MemberCredit> {
        let mut conn = get_connection(&self.pool)?;
        let row = member_credits::table
            .find(member_id)
            .select(MemberCreditDB::as_select())
            .first(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        match row {
            Some(row) => row.try_into(),
            None => Ok(MemberCredit::empty(member_id)),
        }
    }

    fn list_movements(&self, member_id: &str) -> Result<Vec<CreditMovement>> {
        let mut conn = get_connection(&self.pool)?;
        credit_movements::table
            .filter(credit_movements::member_id.eq(member_id))
            .order((
                credit_movements::created_at.desc(),
                credit_movements::id.desc(),
            ))
            .select(CreditMovementDB::as_select())
            .load(&mut conn)
            .map_err(StorageError::from)?
            .into_iter()
            .map(CreditMovement::try_from)
            .collect()
    }

    async fn adjust_balance(
        &self,
        member_id: &str,
        adjustment: CreditAdjustment,
    ) -> Result<MemberCredit> {
        let member_id = member_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<MemberCredit> {
                book_movement(
                    conn,
                    NewCreditMovement {
                        member_id,
                        amount: adjustment.amount,
                        kind: CreditMovementKind::ManualAdjustment,
                        obligation: None,
                        payment_id: None,
                        note: adjustment.note,
                    },
                )?
                .try_into()
            })
            .await
    }

    async fn apply_credit(&self, member_id: &str, outstanding: Decimal) -> Result<CreditApplication> {
        let member_id = member_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<CreditApplication> {
                let balance = load_balance(conn, &member_id)?;
                let application = consume_credit(balance, outstanding);
                if application.consumed > Decimal::ZERO {
                    book_movement(
                        conn,
                        NewCreditMovement::consumption(&member_id, application.consumed, None),
                    )?;
                }
                Ok(application)
            })
            .await
    }
}
