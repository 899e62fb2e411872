use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::sync::Arc;

use super::model::{open_assistance_due, open_initial_debt, AssistanceDueDB, InitialDebtDB};
use crate::credits::ledger::settle_from_credit;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{assistance_dues, initial_debts};
use crate::utils::timestamp;
use dues_core::debts::{
    AssistanceDue, DebtRepositoryTrait, InitialDebt, NewAssistanceDue, NewInitialDebt,
};
use dues_core::obligations::ObligationStatus;
use dues_core::{Error, Result};

pub struct DebtRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl DebtRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

pub(crate) fn load_initial_debt(conn: &mut SqliteConnection, debt_id: &str) -> Result<InitialDebt> {
    initial_debts::table
        .find(debt_id)
        .select(InitialDebtDB::as_select())
        .first(conn)
        .optional()
        .map_err(StorageError::from)?
        .ok_or_else(|| Error::not_found("Initial debt", debt_id))?
        .try_into()
}

pub(crate) fn load_assistance_due(
    conn: &mut SqliteConnection,
    assistance_id: &str,
) -> Result<AssistanceDue> {
    assistance_dues::table
        .find(assistance_id)
        .select(AssistanceDueDB::as_select())
        .first(conn)
        .optional()
        .map_err(StorageError::from)?
        .ok_or_else(|| Error::not_found("Assistance due", assistance_id))?
        .try_into()
}

pub(crate) fn save_initial_debt(
    conn: &mut SqliteConnection,
    mut debt: InitialDebt,
) -> Result<InitialDebt> {
    debt.updated_at = timestamp();
    let row = InitialDebtDB::from(debt);
    diesel::update(initial_debts::table.find(&row.id))
        .set(&row)
        .returning(InitialDebtDB::as_returning())
        .get_result(conn)
        .map_err(StorageError::from)?
        .try_into()
}

pub(crate) fn save_assistance_due(
    conn: &mut SqliteConnection,
    mut assistance: AssistanceDue,
) -> Result<AssistanceDue> {
    assistance.updated_at = timestamp();
    let row = AssistanceDueDB::from(assistance);
    diesel::update(assistance_dues::table.find(&row.id))
        .set(&row)
        .returning(AssistanceDueDB::as_returning())
        .get_result(conn)
        .map_err(StorageError::from)?
        .try_into()
}

#[async_trait]
impl DebtRepositoryTrait for DebtRepository {
    fn get_initial_debt(&self, debt_id: &str) -> Result<InitialDebt> {
        let mut conn = get_connection(&self.pool)?;
        load_initial_debt(&mut conn, debt_id)
    }

    fn get_assistance_due(&self, assistance_id: &str) -> Result<AssistanceDue> {
        let mut conn = get_connection(&self.pool)?;
        load_assistance_due(&mut conn, assistance_id)
    }

    fn list_initial_debts(&self, member_id: &str, open_only: bool) -> Result<Vec<InitialDebt>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = initial_debts::table
            .filter(initial_debts::member_id.eq(member_id))
            .into_boxed();
        if open_only {
            query = query.filter(initial_debts::status.ne(ObligationStatus::Cancelled.as_str()));
        }
        let debts = query
            .order(initial_debts::created_at.asc())
            .select(InitialDebtDB::as_select())
            .load(&mut conn)
            .map_err(StorageError::from)?
            .into_iter()
            .map(InitialDebt::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(debts
            .into_iter()
            .filter(|d| !open_only || d.is_open())
            .collect())
    }

    fn list_assistance_dues(
        &self,
        member_id: &str,
        open_only: bool,
    ) -> Result<Vec<AssistanceDue>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = assistance_dues::table
            .filter(assistance_dues::member_id.eq(member_id))
            .into_boxed();
        if open_only {
            query =
                query.filter(assistance_dues::status.ne(ObligationStatus::Cancelled.as_str()));
        }
        let dues = query
            .order(assistance_dues::created_at.asc())
            .select(AssistanceDueDB::as_select())
            .load(&mut conn)
            .map_err(StorageError::from)?
            .into_iter()
            .map(AssistanceDue::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(dues
            .into_iter()
            .filter(|d| !open_only || d.is_open())
            .collect())
    }

    async fn create_initial_debt(
        &self,
        new_debt: NewInitialDebt,
        created_by: &str,
    ) -> Result<InitialDebt> {
        let created_by = created_by.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<InitialDebt> {
                let mut debt = open_initial_debt(new_debt, &created_by);
                settle_from_credit(conn, &mut debt)?;
                diesel::insert_into(initial_debts::table)
                    .values(InitialDebtDB::from(debt))
                    .returning(InitialDebtDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?
                    .try_into()
            })
            .await
    }

    async fn create_assistance_due(
        &self,
        new_assistance: NewAssistanceDue,
        created_by: &str,
    ) -> Result<AssistanceDue> {
        let created_by = created_by.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<AssistanceDue> {
                let mut assistance = open_assistance_due(new_assistance, &created_by);
                settle_from_credit(conn, &mut assistance)?;
                diesel::insert_into(assistance_dues::table)
                    .values(AssistanceDueDB::from(assistance))
                    .returning(AssistanceDueDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?
                    .try_into()
            })
            .await
    }
}
