use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::collections::HashMap;
use std::sync::Arc;

use super::model::PeriodDueDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{due_types, members, period_dues};
use crate::utils::timestamp;
use dues_core::period_dues::{
    NewPeriodDue, PeriodDue, PeriodDueDetails, PeriodDueRepositoryTrait, PeriodDueStatus,
};
use dues_core::{Error, Period, Result};

pub struct PeriodDueRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl PeriodDueRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

fn load_period_due(conn: &mut SqliteConnection, period_due_id: &str) -> Result<PeriodDue> {
    period_dues::table
        .find(period_due_id)
        .select(PeriodDueDB::as_select())
        .first(conn)
        .optional()
        .map_err(StorageError::from)?
        .ok_or_else(|| Error::not_found("Period due", period_due_id))?
        .try_into()
}

#[async_trait]
impl PeriodDueRepositoryTrait for PeriodDueRepository {
    fn get_by_id(&self, period_due_id: &str) -> Result<PeriodDue> {
        let mut conn = get_connection(&self.pool)?;
        load_period_due(&mut conn, period_due_id)
    }

    /// Entries of the period in processing order: due type display order,
    /// then due type name.
    fn list_for_period(&self, period: &Period) -> Result<Vec<PeriodDueDetails>> {
        let mut conn = get_connection(&self.pool)?;
        let rows: Vec<(PeriodDueDB, String, i32, bool)> = period_dues::table
            .inner_join(due_types::table)
            .filter(period_dues::period.eq(period.key()))
            .order((
                due_types::display_order.asc(),
                due_types::name.asc(),
                period_dues::id.asc(),
            ))
            .select((
                PeriodDueDB::as_select(),
                due_types::name,
                due_types::display_order,
                due_types::requires_beneficiary,
            ))
            .load(&mut conn)
            .map_err(StorageError::from)?;

        let beneficiary_ids: Vec<String> = rows
            .iter()
            .filter_map(|(row, ..)| row.beneficiary_member_id.clone())
            .collect();
        let names: HashMap<String, String> = if beneficiary_ids.is_empty() {
            HashMap::new()
        } else {
            members::table
                .filter(members::id.eq_any(&beneficiary_ids))
                .select((members::id, members::display_name))
                .load::<(String, String)>(&mut conn)
                .map_err(StorageError::from)?
                .into_iter()
                .collect()
        };

        rows.into_iter()
            .map(|(row, due_type_name, display_order, requires_beneficiary)| {
                let beneficiary_name = row
                    .beneficiary_member_id
                    .as_ref()
                    .and_then(|id| names.get(id).cloned());
                Ok(PeriodDueDetails {
                    period_due: row.try_into()?,
                    due_type_name,
                    display_order,
                    requires_beneficiary,
                    beneficiary_name,
                })
            })
            .collect()
    }

    async fn create(&self, new_period_due: NewPeriodDue) -> Result<PeriodDue> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<PeriodDue> {
                let row = PeriodDueDB::from(new_period_due);
                diesel::insert_into(period_dues::table)
                    .values(&row)
                    .returning(PeriodDueDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?
                    .try_into()
            })
            .await
    }

    async fn cancel(&self, period_due_id: &str) -> Result<PeriodDue> {
        let period_due_id = period_due_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<PeriodDue> {
                let existing = load_period_due(conn, &period_due_id)?;
                if !existing.is_active() {
                    return Ok(existing);
                }
                diesel::update(period_dues::table.find(&period_due_id))
                    .set((
                        period_dues::status.eq(PeriodDueStatus::Cancelled.as_str()),
                        period_dues::updated_at.eq(timestamp()),
                    ))
                    .returning(PeriodDueDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?
                    .try_into()
            })
            .await
    }
}
