use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::sync::Arc;

use super::model::DueTypeDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{due_types, period_dues};
use crate::utils::timestamp;
use dues_core::due_types::{DueType, DueTypeRepositoryTrait, DueTypeUpdate, NewDueType};
use dues_core::{Error, Result};

pub struct DueTypeRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl DueTypeRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

fn load_due_type(conn: &mut SqliteConnection, due_type_id: &str) -> Result<DueType> {
    due_types::table
        .find(due_type_id)
        .select(DueTypeDB::as_select())
        .first(conn)
        .optional()
        .map_err(StorageError::from)?
        .ok_or_else(|| Error::not_found("Due type", due_type_id))?
        .try_into()
}

#[async_trait]
impl DueTypeRepositoryTrait for DueTypeRepository {
    fn list(&self) -> Result<Vec<DueType>> {
        let mut conn = get_connection(&self.pool)?;
        due_types::table
            .order((due_types::display_order.asc(), due_types::name.asc()))
            .select(DueTypeDB::as_select())
            .load(&mut conn)
            .map_err(StorageError::from)?
            .into_iter()
            .map(DueType::try_from)
            .collect()
    }

    fn get_by_id(&self, due_type_id: &str) -> Result<DueType> {
        let mut conn = get_connection(&self.pool)?;
        load_due_type(&mut conn, due_type_id)
    }

    async fn create(&self, new_due_type: NewDueType) -> Result<DueType> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<DueType> {
                let row = DueTypeDB::from(new_due_type);
                diesel::insert_into(due_types::table)
                    .values(&row)
                    .returning(DueTypeDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?
                    .try_into()
            })
            .await
    }

    async fn update(&self, due_type_id: &str, update: DueTypeUpdate) -> Result<DueType> {
        let due_type_id = due_type_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<DueType> {
                let mut due_type = load_due_type(conn, &due_type_id)?;
                update.apply_to(&mut due_type);
                due_type.updated_at = timestamp();

                let row = DueTypeDB::from(due_type);
                diesel::update(due_types::table.find(&due_type_id))
                    .set(&row)
                    .returning(DueTypeDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?
                    .try_into()
            })
            .await
    }

    async fn delete(&self, due_type_id: &str) -> Result<usize> {
        let due_type_id = due_type_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let references: i64 = period_dues::table
                    .filter(period_dues::due_type_id.eq(&due_type_id))
                    .count()
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                if references > 0 {
                    return Err(Error::Conflict(format!(
                        "Due type '{}' is used by {} period entries; deactivate it instead",
                        due_type_id, references
                    )));
                }
                Ok(diesel::delete(due_types::table.find(&due_type_id))
                    .execute(conn)
                    .map_err(StorageError::from)?)
            })
            .await
    }
}
