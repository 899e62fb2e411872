use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::sync::Arc;

use super::model::MemberDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::members;
use dues_core::members::{Member, MemberDirectoryTrait};
use dues_core::{Error, Result};

pub struct MemberRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl MemberRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl MemberDirectoryTrait for MemberRepository {
    fn get_member(&self, member_id: &str) -> Result<Member> {
        let mut conn = get_connection(&self.pool)?;
        members::table
            .find(member_id)
            .select(MemberDB::as_select())
            .first(&mut conn)
            .optional()
            .map_err(StorageError::from)?
            .ok_or_else(|| Error::not_found("Member", member_id))?
            .try_into()
    }

    fn list_members(&self, active_only: bool) -> Result<Vec<Member>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = members::table.into_boxed();
        if active_only {
            query = query.filter(members::is_active.eq(true));
        }
        query
            .order((members::display_name.asc(), members::id.asc()))
            .select(MemberDB::as_select())
            .load(&mut conn)
            .map_err(StorageError::from)?
            .into_iter()
            .map(Member::try_from)
            .collect()
    }

    async fn upsert_member(&self, member: Member) -> Result<Member> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Member> {
                let row = MemberDB::from(member);
                let saved = diesel::insert_into(members::table)
                    .values(&row)
                    .on_conflict(members::id)
                    .do_update()
                    .set((
                        members::display_name.eq(&row.display_name),
                        members::role.eq(&row.role),
                        members::is_active.eq(row.is_active),
                        members::updated_at.eq(row.updated_at),
                    ))
                    .returning(MemberDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Member::try_from(saved)
            })
            .await
    }
}
