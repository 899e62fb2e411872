//! Database models for members.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::utils::{parse_enum, timestamp};
use dues_core::members::Member;
use dues_core::Error;

#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::members)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MemberDB {
    pub id: String,
    pub display_name: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<MemberDB> for Member {
    type Error = Error;

    fn try_from(db: MemberDB) -> Result<Self, Self::Error> {
        Ok(Member {
            role: parse_enum(&db.role, "role")?,
            id: db.id,
            display_name: db.display_name,
            is_active: db.is_active,
        })
    }
}

impl From<Member> for MemberDB {
    fn from(domain: Member) -> Self {
        let now = timestamp();
        Self {
            id: domain.id,
            display_name: domain.display_name.trim().to_string(),
            role: domain.role.as_str().to_string(),
            is_active: domain.is_active,
            created_at: now,
            updated_at: now,
        }
    }
}
