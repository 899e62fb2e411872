//! Caller identity as seen by the engine.
//!
//! Authentication happens upstream; services only receive the resolved
//! caller and enforce role rules on it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    #[default]
    Member,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Member => "MEMBER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "MEMBER" => Ok(Role::Member),
            other => Err(Error::invalid(format!("Unknown role '{}'", other))),
        }
    }
}

/// The authenticated principal invoking an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Caller {
    pub member_id: String,
    pub role: Role,
}

impl Caller {
    pub fn new(member_id: impl Into<String>, role: Role) -> Self {
        Self {
            member_id: member_id.into(),
            role,
        }
    }

    pub fn admin(member_id: impl Into<String>) -> Self {
        Self::new(member_id, Role::Admin)
    }

    pub fn member(member_id: impl Into<String>) -> Self {
        Self::new(member_id, Role::Member)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Catalog, batch and ledger writes are administrator-only.
    pub fn ensure_admin(&self) -> Result<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(Error::Unauthorized(format!(
                "Member '{}' is not an administrator",
                self.member_id
            )))
        }
    }

    /// Members may only read their own records; administrators read everything.
    pub fn ensure_can_read_member(&self, member_id: &str) -> Result<()> {
        if self.is_admin() || self.member_id == member_id {
            Ok(())
        } else {
            Err(Error::Unauthorized(format!(
                "Member '{}' cannot read records of member '{}'",
                self.member_id, member_id
            )))
        }
    }
}
