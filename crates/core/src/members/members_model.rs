//! Member domain models.

use serde::{Deserialize, Serialize};

use crate::access::Role;
use crate::errors::{Error, Result};

/// A member as known to the dues engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    pub display_name: String,
    pub role: Role,
    pub is_active: bool,
}

impl Member {
    /// Active non-administrators owe dues.
    pub fn owes_dues(&self) -> bool {
        self.is_active && self.role != Role::Admin
    }

    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::invalid("Member id cannot be empty"));
        }
        if self.display_name.trim().is_empty() {
            return Err(Error::invalid("Member display name cannot be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(role: Role, is_active: bool) -> Member {
        Member {
            id: "m1".to_string(),
            display_name: "Awa Diop".to_string(),
            role,
            is_active,
        }
    }

    #[test]
    fn test_only_active_non_admins_owe_dues() {
        assert!(member(Role::Member, true).owes_dues());
        assert!(!member(Role::Member, false).owes_dues());
        assert!(!member(Role::Admin, true).owes_dues());
    }
}
