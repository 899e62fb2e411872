use async_trait::async_trait;

use super::members_model::Member;
use crate::access::Caller;
use crate::errors::Result;

/// Read access to the member directory, plus the mirror upsert used to keep
/// the local copy in sync with the directory of record.
#[async_trait]
pub trait MemberDirectoryTrait: Send + Sync {
    fn get_member(&self, member_id: &str) -> Result<Member>;

    /// Lists members ordered by display name.
    fn list_members(&self, active_only: bool) -> Result<Vec<Member>>;

    async fn upsert_member(&self, member: Member) -> Result<Member>;
}

#[async_trait]
pub trait MemberServiceTrait: Send + Sync {
    fn get_member(&self, caller: &Caller, member_id: &str) -> Result<Member>;

    fn list_members(&self, caller: &Caller, active_only: bool) -> Result<Vec<Member>>;

    async fn upsert_member(&self, caller: &Caller, member: Member) -> Result<Member>;
}
