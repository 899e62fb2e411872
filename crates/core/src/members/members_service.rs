use std::sync::Arc;

use async_trait::async_trait;
use log::debug;

use super::members_model::Member;
use super::members_traits::{MemberDirectoryTrait, MemberServiceTrait};
use crate::access::Caller;
use crate::audit::{record_audit, AuditSinkTrait, NewAuditEntry};
use crate::errors::Result;

/// Keeps the local member mirror in sync with the directory of record.
pub struct MemberService {
    directory: Arc<dyn MemberDirectoryTrait>,
    audit_sink: Arc<dyn AuditSinkTrait>,
}

impl MemberService {
    pub fn new(directory: Arc<dyn MemberDirectoryTrait>, audit_sink: Arc<dyn AuditSinkTrait>) -> Self {
        Self {
            directory,
            audit_sink,
        }
    }
}

#[async_trait]
impl MemberServiceTrait for MemberService {
    fn get_member(&self, caller: &Caller, member_id: &str) -> Result<Member> {
        caller.ensure_can_read_member(member_id)?;
        self.directory.get_member(member_id)
    }

    fn list_members(&self, caller: &Caller, active_only: bool) -> Result<Vec<Member>> {
        caller.ensure_admin()?;
        self.directory.list_members(active_only)
    }

    async fn upsert_member(&self, caller: &Caller, member: Member) -> Result<Member> {
        caller.ensure_admin()?;
        member.validate()?;

        debug!("Mirroring member {} ({})", member.id, member.display_name);
        let saved = self.directory.upsert_member(member).await?;
        record_audit(
            self.audit_sink.as_ref(),
            NewAuditEntry::new(caller, "upsert", "member", &saved.id).with_details(format!(
                "{} {} active={}",
                saved.display_name, saved.role, saved.is_active
            )),
        )
        .await;
        Ok(saved)
    }
}
