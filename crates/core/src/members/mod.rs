//! Members module - read model of the external member directory.

mod members_model;
mod members_service;
mod members_traits;

pub use members_model::Member;
pub use members_service::MemberService;
pub use members_traits::{MemberDirectoryTrait, MemberServiceTrait};
