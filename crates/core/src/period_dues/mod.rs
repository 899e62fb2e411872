//! Period dues module - per-period instantiation of the due catalog.

mod period_dues_model;
mod period_dues_service;
mod period_dues_traits;

#[cfg(test)]
mod period_dues_service_tests;

pub use period_dues_model::{find_flat_fee_anchor, NewPeriodDue, PeriodDue, PeriodDueDetails, PeriodDueStatus};
pub use period_dues_service::PeriodDueService;
pub use period_dues_traits::{PeriodDueRepositoryTrait, PeriodDueServiceTrait};
