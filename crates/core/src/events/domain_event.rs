//! Domain event types.

use serde::{Deserialize, Serialize};

/// Domain events emitted by core services after successful mutations.
///
/// These events represent facts about ledger changes. Runtime adapters
/// translate them into cache invalidation for the views that show them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    /// Due types were created, updated, or deleted.
    DueTypesChanged { due_type_ids: Vec<String> },

    /// The due catalog of one or more periods changed.
    PeriodCatalogChanged { periods: Vec<String> },

    /// Obligations were generated, edited, cancelled, or paid.
    ObligationsChanged {
        member_ids: Vec<String>,
        periods: Vec<String>,
    },

    /// A payment was recorded.
    PaymentRecorded {
        member_id: String,
        payment_id: String,
    },

    /// Credit balances moved.
    CreditChanged { member_ids: Vec<String> },
}

impl DomainEvent {
    /// Creates a DueTypesChanged event.
    pub fn due_types_changed(due_type_ids: Vec<String>) -> Self {
        Self::DueTypesChanged { due_type_ids }
    }

    /// Creates a PeriodCatalogChanged event.
    pub fn period_catalog_changed(periods: Vec<String>) -> Self {
        Self::PeriodCatalogChanged { periods }
    }

    /// Creates an ObligationsChanged event.
    pub fn obligations_changed(member_ids: Vec<String>, periods: Vec<String>) -> Self {
        Self::ObligationsChanged {
            member_ids,
            periods,
        }
    }

    /// Creates a PaymentRecorded event.
    pub fn payment_recorded(member_id: String, payment_id: String) -> Self {
        Self::PaymentRecorded {
            member_id,
            payment_id,
        }
    }

    /// Creates a CreditChanged event.
    pub fn credit_changed(member_ids: Vec<String>) -> Self {
        Self::CreditChanged { member_ids }
    }
}
