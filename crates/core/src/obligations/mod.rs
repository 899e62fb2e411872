//! Obligations module - per-member period obligations, their generation and
//! the amount rules shared with every other kind of debt.

mod assignment_service;
mod calculator;
mod edit_window;
mod obligations_model;
mod obligations_service;
mod obligations_traits;
mod settlement;

#[cfg(test)]
mod assignment_service_tests;
#[cfg(test)]
mod obligations_service_tests;

pub use assignment_service::DueAssignmentService;
pub use calculator::{DueCalculatorTrait, DueComputation, DueLine, StandardDueCalculator};
pub use edit_window::{ensure_editable, is_within_edit_window};
pub use obligations_model::{
    BatchInsertOutcome, GenerationError, GenerationRequest, GenerationSummary, MemberObligation,
    NewMemberObligation, ObligationBatch, ObligationPatch, PatchOutcome,
};
pub use obligations_service::ObligationService;
pub use obligations_traits::{
    DueAssignmentServiceTrait, ObligationRepositoryTrait, ObligationServiceTrait,
};
pub use settlement::{
    derive_status, ObligationKind, ObligationRef, ObligationStatus, Settleable, Settlement,
};
