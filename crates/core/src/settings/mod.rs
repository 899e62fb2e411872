//! Settings module - engine-wide policies.

mod settings_model;

pub use settings_model::{AssistancePolicy, EngineSettings, OverpaymentPolicy};
