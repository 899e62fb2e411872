//! Access module - caller identity and role checks.

mod access_model;

pub use access_model::{Caller, Role};
