//! Domain events module.
//!
//! Provides domain event types and the sink trait for emitting events
//! after successful domain mutations. Runtime adapters implement the sink
//! to invalidate member-facing and admin-facing views.

mod domain_event;
mod sink;

pub use domain_event::*;
pub use sink::*;
