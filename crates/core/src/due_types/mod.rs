//! Due types module - catalog of recurring due templates.

mod due_types_model;
mod due_types_service;
mod due_types_traits;


pub use due_types_model::{DueType, DueTypeUpdate, NewDueType};
pub use due_types_service::DueTypeService;
pub use due_types_traits::{DueTypeRepositoryTrait, DueTypeServiceTrait};
