//! Payments module - payment recording and the open-obligation view.

mod payments_model;
mod payments_service;
mod payments_traits;


pub use payments_model::{
    apply_payment, NewPayment, OpenObligations, Payment, PaymentApplication, PaymentMethod,
};
pub use payments_service::PaymentService;
pub use payments_traits::{PaymentRepositoryTrait, PaymentServiceTrait};
