use async_trait::async_trait;

use super::payments_model::{NewPayment, OpenObligations, Payment};
use crate::access::Caller;
use crate::errors::Result;
use crate::settings::OverpaymentPolicy;

/// Trait defining the contract for payment persistence.
#[async_trait]
pub trait PaymentRepositoryTrait: Send + Sync {
    fn get_by_id(&self, payment_id: &str) -> Result<Payment>;

    /// Payments of a member, most recent payment date first.
    fn list_for_member(&self, member_id: &str) -> Result<Vec<Payment>>;

    /// Inserts the payment and applies it to its target in one transaction.
    /// Any excess is booked as an overpayment credit movement.
    async fn record(
        &self,
        new_payment: NewPayment,
        created_by: &str,
        policy: OverpaymentPolicy,
    ) -> Result<Payment>;
}

/// Trait defining the contract for payment operations.
#[async_trait]
pub trait PaymentServiceTrait: Send + Sync {
    async fn record_payment(&self, caller: &Caller, new_payment: NewPayment) -> Result<Payment>;

    fn list_member_payments(&self, caller: &Caller, member_id: &str) -> Result<Vec<Payment>>;

    fn list_open_obligations(&self, caller: &Caller, member_id: &str) -> Result<OpenObligations>;
}
