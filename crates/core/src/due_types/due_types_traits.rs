//! Due type repository and service traits.

use async_trait::async_trait;

use super::due_types_model::{DueType, DueTypeUpdate, NewDueType};
use crate::access::Caller;
use crate::errors::Result;

/// Trait defining the contract for due type persistence.
#[async_trait]
pub trait DueTypeRepositoryTrait: Send + Sync {
    /// Lists due types ordered by display order, then name.
    fn list(&self) -> Result<Vec<DueType>>;

    fn get_by_id(&self, due_type_id: &str) -> Result<DueType>;

    async fn create(&self, new_due_type: NewDueType) -> Result<DueType>;

    async fn update(&self, due_type_id: &str, update: DueTypeUpdate) -> Result<DueType>;

    /// Deletes a due type.
    ///
    /// Fails with `Error::Conflict` (carrying the dependent count) when any
    /// period due references the type. The check and the delete are atomic.
    async fn delete(&self, due_type_id: &str) -> Result<usize>;
}

/// Trait defining the contract for due type catalog operations.
#[async_trait]
pub trait DueTypeServiceTrait: Send + Sync {
    fn list_due_types(&self) -> Result<Vec<DueType>>;

    fn get_due_type(&self, due_type_id: &str) -> Result<DueType>;

    async fn create_due_type(&self, caller: &Caller, new_due_type: NewDueType) -> Result<DueType>;

    async fn update_due_type(
        &self,
        caller: &Caller,
        due_type_id: &str,
        update: DueTypeUpdate,
    ) -> Result<DueType>;

    async fn delete_due_type(&self, caller: &Caller, due_type_id: &str) -> Result<()>;
}
