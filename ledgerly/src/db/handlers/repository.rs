//! Base repository trait for owner-scoped database operations.

use crate::db::errors::Result;
use crate::types::UserId;

/// CRUD surface shared by the per-user finance entities.
///
/// Every method takes the owning user's id and folds it into the WHERE
/// clause, so a lookup for another user's row behaves exactly like a lookup
/// for a missing row. Handlers never need a separate ownership check.
#[async_trait::async_trait]
pub trait OwnedRepository {
    /// The request type for creating entities
    type CreateRequest;

    /// The request type for updating entities
    type UpdateRequest;

    /// The response/DTO type returned by operations
    type Response;

    /// The identifier type for lookups
    type Id: Send + Sync;

    /// The filter type for list operations
    type Filter: Send + Sync;

    /// Create a new entity owned by `owner`
    async fn create(&mut self, owner: UserId, request: &Self::CreateRequest) -> Result<Self::Response>;

    /// Get an entity by ID, if it exists and belongs to `owner`
    async fn get_by_id(&mut self, owner: UserId, id: Self::Id) -> Result<Option<Self::Response>>;

    /// List `owner`'s entities with filtering and ordering
    async fn list(&mut self, owner: UserId, filter: &Self::Filter) -> Result<Vec<Self::Response>>;

    /// Update an entity by ID; fails with NotFound if it is not `owner`'s
    async fn update(&mut self, owner: UserId, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response>;

    /// Delete an entity by ID, returning whether a row was removed
    async fn delete(&mut self, owner: UserId, id: Self::Id) -> Result<bool>;
}
