//! API client repository.

use crate::error::MetadataResult;
use crate::models::ApiClientRow;
use async_trait::async_trait;
use uuid::Uuid;

/// Repository for registered API clients.
#[async_trait]
pub trait ClientRepo: Send + Sync {
    /// Create a client.
    async fn create_client(&self, client: &ApiClientRow) -> MetadataResult<()>;

    /// Get a client by ID.
    async fn get_client(&self, client_id: Uuid) -> MetadataResult<Option<ApiClientRow>>;

    /// Get a client by its public client key.
    async fn get_client_by_key(&self, client_key: &str) -> MetadataResult<Option<ApiClientRow>>;
}
