//! API key repository.

use crate::error::MetadataResult;
use crate::models::ApiKeyRow;
use async_trait::async_trait;

/// Repository for opaque API keys.
#[async_trait]
pub trait ApiKeyRepo: Send + Sync {
    /// Create an API key.
    async fn create_api_key(&self, key: &ApiKeyRow) -> MetadataResult<()>;

    /// Get an API key by hash.
    async fn get_api_key_by_hash(&self, key_hash: &str) -> MetadataResult<Option<ApiKeyRow>>;
}
