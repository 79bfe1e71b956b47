//! Access/refresh token repository.

use crate::error::MetadataResult;
use crate::models::{AccessTokenRow, RefreshTokenRow};
use async_trait::async_trait;
use uuid::Uuid;

/// Repository for OAuth2 token pairs.
#[async_trait]
pub trait TokenRepo: Send + Sync {
    /// Create an access token.
    async fn create_access_token(&self, token: &AccessTokenRow) -> MetadataResult<()>;

    /// Get an access token by ID.
    async fn get_access_token(&self, token_id: Uuid) -> MetadataResult<Option<AccessTokenRow>>;

    /// Get an access token by hash.
    async fn get_access_token_by_hash(
        &self,
        token_hash: &str,
    ) -> MetadataResult<Option<AccessTokenRow>>;

    /// Delete an access token. The refresh token bound to it is removed
    /// by the cascading foreign key.
    async fn delete_access_token(&self, token_id: Uuid) -> MetadataResult<()>;

    /// Count live access tokens for a (user, client) pair.
    async fn count_access_tokens(&self, user_id: Uuid, client_id: Uuid) -> MetadataResult<u64>;

    /// Create a refresh token bound to an existing access token.
    async fn create_refresh_token(&self, token: &RefreshTokenRow) -> MetadataResult<()>;

    /// Get a refresh token by hash.
    async fn get_refresh_token_by_hash(
        &self,
        token_hash: &str,
    ) -> MetadataResult<Option<RefreshTokenRow>>;

    /// Count live refresh tokens for a (user, client) pair.
    async fn count_refresh_tokens(&self, user_id: Uuid, client_id: Uuid) -> MetadataResult<u64>;

    /// Atomically replace a token pair: delete the old access token
    /// (cascading away its refresh token), then insert the new pair.
    /// Either everything lands or nothing does.
    async fn rotate_token_pair(
        &self,
        old_access_token_id: Uuid,
        new_access: &AccessTokenRow,
        new_refresh: &RefreshTokenRow,
    ) -> MetadataResult<()>;
}
