//! Browser session repository.

use crate::error::MetadataResult;
use crate::models::SessionRow;
use async_trait::async_trait;
use uuid::Uuid;

/// Repository for cookie-backed sessions.
#[async_trait]
pub trait SessionRepo: Send + Sync {
    /// Create a session.
    async fn create_session(&self, session: &SessionRow) -> MetadataResult<()>;

    /// Get a session by hash.
    async fn get_session_by_hash(&self, session_hash: &str)
    -> MetadataResult<Option<SessionRow>>;

    /// Delete a session (logout).
    async fn delete_session(&self, session_id: Uuid) -> MetadataResult<()>;
}
