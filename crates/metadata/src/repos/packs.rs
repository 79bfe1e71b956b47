//! Pack repository.

use crate::error::MetadataResult;
use crate::models::PackRow;
use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

/// Repository for packs.
#[async_trait]
pub trait PackRepo: Send + Sync {
    /// Get the pack with this (user, name), creating it if absent.
    ///
    /// Implemented as attempt-insert over the UNIQUE(user_id, name)
    /// constraint followed by a re-fetch, so concurrent callers converge
    /// on a single row.
    async fn get_or_create_pack(
        &self,
        user_id: Uuid,
        name: &str,
        now: OffsetDateTime,
    ) -> MetadataResult<PackRow>;

    /// Get a pack by ID.
    async fn get_pack(&self, pack_id: Uuid) -> MetadataResult<Option<PackRow>>;

    /// Count packs owned by a user.
    async fn count_packs_for_user(&self, user_id: Uuid) -> MetadataResult<u64>;
}
