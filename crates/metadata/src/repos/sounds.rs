//! Sound repository.

use crate::error::MetadataResult;
use crate::models::{NewSoundRow, SoundRow};
use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

/// Repository for sound records and their tag sets.
#[async_trait]
pub trait SoundRepo: Send + Sync {
    /// Insert a provisional sound record and return its assigned id.
    ///
    /// The UNIQUE constraint on `md5` rejects duplicate content; callers
    /// receive `MetadataError::AlreadyExists` rather than a raw database
    /// error in that case.
    async fn create_sound(&self, sound: &NewSoundRow) -> MetadataResult<i64>;

    /// Get a sound by ID.
    async fn get_sound(&self, sound_id: i64) -> MetadataResult<Option<SoundRow>>;

    /// Persist a relocated on-disk path.
    async fn update_sound_path(
        &self,
        sound_id: i64,
        path: &str,
        updated_at: OffsetDateTime,
    ) -> MetadataResult<()>;

    /// Attach a pack.
    async fn set_sound_pack(&self, sound_id: i64, pack_id: Uuid) -> MetadataResult<()>;

    /// Attach a geotag.
    async fn set_sound_geotag(&self, sound_id: i64, geotag_id: Uuid) -> MetadataResult<()>;

    /// Set the description.
    async fn update_sound_description(
        &self,
        sound_id: i64,
        description: &str,
        updated_at: OffsetDateTime,
    ) -> MetadataResult<()>;

    /// Replace the tag set. Duplicate tags collapse on the store's
    /// composite primary key.
    async fn set_sound_tags(&self, sound_id: i64, tags: &[String]) -> MetadataResult<()>;

    /// Get the tag set, sorted.
    async fn get_sound_tags(&self, sound_id: i64) -> MetadataResult<Vec<String>>;

    /// Update the processing state.
    async fn update_processing_state(&self, sound_id: i64, state: &str) -> MetadataResult<()>;

    /// Increment the download counter and return the new value.
    async fn increment_downloads(&self, sound_id: i64) -> MetadataResult<i64>;

    /// Total number of sound records.
    async fn count_sounds(&self) -> MetadataResult<u64>;
}
