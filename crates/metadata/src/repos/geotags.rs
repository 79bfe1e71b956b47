//! Geotag repository.

use crate::error::MetadataResult;
use crate::models::GeoTagRow;
use async_trait::async_trait;
use uuid::Uuid;

/// Repository for geotags.
#[async_trait]
pub trait GeoTagRepo: Send + Sync {
    /// Create a geotag.
    async fn create_geotag(&self, geotag: &GeoTagRow) -> MetadataResult<()>;

    /// Get a geotag by ID.
    async fn get_geotag(&self, geotag_id: Uuid) -> MetadataResult<Option<GeoTagRow>>;
}
