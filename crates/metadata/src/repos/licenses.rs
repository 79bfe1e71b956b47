//! License repository.

use crate::error::MetadataResult;
use crate::models::LicenseRow;
use async_trait::async_trait;
use uuid::Uuid;

/// Repository for licenses.
#[async_trait]
pub trait LicenseRepo: Send + Sync {
    /// Create a license.
    async fn create_license(&self, license: &LicenseRow) -> MetadataResult<()>;

    /// Get a license by ID.
    async fn get_license(&self, license_id: Uuid) -> MetadataResult<Option<LicenseRow>>;

    /// Get a license by name.
    async fn get_license_by_name(&self, name: &str) -> MetadataResult<Option<LicenseRow>>;
}
