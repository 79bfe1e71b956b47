//! Database models mapping to the metadata schema.

use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

// =============================================================================
// Users and API clients
// =============================================================================

/// Registered platform user.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub user_id: Uuid,
    pub username: String,
    /// Argon2id PHC-format hash.
    pub password_hash: String,
    pub created_at: OffsetDateTime,
}

/// Registered API consumer. The owning user is the *developer* identity
/// exposed to handlers for requests authenticated through this client.
#[derive(Debug, Clone, FromRow)]
pub struct ApiClientRow {
    pub client_id: Uuid,
    pub user_id: Uuid,
    /// Public client identifier presented at the token endpoint.
    pub client_key: String,
    /// SHA-256 hex of the client secret.
    pub client_secret_hash: String,
    pub name: String,
    /// Per-client grant policy: password grants are rejected unless set.
    pub allow_password_grant: bool,
    /// Space-delimited scope names this client may be issued.
    pub scope: String,
    pub created_at: OffsetDateTime,
}

// =============================================================================
// Token pairs, API keys, sessions
// =============================================================================

/// Issued OAuth2 access token. Only the secret's hash is stored.
#[derive(Debug, Clone, FromRow)]
pub struct AccessTokenRow {
    pub token_id: Uuid,
    pub token_hash: String,
    pub user_id: Uuid,
    pub client_id: Uuid,
    /// Space-delimited granted scope names.
    pub scope: String,
    pub created_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
}

impl AccessTokenRow {
    /// Check the token has not expired.
    pub fn is_valid(&self, now: OffsetDateTime) -> bool {
        now < self.expires_at
    }
}

/// Refresh token, one-to-one with the access token it can renew.
/// The FK cascade deletes this row when its access token is deleted.
#[derive(Debug, Clone, FromRow)]
pub struct RefreshTokenRow {
    pub token_id: Uuid,
    pub token_hash: String,
    pub user_id: Uuid,
    pub client_id: Uuid,
    pub access_token_id: Uuid,
    pub created_at: OffsetDateTime,
}

/// Opaque API key. Authenticates the *developer* only; no resource owner.
#[derive(Debug, Clone, FromRow)]
pub struct ApiKeyRow {
    pub key_id: Uuid,
    pub key_hash: String,
    pub user_id: Uuid,
    pub name: String,
    pub created_at: OffsetDateTime,
}

/// Browser session backing cookie authentication.
#[derive(Debug, Clone, FromRow)]
pub struct SessionRow {
    pub session_id: Uuid,
    pub session_hash: String,
    pub user_id: Uuid,
    pub created_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
}

impl SessionRow {
    /// Check the session has not expired.
    pub fn is_valid(&self, now: OffsetDateTime) -> bool {
        now < self.expires_at
    }
}

// =============================================================================
// Sounds and their satellites
// =============================================================================

/// Available license.
#[derive(Debug, Clone, FromRow)]
pub struct LicenseRow {
    pub license_id: Uuid,
    pub name: String,
    pub deed_url: String,
}

/// Uploaded audio asset.
///
/// `sound_id` is a database-assigned integer rather than a UUID because
/// the canonical storage path embeds it in the filename slug, which must
/// be derived after insertion.
#[derive(Debug, Clone, FromRow)]
pub struct SoundRow {
    pub sound_id: i64,
    pub user_id: Uuid,
    /// Display name (declared `name` field, defaulting to the filename).
    pub original_filename: String,
    /// Current on-disk location: staging path until the relocation step
    /// persists the canonical path.
    pub original_path: String,
    pub filesize: i64,
    pub sound_type: String,
    /// Content fingerprint, unique across all sounds.
    pub md5: String,
    pub license_id: Uuid,
    pub pack_id: Option<Uuid>,
    pub geotag_id: Option<Uuid>,
    pub description: String,
    pub moderation_state: String,
    pub processing_state: String,
    pub num_downloads: i64,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Fields for inserting a provisional sound record (id not yet assigned).
#[derive(Debug, Clone)]
pub struct NewSoundRow {
    pub user_id: Uuid,
    pub original_filename: String,
    pub original_path: String,
    pub filesize: i64,
    pub sound_type: String,
    pub md5: String,
    pub license_id: Uuid,
    pub created_at: OffsetDateTime,
}

/// Named grouping of sounds owned by one user.
#[derive(Debug, Clone, FromRow)]
pub struct PackRow {
    pub pack_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub created_at: OffsetDateTime,
}

/// Geographic annotation attached to at most one sound at creation time.
#[derive(Debug, Clone, FromRow)]
pub struct GeoTagRow {
    pub geotag_id: Uuid,
    pub user_id: Uuid,
    pub lat: f64,
    pub lon: f64,
    pub zoom: i64,
    pub created_at: OffsetDateTime,
}
