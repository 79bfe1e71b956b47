//! Configuration types shared across crates.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Enable the /metrics endpoint for Prometheus scraping (default: true).
    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_metrics_enabled() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            metrics_enabled: default_metrics_enabled(),
        }
    }
}

/// Metadata store configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MetadataConfig {
    /// SQLite database file path.
    #[serde(default = "default_metadata_path")]
    pub path: PathBuf,
}

fn default_metadata_path() -> PathBuf {
    PathBuf::from("./data/metadata.db")
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            path: default_metadata_path(),
        }
    }
}

/// Token and session lifetime configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Access token lifetime in seconds (default: 24 hours).
    #[serde(default = "default_access_token_lifetime_secs")]
    pub access_token_lifetime_secs: u64,
    /// Session cookie lifetime in seconds (default: 14 days).
    #[serde(default = "default_session_lifetime_secs")]
    pub session_lifetime_secs: u64,
}

fn default_access_token_lifetime_secs() -> u64 {
    86400
}

fn default_session_lifetime_secs() -> u64 {
    14 * 86400
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_lifetime_secs: default_access_token_lifetime_secs(),
            session_lifetime_secs: default_session_lifetime_secs(),
        }
    }
}

/// Filesystem roots for the upload pipeline.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Staging area: uploaded files land under `<uploads_root>/<user_id>/`.
    #[serde(default = "default_uploads_root")]
    pub uploads_root: PathBuf,
    /// Canonical storage: persisted sounds are moved under this root.
    #[serde(default = "default_sounds_root")]
    pub sounds_root: PathBuf,
}

fn default_uploads_root() -> PathBuf {
    PathBuf::from("./data/uploads")
}

fn default_sounds_root() -> PathBuf {
    PathBuf::from("./data/sounds")
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            uploads_root: default_uploads_root(),
            sounds_root: default_sounds_root(),
        }
    }
}

/// Which authorize-page template to render.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TemplateVariant {
    /// Stripped-down approval page for embedded webviews.
    Minimal,
    /// Regular approval page.
    #[default]
    Full,
}

/// Complete application configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Metadata store configuration.
    #[serde(default)]
    pub metadata: MetadataConfig,
    /// Token/session lifetimes.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Upload pipeline filesystem roots.
    #[serde(default)]
    pub ingest: IngestConfig,
    /// Authorize-page template selection.
    #[serde(default)]
    pub template_variant: TemplateVariant,
    /// Include I/O failure detail in server-error responses (default: false).
    /// Full detail is always logged regardless of this flag.
    #[serde(default)]
    pub debug_error_detail: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            metadata: MetadataConfig::default(),
            auth: AuthConfig::default(),
            ingest: IngestConfig::default(),
            template_variant: TemplateVariant::default(),
            debug_error_detail: false,
        }
    }
}

impl AppConfig {
    /// Create a test configuration with sensible defaults.
    ///
    /// **For testing only.** Callers are expected to override the
    /// filesystem roots and database path with temp directories.
    pub fn for_testing() -> Self {
        Self {
            debug_error_detail: true,
            ..Self::default()
        }
    }
}
