//! Core domain types and shared logic for the Fonoteca API backend.
//!
//! This crate defines the canonical data model used across all other crates:
//! - OAuth scopes and scope filtering
//! - Opaque credential secrets and their storage hashes
//! - Content hashing for uploaded audio
//! - Sound type detection and canonical path derivation
//! - Geotag parsing and tag normalization
//! - Application configuration

pub mod audio;
pub mod config;
pub mod error;
pub mod geotag;
pub mod hash;
pub mod scope;
pub mod text;
pub mod token;

pub use audio::SoundType;
pub use error::{Error, Result};
pub use geotag::GeoTagInput;
pub use hash::{ContentHash, ContentHasher};
pub use scope::{Scope, ScopeSet};
pub use token::{BearerTokenResponse, generate_token_secret, hash_token_secret};

/// Sounds are grouped on disk in directories of this many ids each.
pub const SOUND_PATH_BUCKET_SIZE: i64 = 1000;
