//! HTTP API server for the Fonoteca audio-sharing platform.
//!
//! This crate provides the HTTP control plane:
//! - OAuth2 token endpoint (password and refresh grants)
//! - Authorize page rendering
//! - Three-strategy request authentication and write gating
//! - Sound upload finalization (the ingestion pipeline)
//! - Sound retrieval and download
//! - Background processing dispatch

pub mod auth;
pub mod error;
pub mod handlers;
pub mod ingest;
pub mod metrics;
pub mod processing;
pub mod routes;
pub mod state;

pub use auth::{AuthContext, AuthMethod};
pub use error::ApiError;
pub use processing::ProcessingQueue;
pub use routes::create_router;
pub use state::AppState;
