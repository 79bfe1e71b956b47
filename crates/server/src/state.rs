//! Application state shared across handlers.

use crate::processing::ProcessingQueue;
use fonoteca_core::config::AppConfig;
use fonoteca_metadata::MetadataStore;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Metadata store.
    pub metadata: Arc<dyn MetadataStore>,
    /// Fire-and-forget processing dispatch.
    pub processor: ProcessingQueue,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        config: AppConfig,
        metadata: Arc<dyn MetadataStore>,
        processor: ProcessingQueue,
    ) -> Self {
        Self {
            config: Arc::new(config),
            metadata,
            processor,
        }
    }
}
