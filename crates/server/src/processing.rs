//! Fire-and-forget processing dispatch.
//!
//! Ingestion hands finished sounds to a background worker over a bounded
//! channel. Dispatch and processing failures are logged and counted but
//! never surfaced to the uploader: a sound is considered ingested once it
//! sits at its canonical path, whatever the pipeline later decides.

use crate::metrics::PROCESSING_FAILURES;
use fonoteca_metadata::{MetadataResult, MetadataStore};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Queue depth. A full queue drops dispatches rather than blocking the
/// request path.
const QUEUE_CAPACITY: usize = 256;

/// Handle for dispatching sounds to the background processing worker.
#[derive(Clone)]
pub struct ProcessingQueue {
    tx: mpsc::Sender<i64>,
}

impl ProcessingQueue {
    /// Spawn the worker task and return a dispatch handle.
    pub fn spawn(metadata: Arc<dyn MetadataStore>) -> Self {
        let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
        tokio::spawn(worker(rx, metadata));
        Self { tx }
    }

    /// A queue whose worker never runs; every dispatch fails.
    ///
    /// **For testing only** — exercises the swallowed-failure contract.
    pub fn disabled() -> Self {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        Self { tx }
    }

    /// Dispatch a sound for processing. Never fails the caller.
    pub fn dispatch(&self, sound_id: i64) {
        if let Err(e) = self.tx.try_send(sound_id) {
            PROCESSING_FAILURES.inc();
            tracing::warn!(
                sound_id = sound_id,
                error = %e,
                "processing dispatch dropped"
            );
        }
    }
}

async fn worker(mut rx: mpsc::Receiver<i64>, metadata: Arc<dyn MetadataStore>) {
    while let Some(sound_id) = rx.recv().await {
        match process_sound(sound_id, metadata.as_ref()).await {
            Ok(()) => {
                tracing::debug!(sound_id = sound_id, "sound processed");
            }
            Err(e) => {
                PROCESSING_FAILURES.inc();
                tracing::error!(sound_id = sound_id, error = %e, "sound processing failed");
                if let Err(e) = metadata.update_processing_state(sound_id, "failed").await {
                    tracing::error!(
                        sound_id = sound_id,
                        error = %e,
                        "failed to record processing failure"
                    );
                }
            }
        }
    }
    tracing::debug!("processing worker stopped");
}

/// Stand-in for the external processing pipeline: verify the canonical
/// file is readable and mark the record processed. Transcoding and
/// analysis live outside this service.
async fn process_sound(sound_id: i64, metadata: &dyn MetadataStore) -> MetadataResult<()> {
    let Some(sound) = metadata.get_sound(sound_id).await? else {
        return Err(fonoteca_metadata::MetadataError::NotFound(format!(
            "sound {sound_id} not found"
        )));
    };

    tokio::fs::metadata(&sound.original_path)
        .await
        .map_err(|e| {
            fonoteca_metadata::MetadataError::Internal(format!(
                "canonical file unreadable at {}: {e}",
                sound.original_path
            ))
        })?;

    metadata.update_processing_state(sound_id, "ok").await
}
