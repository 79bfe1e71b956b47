//! Prometheus metrics for the Fonoteca server.
//!
//! The `/metrics` endpoint is unauthenticated to allow Prometheus
//! scraping and should be network-restricted at the infrastructure level.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{self, Encoder, IntCounter, Registry, TextEncoder};
use std::sync::{LazyLock, Once};

/// Global Prometheus registry for all metrics.
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

pub static SOUNDS_INGESTED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "fonoteca_sounds_ingested_total",
        "Total number of sounds successfully ingested",
    )
    .expect("metric creation failed")
});

pub static DUPLICATE_UPLOADS: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "fonoteca_duplicate_uploads_total",
        "Total number of uploads rejected as duplicate content",
    )
    .expect("metric creation failed")
});

pub static SOUND_DOWNLOADS: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "fonoteca_sound_downloads_total",
        "Total number of sound downloads served",
    )
    .expect("metric creation failed")
});

pub static TOKENS_ISSUED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "fonoteca_tokens_issued_total",
        "Total number of access tokens issued via password grant",
    )
    .expect("metric creation failed")
});

pub static TOKENS_REFRESHED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "fonoteca_tokens_refreshed_total",
        "Total number of token pairs replaced via refresh grant",
    )
    .expect("metric creation failed")
});

pub static PROCESSING_FAILURES: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "fonoteca_processing_failures_total",
        "Total number of background processing failures (never surfaced to uploaders)",
    )
    .expect("metric creation failed")
});

static REGISTER: Once = Once::new();

/// Register all metrics with the global registry. Idempotent.
pub fn register_metrics() {
    REGISTER.call_once(|| {
        REGISTRY
            .register(Box::new(SOUNDS_INGESTED.clone()))
            .expect("register sounds_ingested");
        REGISTRY
            .register(Box::new(DUPLICATE_UPLOADS.clone()))
            .expect("register duplicate_uploads");
        REGISTRY
            .register(Box::new(SOUND_DOWNLOADS.clone()))
            .expect("register sound_downloads");
        REGISTRY
            .register(Box::new(TOKENS_ISSUED.clone()))
            .expect("register tokens_issued");
        REGISTRY
            .register(Box::new(TOKENS_REFRESHED.clone()))
            .expect("register tokens_refreshed");
        REGISTRY
            .register(Box::new(PROCESSING_FAILURES.clone()))
            .expect("register processing_failures");
    });
}

/// GET /metrics - Prometheus exposition endpoint.
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => (
            StatusCode::OK,
            [("content-type", encoder.format_type().to_string())],
            buffer,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
