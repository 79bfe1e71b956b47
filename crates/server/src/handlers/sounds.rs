//! Sound endpoints: upload finalization, retrieval, download.

use crate::auth::auth_context;
use crate::error::{ApiError, ApiResult};
use crate::ingest::{self, SoundFields};
use crate::metrics::SOUND_DOWNLOADS;
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, Request, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use fonoteca_core::SoundType;
use fonoteca_metadata::models::SoundRow;
use serde::Serialize;
use time::format_description::well_known::Rfc3339;

/// Maximum request body size for finalization requests (64 KiB).
/// The audio itself is staged beforehand; this body is metadata only.
const MAX_FINALIZE_BODY_SIZE: usize = 64 * 1024;

/// Geotag fields in a sound response.
#[derive(Debug, Serialize)]
pub struct GeoTagResponse {
    pub lat: f64,
    pub lon: f64,
    pub zoom: i64,
}

/// Public representation of a sound.
#[derive(Debug, Serialize)]
pub struct SoundResponse {
    pub id: i64,
    pub name: String,
    pub sound_type: String,
    pub filesize: i64,
    pub md5: String,
    pub license: String,
    pub pack: Option<String>,
    pub geotag: Option<GeoTagResponse>,
    pub description: String,
    pub tags: Vec<String>,
    pub num_downloads: i64,
    pub processing_state: String,
    pub created_at: String,
}

async fn sound_response(state: &AppState, sound: SoundRow) -> ApiResult<SoundResponse> {
    let license = state
        .metadata
        .get_license(sound.license_id)
        .await?
        .map(|l| l.name)
        .unwrap_or_default();

    let pack = match sound.pack_id {
        Some(pack_id) => state.metadata.get_pack(pack_id).await?.map(|p| p.name),
        None => None,
    };

    let geotag = match sound.geotag_id {
        Some(geotag_id) => {
            state
                .metadata
                .get_geotag(geotag_id)
                .await?
                .map(|g| GeoTagResponse {
                    lat: g.lat,
                    lon: g.lon,
                    zoom: g.zoom,
                })
        }
        None => None,
    };

    let tags = state.metadata.get_sound_tags(sound.sound_id).await?;

    let created_at = sound
        .created_at
        .format(&Rfc3339)
        .map_err(|e| ApiError::Internal(format!("failed to format created_at: {e}")))?;

    Ok(SoundResponse {
        id: sound.sound_id,
        name: sound.original_filename,
        sound_type: sound.sound_type,
        filesize: sound.filesize,
        md5: sound.md5,
        license,
        pack,
        geotag,
        description: sound.description,
        tags,
        num_downloads: sound.num_downloads,
        processing_state: sound.processing_state,
        created_at,
    })
}

/// POST /v1/sounds - Finalize a staged upload into a persisted sound.
///
/// Write-gated in the router; additionally requires a resolved resource
/// owner, so API-key and anonymous callers never reach the pipeline.
pub async fn finalize_upload(
    State(state): State<AppState>,
    req: Request,
) -> ApiResult<(StatusCode, Json<SoundResponse>)> {
    let context = auth_context(&req)?.clone();
    let user_id = context.require_user()?;
    let user = state
        .metadata
        .get_user(user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("unknown user".to_string()))?;

    let fields: SoundFields = {
        let bytes = axum::body::to_bytes(req.into_body(), MAX_FINALIZE_BODY_SIZE)
            .await
            .map_err(|e| ApiError::BadRequest(format!("failed to read body: {e}")))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| ApiError::BadRequest(format!("invalid JSON: {e}")))?
    };

    let sound = ingest::create_sound(&state, &user, fields).await?;
    let response = sound_response(&state, sound).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /v1/sounds/{sound_id} - Retrieve a sound.
pub async fn get_sound(
    State(state): State<AppState>,
    Path(sound_id): Path<i64>,
) -> ApiResult<Json<SoundResponse>> {
    let sound = state
        .metadata
        .get_sound(sound_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("sound {sound_id} not found")))?;
    Ok(Json(sound_response(&state, sound).await?))
}

/// GET /v1/sounds/{sound_id}/download - Serve the audio file and count
/// the download.
pub async fn download_sound(
    State(state): State<AppState>,
    Path(sound_id): Path<i64>,
) -> ApiResult<Response> {
    let sound = state
        .metadata
        .get_sound(sound_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("sound {sound_id} not found")))?;

    let bytes = tokio::fs::read(&sound.original_path).await.map_err(|e| {
        tracing::error!(sound_id = sound_id, path = %sound.original_path, error = %e, "sound file unreadable");
        if state.config.debug_error_detail {
            ApiError::Internal(format!("sound file unreadable: {e}"))
        } else {
            ApiError::Internal("server error".to_string())
        }
    })?;

    state.metadata.increment_downloads(sound_id).await?;
    SOUND_DOWNLOADS.inc();

    let mime = SoundType::parse(&sound.sound_type)
        .map(|t| t.mime_type())
        .unwrap_or("application/octet-stream");
    let filename = std::path::Path::new(&sound.original_path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("sound")
        .to_string();

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, mime.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}
