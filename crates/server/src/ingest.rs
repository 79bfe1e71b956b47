//! Sound upload finalization.
//!
//! A strictly ordered, non-resumable procedure executed once per
//! finalization request: validate the declared fields, hash the staged
//! file, persist the provisional record, relocate the file to its
//! canonical path, attach pack/geotag metadata, and hand the result to
//! the processing queue.

use crate::error::{ApiError, ApiResult};
use crate::metrics::{DUPLICATE_UPLOADS, SOUNDS_INGESTED};
use crate::state::AppState;
use fonoteca_core::audio::detect_sound_type;
use fonoteca_core::geotag::GeoTagInput;
use fonoteca_core::hash::ContentHash;
use fonoteca_core::text::{canonical_sound_path, normalize_tags, validate_upload_filename};
use fonoteca_metadata::MetadataError;
use fonoteca_metadata::models::{GeoTagRow, NewSoundRow, SoundRow, UserRow};
use serde::Deserialize;
use std::path::Path;
use time::OffsetDateTime;
use tokio::fs;
use tokio::io::AsyncReadExt;
use uuid::Uuid;

/// Read buffer for streaming the staged file through the hasher (64 KiB).
const HASH_READ_BUFFER: usize = 64 * 1024;

/// Declared fields for a finalization request.
#[derive(Debug, Clone, Deserialize)]
pub struct SoundFields {
    /// Filename previously staged under the caller's upload directory.
    pub upload_filename: String,
    /// Display name; defaults to the upload filename.
    #[serde(default)]
    pub name: Option<String>,
    /// License name; must already exist.
    pub license: String,
    /// Optional pack name, created on first reference.
    #[serde(default)]
    pub pack: Option<String>,
    /// Optional "lat,lon,zoom" geotag.
    #[serde(default)]
    pub geotag: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Whitespace-delimited tag string.
    #[serde(default)]
    pub tags: Option<String>,
}

/// Build a server-error response for an I/O failure.
///
/// Detail is exposed only when `debug_error_detail` is set; the full
/// failure is always logged.
fn server_error(state: &AppState, context: &str, err: &std::io::Error) -> ApiError {
    tracing::error!(context = context, error = %err, "ingestion I/O failure");
    if state.config.debug_error_detail {
        ApiError::Internal(format!("{context}: {err}"))
    } else {
        ApiError::Internal("server error".to_string())
    }
}

/// Finalize a staged upload into a persisted sound.
pub async fn create_sound(
    state: &AppState,
    user: &UserRow,
    fields: SoundFields,
) -> ApiResult<SoundRow> {
    // Input validation happens before any side effect: a rejected request
    // leaves no partial record.
    validate_upload_filename(&fields.upload_filename)?;
    let display_name = match fields.name.as_deref() {
        Some(name) if !name.trim().is_empty() => name.to_string(),
        _ => fields.upload_filename.clone(),
    };
    let geotag_input = fields
        .geotag
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(GeoTagInput::parse)
        .transpose()?;

    let license = state
        .metadata
        .get_license_by_name(&fields.license)
        .await?
        .ok_or_else(|| ApiError::BadRequest(format!("unknown license: {}", fields.license)))?;

    // 1. Locate the staged file.
    let staging_path = state
        .config
        .ingest
        .uploads_root
        .join(user.user_id.to_string())
        .join(&fields.upload_filename);

    let file_meta = fs::metadata(&staging_path).await.map_err(|_| {
        ApiError::BadRequest(format!(
            "no staged upload named '{}' found",
            fields.upload_filename
        ))
    })?;

    // 2. + 3. Classify and hash the staged file in one pass.
    let (sound_type, md5) = hash_and_classify(state, &staging_path, &fields.upload_filename).await?;

    // 4. + 5. Persist the provisional record. The unique constraint on
    // md5 rejects duplicate content: remove the staged copy and report
    // the conflict; no record is created.
    let now = OffsetDateTime::now_utc();
    let new_sound = NewSoundRow {
        user_id: user.user_id,
        original_filename: display_name.clone(),
        original_path: staging_path.display().to_string(),
        filesize: file_meta.len() as i64,
        sound_type: sound_type.as_str().to_string(),
        md5: md5.to_hex(),
        license_id: license.license_id,
        created_at: now,
    };

    let sound_id = match state.metadata.create_sound(&new_sound).await {
        Ok(id) => id,
        Err(err @ MetadataError::AlreadyExists(_)) => {
            DUPLICATE_UPLOADS.inc();
            if let Err(e) = fs::remove_file(&staging_path).await {
                tracing::warn!(path = %staging_path.display(), error = %e, "failed to remove duplicate staged file");
            }
            return Err(ApiError::Conflict(format!(
                "sound could not be created: {err}"
            )));
        }
        Err(err) => return Err(err.into()),
    };

    // 6. Move to the canonical path derived from the assigned id.
    let canonical = canonical_sound_path(
        &state.config.ingest.sounds_root,
        sound_id,
        &user.username,
        &display_name,
        sound_type.as_str(),
    );
    if canonical != staging_path {
        if let Some(parent) = canonical.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| server_error(state, "could not create sound directory", &e))?;
        }
        move_file(&staging_path, &canonical)
            .await
            .map_err(|e| server_error(state, "file could not be moved to its destination", &e))?;
        state
            .metadata
            .update_sound_path(sound_id, &canonical.display().to_string(), now)
            .await?;
    }

    // 7. Attach the pack, creating it on first reference.
    if let Some(pack_name) = fields.pack.as_deref().filter(|s| !s.trim().is_empty()) {
        let pack = state
            .metadata
            .get_or_create_pack(user.user_id, pack_name, now)
            .await?;
        state.metadata.set_sound_pack(sound_id, pack.pack_id).await?;
    }

    // 8. Attach the geotag.
    if let Some(input) = geotag_input {
        let geotag = GeoTagRow {
            geotag_id: Uuid::new_v4(),
            user_id: user.user_id,
            lat: input.lat,
            lon: input.lon,
            zoom: input.zoom,
            created_at: now,
        };
        state.metadata.create_geotag(&geotag).await?;
        state
            .metadata
            .set_sound_geotag(sound_id, geotag.geotag_id)
            .await?;
    }

    // 9. Description and tags.
    state
        .metadata
        .update_sound_description(sound_id, fields.description.as_deref().unwrap_or(""), now)
        .await?;
    let tags = normalize_tags(fields.tags.as_deref().unwrap_or(""));
    state.metadata.set_sound_tags(sound_id, &tags).await?;

    // 10. Hand off to the processing pipeline. Failures there are not
    // this request's problem: the sound is ingested.
    state.processor.dispatch(sound_id);

    SOUNDS_INGESTED.inc();
    tracing::info!(
        sound_id = sound_id,
        user = %user.username,
        md5 = %new_sound.md5,
        "sound ingested"
    );

    let sound = state
        .metadata
        .get_sound(sound_id)
        .await?
        .ok_or_else(|| ApiError::Internal(format!("sound {sound_id} missing after ingest")))?;
    Ok(sound)
}

/// Stream the staged file once, classifying from the leading bytes and
/// hashing the whole content.
async fn hash_and_classify(
    state: &AppState,
    path: &Path,
    filename: &str,
) -> ApiResult<(fonoteca_core::SoundType, ContentHash)> {
    let mut file = fs::File::open(path)
        .await
        .map_err(|e| server_error(state, "content hash could not be computed", &e))?;

    let mut hasher = ContentHash::hasher();
    let mut header: Vec<u8> = Vec::new();
    let mut buf = vec![0u8; HASH_READ_BUFFER];
    loop {
        let n = file
            .read(&mut buf)
            .await
            .map_err(|e| server_error(state, "content hash could not be computed", &e))?;
        if n == 0 {
            break;
        }
        if header.len() < 16 {
            let take = (16 - header.len()).min(n);
            header.extend_from_slice(&buf[..take]);
        }
        hasher.update(&buf[..n]);
    }

    let sound_type = detect_sound_type(&header, filename)?;
    Ok((sound_type, hasher.finalize()))
}

/// Move a file, falling back to copy + unlink for cross-device moves.
async fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    match fs::rename(from, to).await {
        Ok(()) => Ok(()),
        Err(_) => {
            fs::copy(from, to).await?;
            fs::remove_file(from).await?;
            Ok(())
        }
    }
}
