//! Slug derivation, canonical path construction and tag normalization.

use std::path::{Path, PathBuf};

use crate::SOUND_PATH_BUCKET_SIZE;

/// Validate an upload filename as a single safe path component.
///
/// Rejects empty names, path separators and `..` so that a declared
/// filename can never escape the caller's staging directory.
pub fn validate_upload_filename(filename: &str) -> crate::Result<()> {
    if filename.is_empty() {
        return Err(crate::Error::InvalidFilename("empty filename".to_string()));
    }
    if filename.contains('/') || filename.contains('\\') || filename == "." || filename == ".." {
        return Err(crate::Error::InvalidFilename(format!(
            "unsafe path component: {filename}"
        )));
    }
    Ok(())
}

/// The filesystem slug a persisted sound is named after:
/// `<id>__<slug(username)>__<slug(basename without extension)>`.
pub fn sound_filename_slug(sound_id: i64, username: &str, original_filename: &str) -> String {
    let stem = Path::new(original_filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(original_filename);
    format!(
        "{}__{}__{}",
        sound_id,
        slug::slugify(username),
        slug::slugify(stem)
    )
}

/// Derive the canonical storage path of a persisted sound.
///
/// Sounds are bucketed by id to keep directory fan-out bounded. The slug
/// source has any trailing extension stripped; the stored extension is
/// re-attached by path construction (the display name may carry none).
pub fn canonical_sound_path(
    sounds_root: &Path,
    sound_id: i64,
    username: &str,
    display_name: &str,
    extension: &str,
) -> PathBuf {
    let bucket = sound_id / SOUND_PATH_BUCKET_SIZE;
    let name = format!(
        "{}.{}",
        sound_filename_slug(sound_id, username, display_name),
        extension
    );
    sounds_root.join(bucket.to_string()).join(name)
}

/// Normalize a whitespace-delimited tag string: lower-cased, split on
/// whitespace, empties dropped. Deduplication is the tag store's job.
pub fn normalize_tags(tags: &str) -> Vec<String> {
    tags.split_whitespace()
        .map(|t| t.to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_upload_filename() {
        assert!(validate_upload_filename("kick_drum.wav").is_ok());
        assert!(validate_upload_filename("").is_err());
        assert!(validate_upload_filename("../etc/passwd").is_err());
        assert!(validate_upload_filename("a/b.wav").is_err());
        assert!(validate_upload_filename("..").is_err());
    }

    #[test]
    fn test_sound_filename_slug_strips_extension() {
        let slug = sound_filename_slug(42, "Some User", "My Guitar Loop.WAV");
        assert_eq!(slug, "42__some-user__my-guitar-loop");
    }

    #[test]
    fn test_canonical_path_buckets_by_id() {
        let path = canonical_sound_path(
            Path::new("/data/sounds"),
            12345,
            "ana",
            "bird song.flac",
            "flac",
        );
        assert_eq!(
            path,
            PathBuf::from("/data/sounds/12/12345__ana__bird-song.flac")
        );
    }

    #[test]
    fn test_canonical_path_display_name_without_extension() {
        let path = canonical_sound_path(Path::new("/data/sounds"), 7, "ana", "Morning Birds", "wav");
        assert_eq!(path, PathBuf::from("/data/sounds/0/7__ana__morning-birds.wav"));
    }

    #[test]
    fn test_normalize_tags() {
        assert_eq!(normalize_tags(" Guitar  loop "), vec!["guitar", "loop"]);
        assert!(normalize_tags("   ").is_empty());
        // Duplicates survive normalization; the store deduplicates.
        assert_eq!(normalize_tags("LOOP loop"), vec!["loop", "loop"]);
    }
}
