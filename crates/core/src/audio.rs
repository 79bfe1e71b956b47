//! Sound type detection.
//!
//! Classification inspects leading magic bytes first and falls back to the
//! filename extension; transcoding and deeper analysis belong to the
//! external processing pipeline, not this crate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Recognized audio container/codec families.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundType {
    Wav,
    Aiff,
    Flac,
    Ogg,
    Mp3,
    M4a,
}

impl SoundType {
    /// Get the string representation stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Aiff => "aiff",
            Self::Flac => "flac",
            Self::Ogg => "ogg",
            Self::Mp3 => "mp3",
            Self::M4a => "m4a",
        }
    }

    /// Parse from the stored string representation.
    pub fn parse(s: &str) -> crate::Result<Self> {
        match s {
            "wav" => Ok(Self::Wav),
            "aiff" => Ok(Self::Aiff),
            "flac" => Ok(Self::Flac),
            "ogg" => Ok(Self::Ogg),
            "mp3" => Ok(Self::Mp3),
            "m4a" => Ok(Self::M4a),
            _ => Err(crate::Error::UnknownSoundType(s.to_string())),
        }
    }

    /// The MIME type served for downloads.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Wav => "audio/x-wav",
            Self::Aiff => "audio/x-aiff",
            Self::Flac => "audio/flac",
            Self::Ogg => "audio/ogg",
            Self::Mp3 => "audio/mpeg",
            Self::M4a => "audio/mp4",
        }
    }
}

impl fmt::Display for SoundType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classify a sound from its leading bytes, falling back to the filename
/// extension when the magic is unrecognized.
pub fn detect_sound_type(header: &[u8], filename: &str) -> crate::Result<SoundType> {
    if let Some(kind) = sniff_magic(header) {
        return Ok(kind);
    }

    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "wav" | "wave" => Ok(SoundType::Wav),
        "aif" | "aiff" | "aifc" => Ok(SoundType::Aiff),
        "flac" => Ok(SoundType::Flac),
        "ogg" | "oga" => Ok(SoundType::Ogg),
        "mp3" => Ok(SoundType::Mp3),
        "m4a" | "mp4" => Ok(SoundType::M4a),
        _ => Err(crate::Error::UnknownSoundType(filename.to_string())),
    }
}

fn sniff_magic(header: &[u8]) -> Option<SoundType> {
    if header.len() >= 12 {
        if &header[0..4] == b"RIFF" && &header[8..12] == b"WAVE" {
            return Some(SoundType::Wav);
        }
        if &header[0..4] == b"FORM" && (&header[8..12] == b"AIFF" || &header[8..12] == b"AIFC") {
            return Some(SoundType::Aiff);
        }
        if &header[4..8] == b"ftyp" {
            return Some(SoundType::M4a);
        }
    }
    if header.len() >= 4 {
        if &header[0..4] == b"fLaC" {
            return Some(SoundType::Flac);
        }
        if &header[0..4] == b"OggS" {
            return Some(SoundType::Ogg);
        }
    }
    if header.len() >= 3 && &header[0..3] == b"ID3" {
        return Some(SoundType::Mp3);
    }
    // Bare MPEG audio frame sync (11 set bits).
    if header.len() >= 2 && header[0] == 0xFF && header[1] & 0xE0 == 0xE0 {
        return Some(SoundType::Mp3);
    }
    None
}
