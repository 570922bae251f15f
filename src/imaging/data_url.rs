//! `data:` URL encoding for stored media.
//!
//! Covers, gallery photos, logos and promo videos are persisted inline as
//! `data:<mime>;base64,<payload>` strings, the same representation a browser
//! file reader produces. Only the base64 form is supported.

use super::backend::BackendError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::Path;

/// Extension to media type mapping for files read from disk.
const MEDIA_TYPES: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("webp", "image/webp"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("gif", "image/gif"),
    ("mp4", "video/mp4"),
    ("webm", "video/webm"),
    ("mov", "video/quicktime"),
];

const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// A decoded `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl DataUrl {
    pub fn new(mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            bytes,
        }
    }

    /// Parse `data:<mime>;base64,<payload>`.
    pub fn parse(url: &str) -> Result<Self, BackendError> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| BackendError::ProcessingFailed("not a data URL".into()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| BackendError::ProcessingFailed("data URL has no payload".into()))?;
        let mime = header.strip_suffix(";base64").ok_or_else(|| {
            BackendError::ProcessingFailed("only base64 data URLs are supported".into())
        })?;
        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|e| BackendError::ProcessingFailed(format!("bad base64 payload: {e}")))?;
        Ok(Self::new(mime, bytes))
    }

    /// Read a file into a data URL, deriving the media type from its extension.
    pub fn from_file(path: &Path) -> Result<Self, BackendError> {
        let bytes = std::fs::read(path)?;
        Ok(Self::new(media_type_for(path), bytes))
    }

    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }

    /// Render back to `data:<mime>;base64,<payload>`.
    pub fn to_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

/// Media type for a file path, by extension.
pub fn media_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    MEDIA_TYPES
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mime)| *mime)
        .unwrap_or(FALLBACK_MEDIA_TYPE)
}
