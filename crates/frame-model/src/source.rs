//! Image sources supplied by the user.
//!
//! A source is the file-like object a frame is built from: a display name,
//! a declared media type, and the raw encoded bytes. Only sources whose
//! media type is `image/*` become frames.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use flipbook_common::error::{FlipbookError, FlipbookResult};

/// Media type used when a file extension is not recognized.
pub const UNKNOWN_MEDIA_TYPE: &str = "application/octet-stream";

/// Encoded image bytes plus the metadata needed to accept or reject them.
#[derive(Clone)]
pub struct ImageSource {
    name: String,
    media_type: String,
    bytes: Arc<[u8]>,
}

impl ImageSource {
    /// Create a source from in-memory bytes and a declared media type.
    pub fn new(
        name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a source from disk. The media type is inferred from the extension.
    pub fn from_path(path: &Path) -> FlipbookResult<Self> {
        if !path.exists() {
            return Err(FlipbookError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self::new(name, media_type_for_path(path), bytes))
    }

    /// Whether the declared media type is an image type.
    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Encoded size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageSource")
            .field("name", &self.name)
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Guess a media type from a file extension.
pub fn media_type_for_path(path: &Path) -> String {
    image::ImageFormat::from_path(path)
        .map(|format| format.to_mime_type().to_string())
        .unwrap_or_else(|_| UNKNOWN_MEDIA_TYPE.to_string())
}

/// Human-readable byte count (`0 B`, `512 B`, `1.5 KB`, `2 MB`).
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    const K: f64 = 1024.0;

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut exponent = 0usize;
    let mut remaining = bytes;
    while remaining >= 1024 && exponent < UNITS.len() - 1 {
        remaining /= 1024;
        exponent += 1;
    }
    let value = bytes as f64 / K.powi(exponent as i32);
    let rounded = (value * 100.0).round() / 100.0;

    format!("{} {}", rounded, UNITS[exponent])
}
