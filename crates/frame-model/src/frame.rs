//! Frame records.

use std::fmt;
use std::sync::{Arc, OnceLock};

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use flipbook_common::error::{FlipbookError, FlipbookResult};

use crate::source::{format_size, ImageSource};

/// Opaque identifier of a frame, unique within its store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameId(u64);

impl FrameId {
    /// Build an id from its raw value. Stores allocate ids themselves;
    /// this exists for hosts that round-trip ids through a UI layer.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame-{}", self.0)
    }
}

/// One still image plus its display duration.
///
/// Cloning a record is cheap: the encoded bytes and the decode cache are
/// shared, so a clone taken for export reuses a decode performed by the
/// preview and vice versa.
#[derive(Clone)]
pub struct FrameRecord {
    id: FrameId,
    name: String,
    duration_ms: u32,
    source: ImageSource,
    decoded: Arc<OnceLock<Arc<RgbaImage>>>,
}

impl FrameRecord {
    pub(crate) fn new(id: FrameId, source: ImageSource, duration_ms: u32) -> Self {
        Self {
            id,
            name: source.name().to_string(),
            duration_ms,
            source,
            decoded: Arc::new(OnceLock::new()),
        }
    }

    pub fn id(&self) -> FrameId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display duration in milliseconds.
    pub fn duration_ms(&self) -> u32 {
        self.duration_ms
    }

    pub(crate) fn set_duration_ms(&mut self, duration_ms: u32) {
        self.duration_ms = duration_ms;
    }

    pub fn source(&self) -> &ImageSource {
        &self.source
    }

    /// Encoded size of the source image.
    pub fn size_bytes(&self) -> u64 {
        self.source.len() as u64
    }

    /// Encoded size formatted for list display.
    pub fn size_label(&self) -> String {
        format_size(self.size_bytes())
    }

    /// Whether the bitmap has already been decoded.
    pub fn is_decoded(&self) -> bool {
        self.decoded.get().is_some()
    }

    /// The decoded RGBA bitmap, decoding on first use.
    ///
    /// A failed decode is not cached; the next call tries again.
    pub fn decoded(&self) -> FlipbookResult<Arc<RgbaImage>> {
        if let Some(bitmap) = self.decoded.get() {
            return Ok(Arc::clone(bitmap));
        }

        let bitmap = image::load_from_memory(self.source.bytes())
            .map_err(|e| FlipbookError::decode(&self.name, e.to_string()))?
            .to_rgba8();
        if bitmap.width() == 0 || bitmap.height() == 0 {
            return Err(FlipbookError::decode(&self.name, "image has no pixels"));
        }

        tracing::debug!(
            frame = %self.id,
            width = bitmap.width(),
            height = bitmap.height(),
            "Decoded frame bitmap"
        );

        Ok(Arc::clone(self.decoded.get_or_init(|| Arc::new(bitmap))))
    }
}

impl fmt::Debug for FrameRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameRecord")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("duration_ms", &self.duration_ms)
            .field("decoded", &self.is_decoded())
            .finish()
    }
}
