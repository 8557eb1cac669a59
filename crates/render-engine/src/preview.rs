//! Interactive preview surface.

use std::fmt;

use image::RgbaImage;

use flipbook_common::config::PreviewConfig;
use flipbook_common::error::{FlipbookError, FlipbookResult};
use flipbook_frame_model::{FrameId, FrameStore, Size};

use crate::color::BackgroundColor;
use crate::compositor::{bitmap_size, draw_fitted};

/// What the status line under the preview shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewStatus {
    Empty,
    Showing {
        /// 1-based position in the sequence.
        index: usize,
        total: usize,
        name: String,
        duration_ms: u32,
    },
}

impl fmt::Display for PreviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreviewStatus::Empty => f.write_str("No frames"),
            PreviewStatus::Showing {
                index,
                total,
                name,
                duration_ms,
            } => write!(f, "{index} / {total}: {name} - {duration_ms} ms"),
        }
    }
}

/// A frame that was just drawn on the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShownFrame {
    /// 0-based position in the sequence.
    pub index: usize,
    pub frame: FrameId,
    pub duration_ms: u32,
    pub status: PreviewStatus,
}

/// Owns the preview pixels and the status line.
#[derive(Debug)]
pub struct PreviewRenderer {
    surface: RgbaImage,
    background: BackgroundColor,
    status: PreviewStatus,
    current: Option<FrameId>,
}

impl PreviewRenderer {
    pub fn new(size: Size, background: BackgroundColor) -> Self {
        let mut surface = RgbaImage::new(size.width.max(1), size.height.max(1));
        let fill = background.rgba();
        for pixel in surface.pixels_mut() {
            *pixel = fill;
        }
        Self {
            surface,
            background,
            status: PreviewStatus::Empty,
            current: None,
        }
    }

    pub fn from_config(config: &PreviewConfig) -> FlipbookResult<Self> {
        let background = BackgroundColor::parse(&config.background)?;
        Ok(Self::new(Size::new(config.width, config.height), background))
    }

    pub fn size(&self) -> Size {
        bitmap_size(&self.surface)
    }

    pub fn surface(&self) -> &RgbaImage {
        &self.surface
    }

    pub fn status(&self) -> &PreviewStatus {
        &self.status
    }

    /// The frame currently on the surface, if any.
    pub fn current(&self) -> Option<FrameId> {
        self.current
    }

    pub fn background(&self) -> BackgroundColor {
        self.background
    }

    /// Change the background. Takes effect on the next draw or clear.
    pub fn set_background(&mut self, background: BackgroundColor) {
        self.background = background;
    }

    /// Show the frame `id`.
    ///
    /// An empty store clears the surface. Unknown ids and decode failures
    /// return an error and leave the surface and status as they were.
    pub fn render(&mut self, store: &FrameStore, id: FrameId) -> FlipbookResult<&PreviewStatus> {
        if store.is_empty() {
            self.clear();
            return Ok(&self.status);
        }
        let index = store
            .index_of(id)
            .ok_or_else(|| FlipbookError::render(format!("{id} is not in the sequence")))?;
        self.show_at(store, index)?;
        Ok(&self.status)
    }

    /// Show the frame at `index`, wrapped to the current length.
    ///
    /// Returns `None` (after clearing) when the store is empty.
    pub fn show_at(&mut self, store: &FrameStore, index: usize) -> FlipbookResult<Option<ShownFrame>> {
        if store.is_empty() {
            self.clear();
            return Ok(None);
        }

        let index = index % store.len();
        let Some(record) = store.get_at(index) else {
            return Ok(None);
        };
        let bitmap = record.decoded()?;
        draw_fitted(&mut self.surface, &bitmap, self.background);

        self.current = Some(record.id());
        self.status = PreviewStatus::Showing {
            index: index + 1,
            total: store.len(),
            name: record.name().to_string(),
            duration_ms: record.duration_ms(),
        };
        tracing::trace!(frame = %record.id(), index, "Preview drawn");

        Ok(Some(ShownFrame {
            index,
            frame: record.id(),
            duration_ms: record.duration_ms(),
            status: self.status.clone(),
        }))
    }

    /// Fill the surface with the background and reset the status.
    pub fn clear(&mut self) {
        let fill = self.background.rgba();
        for pixel in self.surface.pixels_mut() {
            *pixel = fill;
        }
        self.status = PreviewStatus::Empty;
        self.current = None;
    }
}
