//! Frame compositor: places a decoded frame on a fixed-size surface.
//!
//! Preview and export share these helpers so a frame lands on the same
//! relative spot whether it is shown at preview size or at export size.

use image::imageops::{self, FilterType};
use image::RgbaImage;
use serde::Serialize;

use flipbook_frame_model::{fit_contain, FrameId, Rect, Size};

use crate::color::BackgroundColor;

/// Tolerance used when checking placements, in pixels.
const PLACEMENT_EPSILON_PX: f64 = 1.0;

/// A single frame's composition on the output canvas.
#[derive(Debug, Clone)]
pub struct FrameComposition {
    /// Position in the exported sequence (0-based).
    pub frame_index: usize,

    /// Source frame.
    pub frame: FrameId,

    /// Where the image was drawn, before pixel rounding.
    pub placement: Rect,

    /// Display time in milliseconds.
    pub delay_ms: u32,
}

/// Outcome of checking every composition against the canvas bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VerificationSummary {
    pub frames_checked: usize,
    pub out_of_bounds: usize,
    pub off_center: usize,
}

impl VerificationSummary {
    pub fn is_clean(&self) -> bool {
        self.out_of_bounds == 0 && self.off_center == 0
    }
}

/// Size of a bitmap as a [`Size`].
pub fn bitmap_size(bitmap: &RgbaImage) -> Size {
    Size::new(bitmap.width(), bitmap.height())
}

/// Fill `canvas` with `background` and draw `bitmap` scaled uniformly to
/// fit, centered on both axes. Returns the placement that was used.
pub fn draw_fitted(canvas: &mut RgbaImage, bitmap: &RgbaImage, background: BackgroundColor) -> Rect {
    let fill = background.rgba();
    for pixel in canvas.pixels_mut() {
        *pixel = fill;
    }

    let placement = fit_contain(bitmap_size(bitmap), bitmap_size(canvas));
    if placement.width <= 0.0 || placement.height <= 0.0 {
        return placement;
    }

    let (x, y, width, height) = placement.to_pixels();
    if width == bitmap.width() && height == bitmap.height() {
        imageops::overlay(canvas, bitmap, x, y);
    } else {
        let scaled = imageops::resize(bitmap, width, height, FilterType::Triangle);
        imageops::overlay(canvas, &scaled, x, y);
    }
    placement
}

/// Check that every placement lies inside `bounds` and is centered.
pub fn verify_compositions(compositions: &[FrameComposition], bounds: Size) -> VerificationSummary {
    let mut summary = VerificationSummary {
        frames_checked: compositions.len(),
        ..Default::default()
    };

    for comp in compositions {
        if !comp.placement.fits_within(bounds, PLACEMENT_EPSILON_PX) {
            summary.out_of_bounds += 1;
            tracing::warn!(
                frame = %comp.frame,
                index = comp.frame_index,
                placement = ?comp.placement,
                "Frame placement exceeds output bounds"
            );
        }
        if !comp.placement.is_centered_in(bounds, PLACEMENT_EPSILON_PX) {
            summary.off_center += 1;
            tracing::warn!(
                frame = %comp.frame,
                index = comp.frame_index,
                placement = ?comp.placement,
                "Frame placement is not centered"
            );
        }
    }

    summary
}
