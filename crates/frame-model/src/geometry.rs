//! Pixel sizes and the uniform fit rule.
//!
//! Preview and export place every frame the same way: scaled uniformly by
//! `min(bounds_w / image_w, bounds_h / image_h)` and centered on both axes.

use serde::{Deserialize, Serialize};

/// A pixel size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Multiply both axes by `scale`, rounding to the nearest pixel.
    ///
    /// A scale that is not a positive finite number is treated as 1.0, and
    /// each axis is at least one pixel.
    pub fn scaled(self, scale: f64) -> Size {
        let scale = if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            1.0
        };
        Size {
            width: ((self.width as f64 * scale).round() as u32).max(1),
            height: ((self.height as f64 * scale).round() as u32).max(1),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Aspect ratio (width / height).
    pub fn aspect(&self) -> f64 {
        self.width as f64 / self.height.max(1) as f64
    }
}

/// A rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Whether the rectangle lies inside `bounds` (with tolerance `eps`).
    pub fn fits_within(&self, bounds: Size, eps: f64) -> bool {
        self.x >= -eps
            && self.y >= -eps
            && self.right() <= bounds.width as f64 + eps
            && self.bottom() <= bounds.height as f64 + eps
    }

    /// Whether the rectangle's center matches the center of `bounds`.
    pub fn is_centered_in(&self, bounds: Size, eps: f64) -> bool {
        let (cx, cy) = self.center();
        (cx - bounds.width as f64 / 2.0).abs() <= eps
            && (cy - bounds.height as f64 / 2.0).abs() <= eps
    }

    /// Pixel-aligned placement: rounded origin and a size of at least 1x1.
    pub fn to_pixels(&self) -> (i64, i64, u32, u32) {
        (
            self.x.round() as i64,
            self.y.round() as i64,
            (self.width.round() as u32).max(1),
            (self.height.round() as u32).max(1),
        )
    }
}

/// Largest placement of `content` inside `bounds` that keeps its aspect
/// ratio, centered on both axes.
///
/// Empty content yields a zero-sized rectangle at the center of `bounds`.
pub fn fit_contain(content: Size, bounds: Size) -> Rect {
    let bw = bounds.width as f64;
    let bh = bounds.height as f64;

    if content.is_empty() {
        return Rect {
            x: bw / 2.0,
            y: bh / 2.0,
            width: 0.0,
            height: 0.0,
        };
    }

    let scale = (bw / content.width as f64).min(bh / content.height as f64);
    let width = content.width as f64 * scale;
    let height = content.height as f64 * scale;

    Rect {
        x: (bw - width) / 2.0,
        y: (bh - height) / 2.0,
        width,
        height,
    }
}
