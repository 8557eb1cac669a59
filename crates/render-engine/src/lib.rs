//! Flipbook Render Engine
//!
//! Everything that turns frame records into pixels or bytes:
//! the interactive preview surface, the playback loop that drives it,
//! and the export pipeline that feeds an animated-image encoder.
//!
//! # Pipeline Architecture
//!
//! ```text
//! snapshot ──┐
//!            ├── Decode (cached per record)
//!            │         │
//!            │         ├── Fit + center on fixed-size canvas
//!            │         │         │
//!            │         │         ├── Encoder::add_frame (owned canvas + delay)
//!            │         │         │
//!            └─────────┴─────────┴── Encoder::render ──▶ export.gif
//! ```

pub mod color;
pub mod compositor;
pub mod encoder;
pub mod export;
pub mod playback;
pub mod preview;

pub use color::BackgroundColor;
pub use encoder::*;
pub use export::*;
pub use playback::*;
pub use preview::*;
