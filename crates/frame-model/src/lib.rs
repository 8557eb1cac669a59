//! Flipbook Frame Model
//!
//! Defines the core data contracts of the frame sequence engine:
//! - **Sources:** Image payloads filtered by media type
//! - **Frames:** Records with a display duration and a lazily decoded bitmap
//! - **Store:** The ordered sequence plus the selection set
//! - **Geometry:** Uniform fit-and-center math shared by preview and export
//!
//! The [`FrameStore`] is the single owner of frame order. Every other
//! component reads it or mutates it through its methods.

pub mod duration;
pub mod frame;
pub mod geometry;
pub mod selection;
pub mod source;
pub mod store;

pub use duration::*;
pub use frame::*;
pub use geometry::*;
pub use selection::*;
pub use source::*;
pub use store::*;
