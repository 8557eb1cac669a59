//! Flipbook Editor
//!
//! One editing session: the frame store and preview surface behind a
//! shared lock, the gesture engine feeding the store, and the playback
//! and export pipelines serialized against each other.

pub mod session;
pub mod workspace;

pub use session::*;
pub use workspace::*;
