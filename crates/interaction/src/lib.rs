//! Flipbook Interaction
//!
//! Turns abstract pointer and keyboard input into frame store mutations:
//! - **Gestures:** click-to-select, shift-toggle, and multi-item drag reorder
//! - **Reorder:** pure block-move algorithms the gestures are built on
//! - **Keys:** global shortcuts (playback toggle, focus exit)
//!
//! Nothing here knows about a rendering surface. Hosts translate their
//! native events into [`PointerEvent`]s and act on the returned
//! [`GestureOutcome`].

pub mod gesture;
pub mod keys;
pub mod reorder;

pub use gesture::*;
pub use keys::*;
pub use reorder::*;
