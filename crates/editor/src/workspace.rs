//! Shared editing state.

use std::sync::{Mutex, MutexGuard, PoisonError};

use flipbook_common::error::FlipbookResult;
use flipbook_frame_model::FrameStore;
use flipbook_render_engine::{PlaybackSurface, PreviewRenderer, ShownFrame};

/// Frame store plus the preview surface that shows it.
#[derive(Debug)]
pub struct Workspace {
    pub store: FrameStore,
    pub preview: PreviewRenderer,
}

/// A [`Workspace`] behind a lock, shared with the playback task.
#[derive(Debug)]
pub struct SharedWorkspace {
    inner: Mutex<Workspace>,
}

impl SharedWorkspace {
    pub fn new(workspace: Workspace) -> Self {
        Self {
            inner: Mutex::new(workspace),
        }
    }

    /// Lock the workspace. Never hold the guard across an `.await`.
    pub fn lock(&self) -> MutexGuard<'_, Workspace> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PlaybackSurface for SharedWorkspace {
    fn frame_count(&self) -> usize {
        self.lock().store.len()
    }

    fn show_frame(&self, index: usize) -> FlipbookResult<Option<ShownFrame>> {
        let mut guard = self.lock();
        let Workspace { store, preview } = &mut *guard;
        preview.show_at(store, index)
    }

    fn clear(&self) {
        self.lock().preview.clear();
    }
}
