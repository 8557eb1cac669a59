//! Selection set.

use std::collections::HashSet;

use crate::frame::FrameId;

/// Set of selected frame ids.
///
/// The store keeps this a subset of the ids in its sequence. Selection
/// carries no order of its own; callers that need one read it back through
/// [`crate::FrameStore::selected_ids`], which follows sequence order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: HashSet<FrameId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: FrameId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = FrameId> + '_ {
        self.ids.iter().copied()
    }

    /// Replace the selection with a single id.
    pub(crate) fn replace(&mut self, id: FrameId) {
        self.ids.clear();
        self.ids.insert(id);
    }

    /// Flip membership of `id`. Returns the new membership.
    pub(crate) fn toggle(&mut self, id: FrameId) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    pub(crate) fn remove(&mut self, id: FrameId) -> bool {
        self.ids.remove(&id)
    }

    pub(crate) fn clear(&mut self) {
        self.ids.clear();
    }
}
