//! The frame store: ordered sequence plus selection.

use std::collections::HashSet;

use flipbook_common::config::EditorDefaults;

use crate::duration::{DurationInput, DurationPolicy};
use crate::frame::{FrameId, FrameRecord};
use crate::selection::Selection;
use crate::source::ImageSource;

/// Answer to the "remove all frames?" prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

impl From<bool> for Confirmation {
    fn from(confirmed: bool) -> Self {
        if confirmed {
            Self::Confirmed
        } else {
            Self::Declined
        }
    }
}

/// Owner of the frame sequence and the selection.
///
/// Sequence order is insertion order until a reorder is applied through
/// [`FrameStore::apply_order`]. The selection is always a subset of the ids
/// in the sequence.
#[derive(Debug)]
pub struct FrameStore {
    frames: Vec<FrameRecord>,
    selection: Selection,
    next_id: u64,
    policy: DurationPolicy,
    default_duration_ms: u32,
}

impl FrameStore {
    /// Create an empty store using the given editor defaults.
    pub fn new(defaults: &EditorDefaults) -> Self {
        let policy = DurationPolicy::from_defaults(defaults);
        Self::with_policy(policy, defaults.default_duration_ms)
    }

    /// Create an empty store with an explicit duration policy.
    pub fn with_policy(policy: DurationPolicy, default_duration_ms: u32) -> Self {
        Self {
            frames: Vec::new(),
            selection: Selection::new(),
            next_id: 1,
            policy,
            default_duration_ms: policy.clamp(default_duration_ms as i64),
        }
    }

    pub fn policy(&self) -> DurationPolicy {
        self.policy
    }

    pub fn default_duration_ms(&self) -> u32 {
        self.default_duration_ms
    }

    /// Append one frame per image source, in input order.
    ///
    /// Sources that are not images are dropped without error. Returns the
    /// ids of the frames that were created.
    pub fn add_frames<I>(&mut self, sources: I) -> Vec<FrameId>
    where
        I: IntoIterator<Item = ImageSource>,
    {
        let mut added = Vec::new();
        for source in sources {
            if !source.is_image() {
                tracing::debug!(
                    name = source.name(),
                    media_type = source.media_type(),
                    "Skipping non-image source"
                );
                continue;
            }

            let id = FrameId::from_raw(self.next_id);
            self.next_id += 1;
            self.frames
                .push(FrameRecord::new(id, source, self.default_duration_ms));
            added.push(id);
        }

        if !added.is_empty() {
            tracing::info!(added = added.len(), total = self.frames.len(), "Frames added");
        }
        added
    }

    /// Remove a frame. Unknown ids are ignored.
    ///
    /// The returned record is the last owner of its decode cache unless an
    /// export snapshot still holds a clone.
    pub fn remove_frame(&mut self, id: FrameId) -> Option<FrameRecord> {
        let index = self.index_of(id)?;
        let record = self.frames.remove(index);
        self.selection.remove(id);
        tracing::debug!(frame = %id, remaining = self.frames.len(), "Frame removed");
        Some(record)
    }

    /// Remove every frame and clear the selection, if confirmed.
    ///
    /// Returns how many frames were removed.
    pub fn remove_all(&mut self, confirmation: Confirmation) -> usize {
        if confirmation == Confirmation::Declined {
            tracing::debug!("Remove all declined");
            return 0;
        }

        let removed = self.frames.len();
        self.frames.clear();
        self.selection.clear();
        tracing::info!(removed, "All frames removed");
        removed
    }

    /// Set one frame's duration. Returns the stored value, or `None` if the
    /// id is unknown.
    pub fn set_duration(&mut self, id: FrameId, input: impl Into<DurationInput>) -> Option<u32> {
        let value = self.policy.resolve(&input.into());
        let index = self.index_of(id)?;
        self.frames[index].set_duration_ms(value);
        Some(value)
    }

    /// Give every frame the same duration. Returns the stored value.
    pub fn apply_duration_to_all(&mut self, input: impl Into<DurationInput>) -> u32 {
        let value = self.policy.resolve(&input.into());
        for frame in &mut self.frames {
            frame.set_duration_ms(value);
        }
        tracing::debug!(duration_ms = value, frames = self.frames.len(), "Duration applied to all frames");
        value
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[FrameRecord] {
        &self.frames
    }

    pub fn iter(&self) -> impl Iterator<Item = &FrameRecord> {
        self.frames.iter()
    }

    pub fn get(&self, id: FrameId) -> Option<&FrameRecord> {
        self.frames.iter().find(|f| f.id() == id)
    }

    pub fn get_at(&self, index: usize) -> Option<&FrameRecord> {
        self.frames.get(index)
    }

    /// Zero-based position of `id` in the sequence.
    pub fn index_of(&self, id: FrameId) -> Option<usize> {
        self.frames.iter().position(|f| f.id() == id)
    }

    /// 1-based position of `id`, as shown to users.
    pub fn position(&self, id: FrameId) -> Option<usize> {
        self.index_of(id).map(|i| i + 1)
    }

    pub fn contains(&self, id: FrameId) -> bool {
        self.index_of(id).is_some()
    }

    /// Frame ids in sequence order.
    pub fn ids(&self) -> Vec<FrameId> {
        self.frames.iter().map(FrameRecord::id).collect()
    }

    /// Cheap copies of every record, in sequence order.
    pub fn snapshot(&self) -> Vec<FrameRecord> {
        self.frames.clone()
    }

    /// Sum of all frame durations (one loop of the animation).
    pub fn total_duration_ms(&self) -> u64 {
        self.frames.iter().map(|f| f.duration_ms() as u64).sum()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn is_selected(&self, id: FrameId) -> bool {
        self.selection.contains(id)
    }

    /// Selected ids in sequence order.
    pub fn selected_ids(&self) -> Vec<FrameId> {
        self.frames
            .iter()
            .map(FrameRecord::id)
            .filter(|id| self.selection.contains(*id))
            .collect()
    }

    /// Make `id` the only selected frame. Unknown ids leave the selection
    /// untouched and return `false`.
    pub fn select_only(&mut self, id: FrameId) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.selection.replace(id);
        true
    }

    /// Flip selection membership of `id`. Returns the new membership;
    /// unknown ids return `false` and change nothing.
    pub fn toggle_selected(&mut self, id: FrameId) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.selection.toggle(id)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Reorder the sequence to match `order`.
    ///
    /// Applied only when `order` is a permutation of the current ids;
    /// anything else is ignored and returns `false`.
    pub fn apply_order(&mut self, order: &[FrameId]) -> bool {
        if order.len() != self.frames.len() {
            tracing::debug!(
                expected = self.frames.len(),
                got = order.len(),
                "Ignoring reorder with wrong length"
            );
            return false;
        }

        let current: HashSet<FrameId> = self.frames.iter().map(FrameRecord::id).collect();
        let mut seen = HashSet::with_capacity(order.len());
        if !order.iter().all(|id| current.contains(id) && seen.insert(*id)) {
            tracing::debug!("Ignoring reorder that is not a permutation");
            return false;
        }

        let mut remaining = std::mem::take(&mut self.frames);
        let mut reordered = Vec::with_capacity(remaining.len());
        for id in order {
            if let Some(pos) = remaining.iter().position(|f| f.id() == *id) {
                reordered.push(remaining.swap_remove(pos));
            }
        }
        self.frames = reordered;
        true
    }
}

impl Default for FrameStore {
    fn default() -> Self {
        Self::new(&EditorDefaults::default())
    }
}
