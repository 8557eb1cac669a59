//! Pointer gesture state machine.
//!
//! ```text
//!            PointerDown            PointerUp
//!   Idle ───────────────▶ Selecting ──────────▶ Idle   (click)
//!     │                      │
//!     │ DragStart            │ DragStart
//!     ▼                      ▼
//!   Dragging ── DragOver* ── Drop | DragEnd ──▶ Idle
//! ```
//!
//! In multi-select mode the drag payload is the whole selection, captured
//! in sequence order when the drag starts. Payload items are hidden for the
//! duration of the drag, and a single placeholder marks where the block
//! will land. Legacy mode moves exactly the dragged frame to just before
//! the frame it is dropped on.

use flipbook_frame_model::{FrameId, FrameStore};

use crate::reorder::{move_before, move_block};

/// Keyboard modifiers relevant to gestures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Extend-selection modifier (shift).
    pub extend: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers { extend: false };
    pub const EXTEND: Modifiers = Modifiers { extend: true };
}

/// Vertical extent of a list item, in the same units as the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemBounds {
    pub top: f64,
    pub height: f64,
}

impl ItemBounds {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    /// Whether `pointer_y` is past the vertical midpoint.
    /// Returns `None` for degenerate bounds.
    pub fn is_below_midpoint(&self, pointer_y: f64) -> Option<bool> {
        if !(self.height.is_finite() && self.height > 0.0) || !pointer_y.is_finite() {
            return None;
        }
        Some((pointer_y - self.top) / self.height > 0.5)
    }
}

/// Abstract pointer input over the frame list.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
    PointerDown { id: FrameId, modifiers: Modifiers },
    PointerUp,
    DragStart { id: FrameId, modifiers: Modifiers },
    DragOver {
        target: FrameId,
        pointer_y: f64,
        bounds: ItemBounds,
    },
    Drop { target: Option<FrameId> },
    /// The drag finished without a drop (cancelled or dropped elsewhere).
    DragEnd,
}

/// How drags reorder the sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReorderMode {
    /// Selection-aware block moves with a placeholder.
    #[default]
    MultiSelect,
    /// Single frame moved before the drop target; clicks only preview.
    Legacy,
}

/// Observable gesture phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    Idle,
    Selecting,
    Dragging,
}

/// What the host should do after an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureOutcome {
    /// Nothing changed.
    None,
    /// Selection may have changed; show this frame in the preview.
    Preview(FrameId),
    /// A drag began with this payload (sequence order).
    DragStarted { payload: Vec<FrameId> },
    /// A drag was refused because the extend modifier was held.
    DragSuppressed,
    /// The placeholder moved to a slot of the visible list.
    PlaceholderMoved { slot: usize },
    /// The sequence was reordered to this order.
    Reordered { order: Vec<FrameId> },
    /// The drag ended without changing the sequence.
    DragCancelled,
}

/// An entry of the list as displayed mid-drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListEntry {
    Frame(FrameId),
    Placeholder,
}

#[derive(Debug, Clone)]
struct DragSession {
    source: FrameId,
    payload: Vec<FrameId>,
    /// Sequence order at drag start with the payload removed.
    visible: Vec<FrameId>,
    placeholder: Option<usize>,
    hovered: Option<FrameId>,
}

#[derive(Debug, Clone)]
enum State {
    Idle,
    Selecting { id: FrameId, modifiers: Modifiers },
    Dragging(DragSession),
}

/// Interprets pointer events against a [`FrameStore`].
#[derive(Debug, Clone)]
pub struct GestureMachine {
    mode: ReorderMode,
    state: State,
}

impl GestureMachine {
    pub fn new(mode: ReorderMode) -> Self {
        Self {
            mode,
            state: State::Idle,
        }
    }

    pub fn mode(&self) -> ReorderMode {
        self.mode
    }

    pub fn phase(&self) -> GesturePhase {
        match self.state {
            State::Idle => GesturePhase::Idle,
            State::Selecting { .. } => GesturePhase::Selecting,
            State::Dragging(_) => GesturePhase::Dragging,
        }
    }

    /// Frames being moved by the current drag.
    pub fn payload(&self) -> Option<&[FrameId]> {
        match &self.state {
            State::Dragging(session) => Some(&session.payload),
            _ => None,
        }
    }

    /// Placeholder slot within the visible (non-payload) list.
    pub fn placeholder_slot(&self) -> Option<usize> {
        match &self.state {
            State::Dragging(session) => session.placeholder,
            _ => None,
        }
    }

    /// Whether `id` is hidden because it is part of the drag payload.
    pub fn is_hidden(&self, id: FrameId) -> bool {
        self.payload().is_some_and(|p| p.contains(&id))
    }

    /// The list as a view should draw it right now.
    pub fn visual_list(&self, store: &FrameStore) -> Vec<ListEntry> {
        match &self.state {
            State::Dragging(session) => {
                let mut entries: Vec<ListEntry> = session
                    .visible
                    .iter()
                    .copied()
                    .filter(|id| store.contains(*id))
                    .map(ListEntry::Frame)
                    .collect();
                if let Some(slot) = session.placeholder {
                    let before = session.visible[..slot.min(session.visible.len())]
                        .iter()
                        .filter(|id| store.contains(**id))
                        .count();
                    entries.insert(before, ListEntry::Placeholder);
                }
                entries
            }
            _ => store.ids().into_iter().map(ListEntry::Frame).collect(),
        }
    }

    /// Press then release on `id`.
    pub fn click(&mut self, store: &mut FrameStore, id: FrameId, modifiers: Modifiers) -> GestureOutcome {
        self.handle(store, PointerEvent::PointerDown { id, modifiers });
        self.handle(store, PointerEvent::PointerUp)
    }

    /// Feed one pointer event.
    pub fn handle(&mut self, store: &mut FrameStore, event: PointerEvent) -> GestureOutcome {
        match event {
            PointerEvent::PointerDown { id, modifiers } => {
                if matches!(self.state, State::Dragging(_)) {
                    return GestureOutcome::None;
                }
                self.state = State::Selecting { id, modifiers };
                GestureOutcome::None
            }
            PointerEvent::PointerUp => match std::mem::replace(&mut self.state, State::Idle) {
                State::Selecting { id, modifiers } => self.finish_click(store, id, modifiers),
                other => {
                    self.state = other;
                    GestureOutcome::None
                }
            },
            PointerEvent::DragStart { id, modifiers } => {
                if matches!(self.state, State::Dragging(_)) {
                    return GestureOutcome::None;
                }
                self.start_drag(store, id, modifiers)
            }
            PointerEvent::DragOver {
                target,
                pointer_y,
                bounds,
            } => self.drag_over(target, pointer_y, bounds),
            PointerEvent::Drop { target } => match std::mem::replace(&mut self.state, State::Idle) {
                State::Dragging(session) => self.drop_payload(store, session, target),
                other => {
                    self.state = other;
                    GestureOutcome::None
                }
            },
            PointerEvent::DragEnd => match std::mem::replace(&mut self.state, State::Idle) {
                State::Dragging(session) => {
                    tracing::debug!(payload = session.payload.len(), "Drag cancelled");
                    GestureOutcome::DragCancelled
                }
                other => {
                    self.state = other;
                    GestureOutcome::None
                }
            },
        }
    }

    fn finish_click(&mut self, store: &mut FrameStore, id: FrameId, modifiers: Modifiers) -> GestureOutcome {
        if !store.contains(id) {
            return GestureOutcome::None;
        }
        if self.mode == ReorderMode::MultiSelect {
            if modifiers.extend {
                store.toggle_selected(id);
            } else {
                store.select_only(id);
            }
        }
        GestureOutcome::Preview(id)
    }

    fn start_drag(&mut self, store: &mut FrameStore, id: FrameId, modifiers: Modifiers) -> GestureOutcome {
        self.state = State::Idle;
        let Some(source_index) = store.index_of(id) else {
            return GestureOutcome::None;
        };

        let payload = match self.mode {
            ReorderMode::MultiSelect => {
                if modifiers.extend {
                    return GestureOutcome::DragSuppressed;
                }
                if !store.is_selected(id) {
                    store.select_only(id);
                }
                store.selected_ids()
            }
            ReorderMode::Legacy => vec![id],
        };

        let ids = store.ids();
        let visible: Vec<FrameId> = ids
            .iter()
            .copied()
            .filter(|x| !payload.contains(x))
            .collect();
        let placeholder = match self.mode {
            ReorderMode::MultiSelect => Some(
                ids[..source_index]
                    .iter()
                    .filter(|x| !payload.contains(x))
                    .count(),
            ),
            ReorderMode::Legacy => None,
        };

        tracing::debug!(source = %id, payload = payload.len(), ?placeholder, "Drag started");
        self.state = State::Dragging(DragSession {
            source: id,
            payload: payload.clone(),
            visible,
            placeholder,
            hovered: None,
        });
        GestureOutcome::DragStarted { payload }
    }

    fn drag_over(&mut self, target: FrameId, pointer_y: f64, bounds: ItemBounds) -> GestureOutcome {
        let mode = self.mode;
        let State::Dragging(session) = &mut self.state else {
            return GestureOutcome::None;
        };

        match mode {
            ReorderMode::MultiSelect => {
                let Some(position) = session.visible.iter().position(|id| *id == target) else {
                    return GestureOutcome::None;
                };
                let Some(below) = bounds.is_below_midpoint(pointer_y) else {
                    return GestureOutcome::None;
                };
                let slot = position + usize::from(below);
                if session.placeholder == Some(slot) {
                    return GestureOutcome::None;
                }
                session.placeholder = Some(slot);
                GestureOutcome::PlaceholderMoved { slot }
            }
            ReorderMode::Legacy => {
                if target != session.source && session.visible.contains(&target) {
                    session.hovered = Some(target);
                }
                GestureOutcome::None
            }
        }
    }

    fn drop_payload(
        &mut self,
        store: &mut FrameStore,
        session: DragSession,
        target: Option<FrameId>,
    ) -> GestureOutcome {
        let order = match self.mode {
            ReorderMode::MultiSelect => {
                let Some(slot) = session.placeholder else {
                    return GestureOutcome::None;
                };
                let mut captured = session.visible.clone();
                captured.extend_from_slice(&session.payload);
                move_block(&captured, &session.payload, slot)
            }
            ReorderMode::Legacy => {
                let Some(target) = target.or(session.hovered) else {
                    return GestureOutcome::None;
                };
                match move_before(&store.ids(), session.source, target) {
                    Some(order) => order,
                    None => return GestureOutcome::None,
                }
            }
        };

        if !store.apply_order(&order) {
            tracing::debug!("Drop ignored: sequence changed during drag");
            return GestureOutcome::None;
        }
        tracing::debug!(payload = session.payload.len(), "Frames reordered");
        GestureOutcome::Reordered { order }
    }
}

impl Default for GestureMachine {
    fn default() -> Self {
        Self::new(ReorderMode::MultiSelect)
    }
}

#[cfg(test)]
mod tests {
    use flipbook_frame_model::ImageSource;

    use super::*;

    fn store_of(n: usize) -> (FrameStore, Vec<FrameId>) {
        let mut store = FrameStore::default();
        let ids = store.add_frames(
            (0..n).map(|i| ImageSource::new(format!("{i}.png"), "image/png", vec![0u8])),
        );
        (store, ids)
    }

    fn over(target: FrameId, below: bool) -> PointerEvent {
        PointerEvent::DragOver {
            target,
            pointer_y: if below { 15.0 } else { 5.0 },
            bounds: ItemBounds::new(0.0, 20.0),
        }
    }

    #[test]
    fn test_click_replaces_selection() {
        let (mut store, ids) = store_of(3);
        let mut gestures = GestureMachine::default();

        assert_eq!(gestures.click(&mut store, ids[0], Modifiers::NONE), GestureOutcome::Preview(ids[0]));
        gestures.click(&mut store, ids[1], Modifiers::NONE);
        assert_eq!(store.selected_ids(), vec![ids[1]]);
        assert_eq!(gestures.phase(), GesturePhase::Idle);
    }

    #[test]
    fn test_shift_click_toggles() {
        let (mut store, ids) = store_of(3);
        let mut gestures = GestureMachine::default();

        gestures.click(&mut store, ids[0], Modifiers::NONE);
        gestures.click(&mut store, ids[2], Modifiers::EXTEND);
        assert_eq!(store.selected_ids(), vec![ids[0], ids[2]]);
        gestures.click(&mut store, ids[0], Modifiers::EXTEND);
        assert_eq!(store.selected_ids(), vec![ids[2]]);
    }

    #[test]
    fn test_pointer_down_enters_selecting() {
        let (mut store, ids) = store_of(1);
        let mut gestures = GestureMachine::default();
        gestures.handle(&mut store, PointerEvent::PointerDown { id: ids[0], modifiers: Modifiers::NONE });
        assert_eq!(gestures.phase(), GesturePhase::Selecting);
        assert!(store.selection().is_empty());
    }

    #[test]
    fn test_drag_of_unselected_item_replaces_selection() {
        let (mut store, ids) = store_of(4);
        let mut gestures = GestureMachine::default();
        gestures.click(&mut store, ids[0], Modifiers::NONE);

        let outcome = gestures.handle(&mut store, PointerEvent::DragStart { id: ids[2], modifiers: Modifiers::NONE });
        assert_eq!(outcome, GestureOutcome::DragStarted { payload: vec![ids[2]] });
        assert_eq!(store.selected_ids(), vec![ids[2]]);
        assert!(gestures.is_hidden(ids[2]));
        assert_eq!(gestures.placeholder_slot(), Some(2));
    }

    #[test]
    fn test_multi_drag_moves_block_before_first() {
        let (mut store, ids) = store_of(4);
        let (a, b, c, d) = (ids[0], ids[1], ids[2], ids[3]);
        let mut gestures = GestureMachine::default();
        gestures.click(&mut store, d, Modifiers::NONE);
        gestures.click(&mut store, b, Modifiers::EXTEND);

        let outcome = gestures.handle(&mut store, PointerEvent::DragStart { id: d, modifiers: Modifiers::NONE });
        assert_eq!(outcome, GestureOutcome::DragStarted { payload: vec![b, d] });

        gestures.handle(&mut store, over(a, false));
        assert_eq!(
            gestures.visual_list(&store),
            vec![ListEntry::Placeholder, ListEntry::Frame(a), ListEntry::Frame(c)]
        );

        let outcome = gestures.handle(&mut store, PointerEvent::Drop { target: None });
        assert_eq!(outcome, GestureOutcome::Reordered { order: vec![b, d, a, c] });
        assert_eq!(store.ids(), vec![b, d, a, c]);
        assert_eq!(gestures.phase(), GesturePhase::Idle);
    }

    #[test]
    fn test_drag_over_below_midpoint_inserts_after() {
        let (mut store, ids) = store_of(4);
        let mut gestures = GestureMachine::default();
        gestures.handle(&mut store, PointerEvent::DragStart { id: ids[0], modifiers: Modifiers::NONE });

        assert_eq!(gestures.handle(&mut store, over(ids[2], true)), GestureOutcome::PlaceholderMoved { slot: 2 });
        gestures.handle(&mut store, PointerEvent::Drop { target: Some(ids[2]) });
        assert_eq!(store.ids(), vec![ids[1], ids[2], ids[0], ids[3]]);
    }

    #[test]
    fn test_exact_midpoint_inserts_before() {
        let bounds = ItemBounds::new(100.0, 20.0);
        assert_eq!(bounds.is_below_midpoint(110.0), Some(false));
        assert_eq!(bounds.is_below_midpoint(110.5), Some(true));
        assert_eq!(ItemBounds::new(0.0, 0.0).is_below_midpoint(1.0), None);
    }

    #[test]
    fn test_drag_over_payload_member_is_ignored() {
        let (mut store, ids) = store_of(3);
        let mut gestures = GestureMachine::default();
        gestures.handle(&mut store, PointerEvent::DragStart { id: ids[1], modifiers: Modifiers::NONE });
        let slot = gestures.placeholder_slot();

        assert_eq!(gestures.handle(&mut store, over(ids[1], true)), GestureOutcome::None);
        assert_eq!(gestures.placeholder_slot(), slot);
    }

    #[test]
    fn test_drop_without_moving_keeps_order() {
        let (mut store, ids) = store_of(3);
        let mut gestures = GestureMachine::default();
        gestures.handle(&mut store, PointerEvent::DragStart { id: ids[1], modifiers: Modifiers::NONE });
        gestures.handle(&mut store, PointerEvent::Drop { target: None });
        assert_eq!(store.ids(), ids);
    }

    #[test]
    fn test_extend_drag_is_suppressed() {
        let (mut store, ids) = store_of(3);
        let mut gestures = GestureMachine::default();
        gestures.click(&mut store, ids[0], Modifiers::NONE);

        let outcome = gestures.handle(&mut store, PointerEvent::DragStart { id: ids[2], modifiers: Modifiers::EXTEND });
        assert_eq!(outcome, GestureOutcome::DragSuppressed);
        assert_eq!(gestures.phase(), GesturePhase::Idle);
        assert_eq!(store.selected_ids(), vec![ids[0]]);

        assert_eq!(gestures.handle(&mut store, PointerEvent::Drop { target: None }), GestureOutcome::None);
        assert_eq!(store.ids(), ids);
    }

    #[test]
    fn test_drag_end_cancels_without_mutation() {
        let (mut store, ids) = store_of(3);
        let mut gestures = GestureMachine::default();
        gestures.handle(&mut store, PointerEvent::DragStart { id: ids[2], modifiers: Modifiers::NONE });
        gestures.handle(&mut store, over(ids[0], false));

        assert_eq!(gestures.handle(&mut store, PointerEvent::DragEnd), GestureOutcome::DragCancelled);
        assert_eq!(store.ids(), ids);
        assert!(!gestures.is_hidden(ids[2]));
        assert_eq!(gestures.handle(&mut store, PointerEvent::DragEnd), GestureOutcome::None);
    }

    #[test]
    fn test_payload_is_captured_at_drag_start() {
        let (mut store, ids) = store_of(4);
        let mut gestures = GestureMachine::default();
        gestures.click(&mut store, ids[3], Modifiers::NONE);
        gestures.handle(&mut store, PointerEvent::DragStart { id: ids[3], modifiers: Modifiers::NONE });

        store.toggle_selected(ids[1]);
        gestures.handle(&mut store, over(ids[0], false));
        gestures.handle(&mut store, PointerEvent::Drop { target: None });
        assert_eq!(store.ids(), vec![ids[3], ids[0], ids[1], ids[2]]);
    }

    #[test]
    fn test_stale_drop_is_ignored() {
        let (mut store, ids) = store_of(3);
        let mut gestures = GestureMachine::default();
        gestures.handle(&mut store, PointerEvent::DragStart { id: ids[2], modifiers: Modifiers::NONE });
        gestures.handle(&mut store, over(ids[0], false));
        store.remove_frame(ids[1]);

        assert_eq!(gestures.handle(&mut store, PointerEvent::Drop { target: None }), GestureOutcome::None);
        assert_eq!(store.ids(), vec![ids[0], ids[2]]);
    }

    #[test]
    fn test_legacy_moves_single_frame_before_target() {
        let (mut store, ids) = store_of(4);
        let mut gestures = GestureMachine::new(ReorderMode::Legacy);

        assert_eq!(gestures.click(&mut store, ids[1], Modifiers::NONE), GestureOutcome::Preview(ids[1]));
        assert!(store.selection().is_empty());

        gestures.handle(&mut store, PointerEvent::DragStart { id: ids[0], modifiers: Modifiers::NONE });
        assert_eq!(gestures.placeholder_slot(), None);
        let outcome = gestures.handle(&mut store, PointerEvent::Drop { target: Some(ids[3]) });
        assert_eq!(outcome, GestureOutcome::Reordered { order: vec![ids[1], ids[2], ids[0], ids[3]] });
    }

    #[test]
    fn test_legacy_drop_uses_last_hovered_target() {
        let (mut store, ids) = store_of(3);
        let mut gestures = GestureMachine::new(ReorderMode::Legacy);
        gestures.handle(&mut store, PointerEvent::DragStart { id: ids[2], modifiers: Modifiers::NONE });
        gestures.handle(&mut store, over(ids[0], true));
        gestures.handle(&mut store, PointerEvent::Drop { target: None });
        assert_eq!(store.ids(), vec![ids[2], ids[0], ids[1]]);
    }

    #[test]
    fn test_legacy_drop_without_target_is_noop() {
        let (mut store, ids) = store_of(3);
        let mut gestures = GestureMachine::new(ReorderMode::Legacy);
        gestures.handle(&mut store, PointerEvent::DragStart { id: ids[2], modifiers: Modifiers::NONE });
        assert_eq!(gestures.handle(&mut store, PointerEvent::Drop { target: None }), GestureOutcome::None);
        assert_eq!(store.ids(), ids);
    }
}
