use std::collections::HashSet;

use flipbook_frame_model::{FrameId, FrameStore, ImageSource};
use flipbook_interaction::{
    is_permutation, move_before, move_block, GestureMachine, GestureOutcome, ItemBounds, Modifiers,
    PointerEvent, ReorderMode,
};
use proptest::prelude::*;

fn store_of(n: usize) -> (FrameStore, Vec<FrameId>) {
    let mut store = FrameStore::default();
    let ids = store.add_frames(
        (0..n).map(|i| ImageSource::new(format!("{i}.png"), "image/png", vec![0u8])),
    );
    (store, ids)
}

proptest! {
    #[test]
    fn block_move_is_a_contiguous_permutation(
        len in 1usize..12,
        picks in prop::collection::vec(any::<bool>(), 12),
        slot in 0usize..16,
    ) {
        let order: Vec<u32> = (0..len as u32).collect();
        let payload: Vec<u32> = order.iter().copied().filter(|i| picks[*i as usize]).collect();

        let result = move_block(&order, &payload, slot);
        prop_assert!(is_permutation(&order, &result));

        if let Some(first) = payload.first() {
            let start = result.iter().position(|x| x == first).unwrap();
            prop_assert_eq!(&result[start..start + payload.len()], &payload[..]);
        }

        let payload_set: HashSet<u32> = payload.iter().copied().collect();
        let rest_before: Vec<u32> = order.iter().copied().filter(|x| !payload_set.contains(x)).collect();
        let rest_after: Vec<u32> = result.iter().copied().filter(|x| !payload_set.contains(x)).collect();
        prop_assert_eq!(rest_before, rest_after);
    }

    #[test]
    fn move_before_places_source_ahead_of_target(
        len in 2usize..10,
        source in 0usize..10,
        target in 0usize..10,
    ) {
        let order: Vec<u32> = (0..len as u32).collect();
        let (source, target) = (source as u32 % len as u32, target as u32 % len as u32);

        match move_before(&order, source, target) {
            Some(result) => {
                prop_assert!(is_permutation(&order, &result));
                let s = result.iter().position(|x| *x == source).unwrap();
                let t = result.iter().position(|x| *x == target).unwrap();
                prop_assert_eq!(s + 1, t);
            }
            None => prop_assert_eq!(source, target),
        }
    }

    #[test]
    fn drag_gesture_keeps_membership_and_selection(
        len in 1usize..8,
        selected in prop::collection::vec(any::<bool>(), 8),
        dragged in 0usize..8,
        hover in 0usize..8,
        below in any::<bool>(),
    ) {
        let (mut store, ids) = store_of(len);
        let mut gestures = GestureMachine::default();
        for (i, id) in ids.iter().enumerate() {
            if selected[i] {
                gestures.click(&mut store, *id, Modifiers::EXTEND);
            }
        }
        let selection_before = store.selected_ids();
        let dragged = ids[dragged % len];

        let started = gestures.handle(&mut store, PointerEvent::DragStart { id: dragged, modifiers: Modifiers::NONE });
        let GestureOutcome::DragStarted { payload } = started else {
            return Err(TestCaseError::fail("drag did not start"));
        };
        prop_assert!(payload.contains(&dragged));
        if selection_before.contains(&dragged) {
            prop_assert_eq!(&payload, &selection_before);
        } else {
            prop_assert_eq!(&payload, &vec![dragged]);
        }

        gestures.handle(&mut store, PointerEvent::DragOver {
            target: ids[hover % len],
            pointer_y: if below { 30.0 } else { 10.0 },
            bounds: ItemBounds::new(0.0, 40.0),
        });
        gestures.handle(&mut store, PointerEvent::Drop { target: Some(ids[hover % len]) });

        let after = store.ids();
        prop_assert!(is_permutation(&ids, &after));
        let start = after.iter().position(|x| *x == payload[0]).unwrap();
        prop_assert_eq!(&after[start..start + payload.len()], &payload[..]);
        prop_assert_eq!(store.selected_ids().len(), payload.len());
    }

    #[test]
    fn suppressed_drag_never_mutates(
        len in 1usize..8,
        dragged in 0usize..8,
        hover in 0usize..8,
    ) {
        let (mut store, ids) = store_of(len);
        let mut gestures = GestureMachine::default();
        gestures.click(&mut store, ids[0], Modifiers::NONE);

        let outcome = gestures.handle(&mut store, PointerEvent::DragStart { id: ids[dragged % len], modifiers: Modifiers::EXTEND });
        prop_assert_eq!(outcome, GestureOutcome::DragSuppressed);
        gestures.handle(&mut store, PointerEvent::DragOver {
            target: ids[hover % len],
            pointer_y: 1.0,
            bounds: ItemBounds::new(0.0, 10.0),
        });
        gestures.handle(&mut store, PointerEvent::Drop { target: Some(ids[hover % len]) });

        prop_assert_eq!(store.ids(), ids.clone());
        prop_assert_eq!(store.selected_ids(), vec![ids[0]]);
    }
}

#[test]
fn legacy_mode_ignores_selection_entirely() {
    let (mut store, ids) = store_of(4);
    let mut gestures = GestureMachine::new(ReorderMode::Legacy);

    gestures.click(&mut store, ids[0], Modifiers::EXTEND);
    gestures.handle(
        &mut store,
        PointerEvent::DragStart {
            id: ids[3],
            modifiers: Modifiers::EXTEND,
        },
    );
    let outcome = gestures.handle(&mut store, PointerEvent::Drop { target: Some(ids[1]) });

    assert_eq!(
        outcome,
        GestureOutcome::Reordered {
            order: vec![ids[0], ids[3], ids[1], ids[2]]
        }
    );
    assert!(store.selection().is_empty());
}
