//! Reorder algorithms.
//!
//! These operate on plain id lists so they can be checked in isolation.
//! Every function returns a permutation of its input order.

use std::collections::HashSet;
use std::hash::Hash;

/// Move `payload` as one contiguous block to `slot`.
///
/// `slot` indexes the list that remains once the payload is taken out
/// (0 = before the first remaining item, `len` = at the end) and is
/// clamped to that list. The payload keeps the order it is given in.
/// Payload entries that are not part of `order` are ignored.
pub fn move_block<T>(order: &[T], payload: &[T], slot: usize) -> Vec<T>
where
    T: Copy + Eq + Hash,
{
    let present: HashSet<T> = order.iter().copied().collect();
    let moving: Vec<T> = payload
        .iter()
        .copied()
        .filter(|id| present.contains(id))
        .collect();
    let moving_set: HashSet<T> = moving.iter().copied().collect();

    let remaining: Vec<T> = order
        .iter()
        .copied()
        .filter(|id| !moving_set.contains(id))
        .collect();
    let slot = slot.min(remaining.len());

    let mut result = Vec::with_capacity(order.len());
    result.extend_from_slice(&remaining[..slot]);
    result.extend_from_slice(&moving);
    result.extend_from_slice(&remaining[slot..]);
    result
}

/// Move `source` to just before `target`.
///
/// Returns `None` when either id is missing or they are the same item.
pub fn move_before<T>(order: &[T], source: T, target: T) -> Option<Vec<T>>
where
    T: Copy + Eq,
{
    if source == target {
        return None;
    }
    let source_index = order.iter().position(|id| *id == source)?;
    if !order.contains(&target) {
        return None;
    }

    let mut result = order.to_vec();
    let item = result.remove(source_index);
    let target_index = result.iter().position(|id| *id == target)?;
    result.insert(target_index, item);
    Some(result)
}

/// Whether `a` and `b` hold the same items, each exactly once.
pub fn is_permutation<T>(a: &[T], b: &[T]) -> bool
where
    T: Copy + Eq + Hash,
{
    if a.len() != b.len() {
        return false;
    }
    let set_a: HashSet<T> = a.iter().copied().collect();
    let set_b: HashSet<T> = b.iter().copied().collect();
    set_a.len() == a.len() && set_a == set_b
}
