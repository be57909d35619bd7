//! Mark-and-sweep collection over the array and object arenas.
//!
//! Unlike a mark-and-compact collector, slots never move: an `ArrayIndex`
//! or `ObjectIndex` a caller is holding onto stays valid across a
//! collection unless the value it names turns out unreachable. Marking only
//! ever walks into array items and object *values* — atoms (object keys)
//! are never collected, so there is nothing to mark them for.

use alloc::vec::Vec;

use crate::intern::{hash_items, hash_pairs, InternIndex};
use crate::object::ObjectArena;
use crate::value::array::ArrayArena;
use crate::value::Value;

fn mark_value(value: Value, objects: &mut ObjectArena, arrays: &mut ArrayArena) {
    match value {
        Value::Array(idx) | Value::ArrayView(idx) => mark_array(idx.get(), objects, arrays),
        Value::Object(idx) | Value::ObjectKeys(idx) | Value::ObjectValues(idx) | Value::ObjectItems(idx) => {
            mark_object(idx.get(), objects, arrays);
        }
        _ => {}
    }
}

fn mark_array(slot: u32, objects: &mut ObjectArena, arrays: &mut ArrayArena) {
    if !arrays.is_live(slot) || arrays.mark_if_unmarked(slot) {
        return;
    }
    let items: Vec<Value> = arrays.record_items(slot).to_vec();
    for item in items {
        mark_value(item, objects, arrays);
    }
}

fn mark_object(slot: u32, objects: &mut ObjectArena, arrays: &mut ArrayArena) {
    if !objects.is_live(slot) || objects.mark_if_unmarked(slot) {
        return;
    }
    let values: Vec<Value> = objects.record_pairs(slot).iter().map(|(_, v)| *v).collect();
    for value in values {
        mark_value(value, objects, arrays);
    }
}

/// Runs one mark-and-sweep collection.
///
/// `roots` should include every value a caller can still reach directly
/// (the global object, anything returned from [`crate::context::Context`]
/// and still held by the embedder, pending query results, and so on) —
/// anything not transitively reachable from `roots` is freed.
pub fn gc(
    objects: &mut ObjectArena,
    arrays: &mut ArrayArena,
    interned_objects: &mut InternIndex,
    interned_arrays: &mut InternIndex,
    roots: &[Value],
) {
    log::debug!(
        "gc: marking from {} roots ({} object slots, {} array slots)",
        roots.len(),
        objects.slot_count(),
        arrays.slot_count()
    );
    for &root in roots {
        mark_value(root, objects, arrays);
    }

    let mut freed_objects = 0u32;
    for slot in (1..objects.slot_count()).rev() {
        if !objects.is_live(slot) {
            continue;
        }
        if objects.take_marked(slot) {
            continue;
        }
        if objects.record_read_only(slot) {
            let hash = hash_pairs(objects.record_pairs(slot));
            interned_objects.remove(hash, slot);
        }
        objects.free_raw(slot);
        freed_objects += 1;
    }

    let mut freed_arrays = 0u32;
    for slot in (1..arrays.slot_count()).rev() {
        if !arrays.is_live(slot) {
            continue;
        }
        if arrays.take_marked(slot) {
            continue;
        }
        if arrays.record_read_only(slot) {
            let hash = hash_items(arrays.record_items(slot));
            interned_arrays.remove(hash, slot);
        }
        arrays.free_raw(slot);
        freed_arrays += 1;
    }

    log::debug!("gc: freed {freed_objects} objects, {freed_arrays} arrays");
}
