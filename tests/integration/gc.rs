//! Mark-and-sweep collection reachability.

use drjson::{Context, Value};

#[test]
fn unrooted_values_are_freed_and_their_slots_reused() {
    let mut ctx = Context::new();
    let orphan = ctx.make_array();
    ctx.array_push(orphan, Value::integer(1)).unwrap();

    ctx.gc(&[]);

    // the freed slot is recycled by the next allocation, so a fresh array
    // in the same slot starts out empty rather than inheriting old items.
    let reused = ctx.make_array();
    assert_eq!(ctx.len(reused), 0);
}

#[test]
fn rooted_value_and_everything_it_references_survives() {
    let mut ctx = Context::new();
    let root = ctx.make_object();
    let child = ctx.make_array();
    ctx.array_push(child, Value::integer(42)).unwrap();
    let key = ctx.atomize(b"child");
    ctx.object_set(root, key, child).unwrap();

    ctx.gc(&[root]);

    let surviving_child = ctx.object_get(root, key);
    assert_eq!(ctx.len(surviving_child), 1);
    assert_eq!(ctx.get_by_index(surviving_child, 0), Value::integer(42));
}

#[test]
fn value_reachable_only_through_a_dropped_reference_is_collected() {
    let mut ctx = Context::new();
    let keep = ctx.make_object();
    {
        let temp = ctx.make_array();
        let key = ctx.atomize(b"temp");
        ctx.object_set(keep, key, temp).unwrap();
        ctx.object_delete(keep, key).unwrap();
        // `temp`'s handle still exists on the stack here, but nothing in
        // the graph reachable from `keep` points to it anymore.
    }

    ctx.gc(&[keep]);
    assert_eq!(ctx.len(keep), 0);
}
