//! Object and array mutation semantics: insertion order, delete, and
//! negative indexing.

use drjson::{Context, ParseFlags, Value};

fn parse(ctx: &mut Context, src: &str) -> Value {
    drjson::parse::parse(ctx, src.as_bytes(), ParseFlags::COPY_STRINGS)
}

#[test]
fn delete_preserves_remaining_key_order() {
    let mut ctx = Context::new();
    let v = parse(&mut ctx, "{a:1,b:2,c:3}");
    let b = ctx.atomize(b"b");
    ctx.object_delete(v, b).unwrap();

    let keys = ctx.view(v, drjson::Kind::ObjectKeys);
    assert_eq!(ctx.len(keys), 2);
    assert_eq!(ctx.resolve(ctx.get_by_index(keys, 0).as_atom().unwrap()), b"a");
    assert_eq!(ctx.resolve(ctx.get_by_index(keys, 1).as_atom().unwrap()), b"c");
}

#[test]
fn delete_then_get_is_missing_key() {
    let mut ctx = Context::new();
    let o = ctx.make_object();
    let k = ctx.atomize(b"k");
    ctx.object_set(o, k, Value::integer(1)).unwrap();
    ctx.object_delete(o, k).unwrap();
    let err = ctx.object_get(o, k);
    assert_eq!(err.as_error().map(|(c, _)| c), Some(drjson::ErrorCode::MissingKey));
}

#[test]
fn set_on_existing_key_does_not_reorder() {
    let mut ctx = Context::new();
    let o = ctx.make_object();
    let a = ctx.atomize(b"a");
    let b = ctx.atomize(b"b");
    ctx.object_set(o, a, Value::integer(1)).unwrap();
    ctx.object_set(o, b, Value::integer(2)).unwrap();
    ctx.object_set(o, a, Value::integer(99)).unwrap();

    let keys = ctx.view(o, drjson::Kind::ObjectKeys);
    assert_eq!(ctx.resolve(ctx.get_by_index(keys, 0).as_atom().unwrap()), b"a");
    assert_eq!(ctx.resolve(ctx.get_by_index(keys, 1).as_atom().unwrap()), b"b");
    assert_eq!(ctx.object_get(o, a), Value::integer(99));
}

#[test]
fn array_negative_index_counts_from_the_end() {
    let mut ctx = Context::new();
    let v = parse(&mut ctx, "[10,20,30]");
    assert_eq!(ctx.get_by_index(v, -1), Value::uinteger(30));
}

#[test]
fn array_delete_preserves_order_of_the_rest() {
    let mut ctx = Context::new();
    let v = parse(&mut ctx, "[1,2,3,4]");
    ctx.array_delete(v, 1).unwrap();
    assert_eq!(ctx.get_by_index(v, 0), Value::uinteger(1));
    assert_eq!(ctx.get_by_index(v, 1), Value::uinteger(3));
    assert_eq!(ctx.get_by_index(v, 2), Value::uinteger(4));
}

#[test]
fn operating_on_the_wrong_kind_is_a_type_error() {
    let mut ctx = Context::new();
    let n = Value::integer(5);
    let key = ctx.atomize(b"x");
    let err = ctx.object_set(n, key, Value::null());
    assert_eq!(err.unwrap_err().code, drjson::ErrorCode::TypeError);
}

#[test]
fn clear_empties_an_array_in_place() {
    let mut ctx = Context::new();
    let v = parse(&mut ctx, "[1,2,3]");
    ctx.clear(v).unwrap();
    assert_eq!(ctx.len(v), 0);
}
