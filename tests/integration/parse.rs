//! Parsing the permissive format end to end.

use drjson::{Context, ParseFlags, Value};

fn parse(ctx: &mut Context, src: &str) -> Value {
    drjson::parse::parse(ctx, src.as_bytes(), ParseFlags::COPY_STRINGS)
}

#[test]
fn large_exponent_number_literal() {
    let mut ctx = Context::new();
    let v = parse(&mut ctx, "{foo: 123.4e12}");
    let key = ctx.atomize(b"foo");
    let foo = ctx.object_get(v, key);
    match foo {
        Value::Number(n) => assert!((n - 1.234e14).abs() < 1.0),
        other => panic!("expected a number, got {other:?}"),
    }
}

#[test]
fn array_literal_length() {
    let mut ctx = Context::new();
    let v = parse(&mut ctx, "[1,2,3]");
    assert_eq!(ctx.len(v), 3);
}

#[test]
fn hash_color_literal_packs_argb() {
    let mut ctx = Context::new();
    let v = parse(&mut ctx, "#f00");
    assert_eq!(v, Value::uinteger(0xFFFF_0000));
}

#[test]
fn hex_integer_literal() {
    let mut ctx = Context::new();
    let v = parse(&mut ctx, "0x1A");
    assert_eq!(v, Value::uinteger(26));
}

#[test]
fn comments_are_skipped_as_whitespace() {
    let mut ctx = Context::new();
    let v = parse(&mut ctx, "{/* c */ a // line\n : 1}");
    let key = ctx.atomize(b"a");
    assert_eq!(ctx.object_get(v, key), Value::uinteger(1));
}

#[test]
fn commas_and_colons_are_optional() {
    let mut ctx = Context::new();
    let v = parse(&mut ctx, "{a 1 b 2}");
    let a = ctx.atomize(b"a");
    let b = ctx.atomize(b"b");
    assert_eq!(ctx.object_get(v, a), Value::uinteger(1));
    assert_eq!(ctx.object_get(v, b), Value::uinteger(2));
}

#[test]
fn braceless_object_reads_the_whole_input() {
    let mut ctx = Context::new();
    let v = drjson::parse::parse(&mut ctx, b"a 1, b 2", ParseFlags::COPY_STRINGS | ParseFlags::BRACELESS_OBJECT);
    assert_eq!(ctx.len(v), 2);
}

#[test]
fn unterminated_object_is_an_error_value() {
    let mut ctx = Context::new();
    let v = parse(&mut ctx, "{a: 1");
    assert!(v.is_error());
}

#[test]
fn duplicate_keys_last_write_wins() {
    let mut ctx = Context::new();
    let v = parse(&mut ctx, "{a:1,a:2}");
    let a = ctx.atomize(b"a");
    assert_eq!(ctx.object_get(v, a), Value::uinteger(2));
    assert_eq!(ctx.len(v), 1);
}

#[test]
fn no_copy_strings_borrows_the_input_buffer() {
    let mut ctx = Context::new();
    let src = b"{\"name\": \"alice\"}".to_vec();
    let v = drjson::parse::parse(&mut ctx, &src, ParseFlags::NO_COPY_STRINGS);
    let key = ctx.atomize(b"name");
    let name = ctx.object_get(v, key);
    assert_eq!(ctx.resolve(name.as_atom().unwrap()), b"alice");
}

#[test]
fn intern_objects_flag_freezes_and_dedupes() {
    let mut ctx = Context::new();
    let v = drjson::parse::parse(&mut ctx, b"{a:[1,2], b:[1,2]}", ParseFlags::COPY_STRINGS | ParseFlags::INTERN_OBJECTS);
    let a = ctx.atomize(b"a");
    let b = ctx.atomize(b"b");
    let arr_a = ctx.object_get(v, a);
    let arr_b = ctx.object_get(v, b);
    assert_eq!(arr_a.as_array_index(), arr_b.as_array_index());
}
