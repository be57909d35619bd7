//! The compiled path evaluator and the live query grammar.

use drjson::{Context, ParseFlags, Value};

fn parse(ctx: &mut Context, src: &str) -> Value {
    drjson::parse::parse(ctx, src.as_bytes(), ParseFlags::COPY_STRINGS)
}

#[test]
fn query_dotted_path_reaches_a_nested_scalar() {
    let mut ctx = Context::new();
    let v = parse(&mut ctx, "{a:{b:{c:1}}}");
    let result = drjson::path::query(&ctx, v, b".a.b.c");
    assert_eq!(result, Value::uinteger(1));
}

#[test]
fn query_bracket_subscript_on_array() {
    let mut ctx = Context::new();
    let v = parse(&mut ctx, "[10,20,30]");
    let result = drjson::path::query(&ctx, v, b"[-1]");
    assert_eq!(result, Value::uinteger(30));
}

#[test]
fn query_missing_key_surfaces_the_underlying_error() {
    let mut ctx = Context::new();
    let v = parse(&mut ctx, "{a:1}");
    let result = drjson::path::query(&ctx, v, b".b");
    assert_eq!(result.as_error().map(|(c, _)| c), Some(drjson::ErrorCode::MissingKey));
}

#[test]
fn query_length_view() {
    let mut ctx = Context::new();
    let v = parse(&mut ctx, "[1,2,3]");
    let result = drjson::path::query(&ctx, v, b"@length");
    assert_eq!(result, Value::integer(3));
}

#[test]
fn query_keys_view_then_index() {
    let mut ctx = Context::new();
    let v = parse(&mut ctx, "{a:1,b:2}");
    let result = drjson::path::query(&ctx, v, b"@keys[1]");
    assert_eq!(ctx.resolve(result.as_atom().unwrap()), b"b");
}

#[test]
fn compiled_path_matches_the_live_query_for_the_same_route() {
    let mut ctx = Context::new();
    let v = parse(&mut ctx, "{a:{b:[5,6,7]}}");

    let path = drjson::path::parse_path(&mut ctx, b".a.b[2]").unwrap();
    let via_path = drjson::path::eval(&ctx, v, &path);
    let via_query = drjson::path::query(&ctx, v, b".a.b[2]");
    assert_eq!(via_path, via_query);
    assert_eq!(via_path, Value::uinteger(7));
}

#[test]
fn compiled_path_is_reusable_across_different_roots() {
    let mut ctx = Context::new();
    let path = drjson::path::parse_path(&mut ctx, b".x").unwrap();

    let first = parse(&mut ctx, "{x:1}");
    let second = parse(&mut ctx, "{x:2}");
    assert_eq!(drjson::path::eval(&ctx, first, &path), Value::uinteger(1));
    assert_eq!(drjson::path::eval(&ctx, second, &path), Value::uinteger(2));
}

#[test]
fn checked_query_passes_through_a_value_of_the_requested_kind() {
    let mut ctx = Context::new();
    let v = parse(&mut ctx, "{a:{b:[5,6,7]}}");
    let result = drjson::path::checked_query(&ctx, v, drjson::Kind::Uinteger, b".a.b[-1]");
    assert_eq!(result, Value::uinteger(7));
}

#[test]
fn checked_query_rejects_a_value_of_the_wrong_kind() {
    let mut ctx = Context::new();
    let v = parse(&mut ctx, "{a:{b:[5,6,7]}}");
    let result = drjson::path::checked_query(&ctx, v, drjson::Kind::String, b".a.b[-1]");
    assert_eq!(result.as_error().map(|(c, _)| c), Some(drjson::ErrorCode::InvalidValue));
}

#[test]
fn checked_query_still_surfaces_the_underlying_query_error() {
    let mut ctx = Context::new();
    let v = parse(&mut ctx, "{a:1}");
    let result = drjson::path::checked_query(&ctx, v, drjson::Kind::Integer, b".b");
    assert_eq!(result.as_error().map(|(c, _)| c), Some(drjson::ErrorCode::MissingKey));
}

#[test]
fn compiled_path_never_resolves_a_view_segment() {
    let mut ctx = Context::new();
    // `parse_path` only ever produces Key/Index segments; a view marker in
    // the bytes is read as an ordinary bareword key, not a special form.
    let v = parse(&mut ctx, "{\"@keys\": 1}");
    let path = drjson::path::parse_path(&mut ctx, b".@keys").unwrap();
    assert_eq!(drjson::path::eval(&ctx, v, &path), Value::uinteger(1));
}
