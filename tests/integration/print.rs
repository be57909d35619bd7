//! Printing and the compact-round-trips-through-parse property.

use drjson::{Context, ParseFlags, Value};

fn parse(ctx: &mut Context, src: &[u8]) -> Value {
    drjson::parse::parse(ctx, src, ParseFlags::COPY_STRINGS)
}

#[test]
fn compact_print_then_reparse_preserves_structure() {
    let mut ctx = Context::new();
    let v = parse(&mut ctx, br#"{"a":1,"b":[1,2,3],"c":"hi"}"#);
    let printed = drjson::print::to_compact_string(&ctx, v);

    let mut ctx2 = Context::new();
    let reparsed = parse(&mut ctx2, printed.as_bytes());

    let a1 = ctx.atomize(b"a");
    let a2 = ctx2.atomize(b"a");
    assert_eq!(ctx.object_get(v, a1), ctx2.object_get(reparsed, a2));

    let c1 = ctx.atomize(b"c");
    let c2 = ctx2.atomize(b"c");
    let s1 = ctx.object_get(v, c1);
    let s2 = ctx2.object_get(reparsed, c2);
    assert_eq!(ctx.resolve(s1.as_atom().unwrap()), ctx2.resolve(s2.as_atom().unwrap()));
}

#[test]
fn pretty_print_nested_object_and_array() {
    let mut ctx = Context::new();
    let v = parse(&mut ctx, br#"{a:{b:1},c:["x","y"]}"#);
    let printed = drjson::print::to_pretty_string(&ctx, v);
    assert!(printed.contains("\"a\": {\n"));
    assert!(printed.contains("  \"b\": 1"));
    assert!(printed.contains("\"x\""));
}

#[test]
fn error_values_print_with_their_code() {
    let ctx = Context::new();
    let e = Value::make_error(drjson::ErrorCode::TypeError, "value is not an array");
    let s = drjson::print::to_compact_string(&ctx, e);
    assert_eq!(s, "Error: TypeError(Code 8): value is not an array");
}

#[test]
fn format_parse_error_locates_the_failure() {
    let mut ctx = Context::new();
    // the value after ':' is ']', which isn't a valid value start; the
    // parser fails there without consuming it, at byte offset 7.
    let src = b"{\n  a: ]\n}";
    let v = parse(&mut ctx, src);
    assert!(v.is_error());
    let (line, col) = drjson::parse::locate(src, 7);
    assert_eq!((line, col), (1, 5));
    let formatted = drjson::print::format_parse_error("doc.json", line, col, &ctx, v);
    assert!(formatted.starts_with("doc.json:2:6:"));
    assert!(formatted.ends_with('\n'));
}
