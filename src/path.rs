//! Reading into a value by path: dotted keys, quoted keys, bracketed
//! integer subscripts, and (live query only) `@keys`/`@values`/`@items`/
//! `@length` view segments.
//!
//! Two related things live here, mirroring a real asymmetry in the
//! reference grammar: [`Path`] is a compiled, reusable sequence of plain
//! key/index segments built once by [`parse_path`] and walked later by
//! [`eval`] — building one never looks at any value, so it can't know
//! whether a bare digit means "array index" or "object key string". The
//! one-shot [`query`] walks the bytes and a value together instead, so it
//! can additionally resolve `@keys` et al. and let a bare digit subscript
//! (no brackets) apply directly to an array.

use alloc::vec::Vec;

use crate::context::Context;
use crate::error::{DrJsonError, ErrorCode};
use crate::value::{Atom, Kind, Value};

/// The most segments a [`Path`] may hold.
pub const PATH_MAX_DEPTH: usize = 32;

/// One step of a compiled [`Path`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathSegment {
    Key(Atom),
    Index(i64),
}

/// A parsed, reusable sequence of key/index segments.
#[derive(Clone, Debug, Default)]
pub struct Path {
    segments: Vec<PathSegment>,
}

impl Path {
    #[must_use]
    pub fn new() -> Self {
        Path { segments: Vec::new() }
    }

    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn add_key(&mut self, key: Atom) -> Result<(), DrJsonError> {
        if self.segments.len() >= PATH_MAX_DEPTH {
            return Err(DrJsonError::new(ErrorCode::AllocFailure, "path exceeds maximum depth"));
        }
        self.segments.push(PathSegment::Key(key));
        Ok(())
    }

    pub fn add_index(&mut self, index: i64) -> Result<(), DrJsonError> {
        if self.segments.len() >= PATH_MAX_DEPTH {
            return Err(DrJsonError::new(ErrorCode::AllocFailure, "path exceeds maximum depth"));
        }
        self.segments.push(PathSegment::Index(index));
        Ok(())
    }
}

/// Parses `bytes` into a compiled [`Path`].
///
/// A leading `.` before the first segment is optional; every following
/// segment must start with `.` (a key) or `[` (an integer subscript).
/// Quoted keys (`."a.b"`) capture their bytes raw, the same as string
/// literals in [`crate::parse`].
pub fn parse_path(ctx: &mut Context, bytes: &[u8]) -> Result<Path, DrJsonError> {
    if bytes.is_empty() {
        return Err(DrJsonError::new(ErrorCode::UnexpectedEof, "path is 0 length"));
    }
    let mut path = Path::new();
    let mut i = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'.' => i = parse_path_key(ctx, bytes, i + 1, &mut path)?,
            b'[' => i = parse_path_subscript(bytes, i + 1, &mut path)?,
            _ if i == 0 => i = parse_path_key(ctx, bytes, 0, &mut path)?,
            _ => return Err(DrJsonError::new(ErrorCode::InvalidChar, "path segments must continue with '.' or '['")),
        }
    }
    Ok(path)
}

fn parse_path_key(ctx: &mut Context, bytes: &[u8], start: usize, path: &mut Path) -> Result<usize, DrJsonError> {
    if start >= bytes.len() {
        return Err(DrJsonError::new(ErrorCode::UnexpectedEof, "empty path segment after '.'"));
    }
    if bytes[start] == b'"' {
        let begin = start + 1;
        let mut j = begin;
        loop {
            let Some(rel) = bytes[j..].iter().position(|&b| b == b'"') else {
                return Err(DrJsonError::new(ErrorCode::UnexpectedEof, "unterminated quoted path segment"));
            };
            let close = j + rel;
            if trailing_backslashes_odd(bytes, begin, close) {
                j = close + 1;
                continue;
            }
            let atom = ctx.atomize(&bytes[begin..close]);
            path.add_key(atom)?;
            return Ok(close + 1);
        }
    }
    let begin = start;
    let mut j = start;
    while j < bytes.len() && !matches!(bytes[j], b'.' | b'[') {
        j += 1;
    }
    if j == begin {
        return Err(DrJsonError::new(ErrorCode::InvalidChar, "0 length path segment"));
    }
    let atom = ctx.atomize(&bytes[begin..j]);
    path.add_key(atom)?;
    Ok(j)
}

fn parse_path_subscript(bytes: &[u8], start: usize, path: &mut Path) -> Result<usize, DrJsonError> {
    let Some(rel) = bytes[start..].iter().position(|&b| b == b']') else {
        return Err(DrJsonError::new(ErrorCode::UnexpectedEof, "no ']' found to close a subscript"));
    };
    let end = start + rel;
    let index = parse_i64(&bytes[start..end]).ok_or_else(|| DrJsonError::new(ErrorCode::InvalidValue, "unable to parse number for subscript"))?;
    path.add_index(index)?;
    Ok(end + 1)
}

/// Evaluates a compiled `path` against `v`, applying each segment in turn
/// and short-circuiting on the first error.
#[must_use]
pub fn eval(ctx: &Context, v: Value, path: &Path) -> Value {
    let mut o = v;
    for seg in path.segments() {
        if o.is_error() {
            return o;
        }
        o = match *seg {
            PathSegment::Key(key) => ctx.object_get(o, key),
            PathSegment::Index(index) => ctx.get_by_index(o, index),
        };
    }
    o
}

/// Evaluates `bytes` as a query directly against `v`, without compiling a
/// reusable [`Path`] first.
///
/// Unlike [`parse_path`]/[`eval`], this understands `@keys`, `@values`,
/// `@items`, `@length` (`#` and `$` are accepted as synonyms for `@`), and
/// lets a bare digit subscript with no brackets apply directly when `v` is
/// currently an array (`a.0` behaves like `a[0]`).
#[must_use]
pub fn query(ctx: &Context, v: Value, bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return Value::make_error(ErrorCode::UnexpectedEof, "query is 0 length");
    }
    let mut o = v;
    let mut i = 0usize;
    while i < bytes.len() {
        let step = match bytes[i] {
            b'.' => step_dot(ctx, bytes, i + 1, o),
            b'[' => step_subscript(ctx, bytes, i + 1, o),
            b'0'..=b'9' if o.kind() == Kind::Array => step_bare_subscript(ctx, bytes, i, o),
            _ if i == 0 => step_dot(ctx, bytes, 0, o),
            _ => Err(Value::make_error(ErrorCode::InvalidChar, "queries must continue with '.' or '['")),
        };
        match step {
            Ok((next, next_i)) => {
                o = next;
                i = next_i;
            }
            Err(e) => return e,
        }
    }
    o
}

/// Like [`query`], but additionally checks the resulting [`Kind`] against
/// `kind` — an `InvalidValue` error replaces an otherwise-successful result
/// of the wrong kind. An error from `query` itself passes through unchanged.
#[must_use]
pub fn checked_query(ctx: &Context, v: Value, kind: Kind, bytes: &[u8]) -> Value {
    let result = query(ctx, v, bytes);
    if result.is_error() || result.kind() == kind {
        result
    } else {
        Value::make_error(ErrorCode::InvalidValue, "query result did not match the requested kind")
    }
}

type Step = Result<(Value, usize), Value>;

fn step_dot(ctx: &Context, bytes: &[u8], i: usize, o: Value) -> Step {
    if i >= bytes.len() {
        return Err(Value::make_error(ErrorCode::UnexpectedEof, "empty query after a '.'"));
    }
    match bytes[i] {
        b'"' => step_quoted(ctx, bytes, i + 1, o),
        b'#' | b'$' | b'@' => step_special(ctx, bytes, i + 1, o),
        b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'/' | b'_' => step_getitem(ctx, bytes, i, o),
        _ => Err(Value::make_error(ErrorCode::InvalidChar, "invalid character identifier")),
    }
}

fn step_getitem(ctx: &Context, bytes: &[u8], begin: usize, o: Value) -> Step {
    let mut i = begin;
    while i < bytes.len() {
        match bytes[i] {
            b'.' | b'[' => break,
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'/' | b'_' | b'-' | b'+' | b'*' => i += 1,
            _ => return Err(Value::make_error(ErrorCode::InvalidChar, "invalid character in identifier query")),
        }
    }
    if i == begin {
        return Err(Value::make_error(ErrorCode::InvalidChar, "0 length query after '.'"));
    }
    let next = ctx.object_get_by_bytes(o, &bytes[begin..i]);
    if next.is_error() {
        return Err(next);
    }
    Ok((next, i))
}

fn step_quoted(ctx: &Context, bytes: &[u8], begin: usize, o: Value) -> Step {
    let mut j = begin;
    loop {
        let Some(rel) = bytes[j..].iter().position(|&b| b == b'"') else {
            return Err(Value::make_error(ErrorCode::UnexpectedEof, "unterminated quoted query"));
        };
        let close = j + rel;
        if trailing_backslashes_odd(bytes, begin, close) {
            j = close + 1;
            continue;
        }
        let next = ctx.object_get_by_bytes(o, &bytes[begin..close]);
        if next.is_error() {
            return Err(next);
        }
        return Ok((next, close + 1));
    }
}

fn step_special(ctx: &Context, bytes: &[u8], i: usize, o: Value) -> Step {
    let rest = &bytes[i..];
    if rest.starts_with(b"keys") {
        return apply_view(ctx, o, Kind::ObjectKeys, "@keys applied to non-object").map(|v| (v, i + 4));
    }
    if rest.starts_with(b"values") {
        return apply_view(ctx, o, Kind::ObjectValues, "@values applied to non-object").map(|v| (v, i + 6));
    }
    if rest.starts_with(b"items") {
        return apply_view(ctx, o, Kind::ObjectItems, "@items applied to non-object").map(|v| (v, i + 5));
    }
    if rest.starts_with(b"length") {
        let len = ctx.len(o);
        if len < 0 {
            return Err(Value::make_error(ErrorCode::TypeError, "length applied to non-object, non-array, non-string"));
        }
        return Ok((Value::uinteger(len as u64), i + 6));
    }
    Err(Value::make_error(ErrorCode::InvalidChar, "unknown special key"))
}

fn apply_view(ctx: &Context, o: Value, kind: Kind, message: &'static str) -> Result<Value, Value> {
    let v = ctx.view(o, kind);
    if v.is_error() {
        Err(Value::make_error(ErrorCode::TypeError, message))
    } else {
        Ok(v)
    }
}

fn step_subscript(ctx: &Context, bytes: &[u8], begin: usize, o: Value) -> Step {
    let mut i = begin;
    while i < bytes.len() {
        match bytes[i] {
            b']' => break,
            b'-' | b'0'..=b'9' => i += 1,
            _ => return Err(Value::make_error(ErrorCode::MissingKey, "invalid subscript character (must be integer)")),
        }
    }
    if i >= bytes.len() {
        return Err(Value::make_error(ErrorCode::UnexpectedEof, "no ']' found to close a subscript"));
    }
    let index = parse_i64(&bytes[begin..i]).ok_or_else(|| Value::make_error(ErrorCode::InvalidValue, "unable to parse number for subscript"))?;
    let next = ctx.get_by_index(o, index);
    if next.is_error() {
        return Err(next);
    }
    Ok((next, i + 1))
}

fn step_bare_subscript(ctx: &Context, bytes: &[u8], begin: usize, o: Value) -> Step {
    let mut i = begin + 1;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let index = parse_i64(&bytes[begin..i]).ok_or_else(|| Value::make_error(ErrorCode::InvalidValue, "unable to parse number for subscript"))?;
    let next = ctx.get_by_index(o, index);
    if next.is_error() {
        return Err(next);
    }
    Ok((next, i))
}

fn trailing_backslashes_odd(bytes: &[u8], begin: usize, close: usize) -> bool {
    let mut backslashes = 0usize;
    let mut k = close;
    while k > begin {
        k -= 1;
        if bytes[k] == b'\\' {
            backslashes += 1;
        } else {
            break;
        }
    }
    backslashes % 2 == 1
}

fn parse_i64(text: &[u8]) -> Option<i64> {
    core::str::from_utf8(text).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{parse, ParseFlags};

    fn fixture(ctx: &mut Context) -> Value {
        parse(ctx, br#"{a: {b: [1,2,3]}, c: "hi"}"#, ParseFlags::empty())
    }

    #[test]
    fn query_dotted_path_reads_nested_value() {
        let mut ctx = Context::new();
        let root = fixture(&mut ctx);
        assert_eq!(query(&ctx, root, b".a.b[1]"), Value::uinteger(2));
    }

    #[test]
    fn query_without_leading_dot() {
        let mut ctx = Context::new();
        let root = fixture(&mut ctx);
        assert_eq!(query(&ctx, root, b"a.b[0]"), Value::uinteger(1));
    }

    #[test]
    fn query_bare_digit_subscript_on_array() {
        let mut ctx = Context::new();
        let root = fixture(&mut ctx);
        let arr = query(&ctx, root, b"a.b");
        assert_eq!(query(&ctx, arr, b".2"), Value::uinteger(3));
    }

    #[test]
    fn query_negative_index() {
        let mut ctx = Context::new();
        let root = fixture(&mut ctx);
        assert_eq!(query(&ctx, root, b".a.b[-1]"), Value::uinteger(3));
    }

    #[test]
    fn query_length_of_array() {
        let mut ctx = Context::new();
        let root = fixture(&mut ctx);
        assert_eq!(query(&ctx, root, b".a.b.@length"), Value::uinteger(3));
    }

    #[test]
    fn query_keys_view_of_object() {
        let mut ctx = Context::new();
        let root = fixture(&mut ctx);
        let keys = query(&ctx, root, b".a.@keys");
        assert_eq!(ctx.len(keys), 1);
    }

    #[test]
    fn query_missing_key_is_an_error() {
        let mut ctx = Context::new();
        let root = fixture(&mut ctx);
        assert!(query(&ctx, root, b".nope").is_error());
    }

    #[test]
    fn parse_path_then_eval_matches_live_query() {
        let mut ctx = Context::new();
        let root = fixture(&mut ctx);
        let path = parse_path(&mut ctx, b".a.b[1]").unwrap();
        assert_eq!(eval(&ctx, root, &path), Value::uinteger(2));
    }

    #[test]
    fn parse_path_reuses_across_different_roots() {
        let mut ctx = Context::new();
        let a = fixture(&mut ctx);
        let b = fixture(&mut ctx);
        let path = parse_path(&mut ctx, b".c").unwrap();
        assert_eq!(eval(&ctx, a, &path), eval(&ctx, b, &path));
    }

    #[test]
    fn checked_query_passes_through_a_matching_kind() {
        let mut ctx = Context::new();
        let root = fixture(&mut ctx);
        assert_eq!(checked_query(&ctx, root, Kind::Uinteger, b".a.b[1]"), Value::uinteger(2));
    }

    #[test]
    fn checked_query_rejects_a_mismatched_kind() {
        let mut ctx = Context::new();
        let root = fixture(&mut ctx);
        let result = checked_query(&ctx, root, Kind::Array, b".c");
        assert!(result.is_error());
    }

    #[test]
    fn checked_query_propagates_the_underlying_query_error() {
        let mut ctx = Context::new();
        let root = fixture(&mut ctx);
        let result = checked_query(&ctx, root, Kind::Integer, b".nope");
        assert!(result.is_error());
    }

    #[test]
    fn parse_path_quoted_key_with_dot_in_it() {
        let mut ctx = Context::new();
        let root = ctx.make_object();
        let key = ctx.atomize(b"weird.key");
        ctx.object_set(root, key, Value::integer(9)).unwrap();
        let path = parse_path(&mut ctx, br#"."weird.key""#).unwrap();
        assert_eq!(eval(&ctx, root, &path), Value::integer(9));
    }
}
