//! Rendering a value back to text: compact, pretty (2-space indent), and
//! error formatting.
//!
//! Printing never re-escapes string bytes — they're written out exactly as
//! captured, the same raw bytes the parser stored. [`escape_string`] is a
//! separate utility for a caller that wants to canonicalize a string
//! *before* handing it to the parser or atom table; printing never calls
//! it itself.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Write as _;

use bitflags::bitflags;

use crate::context::Context;
use crate::error::ErrorCode;
use crate::value::Value;

bitflags! {
    /// Flags controlling [`print_value`]'s output.
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    pub struct PrintFlags: u32 {
        /// Multi-line, 2-space indented output instead of one compact line.
        const PRETTY_PRINT = 1 << 0;
        /// Append a trailing `\n` after the value.
        const APPEND_NEWLINE = 1 << 1;
    }
}

/// Renders `v` into `out`, per `flags`. `indent` is the starting
/// indentation level in spaces; only pretty-printing uses it.
pub fn print_value(ctx: &Context, out: &mut String, v: Value, indent: usize, flags: PrintFlags) {
    if flags.contains(PrintFlags::PRETTY_PRINT) {
        push_spaces(out, indent);
        pretty_print_inner(ctx, out, v, indent);
    } else {
        print_inner(ctx, out, v);
    }
    if flags.contains(PrintFlags::APPEND_NEWLINE) {
        out.push('\n');
    }
}

/// Compact single-line rendering of `v`.
#[must_use]
pub fn to_compact_string(ctx: &Context, v: Value) -> String {
    let mut out = String::new();
    print_inner(ctx, &mut out, v);
    out
}

/// Pretty, 2-space indented rendering of `v`.
#[must_use]
pub fn to_pretty_string(ctx: &Context, v: Value) -> String {
    let mut out = String::new();
    pretty_print_inner(ctx, &mut out, v, 0);
    out
}

/// `filename:line:column: <pretty-printed value>\n`, the format used to
/// report a parse error at a located position. `line`/`column` are 0-based;
/// the printed numbers are 1-based, matching the reference formatter.
#[must_use]
pub fn format_parse_error(filename: &str, line: usize, column: usize, ctx: &Context, v: Value) -> String {
    let mut out = String::new();
    if !filename.is_empty() {
        out.push_str(filename);
        out.push(':');
    }
    let _ = write!(out, "{}:{}: ", line + 1, column + 1);
    pretty_print_inner(ctx, &mut out, v, 0);
    out.push('\n');
    out
}

fn push_spaces(out: &mut String, n: usize) {
    for _ in 0..n {
        out.push(' ');
    }
}

/// Writes `bytes` between quotes unmodified. `bytes` came from the atom
/// table or a string handle, neither of which validates UTF-8, so this
/// can't go through `str`/`String` APIs without mangling non-UTF-8 input.
/// Every caller of `print_value`/`to_compact_string`/`to_pretty_string`
/// only inspects the result as bytes, never as `&str`.
fn write_quoted(out: &mut String, bytes: &[u8]) {
    out.push('"');
    // SAFETY: `out` is never read as `&str` while it may hold non-UTF-8
    // bytes; see the caller contract above.
    unsafe { out.as_mut_vec() }.extend_from_slice(bytes);
    out.push('"');
}

fn write_error(out: &mut String, code: ErrorCode, message: &str) {
    let _ = write!(out, "Error: {}(Code {}): {}", code.name(), code as i32, message);
}

fn print_inner(ctx: &Context, out: &mut String, v: Value) {
    match v {
        Value::Number(n) => {
            let _ = write!(out, "{n}");
        }
        Value::Integer(n) => {
            let _ = write!(out, "{n}");
        }
        Value::Uinteger(n) => {
            let _ = write!(out, "{n}");
        }
        Value::String(atom) => write_quoted(out, ctx.resolve(atom)),
        Value::Array(idx) | Value::ArrayView(idx) => {
            out.push('[');
            let items = ctx.arrays().get(idx).items();
            for (i, item) in items.iter().enumerate() {
                if i != 0 {
                    out.push(',');
                }
                print_inner(ctx, out, *item);
            }
            out.push(']');
        }
        Value::Object(idx) => {
            out.push('{');
            let pairs = ctx.objects().get(idx).pairs();
            for (i, (key, value)) in pairs.iter().enumerate() {
                if i != 0 {
                    out.push(',');
                }
                write_quoted(out, ctx.resolve(*key));
                out.push(':');
                print_inner(ctx, out, *value);
            }
            out.push('}');
        }
        Value::ObjectKeys(idx) => {
            out.push('[');
            let pairs = ctx.objects().get(idx).pairs();
            for (i, (key, _)) in pairs.iter().enumerate() {
                if i != 0 {
                    out.push(',');
                }
                write_quoted(out, ctx.resolve(*key));
            }
            out.push(']');
        }
        Value::ObjectValues(idx) => {
            out.push('[');
            let pairs = ctx.objects().get(idx).pairs();
            for (i, (_, value)) in pairs.iter().enumerate() {
                if i != 0 {
                    out.push(',');
                }
                print_inner(ctx, out, *value);
            }
            out.push(']');
        }
        Value::ObjectItems(idx) => {
            out.push('[');
            let pairs = ctx.objects().get(idx).pairs();
            for (i, (key, value)) in pairs.iter().enumerate() {
                if i != 0 {
                    out.push(',');
                }
                write_quoted(out, ctx.resolve(*key));
                out.push(',');
                print_inner(ctx, out, *value);
            }
            out.push(']');
        }
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if b { "true" } else { "false" }),
        Value::Error { code, message } => write_error(out, code, message),
    }
}

/// Pretty-printing puts every object on multiple lines (even a single-pair
/// one) but only puts an array on multiple lines when it's non-empty and
/// its first element isn't numeric — a column of numbers reads better
/// packed onto one line than stretched one-per-line.
fn pretty_print_inner(ctx: &Context, out: &mut String, v: Value, indent: usize) {
    match v {
        Value::Array(idx) | Value::ArrayView(idx) => {
            out.push('[');
            let items = ctx.arrays().get(idx).items();
            let newlined = !items.is_empty() && !items[0].is_numeric();
            if newlined {
                out.push('\n');
            }
            for (i, item) in items.iter().enumerate() {
                if newlined {
                    push_spaces(out, indent + 2);
                }
                pretty_print_inner(ctx, out, *item, indent + 2);
                if i != items.len() - 1 {
                    out.push(',');
                }
                if newlined {
                    out.push('\n');
                }
            }
            if newlined {
                push_spaces(out, indent);
            }
            out.push(']');
        }
        Value::Object(idx) => {
            out.push('{');
            let pairs = ctx.objects().get(idx).pairs();
            for (i, (key, value)) in pairs.iter().enumerate() {
                if i != 0 {
                    out.push(',');
                }
                out.push('\n');
                push_spaces(out, indent + 2);
                write_quoted(out, ctx.resolve(*key));
                out.push(':');
                out.push(' ');
                pretty_print_inner(ctx, out, *value, indent + 2);
            }
            if !pairs.is_empty() {
                out.push('\n');
                push_spaces(out, indent);
            }
            out.push('}');
        }
        Value::ObjectKeys(idx) => {
            out.push('[');
            let pairs = ctx.objects().get(idx).pairs();
            for (i, (key, _)) in pairs.iter().enumerate() {
                if i != 0 {
                    out.push(',');
                }
                out.push('\n');
                push_spaces(out, indent + 2);
                write_quoted(out, ctx.resolve(*key));
            }
            if !pairs.is_empty() {
                out.push('\n');
                push_spaces(out, indent);
            }
            out.push(']');
        }
        Value::ObjectValues(idx) => {
            out.push('[');
            let pairs = ctx.objects().get(idx).pairs();
            for (i, (_, value)) in pairs.iter().enumerate() {
                if i != 0 {
                    out.push(',');
                }
                out.push('\n');
                push_spaces(out, indent + 2);
                pretty_print_inner(ctx, out, *value, indent + 2);
            }
            if !pairs.is_empty() {
                out.push('\n');
                push_spaces(out, indent);
            }
            out.push(']');
        }
        Value::ObjectItems(idx) => {
            out.push('[');
            let pairs = ctx.objects().get(idx).pairs();
            for (i, (key, value)) in pairs.iter().enumerate() {
                if i != 0 {
                    out.push(',');
                }
                out.push('\n');
                push_spaces(out, indent + 2);
                write_quoted(out, ctx.resolve(*key));
                out.push(',');
                out.push(' ');
                pretty_print_inner(ctx, out, *value, indent + 2);
            }
            if !pairs.is_empty() {
                out.push('\n');
                push_spaces(out, indent);
            }
            out.push(']');
        }
        // Scalars print identically in both modes.
        scalar => print_inner(ctx, out, scalar),
    }
}

/// Escapes control bytes, `"`, and `\` the way a quoted string literal
/// needs them written to be re-parsed losslessly. Returns `None` if `bytes`
/// needed no escaping at all, so the caller can keep using it unmodified.
#[must_use]
pub fn escape_string(bytes: &[u8]) -> Option<String> {
    if bytes.is_empty() || !bytes.iter().any(|&b| needs_escape(b)) {
        return None;
    }
    let mut out = Vec::with_capacity(bytes.len() * 2);
    for &b in bytes {
        match b {
            b'"' => out.extend_from_slice(b"\\\""),
            b'\\' => out.extend_from_slice(b"\\\\"),
            0x08 => out.extend_from_slice(b"\\b"),
            0x0c => out.extend_from_slice(b"\\f"),
            b'\n' => out.extend_from_slice(b"\\n"),
            b'\r' => out.extend_from_slice(b"\\r"),
            b'\t' => out.extend_from_slice(b"\\t"),
            0..=0x1f => {
                const HEX: &[u8; 16] = b"0123456789abcdef";
                out.extend_from_slice(b"\\u00");
                out.push(HEX[(b >> 4) as usize]);
                out.push(HEX[(b & 0xf) as usize]);
            }
            _ => out.push(b),
        }
    }
    // SAFETY: `out` may not be valid UTF-8, since `bytes` is caller-supplied
    // raw bytes with no UTF-8 invariant and the passthrough branch above
    // copies unescaped bytes straight through. Same non-`&str` contract as
    // `write_quoted`.
    Some(unsafe { String::from_utf8_unchecked(out) })
}

fn needs_escape(b: u8) -> bool {
    matches!(b, 0..=0x1f | b'"' | b'\\')
}
