//! The permissive parser: flags plus the top-level entrypoint.

mod parser;

use bitflags::bitflags;

use crate::context::Context;
use crate::value::Value;

bitflags! {
    /// Flags controlling [`parse`]'s behavior.
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    pub struct ParseFlags: u32 {
        /// Duplicate parsed string bytes into the atom table's allocator.
        /// Set by default in [`parse`] unless [`Self::NO_COPY_STRINGS`] is
        /// also set; the two are mutually exclusive in effect, matching the
        /// reference implementation's `!(flags & NO_COPY_STRINGS)` check.
        const COPY_STRINGS = 1 << 0;
        /// Strings reference the input buffer instead of being duplicated.
        /// The caller must keep that buffer alive for as long as any atom
        /// produced by this parse can still be resolved.
        const NO_COPY_STRINGS = 1 << 1;
        /// Freeze every object and array as it finishes parsing and
        /// canonicalize it via structural interning.
        const INTERN_OBJECTS = 1 << 2;
        /// Parse the input as the body of an object without surrounding
        /// braces (top level is a sequence of `key value` pairs until EOF).
        const BRACELESS_OBJECT = 1 << 3;
    }
}

/// Parses `bytes` per `flags`, returning either a value or, embedded as a
/// `Kind::Error` value, the first parse failure encountered.
///
/// `bytes` must outlive every atom produced by this parse when
/// [`ParseFlags::NO_COPY_STRINGS`] is set (see that flag's documentation).
#[must_use]
pub fn parse(ctx: &mut Context, bytes: &[u8], flags: ParseFlags) -> Value {
    let copy_strings = !flags.contains(ParseFlags::NO_COPY_STRINGS);
    let intern = flags.contains(ParseFlags::INTERN_OBJECTS);
    let mut p = parser::Parser::new(ctx, bytes, copy_strings, intern);
    let result = if flags.contains(ParseFlags::BRACELESS_OBJECT) {
        p.parse_braceless_object()
    } else {
        p.parse_value()
    };
    if let Some((code, message)) = result.as_error() {
        log::warn!("parse aborted: {code:?}: {message}");
    }
    result
}

/// Converts a byte offset into the 0-based `(line, column)` it falls on,
/// by rescanning everything before it. Used to turn a parser's cursor
/// position into something [`crate::print::format_parse_error`] can print;
/// not tracked incrementally during parsing since most callers never need
/// it (only the failure path does).
#[must_use]
pub fn locate(bytes: &[u8], offset: usize) -> (usize, usize) {
    let mut line = 0usize;
    let mut column = 0usize;
    for &b in &bytes[..offset.min(bytes.len())] {
        if b == b'\n' {
            line += 1;
            column = 0;
        } else {
            column += 1;
        }
    }
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locate_on_first_line() {
        assert_eq!(locate(b"abcdef", 3), (0, 3));
    }

    #[test]
    fn locate_after_newlines() {
        assert_eq!(locate(b"ab\ncd\nef", 7), (2, 1));
    }

    #[test]
    fn locate_at_zero() {
        assert_eq!(locate(b"abc", 0), (0, 0));
    }
}
