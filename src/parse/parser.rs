//! Byte-cursor recursive-descent parser.
//!
//! Mirrors the reference tokenizer's dispatch table directly: whitespace
//! (including commas, colons, `=`, and comments) is skipped between every
//! token, and a failed `number`/`bool`/`null` parse falls back to treating
//! the same bytes as a bareword string instead of hard-erroring, since the
//! grammar lets any of those characters start an identifier too.

use crate::context::Context;
use crate::error::ErrorCode;
use crate::value::Value;

const MAX_DEPTH: u32 = 100;

fn is_bareword_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.' | b'/' | b'+' | b'*')
}

fn hex_value(b: u8) -> u32 {
    let b = b | 0x20;
    if b > b'9' {
        u32::from(b - b'a' + 10)
    } else {
        u32::from(b - b'0')
    }
}

pub(crate) struct Parser<'a> {
    ctx: &'a mut Context,
    bytes: &'a [u8],
    cursor: usize,
    depth: u32,
    copy_strings: bool,
    intern: bool,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(ctx: &'a mut Context, bytes: &'a [u8], copy_strings: bool, intern: bool) -> Self {
        Parser {
            ctx,
            bytes,
            cursor: 0,
            depth: 0,
            copy_strings,
            intern,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.cursor).copied()
    }

    fn err(&self, code: ErrorCode, message: &'static str) -> Value {
        Value::make_error(code, message)
    }

    /// Skips runs of whitespace, `,`, `:`, `=`, `//` line comments, and
    /// `/* */` block comments. Commas and colons count as whitespace so
    /// that both `{a: 1, b: 2}` and `{a 1 b 2}` parse identically.
    fn skip_whitespace(&mut self) {
        loop {
            match self.peek() {
                Some(b) if b <= b' ' || b == b',' || b == b':' || b == b'=' => {
                    self.cursor += 1;
                }
                Some(b'/') if self.bytes.get(self.cursor + 1) == Some(&b'/') => {
                    self.cursor += 2;
                    while !matches!(self.peek(), None | Some(b'\n')) {
                        self.cursor += 1;
                    }
                }
                Some(b'/') if self.bytes.get(self.cursor + 1) == Some(&b'*') => {
                    self.cursor += 2;
                    loop {
                        match self.peek() {
                            None => break,
                            Some(b'*') if self.bytes.get(self.cursor + 1) == Some(&b'/') => {
                                self.cursor += 2;
                                break;
                            }
                            _ => self.cursor += 1,
                        }
                    }
                }
                _ => break,
            }
        }
    }

    /// Parses one value, matching the reference dispatcher byte-for-byte:
    /// each starting character selects a production, and a production that
    /// fails without having consumed input (`number`, `true`/`false`/`null`)
    /// is retried as a bareword string.
    pub(crate) fn parse_value(&mut self) -> Value {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            self.depth -= 1;
            return self.err(ErrorCode::TooDeep, "too many levels of nesting");
        }
        self.skip_whitespace();
        let Some(b) = self.peek() else {
            self.depth -= 1;
            return self.err(ErrorCode::UnexpectedEof, "eof before any values");
        };
        let result = match b {
            b'{' => self.parse_object(),
            b'[' => self.parse_array(),
            b'"' | b'\'' => self.parse_string(),
            b't' | b'f' | b'n' => {
                let lit = self.parse_bool_null();
                if lit.is_error() {
                    self.parse_string()
                } else {
                    lit
                }
            }
            b'#' => {
                self.cursor += 1;
                self.parse_color()
            }
            b'0' => {
                if matches!(self.bytes.get(self.cursor + 1), Some(b'x' | b'X')) {
                    self.cursor += 2;
                    self.parse_hex()
                } else {
                    let num = self.parse_number();
                    if num.is_error() {
                        self.parse_string()
                    } else {
                        num
                    }
                }
            }
            b'+' | b'.' | b'-' | b'1'..=b'9' => {
                let num = self.parse_number();
                if num.is_error() {
                    self.parse_string()
                } else {
                    num
                }
            }
            _ => {
                let s = self.parse_string();
                if s.is_error() {
                    self.err(ErrorCode::InvalidChar, "character is not a valid starting character for a value")
                } else {
                    s
                }
            }
        };
        self.depth -= 1;
        result
    }

    fn parse_object(&mut self) -> Value {
        self.cursor += 1; // '{'
        let result = self.ctx.make_object();
        self.skip_whitespace();
        loop {
            if self.peek() == Some(b'}') {
                self.cursor += 1;
                break;
            }
            if self.peek().is_none() {
                return self.err(ErrorCode::UnexpectedEof, "eof before closing '}'");
            }
            let key = self.parse_string();
            if key.is_error() {
                return key;
            }
            let item = self.parse_value();
            if item.is_error() {
                return item;
            }
            let atom = key.as_atom().expect("parse_string always returns a STRING or an error");
            if self.ctx.object_set(result, atom, item).is_err() {
                return self.err(ErrorCode::AllocFailure, "failed to allocate space for an item while setting member of an object");
            }
            self.skip_whitespace();
        }
        self.finish(result)
    }

    fn parse_array(&mut self) -> Value {
        self.cursor += 1; // '['
        let result = self.ctx.make_array();
        self.skip_whitespace();
        loop {
            if self.peek() == Some(b']') {
                self.cursor += 1;
                break;
            }
            if self.peek().is_none() {
                return self.err(ErrorCode::UnexpectedEof, "eof before closing ']'");
            }
            let item = self.parse_value();
            if item.is_error() {
                return item;
            }
            if self.ctx.array_push(result, item).is_err() {
                return self.err(ErrorCode::AllocFailure, "failed to push an item onto an array");
            }
            self.skip_whitespace();
        }
        self.finish(result)
    }

    /// Parses the top level as repeated `key value` pairs with no
    /// surrounding braces, consuming up to EOF.
    pub(crate) fn parse_braceless_object(&mut self) -> Value {
        let result = self.ctx.make_object();
        self.skip_whitespace();
        while self.peek().is_some() {
            let key = self.parse_string();
            if key.is_error() {
                return key;
            }
            let item = self.parse_value();
            if item.is_error() {
                return item;
            }
            let atom = key.as_atom().expect("parse_string always returns a STRING or an error");
            if self.ctx.object_set(result, atom, item).is_err() {
                return self.err(ErrorCode::AllocFailure, "failed to allocate space for an item while setting member of an object");
            }
            self.skip_whitespace();
        }
        self.finish(result)
    }

    /// Freezes and canonicalizes a just-finished object or array when
    /// `ParseFlags::INTERN_OBJECTS` is set; otherwise a no-op.
    fn finish(&mut self, result: Value) -> Value {
        if !self.intern {
            return result;
        }
        match self.ctx.intern_value(result, true) {
            Ok(v) => v,
            Err(e) => Value::make_error(e.code, e.message),
        }
    }

    /// A quoted or bareword string. Used both as a value production and
    /// (always, regardless of surrounding depth) to read object keys.
    fn parse_string(&mut self) -> Value {
        self.skip_whitespace();
        match self.peek() {
            None => self.err(ErrorCode::UnexpectedEof, "eof when beginning parsing a string"),
            Some(b'"') => self.parse_quoted(b'"'),
            Some(b'\'') => self.parse_quoted(b'\''),
            Some(_) => self.parse_bareword(),
        }
    }

    /// Scans to the first `quote` not preceded by an odd number of
    /// backslashes, without interpreting any escapes: the captured bytes
    /// are stored and later printed verbatim.
    fn parse_quoted(&mut self, quote: u8) -> Value {
        self.cursor += 1;
        let start = self.cursor;
        loop {
            let Some(rel) = self.bytes[self.cursor..].iter().position(|&b| b == quote) else {
                return self.err(ErrorCode::InvalidChar, "no closing quote for a string");
            };
            let close = self.cursor + rel;
            let mut backslashes = 0usize;
            let mut i = close;
            while i > start {
                i -= 1;
                if self.bytes[i] == b'\\' {
                    backslashes += 1;
                } else {
                    break;
                }
            }
            if backslashes % 2 == 1 {
                self.cursor = close + 1;
                continue;
            }
            self.cursor = close + 1;
            return self.ctx.make_string_raw(&self.bytes[start..close], self.copy_strings);
        }
    }

    fn parse_bareword(&mut self) -> Value {
        let start = self.cursor;
        let mut end = start;
        while matches!(self.bytes.get(end), Some(&b) if is_bareword_byte(b)) {
            end += 1;
        }
        if end == start {
            return self.err(ErrorCode::UnexpectedEof, "zero length when expecting a string");
        }
        self.cursor = end;
        self.ctx.make_string_raw(&self.bytes[start..end], self.copy_strings)
    }

    /// Matches `true`, `false`, or `null` exactly. Never consumes input on
    /// failure, so the caller can retry the same bytes as a bareword.
    fn parse_bool_null(&mut self) -> Value {
        let rest = &self.bytes[self.cursor..];
        if rest.starts_with(b"true") {
            self.cursor += 4;
            Value::bool(true)
        } else if rest.starts_with(b"false") {
            self.cursor += 5;
            Value::bool(false)
        } else if rest.starts_with(b"null") {
            self.cursor += 4;
            Value::null()
        } else {
            self.err(ErrorCode::InvalidChar, "invalid literal")
        }
    }

    /// A decimal integer, unsigned integer, or floating-point literal.
    /// Classification: any `.`/`e`/`E` makes it a `NUMBER` (f64); otherwise
    /// a `-` anywhere makes it an `INTEGER` (i64); otherwise `UINTEGER`
    /// (u64). Never consumes input on failure.
    fn parse_number(&mut self) -> Value {
        let start = self.cursor;
        let mut end = start;
        let mut has_exponent = false;
        let mut has_decimal = false;
        let mut has_minus = false;
        loop {
            match self.bytes.get(end) {
                Some(b'e' | b'E') => {
                    has_exponent = true;
                    end += 1;
                }
                Some(b'-') => {
                    has_minus = true;
                    end += 1;
                }
                Some(b'+') => end += 1,
                Some(b'.') => {
                    has_decimal = true;
                    end += 1;
                }
                Some(b) if b.is_ascii_digit() => end += 1,
                _ => break,
            }
        }
        if end == start {
            return self.err(ErrorCode::UnexpectedEof, "zero length number");
        }
        // SAFETY-free: every byte accepted above is ASCII.
        let text = core::str::from_utf8(&self.bytes[start..end]).expect("number literal is pure ASCII");
        if has_exponent || has_decimal {
            match text.parse::<f64>() {
                Ok(n) => {
                    self.cursor = end;
                    Value::number(n)
                }
                Err(_) => self.err(ErrorCode::InvalidValue, "failed to parse number"),
            }
        } else if has_minus {
            match text.parse::<i64>() {
                Ok(n) => {
                    self.cursor = end;
                    Value::integer(n)
                }
                Err(_) => self.err(ErrorCode::InvalidValue, "failed to parse number"),
            }
        } else {
            match text.parse::<u64>() {
                Ok(n) => {
                    self.cursor = end;
                    Value::uinteger(n)
                }
                Err(_) => self.err(ErrorCode::InvalidValue, "failed to parse number"),
            }
        }
    }

    /// `#RGB`, `#RGBA`, `#RRGGBB`, or `#RRGGBBAA`, packed as a UINTEGER
    /// `0xAARRGGBB` (this reorders the reference implementation's byte
    /// layout, which packs alpha/blue/green/red from the top down instead;
    /// `0xAARRGGBB` reads the same order the digits appear in).
    fn parse_color(&mut self) -> Value {
        let start = self.cursor;
        let mut end = start;
        while matches!(self.bytes.get(end), Some(b) if b.is_ascii_hexdigit()) {
            end += 1;
        }
        let len = end - start;
        if len == 0 {
            return self.err(ErrorCode::UnexpectedEof, "0 length color");
        }
        let d = &self.bytes[start..end];
        let byte_pair = |hi: u8, lo: u8| (hex_value(hi) << 4) | hex_value(lo);
        let value: u32 = match len {
            3 => {
                let r = hex_value(d[0]) * 0x11;
                let g = hex_value(d[1]) * 0x11;
                let b = hex_value(d[2]) * 0x11;
                (0xffu32 << 24) | (r << 16) | (g << 8) | b
            }
            4 => {
                let r = hex_value(d[0]) * 0x11;
                let g = hex_value(d[1]) * 0x11;
                let b = hex_value(d[2]) * 0x11;
                let a = hex_value(d[3]) * 0x11;
                (a << 24) | (r << 16) | (g << 8) | b
            }
            6 => {
                let r = byte_pair(d[0], d[1]);
                let g = byte_pair(d[2], d[3]);
                let b = byte_pair(d[4], d[5]);
                (0xffu32 << 24) | (r << 16) | (g << 8) | b
            }
            8 => {
                let r = byte_pair(d[0], d[1]);
                let g = byte_pair(d[2], d[3]);
                let b = byte_pair(d[4], d[5]);
                let a = byte_pair(d[6], d[7]);
                (a << 24) | (r << 16) | (g << 8) | b
            }
            _ => return self.err(ErrorCode::InvalidChar, "colors must be 3, 4, 6 or 8 hex digits after '#'"),
        };
        self.cursor = end;
        Value::uinteger(u64::from(value))
    }

    /// A `0x`-prefixed hex literal, `0x` already consumed by the caller.
    fn parse_hex(&mut self) -> Value {
        let start = self.cursor;
        let mut end = start;
        while matches!(self.bytes.get(end), Some(b) if b.is_ascii_hexdigit()) {
            end += 1;
        }
        let len = end - start;
        if len == 0 {
            return self.err(ErrorCode::InvalidChar, "0 length hex literal");
        }
        if len > 16 {
            return self.err(ErrorCode::InvalidChar, "hex literal longer than 16 digits");
        }
        let mut value: u64 = 0;
        for &b in &self.bytes[start..end] {
            value = (value << 4) | u64::from(hex_value(b));
        }
        self.cursor = end;
        Value::uinteger(value)
    }
}
