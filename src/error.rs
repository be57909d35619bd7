//! Stable error codes and the error type returned by fallible operations.
//!
//! Errors are values, not exceptions: parsing and querying return an
//! [`ErrorCode`]-tagged [`Value`](crate::value::Value) of kind
//! [`Kind::Error`](crate::value::Kind::Error); mutators that cannot fail
//! gracefully return a [`DrJsonError`].

/// The stable external error enumeration.
///
/// Taxonomy: *structural* (`UnexpectedEof`, `InvalidChar`, `InvalidValue`,
/// `TooDeep`) arise from the parser; *lookup* (`MissingKey`, `IndexError`)
/// from queries; *type* (`TypeError`) from operations applied to the wrong
/// kind or to a read-only container; *resource* (`AllocFailure`) from the
/// allocator.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorCode {
    #[error("no error")]
    None = 0,
    #[error("unexpected end of input")]
    UnexpectedEof = 1,
    #[error("allocation failure")]
    AllocFailure = 2,
    #[error("missing key")]
    MissingKey = 3,
    #[error("index out of bounds")]
    IndexError = 4,
    #[error("invalid character")]
    InvalidChar = 5,
    #[error("invalid value")]
    InvalidValue = 6,
    #[error("nesting too deep")]
    TooDeep = 7,
    #[error("type error")]
    TypeError = 8,
    #[error("invalid error value")]
    InvalidError = 9,
}

impl ErrorCode {
    /// The name used by the printer (`Error: <name>(Code N): <message>`).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            ErrorCode::None => "None",
            ErrorCode::UnexpectedEof => "UnexpectedEof",
            ErrorCode::AllocFailure => "AllocFailure",
            ErrorCode::MissingKey => "MissingKey",
            ErrorCode::IndexError => "IndexError",
            ErrorCode::InvalidChar => "InvalidChar",
            ErrorCode::InvalidValue => "InvalidValue",
            ErrorCode::TooDeep => "TooDeep",
            ErrorCode::TypeError => "TypeError",
            ErrorCode::InvalidError => "InvalidError",
        }
    }
}

/// An error raised by a mutator (`set`, `delete`, `intern_value`, ...) that
/// has no sensible ERROR-kind `Value` to return, because the call didn't
/// produce a value at all.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct DrJsonError {
    pub code: ErrorCode,
    pub message: &'static str,
}

impl DrJsonError {
    #[must_use]
    pub const fn new(code: ErrorCode, message: &'static str) -> Self {
        DrJsonError { code, message }
    }
}
