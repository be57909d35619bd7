//! The tagged value type every DrJson operation passes around.
//!
//! `Value` is a small `Copy` sum type: it never owns heap memory directly.
//! Strings are atom handles into [`atom::AtomTable`], arrays and objects are
//! handles into their respective arenas owned by [`crate::context::Context`].
//! A `Value` therefore stays valid only as long as the `Context` it came
//! from — there is no reference counting and no cross-context sharing.

pub mod array;
pub mod atom;

use atom::Atom;

use crate::error::ErrorCode;
use crate::object::ObjectIndex;
use array::ArrayIndex;

/// The discriminant of a [`Value`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[repr(u8)]
pub enum Kind {
    Error = 0,
    Number = 1,
    Integer = 2,
    Uinteger = 3,
    String = 4,
    Array = 5,
    Object = 6,
    Null = 7,
    Bool = 8,
    ArrayView = 9,
    ObjectKeys = 10,
    ObjectValues = 11,
    ObjectItems = 12,
}

impl Kind {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Kind::Error => "error",
            Kind::Number => "number",
            Kind::Integer => "integer",
            Kind::Uinteger => "uinteger",
            Kind::String => "string",
            Kind::Array => "array",
            Kind::Object => "object",
            Kind::Null => "null",
            Kind::Bool => "bool",
            Kind::ArrayView => "array_view",
            Kind::ObjectKeys => "object_keys",
            Kind::ObjectValues => "object_values",
            Kind::ObjectItems => "object_items",
        }
    }

    /// Kinds that behave like a read-only sequence under `len`/`get_by_index`.
    #[must_use]
    pub const fn is_array_like(self) -> bool {
        matches!(
            self,
            Kind::Array | Kind::ArrayView | Kind::ObjectKeys | Kind::ObjectValues | Kind::ObjectItems
        )
    }
}

/// A DrJson value.
///
/// Errors are first-class values (kind [`Kind::Error`]) rather than a
/// separate exception channel, so a producer like [`crate::parse::parse`]
/// or [`crate::path::query`] always returns a plain `Value`.
#[derive(Clone, Copy, Debug)]
pub enum Value {
    Error { code: ErrorCode, message: &'static str },
    Number(f64),
    Integer(i64),
    Uinteger(u64),
    String(Atom),
    Array(ArrayIndex),
    Object(ObjectIndex),
    Null,
    Bool(bool),
    ArrayView(ArrayIndex),
    ObjectKeys(ObjectIndex),
    ObjectValues(ObjectIndex),
    ObjectItems(ObjectIndex),
}

impl Value {
    #[inline]
    #[must_use]
    pub const fn null() -> Self {
        Value::Null
    }

    #[inline]
    #[must_use]
    pub const fn bool(b: bool) -> Self {
        Value::Bool(b)
    }

    #[inline]
    #[must_use]
    pub const fn number(n: f64) -> Self {
        Value::Number(n)
    }

    #[inline]
    #[must_use]
    pub const fn integer(i: i64) -> Self {
        Value::Integer(i)
    }

    #[inline]
    #[must_use]
    pub const fn uinteger(u: u64) -> Self {
        Value::Uinteger(u)
    }

    #[inline]
    #[must_use]
    pub const fn make_error(code: ErrorCode, message: &'static str) -> Self {
        Value::Error { code, message }
    }

    #[must_use]
    pub const fn kind(&self) -> Kind {
        match self {
            Value::Error { .. } => Kind::Error,
            Value::Number(_) => Kind::Number,
            Value::Integer(_) => Kind::Integer,
            Value::Uinteger(_) => Kind::Uinteger,
            Value::String(_) => Kind::String,
            Value::Array(_) => Kind::Array,
            Value::Object(_) => Kind::Object,
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Bool,
            Value::ArrayView(_) => Kind::ArrayView,
            Value::ObjectKeys(_) => Kind::ObjectKeys,
            Value::ObjectValues(_) => Kind::ObjectValues,
            Value::ObjectItems(_) => Kind::ObjectItems,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Value::Error { .. })
    }

    #[inline]
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Value::Number(_) | Value::Integer(_) | Value::Uinteger(_))
    }

    /// The array index backing `Array`/`ArrayView`, if any.
    #[must_use]
    pub const fn as_array_index(&self) -> Option<ArrayIndex> {
        match self {
            Value::Array(i) | Value::ArrayView(i) => Some(*i),
            _ => None,
        }
    }

    /// The object index backing `Object`/`ObjectKeys`/`ObjectValues`/`ObjectItems`, if any.
    #[must_use]
    pub const fn as_object_index(&self) -> Option<ObjectIndex> {
        match self {
            Value::Object(i) | Value::ObjectKeys(i) | Value::ObjectValues(i) | Value::ObjectItems(i) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_atom(&self) -> Option<Atom> {
        match self {
            Value::String(a) => Some(*a),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_error(&self) -> Option<(ErrorCode, &'static str)> {
        match self {
            Value::Error { code, message } => Some((*code, *message)),
            _ => None,
        }
    }
}

/// Shallow structural equality, matching the reference implementation's
/// `drjson_eq`: containers compare by handle (no recursion), and an
/// `Integer` compares equal to a `Uinteger` iff their bit patterns match.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::{Array, ArrayView, Bool, Error, Integer, Null, Number, Object, ObjectItems, ObjectKeys, ObjectValues, String, Uinteger};
        match (self, other) {
            (Integer(a), Integer(b)) => a == b,
            (Uinteger(a), Uinteger(b)) => a == b,
            (Integer(a), Uinteger(b)) | (Uinteger(b), Integer(a)) => *a as u64 == *b,
            (Number(a), Number(b)) => a == b,
            (String(a), String(b)) => a == b,
            (Array(a), Array(b)) | (ArrayView(a), ArrayView(b)) => a == b,
            (Object(a), Object(b))
            | (ObjectKeys(a), ObjectKeys(b))
            | (ObjectValues(a), ObjectValues(b))
            | (ObjectItems(a), ObjectItems(b)) => a == b,
            (Null, Null) => true,
            (Bool(a), Bool(b)) => a == b,
            (Error { code: a, .. }, Error { code: b, .. }) => a == b,
            _ => false,
        }
    }
}
