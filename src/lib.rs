//! DrJson: an in-memory document store and parser for a permissive JSON-superset format.
//!
//! The core is a tagged [`value::Value`] backed by two index-addressed arenas
//! (objects and arrays), a global string-interning table ([`value::atom`]),
//! a permissive recursive-descent [`parse`]r, a [`path`] query evaluator,
//! a mark-and-sweep [`memory::gc`], and an optional structural [`intern`]ing
//! layer that deduplicates read-only composite values.
//!
//! Everything is reached through a [`context::Context`]: there is no global
//! state, and values from one context are never valid in another.
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod context;
pub mod error;
mod intern;
mod memory;
mod object;
pub mod parse;
pub mod path;
pub mod print;
pub mod value;

pub use context::Context;
pub use error::{DrJsonError, ErrorCode};
pub use memory::allocator::{Allocator, SystemAllocator};
pub use parse::ParseFlags;
pub use path::Path;
pub use print::PrintFlags;
pub use value::atom::Atom;
pub use value::{Kind, Value};
