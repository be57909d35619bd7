//! The object arena.

pub mod object;

pub use object::{ObjectArena, ObjectIndex, ObjectRecord, OBJECT_MAX};
