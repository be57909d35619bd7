//! Memory management subsystem: the allocator hook, content hashing shared
//! by the atom table and the hash-probed structures, and the mark-and-sweep
//! garbage collector.

pub mod allocator;
pub mod gc;
pub mod hash;

pub use allocator::{AllocError, Allocator, SystemAllocator};
pub use gc::gc;
