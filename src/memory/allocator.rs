//! The allocator abstraction.
//!
//! All arenas share one allocator: "the allocator interface (alloc/realloc/
//! free, optional free_all) is the sole channel for heap memory". The trait
//! mirrors the C `alloc/realloc/free` triple; [`SystemAllocator`] is the
//! default and simply forwards to Rust's global allocator. The arenas
//! themselves are `Vec`-backed for safety; this trait is the explicit
//! swap-in point for embedders who want their own backing store rather than
//! the literal allocator behind every `Vec` growth.

use alloc::alloc::{alloc, dealloc, realloc, Layout};
use core::ptr::NonNull;

/// An error returned when the allocator cannot satisfy a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocError;

/// A pluggable heap allocator.
///
/// # Safety
///
/// Implementors must return memory valid for `layout.size()` bytes and
/// aligned to `layout.align()`, and must not alias any other live
/// allocation made through the same allocator.
pub unsafe trait Allocator {
    /// Allocates a fresh, uninitialized block.
    fn alloc(&self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// Grows or shrinks a previously-allocated block, possibly moving it.
    ///
    /// # Safety
    /// `ptr` must have been allocated by this allocator with `old_layout`.
    unsafe fn realloc(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_size: usize,
    ) -> Result<NonNull<u8>, AllocError>;

    /// Releases a previously-allocated block.
    ///
    /// # Safety
    /// `ptr` must have been allocated by this allocator with `layout`.
    unsafe fn dealloc(&self, ptr: NonNull<u8>, layout: Layout);

    /// Releases every allocation made through this allocator in one shot,
    /// if cheaper than freeing piecewise. Default: a no-op.
    fn free_all(&self) {}
}

/// The default allocator: forwards directly to Rust's global allocator.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemAllocator;

// SAFETY: forwards to the global allocator, which upholds the contract
// `Allocator` requires.
unsafe impl Allocator for SystemAllocator {
    fn alloc(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        if layout.size() == 0 {
            return Ok(NonNull::dangling());
        }
        // SAFETY: layout has nonzero size, checked above.
        let p = unsafe { alloc(layout) };
        NonNull::new(p).ok_or(AllocError)
    }

    unsafe fn realloc(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_size: usize,
    ) -> Result<NonNull<u8>, AllocError> {
        if old_layout.size() == 0 {
            let layout = Layout::from_size_align(new_size, old_layout.align()).map_err(|_| AllocError)?;
            return self.alloc(layout);
        }
        if new_size == 0 {
            // SAFETY: caller guarantees `ptr`/`old_layout` describe a live
            // allocation from this allocator.
            unsafe { dealloc(ptr.as_ptr(), old_layout) };
            return Ok(NonNull::dangling());
        }
        // SAFETY: caller guarantees `ptr`/`old_layout` describe a live
        // allocation from this allocator.
        let p = unsafe { realloc(ptr.as_ptr(), old_layout, new_size) };
        NonNull::new(p).ok_or(AllocError)
    }

    unsafe fn dealloc(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() == 0 {
            return;
        }
        // SAFETY: caller guarantees `ptr`/`layout` describe a live
        // allocation from this allocator.
        unsafe { dealloc(ptr.as_ptr(), layout) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_allocator_roundtrip() {
        let a = SystemAllocator;
        let layout = Layout::array::<u64>(16).unwrap();
        let p = a.alloc(layout).unwrap();
        // SAFETY: freshly allocated block of the same layout.
        unsafe { a.dealloc(p, layout) };
    }

    #[test]
    fn system_allocator_zero_size() {
        let a = SystemAllocator;
        let layout = Layout::array::<u64>(0).unwrap();
        let p = a.alloc(layout).unwrap();
        // SAFETY: zero-sized allocation, dealloc is a no-op.
        unsafe { a.dealloc(p, layout) };
    }
}
