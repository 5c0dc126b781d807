//! Allocator Module - pluggable raw memory backend
//!
//! Two primitives, exactly as spec'd: `alloc` and `try_inplace_or_alloc`.
//! Both report the *actual* usable size of the block so callers can exploit
//! over-allocation the way the variable-container growth policy does for
//! bytes/bytearray/str/chrarray buffers.
//!
//! Configured once at [`crate::runtime::initialize`] and immutable for the
//! process lifetime (teacher's translation note for "global mutable
//! allocator pointers": wrap in a trait object set exactly once).

use std::alloc::{self, Layout};
use std::ptr::NonNull;

/// A raw memory backend pluggable at `initialize` time.
///
/// Implementations must uphold two invariants:
/// - `alloc(requested).1 >= requested`
/// - `try_inplace_or_alloc` never copies and never frees; if it cannot grow
///   in place it allocates a fresh block and leaves moving/freeing the old
///   one to the caller.
pub trait RawAllocator {
    /// Allocate at least `requested` bytes. Returns the pointer and the
    /// actual usable size, which may be larger than requested.
    fn alloc(&self, requested: usize) -> Option<(NonNull<u8>, usize)>;

    /// Attempt to extend `ptr` (currently `old_size` bytes) to hold
    /// `requested` bytes in place. If that is not possible, allocates a
    /// fresh block of at least `requested` bytes and returns it — the
    /// caller must copy the live bytes over and separately `dealloc` the
    /// original block.
    fn try_inplace_or_alloc(
        &self,
        ptr: NonNull<u8>,
        old_size: usize,
        requested: usize,
    ) -> Option<(NonNull<u8>, usize)>;

    /// Release a block previously returned by `alloc` or
    /// `try_inplace_or_alloc`.
    ///
    /// # Safety
    /// `ptr` must have been returned by this same allocator and `size` must
    /// be the size it was last (re)allocated at.
    unsafe fn dealloc(&self, ptr: NonNull<u8>, size: usize);
}

/// Default backend: the process's global allocator.
///
/// `realloc_in_place_or_new` has no "in place" primitive in `std::alloc`, so
/// this implementation is honest about it: it always allocates fresh when
/// growing, which satisfies the trait's contract (never copies, never
/// frees) while giving up the over-allocation exploit a bump-pointer-backed
/// allocator could offer. A host embedding this crate in a context with a
/// real in-place realloc (e.g. `libc::realloc`) can swap this out at
/// `initialize` time.
pub struct SystemAllocator;

fn layout_for(size: usize) -> Option<Layout> {
    // 8-byte alignment matches the minimum container alignment every
    // payload type in this crate needs.
    Layout::from_size_align(size.max(1), 8).ok()
}

impl RawAllocator for SystemAllocator {
    fn alloc(&self, requested: usize) -> Option<(NonNull<u8>, usize)> {
        let layout = layout_for(requested)?;
        // SAFETY: layout has non-zero size (size.max(1) above).
        let raw = unsafe { alloc::alloc(layout) };
        let ptr = NonNull::new(raw)?;
        Some((ptr, layout.size()))
    }

    fn try_inplace_or_alloc(
        &self,
        _ptr: NonNull<u8>,
        _old_size: usize,
        requested: usize,
    ) -> Option<(NonNull<u8>, usize)> {
        self.alloc(requested)
    }

    unsafe fn dealloc(&self, ptr: NonNull<u8>, size: usize) {
        if let Some(layout) = layout_for(size) {
            alloc::dealloc(ptr.as_ptr(), layout);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_reports_actual_size() {
        let a = SystemAllocator;
        let (ptr, actual) = a.alloc(10).expect("alloc failed");
        assert!(actual >= 10);
        unsafe { a.dealloc(ptr, actual) };
    }

    #[test]
    fn test_try_inplace_or_alloc_never_shrinks_below_request() {
        let a = SystemAllocator;
        let (ptr, actual) = a.alloc(8).expect("alloc failed");
        let (ptr2, actual2) = a
            .try_inplace_or_alloc(ptr, actual, 64)
            .expect("grow failed");
        assert!(actual2 >= 64);
        unsafe {
            a.dealloc(ptr, actual);
            a.dealloc(ptr2, actual2);
        }
    }
}
