//! Element storage policy.
//!
//! A [`BlockDeque`] asks its allocator for exactly two kinds of memory: blocks, which are
//! arrays of `B` elements, and the directory, which is an array of block pointers. Both are
//! requested through [`BlockAlloc`] and returned with the same layout they were allocated
//! with. Elements are written into and read out of blocks by the deque itself, the allocator
//! never sees them.
//!
//! [`BlockDeque`]: crate::BlockDeque

use core::alloc::Layout;
use core::ptr::NonNull;

use std::alloc;

use crate::error::AllocError;

/// A source of raw memory for blocks and directories.
///
/// Two allocators that compare equal must be able to free each other's allocations.
/// [`BlockDeque::swap_with`] relies on this to exchange storage between deques without
/// moving elements.
///
/// # Safety
///
/// Memory returned by `allocate` must be valid for reads and writes of `layout.size()` bytes,
/// aligned to `layout.align()`, and stay valid until it is passed to `deallocate` of this
/// allocator or an allocator comparing equal to it.
///
/// [`BlockDeque::swap_with`]: crate::BlockDeque::swap_with
pub unsafe trait BlockAlloc {
    /// Allocates memory for `layout`. The deque never requests a zero-sized layout.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// Releases memory previously returned by `allocate`.
    ///
    /// # Safety
    ///
    /// `ptr` must have been allocated by this allocator (or an equal one) with `layout`.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);
}

unsafe impl<A: BlockAlloc + ?Sized> BlockAlloc for &A {
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        (**self).allocate(layout)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        (**self).deallocate(ptr, layout)
    }
}

/// The global memory allocator, see [`std::alloc`].
///
/// All instances compare equal.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Global;

unsafe impl BlockAlloc for Global {
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        debug_assert!(layout.size() != 0);
        // SAFETY: the deque never requests zero-sized layouts
        NonNull::new(unsafe { alloc::alloc(layout) }).ok_or(AllocError)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        alloc::dealloc(ptr.as_ptr(), layout)
    }
}
