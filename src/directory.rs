//! The block directory.
//!
//! A directory is an array of `cap` block pointers. Only the slots in the logical window
//! `[head, tail)` hold blocks, the slots before and after it are spare room for growing the
//! deque at either end:
//! ```text
//!              head                tail
//!               |                   |
//!               v                   v
//! +-----+-----+-----+-----+-----+-----+-----+
//! |     |     |  *  |  *  |  *  |     |     |
//! +-----+-----+--|--+--|--+--|--+-----+-----+
//!                v     v     v
//!              block block block
//! ```
//! When an end runs out of spare slots the window is either moved back to the middle of the
//! array (if it fills at most half of it) or the array is reallocated with twice the capacity.
//! The directory itself never shrinks. Blocks are released as soon as the deque pops their
//! last element.
//!
//! The directory owns the blocks but not the elements in them: dropping elements is the job
//! of the deque, releasing the blocks and the array is done here.

use core::alloc::Layout;
use core::marker::PhantomData;
use core::mem;
use core::ptr::{self, NonNull};

use crate::alloc::BlockAlloc;
use crate::error::TryReserveError;

pub(crate) struct Directory<T, A: BlockAlloc, const B: usize> {
    // Slots in [head, tail) hold live blocks, all other slots are uninitialized.
    // 0 <= head <= tail <= cap
    slots: NonNull<NonNull<T>>,
    cap: usize,
    head: usize,
    tail: usize,
    alloc: A,
    marker: PhantomData<T>,
}

// SAFETY: the directory exclusively owns its array and blocks, like a `Vec<Box<[T]>>` would
unsafe impl<T: Send, A: BlockAlloc + Send, const B: usize> Send for Directory<T, A, B> {}
// SAFETY: shared access never mutates the array or the blocks
unsafe impl<T: Sync, A: BlockAlloc + Sync, const B: usize> Sync for Directory<T, A, B> {}

impl<T, A: BlockAlloc, const B: usize> Directory<T, A, B> {
    pub(crate) fn new_in(alloc: A) -> Self {
        Self { slots: NonNull::dangling(), cap: 0, head: 0, tail: 0, alloc, marker: PhantomData }
    }

    /// Allocates a directory of exactly `cap` slots with an empty window at slot 0.
    pub(crate) fn try_with_capacity_in(cap: usize, alloc: A) -> Result<Self, TryReserveError> {
        let mut dir = Self::new_in(alloc);
        if cap != 0 {
            dir.reallocate(cap, 0)?;
        }
        Ok(dir)
    }

    /// Number of live blocks.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.tail - self.head
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.cap
    }

    #[inline]
    pub(crate) fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Returns the `i`-th live block.
    ///
    /// # Safety
    ///
    /// `i` must be less than `self.len()`.
    #[inline]
    pub(crate) unsafe fn block(&self, i: usize) -> NonNull<T> {
        debug_assert!(i < self.len());
        *self.slots.as_ptr().add(self.head + i)
    }

    #[inline]
    pub(crate) fn first(&self) -> NonNull<T> {
        assert!(!self.is_empty());
        // SAFETY: the window is not empty
        unsafe { self.block(0) }
    }

    #[inline]
    pub(crate) fn last(&self) -> NonNull<T> {
        assert!(!self.is_empty());
        // SAFETY: the window is not empty
        unsafe { self.block(self.len() - 1) }
    }

    /// Pointer to the slot of the first live block. Reading `self.len()` slots from it is valid
    /// until the directory is modified.
    #[inline]
    pub(crate) fn live_slots(&self) -> NonNull<NonNull<T>> {
        // SAFETY: head <= cap, so the result is in bounds or one past the end of the array
        unsafe { NonNull::new_unchecked(self.slots.as_ptr().add(self.head)) }
    }

    /// Moves an empty window to the middle of the array so that the next block has room to
    /// grow in both directions.
    pub(crate) fn recenter_empty(&mut self) {
        debug_assert!(self.is_empty());
        self.head = self.cap / 2;
        self.tail = self.head;
    }

    /// Allocates a block and appends it to the window.
    pub(crate) fn try_push_back(&mut self) -> Result<(), TryReserveError> {
        self.grow_back()?;
        let block = self.allocate_block()?;
        // SAFETY: grow_back made sure that tail < cap
        unsafe {
            ptr::write(self.slots.as_ptr().add(self.tail), block);
        }
        self.tail += 1;
        Ok(())
    }

    /// Allocates a block and prepends it to the window.
    pub(crate) fn try_push_front(&mut self) -> Result<(), TryReserveError> {
        self.grow_front()?;
        let block = self.allocate_block()?;
        self.head -= 1;
        // SAFETY: grow_front made sure that head > 0
        unsafe {
            ptr::write(self.slots.as_ptr().add(self.head), block);
        }
        Ok(())
    }

    /// Releases the last live block. Its elements must have been moved out or dropped.
    pub(crate) fn pop_back(&mut self) {
        drop(self.detach_back());
    }

    /// Releases the first live block. Its elements must have been moved out or dropped.
    pub(crate) fn pop_front(&mut self) {
        assert!(!self.is_empty());
        // SAFETY: head < tail so the slot holds a live block, which leaves the window here
        unsafe {
            let block = *self.slots.as_ptr().add(self.head);
            self.head += 1;
            self.release_block(block);
        }
    }

    /// Removes the last live block from the window. The block is released when the returned
    /// guard is dropped, which makes it possible to drop the elements in it first.
    pub(crate) fn detach_back(&mut self) -> DetachedBlock<'_, T, A, B> {
        assert!(!self.is_empty());
        self.tail -= 1;
        // SAFETY: the old tail - 1 held a live block and it is no longer part of the window
        let block = unsafe { *self.slots.as_ptr().add(self.tail) };
        DetachedBlock { block, dir: self }
    }

    /// Makes sure there is a spare slot at `tail`.
    fn grow_back(&mut self) -> Result<(), TryReserveError> {
        if self.tail < self.cap {
            return Ok(());
        }
        let live = self.len();
        if self.cap != 0 && live <= self.cap / 2 {
            // tail == cap and live < cap, so head > new_head
            self.recenter((self.cap - live) / 2);
        } else {
            let new_cap = self.grown_capacity()?;
            self.reallocate(new_cap, 0)?;
        }
        debug_assert!(self.tail < self.cap);
        Ok(())
    }

    /// Makes sure there is a spare slot before `head`.
    fn grow_front(&mut self) -> Result<(), TryReserveError> {
        if self.head > 0 {
            return Ok(());
        }
        let live = self.len();
        if self.cap != 0 && live <= self.cap / 2 {
            // head == 0 and cap - live >= 1, so new_head >= 1
            self.recenter((self.cap - live + 1) / 2);
        } else {
            let new_cap = self.grown_capacity()?;
            self.reallocate(new_cap, new_cap - live)?;
        }
        debug_assert!(self.head > 0);
        Ok(())
    }

    fn grown_capacity(&self) -> Result<usize, TryReserveError> {
        match self.cap {
            0 => Ok(1),
            cap => cap.checked_mul(2).ok_or(TryReserveError::CapacityOverflow),
        }
    }

    /// Moves the live slots to start at `new_head` inside the current array.
    fn recenter(&mut self, new_head: usize) {
        let live = self.len();
        debug_assert!(new_head + live <= self.cap);
        // SAFETY: both ranges are inside the array, ptr::copy allows them to overlap
        unsafe {
            ptr::copy(self.slots.as_ptr().add(self.head), self.slots.as_ptr().add(new_head), live);
        }
        self.head = new_head;
        self.tail = new_head + live;
    }

    /// Moves the live slots into a new array of `new_cap` slots, starting at `new_head`.
    /// On failure nothing is changed.
    fn reallocate(&mut self, new_cap: usize, new_head: usize) -> Result<(), TryReserveError> {
        let live = self.len();
        debug_assert!(new_head + live <= new_cap);
        let layout = Layout::array::<NonNull<T>>(new_cap).map_err(|_| TryReserveError::CapacityOverflow)?;
        let new_slots = self
            .alloc
            .allocate(layout)
            .map_err(|_| TryReserveError::AllocError { layout })?
            .cast::<NonNull<T>>();
        // SAFETY: the new array has room for new_head + live slots and does not overlap the old one
        unsafe {
            ptr::copy_nonoverlapping(self.slots.as_ptr().add(self.head), new_slots.as_ptr().add(new_head), live);
        }
        let old_slots = mem::replace(&mut self.slots, new_slots);
        let old_cap = mem::replace(&mut self.cap, new_cap);
        // SAFETY: the old array was allocated by self.alloc with this layout
        unsafe {
            self.release_slots(old_slots, old_cap);
        }
        self.head = new_head;
        self.tail = new_head + live;
        Ok(())
    }

    fn allocate_block(&self) -> Result<NonNull<T>, TryReserveError> {
        let layout = Layout::array::<T>(B).map_err(|_| TryReserveError::CapacityOverflow)?;
        if layout.size() == 0 {
            return Ok(NonNull::dangling());
        }
        self.alloc
            .allocate(layout)
            .map(NonNull::cast)
            .map_err(|_| TryReserveError::AllocError { layout })
    }

    /// # Safety
    ///
    /// `block` must come from `allocate_block` and must not be used afterwards.
    unsafe fn release_block(&self, block: NonNull<T>) {
        // the layout was valid when the block was allocated
        let layout = Layout::array::<T>(B).unwrap_unchecked();
        if layout.size() != 0 {
            self.alloc.deallocate(block.cast(), layout);
        }
    }

    /// # Safety
    ///
    /// `slots` must be an array of `cap` slots allocated by `reallocate`, or `cap` must be 0.
    unsafe fn release_slots(&self, slots: NonNull<NonNull<T>>, cap: usize) {
        if cap != 0 {
            // the layout was valid when the array was allocated
            let layout = Layout::array::<NonNull<T>>(cap).unwrap_unchecked();
            self.alloc.deallocate(slots.cast(), layout);
        }
    }
}

impl<T, A: BlockAlloc, const B: usize> Drop for Directory<T, A, B> {
    fn drop(&mut self) {
        // SAFETY: all slots in the window hold live blocks and the array came from reallocate
        unsafe {
            for i in self.head..self.tail {
                self.release_block(*self.slots.as_ptr().add(i));
            }
            self.release_slots(self.slots, self.cap);
        }
    }
}

/// A block that has left the window but is not released yet, see [`Directory::detach_back`].
pub(crate) struct DetachedBlock<'a, T, A: BlockAlloc, const B: usize> {
    block: NonNull<T>,
    dir: &'a Directory<T, A, B>,
}

impl<T, A: BlockAlloc, const B: usize> DetachedBlock<'_, T, A, B> {
    #[inline]
    pub(crate) fn as_ptr(&self) -> *mut T {
        self.block.as_ptr()
    }
}

impl<T, A: BlockAlloc, const B: usize> Drop for DetachedBlock<'_, T, A, B> {
    fn drop(&mut self) {
        // SAFETY: the block left the window in detach_back, nothing else refers to it
        unsafe {
            self.dir.release_block(self.block);
        }
    }
}
