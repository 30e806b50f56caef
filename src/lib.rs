//! A double-ended queue stored as a directory of fixed-size blocks.
//!
//! [`BlockDeque`] is an alternative to the standard library's `VecDeque`. Instead of one
//! ring buffer it keeps its elements in blocks of `B` elements each, and a resizable array of
//! pointers to those blocks (the directory):
//! ```text
//!                  directory
//!      +------+------+------+------+------+
//!      |      |  *   |  *   |  *   |      |
//!      +------+--|---+--|---+--|---+------+
//!                |      |      |
//!                v      v      v
//!          +---+---+  +---+---+  +---+---+
//!          |   | 0 |  | 1 | 2 |  | 3 |   |
//!          +---+---+  +---+---+  +---+---+
//!                ^                     ^
//!              front                 back
//! ```
//! The element at index `i` lives in block `(front + i) / B` at offset `(front + i) % B`, so
//! random access is *O(1)*. Pushing at either end writes into the outermost block and only
//! allocates a new block every `B` pushes. Only when the directory runs out of spare slots at
//! an end it is re-centered or reallocated with twice the capacity, which happens
//! *O(log n)* times for *n* pushes.
//!
//! Compared to a ring buffer this has some advantages:
//! - elements never move when the deque grows, only the directory does
//! - memory is allocated and released in block sized steps, a drained block is given back
//!   immediately
//! - no need for a power of 2 capacity
//!
//! But also a few disadvantages:
//! - accessing an element needs two dependent loads
//! - the elements are not contiguous, there is no `as_slices`
//! - the directory never shrinks, a deque that once held many elements keeps a large
//!   (but cheap) array of block pointers
//!
//! The block capacity `B` is a const parameter and defaults to
//! [`DEFAULT_BLOCK_CAPACITY`]. All memory is requested from a [`BlockAlloc`], which defaults
//! to the [`Global`] allocator.
//!
//! `BlockDeque` is not thread-safe in the sense that it does no synchronization of its own;
//! it is `Send` and `Sync` when its elements and allocator are, like the standard
//! collections.

use core::cmp::{self, Ordering};
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;
use core::ops::{Bound, Index, IndexMut, Range, RangeBounds};

use std::alloc::handle_alloc_error;
use std::fmt;
use std::iter::{repeat, repeat_with};
use std::mem;
use std::ptr;

#[macro_use]
mod macros;

mod alloc;
mod cursor;
mod directory;
mod error;
mod into_iter;
mod iter;
mod position;

pub use crate::alloc::{BlockAlloc, Global};
pub use cursor::{Cursor, CursorMut};
pub use error::{AllocError, OutOfRange, TryReserveError};
pub use into_iter::IntoIter;
pub use iter::{Iter, IterMut};

use directory::Directory;
use position::Position;


/// Block capacity used when `B` is not given.
pub const DEFAULT_BLOCK_CAPACITY: usize = 512;

/// A double-ended queue stored as a directory of blocks holding `B` elements each.
///
/// See the [module-level documentation](./index.html) for more details.
///
/// # Iterator and cursor validity
///
/// [`Iter`], [`IterMut`], [`Cursor`] and [`CursorMut`] borrow the deque, so the compiler
/// rejects any use of them after the deque has been modified. Internally they hold a logical
/// index and resolve it through the deque on every access, never a cached element address.
pub struct BlockDeque<T, A: BlockAlloc = Global, const B: usize = DEFAULT_BLOCK_CAPACITY> {
    // front is the offset of the first element in the first live block,
    // back is the offset one past the last element in the last live block.
    // If the directory has no live blocks the deque is empty and both are meaningless.
    // Otherwise front < B and 1 <= back <= B, and front < back if there is only one block.
    front: usize,
    back: usize,
    dir: Directory<T, A, B>,
    marker: PhantomData<T>,
}

impl<T> BlockDeque<T> {
    /// Creates an empty deque. This does not allocate.
    ///
    /// # Examples
    ///
    /// ```
    /// use blockdeque::BlockDeque;
    ///
    /// let deque: BlockDeque<i32> = BlockDeque::new();
    /// assert_eq!(deque.directory_capacity(), 0);
    /// ```
    pub fn new() -> Self {
        Self::new_in(Global)
    }

    /// Creates a deque of `len` clones of `value`, centered in exactly as many blocks as
    /// needed.
    ///
    /// # Examples
    ///
    /// ```
    /// # use blockdeque::BlockDeque;
    /// let deque = BlockDeque::from_elem(25, 7);
    /// assert_eq!(deque.len(), 25);
    /// assert!(deque.iter().all(|&x| x == 7));
    /// ```
    pub fn from_elem(len: usize, value: T) -> Self
    where
        T: Clone,
    {
        Self::from_elem_in(len, value, Global)
    }
}

impl<T, A: BlockAlloc, const B: usize> BlockDeque<T, A, B> {
    const NON_ZERO_BLOCK: () = assert!(B > 0, "block capacity must not be zero");

    /// Creates an empty deque that will allocate from `alloc`. This does not allocate.
    ///
    /// # Examples
    ///
    /// ```
    /// use blockdeque::{BlockDeque, Global};
    ///
    /// let deque: BlockDeque<i32, Global, 16> = BlockDeque::new_in(Global);
    /// assert!(deque.is_empty());
    /// ```
    pub fn new_in(alloc: A) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::NON_ZERO_BLOCK;
        Self { front: 0, back: 0, dir: Directory::new_in(alloc), marker: PhantomData }
    }

    /// Creates a deque of `len` clones of `value` that allocates from `alloc`.
    ///
    /// See [`from_elem`](BlockDeque::from_elem).
    pub fn from_elem_in(len: usize, value: T, alloc: A) -> Self
    where
        T: Clone,
    {
        Self::from_iter_exact(alloc, len, repeat(value))
    }

    /// Builds a deque from the first `len` items of `items`, using a directory of exactly as many
    /// blocks as needed and centering the elements across them.
    ///
    /// A panic while producing an item drops the elements written so far and releases all
    /// memory, because the deque under construction owns everything.
    fn from_iter_exact<I>(alloc: A, len: usize, items: I) -> Self
    where
        I: Iterator<Item = T>,
    {
        if len == 0 {
            return Self::new_in(alloc);
        }
        let blocks = len / B + usize::from(len % B != 0);
        let slack = match blocks.checked_mul(B) {
            Some(total) => total - len,
            None => capacity_overflow(),
        };
        let dir = Directory::try_with_capacity_in(blocks, alloc).unwrap_or_else(|err| handle_reserve(err));
        let mut deque = Self { front: slack / 2, back: slack / 2, dir, marker: PhantomData };
        // The first block is allocated here so that front survives the first push_back.
        // Until then it is a live block without elements, len() is still 0.
        if let Err(err) = deque.dir.try_push_back() {
            handle_reserve(err);
        }
        for item in items.take(len) {
            deque.push_back(item);
        }
        if deque.dir.len() == 1 && deque.front == deque.back {
            // the iterator was shorter than promised
            deque.dir.pop_back();
        }
        deque.debug_check();
        deque
    }

    /// Returns a reference to the allocator backing this deque.
    #[inline]
    pub fn allocator(&self) -> &A {
        self.dir.allocator()
    }

    /// Returns the number of elements in the deque.
    ///
    /// # Examples
    ///
    /// ```
    /// # use blockdeque::BlockDeque;
    /// let deque = BlockDeque::from([1, 2, 3]);
    /// assert_eq!(deque.len(), 3);
    /// ```
    #[inline]
    pub fn len(&self) -> usize {
        match self.dir.len() {
            0 => 0,
            blocks => Position { block: blocks - 1, offset: self.back }.index::<B>(self.front),
        }
    }

    /// Returns whether the deque is empty or not.
    ///
    /// # Examples
    ///
    /// ```
    /// # use blockdeque::BlockDeque;
    /// let mut deque = BlockDeque::new();
    /// assert!(deque.is_empty());
    /// deque.push_back(42);
    /// assert!(!deque.is_empty());
    /// ```
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of blocks currently allocated.
    ///
    /// # Examples
    ///
    /// ```
    /// # use blockdeque::{BlockDeque, Global};
    /// let mut deque: BlockDeque<i32, Global, 4> = BlockDeque::new_in(Global);
    /// deque.extend(0..6);
    /// assert_eq!(deque.block_count(), 2);
    /// deque.clear();
    /// assert_eq!(deque.block_count(), 0);
    /// ```
    #[inline]
    pub fn block_count(&self) -> usize {
        self.dir.len()
    }

    /// Returns the number of block slots in the directory. The directory is never shrunk, so
    /// this only ever grows.
    #[inline]
    pub fn directory_capacity(&self) -> usize {
        self.dir.capacity()
    }

    /// Returns the address of the element at `index`.
    ///
    /// # Safety
    ///
    /// `index` must be less than `self.len()`.
    #[inline]
    pub(crate) unsafe fn ptr_at(&self, index: usize) -> *mut T {
        debug_assert!(index < self.len());
        let pos = Position::of::<B>(self.front, index);
        self.dir.block(pos.block).as_ptr().add(pos.offset)
    }

    /// Provides a reference to the element at the given index.
    ///
    /// Element at index 0 is the front of the deque.
    ///
    /// # Examples
    ///
    /// ```
    /// # use blockdeque::BlockDeque;
    /// let deque = BlockDeque::from([1, 2, 3]);
    /// assert_eq!(deque.get(1), Some(&2));
    /// assert_eq!(deque.get(3), None);
    /// ```
    pub fn get(&self, index: usize) -> Option<&T> {
        if index < self.len() {
            // SAFETY: index < len
            unsafe { Some(&*self.ptr_at(index)) }
        } else {
            None
        }
    }

    /// Provides a mutable reference to the element at the given index.
    ///
    /// # Examples
    ///
    /// ```
    /// # use blockdeque::BlockDeque;
    /// let mut deque = BlockDeque::from([1, 2, 3]);
    /// *deque.get_mut(1).unwrap() += 40;
    /// assert_eq!(deque.get(1), Some(&42));
    /// ```
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index < self.len() {
            // SAFETY: index < len
            unsafe { Some(&mut *self.ptr_at(index)) }
        } else {
            None
        }
    }

    /// Provides a reference to the element at the given index without bounds checking.
    ///
    /// # Safety
    ///
    /// Calling this with `index >= self.len()` is undefined behavior.
    #[inline]
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        &*self.ptr_at(index)
    }

    /// Provides a mutable reference to the element at the given index without bounds checking.
    ///
    /// # Safety
    ///
    /// Calling this with `index >= self.len()` is undefined behavior.
    #[inline]
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        &mut *self.ptr_at(index)
    }

    /// Bounds checked access to the element at the given index.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRange`] if `index >= self.len()`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use blockdeque::{BlockDeque, OutOfRange};
    /// let deque = BlockDeque::from([1, 2, 3]);
    /// assert_eq!(deque.at(2), Ok(&3));
    /// assert_eq!(deque.at(3), Err(OutOfRange { index: 3, len: 3 }));
    /// ```
    pub fn at(&self, index: usize) -> Result<&T, OutOfRange> {
        let len = self.len();
        self.get(index).ok_or(OutOfRange { index, len })
    }

    /// Bounds checked mutable access to the element at the given index.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRange`] if `index >= self.len()`.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, OutOfRange> {
        let len = self.len();
        self.get_mut(index).ok_or(OutOfRange { index, len })
    }

    /// Provides a reference to the front element, or `None` if the deque is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// # use blockdeque::BlockDeque;
    /// let mut deque = BlockDeque::new();
    /// assert_eq!(deque.front(), None);
    /// deque.push_back(1);
    /// deque.push_back(2);
    /// assert_eq!(deque.front(), Some(&1));
    /// ```
    pub fn front(&self) -> Option<&T> {
        if self.dir.is_empty() {
            None
        } else {
            // SAFETY: a live first block holds an element at front
            unsafe { Some(&*self.dir.first().as_ptr().add(self.front)) }
        }
    }

    /// Provides a mutable reference to the front element, or `None` if the deque is empty.
    pub fn front_mut(&mut self) -> Option<&mut T> {
        if self.dir.is_empty() {
            None
        } else {
            // SAFETY: a live first block holds an element at front
            unsafe { Some(&mut *self.dir.first().as_ptr().add(self.front)) }
        }
    }

    /// Provides a reference to the back element, or `None` if the deque is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// # use blockdeque::BlockDeque;
    /// let mut deque = BlockDeque::new();
    /// assert_eq!(deque.back(), None);
    /// deque.push_back(1);
    /// deque.push_back(2);
    /// assert_eq!(deque.back(), Some(&2));
    /// ```
    pub fn back(&self) -> Option<&T> {
        if self.dir.is_empty() {
            None
        } else {
            // SAFETY: a live last block holds an element at back - 1
            unsafe { Some(&*self.dir.last().as_ptr().add(self.back - 1)) }
        }
    }

    /// Provides a mutable reference to the back element, or `None` if the deque is empty.
    pub fn back_mut(&mut self) -> Option<&mut T> {
        if self.dir.is_empty() {
            None
        } else {
            // SAFETY: a live last block holds an element at back - 1
            unsafe { Some(&mut *self.dir.last().as_ptr().add(self.back - 1)) }
        }
    }

    /// Appends an element to the back of the deque.
    ///
    /// # Panics
    ///
    /// Panics if the directory would exceed `isize::MAX` bytes. Aborts through
    /// [`handle_alloc_error`] if the allocator fails, use [`try_push_back`] to handle that.
    ///
    /// [`try_push_back`]: BlockDeque::try_push_back
    ///
    /// # Examples
    ///
    /// ```
    /// # use blockdeque::BlockDeque;
    /// let mut deque = BlockDeque::new();
    /// deque.push_back(1);
    /// deque.push_back(2);
    /// deque.push_back(3);
    /// assert_eq!(deque, [1, 2, 3]);
    /// ```
    pub fn push_back(&mut self, value: T) {
        if let Err(err) = self.try_push_back(value) {
            handle_reserve(err);
        }
    }

    /// Appends an element to the back of the deque, reporting allocation failure.
    ///
    /// # Errors
    ///
    /// If a new block or a larger directory can not be allocated the deque is left unchanged,
    /// `value` is dropped and the error is returned.
    pub fn try_push_back(&mut self, value: T) -> Result<(), TryReserveError> {
        if self.dir.is_empty() {
            self.dir.recenter_empty();
            self.dir.try_push_back()?;
            self.front = B / 2;
            self.back = B / 2;
        } else if self.back == B {
            self.dir.try_push_back()?;
            self.back = 0;
        }
        // SAFETY: back < B and the last block is live
        unsafe {
            ptr::write(self.dir.last().as_ptr().add(self.back), value);
        }
        self.back += 1;
        self.debug_check();
        Ok(())
    }

    /// Prepends an element to the front of the deque.
    ///
    /// # Panics
    ///
    /// Same as [`push_back`](BlockDeque::push_back).
    ///
    /// # Examples
    ///
    /// ```
    /// # use blockdeque::BlockDeque;
    /// let mut deque = BlockDeque::new();
    /// deque.push_front(1);
    /// deque.push_front(2);
    /// deque.push_front(3);
    /// assert_eq!(deque, [3, 2, 1]);
    /// ```
    pub fn push_front(&mut self, value: T) {
        if let Err(err) = self.try_push_front(value) {
            handle_reserve(err);
        }
    }

    /// Prepends an element to the front of the deque, reporting allocation failure.
    ///
    /// # Errors
    ///
    /// Same as [`try_push_back`](BlockDeque::try_push_back).
    pub fn try_push_front(&mut self, value: T) -> Result<(), TryReserveError> {
        if self.dir.is_empty() {
            self.dir.recenter_empty();
            self.dir.try_push_back()?;
            // rounded up so that a block of one element still has room in front
            self.front = (B + 1) / 2;
            self.back = self.front;
        } else if self.front == 0 {
            self.dir.try_push_front()?;
            self.front = B;
        }
        self.front -= 1;
        // SAFETY: front < B and the first block is live
        unsafe {
            ptr::write(self.dir.first().as_ptr().add(self.front), value);
        }
        self.debug_check();
        Ok(())
    }

    /// Removes the last element from the deque and returns it, or `None` if the deque is empty.
    ///
    /// The last block is released when it becomes empty.
    ///
    /// # Examples
    ///
    /// ```
    /// # use blockdeque::BlockDeque;
    /// let mut deque = BlockDeque::from([1, 2]);
    /// assert_eq!(deque.pop_back(), Some(2));
    /// assert_eq!(deque.pop_back(), Some(1));
    /// assert_eq!(deque.pop_back(), None);
    /// ```
    pub fn pop_back(&mut self) -> Option<T> {
        if self.dir.is_empty() {
            return None;
        }
        self.back -= 1;
        // SAFETY: the element at back was live, it is moved out and the cursor no longer covers it
        let value = unsafe { ptr::read(self.dir.last().as_ptr().add(self.back)) };
        if self.dir.len() == 1 && self.back == self.front {
            self.dir.pop_back();
        } else if self.back == 0 {
            self.dir.pop_back();
            self.back = B;
        }
        self.debug_check();
        Some(value)
    }

    /// Removes the first element and returns it, or `None` if the deque is empty.
    ///
    /// The first block is released when it becomes empty.
    ///
    /// # Examples
    ///
    /// ```
    /// # use blockdeque::BlockDeque;
    /// let mut deque = BlockDeque::from([1, 2]);
    /// assert_eq!(deque.pop_front(), Some(1));
    /// assert_eq!(deque.pop_front(), Some(2));
    /// assert_eq!(deque.pop_front(), None);
    /// ```
    pub fn pop_front(&mut self) -> Option<T> {
        if self.dir.is_empty() {
            return None;
        }
        // SAFETY: the element at front was live, it is moved out and the cursor no longer covers it
        let value = unsafe { ptr::read(self.dir.first().as_ptr().add(self.front)) };
        self.front += 1;
        if self.dir.len() == 1 && self.front == self.back {
            self.dir.pop_front();
        } else if self.front == B {
            self.dir.pop_front();
            self.front = 0;
        }
        self.debug_check();
        Some(value)
    }

    /// Swaps elements at indices `i` and `j`.
    ///
    /// `i` and `j` may be equal.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// # use blockdeque::BlockDeque;
    /// let mut deque = BlockDeque::from([1, 2, 3]);
    /// deque.swap(0, 2);
    /// assert_eq!(deque, [3, 2, 1]);
    /// ```
    pub fn swap(&mut self, i: usize, j: usize) {
        let len = self.len();
        if i >= len {
            index_out_of_bounds(len, i);
        }
        if j >= len {
            index_out_of_bounds(len, j);
        }
        // SAFETY: both indices are in bounds
        unsafe {
            self.swap_unchecked(i, j);
        }
    }

    /// # Safety
    ///
    /// Both indices must be less than `self.len()`.
    #[inline]
    unsafe fn swap_unchecked(&mut self, i: usize, j: usize) {
        ptr::swap(self.ptr_at(i), self.ptr_at(j));
    }

    /// Removes an element from anywhere in the deque and returns it, or `None` if `index` is
    /// out of bounds. The removed element is replaced with the front element.
    ///
    /// This does not preserve ordering, but is *O(1)*.
    ///
    /// # Examples
    ///
    /// ```
    /// # use blockdeque::BlockDeque;
    /// let mut deque = BlockDeque::from([1, 2, 3, 4]);
    /// assert_eq!(deque.swap_remove_front(2), Some(3));
    /// assert_eq!(deque, [2, 1, 4]);
    /// ```
    pub fn swap_remove_front(&mut self, index: usize) -> Option<T> {
        if index < self.len() {
            // SAFETY: index < len and len > 0
            unsafe {
                self.swap_unchecked(index, 0);
            }
            self.pop_front()
        } else {
            None
        }
    }

    /// Removes an element from anywhere in the deque and returns it, or `None` if `index` is
    /// out of bounds. The removed element is replaced with the back element.
    ///
    /// This does not preserve ordering, but is *O(1)*.
    ///
    /// # Examples
    ///
    /// ```
    /// # use blockdeque::BlockDeque;
    /// let mut deque = BlockDeque::from([1, 2, 3, 4]);
    /// assert_eq!(deque.swap_remove_back(1), Some(2));
    /// assert_eq!(deque, [1, 4, 3]);
    /// ```
    pub fn swap_remove_back(&mut self, index: usize) -> Option<T> {
        let len = self.len();
        if index < len {
            // SAFETY: index < len and len > 0
            unsafe {
                self.swap_unchecked(index, len - 1);
            }
            self.pop_back()
        } else {
            None
        }
    }

    /// Removes and returns the element at `index` from the deque. Returns `None` if `index` is
    /// out of bounds. The elements between `index` and the nearer end are shifted one place to
    /// close the gap.
    ///
    /// This preserves ordering, but takes *O(min(index, len - index))* time.
    ///
    /// # Examples
    ///
    /// ```
    /// # use blockdeque::BlockDeque;
    /// let mut deque = BlockDeque::from([0, 1, 2, 3, 4]);
    /// assert_eq!(deque.remove(2), Some(2));
    /// assert_eq!(deque, [0, 1, 3, 4]);
    /// ```
    pub fn remove(&mut self, index: usize) -> Option<T> {
        let len = self.len();
        if index >= len {
            return None;
        }
        // SAFETY: all swapped indices are below len
        unsafe {
            if index < len - 1 - index {
                for i in (0..index).rev() {
                    self.swap_unchecked(i, i + 1);
                }
                self.pop_front()
            } else {
                for i in index..len - 1 {
                    self.swap_unchecked(i, i + 1);
                }
                self.pop_back()
            }
        }
    }

    /// Inserts an element at `index` within the deque. The elements between `index` and the
    /// nearer end are shifted one place to make room.
    ///
    /// This takes *O(min(index, len - index))* time.
    ///
    /// # Panics
    ///
    /// Panics if `index` is greater than the deque's length.
    ///
    /// # Examples
    ///
    /// ```
    /// # use blockdeque::BlockDeque;
    /// let mut deque = BlockDeque::from([0, 1, 3, 4]);
    /// deque.insert(2, 99);
    /// assert_eq!(deque, [0, 1, 99, 3, 4]);
    /// ```
    pub fn insert(&mut self, index: usize, value: T) {
        let len = self.len();
        if index > len {
            index_out_of_bounds(len, index);
        }
        // SAFETY: after the push there are len + 1 elements, all swapped indices are <= len
        unsafe {
            if index < len - index {
                self.push_front(value);
                for i in 0..index {
                    self.swap_unchecked(i, i + 1);
                }
            } else {
                self.push_back(value);
                for i in (index..len).rev() {
                    self.swap_unchecked(i, i + 1);
                }
            }
        }
    }

    /// Shortens the deque, keeping the first `len` elements and dropping the rest.
    ///
    /// If `len` is greater than the deque's current length, this is a no-op. Blocks that
    /// become empty are released.
    ///
    /// # Examples
    ///
    /// ```
    /// # use blockdeque::BlockDeque;
    /// let mut deque = BlockDeque::from([1, 2, 3, 4]);
    /// deque.truncate(2);
    /// assert_eq!(deque, [1, 2]);
    /// ```
    pub fn truncate(&mut self, len: usize) {
        while self.len() > len {
            // if a destructor panics the guard finishes the job while unwinding
            let guard = Truncator { deque: self, len };
            guard.deque.drop_back_run(len);
            mem::forget(guard);
        }
        self.debug_check();
    }

    /// Drops the elements at the back of the last block, but no more than `len()` - `len`.
    /// The block is released if it ends up empty.
    ///
    /// The cursor is moved before the destructors run, so a panicking destructor can not
    /// cause a double drop; the other elements of the run are still dropped by drop_in_place.
    fn drop_back_run(&mut self, len: usize) {
        let excess = self.len() - len;
        let run_start = if self.dir.len() == 1 { self.front } else { 0 };
        let count = cmp::min(excess, self.back - run_start);
        let start = self.back - count;
        if start == run_start {
            self.back = B;
            let block = self.dir.detach_back();
            // SAFETY: [start, start + count) were the live elements of the detached block,
            // which is released after they are dropped
            unsafe {
                ptr::drop_in_place(ptr::slice_from_raw_parts_mut(block.as_ptr().add(start), count));
            }
        } else {
            self.back = start;
            // SAFETY: [start, start + count) were live and are now behind the back cursor
            unsafe {
                let first = self.dir.last().as_ptr().add(start);
                ptr::drop_in_place(ptr::slice_from_raw_parts_mut(first, count));
            }
        }
    }

    /// Clears the deque, removing all elements and releasing all blocks. The directory keeps
    /// its capacity.
    ///
    /// # Examples
    ///
    /// ```
    /// # use blockdeque::BlockDeque;
    /// let mut deque = BlockDeque::new();
    /// deque.push_back(1);
    /// deque.clear();
    /// assert!(deque.is_empty());
    /// assert_eq!(deque.block_count(), 0);
    /// ```
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Modifies the deque in-place so that `len()` is equal to `new_len`, either by removing
    /// excess elements from the back or by appending elements generated by calling `generator` to
    /// the back.
    ///
    /// # Examples
    ///
    /// ```
    /// # use blockdeque::BlockDeque;
    /// let mut deque = BlockDeque::from([1, 2]);
    /// let mut i = 3;
    ///
    /// deque.resize_with(5, || { i += 1; i });
    /// assert_eq!(deque, [1, 2, 4, 5, 6]);
    ///
    /// deque.resize_with(3, || unreachable!());
    /// assert_eq!(deque, [1, 2, 4]);
    /// ```
    pub fn resize_with<F>(&mut self, new_len: usize, generator: F)
    where
        F: FnMut() -> T,
    {
        let len = self.len();
        if new_len > len {
            // a panicking generator leaves the deque as it was
            let guard = Truncator { deque: self, len };
            guard.deque.extend(repeat_with(generator).take(new_len - len));
            mem::forget(guard);
        } else {
            self.truncate(new_len);
        }
    }

    /// Returns `true` if the deque contains an element equal to the given value.
    ///
    /// # Examples
    ///
    /// ```
    /// # use blockdeque::BlockDeque;
    /// let deque = BlockDeque::from([0, 1]);
    /// assert!(deque.contains(&1));
    /// assert!(!deque.contains(&4));
    /// ```
    pub fn contains(&self, x: &T) -> bool
    where
        T: PartialEq<T>,
    {
        self.iter().any(|el| el == x)
    }

    /// Exchanges the contents of two deques.
    ///
    /// If the allocators compare equal this only exchanges the directories, in *O(1)* and
    /// without moving any element. Otherwise every element is moved into storage from the
    /// allocator of the deque it ends up in, and each deque keeps its allocator.
    ///
    /// # Examples
    ///
    /// ```
    /// # use blockdeque::BlockDeque;
    /// let mut a = BlockDeque::from([1, 2, 3]);
    /// let mut b = BlockDeque::from([4, 5]);
    /// a.swap_with(&mut b);
    /// assert_eq!(a, [4, 5]);
    /// assert_eq!(b, [1, 2, 3]);
    /// ```
    pub fn swap_with(&mut self, other: &mut Self)
    where
        A: PartialEq,
    {
        if self.allocator() == other.allocator() {
            mem::swap(self, other);
            return;
        }
        let mut parked = Vec::with_capacity(self.len());
        while let Some(el) = self.pop_front() {
            parked.push(el);
        }
        while let Some(el) = other.pop_front() {
            self.push_back(el);
        }
        other.extend(parked);
    }

    /// Returns a front-to-back iterator.
    ///
    /// # Examples
    ///
    /// ```
    /// # use blockdeque::BlockDeque;
    /// let deque = BlockDeque::from([5, 3, 4]);
    /// let b: &[_] = &[&5, &3, &4];
    /// let c: Vec<&i32> = deque.iter().collect();
    /// assert_eq!(&c[..], b);
    /// ```
    pub fn iter(&self) -> Iter<'_, T, A, B> {
        Iter::new(self, 0..self.len())
    }

    /// Returns a front-to-back iterator that returns mutable references.
    ///
    /// # Examples
    ///
    /// ```
    /// # use blockdeque::BlockDeque;
    /// let mut deque = BlockDeque::from([5, 3, 4]);
    /// for num in deque.iter_mut() {
    ///     *num = *num - 2;
    /// }
    /// assert_eq!(deque, [3, 1, 2]);
    /// ```
    pub fn iter_mut(&mut self) -> IterMut<'_, T, B> {
        let len = self.len();
        self.range_mut(0..len)
    }

    /// Creates an iterator that covers the specified range in the deque.
    ///
    /// # Panics
    ///
    /// Panics if the starting point is greater than the end point or if the end point is
    /// greater than the length of the deque.
    ///
    /// # Examples
    ///
    /// ```
    /// # use blockdeque::BlockDeque;
    /// let deque: BlockDeque<_> = [1, 2, 3].into();
    /// let range = deque.range(2..).copied().collect::<BlockDeque<_>>();
    /// assert_eq!(range, [3]);
    /// ```
    pub fn range<R>(&self, range: R) -> Iter<'_, T, A, B>
    where
        R: RangeBounds<usize>,
    {
        Iter::new(self, simplify_range(range, self.len()))
    }

    /// Creates an iterator that covers the specified mutable range in the deque.
    ///
    /// # Panics
    ///
    /// Same as [`range`](BlockDeque::range).
    ///
    /// # Examples
    ///
    /// ```
    /// # use blockdeque::BlockDeque;
    /// let mut deque: BlockDeque<_> = [1, 2, 3].into();
    /// for v in deque.range_mut(2..) {
    ///   *v *= 2;
    /// }
    /// assert_eq!(deque, [1, 2, 6]);
    /// ```
    pub fn range_mut<R>(&mut self, range: R) -> IterMut<'_, T, B>
    where
        R: RangeBounds<usize>,
    {
        let range = simplify_range(range, self.len());
        IterMut::new(self.dir.live_slots(), self.front, range)
    }

    /// Returns a cursor at `index`. An index equal to the length gives the end position.
    ///
    /// # Panics
    ///
    /// Panics if `index` is greater than the deque's length.
    ///
    /// # Examples
    ///
    /// ```
    /// # use blockdeque::BlockDeque;
    /// let deque = BlockDeque::from([0, 1, 2, 3]);
    /// let cursor = deque.cursor(1);
    /// assert_eq!(cursor.get(), Some(&1));
    /// assert_eq!((cursor + 2).get(), Some(&3));
    /// ```
    pub fn cursor(&self, index: usize) -> Cursor<'_, T, A, B> {
        let len = self.len();
        if index > len {
            index_out_of_bounds(len, index);
        }
        Cursor::new(self, index)
    }

    /// Returns a cursor at the first element, or at the end position if the deque is empty.
    pub fn cursor_front(&self) -> Cursor<'_, T, A, B> {
        Cursor::new(self, 0)
    }

    /// Returns a cursor one past the last element.
    ///
    /// # Examples
    ///
    /// ```
    /// # use blockdeque::BlockDeque;
    /// let deque = BlockDeque::from([0, 1, 2]);
    /// assert_eq!(deque.cursor_end() - deque.cursor_front(), 3);
    /// assert_eq!((deque.cursor_end() - 1).get(), deque.back());
    /// ```
    pub fn cursor_end(&self) -> Cursor<'_, T, A, B> {
        Cursor::new(self, self.len())
    }

    /// Returns a cursor at `index` that can insert and remove elements.
    ///
    /// # Panics
    ///
    /// Panics if `index` is greater than the deque's length.
    ///
    /// # Examples
    ///
    /// ```
    /// # use blockdeque::BlockDeque;
    /// let mut deque = BlockDeque::from([0, 1, 2, 3, 4]);
    /// let mut cursor = deque.cursor_mut(2);
    /// assert_eq!(cursor.remove_current(), Some(2));
    /// assert_eq!(cursor.current(), Some(&mut 3));
    /// assert_eq!(deque, [0, 1, 3, 4]);
    /// ```
    pub fn cursor_mut(&mut self, index: usize) -> CursorMut<'_, T, A, B> {
        let len = self.len();
        if index > len {
            index_out_of_bounds(len, index);
        }
        CursorMut::new(self, index)
    }

    /// Checks the cursor invariants in debug builds.
    #[inline]
    fn debug_check(&self) {
        if !self.dir.is_empty() {
            debug_assert!(self.front < B);
            debug_assert!(1 <= self.back && self.back <= B);
            debug_assert!(self.dir.len() > 1 || self.front < self.back);
        }
    }
}

impl<T: Clone, A: BlockAlloc, const B: usize> BlockDeque<T, A, B> {
    /// Modifies the deque in-place so that `len()` is equal to new_len, either by removing excess
    /// elements from the back or by appending clones of `value` to the back.
    ///
    /// # Examples
    ///
    /// ```
    /// # use blockdeque::BlockDeque;
    /// let mut deque = BlockDeque::from([1, 2, 3]);
    ///
    /// deque.resize(2, 5);
    /// assert_eq!(deque, [1, 2]);
    ///
    /// deque.resize(5, 5);
    /// assert_eq!(deque, [1, 2, 5, 5, 5]);
    /// ```
    pub fn resize(&mut self, new_len: usize, value: T) {
        self.resize_with(new_len, || value.clone());
    }
}

impl<T: Clone, A: BlockAlloc + Clone, const B: usize> Clone for BlockDeque<T, A, B> {
    /// Copies the deque into fresh blocks from a clone of its allocator, centered like
    /// [`BlockDeque::from_elem`] would place them.
    fn clone(&self) -> Self {
        Self::from_iter_exact(self.allocator().clone(), self.len(), self.iter().cloned())
    }

    /// Copies `source` into fresh blocks from the allocator of `self`. `self` is only replaced
    /// once the copy is complete, a panicking `clone` leaves it untouched.
    fn clone_from(&mut self, source: &Self) {
        *self = Self::from_iter_exact(self.allocator().clone(), source.len(), source.iter().cloned());
    }
}

impl<T: fmt::Debug, A: BlockAlloc, const B: usize> fmt::Debug for BlockDeque<T, A, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self).finish()
    }
}

impl<T, A: BlockAlloc + Default, const B: usize> Default for BlockDeque<T, A, B> {
    /// Creates an empty deque.
    #[inline]
    fn default() -> Self {
        Self::new_in(A::default())
    }
}

impl<T, A: BlockAlloc, const B: usize> Drop for BlockDeque<T, A, B> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T, A: BlockAlloc, const B: usize> Extend<T> for BlockDeque<T, A, B> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for element in iter {
            self.push_back(element);
        }
    }
}

impl<'a, T: 'a + Copy, A: BlockAlloc, const B: usize> Extend<&'a T> for BlockDeque<T, A, B> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T> From<Vec<T>> for BlockDeque<T> {
    /// Moves the elements of a [`Vec<T>`] into centered blocks.
    fn from(other: Vec<T>) -> Self {
        let len = other.len();
        Self::from_iter_exact(Global, len, other.into_iter())
    }
}

impl<T, A: BlockAlloc, const B: usize> From<BlockDeque<T, A, B>> for Vec<T> {
    /// Moves the elements of a deque into a [`Vec<T>`], front to back.
    fn from(other: BlockDeque<T, A, B>) -> Self {
        let mut vec = Vec::with_capacity(other.len());
        vec.extend(other);
        vec
    }
}

impl<T, const N: usize> From<[T; N]> for BlockDeque<T> {
    /// Converts a `[T; N]` into a deque with the elements centered in their blocks.
    fn from(arr: [T; N]) -> Self {
        Self::from_iter_exact(Global, N, arr.into_iter())
    }
}

impl<T, A: BlockAlloc + Default, const B: usize> FromIterator<T> for BlockDeque<T, A, B> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut deque = Self::default();
        deque.extend(iter);
        deque
    }
}

impl<T: Hash, A: BlockAlloc, const B: usize> Hash for BlockDeque<T, A, B> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        self.iter().for_each(|elem| elem.hash(state));
    }
}

impl<T, A: BlockAlloc, const B: usize> Index<usize> for BlockDeque<T, A, B> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &T {
        self.get(index).unwrap_or_else(|| index_out_of_bounds(self.len(), index))
    }
}

impl<T, A: BlockAlloc, const B: usize> IndexMut<usize> for BlockDeque<T, A, B> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut T {
        let len = self.len();
        self.get_mut(index).unwrap_or_else(|| index_out_of_bounds(len, index))
    }
}

impl<T, A: BlockAlloc, const B: usize> IntoIterator for BlockDeque<T, A, B> {
    type Item = T;
    type IntoIter = IntoIter<T, A, B>;

    /// Consumes the deque into a front-to-back iterator yielding elements by value.
    fn into_iter(self) -> IntoIter<T, A, B> {
        IntoIter::new(self)
    }
}

impl<'a, T, A: BlockAlloc, const B: usize> IntoIterator for &'a BlockDeque<T, A, B> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, A, B>;

    fn into_iter(self) -> Iter<'a, T, A, B> {
        self.iter()
    }
}

impl<'a, T, A: BlockAlloc, const B: usize> IntoIterator for &'a mut BlockDeque<T, A, B> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T, B>;

    fn into_iter(self) -> IterMut<'a, T, B> {
        self.iter_mut()
    }
}

impl<T: PartialOrd, A: BlockAlloc, const B: usize> PartialOrd for BlockDeque<T, A, B> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord, A: BlockAlloc, const B: usize> Ord for BlockDeque<T, A, B> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

/// Deques are equal if they hold equal elements in the same order, regardless of their
/// allocators and block capacities.
impl<T, U, A1, A2, const B1: usize, const B2: usize> PartialEq<BlockDeque<U, A2, B2>> for BlockDeque<T, A1, B1>
where
    T: PartialEq<U>,
    A1: BlockAlloc,
    A2: BlockAlloc,
{
    fn eq(&self, other: &BlockDeque<U, A2, B2>) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<T: Eq, A: BlockAlloc, const B: usize> Eq for BlockDeque<T, A, B> {}

__impl_slice_eq! { [] BlockDeque<T, A, B>, Vec<U>, }
__impl_slice_eq! { [] BlockDeque<T, A, B>, &[U], }
__impl_slice_eq! { [] BlockDeque<T, A, B>, &mut [U], }
__impl_slice_eq! { [const N: usize] BlockDeque<T, A, B>, [U; N], }
__impl_slice_eq! { [const N: usize] BlockDeque<T, A, B>, &[U; N], }
__impl_slice_eq! { [const N: usize] BlockDeque<T, A, B>, &mut [U; N], }

/// Truncates the deque to `len` when it gets dropped. Used to finish or roll back a change to
/// the back of the deque while unwinding.
struct Truncator<'a, T, A: BlockAlloc, const B: usize> {
    deque: &'a mut BlockDeque<T, A, B>,
    len: usize,
}

impl<T, A: BlockAlloc, const B: usize> Drop for Truncator<'_, T, A, B> {
    fn drop(&mut self) {
        self.deque.truncate(self.len);
    }
}

fn index_out_of_bounds(len: usize, index: usize) -> ! {
    panic!("index out of bounds: the len is {} but the index is {}", len, index);
}

fn capacity_overflow() -> ! {
    panic!("capacity overflow");
}

/// Turns a failed allocation into a panic or an abort, like the standard collections do.
fn handle_reserve(err: TryReserveError) -> ! {
    match err {
        TryReserveError::CapacityOverflow => capacity_overflow(),
        TryReserveError::AllocError { layout } => handle_alloc_error(layout),
    }
}

fn simplify_range(range: impl RangeBounds<usize>, len: usize) -> Range<usize> {
    // we later check for start > end so ignore here if start > len
    let start = match range.start_bound() {
        Bound::Unbounded => 0,
        Bound::Included(&i) => i,
        Bound::Excluded(&i) => i.checked_add(1).expect("range start Bound::Excluded(usize::MAX) is > usize::MAX"),
    };
    let end = match range.end_bound() {
        Bound::Unbounded => len,
        Bound::Excluded(&i) if i <= len => i,
        Bound::Included(&i) if i < len => i + 1,
        bound => panic!("range end {:?} should be <= length {}", bound, len),
    };
    if start > end {
        panic!(
            "range start {:?} should be <= range end {:?}",
            range.start_bound(),
            range.end_bound()
        );
    }
    start..end
}
