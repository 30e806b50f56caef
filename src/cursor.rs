//! Positions inside a deque.
//!
//! A cursor is a logical index plus a reference to the deque it belongs to. It never stores an
//! element address; every access goes through the deque's index mapping. Valid positions are
//! `0..=len`, where `len` is the end position that points past the last element.

use core::cmp::Ordering;
use core::ops::{Add, AddAssign, Sub, SubAssign};
use core::ptr;

use std::fmt;

use crate::{BlockAlloc, BlockDeque, Global, DEFAULT_BLOCK_CAPACITY};

/// A read-only position inside a [`BlockDeque`] that supports random-access arithmetic.
///
/// Created by [`BlockDeque::cursor`], [`BlockDeque::cursor_front`] and
/// [`BlockDeque::cursor_end`].
///
/// # Examples
///
/// ```
/// # use blockdeque::BlockDeque;
/// let deque = BlockDeque::from([10, 20, 30, 40]);
/// let mut cursor = deque.cursor_front();
/// cursor += 2;
/// assert_eq!(cursor.get(), Some(&30));
/// cursor.move_prev();
/// assert_eq!(cursor.get(), Some(&20));
/// assert_eq!(deque.cursor_end() - cursor, 3);
/// ```
pub struct Cursor<'a, T, A: BlockAlloc = Global, const B: usize = DEFAULT_BLOCK_CAPACITY> {
    deque: &'a BlockDeque<T, A, B>,
    index: usize,
}

impl<'a, T, A: BlockAlloc, const B: usize> Cursor<'a, T, A, B> {
    pub(crate) fn new(deque: &'a BlockDeque<T, A, B>, index: usize) -> Self {
        debug_assert!(index <= deque.len());
        Self { deque, index }
    }

    /// Returns the logical index of the cursor.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns `true` if the cursor is at the end position.
    #[inline]
    pub fn is_end(&self) -> bool {
        self.index == self.deque.len()
    }

    /// Returns the element at the cursor, or `None` at the end position.
    #[inline]
    pub fn get(&self) -> Option<&'a T> {
        self.deque.get(self.index)
    }

    /// Moves the cursor to the next position.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is at the end position.
    pub fn move_next(&mut self) {
        *self += 1;
    }

    /// Moves the cursor to the previous position.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is at the first position.
    pub fn move_prev(&mut self) {
        *self -= 1;
    }

    /// Returns the cursor `delta` positions away from this one.
    ///
    /// # Panics
    ///
    /// Panics if the result would be before the front or past the end position.
    pub fn offset(self, delta: isize) -> Self {
        let len = self.deque.len();
        match self.index.checked_add_signed(delta) {
            Some(index) if index <= len => Self { deque: self.deque, index },
            _ => panic!("cursor moved out of bounds: the len is {} but the position is {} {:+}", len, self.index, delta),
        }
    }
}

impl<T, A: BlockAlloc, const B: usize> Clone for Cursor<'_, T, A, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, A: BlockAlloc, const B: usize> Copy for Cursor<'_, T, A, B> {}

impl<T: fmt::Debug, A: BlockAlloc, const B: usize> fmt::Debug for Cursor<'_, T, A, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Cursor").field(&self.index).field(&self.get()).finish()
    }
}

/// Cursors are equal if they point into the same deque at the same index.
impl<T, A: BlockAlloc, const B: usize> PartialEq for Cursor<'_, T, A, B> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.deque, other.deque) && self.index == other.index
    }
}

impl<T, A: BlockAlloc, const B: usize> Eq for Cursor<'_, T, A, B> {}

/// Cursors into different deques are unordered.
impl<T, A: BlockAlloc, const B: usize> PartialOrd for Cursor<'_, T, A, B> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if ptr::eq(self.deque, other.deque) {
            Some(self.index.cmp(&other.index))
        } else {
            None
        }
    }
}

impl<T, A: BlockAlloc, const B: usize> Add<isize> for Cursor<'_, T, A, B> {
    type Output = Self;

    fn add(self, rhs: isize) -> Self {
        self.offset(rhs)
    }
}

impl<T, A: BlockAlloc, const B: usize> Sub<isize> for Cursor<'_, T, A, B> {
    type Output = Self;

    fn sub(self, rhs: isize) -> Self {
        match rhs.checked_neg() {
            Some(delta) => self.offset(delta),
            None => panic!("cursor moved out of bounds"),
        }
    }
}

impl<T, A: BlockAlloc, const B: usize> AddAssign<isize> for Cursor<'_, T, A, B> {
    fn add_assign(&mut self, rhs: isize) {
        *self = *self + rhs;
    }
}

impl<T, A: BlockAlloc, const B: usize> SubAssign<isize> for Cursor<'_, T, A, B> {
    fn sub_assign(&mut self, rhs: isize) {
        *self = *self - rhs;
    }
}

/// The signed distance between two cursors of the same deque.
impl<'a, T, A: BlockAlloc, const B: usize> Sub for Cursor<'a, T, A, B> {
    type Output = isize;

    fn sub(self, rhs: Self) -> isize {
        assert!(ptr::eq(self.deque, rhs.deque), "cursors belong to different deques");
        // both indices are <= len, which is <= isize::MAX for any element type that needs memory
        self.index as isize - rhs.index as isize
    }
}

/// A position inside a [`BlockDeque`] that can modify the deque.
///
/// Created by [`BlockDeque::cursor_mut`]. [`insert`] and [`remove_current`] are the
/// position-keeping forms of [`BlockDeque::insert`] and [`BlockDeque::remove`]: afterwards
/// the cursor points at the inserted element, or at the element that followed the removed
/// one.
///
/// [`insert`]: CursorMut::insert
/// [`remove_current`]: CursorMut::remove_current
///
/// # Examples
///
/// ```
/// # use blockdeque::BlockDeque;
/// let mut deque = BlockDeque::from([0, 1, 3, 4]);
/// let mut cursor = deque.cursor_mut(2);
/// cursor.insert(99);
/// assert_eq!(cursor.current(), Some(&mut 99));
/// cursor.move_next();
/// assert_eq!(cursor.current(), Some(&mut 3));
/// assert_eq!(deque, [0, 1, 99, 3, 4]);
/// ```
pub struct CursorMut<'a, T, A: BlockAlloc = Global, const B: usize = DEFAULT_BLOCK_CAPACITY> {
    deque: &'a mut BlockDeque<T, A, B>,
    index: usize,
}

impl<'a, T, A: BlockAlloc, const B: usize> CursorMut<'a, T, A, B> {
    pub(crate) fn new(deque: &'a mut BlockDeque<T, A, B>, index: usize) -> Self {
        debug_assert!(index <= deque.len());
        Self { deque, index }
    }

    /// Returns the logical index of the cursor.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns `true` if the cursor is at the end position.
    #[inline]
    pub fn is_end(&self) -> bool {
        self.index == self.deque.len()
    }

    /// Returns the element at the cursor, or `None` at the end position.
    #[inline]
    pub fn current(&mut self) -> Option<&mut T> {
        self.deque.get_mut(self.index)
    }

    /// Returns a read-only cursor at the same position.
    pub fn as_cursor(&self) -> Cursor<'_, T, A, B> {
        Cursor::new(self.deque, self.index)
    }

    /// Moves the cursor to the next position.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is at the end position.
    pub fn move_next(&mut self) {
        let index = self.index + 1;
        self.seek(index);
    }

    /// Moves the cursor to the previous position.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is at the first position.
    pub fn move_prev(&mut self) {
        let index = self.index.checked_sub(1).expect("cursor moved before the front");
        self.seek(index);
    }

    /// Moves the cursor to `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is greater than the deque's length.
    pub fn seek(&mut self, index: usize) {
        let len = self.deque.len();
        if index > len {
            panic!("cursor moved out of bounds: the len is {} but the position is {}", len, index);
        }
        self.index = index;
    }

    /// Inserts `value` before the current element, or at the back if the cursor is at the end
    /// position. The cursor then points at the inserted element.
    pub fn insert(&mut self, value: T) {
        self.deque.insert(self.index, value);
    }

    /// Removes the current element and returns it, or returns `None` at the end position. The
    /// cursor then points at the element that followed the removed one.
    pub fn remove_current(&mut self) -> Option<T> {
        self.deque.remove(self.index)
    }
}

impl<T: fmt::Debug, A: BlockAlloc, const B: usize> fmt::Debug for CursorMut<'_, T, A, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CursorMut").field(&self.index).field(&self.deque.get(self.index)).finish()
    }
}
