use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::ops::Range;
use std::ptr::NonNull;

use crate::position::Position;
use crate::{BlockAlloc, BlockDeque, Global, DEFAULT_BLOCK_CAPACITY};

/// An iterator over the elements of a `BlockDeque`.
///
/// This `struct` is created by the [`iter`] and [`range`] methods on [`BlockDeque`]. It
/// resolves every element through the deque's index mapping, so [`nth`] and [`nth_back`] are
/// *O(1)*.
///
/// [`iter`]: BlockDeque::iter
/// [`range`]: BlockDeque::range
/// [`nth`]: Iterator::nth
/// [`nth_back`]: DoubleEndedIterator::nth_back
pub struct Iter<'a, T, A: BlockAlloc = Global, const B: usize = DEFAULT_BLOCK_CAPACITY> {
    deque: &'a BlockDeque<T, A, B>,
    // the element that `.next()` returns
    start: usize,
    // the element after the one `.next_back()` returns
    end: usize,
}

impl<'a, T, A: BlockAlloc, const B: usize> Iter<'a, T, A, B> {
    pub(crate) fn new(deque: &'a BlockDeque<T, A, B>, range: Range<usize>) -> Self {
        debug_assert!(range.end <= deque.len());
        Self { deque, start: range.start, end: range.end }
    }
}

impl<T, A: BlockAlloc, const B: usize> Clone for Iter<'_, T, A, B> {
    fn clone(&self) -> Self {
        Self { deque: self.deque, start: self.start, end: self.end }
    }
}

impl<T: fmt::Debug, A: BlockAlloc, const B: usize> fmt::Debug for Iter<'_, T, A, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, T, A: BlockAlloc, const B: usize> Iterator for Iter<'a, T, A, B> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<&'a T> {
        if self.start < self.end {
            let index = self.start;
            self.start += 1;
            // SAFETY: start < end <= len
            unsafe { Some(&*self.deque.ptr_at(index)) }
        } else {
            None
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.end - self.start;
        (len, Some(len))
    }

    fn nth(&mut self, n: usize) -> Option<&'a T> {
        if n < self.end - self.start {
            self.start += n;
            self.next()
        } else {
            self.start = self.end;
            None
        }
    }

    #[inline]
    fn last(mut self) -> Option<&'a T> {
        self.next_back()
    }

    #[inline]
    fn count(self) -> usize {
        self.end - self.start
    }
}

impl<'a, T, A: BlockAlloc, const B: usize> DoubleEndedIterator for Iter<'a, T, A, B> {
    #[inline]
    fn next_back(&mut self) -> Option<&'a T> {
        if self.start < self.end {
            self.end -= 1;
            // SAFETY: start <= end < len
            unsafe { Some(&*self.deque.ptr_at(self.end)) }
        } else {
            None
        }
    }

    fn nth_back(&mut self, n: usize) -> Option<&'a T> {
        if n < self.end - self.start {
            self.end -= n;
            self.next_back()
        } else {
            self.end = self.start;
            None
        }
    }
}

impl<T, A: BlockAlloc, const B: usize> ExactSizeIterator for Iter<'_, T, A, B> {}

impl<T, A: BlockAlloc, const B: usize> FusedIterator for Iter<'_, T, A, B> {}

/// A mutable iterator over the elements of a `BlockDeque`.
///
/// This `struct` is created by the [`iter_mut`] and [`range_mut`] methods on [`BlockDeque`].
/// It holds the live part of the directory and the front offset of the deque it was created
/// from, and maps indices the same way the deque does.
///
/// [`iter_mut`]: BlockDeque::iter_mut
/// [`range_mut`]: BlockDeque::range_mut
pub struct IterMut<'a, T, const B: usize = DEFAULT_BLOCK_CAPACITY> {
    blocks: NonNull<NonNull<T>>,
    front: usize,
    start: usize,
    end: usize,
    marker: PhantomData<&'a mut T>,
}

// SAFETY: IterMut hands out disjoint `&mut T`, like `std::slice::IterMut`
unsafe impl<T: Send, const B: usize> Send for IterMut<'_, T, B> {}
// SAFETY: shared access to an IterMut gives no access to the elements
unsafe impl<T: Sync, const B: usize> Sync for IterMut<'_, T, B> {}

impl<'a, T, const B: usize> IterMut<'a, T, B> {
    /// `blocks` must point to the first live block slot of a deque that stays mutably borrowed
    /// for `'a`, and `range` must be inside that deque.
    pub(crate) fn new(blocks: NonNull<NonNull<T>>, front: usize, range: Range<usize>) -> Self {
        Self { blocks, front, start: range.start, end: range.end, marker: PhantomData }
    }

    /// # Safety
    ///
    /// `index` must be inside the original range and must not have been handed out before.
    #[inline]
    unsafe fn element(&mut self, index: usize) -> &'a mut T {
        let pos = Position::of::<B>(self.front, index);
        let block = *self.blocks.as_ptr().add(pos.block);
        &mut *block.as_ptr().add(pos.offset)
    }
}

impl<T: fmt::Debug, const B: usize> fmt::Debug for IterMut<'_, T, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IterMut").field(&self.start).field(&self.end).finish()
    }
}

impl<'a, T, const B: usize> Iterator for IterMut<'a, T, B> {
    type Item = &'a mut T;

    #[inline]
    fn next(&mut self) -> Option<&'a mut T> {
        if self.start < self.end {
            let index = self.start;
            self.start += 1;
            // SAFETY: index is in range and start moved past it
            unsafe { Some(self.element(index)) }
        } else {
            None
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.end - self.start;
        (len, Some(len))
    }

    fn nth(&mut self, n: usize) -> Option<&'a mut T> {
        if n < self.end - self.start {
            self.start += n;
            self.next()
        } else {
            self.start = self.end;
            None
        }
    }

    #[inline]
    fn last(mut self) -> Option<&'a mut T> {
        self.next_back()
    }
}

impl<'a, T, const B: usize> DoubleEndedIterator for IterMut<'a, T, B> {
    #[inline]
    fn next_back(&mut self) -> Option<&'a mut T> {
        if self.start < self.end {
            self.end -= 1;
            let index = self.end;
            // SAFETY: index is in range and end moved before it
            unsafe { Some(self.element(index)) }
        } else {
            None
        }
    }

    fn nth_back(&mut self, n: usize) -> Option<&'a mut T> {
        if n < self.end - self.start {
            self.end -= n;
            self.next_back()
        } else {
            self.end = self.start;
            None
        }
    }
}

impl<T, const B: usize> ExactSizeIterator for IterMut<'_, T, B> {}

impl<T, const B: usize> FusedIterator for IterMut<'_, T, B> {}
