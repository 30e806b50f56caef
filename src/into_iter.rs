use std::fmt;
use std::iter::FusedIterator;

use crate::{BlockAlloc, BlockDeque, Global, DEFAULT_BLOCK_CAPACITY};

/// An owning iterator over the elements of a `BlockDeque`.
///
/// This `struct` is created by the [`into_iter`] method on [`BlockDeque`] (provided by the
/// [`IntoIterator`] trait). See its documentation for more information.
///
/// Blocks are released as soon as the iterator has moved all their elements out, from
/// either end.
///
/// [`into_iter`]: BlockDeque::into_iter
/// [`IntoIterator`]: core::iter::IntoIterator
#[derive(Clone)]
pub struct IntoIter<T, A: BlockAlloc = Global, const B: usize = DEFAULT_BLOCK_CAPACITY> {
    inner: BlockDeque<T, A, B>,
}

impl<T, A: BlockAlloc, const B: usize> IntoIter<T, A, B> {
    pub(super) fn new(inner: BlockDeque<T, A, B>) -> Self {
        IntoIter { inner }
    }
}

impl<T: fmt::Debug, A: BlockAlloc, const B: usize> fmt::Debug for IntoIter<T, A, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.inner).finish()
    }
}

impl<T, A: BlockAlloc, const B: usize> Iterator for IntoIter<T, A, B> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.inner.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.inner.len();
        (len, Some(len))
    }
}

impl<T, A: BlockAlloc, const B: usize> DoubleEndedIterator for IntoIter<T, A, B> {
    fn next_back(&mut self) -> Option<T> {
        self.inner.pop_back()
    }
}

impl<T, A: BlockAlloc, const B: usize> ExactSizeIterator for IntoIter<T, A, B> {}

impl<T, A: BlockAlloc, const B: usize> FusedIterator for IntoIter<T, A, B> {}
