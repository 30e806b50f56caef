/// Location of an element: the live block it is in (counted from the first live block)
/// and its offset inside that block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Position {
    pub(crate) block: usize,
    pub(crate) offset: usize,
}

impl Position {
    /// Maps the logical `index` of a deque whose first element sits at offset `front` of its
    /// first block.
    #[inline]
    pub(crate) fn of<const B: usize>(front: usize, index: usize) -> Self {
        let combined = front + index;
        Position { block: combined / B, offset: combined % B }
    }

    /// Inverse of [`Position::of`].
    #[inline]
    pub(crate) fn index<const B: usize>(self, front: usize) -> usize {
        self.block * B + self.offset - front
    }
}
