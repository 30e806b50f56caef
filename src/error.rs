use core::alloc::Layout;
use core::fmt;

use std::error::Error;

/// The index passed to [`at`] or [`at_mut`] was not below the length of the deque.
///
/// [`at`]: crate::BlockDeque::at
/// [`at_mut`]: crate::BlockDeque::at_mut
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfRange {
    /// The requested index.
    pub index: usize,
    /// The length of the deque at the time of the access.
    pub len: usize,
}

impl fmt::Display for OutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "index out of range: the len is {} but the index is {}", self.len, self.index)
    }
}

impl Error for OutOfRange {}

/// A [`BlockAlloc`] could not satisfy a request.
///
/// [`BlockAlloc`]: crate::BlockAlloc
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocError;

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("memory allocation failed")
    }
}

impl Error for AllocError {}

/// The error type for the `try_push_*` methods of [`BlockDeque`].
///
/// [`BlockDeque`]: crate::BlockDeque
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TryReserveError {
    /// The directory would need more than `isize::MAX` bytes.
    CapacityOverflow,
    /// The allocator refused a block or directory request.
    AllocError {
        /// The layout of the refused request.
        layout: Layout,
    },
}

impl fmt::Display for TryReserveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("memory allocation failed")?;
        match self {
            TryReserveError::CapacityOverflow => f.write_str(" because the computed capacity exceeded the collection's maximum"),
            TryReserveError::AllocError { layout } => {
                write!(f, " because the allocator returned an error for {} bytes", layout.size())
            }
        }
    }
}

impl Error for TryReserveError {}
