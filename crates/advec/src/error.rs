//! Storage error types.

use std::alloc::{self, Layout};
use std::error::Error;
use std::fmt;

/// Errors that can occur while acquiring raw storage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageError {
    /// The requested element count cannot be represented as an
    /// allocation: its byte size exceeds `isize::MAX`, or doubling the
    /// current length overflows `usize`.
    CapacityOverflow {
        /// Number of elements requested.
        requested: usize,
    },
    /// The global allocator could not satisfy the request.
    AllocationFailed {
        /// Layout of the refused block.
        layout: Layout,
    },
}

impl StorageError {
    /// Escalates the error the way the infallible `Vec` API does.
    ///
    /// Overflow panics; allocator refusal goes through
    /// [`handle_alloc_error`](std::alloc::handle_alloc_error).
    pub(crate) fn escalate(self) -> ! {
        match self {
            Self::CapacityOverflow { .. } => panic!("capacity overflow"),
            Self::AllocationFailed { layout } => alloc::handle_alloc_error(layout),
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityOverflow { requested } => {
                write!(f, "capacity overflow: cannot hold {requested} elements")
            }
            Self::AllocationFailed { layout } => {
                write!(
                    f,
                    "allocation failed: {} bytes with alignment {}",
                    layout.size(),
                    layout.align()
                )
            }
        }
    }
}

impl Error for StorageError {}

/// A failed insertion that hands the rejected value back.
///
/// Returned by [`Sequence::try_push_back`](crate::Sequence::try_push_back)
/// and [`Sequence::try_insert`](crate::Sequence::try_insert) so that an
/// allocation failure never loses the caller's value.
#[derive(Clone, PartialEq, Eq)]
pub struct PushError<T> {
    error: StorageError,
    value: T,
}

impl<T> PushError<T> {
    pub(crate) fn new(error: StorageError, value: T) -> Self {
        Self { error, value }
    }

    /// The storage failure that rejected the insertion.
    pub fn error(&self) -> &StorageError {
        &self.error
    }

    /// Recovers the value that could not be inserted.
    pub fn into_inner(self) -> T {
        self.value
    }

    /// Splits into the storage failure and the rejected value.
    pub fn into_parts(self) -> (StorageError, T) {
        (self.error, self.value)
    }
}

impl<T> fmt::Debug for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushError")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl<T> fmt::Display for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "insertion rejected: {}", self.error)
    }
}

impl<T> Error for PushError<T> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.error)
    }
}
