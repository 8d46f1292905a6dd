//! Growth policy and the element relocation capability.
//!
//! Appending to a full sequence multiplies its capacity by
//! [`GROWTH_FACTOR`], starting from [`MIN_NON_ZERO_CAPACITY`]. Doubling
//! is what keeps the total relocation work of `k` appends within `O(k)`.

use std::mem;

use crate::error::StorageError;

/// Factor applied to the current length when an append finds no free slot.
pub const GROWTH_FACTOR: usize = 2;

/// Capacity allocated by the first append to an empty sequence.
pub const MIN_NON_ZERO_CAPACITY: usize = 1;

/// Capacity to allocate when a sequence of `len` elements is full.
///
/// Returns `max(MIN_NON_ZERO_CAPACITY, GROWTH_FACTOR * len)`, or
/// [`StorageError::CapacityOverflow`] if the product overflows `usize`.
pub fn next_capacity(len: usize) -> Result<usize, StorageError> {
    if len == 0 {
        return Ok(MIN_NON_ZERO_CAPACITY);
    }
    len.checked_mul(GROWTH_FACTOR)
        .ok_or(StorageError::CapacityOverflow {
            requested: usize::MAX,
        })
}

/// How elements of a type move between storage blocks.
///
/// Rust moves are bitwise copies that cannot fail, so there is never a
/// need for a duplicating (clone-based) fallback during growth. The only
/// distinction the growth algorithm branches on is whether elements
/// occupy any bytes at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Relocation {
    /// Zero-sized elements: no memory is allocated and nothing is copied.
    Elided,
    /// Elements are relocated with a single non-overlapping byte copy.
    Bitwise,
}

impl Relocation {
    /// Relocation capability of `T`.
    pub const fn of<T>() -> Self {
        if mem::size_of::<T>() == 0 {
            Self::Elided
        } else {
            Self::Bitwise
        }
    }

    /// Whether elements of this kind need backing memory.
    pub const fn needs_storage(self) -> bool {
        matches!(self, Self::Bitwise)
    }
}
