//! Raw storage: an owned block of uninitialized element slots.
//!
//! [`RawStorage`] knows how many slots it owns but not how many of them
//! are live, so it never reads, writes or drops a `T`. It cannot be
//! cloned for the same reason; duplication goes through
//! [`Sequence`](crate::Sequence), which knows the element count.
//!
//! ```compile_fail
//! use advec::RawStorage;
//!
//! let storage = RawStorage::<u32>::with_capacity(4).unwrap();
//! let copy = storage.clone();
//! ```

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::fmt;
use std::mem;
use std::ptr::{self, NonNull};

use crate::error::StorageError;
use crate::growth::Relocation;

/// An owned, uninitialized block sized for `capacity` values of `T`.
///
/// Dropping the storage releases the block without running any element
/// destructor. Moving it is an ordinary Rust move; [`swap`](Self::swap)
/// exchanges two blocks in O(1).
pub struct RawStorage<T> {
    /// Start of the block, or dangling when no block is owned.
    buffer: NonNull<T>,
    /// Slots in the block. Always 0 for zero-sized `T`.
    capacity: usize,
}

// SAFETY: RawStorage owns its block exclusively; sending or sharing it is
// as safe as sending or sharing the `T`s the block may hold.
unsafe impl<T: Send> Send for RawStorage<T> {}
// SAFETY: see above.
unsafe impl<T: Sync> Sync for RawStorage<T> {}

impl<T> RawStorage<T> {
    /// Storage that owns no block.
    pub const fn new() -> Self {
        Self {
            buffer: NonNull::dangling(),
            capacity: 0,
        }
    }

    /// Acquire a block of `capacity` slots.
    ///
    /// Zero capacity and zero-sized `T` acquire nothing.
    pub fn with_capacity(capacity: usize) -> Result<Self, StorageError> {
        let buffer = Self::allocate(capacity)?;
        let capacity = if Relocation::of::<T>().needs_storage() {
            capacity
        } else {
            0
        };
        Ok(Self { buffer, capacity })
    }

    /// Allocate an uninitialized block for `n` values of `T`.
    ///
    /// Returns a dangling pointer, the null-equivalent of this API, when
    /// `n == 0` or `T` is zero-sized.
    pub fn allocate(n: usize) -> Result<NonNull<T>, StorageError> {
        if n == 0 || !Relocation::of::<T>().needs_storage() {
            return Ok(NonNull::dangling());
        }
        let layout = Self::layout(n)?;
        // SAFETY: `layout` has non-zero size: n > 0 and T is not zero-sized.
        let block = unsafe { alloc::alloc(layout) };
        NonNull::new(block.cast::<T>()).ok_or(StorageError::AllocationFailed { layout })
    }

    /// Release a block obtained from [`allocate`](Self::allocate).
    ///
    /// A no-op for the dangling pointer `allocate` returns when it
    /// acquired nothing.
    ///
    /// # Safety
    ///
    /// `block` must have been returned by `allocate(n)` with this same
    /// `n` and not released since. Live values in the block are not
    /// dropped.
    pub unsafe fn deallocate(block: NonNull<T>, n: usize) {
        if n == 0 || !Relocation::of::<T>().needs_storage() {
            return;
        }
        // SAFETY: `allocate(n)` succeeded with `Layout::array::<T>(n)`, so
        // the same size and alignment form a valid layout.
        let layout =
            unsafe { Layout::from_size_align_unchecked(mem::size_of::<T>() * n, mem::align_of::<T>()) };
        // SAFETY: caller guarantees `block` came from `alloc` with `layout`.
        unsafe { alloc::dealloc(block.as_ptr().cast::<u8>(), layout) };
    }

    /// Number of slots the block can hold.
    ///
    /// Zero-sized types report `usize::MAX`: they never need memory.
    pub fn capacity(&self) -> usize {
        if Relocation::of::<T>().needs_storage() {
            self.capacity
        } else {
            usize::MAX
        }
    }

    /// Start of the block.
    pub fn as_ptr(&self) -> *const T {
        self.buffer.as_ptr()
    }

    /// Mutable start of the block.
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.buffer.as_ptr()
    }

    /// Address of slot `offset`.
    ///
    /// `offset == capacity` is allowed and yields the one-past-the-end
    /// address. The bound is checked in debug builds only; past it the
    /// address is still computed but must not be dereferenced.
    pub fn slot(&self, offset: usize) -> *const T {
        debug_assert!(
            offset <= self.capacity(),
            "slot offset (is {offset}) should be <= capacity (is {})",
            self.capacity()
        );
        self.buffer.as_ptr().cast_const().wrapping_add(offset)
    }

    /// Mutable address of slot `offset`. See [`slot`](Self::slot).
    pub fn slot_mut(&mut self, offset: usize) -> *mut T {
        self.slot(offset).cast_mut()
    }

    /// Exchange blocks with `other` in O(1).
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(&mut self.buffer, &mut other.buffer);
        mem::swap(&mut self.capacity, &mut other.capacity);
    }

    /// Move `count` values from `src` to `dst` without running any code
    /// of `T`.
    ///
    /// # Safety
    ///
    /// `src` must point at `count` live values and `dst` at `count`
    /// uninitialized slots of a different block. Afterwards the source
    /// slots are logically uninitialized.
    pub(crate) unsafe fn relocate(src: *const T, dst: *mut T, count: usize) {
        match Relocation::of::<T>() {
            Relocation::Elided => {}
            // SAFETY: caller guarantees both ranges are valid and disjoint.
            Relocation::Bitwise => unsafe { ptr::copy_nonoverlapping(src, dst, count) },
        }
    }

    fn layout(n: usize) -> Result<Layout, StorageError> {
        Layout::array::<T>(n).map_err(|_| StorageError::CapacityOverflow { requested: n })
    }
}

impl<T> Default for RawStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for RawStorage<T> {
    fn drop(&mut self) {
        // SAFETY: `buffer` came from `allocate(capacity)`; capacity is 0
        // (a no-op) when nothing was allocated.
        unsafe { Self::deallocate(self.buffer, self.capacity) };
    }
}

impl<T> fmt::Debug for RawStorage<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawStorage")
            .field("buffer", &self.buffer)
            .field("capacity", &self.capacity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_storage_has_no_capacity() {
        let storage = RawStorage::<u64>::new();
        assert_eq!(storage.capacity(), 0);
        assert_eq!(storage.as_ptr(), NonNull::<u64>::dangling().as_ptr().cast_const());
    }

    #[test]
    fn zero_request_allocates_nothing() {
        let block = RawStorage::<u32>::allocate(0).unwrap();
        assert_eq!(block, NonNull::dangling());
        // SAFETY: dangling with n == 0 is the documented no-op input.
        unsafe { RawStorage::deallocate(block, 0) };
    }

    #[test]
    fn with_capacity_reports_capacity() {
        let storage = RawStorage::<u32>::with_capacity(16).unwrap();
        assert_eq!(storage.capacity(), 16);
        assert_ne!(storage.as_ptr(), NonNull::<u32>::dangling().as_ptr().cast_const());
    }

    #[test]
    fn slots_are_writable_and_aligned() {
        let mut storage = RawStorage::<u64>::with_capacity(4).unwrap();
        for i in 0..4 {
            let slot = storage.slot_mut(i);
            assert_eq!(slot as usize % mem::align_of::<u64>(), 0);
            // SAFETY: slot i < capacity is owned and uninitialized.
            unsafe { slot.write(i as u64 * 10) };
        }
        // SAFETY: slots 0..4 were written above.
        let values: Vec<u64> = (0..4).map(|i| unsafe { storage.slot(i).read() }).collect();
        assert_eq!(values, vec![0, 10, 20, 30]);
    }

    #[test]
    fn one_past_end_slot_is_addressable() {
        let storage = RawStorage::<u16>::with_capacity(3).unwrap();
        let end = storage.slot(3);
        assert_eq!(end as usize - storage.as_ptr() as usize, 3 * mem::size_of::<u16>());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "slot offset")]
    fn slot_past_end_is_caught_in_debug() {
        let storage = RawStorage::<u16>::with_capacity(3).unwrap();
        let _ = storage.slot(4);
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn slot_past_end_is_computed_without_access() {
        let storage = RawStorage::<u16>::with_capacity(3).unwrap();
        let far = storage.slot(100);
        assert_eq!(far as usize - storage.as_ptr() as usize, 100 * mem::size_of::<u16>());
    }

    #[test]
    fn swap_exchanges_blocks() {
        let mut a = RawStorage::<u8>::with_capacity(2).unwrap();
        let mut b = RawStorage::<u8>::with_capacity(8).unwrap();
        let (a_ptr, b_ptr) = (a.as_ptr(), b.as_ptr());
        a.swap(&mut b);
        assert_eq!(a.capacity(), 8);
        assert_eq!(b.capacity(), 2);
        assert_eq!(a.as_ptr(), b_ptr);
        assert_eq!(b.as_ptr(), a_ptr);
    }

    #[test]
    fn move_transfers_block() {
        let storage = RawStorage::<u32>::with_capacity(5).unwrap();
        let ptr = storage.as_ptr();
        let moved = storage;
        assert_eq!(moved.as_ptr(), ptr);
        assert_eq!(moved.capacity(), 5);
    }

    #[test]
    fn oversized_request_overflows_instead_of_allocating() {
        let result = RawStorage::<u64>::with_capacity(usize::MAX / 4);
        assert!(matches!(
            result,
            Err(StorageError::CapacityOverflow { .. })
        ));
    }

    #[test]
    fn zero_sized_types_never_allocate() {
        let storage = RawStorage::<()>::with_capacity(1_000_000).unwrap();
        assert_eq!(storage.capacity(), usize::MAX);
        assert_eq!(storage.as_ptr(), NonNull::<()>::dangling().as_ptr().cast_const());
    }

    #[test]
    fn relocate_moves_values_between_blocks() {
        let mut src = RawStorage::<String>::with_capacity(2).unwrap();
        let mut dst = RawStorage::<String>::with_capacity(4).unwrap();
        // SAFETY: slots 0 and 1 of `src` are owned and uninitialized.
        unsafe {
            src.slot_mut(0).write("a".to_owned());
            src.slot_mut(1).write("b".to_owned());
            RawStorage::relocate(src.as_ptr(), dst.slot_mut(1), 2);
        }
        // SAFETY: relocate made dst slots 1 and 2 live; src slots are now dead.
        let (first, second) = unsafe { (dst.slot_mut(1).read(), dst.slot_mut(2).read()) };
        assert_eq!(first, "a");
        assert_eq!(second, "b");
    }
}
