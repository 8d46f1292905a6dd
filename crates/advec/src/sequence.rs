//! The growable sequence container.
//!
//! A [`Sequence`] pairs a [`RawStorage`] with a live-element count.
//! Exactly the slots `[0, len)` hold live values; `[len, capacity)` are
//! uninitialized. All element construction and destruction happens here.

#![allow(unsafe_code)]

use std::borrow::{Borrow, BorrowMut};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::mem;
use std::ops::{Deref, DerefMut};
use std::ptr;
use std::slice;

use crate::error::{PushError, StorageError};
use crate::growth;
use crate::raw::RawStorage;

/// A contiguous, growable sequence of `T`.
///
/// Appending to a full sequence doubles its capacity (starting at 1), so
/// `k` appends cost `O(k)` amortized. Capacity only grows through
/// [`reserve`](Self::reserve) or append/insert growth; it never shrinks
/// implicitly.
///
/// Indexing and iteration go through the slice returned by
/// [`Deref`]; out-of-range indexing panics.
///
/// ```
/// use advec::Sequence;
///
/// let mut seq = Sequence::new();
/// seq.push_back(1);
/// seq.push_back(2);
/// seq.push_back(3);
/// assert_eq!(seq.capacity(), 4);
///
/// seq.insert(1, 9);
/// assert_eq!(seq, [1, 9, 2, 3]);
/// assert_eq!(seq.erase(2), 2);
/// assert_eq!(seq.pop_back(), Some(3));
/// assert_eq!(seq, [1, 9]);
/// ```
pub struct Sequence<T> {
    storage: RawStorage<T>,
    /// Number of live values at the front of `storage`.
    len: usize,
    _owns: PhantomData<T>,
}

impl<T> Sequence<T> {
    /// An empty sequence. Allocates nothing.
    pub const fn new() -> Self {
        Self {
            storage: RawStorage::new(),
            len: 0,
            _owns: PhantomData,
        }
    }

    /// An empty sequence with room for `capacity` elements.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, StorageError> {
        Ok(Self {
            storage: RawStorage::with_capacity(capacity)?,
            len: 0,
            _owns: PhantomData,
        })
    }

    /// Infallible form of [`try_with_capacity`](Self::try_with_capacity).
    pub fn with_capacity(capacity: usize) -> Self {
        Self::try_with_capacity(capacity).unwrap_or_else(|err| err.escalate())
    }

    /// A sequence of `len` default values, with capacity exactly `len`.
    ///
    /// If `T::default()` panics, the values built so far are dropped and
    /// the storage is released before the panic continues.
    pub fn try_with_len(len: usize) -> Result<Self, StorageError>
    where
        T: Default,
    {
        let mut seq = Self::try_with_capacity(len)?;
        seq.try_resize_with(len, T::default)?;
        Ok(seq)
    }

    /// Infallible form of [`try_with_len`](Self::try_with_len).
    pub fn with_len(len: usize) -> Self
    where
        T: Default,
    {
        Self::try_with_len(len).unwrap_or_else(|err| err.escalate())
    }

    /// A sequence of `len` clones of `value`.
    pub fn from_elem(value: T, len: usize) -> Self
    where
        T: Clone,
    {
        let mut seq = Self::with_capacity(len);
        if len > 0 {
            for _ in 1..len {
                // SAFETY: at most len - 1 values are written into a block
                // of capacity len.
                unsafe { seq.push_unchecked(value.clone()) };
            }
            // SAFETY: the last free slot.
            unsafe { seq.push_unchecked(value) };
        }
        seq
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the sequence holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of elements the current storage can hold without growing.
    pub fn capacity(&self) -> usize {
        self.storage.capacity()
    }

    /// The live elements as a slice.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: slots [0, len) are live; the pointer is non-null and
        // aligned even when nothing is allocated.
        unsafe { slice::from_raw_parts(self.storage.as_ptr(), self.len) }
    }

    /// The live elements as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as in `as_slice`, with exclusive access through `&mut self`.
        unsafe { slice::from_raw_parts_mut(self.storage.as_mut_ptr(), self.len) }
    }

    /// Pointer to the first slot.
    pub fn as_ptr(&self) -> *const T {
        self.storage.as_ptr()
    }

    /// Mutable pointer to the first slot.
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.storage.as_mut_ptr()
    }

    // ── Capacity ─────────────────────────────────────────────────

    /// Ensure the capacity is at least `capacity` elements.
    ///
    /// Unlike `Vec::reserve`, the argument is the total capacity, not an
    /// increment. A no-op when `capacity <= self.capacity()`; otherwise
    /// the storage is replaced by one of exactly `capacity` slots and
    /// every element is relocated. On error nothing changes.
    pub fn try_reserve(&mut self, capacity: usize) -> Result<(), StorageError> {
        if capacity <= self.capacity() {
            return Ok(());
        }
        let fresh = RawStorage::with_capacity(capacity)?;
        self.adopt(fresh, None);
        Ok(())
    }

    /// Infallible form of [`try_reserve`](Self::try_reserve).
    ///
    /// # Panics
    ///
    /// Panics if `capacity` overflows; aborts through
    /// [`handle_alloc_error`](std::alloc::handle_alloc_error) if the
    /// allocator refuses.
    pub fn reserve(&mut self, capacity: usize) {
        if let Err(err) = self.try_reserve(capacity) {
            err.escalate();
        }
    }

    /// Resize to `new_len`, filling new slots with `make()`.
    ///
    /// Shrinking drops the excess elements. Growing reserves exactly
    /// `new_len` slots first. If `make` panics, the elements it already
    /// produced are dropped and the length is restored.
    pub fn try_resize_with<F>(&mut self, new_len: usize, mut make: F) -> Result<(), StorageError>
    where
        F: FnMut() -> T,
    {
        if new_len <= self.len {
            self.truncate(new_len);
            return Ok(());
        }
        self.try_reserve(new_len)?;

        let restore = TruncateOnUnwind {
            len: self.len,
            seq: self,
        };
        while restore.seq.len < new_len {
            // SAFETY: len < new_len <= capacity.
            unsafe { restore.seq.push_unchecked(make()) };
        }
        mem::forget(restore);
        Ok(())
    }

    /// Infallible form of [`try_resize_with`](Self::try_resize_with).
    pub fn resize_with<F>(&mut self, new_len: usize, make: F)
    where
        F: FnMut() -> T,
    {
        if let Err(err) = self.try_resize_with(new_len, make) {
            err.escalate();
        }
    }

    /// Resize to `new_len`, filling new slots with `T::default()`.
    pub fn try_resize(&mut self, new_len: usize) -> Result<(), StorageError>
    where
        T: Default,
    {
        self.try_resize_with(new_len, T::default)
    }

    /// Infallible form of [`try_resize`](Self::try_resize).
    pub fn resize(&mut self, new_len: usize)
    where
        T: Default,
    {
        self.resize_with(new_len, T::default);
    }

    /// Drop every element past `len`. Capacity is unchanged.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }
        let excess = self.len - len;
        // Shorten first: a panicking destructor must not see the tail
        // again when the sequence itself is dropped.
        self.len = len;
        // SAFETY: slots [len, len + excess) were live and are now outside
        // the live prefix, so they are dropped exactly once.
        unsafe {
            let tail = ptr::slice_from_raw_parts_mut(self.storage.slot_mut(len), excess);
            ptr::drop_in_place(tail);
        }
    }

    /// Drop every element. Capacity is unchanged.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    // ── Append ───────────────────────────────────────────────────

    /// Append `value`, growing the storage if it is full.
    pub fn push_back(&mut self, value: T) {
        if let Err(err) = self.try_push_back(value) {
            err.into_parts().0.escalate();
        }
    }

    /// Append `value`, handing it back on allocation failure.
    pub fn try_push_back(&mut self, value: T) -> Result<(), PushError<T>> {
        match self.emplace_at(self.len, move || value) {
            Ok(_) => Ok(()),
            Err((error, make)) => Err(PushError::new(error, make())),
        }
    }

    /// Append the value produced by `make`, constructed directly in its
    /// final slot, and return a reference to it.
    ///
    /// When the sequence is full, `make` runs against the new storage
    /// before any existing element is moved; if it panics, the sequence
    /// is unchanged.
    pub fn emplace_back<F>(&mut self, make: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        let index = self.len;
        self.emplace(index, make)
    }

    /// Fallible form of [`emplace_back`](Self::emplace_back).
    pub fn try_emplace_back<F>(&mut self, make: F) -> Result<&mut T, StorageError>
    where
        F: FnOnce() -> T,
    {
        let index = self.len;
        self.try_emplace(index, make)
    }

    /// Remove and return the last element, or `None` if empty.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: slot len was live and is now outside the live prefix,
        // so it is read out exactly once.
        Some(unsafe { self.storage.slot(self.len).read() })
    }

    // ── Positional insert / erase ────────────────────────────────

    /// Insert the value produced by `make` at `index`, shifting the
    /// elements after it toward the back. Returns a reference to the new
    /// element in the (possibly new) storage.
    ///
    /// `index == len` appends.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn emplace<F>(&mut self, index: usize, make: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        match self.emplace_at(index, make) {
            Ok(slot) => slot,
            Err((error, _)) => error.escalate(),
        }
    }

    /// Fallible form of [`emplace`](Self::emplace).
    pub fn try_emplace<F>(&mut self, index: usize, make: F) -> Result<&mut T, StorageError>
    where
        F: FnOnce() -> T,
    {
        self.emplace_at(index, make).map_err(|(error, _)| error)
    }

    /// Insert `value` at `index`. See [`emplace`](Self::emplace).
    pub fn insert(&mut self, index: usize, value: T) -> &mut T {
        self.emplace(index, move || value)
    }

    /// Insert `value` at `index`, handing it back on allocation failure.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn try_insert(&mut self, index: usize, value: T) -> Result<&mut T, PushError<T>> {
        self.emplace_at(index, move || value)
            .map_err(|(error, make)| PushError::new(error, make()))
    }

    /// Remove and return the element at `index`, shifting the elements
    /// after it toward the front.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn erase(&mut self, index: usize) -> T {
        let len = self.len;
        assert!(
            index < len,
            "erase index (is {index}) should be < len (is {len})"
        );
        // SAFETY: index < len, so the slot is live. It is read out once,
        // then the live tail [index + 1, len) is shifted over it.
        unsafe {
            let hole = self.storage.slot_mut(index);
            let removed = hole.read();
            ptr::copy(hole.add(1), hole, len - index - 1);
            self.len = len - 1;
            removed
        }
    }

    // ── Whole-container operations ───────────────────────────────

    /// Exchange contents and storage with `other` in O(1).
    pub fn swap(&mut self, other: &mut Self) {
        self.storage.swap(&mut other.storage);
        mem::swap(&mut self.len, &mut other.len);
    }

    /// Move the contents out, leaving `self` empty with capacity 0.
    pub fn take(&mut self) -> Self {
        mem::take(self)
    }

    /// Replace the contents with `other`'s storage and elements.
    ///
    /// The previous contents are dropped. Never allocates.
    pub fn assign(&mut self, mut other: Self) {
        self.swap(&mut other);
    }

    /// Deep copy with exactly `len` capacity.
    ///
    /// If a `clone` panics, the clones made so far are dropped and the
    /// storage is released.
    pub fn try_clone(&self) -> Result<Self, StorageError>
    where
        T: Clone,
    {
        let mut copy = Self::try_with_capacity(self.len)?;
        for item in self.as_slice() {
            // SAFETY: copy has capacity self.len and receives at most
            // that many values.
            unsafe { copy.push_unchecked(item.clone()) };
        }
        Ok(copy)
    }

    /// Overwrite `self` with a copy of `source`.
    ///
    /// When `self` cannot hold `source.len()` elements, a full copy is
    /// built first and swapped in, so on failure `self` is unchanged.
    /// Otherwise the existing storage is reused: the overlapping prefix
    /// is assigned with `clone_from`, then the excess is dropped or the
    /// missing tail is cloned in. A panic on that path leaves a valid
    /// sequence holding some mix of old and new values.
    pub fn try_clone_from(&mut self, source: &Self) -> Result<(), StorageError>
    where
        T: Clone,
    {
        if self.capacity() < source.len {
            let mut copy = source.try_clone()?;
            self.swap(&mut copy);
            return Ok(());
        }

        let overlap = self.len.min(source.len);
        self.as_mut_slice()[..overlap].clone_from_slice(&source[..overlap]);
        self.truncate(source.len);
        for item in &source[overlap..] {
            // SAFETY: capacity >= source.len and len only reaches source.len.
            unsafe { self.push_unchecked(item.clone()) };
        }
        Ok(())
    }

    // ── Internals ────────────────────────────────────────────────

    /// Write `value` into the first free slot.
    ///
    /// # Safety
    ///
    /// `len < capacity`.
    unsafe fn push_unchecked(&mut self, value: T) {
        debug_assert!(self.len < self.capacity());
        // SAFETY: caller guarantees slot len is within the block; it is
        // uninitialized by the slot invariant.
        unsafe { self.storage.slot_mut(self.len).write(value) };
        self.len += 1;
    }

    /// Single entry point for append and positional insert.
    ///
    /// On allocation failure the untouched `make` is handed back so the
    /// caller can recover a moved-in value.
    fn emplace_at<F>(&mut self, index: usize, make: F) -> Result<&mut T, (StorageError, F)>
    where
        F: FnOnce() -> T,
    {
        let len = self.len;
        assert!(
            index <= len,
            "insertion index (is {index}) should be <= len (is {len})"
        );

        if len < self.capacity() {
            let value = make();
            // SAFETY: slot len is free; the live range [index, len) moves
            // one slot back inside the block, leaving `index` vacant.
            unsafe {
                let hole = self.storage.slot_mut(index);
                ptr::copy(hole, hole.add(1), len - index);
                hole.write(value);
            }
        } else {
            let mut fresh: RawStorage<T> =
                match growth::next_capacity(len).and_then(RawStorage::with_capacity) {
                    Ok(fresh) => fresh,
                    Err(error) => return Err((error, make)),
                };
            // SAFETY: fresh holds at least len + 1 slots, all uninitialized.
            // If `make` panics, `fresh` is released and `self` is untouched.
            unsafe { fresh.slot_mut(index).write(make()) };
            self.adopt(fresh, Some(index));
        }

        self.len = len + 1;
        // SAFETY: slot index was initialized above.
        Ok(unsafe { &mut *self.storage.slot_mut(index) })
    }

    /// Relocate every live element into `fresh` and take ownership of it.
    ///
    /// With `gap = Some(i)` the elements from `i` onward land one slot
    /// later, leaving slot `i` of `fresh` to the caller. The old block is
    /// released without dropping anything: its values were moved out.
    fn adopt(&mut self, mut fresh: RawStorage<T>, gap: Option<usize>) {
        let len = self.len;
        let split = gap.unwrap_or(len);
        let shift = usize::from(gap.is_some());
        debug_assert!(split <= len);
        debug_assert!(fresh.capacity() >= len + shift);

        let src = self.storage.as_ptr();
        let dst = fresh.as_mut_ptr();
        // SAFETY: [0, len) of the old block is live; fresh is a distinct
        // block with room for len + shift values and the destination
        // ranges skip the gap slot.
        unsafe {
            RawStorage::relocate(src, dst, split);
            RawStorage::relocate(src.add(split), dst.add(split + shift), len - split);
        }
        self.storage.swap(&mut fresh);
    }
}

/// Restores a sequence's length if a fill loop unwinds.
struct TruncateOnUnwind<'a, T> {
    seq: &'a mut Sequence<T>,
    len: usize,
}

impl<T> Drop for TruncateOnUnwind<'_, T> {
    fn drop(&mut self) {
        self.seq.truncate(self.len);
    }
}

impl<T> Drop for Sequence<T> {
    fn drop(&mut self) {
        // SAFETY: exactly the first len slots are live. The storage field
        // releases the block afterwards.
        unsafe { ptr::drop_in_place(self.as_mut_slice()) };
    }
}

impl<T> Default for Sequence<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for Sequence<T> {
    fn clone(&self) -> Self {
        self.try_clone().unwrap_or_else(|err| err.escalate())
    }

    fn clone_from(&mut self, source: &Self) {
        if let Err(err) = self.try_clone_from(source) {
            err.escalate();
        }
    }
}

impl<T> Deref for Sequence<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> DerefMut for Sequence<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T> AsRef<[T]> for Sequence<T> {
    fn as_ref(&self) -> &[T] {
        self
    }
}

impl<T> AsMut<[T]> for Sequence<T> {
    fn as_mut(&mut self) -> &mut [T] {
        self
    }
}

impl<T> Borrow<[T]> for Sequence<T> {
    fn borrow(&self) -> &[T] {
        self
    }
}

impl<T> BorrowMut<[T]> for Sequence<T> {
    fn borrow_mut(&mut self) -> &mut [T] {
        self
    }
}

impl<T: fmt::Debug> fmt::Debug for Sequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_slice(), f)
    }
}

impl<T, U> PartialEq<Sequence<U>> for Sequence<T>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &Sequence<U>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq> Eq for Sequence<T> {}

impl<T, U> PartialEq<[U]> for Sequence<T>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &[U]) -> bool {
        self.as_slice() == other
    }
}

impl<T, U> PartialEq<&[U]> for Sequence<T>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &&[U]) -> bool {
        self.as_slice() == *other
    }
}

impl<T, U, const N: usize> PartialEq<[U; N]> for Sequence<T>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &[U; N]) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Hash> Hash for Sequence<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl<T> Extend<T> for Sequence<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        if let Some(total) = self.len.checked_add(lower) {
            self.reserve(total);
        }
        for item in iter {
            self.push_back(item);
        }
    }
}

impl<'a, T: Copy + 'a> Extend<&'a T> for Sequence<T> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T> FromIterator<T> for Sequence<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut seq = Self::new();
        seq.extend(iter);
        seq
    }
}

impl<T: Clone> From<&[T]> for Sequence<T> {
    fn from(items: &[T]) -> Self {
        let mut seq = Self::with_capacity(items.len());
        for item in items {
            // SAFETY: capacity is items.len().
            unsafe { seq.push_unchecked(item.clone()) };
        }
        seq
    }
}

impl<T, const N: usize> From<[T; N]> for Sequence<T> {
    fn from(items: [T; N]) -> Self {
        let mut seq = Self::with_capacity(N);
        for item in items {
            // SAFETY: capacity is N.
            unsafe { seq.push_unchecked(item) };
        }
        seq
    }
}

impl<'a, T> IntoIterator for &'a Sequence<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut Sequence<T> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T> Sequence<T> {
    /// Hand the storage and live range to an owning iterator, leaving
    /// `self` empty so its destructor does nothing.
    pub(crate) fn into_raw_parts(mut self) -> (RawStorage<T>, usize) {
        let storage = mem::take(&mut self.storage);
        let len = mem::replace(&mut self.len, 0);
        (storage, len)
    }
}
