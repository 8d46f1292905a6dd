//! Owning iteration over a [`Sequence`].

#![allow(unsafe_code)]

use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::ptr;
use std::slice;

use crate::raw::RawStorage;
use crate::sequence::Sequence;

/// Iterator that moves elements out of a [`Sequence`].
///
/// Owns the sequence's storage. Elements not yet yielded are dropped,
/// and the block released, when the iterator is dropped.
pub struct IntoIter<T> {
    storage: RawStorage<T>,
    /// First live slot.
    head: usize,
    /// One past the last live slot.
    tail: usize,
    _owns: PhantomData<T>,
}

impl<T> IntoIter<T> {
    /// The elements not yet yielded.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: slots [head, tail) are live.
        unsafe { slice::from_raw_parts(self.storage.slot(self.head), self.tail - self.head) }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.head == self.tail {
            return None;
        }
        let slot = self.storage.slot(self.head);
        self.head += 1;
        // SAFETY: the slot was live and is now outside [head, tail).
        Some(unsafe { slot.read() })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.tail - self.head;
        (remaining, Some(remaining))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        if self.head == self.tail {
            return None;
        }
        self.tail -= 1;
        // SAFETY: the slot was live and is now outside [head, tail).
        Some(unsafe { self.storage.slot(self.tail).read() })
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T> Drop for IntoIter<T> {
    fn drop(&mut self) {
        let remaining = self.tail - self.head;
        // SAFETY: [head, tail) are the only live slots; `storage`
        // releases the block afterwards.
        unsafe {
            let rest = ptr::slice_from_raw_parts_mut(self.storage.slot_mut(self.head), remaining);
            ptr::drop_in_place(rest);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

impl<T> IntoIterator for Sequence<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        let (storage, len) = self.into_raw_parts();
        IntoIter {
            storage,
            head: 0,
            tail: len,
            _owns: PhantomData,
        }
    }
}
