//! Growable contiguous sequence built directly on raw allocation.
//!
//! The crate separates two kinds of ownership that `Vec` keeps in one
//! type: ownership of a block of uninitialized memory, and ownership of
//! the values living inside it.
//!
//! # Architecture
//!
//! ```text
//! Sequence<T> (element lifetimes, growth, insert/erase)
//! ├── len: usize (slots [0, len) are live)
//! └── RawStorage<T> (allocate/deallocate only, never touches a T)
//!     └── NonNull<T> + capacity
//! ```
//!
//! Every reallocation funnels through one routine: allocate a fresh
//! [`RawStorage`], construct the incoming element (if any) in its final
//! slot, relocate the live elements around it, swap the blocks, release
//! the old one.
//!
//! # Failure guarantees
//!
//! - Allocation failure is reported by the `try_*` methods as a
//!   [`StorageError`] before anything is mutated.
//! - Panics raised by element code (`Clone`, `Default`, constructor
//!   closures) never leak storage and never leave a slot both live and
//!   uninitialized. Growth, append and positional insert are strong:
//!   relocation is a bitwise move and cannot fail, so element code only
//!   ever runs before existing elements are touched.
//! - `clone_from` gives the basic guarantee when it reuses storage.
//!
//! # Unsafe code
//!
//! `unsafe` is denied crate-wide and allowed only in [`raw`],
//! [`sequence`] and [`iter`]. Each block carries a `// SAFETY:` comment
//! naming the slot invariant it relies on.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod error;
pub mod growth;
pub mod iter;
mod macros;
pub mod raw;
pub mod sequence;

// Public re-exports for the primary API surface.
pub use error::{PushError, StorageError};
pub use growth::Relocation;
pub use iter::IntoIter;
pub use raw::RawStorage;
pub use sequence::Sequence;
