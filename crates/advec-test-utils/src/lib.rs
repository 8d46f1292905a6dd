//! Element fixtures for advec lifetime and panic-safety tests.
//!
//! - [`Ledger`] / [`Tracked`]: counts constructions and drops so tests can
//!   assert every element is dropped exactly once, and optionally makes
//!   `clone` panic after a budget runs out.
//! - [`Defaulted`]: a `Default` type whose constructor panics after an
//!   armed number of calls on the current thread.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{Defaulted, Ledger, Tracked};
