//! Reusable element fixtures.

use std::cell::Cell;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Shared construction/drop accounting for [`Tracked`] values.
pub struct Ledger {
    constructed: AtomicUsize,
    dropped: AtomicUsize,
    /// Clones still allowed before `clone` panics.
    clone_budget: AtomicUsize,
}

impl Ledger {
    /// A ledger whose values clone without limit.
    pub fn new() -> Arc<Self> {
        Self::with_clone_budget(usize::MAX)
    }

    /// A ledger whose values panic on the clone after `budget` clones.
    pub fn with_clone_budget(budget: usize) -> Arc<Self> {
        Arc::new(Self {
            constructed: AtomicUsize::new(0),
            dropped: AtomicUsize::new(0),
            clone_budget: AtomicUsize::new(budget),
        })
    }

    /// Create a tracked value recorded in this ledger.
    pub fn track(self: &Arc<Self>, value: i32) -> Tracked {
        self.constructed.fetch_add(1, Ordering::SeqCst);
        Tracked {
            value,
            ledger: Arc::clone(self),
        }
    }

    /// Reset the clone budget.
    pub fn set_clone_budget(&self, budget: usize) {
        self.clone_budget.store(budget, Ordering::SeqCst);
    }

    /// Values constructed so far, including clones.
    pub fn constructed(&self) -> usize {
        self.constructed.load(Ordering::SeqCst)
    }

    /// Values dropped so far.
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::SeqCst)
    }

    /// Values constructed and not yet dropped.
    pub fn live(&self) -> usize {
        self.constructed() - self.dropped()
    }
}

/// An `i32` that reports its construction and drop to a [`Ledger`].
pub struct Tracked {
    pub value: i32,
    ledger: Arc<Ledger>,
}

impl Clone for Tracked {
    fn clone(&self) -> Self {
        let budget = &self.ledger.clone_budget;
        let remaining = budget.load(Ordering::SeqCst);
        if remaining == 0 {
            panic!("clone budget exhausted cloning {}", self.value);
        }
        if remaining != usize::MAX {
            budget.store(remaining - 1, Ordering::SeqCst);
        }
        self.ledger.track(self.value)
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.ledger.dropped.fetch_add(1, Ordering::SeqCst);
    }
}

impl PartialEq for Tracked {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl PartialEq<i32> for Tracked {
    fn eq(&self, other: &i32) -> bool {
        self.value == *other
    }
}

impl fmt::Debug for Tracked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tracked({})", self.value)
    }
}

thread_local! {
    static DEFAULT_BUDGET: Cell<Option<usize>> = const { Cell::new(None) };
    static DEFAULTED_LIVE: Cell<isize> = const { Cell::new(0) };
}

/// A `Default` value whose constructor can be armed to panic.
///
/// State is per thread, so parallel tests do not interfere.
#[derive(Debug, PartialEq, Eq)]
pub struct Defaulted(pub u32);

impl Defaulted {
    /// Allow `budget` more default constructions, then panic.
    pub fn arm(budget: usize) {
        DEFAULT_BUDGET.with(|b| b.set(Some(budget)));
    }

    /// Remove any armed budget.
    pub fn disarm() {
        DEFAULT_BUDGET.with(|b| b.set(None));
    }

    /// Default-constructed values on this thread not yet dropped.
    pub fn live() -> isize {
        DEFAULTED_LIVE.with(Cell::get)
    }
}

impl Default for Defaulted {
    fn default() -> Self {
        DEFAULT_BUDGET.with(|b| match b.get() {
            Some(0) => panic!("default budget exhausted"),
            Some(n) => b.set(Some(n - 1)),
            None => {}
        });
        DEFAULTED_LIVE.with(|l| l.set(l.get() + 1));
        Defaulted(7)
    }
}

impl Drop for Defaulted {
    fn drop(&mut self) {
        DEFAULTED_LIVE.with(|l| l.set(l.get() - 1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic;

    #[test]
    fn ledger_counts_clones_and_drops() {
        let ledger = Ledger::new();
        let a = ledger.track(1);
        let b = a.clone();
        assert_eq!(ledger.constructed(), 2);
        drop(a);
        drop(b);
        assert_eq!(ledger.dropped(), 2);
        assert_eq!(ledger.live(), 0);
    }

    #[test]
    fn clone_budget_panics_when_spent() {
        let ledger = Ledger::with_clone_budget(1);
        let a = ledger.track(5);
        let _b = a.clone();
        let result = panic::catch_unwind(panic::AssertUnwindSafe(|| a.clone()));
        assert!(result.is_err());
        assert_eq!(ledger.constructed(), 2);
    }

    #[test]
    fn defaulted_panics_after_budget() {
        Defaulted::arm(2);
        let a = Defaulted::default();
        let b = Defaulted::default();
        let result = panic::catch_unwind(Defaulted::default);
        Defaulted::disarm();
        assert!(result.is_err());
        assert_eq!(Defaulted::live(), 2);
        drop((a, b));
        assert_eq!(Defaulted::live(), 0);
    }
}
