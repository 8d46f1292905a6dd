//! Integration test: every element constructed is dropped exactly once.
//!
//! Runs growth, positional insert/erase, assignment and owning iteration
//! over ledger-tracked values and checks the ledger balances.

use advec::{seq, Sequence};
use advec_test_utils::{Ledger, Tracked};

#[test]
fn growth_relocates_without_dropping() {
    let ledger = Ledger::new();
    let mut seq = Sequence::new();
    for i in 0..100 {
        seq.push_back(ledger.track(i));
    }
    assert_eq!(ledger.constructed(), 100);
    assert_eq!(ledger.dropped(), 0);
    assert_eq!(seq.capacity(), 128);

    drop(seq);
    assert_eq!(ledger.dropped(), 100);
}

#[test]
fn reserve_relocates_without_dropping() {
    let ledger = Ledger::new();
    let mut seq: Sequence<Tracked> = (0..10).map(|i| ledger.track(i)).collect();
    seq.reserve(1000);
    assert_eq!(ledger.live(), 10);
    assert_eq!(seq[9], 9);
}

#[test]
fn insert_and_erase_balance() {
    let ledger = Ledger::new();
    let mut seq = Sequence::new();
    for i in 0..8 {
        seq.insert(seq.len() / 2, ledger.track(i));
    }
    assert_eq!(ledger.live(), 8);

    let removed = seq.erase(3);
    assert_eq!(ledger.live(), 8);
    drop(removed);
    assert_eq!(ledger.live(), 7);

    while let Some(last) = seq.pop_back() {
        drop(last);
    }
    assert_eq!(ledger.live(), 0);
    assert_eq!(seq.capacity(), 8);
}

#[test]
fn truncate_and_clear_drop_tail() {
    let ledger = Ledger::new();
    let mut seq: Sequence<Tracked> = (0..6).map(|i| ledger.track(i)).collect();
    seq.truncate(4);
    assert_eq!(ledger.live(), 4);
    seq.truncate(10);
    assert_eq!(ledger.live(), 4);
    seq.clear();
    assert_eq!(ledger.live(), 0);
    assert_eq!(seq.capacity(), 6);
}

#[test]
fn resize_drops_and_fills() {
    let ledger = Ledger::new();
    let mut seq: Sequence<Tracked> = (0..5).map(|i| ledger.track(i)).collect();
    seq.resize_with(2, || unreachable!("shrinking never constructs"));
    assert_eq!(ledger.live(), 2);
    seq.resize_with(4, || ledger.track(-1));
    assert_eq!(ledger.live(), 4);
    assert_eq!(seq[3], -1);
}

#[test]
fn clone_from_reuse_path_balances() {
    let ledger = Ledger::new();
    let mut target: Sequence<Tracked> = (0..6).map(|i| ledger.track(i)).collect();
    let short: Sequence<Tracked> = (10..12).map(|i| ledger.track(i)).collect();
    let long: Sequence<Tracked> = (20..25).map(|i| ledger.track(i)).collect();

    target.clone_from(&short);
    assert_eq!(target, [10, 11]);
    assert_eq!(ledger.live(), 2 + 2 + 5);

    target.clone_from(&long);
    assert_eq!(target, [20, 21, 22, 23, 24]);
    assert_eq!(target.capacity(), 6);
    assert_eq!(ledger.live(), 5 + 2 + 5);

    drop((target, short, long));
    assert_eq!(ledger.live(), 0);
}

#[test]
fn assign_and_swap_transfer_ownership() {
    let ledger = Ledger::new();
    let mut a: Sequence<Tracked> = (0..3).map(|i| ledger.track(i)).collect();
    let mut b: Sequence<Tracked> = (3..5).map(|i| ledger.track(i)).collect();

    a.swap(&mut b);
    assert_eq!(a, [3, 4]);
    assert_eq!(ledger.live(), 5);

    a.assign(b.take());
    assert_eq!(a, [0, 1, 2]);
    assert!(b.is_empty());
    assert_eq!(ledger.live(), 3);
}

#[test]
fn owning_iteration_balances() {
    let ledger = Ledger::new();
    let seq: Sequence<Tracked> = (0..10).map(|i| ledger.track(i)).collect();
    let mut it = seq.into_iter();
    let first = it.next().map(|t| t.value);
    let last = it.next_back().map(|t| t.value);
    assert_eq!((first, last), (Some(0), Some(9)));
    assert_eq!(ledger.live(), 8);
    drop(it);
    assert_eq!(ledger.live(), 0);
}

#[test]
fn from_elem_clones_and_moves() {
    let ledger = Ledger::new();
    let seq = seq![ledger.track(5); 4];
    assert_eq!(ledger.constructed(), 4);
    assert_eq!(seq, [5, 5, 5, 5]);
}
