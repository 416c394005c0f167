//! Derived read views
//!
//! Pure functions over a collection snapshot: sorting, grouping and
//! aggregation. Nothing here mutates or caches — every call recomputes
//! from the slice it is given, so a view can never be stale relative to
//! the snapshot it was computed from.

use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Stable sort of a fresh copy of `records`; the input order is untouched
/// and ties keep their original relative order.
pub fn sorted_by<T: Clone>(records: &[T], mut cmp: impl FnMut(&T, &T) -> Ordering) -> Vec<T> {
    let mut out = records.to_vec();
    out.sort_by(|a, b| cmp(a, b));
    out
}

/// Group records by a key, preserving collection order within each group.
///
/// `BTreeMap` keeps group iteration order deterministic.
pub fn grouped_by<T: Clone, K: Ord>(records: &[T], key: impl Fn(&T) -> K) -> BTreeMap<K, Vec<T>> {
    let mut groups: BTreeMap<K, Vec<T>> = BTreeMap::new();
    for record in records {
        groups.entry(key(record)).or_default().push(record.clone());
    }
    groups
}

/// Per-group sums of an amount, e.g. spend totals per category.
pub fn group_totals<T, K: Ord>(
    records: &[T],
    key: impl Fn(&T) -> K,
    amount: impl Fn(&T) -> f64,
) -> BTreeMap<K, f64> {
    let mut totals: BTreeMap<K, f64> = BTreeMap::new();
    for record in records {
        *totals.entry(key(record)).or_insert(0.0) += amount(record);
    }
    totals
}

/// Sum of an amount over all records.
pub fn sum_by<T>(records: &[T], amount: impl Fn(&T) -> f64) -> f64 {
    records.iter().map(amount).sum()
}

/// Count of records satisfying a predicate.
pub fn count_where<T>(records: &[T], pred: impl Fn(&T) -> bool) -> usize {
    records.iter().filter(|r| pred(r)).count()
}
