//! Store semantics integration tests
//!
//! End-to-end checks of the collection contracts through the public API:
//! - id issuance and uniqueness
//! - update/patch merge behavior
//! - idempotent delete
//! - order-preserving list/filter and stable sort
//! - derived aggregates reflecting the latest mutation

use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::cmp::Ordering;
use tabula::{
    count_where, group_totals, ChangeEvent, Query, Record, RecordId, RecordStore, StoreBuilder,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct FoodEntry {
    id: Option<RecordId>,
    name: String,
    category: String,
    calories: f64,
}

impl FoodEntry {
    fn new(name: &str, category: &str, calories: f64) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            category: category.to_string(),
            calories,
        }
    }

    fn with_id(id: u64, name: &str) -> Self {
        Self {
            id: Some(RecordId::Int(id)),
            name: name.to_string(),
            category: "misc".to_string(),
            calories: 0.0,
        }
    }
}

impl Record for FoodEntry {
    fn record_id(&self) -> Option<RecordId> {
        self.id.clone()
    }

    fn assign_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }
}

fn names(entries: &[FoodEntry]) -> Vec<&str> {
    entries.iter().map(|e| e.name.as_str()).collect()
}

/// Scenario: insert {id:1,"A"}, {id:2,"B"}; update 2 to "C";
/// list() → [{id:1,"A"}, {id:2,"C"}]
#[test]
fn test_update_scenario_from_explicit_ids() {
    let store: RecordStore<FoodEntry> = StoreBuilder::new().build();

    store.insert(FoodEntry::with_id(1, "A"));
    store.insert(FoodEntry::with_id(2, "B"));
    store
        .update(&RecordId::Int(2), |e| e.name = "C".to_string())
        .unwrap();

    let listed = store.list();
    assert_eq!(listed[0].id, Some(RecordId::Int(1)));
    assert_eq!(listed[0].name, "A");
    assert_eq!(listed[1].id, Some(RecordId::Int(2)));
    assert_eq!(listed[1].name, "C");
}

/// Scenario: deleteById(1) on an empty store → false, store unchanged.
#[test]
fn test_delete_on_empty_store() {
    let store: RecordStore<FoodEntry> = StoreBuilder::new().build();
    assert!(!store.delete(&RecordId::Int(1)));
    assert!(store.is_empty());
}

/// Scenario: 3 "fruit" and 2 "protein" records; a category filter
/// returns exactly the 3 fruit records in original order.
#[test]
fn test_category_filter_preserves_order() {
    let store: RecordStore<FoodEntry> = StoreBuilder::new().build();
    store.insert(FoodEntry::new("apple", "fruit", 95.0));
    store.insert(FoodEntry::new("chicken", "protein", 230.0));
    store.insert(FoodEntry::new("banana", "fruit", 105.0));
    store.insert(FoodEntry::new("tofu", "protein", 180.0));
    store.insert(FoodEntry::new("pear", "fruit", 100.0));

    let fruit = store.list_where(&Query::new().filter(|e: &FoodEntry| e.category == "fruit"));
    assert_eq!(names(&fruit), vec!["apple", "banana", "pear"]);
}

#[test]
fn test_list_length_tracks_inserts_minus_deletes() {
    let store: RecordStore<FoodEntry> = StoreBuilder::new().build();

    let mut ids = Vec::new();
    for i in 0..10 {
        let stored = store.insert(FoodEntry::new(&format!("item-{}", i), "misc", 1.0));
        ids.push(stored.id.unwrap());
    }
    for id in ids.iter().take(4) {
        assert!(store.delete(id));
    }
    // A repeated delete changes nothing.
    assert!(!store.delete(&ids[0]));

    assert_eq!(store.list().len(), 6);
}

#[test]
fn test_update_then_get_merges_fields() {
    let store: RecordStore<FoodEntry> = StoreBuilder::new().build();
    let entry = store.insert(FoodEntry::new("oats", "grain", 150.0));
    let id = entry.id.unwrap();

    store
        .patch(&id, json!({"calories": 160.0}))
        .unwrap();

    let fetched = store.get(&id).unwrap();
    assert_eq!(fetched.calories, 160.0);
    // Unpatched fields keep their pre-update values.
    assert_eq!(fetched.name, "oats");
    assert_eq!(fetched.category, "grain");
}

#[test]
fn test_delete_then_get_is_absent_for_any_id() {
    let store: RecordStore<FoodEntry> = StoreBuilder::new().build();
    let entry = store.insert(FoodEntry::new("x", "misc", 1.0));
    let id = entry.id.unwrap();

    store.delete(&id);
    assert!(store.get(&id).is_none());
    // Ids never inserted behave the same.
    assert!(store.get(&RecordId::Int(404)).is_none());
    assert!(store.get(&RecordId::from("never")).is_none());
}

#[test]
fn test_aggregates_reflect_latest_mutation() {
    let store: RecordStore<FoodEntry> = StoreBuilder::new().build();
    store.insert(FoodEntry::new("apple", "fruit", 95.0));
    store.insert(FoodEntry::new("banana", "fruit", 105.0));
    let chicken = store.insert(FoodEntry::new("chicken", "protein", 230.0));

    let snapshot = store.list();
    let totals = group_totals(&snapshot, |e| e.category.clone(), |e| e.calories);
    assert_eq!(totals["fruit"], 200.0);
    assert_eq!(totals["protein"], 230.0);

    // Never cached stale: recompute after a delete.
    store.delete(&chicken.id.unwrap());
    let snapshot = store.list();
    let totals = group_totals(&snapshot, |e| e.category.clone(), |e| e.calories);
    assert!(!totals.contains_key("protein"));
    assert_eq!(count_where(&snapshot, |e| e.category == "fruit"), 2);

    let total: f64 = store.fold(0.0, |acc, e| acc + e.calories);
    assert_eq!(total, 200.0);
}

#[test]
fn test_observer_event_per_mutation_end_to_end() {
    use parking_lot::Mutex;
    use std::sync::Arc;

    let store: RecordStore<FoodEntry> = StoreBuilder::new().build();
    let events = Arc::new(Mutex::new(Vec::new()));
    let _sub = {
        let events = Arc::clone(&events);
        store.subscribe(move |e| events.lock().push(e.clone()))
    };

    let entry = store.insert(FoodEntry::new("apple", "fruit", 95.0));
    let id = entry.id.unwrap();
    store.update(&id, |e| e.calories = 90.0).unwrap();
    store.delete(&id);

    assert_eq!(
        events.lock().clone(),
        vec![
            ChangeEvent::Inserted(id.clone()),
            ChangeEvent::Updated(id.clone()),
            ChangeEvent::Deleted(id),
        ]
    );
}

proptest! {
    /// Every id issued across any sequence of inserts is unique.
    #[test]
    fn prop_insert_ids_are_unique(names in prop::collection::vec("[a-z]{1,8}", 0..50)) {
        let store: RecordStore<FoodEntry> = StoreBuilder::new().build();
        let mut seen = std::collections::HashSet::new();
        for name in names {
            let stored = store.insert(FoodEntry::new(&name, "misc", 1.0));
            prop_assert!(seen.insert(stored.id.unwrap()));
        }
    }

    /// Stable sort: records comparing equal retain their list() order.
    #[test]
    fn prop_sort_is_stable(categories in prop::collection::vec(0u8..4, 0..40)) {
        let store: RecordStore<FoodEntry> = StoreBuilder::new().build();
        for (i, cat) in categories.iter().enumerate() {
            store.insert(FoodEntry::new(&format!("e{}", i), &format!("c{}", cat), 0.0));
        }

        let sorted = store.sorted_by(|a, b| a.category.cmp(&b.category));
        // Within each category, names must appear in insertion order.
        for window in sorted.windows(2) {
            if window[0].category == window[1].category {
                let a: usize = window[0].name[1..].parse().unwrap();
                let b: usize = window[1].name[1..].parse().unwrap();
                prop_assert!(a < b);
            }
        }
        // Stored order untouched.
        let listed = store.list();
        for (i, entry) in listed.iter().enumerate() {
            let expected = format!("e{}", i);
            prop_assert_eq!(entry.name.as_str(), expected.as_str());
        }
    }

    /// sorted_by agrees with a stable reference sort.
    #[test]
    fn prop_sorted_matches_reference(calories in prop::collection::vec(0u32..100, 0..40)) {
        let store: RecordStore<FoodEntry> = StoreBuilder::new().build();
        for (i, c) in calories.iter().enumerate() {
            store.insert(FoodEntry::new(&format!("e{}", i), "misc", f64::from(*c)));
        }

        let mut reference = store.list();
        reference.sort_by(|a, b| a.calories.partial_cmp(&b.calories).unwrap_or(Ordering::Equal));
        let sorted = store.sorted_by(|a, b| {
            a.calories.partial_cmp(&b.calories).unwrap_or(Ordering::Equal)
        });
        prop_assert_eq!(sorted, reference);
    }
}
