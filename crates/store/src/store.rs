//! RecordStore: generic reactive collection store
//!
//! An ordered in-memory collection of uniquely identified records with
//! CRUD operations, derived read views, explicit change subscriptions and
//! optional mirroring to a persisted slot.
//!
//! # Design
//!
//! A store handle is a cheap Clone over shared state (`Arc` inner); every
//! handle sees the same collection. Records live in a `Vec` (insertion
//! order is iteration order) with an `FxHashMap` id index for O(1)
//! lookups.
//!
//! Mutations run under a write lock, then mirror the full collection to
//! the configured slot, then notify subscribers — in that order, outside
//! the lock. A failed slot write never rolls back or blocks the mutation;
//! the in-memory collection is the source of truth.
//!
//! # Example
//!
//! ```ignore
//! let store: RecordStore<Task> = StoreBuilder::new()
//!     .persist(backend.clone(), "tasks")
//!     .seed(7, |rng| generate_tasks(rng, 20))
//!     .build();
//!
//! let task = store.insert(Task::new("write docs"));
//! store.update(&task.record_id().unwrap(), |t| t.done = true)?;
//! ```

use crate::observe::{ChangeEvent, ObserverRegistry, Subscription};
use crate::query::Query;
use crate::seed::{seeded_rng, SeedFn};
use crate::view;
use parking_lot::{Mutex, RwLock};
use rand::rngs::StdRng;
use rustc_hash::FxHashMap;
use std::cmp::Ordering;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use tabula_core::{IdAllocator, IdMode, Record, RecordId, Result, StoreError};
use tabula_persist::{SlotBackend, Snapshot};
use tracing::warn;

// =============================================================================
// Collection
// =============================================================================

/// Ordered record storage plus id index.
struct Collection<T> {
    records: Vec<T>,
    /// id -> position in `records`
    index: FxHashMap<RecordId, usize>,
}

impl<T: Record> Collection<T> {
    fn new() -> Self {
        Self {
            records: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    fn push(&mut self, id: RecordId, record: T) {
        self.index.insert(id, self.records.len());
        self.records.push(record);
    }

    fn position(&self, id: &RecordId) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Remove by id, shifting later positions down.
    fn remove(&mut self, id: &RecordId) -> Option<T> {
        let pos = self.index.remove(id)?;
        let record = self.records.remove(pos);
        for p in self.index.values_mut() {
            if *p > pos {
                *p -= 1;
            }
        }
        Some(record)
    }

    fn clear(&mut self) {
        self.records.clear();
        self.index.clear();
    }
}

/// Pick the id a record enters the collection under.
///
/// An explicit unseen id is kept (and observed so it is never reissued);
/// an absent or colliding id is replaced with a fresh allocation. Insert
/// therefore always appends under a unique id and never overwrites.
fn resolve_id<T>(
    allocator: &IdAllocator,
    collection: &Collection<T>,
    incoming: Option<RecordId>,
) -> RecordId {
    match incoming {
        Some(id) if !collection.index.contains_key(&id) => {
            allocator.observe(&id);
            id
        }
        _ => {
            let mut id = allocator.allocate();
            // Uuid mode could in principle collide with a caller-chosen
            // string id; allocate until unused.
            while collection.index.contains_key(&id) {
                id = allocator.allocate();
            }
            id
        }
    }
}

// =============================================================================
// Store internals
// =============================================================================

struct SlotMirror {
    backend: Arc<dyn SlotBackend>,
    slot: String,
    /// Mutation-order ticket, issued while the collection write lock is
    /// held, so ticket order equals mutation order.
    next_ticket: AtomicU64,
    /// Ticket of the newest snapshot that landed in the slot. Backend
    /// writes run under this lock; a stale ticket skips its write, so a
    /// refresh firing on another thread can never clobber the slot with
    /// an older snapshot.
    written: Mutex<u64>,
}

struct SeedState<T> {
    rng: StdRng,
    seed_fn: Option<SeedFn<T>>,
}

struct StoreInner<T> {
    collection: RwLock<Collection<T>>,
    allocator: IdAllocator,
    mirror: Option<SlotMirror>,
    observers: Arc<ObserverRegistry>,
    seeding: Mutex<SeedState<T>>,
    last_persist_error: Mutex<Option<String>>,
}

// =============================================================================
// RecordStore
// =============================================================================

/// Generic collection store over records of type `T`.
///
/// # Thread Safety
///
/// Handles are `Clone + Send + Sync`; clones share one collection. The
/// intended model is still single-writer (one owning UI context), but
/// nothing breaks if a deferred refresh fires from another thread.
pub struct RecordStore<T: Record> {
    inner: Arc<StoreInner<T>>,
}

impl<T: Record> Clone for RecordStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Record> RecordStore<T> {
    /// Create an empty store with default settings and no persistence.
    pub fn new() -> Self {
        StoreBuilder::new().build()
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Insert a record, assigning a fresh id when the incoming id is
    /// absent or already taken. Appends to the end of the collection and
    /// returns the stored record with its id populated. Always succeeds.
    pub fn insert(&self, mut record: T) -> T {
        let (id, stored, payload) = {
            let mut col = self.inner.collection.write();
            let id = resolve_id(&self.inner.allocator, &col, record.record_id());
            record.assign_id(id.clone());
            col.push(id.clone(), record.clone());
            (id, record, self.encode_if_mirrored(&col))
        };
        self.write_mirror(payload);
        self.inner.observers.notify(&ChangeEvent::Inserted(id));
        stored
    }

    /// Apply a mutator to the record with the given id, in place.
    ///
    /// The record's identity is immutable through this path: whatever the
    /// mutator does, the id is restored afterwards. Returns the updated
    /// record, or `NotFound` (collection unchanged).
    pub fn update(&self, id: &RecordId, mutator: impl FnOnce(&mut T)) -> Result<T> {
        let (updated, payload) = {
            let mut col = self.inner.collection.write();
            let pos = col
                .position(id)
                .ok_or_else(|| StoreError::not_found(id.clone()))?;
            let record = &mut col.records[pos];
            mutator(record);
            record.assign_id(id.clone());
            let updated = record.clone();
            (updated, self.encode_if_mirrored(&col))
        };
        self.write_mirror(payload);
        self.inner
            .observers
            .notify(&ChangeEvent::Updated(id.clone()));
        Ok(updated)
    }

    /// Shallow-merge a JSON object into the record with the given id.
    ///
    /// Patch fields overwrite, unpatched fields are preserved, and an
    /// `id` field in the patch is ignored. The collection is untouched
    /// unless the merged record deserializes cleanly back into `T`.
    pub fn patch(&self, id: &RecordId, patch: serde_json::Value) -> Result<T> {
        let patch = match patch {
            serde_json::Value::Object(map) => map,
            other => {
                return Err(StoreError::InvalidPatch(format!(
                    "expected a JSON object, got {}",
                    json_kind(&other)
                )))
            }
        };

        let (patched, payload) = {
            let mut col = self.inner.collection.write();
            let pos = col
                .position(id)
                .ok_or_else(|| StoreError::not_found(id.clone()))?;

            let current =
                serde_json::to_value(&col.records[pos]).map_err(StoreError::serialization)?;
            let mut merged = match current {
                serde_json::Value::Object(map) => map,
                other => {
                    return Err(StoreError::InvalidPatch(format!(
                        "record serializes to {}, cannot merge",
                        json_kind(&other)
                    )))
                }
            };
            for (field, value) in patch {
                if field != "id" {
                    merged.insert(field, value);
                }
            }

            let mut patched: T = serde_json::from_value(serde_json::Value::Object(merged))
                .map_err(StoreError::serialization)?;
            patched.assign_id(id.clone());
            col.records[pos] = patched.clone();
            (patched, self.encode_if_mirrored(&col))
        };
        self.write_mirror(payload);
        self.inner
            .observers
            .notify(&ChangeEvent::Updated(id.clone()));
        Ok(patched)
    }

    /// Remove the record with the given id if present.
    ///
    /// Idempotent: returns whether a removal occurred, never errors.
    pub fn delete(&self, id: &RecordId) -> bool {
        let payload = {
            let mut col = self.inner.collection.write();
            if col.remove(id).is_none() {
                return false;
            }
            self.encode_if_mirrored(&col)
        };
        self.write_mirror(payload);
        self.inner
            .observers
            .notify(&ChangeEvent::Deleted(id.clone()));
        true
    }

    /// Atomically replace the entire collection.
    ///
    /// Explicit ids are kept (and observed); missing ids and ids that
    /// collide within the batch are assigned fresh.
    pub fn replace_all(&self, records: Vec<T>) {
        let (len, payload) = {
            let mut col = self.inner.collection.write();
            col.clear();
            for mut record in records {
                let id = resolve_id(&self.inner.allocator, &col, record.record_id());
                record.assign_id(id.clone());
                col.push(id, record);
            }
            (col.records.len(), self.encode_if_mirrored(&col))
        };
        self.write_mirror(payload);
        self.inner.observers.notify(&ChangeEvent::Replaced { len });
    }

    /// Regenerate the collection from the configured seed function.
    ///
    /// Returns false (and leaves the collection alone) when the store was
    /// built without one.
    pub fn reseed(&self) -> bool {
        let records = {
            let mut seeding = self.inner.seeding.lock();
            let seeding = &mut *seeding;
            match seeding.seed_fn.as_mut() {
                Some(generate) => generate(&mut seeding.rng),
                None => return false,
            }
        };
        self.replace_all(records);
        true
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Pure lookup by id. Returns a clone; internal storage is never
    /// aliased out.
    pub fn get(&self, id: &RecordId) -> Option<T> {
        let col = self.inner.collection.read();
        col.position(id).map(|pos| col.records[pos].clone())
    }

    /// All records in insertion order, as a fresh sequence.
    pub fn list(&self) -> Vec<T> {
        self.inner.collection.read().records.clone()
    }

    /// Records satisfying the query, in insertion order.
    pub fn list_where(&self, query: &Query<T>) -> Vec<T> {
        self.inner
            .collection
            .read()
            .records
            .iter()
            .filter(|r| query.matches(r))
            .cloned()
            .collect()
    }

    /// Stable-sorted copy of the collection; stored order is untouched
    /// and ties keep their original relative order.
    pub fn sorted_by(&self, cmp: impl FnMut(&T, &T) -> Ordering) -> Vec<T> {
        view::sorted_by(&self.inner.collection.read().records, cmp)
    }

    /// Left-to-right pure reduction over the current collection.
    pub fn fold<A>(&self, seed: A, mut reducer: impl FnMut(A, &T) -> A) -> A {
        let col = self.inner.collection.read();
        let mut acc = seed;
        for record in &col.records {
            acc = reducer(acc, record);
        }
        acc
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.inner.collection.read().records.len()
    }

    /// True when the collection holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ========================================================================
    // Observation and persistence status
    // ========================================================================

    /// Subscribe to change events. The callback runs synchronously on
    /// each mutating call; dropping the subscription unregisters it.
    pub fn subscribe(
        &self,
        callback: impl Fn(&ChangeEvent) + Send + Sync + 'static,
    ) -> Subscription {
        ObserverRegistry::subscribe(&self.inner.observers, callback)
    }

    /// Message of the most recent failed slot write, if the latest write
    /// failed. Cleared by the next successful write.
    pub fn last_persist_error(&self) -> Option<String> {
        self.inner.last_persist_error.lock().clone()
    }

    // ========================================================================
    // Mirroring
    // ========================================================================

    /// Encode the collection for the mirror while the collection lock is
    /// held, pairing the snapshot with its mutation-order ticket.
    /// Returns None when the store has no mirror configured.
    fn encode_if_mirrored(&self, col: &Collection<T>) -> Option<(u64, Result<String>)> {
        self.inner.mirror.as_ref().map(|mirror| {
            let ticket = mirror.next_ticket.fetch_add(1, AtomicOrdering::AcqRel) + 1;
            (ticket, Snapshot::new(col.records.clone()).encode())
        })
    }

    /// Write an encoded snapshot to the slot. Writes are serialized and
    /// a snapshot older than one already written is dropped, so the slot
    /// always ends up holding the newest collection state. Failure is
    /// warn-logged and recorded; the in-memory collection is not rolled
    /// back.
    fn write_mirror(&self, payload: Option<(u64, Result<String>)>) {
        let (Some(mirror), Some((ticket, payload))) = (self.inner.mirror.as_ref(), payload) else {
            return;
        };
        let mut written = mirror.written.lock();
        if ticket <= *written {
            // A newer snapshot already landed.
            return;
        }
        let outcome = payload.and_then(|text| {
            mirror
                .backend
                .store(&mirror.slot, &text)
                .map_err(|e| StoreError::persistence_write(&mirror.slot, e.to_string()))
        });
        match outcome {
            Ok(()) => {
                *written = ticket;
                *self.inner.last_persist_error.lock() = None;
            }
            Err(e) => {
                warn!(slot = %mirror.slot, error = %e, "slot write failed; in-memory collection remains authoritative");
                *self.inner.last_persist_error.lock() = Some(e.to_string());
            }
        }
    }
}

impl<T: Record> Default for RecordStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

// =============================================================================
// StoreBuilder
// =============================================================================

/// Builds a [`RecordStore`].
///
/// Load order at construction: the persisted slot if present and
/// well-formed, else the seed function, else empty. A corrupt or
/// unreadable slot is warn-logged and treated as absent — never fatal.
pub struct StoreBuilder<T: Record> {
    id_mode: IdMode,
    mirror: Option<(Arc<dyn SlotBackend>, String)>,
    seed_fn: Option<SeedFn<T>>,
    rng_seed: u64,
}

impl<T: Record> StoreBuilder<T> {
    /// Start a builder with defaults: sequential ids, no persistence,
    /// no seed data.
    pub fn new() -> Self {
        Self {
            id_mode: IdMode::default(),
            mirror: None,
            seed_fn: None,
            rng_seed: 0,
        }
    }

    /// Id issuance strategy.
    pub fn id_mode(mut self, mode: IdMode) -> Self {
        self.id_mode = mode;
        self
    }

    /// Mirror the collection to `slot` in `backend` after every mutation,
    /// and load from it at construction.
    pub fn persist(mut self, backend: Arc<dyn SlotBackend>, slot: impl Into<String>) -> Self {
        self.mirror = Some((backend, slot.into()));
        self
    }

    /// Seed function plus the rng seed it draws from. Invoked at
    /// construction when no persisted data exists, and again on
    /// [`RecordStore::reseed`].
    pub fn seed(
        mut self,
        rng_seed: u64,
        generate: impl FnMut(&mut StdRng) -> Vec<T> + Send + 'static,
    ) -> Self {
        self.rng_seed = rng_seed;
        self.seed_fn = Some(Box::new(generate));
        self
    }

    /// Construct the store.
    pub fn build(self) -> RecordStore<T> {
        let allocator = IdAllocator::new(self.id_mode);
        let mut seeding = SeedState {
            rng: seeded_rng(self.rng_seed),
            seed_fn: self.seed_fn,
        };

        // Persisted snapshot wins; corruption falls back to seed data.
        let mut loaded: Option<Vec<T>> = None;
        if let Some((backend, slot)) = &self.mirror {
            match backend.load(slot) {
                Ok(Some(payload)) => match Snapshot::<T>::decode(slot, &payload) {
                    Ok(snapshot) => loaded = Some(snapshot.records),
                    Err(e) => {
                        warn!(slot = %slot, error = %e, "persisted snapshot unreadable; using seed data");
                    }
                },
                Ok(None) => {}
                Err(e) => {
                    warn!(slot = %slot, error = %e, "slot load failed; using seed data");
                }
            }
        }
        let initial = loaded.unwrap_or_else(|| {
            let seeding = &mut seeding;
            match seeding.seed_fn.as_mut() {
                Some(generate) => generate(&mut seeding.rng),
                None => Vec::new(),
            }
        });

        let mut collection = Collection::new();
        for mut record in initial {
            let id = resolve_id(&allocator, &collection, record.record_id());
            record.assign_id(id.clone());
            collection.push(id, record);
        }

        RecordStore {
            inner: Arc::new(StoreInner {
                collection: RwLock::new(collection),
                allocator,
                mirror: self.mirror.map(|(backend, slot)| SlotMirror {
                    backend,
                    slot,
                    next_ticket: AtomicU64::new(0),
                    written: Mutex::new(0),
                }),
                observers: Arc::new(ObserverRegistry::default()),
                seeding: Mutex::new(seeding),
                last_persist_error: Mutex::new(None),
            }),
        }
    }
}

impl<T: Record> Default for StoreBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}
