//! Tabula: an embedded reactive record store
//!
//! A generic client-side collection store: an ordered in-memory set of
//! uniquely identified records with CRUD operations, derived read views
//! (filter / sort / group / aggregate), explicit change subscriptions,
//! deterministic seeded data generation, and optional mirroring to a
//! named persisted slot.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use serde::{Deserialize, Serialize};
//! use tabula::{MemoryBackend, Query, Record, RecordId, RecordStore, StoreBuilder};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! struct Contact {
//!     id: Option<RecordId>,
//!     name: String,
//!     favorite: bool,
//! }
//!
//! impl Record for Contact {
//!     fn record_id(&self) -> Option<RecordId> {
//!         self.id.clone()
//!     }
//!     fn assign_id(&mut self, id: RecordId) {
//!         self.id = Some(id);
//!     }
//! }
//!
//! let backend = Arc::new(MemoryBackend::new());
//! let store: RecordStore<Contact> = StoreBuilder::new()
//!     .persist(backend, "contacts")
//!     .build();
//!
//! let ada = store.insert(Contact { id: None, name: "Ada".into(), favorite: false });
//! let id = ada.record_id().unwrap();
//! store.update(&id, |c| c.favorite = true).unwrap();
//!
//! let favorites = store.list_where(&Query::new().filter(|c: &Contact| c.favorite));
//! assert_eq!(favorites.len(), 1);
//! ```
//!
//! # Guarantees
//!
//! - Ids are never reissued within a store's lifetime; insert always
//!   appends under a unique id, update replaces in place.
//! - Reads return fresh data, never aliases of internal storage, and
//!   derived views are recomputed on every call.
//! - Persistence is best-effort: a failed slot write is warn-logged and
//!   never rolls back or blocks the in-memory mutation; a corrupt slot
//!   at load time falls back to seed data.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;

pub use types::*;
