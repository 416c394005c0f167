//! Store layer for tabula
//!
//! This crate implements the generic collection store and its surroundings:
//! - RecordStore: ordered in-memory collection with CRUD and slot mirroring
//! - StoreBuilder: construction (persistence, seeding, id mode)
//! - Query: AND-composition of filter predicates
//! - view: pure derived reads (sort, group, aggregate)
//! - observe: explicit change subscriptions
//! - seed: deterministic seeded data generation
//! - refresh: deferred collection refresh with cancel-on-drop
//!
//! Stores are Clone + Send + Sync facades over shared state; cloning a
//! handle is cheap and every clone sees the same collection.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod observe;
pub mod query;
pub mod refresh;
pub mod seed;
pub mod store;
pub mod view;

// Re-exports
pub use observe::{ChangeEvent, Subscription};
pub use query::Query;
pub use refresh::DeferredRefresh;
pub use seed::seeded_rng;
pub use store::{RecordStore, StoreBuilder};
