//! Public types for the tabula unified API.
//!
//! This module re-exports types from internal crates with a clean public interface.

// ============================================================================
// Public API types - these are what users should use
// ============================================================================

// Core record types
pub use tabula_core::Record;
pub use tabula_core::RecordId;
pub use tabula_core::{IdAllocator, IdMode};

// Error taxonomy
pub use tabula_core::{Result, StoreError};

// Store and construction
pub use tabula_store::{RecordStore, StoreBuilder};

// Queries and derived views
pub use tabula_store::view::{count_where, group_totals, grouped_by, sorted_by, sum_by};
pub use tabula_store::Query;

// Change subscriptions
pub use tabula_store::{ChangeEvent, Subscription};

// Seeded generation and deferred refresh
pub use tabula_store::{seeded_rng, DeferredRefresh};

// Persistence backends
pub use tabula_persist::{FileBackend, MemoryBackend, PersistError, SlotBackend};
pub use tabula_persist::{Snapshot, SNAPSHOT_FORMAT};
