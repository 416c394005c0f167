//! Error taxonomy for store operations
//!
//! Expected conditions (a missing id, an empty collection) are never panics:
//! they surface as `NotFound` or as `Option`/`bool` results on the calling
//! API. Persistence failures are recoverable by design — the in-memory
//! collection stays authoritative.

use crate::id::RecordId;
use thiserror::Error;

/// Result alias used across the tabula crates.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors surfaced by store and persistence operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An id-keyed operation found no matching record.
    ///
    /// Recoverable: the collection is unchanged.
    #[error("no record with id {id}")]
    NotFound {
        /// The id that matched nothing.
        id: RecordId,
    },

    /// The backing slot rejected a write (capacity, I/O).
    ///
    /// Recovered locally: the in-memory collection is not rolled back.
    #[error("persistence write failed for slot '{slot}': {reason}")]
    PersistenceWrite {
        /// Slot key the write targeted.
        slot: String,
        /// Backend-reported reason.
        reason: String,
    },

    /// Stored slot data could not be parsed.
    ///
    /// Recovered by falling back to seed/empty data at load time.
    #[error("persisted data in slot '{slot}' is corrupt: {reason}")]
    PersistenceCorrupt {
        /// Slot key that held the corrupt payload.
        slot: String,
        /// Decode failure detail.
        reason: String,
    },

    /// A record could not be serialized or deserialized.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A patch payload was not a JSON object.
    #[error("invalid patch: {0}")]
    InvalidPatch(String),
}

impl StoreError {
    /// Build a `NotFound` error for the given id.
    pub fn not_found(id: impl Into<RecordId>) -> Self {
        StoreError::NotFound { id: id.into() }
    }

    /// Build a `PersistenceWrite` error.
    pub fn persistence_write(slot: impl Into<String>, reason: impl Into<String>) -> Self {
        StoreError::PersistenceWrite {
            slot: slot.into(),
            reason: reason.into(),
        }
    }

    /// Build a `PersistenceCorrupt` error.
    pub fn persistence_corrupt(slot: impl Into<String>, reason: impl Into<String>) -> Self {
        StoreError::PersistenceCorrupt {
            slot: slot.into(),
            reason: reason.into(),
        }
    }

    /// Build a `Serialization` error from any display-able source.
    pub fn serialization(reason: impl ToString) -> Self {
        StoreError::Serialization(reason.to_string())
    }

    /// True when this error is the recoverable `NotFound` case.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}
