//! Snapshot envelope
//!
//! The payload written to a slot is a self-describing JSON envelope:
//! a format version, a saved-at timestamp, and the record array. The
//! version gate lets a future format change fail closed — an unknown
//! version decodes as corrupt, which load paths treat as an absent slot.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tabula_core::{Result, StoreError};

/// Current snapshot format version.
pub const SNAPSHOT_FORMAT: u32 = 1;

/// Serialized form of a full collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot<T> {
    /// Envelope format version; must equal [`SNAPSHOT_FORMAT`].
    pub format: u32,
    /// When the snapshot was written.
    pub saved_at: DateTime<Utc>,
    /// The records, in collection order.
    pub records: Vec<T>,
}

impl<T: Serialize + DeserializeOwned> Snapshot<T> {
    /// Wrap a record sequence in a current-format envelope.
    pub fn new(records: Vec<T>) -> Self {
        Snapshot {
            format: SNAPSHOT_FORMAT,
            saved_at: Utc::now(),
            records,
        }
    }

    /// Encode to the JSON payload stored in a slot.
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self).map_err(StoreError::serialization)
    }

    /// Decode a slot payload.
    ///
    /// Any failure — malformed JSON, wrong shape, unknown format version —
    /// is reported as `PersistenceCorrupt` for the given slot.
    pub fn decode(slot: &str, payload: &str) -> Result<Self> {
        let snapshot: Snapshot<T> = serde_json::from_str(payload)
            .map_err(|e| StoreError::persistence_corrupt(slot, e.to_string()))?;
        if snapshot.format != SNAPSHOT_FORMAT {
            return Err(StoreError::persistence_corrupt(
                slot,
                format!("unsupported format version {}", snapshot.format),
            ));
        }
        Ok(snapshot)
    }
}
