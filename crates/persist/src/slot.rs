//! Slot backend trait
//!
//! A slot is a named location in a key-value persistence layer holding one
//! serialized collection. Backends only move opaque strings; envelope
//! encoding lives in `snapshot`.

use thiserror::Error;

/// Errors reported by slot backends.
#[derive(Debug, Error)]
pub enum PersistError {
    /// The backend is out of capacity for this payload.
    #[error("quota exceeded: payload of {payload_bytes} bytes over limit of {limit_bytes}")]
    QuotaExceeded {
        /// Size of the rejected payload.
        payload_bytes: usize,
        /// Configured capacity.
        limit_bytes: usize,
    },

    /// Underlying I/O failed.
    #[error("slot i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Key-value persistence backend holding serialized collections.
///
/// # Contract
///
/// - `load` returns `Ok(None)` for an absent key; it never invents data.
/// - `store` replaces the whole value for the key (no partial writes
///   observable by a later `load`).
/// - `remove` is idempotent and reports whether a value existed.
///
/// Implementations must be shareable across store handles, hence the
/// `Send + Sync` bound.
pub trait SlotBackend: Send + Sync {
    /// Read the payload stored under `key`, if any.
    fn load(&self, key: &str) -> Result<Option<String>, PersistError>;

    /// Write `payload` under `key`, replacing any previous value.
    fn store(&self, key: &str, payload: &str) -> Result<(), PersistError>;

    /// Delete the value under `key`. Returns whether one existed.
    fn remove(&self, key: &str) -> Result<bool, PersistError>;
}
