//! In-process slot backend
//!
//! Backs slots with a plain map behind a mutex. The optional byte quota
//! models the capacity rejection a browser-style key-value store produces
//! when full, which is the write-failure path stores must recover from.

use crate::slot::{PersistError, SlotBackend};
use parking_lot::Mutex;
use std::collections::HashMap;

/// In-memory slot backend.
///
/// # Example
///
/// ```
/// use tabula_persist::{MemoryBackend, SlotBackend};
///
/// let backend = MemoryBackend::new();
/// backend.store("tasks", "{}").unwrap();
/// assert_eq!(backend.load("tasks").unwrap().as_deref(), Some("{}"));
/// ```
#[derive(Debug, Default)]
pub struct MemoryBackend {
    slots: Mutex<HashMap<String, String>>,
    /// Max total payload bytes across all slots; None = unbounded.
    quota_bytes: Option<usize>,
}

impl MemoryBackend {
    /// Create an unbounded backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend that rejects writes once total stored bytes would
    /// exceed `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Number of populated slots.
    pub fn slot_count(&self) -> usize {
        self.slots.lock().len()
    }
}

impl SlotBackend for MemoryBackend {
    fn load(&self, key: &str) -> Result<Option<String>, PersistError> {
        Ok(self.slots.lock().get(key).cloned())
    }

    fn store(&self, key: &str, payload: &str) -> Result<(), PersistError> {
        let mut slots = self.slots.lock();
        if let Some(limit) = self.quota_bytes {
            // Quota counts the post-write total, excluding the old value
            // for this key since it is being replaced.
            let others: usize = slots
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len())
                .sum();
            if others + payload.len() > limit {
                return Err(PersistError::QuotaExceeded {
                    payload_bytes: payload.len(),
                    limit_bytes: limit,
                });
            }
        }
        slots.insert(key.to_string(), payload.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, PersistError> {
        Ok(self.slots.lock().remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_absent_key() {
        let backend = MemoryBackend::new();
        assert!(backend.load("missing").unwrap().is_none());
    }

    #[test]
    fn test_store_and_load() {
        let backend = MemoryBackend::new();
        backend.store("k", "v1").unwrap();
        backend.store("k", "v2").unwrap();
        assert_eq!(backend.load("k").unwrap().as_deref(), Some("v2"));
        assert_eq!(backend.slot_count(), 1);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let backend = MemoryBackend::new();
        backend.store("k", "v").unwrap();
        assert!(backend.remove("k").unwrap());
        assert!(!backend.remove("k").unwrap());
        assert!(backend.load("k").unwrap().is_none());
    }

    #[test]
    fn test_quota_rejects_oversized_write() {
        let backend = MemoryBackend::with_quota(10);
        let err = backend.store("k", "0123456789ab").unwrap_err();
        assert!(matches!(err, PersistError::QuotaExceeded { .. }));
        // Nothing was stored
        assert!(backend.load("k").unwrap().is_none());
    }

    #[test]
    fn test_quota_allows_replacing_own_slot() {
        let backend = MemoryBackend::with_quota(10);
        backend.store("k", "0123456789").unwrap();
        // Replacement does not double-count the old value.
        backend.store("k", "abcdefghij").unwrap();
        assert_eq!(backend.load("k").unwrap().as_deref(), Some("abcdefghij"));
    }

    #[test]
    fn test_quota_counts_across_slots() {
        let backend = MemoryBackend::with_quota(10);
        backend.store("a", "01234").unwrap();
        assert!(backend.store("b", "0123456").is_err());
        backend.store("b", "01234").unwrap();
    }
}
