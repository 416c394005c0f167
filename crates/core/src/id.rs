//! Record identifiers and allocation
//!
//! This module defines:
//! - RecordId: integer or string identifier, ordered and hashable
//! - IdMode: sequential integers or random v4 uuids
//! - IdAllocator: issues ids that are never repeated within one store
//!
//! # Design
//!
//! Sequential mode keeps a monotonic counter. Explicit integer ids arriving
//! via insert or snapshot load are *observed*: the counter advances past
//! them, so a later allocation can never collide with or reuse an id the
//! store has already seen. Uuid mode sidesteps the question entirely with
//! 122 bits of randomness.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique record identifier.
///
/// Collections accept either integer or string ids; a single collection may
/// mix both (e.g. seeded integer ids plus uuid ids assigned later).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    /// Integer identifier, allocated sequentially.
    Int(u64),
    /// String identifier, typically a uuid or caller-chosen key.
    Str(String),
}

impl RecordId {
    /// The integer value, if this is an integer id.
    pub fn as_int(&self) -> Option<u64> {
        match self {
            RecordId::Int(n) => Some(*n),
            RecordId::Str(_) => None,
        }
    }

    /// The string value, if this is a string id.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            RecordId::Int(_) => None,
            RecordId::Str(s) => Some(s),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(n) => write!(f, "{}", n),
            RecordId::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<u64> for RecordId {
    fn from(n: u64) -> Self {
        RecordId::Int(n)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId::Str(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        RecordId::Str(s)
    }
}

/// Id issuance strategy for a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdMode {
    /// Monotonically increasing integers starting at 1.
    #[default]
    Sequential,
    /// Random v4 uuid strings.
    Uuid,
}

/// Issues record ids, never repeating one within the allocator's lifetime.
///
/// # Thread Safety
///
/// Allocation and observation use an atomic counter; the allocator can be
/// shared behind an `Arc` without extra locking.
#[derive(Debug)]
pub struct IdAllocator {
    mode: IdMode,
    /// Next sequential id to hand out.
    next: AtomicU64,
}

impl IdAllocator {
    /// Create an allocator with the given mode.
    pub fn new(mode: IdMode) -> Self {
        Self {
            mode,
            next: AtomicU64::new(1),
        }
    }

    /// The allocation mode.
    pub fn mode(&self) -> IdMode {
        self.mode
    }

    /// Allocate a fresh id.
    pub fn allocate(&self) -> RecordId {
        match self.mode {
            IdMode::Sequential => RecordId::Int(self.next.fetch_add(1, Ordering::AcqRel)),
            IdMode::Uuid => RecordId::Str(uuid::Uuid::new_v4().to_string()),
        }
    }

    /// Observe an explicit id so it is never reissued.
    ///
    /// Called for every id that enters the collection from outside the
    /// allocator (caller-supplied inserts, snapshot loads, replace_all).
    /// String ids need no bookkeeping in sequential mode.
    pub fn observe(&self, id: &RecordId) {
        if let RecordId::Int(n) = id {
            // Advance `next` past n; retry if another thread won the race.
            let mut current = self.next.load(Ordering::Acquire);
            while current <= *n {
                match self.next.compare_exchange_weak(
                    current,
                    n + 1,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                ) {
                    Ok(_) => break,
                    Err(actual) => current = actual,
                }
            }
        }
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new(IdMode::Sequential)
    }
}
