//! Persistence layer for tabula
//!
//! Stores mirror their collection to a named *slot* in a key-value backend
//! after every mutation. This crate provides:
//! - `SlotBackend`: the backend trait (load / store / remove by key)
//! - `Snapshot`: the self-describing JSON envelope written to a slot
//! - `MemoryBackend`: in-process backend with an optional byte quota
//! - `FileBackend`: one JSON file per slot under a root directory
//!
//! Persistence is best-effort by contract: a failed write never blocks the
//! mutation that triggered it, and a corrupt payload on load is treated as
//! an absent slot.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod file;
pub mod memory;
pub mod slot;
pub mod snapshot;

// Re-exports
pub use file::FileBackend;
pub use memory::MemoryBackend;
pub use slot::{PersistError, SlotBackend};
pub use snapshot::{Snapshot, SNAPSHOT_FORMAT};
