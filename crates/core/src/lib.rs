//! Core layer for tabula
//!
//! This crate defines the building blocks shared by every store:
//! - RecordId: unique record identifier (integer or string)
//! - IdAllocator: id issuance that never repeats within a store's lifetime
//! - Record: trait any storable type implements
//! - StoreError: error taxonomy for store and persistence operations
//!
//! Everything here is plain data plus small helpers; the store itself lives
//! in `tabula-store`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod id;
pub mod record;

// Re-exports
pub use error::{Result, StoreError};
pub use id::{IdAllocator, IdMode, RecordId};
pub use record::Record;
