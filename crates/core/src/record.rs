//! Record trait for storable types

use crate::id::RecordId;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Core trait any storable record must implement.
///
/// A record carries its own id. Before the first insert the id may be
/// absent; the store assigns one on insert and it is immutable afterwards
/// (update/patch paths never change it).
///
/// The serde bounds exist because stores mirror full collections to a
/// persisted slot as JSON; the remaining bounds let store handles be shared
/// across threads.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// The record's id, if one has been assigned.
    fn record_id(&self) -> Option<RecordId>;

    /// Set the record's id. Called by the store exactly once per record.
    fn assign_id(&mut self, id: RecordId);
}
