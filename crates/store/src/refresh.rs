//! Deferred collection refresh
//!
//! Models the "simulate async refresh" pattern: schedule a callback that
//! fires once after a fixed delay and applies a normal mutation to the
//! store. The schedule returns an owned guard; dropping it before the
//! deadline cancels the pending callback, so a disposed store is never
//! mutated by a stray timer.

use crate::store::RecordStore;
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tabula_core::Record;

#[derive(Default)]
struct CancelSignal {
    cancelled: Mutex<bool>,
    condvar: Condvar,
}

/// Owned handle for a pending one-shot refresh.
///
/// The refresh fires at most once. Cancellation — explicit or via drop —
/// is guaranteed: after `cancel()` (or drop) returns, the callback either
/// already ran to completion or never will.
pub struct DeferredRefresh {
    signal: Arc<CancelSignal>,
    handle: Option<JoinHandle<()>>,
}

impl DeferredRefresh {
    /// Schedule `apply` to run against `store` after `delay`.
    ///
    /// The callback receives a store handle and performs ordinary
    /// mutations (typically `replace_all`); it runs on a timer thread,
    /// which is safe because store handles are Send + Sync.
    pub fn schedule<T, F>(store: &RecordStore<T>, delay: Duration, apply: F) -> Self
    where
        T: Record,
        F: FnOnce(&RecordStore<T>) + Send + 'static,
    {
        let store = store.clone();
        let signal = Arc::new(CancelSignal::default());
        let thread_signal = Arc::clone(&signal);

        let handle = thread::spawn(move || {
            let deadline = Instant::now() + delay;
            let mut cancelled = thread_signal.cancelled.lock();
            while !*cancelled {
                if thread_signal
                    .condvar
                    .wait_until(&mut cancelled, deadline)
                    .timed_out()
                {
                    break;
                }
            }
            if *cancelled {
                return;
            }
            drop(cancelled);
            apply(&store);
        });

        Self {
            signal,
            handle: Some(handle),
        }
    }

    /// Cancel the pending refresh and wait for the timer thread to exit.
    ///
    /// No-op if the refresh already fired.
    pub fn cancel(&mut self) {
        {
            let mut cancelled = self.signal.cancelled.lock();
            *cancelled = true;
        }
        self.signal.condvar.notify_all();
        if let Some(handle) = self.handle.take() {
            // The thread is either parked on the condvar or already done;
            // join cannot block for the full delay.
            let _ = handle.join();
        }
    }
}

impl Drop for DeferredRefresh {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreBuilder;
    use serde::{Deserialize, Serialize};
    use tabula_core::RecordId;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: Option<RecordId>,
        text: String,
    }

    impl Record for Note {
        fn record_id(&self) -> Option<RecordId> {
            self.id.clone()
        }

        fn assign_id(&mut self, id: RecordId) {
            self.id = Some(id);
        }
    }

    fn note(text: &str) -> Note {
        Note {
            id: None,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_refresh_fires_after_delay() {
        let store: RecordStore<Note> = StoreBuilder::new().build();
        store.insert(note("stale"));

        let refresh = DeferredRefresh::schedule(&store, Duration::from_millis(20), |s| {
            s.replace_all(vec![note("fresh")]);
        });

        thread::sleep(Duration::from_millis(200));
        let texts: Vec<String> = store.list().into_iter().map(|n| n.text).collect();
        assert_eq!(texts, vec!["fresh"]);
        drop(refresh);
    }

    #[test]
    fn test_cancel_before_deadline_prevents_mutation() {
        let store: RecordStore<Note> = StoreBuilder::new().build();
        store.insert(note("kept"));

        let mut refresh = DeferredRefresh::schedule(&store, Duration::from_secs(60), |s| {
            s.replace_all(vec![]);
        });
        refresh.cancel();

        // After cancel returns the callback can never run.
        thread::sleep(Duration::from_millis(30));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_drop_cancels_pending_refresh() {
        let store: RecordStore<Note> = StoreBuilder::new().build();
        store.insert(note("kept"));

        {
            let _refresh = DeferredRefresh::schedule(&store, Duration::from_secs(60), |s| {
                s.replace_all(vec![]);
            });
        }

        thread::sleep(Duration::from_millis(30));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_cancel_after_fire_is_noop() {
        let store: RecordStore<Note> = StoreBuilder::new().build();

        let mut refresh = DeferredRefresh::schedule(&store, Duration::from_millis(10), |s| {
            s.insert(note("fired"));
        });
        thread::sleep(Duration::from_millis(150));
        refresh.cancel();

        assert_eq!(store.len(), 1);
    }
}
