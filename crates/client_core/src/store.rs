use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use shared::domain::Course;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::backend::CourseBackend;

/// Lifecycle of the cached course collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionStatus {
    Idle,
    Loading,
    Loaded,
    Error,
}

/// Snapshot of the authoritative course list. `data` is only ever replaced
/// wholesale by a successful reload; a failed reload keeps the last good
/// list and records the error.
#[derive(Debug, Clone)]
pub struct CourseCollectionState {
    pub data: Vec<Course>,
    pub status: CollectionStatus,
    pub error: Option<String>,
}

impl CourseCollectionState {
    fn initial() -> Self {
        Self {
            data: Vec::new(),
            status: CollectionStatus::Idle,
            error: None,
        }
    }
}

/// Single source of truth for the course list. There are no add/remove entry
/// points: every mutation goes through a backend call followed by
/// [`CourseStore::reload`], so the cache never drifts from backend truth by
/// more than one round trip.
pub struct CourseStore {
    backend: Arc<dyn CourseBackend>,
    state_tx: watch::Sender<CourseCollectionState>,
    reload_seq: AtomicU64,
}

impl CourseStore {
    pub fn new(backend: Arc<dyn CourseBackend>) -> Arc<Self> {
        let (state_tx, _) = watch::channel(CourseCollectionState::initial());
        Arc::new(Self {
            backend,
            state_tx,
            reload_seq: AtomicU64::new(0),
        })
    }

    /// Live snapshot stream. A new subscriber reads the latest committed
    /// state immediately and is woken on every subsequent change.
    pub fn observe(&self) -> watch::Receiver<CourseCollectionState> {
        self.state_tx.subscribe()
    }

    /// Clone of the current state.
    pub fn snapshot(&self) -> CourseCollectionState {
        self.state_tx.borrow().clone()
    }

    /// Re-fetch the full collection from the backend. Overlapping calls are
    /// coalesced: only the most recently started reload may commit, stale
    /// responses are dropped. List failures land in the state as `Error`;
    /// they are never returned to the caller, and a later reload recovers.
    pub async fn reload(&self) {
        let seq = self.reload_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.state_tx.send_modify(|state| {
            state.status = CollectionStatus::Loading;
            state.error = None;
        });

        match self.backend.list().await {
            Ok(data) => {
                if self.reload_seq.load(Ordering::SeqCst) != seq {
                    debug!(seq, "discarding stale course reload response");
                    return;
                }
                debug!(courses = data.len(), "course reload committed");
                self.state_tx.send_modify(|state| {
                    state.data = data;
                    state.status = CollectionStatus::Loaded;
                    state.error = None;
                });
            }
            Err(err) => {
                if self.reload_seq.load(Ordering::SeqCst) != seq {
                    debug!(seq, "discarding stale course reload failure");
                    return;
                }
                warn!(error = %err, "course reload failed; keeping last good list");
                self.state_tx.send_modify(|state| {
                    state.status = CollectionStatus::Error;
                    state.error = Some(err.to_string());
                });
            }
        }
    }

    /// Fire-and-forget [`CourseStore::reload`] for callers that cannot await.
    pub fn dispatch_reload(self: &Arc<Self>) {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            store.reload().await;
        });
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
