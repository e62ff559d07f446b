use std::sync::{Arc, PoisonError, RwLock};

use tracing::info;

use crate::dataset::Snapshot;
use crate::model::event::Event;

/// Holds the currently published snapshot.
///
/// Readers clone the `Arc` and work on that snapshot without holding the lock, so a
/// lookup sees either the whole old dataset or the whole new one. The lock is only
/// taken for the pointer copy or the pointer swap.
#[derive(Debug, Clone, Default)]
pub struct EventStore {
    current: Arc<RwLock<Arc<Snapshot>>>,
}

impl EventStore {
    /// Empty store; every lookup misses until the first publish.
    pub fn new() -> Self {
        Self::default()
    }

    /// The snapshot published at the time of the call.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        // The guarded value is a plain Arc, so a poisoned lock still holds a valid snapshot.
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    /// Look up one event in the current snapshot.
    pub fn find(&self, event_id: &str) -> Option<Event> {
        self.snapshot().get(event_id).cloned()
    }

    /// Replace the published snapshot, returning the one it superseded.
    pub fn publish(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let next = Arc::new(snapshot);
        let events = next.len();
        let previous = {
            let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *guard, next)
        };
        info!(events, previous_events = previous.len(), "Published events snapshot");
        previous
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }
}
