//! Shared playback state: a read-only, observable mirror of the session

use crate::types::{PlaybackSession, PlaybackSnapshot};
use niceplay_core::TrackDescriptor;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tracing::trace;

type Listener = Arc<dyn Fn(&PlaybackSnapshot) + Send + Sync>;

struct StoreState {
    snapshot: PlaybackSnapshot,
    listeners: Vec<(u64, Listener)>,
    next_listener_id: u64,
}

struct StoreInner {
    state: Mutex<StoreState>,
    /// Held while listeners run so deliveries never interleave
    delivery: Mutex<()>,
}

/// Publish/subscribe mirror of the playback session
///
/// Surfaces read and subscribe; only the controller publishes. Cloning gives
/// another handle to the same store.
#[derive(Clone)]
pub struct PlaybackStateStore {
    inner: Arc<StoreInner>,
}

impl PlaybackStateStore {
    pub(crate) fn new() -> Self {
        Self {
            inner: Arc::new(StoreInner {
                state: Mutex::new(StoreState {
                    snapshot: PlaybackSnapshot::default(),
                    listeners: Vec::new(),
                    next_listener_id: 0,
                }),
                delivery: Mutex::new(()),
            }),
        }
    }

    /// Latest published snapshot
    pub fn read(&self) -> PlaybackSnapshot {
        self.inner.lock_state().snapshot.clone()
    }

    /// Call `listener` with every snapshot published from now on
    ///
    /// Listeners run synchronously on the publishing task, in publish order.
    /// They may read the store but must not wait on the controller.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&PlaybackSnapshot) + Send + Sync + 'static,
    {
        let mut state = self.inner.lock_state();
        let id = state.next_listener_id;
        state.next_listener_id += 1;
        state.listeners.push((id, Arc::new(listener)));

        Subscription {
            id,
            store: Arc::downgrade(&self.inner),
        }
    }

    /// The `n` tracks that follow the current one
    pub fn derive_upcoming(&self, n: usize) -> Vec<TrackDescriptor> {
        let state = self.inner.lock_state();
        upcoming(
            &state.snapshot.queue,
            state.snapshot.current_track.as_ref(),
            n,
        )
    }

    /// Mirror `session` and notify listeners
    pub(crate) fn publish(&self, session: &PlaybackSession) -> PlaybackSnapshot {
        let _delivery = self
            .inner
            .delivery
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let (snapshot, listeners) = {
            let mut state = self.inner.lock_state();
            let sequence = state.snapshot.sequence + 1;
            state.snapshot = PlaybackSnapshot::from_session(session, sequence);
            let listeners: Vec<Listener> =
                state.listeners.iter().map(|(_, l)| Arc::clone(l)).collect();
            (state.snapshot.clone(), listeners)
        };

        trace!(
            sequence = snapshot.sequence,
            listeners = listeners.len(),
            "Publishing playback snapshot"
        );
        for listener in &listeners {
            listener(&snapshot);
        }
        snapshot
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lock_state().listeners.len()
    }
}

impl StoreInner {
    fn lock_state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn remove(&self, id: u64) {
        self.lock_state().listeners.retain(|(listener_id, _)| *listener_id != id);
    }
}

impl std::fmt::Debug for PlaybackStateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.lock_state();
        f.debug_struct("PlaybackStateStore")
            .field("sequence", &state.snapshot.sequence)
            .field("listeners", &state.listeners.len())
            .finish()
    }
}

/// Handle returned by `subscribe`; dropping it detaches the listener
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    store: Weak<StoreInner>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(store) = self.store.upgrade() {
            store.remove(self.id);
        }
    }
}

/// Tracks after `current` in `queue`, wrapping, without the current track
///
/// A single-track queue repeats that track `n` times. When `current` is not
/// part of the queue, the first `n` tracks are returned.
pub fn upcoming(
    queue: &[TrackDescriptor],
    current: Option<&TrackDescriptor>,
    n: usize,
) -> Vec<TrackDescriptor> {
    let Some(current) = current else {
        return Vec::new();
    };

    match queue.len() {
        0 => Vec::new(),
        1 => vec![queue[0].clone(); n],
        len => match queue.iter().position(|t| t.track_id == current.track_id) {
            Some(index) => (1..len)
                .map(|offset| queue[(index + offset) % len].clone())
                .take(n)
                .collect(),
            None => queue.iter().take(n).cloned().collect(),
        },
    }
}
