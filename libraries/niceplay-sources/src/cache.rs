//! Fetch-once cache with in-flight de-duplication

use crate::error::Result;
use crate::fetcher::RecordFetcher;
use crate::provider::SourceProvider;
use crate::record::SourceRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::future::{BoxFuture, FutureExt, Shared};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error};

type SharedFetch = Shared<BoxFuture<'static, Result<Arc<Vec<SourceRecord>>>>>;

/// Load state of a cache, for diagnostics
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing fetched yet (or reset since)
    Empty,
    /// A fetch is in flight
    Loading,
    /// Data is cached (possibly an empty collection)
    Loaded,
    /// The last fetch failed; the next call retries
    Failed(String),
}

struct InFlight {
    id: u64,
    fetch: SharedFetch,
}

struct CacheState {
    items: Arc<Vec<SourceRecord>>,
    load_state: LoadState,
    in_flight: Option<InFlight>,
    last_fetched: Option<DateTime<Utc>>,
    next_fetch_id: u64,
}

/// Backend-backed source with a fetch-once, cache, reset-on-logout lifecycle
///
/// A successful fetch is cached even when it returned no records, so an empty
/// chart does not trigger a request on every play. Failures are not cached.
pub struct CachedSource {
    name: String,
    fetcher: Arc<dyn RecordFetcher>,
    state: Mutex<CacheState>,
}

impl CachedSource {
    pub fn new(name: impl Into<String>, fetcher: Arc<dyn RecordFetcher>) -> Self {
        Self {
            name: name.into(),
            fetcher,
            state: Mutex::new(CacheState {
                items: Arc::new(Vec::new()),
                load_state: LoadState::Empty,
                in_flight: None,
                last_fetched: None,
                next_fetch_id: 0,
            }),
        }
    }

    /// Current load state
    pub fn load_state(&self) -> LoadState {
        self.lock().load_state.clone()
    }

    /// When the cached data was fetched
    pub fn last_fetched(&self) -> Option<DateTime<Utc>> {
        self.lock().last_fetched
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Join the in-flight fetch or start a new one
    fn begin_fetch(&self) -> std::result::Result<Vec<SourceRecord>, (u64, SharedFetch)> {
        let mut state = self.lock();

        if state.load_state == LoadState::Loaded {
            return Ok(state.items.as_ref().clone());
        }

        if let Some(in_flight) = &state.in_flight {
            debug!(provider = %self.name, "Joining in-flight fetch");
            return Err((in_flight.id, in_flight.fetch.clone()));
        }

        let id = state.next_fetch_id;
        state.next_fetch_id += 1;

        let fetcher = Arc::clone(&self.fetcher);
        let fetch = async move { fetcher.fetch().await.map(Arc::new) }
            .boxed()
            .shared();

        debug!(provider = %self.name, fetch_id = id, "Starting fetch");
        state.in_flight = Some(InFlight {
            id,
            fetch: fetch.clone(),
        });
        state.load_state = LoadState::Loading;

        Err((id, fetch))
    }

    /// Record a finished fetch, unless a reset or a newer fetch superseded it
    fn finish_fetch(&self, id: u64, result: &Result<Arc<Vec<SourceRecord>>>) {
        let mut state = self.lock();

        let current = state.in_flight.as_ref().map(|f| f.id);
        if current != Some(id) {
            return;
        }
        state.in_flight = None;

        match result {
            Ok(items) => {
                debug!(provider = %self.name, count = items.len(), "Fetch complete");
                state.items = Arc::clone(items);
                state.load_state = LoadState::Loaded;
                state.last_fetched = Some(Utc::now());
            }
            Err(e) => {
                error!(provider = %self.name, error = %e, "Fetch failed");
                state.load_state = LoadState::Failed(e.to_string());
            }
        }
    }
}

#[async_trait]
impl SourceProvider for CachedSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_if_absent(&self) -> Result<Vec<SourceRecord>> {
        let (id, fetch) = match self.begin_fetch() {
            Ok(cached) => return Ok(cached),
            Err(pending) => pending,
        };

        let result = fetch.await;
        self.finish_fetch(id, &result);

        result.map(|items| items.as_ref().clone())
    }

    fn cached(&self) -> Vec<SourceRecord> {
        self.lock().items.as_ref().clone()
    }

    fn reset(&self) {
        let mut state = self.lock();
        state.items = Arc::new(Vec::new());
        state.load_state = LoadState::Empty;
        state.in_flight = None;
        state.last_fetched = None;
        debug!(provider = %self.name, "Cache reset");
    }
}

impl std::fmt::Debug for CachedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedSource")
            .field("name", &self.name)
            .field("load_state", &self.load_state())
            .finish_non_exhaustive()
    }
}
