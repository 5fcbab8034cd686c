//! Side-loaded playlist caches (liked songs, the playlist currently open)

use crate::error::{Result, SourceError};
use crate::provider::SourceProvider;
use crate::record::SourceRecord;
use async_trait::async_trait;
use niceplay_client::SongRecord;
use niceplay_core::PlaylistId;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Playlist header stored alongside the songs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistInfo {
    pub id: PlaylistId,
    pub name: String,
    pub description: Option<String>,
    pub track_count: usize,
}

#[derive(Debug)]
struct Loaded {
    info: PlaylistInfo,
    songs: Vec<SongRecord>,
}

/// A cache that pages fill after fetching a playlist themselves
///
/// Holds at most one playlist. Queries answer with whatever playlist was
/// loaded last; matching against the requested playlist id is the caller's
/// job (see `loaded_playlist_id`).
#[derive(Debug)]
pub struct PlaylistCache {
    name: String,
    loaded: Mutex<Option<Loaded>>,
}

impl PlaylistCache {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            loaded: Mutex::new(None),
        }
    }

    /// Replace the cached playlist
    pub fn set_playlist(&self, info: PlaylistInfo, songs: Vec<SongRecord>) {
        debug!(
            cache = %self.name,
            playlist_id = %info.id,
            songs = songs.len(),
            "Playlist loaded"
        );
        *self.lock() = Some(Loaded { info, songs });
    }

    /// Header of the cached playlist
    pub fn info(&self) -> Option<PlaylistInfo> {
        self.lock().as_ref().map(|loaded| loaded.info.clone())
    }

    /// Whether a playlist has been loaded since the last reset
    pub fn is_loaded(&self) -> bool {
        self.lock().is_some()
    }

    fn records(&self) -> Option<Vec<SourceRecord>> {
        self.lock()
            .as_ref()
            .map(|loaded| loaded.songs.iter().cloned().map(SourceRecord::from).collect())
    }

    fn lock(&self) -> MutexGuard<'_, Option<Loaded>> {
        self.loaded.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl SourceProvider for PlaylistCache {
    fn name(&self) -> &str {
        &self.name
    }

    /// Nothing to fetch: the cache is filled by `set_playlist`.
    async fn fetch_if_absent(&self) -> Result<Vec<SourceRecord>> {
        self.records()
            .ok_or_else(|| SourceError::NotLoaded(self.name.clone()))
    }

    fn cached(&self) -> Vec<SourceRecord> {
        self.records().unwrap_or_default()
    }

    fn reset(&self) {
        *self.lock() = None;
        debug!(cache = %self.name, "Playlist cache reset");
    }

    fn loaded_playlist_id(&self) -> Option<PlaylistId> {
        self.lock().as_ref().map(|loaded| loaded.info.id.clone())
    }
}
