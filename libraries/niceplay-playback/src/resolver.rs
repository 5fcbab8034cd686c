//! Queue resolution: from a playback context to an ordered, de-duplicated queue

use crate::error::{PlaybackError, Result};
use niceplay_client::{BannerRecord, SongRecord};
use niceplay_core::{PlaybackContext, PlaylistId, TrackDescriptor, TrackId};
use niceplay_sources::{PlaylistCache, SourceProvider, SourceRecord, SourceRegistry};
use std::collections::HashSet;
use tracing::debug;

/// A queue with the position of the requested track
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedQueue {
    pub tracks: Vec<TrackDescriptor>,
    pub position: usize,
}

impl ResolvedQueue {
    /// De-duplicate `tracks` and locate `track_id` in the result
    pub fn from_tracks(
        tracks: Vec<TrackDescriptor>,
        track_id: &TrackId,
        context: &PlaybackContext,
    ) -> Result<Self> {
        let tracks = dedup_tracks(tracks);
        let position = locate(&tracks, track_id).ok_or_else(|| PlaybackError::TrackNotFound {
            track_id: track_id.clone(),
            context: context.clone(),
        })?;

        Ok(Self { tracks, position })
    }

    /// The requested track
    pub fn current(&self) -> &TrackDescriptor {
        &self.tracks[self.position]
    }
}

/// Map a source record onto a queue entry
pub fn normalize(record: &SourceRecord) -> TrackDescriptor {
    match record {
        SourceRecord::Banner(banner) => normalize_banner(banner),
        SourceRecord::Song(song) => normalize_song(song),
    }
}

fn normalize_banner(banner: &BannerRecord) -> TrackDescriptor {
    let mut track =
        TrackDescriptor::from_combined_label(banner.song_id.clone(), &banner.combined_label());
    track.artwork_url = banner.cover_url.clone();
    track.audio_url = banner.file_path.clone();
    track.lyrics_url = banner.lrc.clone();
    track
}

fn normalize_song(song: &SongRecord) -> TrackDescriptor {
    TrackDescriptor {
        track_id: song.id.clone(),
        title: song.title.clone(),
        artist: song.artist.clone(),
        artwork_url: song.cover_path.clone(),
        audio_url: song.file_path.clone(),
        lyrics_url: song.lrc_path.clone().or_else(|| song.banner_lrc.clone()),
        duration: song.duration(),
    }
}

/// Drop repeated track ids, keeping the first occurrence in place
pub fn dedup_tracks(tracks: Vec<TrackDescriptor>) -> Vec<TrackDescriptor> {
    let mut seen = HashSet::with_capacity(tracks.len());
    tracks
        .into_iter()
        .filter(|track| seen.insert(track.track_id.clone()))
        .collect()
}

/// Index of `track_id` in `queue`
pub fn locate(queue: &[TrackDescriptor], track_id: &TrackId) -> Option<usize> {
    queue.iter().position(|track| &track.track_id == track_id)
}

/// Resolves play requests against the source caches
#[derive(Debug, Clone)]
pub struct QueueResolver {
    sources: SourceRegistry,
}

impl QueueResolver {
    pub fn new(sources: SourceRegistry) -> Self {
        Self { sources }
    }

    pub fn sources(&self) -> &SourceRegistry {
        &self.sources
    }

    /// Build the queue for `context`
    ///
    /// Backend-backed contexts are fetched if their cache is empty. Liked
    /// songs and user playlists only resolve when the side-loaded cache holds
    /// the requested playlist.
    pub async fn resolve_queue(&self, context: &PlaybackContext) -> Result<Vec<TrackDescriptor>> {
        let records = match context {
            PlaybackContext::Banner => self.fetch(self.sources.banner().as_ref(), context).await?,
            PlaybackContext::Chart => self.fetch(self.sources.chart().as_ref(), context).await?,
            PlaybackContext::Recommendation => {
                self.fetch(self.sources.recommendation().as_ref(), context)
                    .await?
            }
            PlaybackContext::LikedSongs(id) => {
                self.side_loaded(self.sources.liked_songs(), id, context, false)
                    .await?
            }
            PlaybackContext::UserPlaylist(id) => {
                self.side_loaded(self.sources.current_playlist(), id, context, true)
                    .await?
            }
        };

        let tracks = dedup_tracks(records.iter().map(normalize).collect());
        debug!(context = %context, tracks = tracks.len(), "Queue resolved");
        Ok(tracks)
    }

    /// Build the queue for `context` and locate `track_id` in it
    pub async fn resolve(
        &self,
        context: &PlaybackContext,
        track_id: &TrackId,
    ) -> Result<ResolvedQueue> {
        let tracks = self.resolve_queue(context).await?;
        ResolvedQueue::from_tracks(tracks, track_id, context)
    }

    async fn fetch(
        &self,
        provider: &dyn SourceProvider,
        context: &PlaybackContext,
    ) -> Result<Vec<SourceRecord>> {
        provider
            .fetch_if_absent()
            .await
            .map_err(|source| PlaybackError::ProviderFetch {
                context: context.clone(),
                source,
            })
    }

    async fn side_loaded(
        &self,
        cache: &PlaylistCache,
        id: &PlaylistId,
        context: &PlaybackContext,
        require_items: bool,
    ) -> Result<Vec<SourceRecord>> {
        let loaded = cache.loaded_playlist_id();
        let mismatch = || PlaybackError::ContextMismatch {
            context: context.clone(),
            loaded: loaded.clone(),
        };

        if loaded.as_ref() != Some(id) {
            return Err(mismatch());
        }

        let records = self.fetch(cache, context).await?;
        if require_items && records.is_empty() {
            return Err(mismatch());
        }
        Ok(records)
    }
}
