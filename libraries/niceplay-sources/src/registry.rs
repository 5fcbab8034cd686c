//! The set of source caches owned by one application lifetime

use crate::cache::CachedSource;
use crate::fetcher::{BannerFetcher, PlaylistFetcher};
use crate::playlist_cache::PlaylistCache;
use crate::provider::SourceProvider;
use niceplay_client::NicePlayClient;
use niceplay_core::PlaylistId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Which backend playlists back the fixed home-page contexts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Playlist holding the ranking chart (default: "2")
    pub chart_playlist_id: PlaylistId,

    /// Playlist holding today's recommendations (default: "1")
    pub recommendation_playlist_id: PlaylistId,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            chart_playlist_id: PlaylistId::new("2"),
            recommendation_playlist_id: PlaylistId::new("1"),
        }
    }
}

/// One provider per playback context
///
/// Constructed once at startup and shared; `reset_all` is the logout teardown.
#[derive(Clone)]
pub struct SourceRegistry {
    banner: Arc<dyn SourceProvider>,
    chart: Arc<dyn SourceProvider>,
    recommendation: Arc<dyn SourceProvider>,
    liked_songs: Arc<PlaylistCache>,
    current_playlist: Arc<PlaylistCache>,
}

impl SourceRegistry {
    /// Assemble a registry from arbitrary providers (tests, alternative backends)
    pub fn new(
        banner: Arc<dyn SourceProvider>,
        chart: Arc<dyn SourceProvider>,
        recommendation: Arc<dyn SourceProvider>,
    ) -> Self {
        Self {
            banner,
            chart,
            recommendation,
            liked_songs: Arc::new(PlaylistCache::new("liked_songs")),
            current_playlist: Arc::new(PlaylistCache::new("current_playlist")),
        }
    }

    /// Registry whose caches fetch from the NicePlay backend
    pub fn from_client(client: NicePlayClient, config: &SourcesConfig) -> Self {
        let banner = CachedSource::new("banner", Arc::new(BannerFetcher::new(client.clone())));
        let chart = CachedSource::new(
            "chart",
            Arc::new(PlaylistFetcher::new(
                client.clone(),
                "chart",
                config.chart_playlist_id.clone(),
            )),
        );
        let recommendation = CachedSource::new(
            "recommendation",
            Arc::new(PlaylistFetcher::new(
                client,
                "recommendation",
                config.recommendation_playlist_id.clone(),
            )),
        );

        Self::new(Arc::new(banner), Arc::new(chart), Arc::new(recommendation))
    }

    pub fn banner(&self) -> &Arc<dyn SourceProvider> {
        &self.banner
    }

    pub fn chart(&self) -> &Arc<dyn SourceProvider> {
        &self.chart
    }

    pub fn recommendation(&self) -> &Arc<dyn SourceProvider> {
        &self.recommendation
    }

    pub fn liked_songs(&self) -> &Arc<PlaylistCache> {
        &self.liked_songs
    }

    pub fn current_playlist(&self) -> &Arc<PlaylistCache> {
        &self.current_playlist
    }

    /// Forget every cached collection (logout)
    pub fn reset_all(&self) {
        self.banner.reset();
        self.chart.reset();
        self.recommendation.reset();
        self.liked_songs.reset();
        self.current_playlist.reset();
        info!("All track sources reset");
    }
}

impl std::fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceRegistry")
            .field("banner", &self.banner.name())
            .field("chart", &self.chart.name())
            .field("recommendation", &self.recommendation.name())
            .field("liked_songs", &self.liked_songs.loaded_playlist_id())
            .field("current_playlist", &self.current_playlist.loaded_playlist_id())
            .finish()
    }
}
