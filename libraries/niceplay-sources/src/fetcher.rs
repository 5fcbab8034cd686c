//! Backend fetchers feeding `CachedSource`

use crate::error::{Result, SourceError};
use crate::record::SourceRecord;
use async_trait::async_trait;
use niceplay_client::NicePlayClient;
use niceplay_core::PlaylistId;

/// One network round-trip producing a source's records
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordFetcher: Send + Sync {
    /// Fetch the full collection, in backend order
    async fn fetch(&self) -> Result<Vec<SourceRecord>>;
}

/// Banner carousel songs
pub struct BannerFetcher {
    client: NicePlayClient,
}

impl BannerFetcher {
    pub fn new(client: NicePlayClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RecordFetcher for BannerFetcher {
    async fn fetch(&self) -> Result<Vec<SourceRecord>> {
        let banners = self
            .client
            .playlists()
            .get_banner_songs()
            .await
            .map_err(|e| SourceError::from_client("banner", e))?;

        Ok(banners.into_iter().map(SourceRecord::from).collect())
    }
}

/// Songs of a fixed backend playlist (the chart and the recommendations)
pub struct PlaylistFetcher {
    client: NicePlayClient,
    playlist_id: PlaylistId,
    provider: String,
}

impl PlaylistFetcher {
    pub fn new(
        client: NicePlayClient,
        provider: impl Into<String>,
        playlist_id: PlaylistId,
    ) -> Self {
        Self {
            client,
            playlist_id,
            provider: provider.into(),
        }
    }
}

#[async_trait]
impl RecordFetcher for PlaylistFetcher {
    async fn fetch(&self) -> Result<Vec<SourceRecord>> {
        let playlist = self
            .client
            .playlists()
            .get_playlist(&self.playlist_id)
            .await
            .map_err(|e| SourceError::from_client(&self.provider, e))?;

        Ok(playlist.songs.into_iter().map(SourceRecord::from).collect())
    }
}
