//! Collection endpoints: banner songs, playlists, liked songs.

use crate::error::{ClientError, Result};
use crate::types::{BannerRecord, PlaylistResponse, UserPlaylistsResponse};
use niceplay_core::{PlaylistId, UserId};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Playlist client for the NicePlay backend.
pub struct PlaylistClient<'a> {
    http: &'a Client,
    base_url: &'a str,
}

impl<'a> PlaylistClient<'a> {
    pub(crate) fn new(http: &'a Client, base_url: &'a str) -> Self {
        Self { http, base_url }
    }

    /// Songs featured on the home page banner, in carousel order.
    pub async fn get_banner_songs(&self) -> Result<Vec<BannerRecord>> {
        let url = format!("{}/banner/songs", self.base_url);
        debug!(url = %url, "Fetching banner songs");

        let banners: Vec<BannerRecord> = self.get_json(&url, "banner songs").await?;
        debug!(count = banners.len(), "Fetched banner songs");
        Ok(banners)
    }

    /// A playlist with its songs.
    ///
    /// The chart and the daily recommendations are ordinary playlists on
    /// the backend.
    pub async fn get_playlist(&self, playlist_id: &PlaylistId) -> Result<PlaylistResponse> {
        let url = format!("{}/playlists/{}", self.base_url, playlist_id);
        debug!(url = %url, playlist_id = %playlist_id, "Fetching playlist");

        let mut playlist: PlaylistResponse = self.get_json(&url, "playlist").await?;
        if playlist.playlist_id.is_none() {
            playlist.playlist_id = Some(playlist_id.clone());
        }
        debug!(songs = playlist.songs.len(), "Fetched playlist");
        Ok(playlist)
    }

    /// The user's "liked songs" playlist.
    pub async fn get_liked_songs(&self, user_id: &UserId) -> Result<PlaylistResponse> {
        let url = format!("{}/users/{}/liked-songs", self.base_url, user_id);
        debug!(url = %url, user_id = %user_id, "Fetching liked songs");

        let liked: PlaylistResponse = self.get_json(&url, "liked songs").await?;
        debug!(songs = liked.songs.len(), "Fetched liked songs");
        Ok(liked)
    }

    /// Playlists owned by the user.
    pub async fn get_user_playlists(&self, user_id: &UserId) -> Result<UserPlaylistsResponse> {
        let url = format!("{}/users/{}/playlists", self.base_url, user_id);
        debug!(url = %url, user_id = %user_id, "Fetching user playlists");

        self.get_json(&url, "user playlists").await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<T> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(ClientError::from_send)?;

        read_json(response, what).await
    }
}

async fn read_json<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
    let status = response.status();

    if status.is_success() {
        response.json().await.map_err(|e| {
            ClientError::ParseError(format!("Failed to parse {} response: {}", what, e))
        })
    } else if status.as_u16() == 401 {
        Err(ClientError::AuthRequired)
    } else {
        let error_text = response.text().await.unwrap_or_default();
        Err(ClientError::ServerError {
            status: status.as_u16(),
            message: error_text,
        })
    }
}
