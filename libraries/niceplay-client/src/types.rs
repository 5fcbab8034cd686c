//! Types for NicePlay backend requests and responses.

use niceplay_core::{PlaylistId, TrackId, UserId};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for connecting to the backend.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the backend (e.g., "http://localhost:8080")
    pub url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl ApiConfig {
    /// Create a config with the default 10 second timeout.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Override the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// =============================================================================
// Authentication Types
// =============================================================================

/// Envelope returned by `/login`.
///
/// The backend answers 200 for both outcomes; `code` carries the verdict.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub code: u16,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<UserInfo>,
}

/// Logged-in user.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UserInfo {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

// =============================================================================
// Collection Types
// =============================================================================

/// One banner carousel entry, as returned by `/banner/songs`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BannerRecord {
    #[serde(default)]
    pub banner_id: Option<String>,
    #[serde(default)]
    pub banner_title: Option<String>,
    #[serde(default)]
    pub banner_description: Option<String>,
    #[serde(default)]
    pub banner_cover_url: Option<String>,
    #[serde(default)]
    pub cover_url: Option<String>,
    pub song_id: TrackId,
    #[serde(default)]
    pub song_title: String,
    #[serde(default)]
    pub song_artist: String,
    #[serde(default)]
    pub lrc: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
}

impl BannerRecord {
    /// The combined `"Title - Artist"` label shown on the carousel.
    pub fn combined_label(&self) -> String {
        format!("{} - {}", self.song_title, self.song_artist)
    }
}

/// A song inside a playlist response.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SongRecord {
    pub id: TrackId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub cover_path: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub lrc_path: Option<String>,
    /// Length in seconds
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub banner_lrc: Option<String>,
}

impl SongRecord {
    /// Length as a `Duration`, ignoring negative or non-finite values.
    pub fn duration(&self) -> Option<Duration> {
        self.duration
            .filter(|secs| secs.is_finite() && *secs >= 0.0)
            .map(Duration::from_secs_f64)
    }
}

/// Response of `/playlists/{id}` and `/users/{id}/liked-songs`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlaylistResponse {
    #[serde(default)]
    pub playlist_id: Option<PlaylistId>,
    #[serde(default)]
    pub playlist_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub songs: Vec<SongRecord>,
}

/// Playlist card in the user's library.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlaylistSummary {
    pub id: PlaylistId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub tracks: Option<u32>,
    #[serde(default)]
    pub plays: Option<u64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Response of `/users/{id}/playlists`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UserPlaylistsResponse {
    #[serde(default)]
    pub playlists: Vec<PlaylistSummary>,
}
