/// Playback context - where a play request originates
use crate::error::CoreError;
use crate::types::PlaylistId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named source of a playback queue
///
/// Drives which source provider supplies the queue for a play request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum PlaybackContext {
    /// Home page banner carousel
    Banner,

    /// Ranking chart
    Chart,

    /// Daily recommendations
    Recommendation,

    /// The user's "liked songs" playlist with the given id
    LikedSongs(PlaylistId),

    /// An arbitrary named playlist
    UserPlaylist(PlaylistId),
}

impl PlaybackContext {
    /// Playlist id carried by playlist-backed contexts
    pub fn playlist_id(&self) -> Option<&PlaylistId> {
        match self {
            Self::LikedSongs(id) | Self::UserPlaylist(id) => Some(id),
            Self::Banner | Self::Chart | Self::Recommendation => None,
        }
    }

    /// Short label for log fields
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Banner => "banner",
            Self::Chart => "chart",
            Self::Recommendation => "recommendation",
            Self::LikedSongs(_) => "liked",
            Self::UserPlaylist(_) => "playlist",
        }
    }
}

impl fmt::Display for PlaybackContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.playlist_id() {
            Some(id) => write!(f, "{}:{}", self.kind(), id),
            None => f.write_str(self.kind()),
        }
    }
}

/// Parses both the canonical form produced by `Display` and the legacy ids
/// the web surfaces pass (`bannerSong`, `rank`, `recommend`). A bare id that
/// matches nothing else names a user playlist.
impl FromStr for PlaybackContext {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        if raw.is_empty() {
            return Err(CoreError::invalid_context(s));
        }

        match raw {
            "banner" | "bannerSong" => return Ok(Self::Banner),
            "chart" | "rank" => return Ok(Self::Chart),
            "recommendation" | "recommend" => return Ok(Self::Recommendation),
            _ => {}
        }

        if let Some((prefix, id)) = raw.split_once(':') {
            if id.is_empty() {
                return Err(CoreError::invalid_context(s));
            }
            return match prefix {
                "liked" => Ok(Self::LikedSongs(PlaylistId::new(id))),
                "playlist" => Ok(Self::UserPlaylist(PlaylistId::new(id))),
                _ => Err(CoreError::invalid_context(s)),
            };
        }

        Ok(Self::UserPlaylist(PlaylistId::new(raw)))
    }
}
