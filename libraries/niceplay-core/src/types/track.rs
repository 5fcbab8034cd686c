/// Track descriptor domain type
use crate::types::TrackId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A normalized playback-queue entry
///
/// Every source (banner, chart, playlist, ...) has its own record shape; the
/// resolver translates them all into this one before they reach the queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackDescriptor {
    /// Track identifier (unique within one queue, not across contexts)
    pub track_id: TrackId,

    /// Display title
    pub title: String,

    /// Display artist (may be empty)
    pub artist: String,

    /// Cover image reference
    pub artwork_url: Option<String>,

    /// Media location; required to start playback
    pub audio_url: Option<String>,

    /// Sidecar lyrics reference
    pub lyrics_url: Option<String>,

    /// Track length, when the source reports one
    pub duration: Option<Duration>,
}

impl TrackDescriptor {
    /// Create a descriptor with display metadata only
    pub fn new(
        track_id: impl Into<TrackId>,
        title: impl Into<String>,
        artist: impl Into<String>,
    ) -> Self {
        Self {
            track_id: track_id.into(),
            title: title.into(),
            artist: artist.into(),
            artwork_url: None,
            audio_url: None,
            lyrics_url: None,
            duration: None,
        }
    }

    /// Set the media location
    #[must_use]
    pub fn with_audio_url(mut self, url: impl Into<String>) -> Self {
        self.audio_url = Some(url.into());
        self
    }

    /// Set the cover image reference
    #[must_use]
    pub fn with_artwork_url(mut self, url: impl Into<String>) -> Self {
        self.artwork_url = Some(url.into());
        self
    }

    /// Set the lyrics reference
    #[must_use]
    pub fn with_lyrics_url(mut self, url: impl Into<String>) -> Self {
        self.lyrics_url = Some(url.into());
        self
    }

    /// Set the track length
    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Build a descriptor from a combined `"Title - Artist"` label.
    ///
    /// Splits on the first `" - "` only, so titles containing further
    /// separators keep them in the artist part. Without a separator the whole
    /// label is the title and the artist is empty.
    pub fn from_combined_label(track_id: impl Into<TrackId>, label: &str) -> Self {
        let (title, artist) = split_combined_label(label);
        Self::new(track_id, title, artist)
    }

    /// Whether this track can be handed to the audio engine
    pub fn is_playable(&self) -> bool {
        self.audio_url.as_deref().is_some_and(|url| !url.is_empty())
    }
}

/// Split `"Title - Artist"` on the first separator
pub(crate) fn split_combined_label(label: &str) -> (&str, &str) {
    match label.split_once(" - ") {
        Some((title, artist)) => (title, artist),
        None => (label, ""),
    }
}
