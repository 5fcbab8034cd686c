//! Error types for playback sessions

use niceplay_core::{PlaybackContext, PlaylistId, TrackId};
use niceplay_sources::SourceError;
use serde::Serialize;
use thiserror::Error;

/// Stable classification of a playback failure, for user-facing messaging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    TrackNotFound,
    ContextMismatch,
    ProviderFetch,
    AudioLoad,
    AudioPlay,
    InvalidSeek,
    NoTrackLoaded,
}

/// Playback errors
///
/// None of these are fatal to the controller: after any of them the session
/// is left in a consistent state and the next request starts fresh.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlaybackError {
    /// Requested track is not part of the resolved queue
    #[error("Track {track_id} not found in {context}")]
    TrackNotFound {
        track_id: TrackId,
        context: PlaybackContext,
    },

    /// The side-loaded collection is not the one the context names
    #[error(
        "Context {context} does not match the loaded collection ({})",
        .loaded.as_ref().map_or("none", PlaylistId::as_str)
    )]
    ContextMismatch {
        context: PlaybackContext,
        loaded: Option<PlaylistId>,
    },

    /// The provider backing the context failed to fetch
    #[error("Failed to fetch {context}: {source}")]
    ProviderFetch {
        context: PlaybackContext,
        source: SourceError,
    },

    /// The audio engine could not load the track
    #[error("Failed to load track {track_id}: {message}")]
    AudioLoad { track_id: TrackId, message: String },

    /// The audio engine could not start or resume the track
    #[error("Failed to play track {track_id}: {message}")]
    AudioPlay { track_id: TrackId, message: String },

    /// The track has no media location
    #[error("Track {0} has no audio url")]
    MissingAudioUrl(TrackId),

    /// No track is current
    #[error("No track loaded")]
    NoTrackLoaded,

    /// Seek target is negative or not a number
    #[error("Invalid seek position: {0}")]
    InvalidSeekPosition(f64),
}

impl PlaybackError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TrackNotFound { .. } => ErrorKind::TrackNotFound,
            Self::ContextMismatch { .. } => ErrorKind::ContextMismatch,
            Self::ProviderFetch { .. } => ErrorKind::ProviderFetch,
            Self::AudioLoad { .. } | Self::MissingAudioUrl(_) => ErrorKind::AudioLoad,
            Self::AudioPlay { .. } => ErrorKind::AudioPlay,
            Self::InvalidSeekPosition(_) => ErrorKind::InvalidSeek,
            Self::NoTrackLoaded => ErrorKind::NoTrackLoaded,
        }
    }

    /// Track the error is about, when there is one
    pub fn track_id(&self) -> Option<&TrackId> {
        match self {
            Self::TrackNotFound { track_id, .. }
            | Self::AudioLoad { track_id, .. }
            | Self::AudioPlay { track_id, .. }
            | Self::MissingAudioUrl(track_id) => Some(track_id),
            _ => None,
        }
    }

    /// Context the error is about, when there is one
    pub fn context(&self) -> Option<&PlaybackContext> {
        match self {
            Self::TrackNotFound { context, .. }
            | Self::ContextMismatch { context, .. }
            | Self::ProviderFetch { context, .. } => Some(context),
            _ => None,
        }
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
