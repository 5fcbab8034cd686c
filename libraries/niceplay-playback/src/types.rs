//! Core types for playback sessions

use chrono::{DateTime, Utc};
use niceplay_core::{PlaybackContext, TrackDescriptor};
use serde::{Deserialize, Serialize};

/// Lifecycle state of the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ControllerState {
    /// No session ever started (or reset since)
    #[default]
    Idle,

    /// Resolving a queue for a play request
    Loading,

    /// Engine is playing the current track
    Playing,

    /// Paused mid-track
    Paused,

    /// Audio released
    Stopped,
}

impl ControllerState {
    /// The transport state surfaces see for this controller state
    pub fn transport_state(self) -> TransportState {
        match self {
            Self::Playing => TransportState::Playing,
            Self::Paused => TransportState::Paused,
            Self::Idle | Self::Loading | Self::Stopped => TransportState::Stopped,
        }
    }
}

/// Playing/paused/stopped status of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// The authoritative playback session, owned by the controller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSession {
    /// Ordered, de-duplicated queue of the current context
    pub queue: Vec<TrackDescriptor>,

    /// Track being played (always a member of `queue` when set)
    pub current_track: Option<TrackDescriptor>,

    /// Context the queue was resolved from
    pub current_context: Option<PlaybackContext>,

    pub transport_state: TransportState,

    /// When the current track was started (diagnostics)
    pub playback_started_at: Option<DateTime<Utc>>,
}

/// Read-only mirror of the session, as published to subscribers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    pub current_track: Option<TrackDescriptor>,
    pub queue: Vec<TrackDescriptor>,
    pub transport_state: TransportState,
    pub current_context: Option<PlaybackContext>,

    /// Publish counter, strictly increasing across snapshots
    pub sequence: u64,
}

impl PlaybackSnapshot {
    pub(crate) fn from_session(session: &PlaybackSession, sequence: u64) -> Self {
        Self {
            current_track: session.current_track.clone(),
            queue: session.queue.clone(),
            transport_state: session.transport_state,
            current_context: session.current_context.clone(),
            sequence,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.transport_state == TransportState::Playing
    }
}

/// Configuration for the playback controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Move on to the next track when the engine reports a load or play
    /// failure (default: false)
    pub advance_on_error: bool,

    /// How many upcoming tracks surfaces show (default: 2)
    pub upcoming_count: usize,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            advance_on_error: false,
            upcoming_count: 2,
        }
    }
}

/// Result of a play request that did not fail
#[derive(Debug, Clone, PartialEq)]
pub enum PlayOutcome {
    /// The track is now current and the engine was started
    Started(TrackDescriptor),

    /// A newer play request was issued before this one completed; nothing
    /// was applied
    Superseded,
}

impl PlayOutcome {
    pub fn track(&self) -> Option<&TrackDescriptor> {
        match self {
            Self::Started(track) => Some(track),
            Self::Superseded => None,
        }
    }
}
