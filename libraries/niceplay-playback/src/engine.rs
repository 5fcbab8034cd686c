//! Audio engine seam
//!
//! The controller drives exactly one engine. Loading is asynchronous on real
//! backends: `load` only starts it, and readiness, failures and the end of the
//! track come back later as `EngineEvent`s through the sink the controller
//! installs. Every event carries the `LoadToken` of the load it belongs to so
//! the controller can ignore events from a resource it already released.

use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;

/// Identifies one `load` call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoadToken(u64);

impl LoadToken {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LoadToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Failure reported synchronously by an engine call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct EngineError(pub String);

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Asynchronous notifications from the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// The resource finished loading
    Ready { token: LoadToken },

    /// The resource could not be loaded or decoded
    LoadFailed { token: LoadToken, message: String },

    /// Playback of a loaded resource failed
    PlayFailed { token: LoadToken, message: String },

    /// The track played to its end
    Ended { token: LoadToken },
}

impl EngineEvent {
    pub fn token(&self) -> LoadToken {
        match self {
            Self::Ready { token }
            | Self::LoadFailed { token, .. }
            | Self::PlayFailed { token, .. }
            | Self::Ended { token } => *token,
        }
    }
}

/// Sending half handed to the engine
#[derive(Debug, Clone)]
pub struct EngineEventSink {
    tx: mpsc::UnboundedSender<EngineEvent>,
}

impl EngineEventSink {
    /// Deliver an event; returns false once the controller is gone
    pub fn emit(&self, event: EngineEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

/// Receiving half, drained by the controller's event loop
#[derive(Debug)]
pub struct EngineEvents {
    rx: mpsc::UnboundedReceiver<EngineEvent>,
}

impl EngineEvents {
    pub async fn recv(&mut self) -> Option<EngineEvent> {
        self.rx.recv().await
    }
}

/// Create a connected sink/receiver pair
pub fn event_channel() -> (EngineEventSink, EngineEvents) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EngineEventSink { tx }, EngineEvents { rx })
}

/// Platform audio output
///
/// Implementations must not block: `load` starts loading and returns, the
/// outcome is reported through the event sink.
pub trait AudioEngine: Send {
    /// Install the sink events are reported through
    fn set_event_sink(&mut self, sink: EngineEventSink);

    /// Start loading `url`; events for this resource carry `token`
    fn load(&mut self, url: &str, token: LoadToken) -> Result<(), EngineError>;

    /// Start or resume output of the loaded resource
    fn play(&mut self) -> Result<(), EngineError>;

    fn pause(&mut self);

    fn stop(&mut self);

    /// Release the loaded resource
    fn unload(&mut self);

    fn seek(&mut self, position: Duration) -> Result<(), EngineError>;
}
