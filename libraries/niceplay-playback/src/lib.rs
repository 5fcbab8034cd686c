//! NicePlay - Playback Sessions
//!
//! Turns "play track X from context Y" into a running playback session.
//!
//! This crate provides:
//! - Queue resolution from a context's source cache (or an explicit track list)
//! - The playback session controller (play, pause, resume, stop, next,
//!   previous, seek) driving a single audio engine
//! - A shared, observable mirror of the session for UI surfaces
//!
//! # Architecture
//!
//! `niceplay-playback` knows nothing about audio output. Platforms implement
//! [`AudioEngine`] and report readiness, failures and the end of a track as
//! [`EngineEvent`]s. The controller owns the only mutable copy of the session;
//! surfaces read and subscribe through [`PlaybackStateStore`].
//!
//! Play requests are numbered. When a newer request is issued before an older
//! one finishes resolving, the older one is reported as
//! [`PlayOutcome::Superseded`] and never touches the session.
//!
//! # Example
//!
//! ```rust,no_run
//! use niceplay_client::{ApiConfig, NicePlayClient};
//! use niceplay_core::PlaybackContext;
//! use niceplay_playback::{AudioEngine, PlaybackConfig, PlaybackController, QueueResolver};
//! use niceplay_sources::{SourceRegistry, SourcesConfig};
//! use std::sync::Arc;
//!
//! # async fn demo(engine: Box<dyn AudioEngine>) -> Result<(), Box<dyn std::error::Error>> {
//! let client = NicePlayClient::new(ApiConfig::new("http://localhost:8080"))?;
//! let sources = SourceRegistry::from_client(client, &SourcesConfig::default());
//! let controller = Arc::new(PlaybackController::new(
//!     QueueResolver::new(sources),
//!     engine,
//!     PlaybackConfig::default(),
//! ));
//! tokio::spawn(Arc::clone(&controller).run_engine_events());
//!
//! let store = controller.store();
//! let _subscription = store.subscribe(|snapshot| {
//!     println!("now playing: {:?}", snapshot.current_track);
//! });
//!
//! controller.handle_play("2".into(), PlaybackContext::Chart).await?;
//! controller.next().await?;
//! println!("up next: {:?}", store.derive_upcoming(2));
//! # Ok(())
//! # }
//! ```

mod controller;
mod engine;
mod error;
mod resolver;
mod store;
pub mod types;

pub use controller::PlaybackController;
pub use engine::{
    event_channel, AudioEngine, EngineError, EngineEvent, EngineEventSink, EngineEvents, LoadToken,
};
pub use error::{ErrorKind, PlaybackError, Result};
pub use resolver::{dedup_tracks, locate, normalize, QueueResolver, ResolvedQueue};
pub use store::{upcoming, PlaybackStateStore, Subscription};
pub use types::{
    ControllerState, PlayOutcome, PlaybackConfig, PlaybackSession, PlaybackSnapshot,
    TransportState,
};
