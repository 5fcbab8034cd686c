//! Playback session controller - the sole mutator of the playback session
//!
//! Every operation runs its state changes under one session lock and
//! publishes the resulting snapshot before releasing it, so the shared store
//! never mirrors a half-applied transition. The only suspension points are
//! queue resolution (performed without the lock) and the engine's own
//! asynchronous loading, which reports back through `EngineEvent`s.

use crate::{
    engine::{event_channel, AudioEngine, EngineEvent, EngineEvents, LoadToken},
    error::{PlaybackError, Result},
    resolver::{locate, QueueResolver, ResolvedQueue},
    store::PlaybackStateStore,
    types::{ControllerState, PlayOutcome, PlaybackConfig, PlaybackSession},
};
use chrono::Utc;
use niceplay_core::{PlaybackContext, TrackDescriptor, TrackId};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Where a play request gets its queue from
enum QueueSource {
    /// Resolve through the source caches
    Resolve,
    /// Use these tracks as-is
    Tracks(Vec<TrackDescriptor>),
}

#[derive(Clone, Copy)]
enum Step {
    Next,
    Previous,
}

struct Inner {
    session: PlaybackSession,
    state: ControllerState,
    engine: Box<dyn AudioEngine>,
    /// Token of the resource the engine holds
    loaded: Option<LoadToken>,
}

impl Inner {
    fn release_audio(&mut self) {
        self.engine.stop();
        self.engine.unload();
        self.loaded = None;
    }

    fn set_state(&mut self, state: ControllerState) {
        self.state = state;
        self.session.transport_state = state.transport_state();
        match state {
            ControllerState::Playing => {
                if self.session.playback_started_at.is_none() {
                    self.session.playback_started_at = Some(Utc::now());
                }
            }
            ControllerState::Paused | ControllerState::Loading => {}
            ControllerState::Idle | ControllerState::Stopped => {
                self.session.playback_started_at = None;
            }
        }
    }

    fn load_and_play(&mut self, track: &TrackDescriptor, token: LoadToken) -> Result<()> {
        let url = track
            .audio_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or_else(|| PlaybackError::MissingAudioUrl(track.track_id.clone()))?;

        self.engine
            .load(url, token)
            .map_err(|e| PlaybackError::AudioLoad {
                track_id: track.track_id.clone(),
                message: e.to_string(),
            })?;
        self.loaded = Some(token);

        self.engine.play().map_err(|e| PlaybackError::AudioPlay {
            track_id: track.track_id.clone(),
            message: e.to_string(),
        })
    }

    fn current_track_id(&self) -> Option<TrackId> {
        self.session
            .current_track
            .as_ref()
            .map(|track| track.track_id.clone())
    }
}

/// Long-lived owner of the playback session and the audio engine
///
/// Construct one at startup and share it (`Arc`) with every surface. Call
/// [`PlaybackController::run_engine_events`] on a task so end-of-track and
/// engine failures are handled.
pub struct PlaybackController {
    resolver: QueueResolver,
    store: PlaybackStateStore,
    config: PlaybackConfig,
    generation: AtomicU64,
    /// Engine-reported failures since the last track that played through
    failures: AtomicUsize,
    inner: Mutex<Inner>,
    events: std::sync::Mutex<Option<EngineEvents>>,
}

impl PlaybackController {
    pub fn new(
        resolver: QueueResolver,
        mut engine: Box<dyn AudioEngine>,
        config: PlaybackConfig,
    ) -> Self {
        let (sink, events) = event_channel();
        engine.set_event_sink(sink);

        Self {
            resolver,
            store: PlaybackStateStore::new(),
            config,
            generation: AtomicU64::new(0),
            failures: AtomicUsize::new(0),
            inner: Mutex::new(Inner {
                session: PlaybackSession::default(),
                state: ControllerState::Idle,
                engine,
                loaded: None,
            }),
            events: std::sync::Mutex::new(Some(events)),
        }
    }

    /// Handle to the shared state store
    pub fn store(&self) -> PlaybackStateStore {
        self.store.clone()
    }

    pub fn resolver(&self) -> &QueueResolver {
        &self.resolver
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    // ===== Play pipeline =====

    /// Play `track_id` from the queue of `context`
    ///
    /// Stops current audio first. Resolution failures leave the queue and
    /// current track as they were and the controller `Stopped`. If another
    /// play request is issued while this one resolves, this one returns
    /// `PlayOutcome::Superseded` without touching the session.
    pub async fn handle_play(
        &self,
        track_id: TrackId,
        context: PlaybackContext,
    ) -> Result<PlayOutcome> {
        self.failures.store(0, Ordering::SeqCst);
        self.play(track_id, context, QueueSource::Resolve).await
    }

    /// Play `track_id` from an explicitly supplied track list
    ///
    /// The list is de-duplicated like a resolved queue; no source cache is
    /// consulted.
    pub async fn handle_play_with_tracks(
        &self,
        track_id: TrackId,
        context: PlaybackContext,
        tracks: Vec<TrackDescriptor>,
    ) -> Result<PlayOutcome> {
        self.failures.store(0, Ordering::SeqCst);
        self.play(track_id, context, QueueSource::Tracks(tracks)).await
    }

    fn is_stale(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != generation
    }

    async fn play(
        &self,
        track_id: TrackId,
        context: PlaybackContext,
        source: QueueSource,
    ) -> Result<PlayOutcome> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(track_id = %track_id, context = %context, generation, "Play requested");

        {
            let mut inner = self.inner.lock().await;
            if self.is_stale(generation) {
                debug!(generation, "Play request superseded before start");
                return Ok(PlayOutcome::Superseded);
            }

            if matches!(inner.state, ControllerState::Playing | ControllerState::Paused) {
                inner.release_audio();
                inner.set_state(ControllerState::Stopped);
                self.store.publish(&inner.session);
            }
            inner.state = ControllerState::Loading;
        }

        let resolved = match source {
            QueueSource::Resolve => self.resolver.resolve(&context, &track_id).await,
            QueueSource::Tracks(tracks) => ResolvedQueue::from_tracks(tracks, &track_id, &context),
        };

        let mut inner = self.inner.lock().await;
        if self.is_stale(generation) {
            debug!(
                track_id = %track_id,
                generation,
                "Discarding superseded play request"
            );
            return Ok(PlayOutcome::Superseded);
        }

        match resolved {
            Ok(resolved) => self.start(&mut inner, resolved, context, generation),
            Err(e) => {
                warn!(
                    track_id = %track_id,
                    context = %context,
                    error = %e,
                    "Play request failed"
                );
                inner.set_state(ControllerState::Stopped);
                Err(e)
            }
        }
    }

    fn start(
        &self,
        inner: &mut Inner,
        resolved: ResolvedQueue,
        context: PlaybackContext,
        generation: u64,
    ) -> Result<PlayOutcome> {
        let track = resolved.current().clone();

        inner.release_audio();
        inner.session.queue = resolved.tracks;
        inner.session.current_track = Some(track.clone());
        inner.session.current_context = Some(context);
        inner.session.playback_started_at = None;

        if let Err(e) = inner.load_and_play(&track, LoadToken::new(generation)) {
            warn!(track_id = %track.track_id, error = %e, "Track failed to start");
            inner.release_audio();
            inner.set_state(ControllerState::Stopped);
            self.store.publish(&inner.session);
            return Err(e);
        }

        inner.set_state(ControllerState::Playing);
        self.store.publish(&inner.session);

        info!(
            track_id = %track.track_id,
            title = %track.title,
            queue_len = inner.session.queue.len(),
            "Playback started"
        );
        Ok(PlayOutcome::Started(track))
    }

    // ===== Transport =====

    /// Pause playback; returns false (and does nothing) unless playing
    pub async fn pause(&self) -> bool {
        let mut inner = self.inner.lock().await;
        if inner.state != ControllerState::Playing {
            debug!(state = ?inner.state, "Pause ignored");
            return false;
        }

        inner.engine.pause();
        inner.set_state(ControllerState::Paused);
        self.store.publish(&inner.session);
        true
    }

    /// Resume playback; returns `Ok(false)` (and does nothing) unless paused
    pub async fn resume(&self) -> Result<bool> {
        let mut inner = self.inner.lock().await;
        if inner.state != ControllerState::Paused {
            debug!(state = ?inner.state, "Resume ignored");
            return Ok(false);
        }

        let track_id = inner.current_track_id().ok_or(PlaybackError::NoTrackLoaded)?;
        if let Err(e) = inner.engine.play() {
            let err = PlaybackError::AudioPlay {
                track_id,
                message: e.to_string(),
            };
            warn!(error = %err, "Resume failed");
            inner.release_audio();
            inner.set_state(ControllerState::Stopped);
            self.store.publish(&inner.session);
            return Err(err);
        }

        inner.set_state(ControllerState::Playing);
        self.store.publish(&inner.session);
        Ok(true)
    }

    /// Release audio and clear the current track; the queue is kept
    pub async fn stop(&self) -> bool {
        let mut inner = self.inner.lock().await;
        if !matches!(inner.state, ControllerState::Playing | ControllerState::Paused) {
            debug!(state = ?inner.state, "Stop ignored");
            return false;
        }

        inner.release_audio();
        inner.session.current_track = None;
        inner.set_state(ControllerState::Stopped);
        self.store.publish(&inner.session);
        info!("Playback stopped");
        true
    }

    /// Play the track after the current one, wrapping to the start
    ///
    /// Returns `Ok(None)` when there is no current track.
    pub async fn next(&self) -> Result<Option<PlayOutcome>> {
        self.failures.store(0, Ordering::SeqCst);
        self.step(Step::Next).await
    }

    /// Play the track before the current one, wrapping to the end
    pub async fn previous(&self) -> Result<Option<PlayOutcome>> {
        self.failures.store(0, Ordering::SeqCst);
        self.step(Step::Previous).await
    }

    async fn step(&self, step: Step) -> Result<Option<PlayOutcome>> {
        let (track_id, context, queue) = {
            let inner = self.inner.lock().await;
            let session = &inner.session;

            let (Some(current), Some(context)) =
                (session.current_track.as_ref(), session.current_context.as_ref())
            else {
                debug!("Skip ignored: no current track");
                return Ok(None);
            };
            let Some(index) = locate(&session.queue, &current.track_id) else {
                debug!(track_id = %current.track_id, "Skip ignored: current track not in queue");
                return Ok(None);
            };

            let len = session.queue.len();
            let target = match step {
                Step::Next => (index + 1) % len,
                Step::Previous => (index + len - 1) % len,
            };

            (
                session.queue[target].track_id.clone(),
                context.clone(),
                session.queue.clone(),
            )
        };

        self.play(track_id, context, QueueSource::Tracks(queue)).await.map(Some)
    }

    /// Move the playhead of the current track to `seconds`
    ///
    /// Returns `Ok(false)` (and does nothing) when no track is loaded in the
    /// engine. Negative and non-finite positions are rejected.
    pub async fn seek(&self, seconds: f64) -> Result<bool> {
        let position = Duration::try_from_secs_f64(seconds)
            .map_err(|_| PlaybackError::InvalidSeekPosition(seconds))?;

        let mut inner = self.inner.lock().await;
        let Some(track_id) = inner.current_track_id() else {
            debug!(position_secs = seconds, "Seek ignored: no current track");
            return Ok(false);
        };
        if inner.loaded.is_none() {
            debug!(track_id = %track_id, "Seek ignored: nothing loaded in the engine");
            return Ok(false);
        }

        inner
            .engine
            .seek(position)
            .map_err(|e| PlaybackError::AudioPlay {
                track_id: track_id.clone(),
                message: e.to_string(),
            })?;

        debug!(track_id = %track_id, position_secs = seconds, "Seeked");
        Ok(true)
    }

    /// Forget the session (logout)
    ///
    /// Pending play requests are superseded.
    pub async fn reset(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);

        let mut inner = self.inner.lock().await;
        inner.release_audio();
        inner.session = PlaybackSession::default();
        inner.state = ControllerState::Idle;
        self.store.publish(&inner.session);
        info!("Playback session reset");
    }

    // ===== Queries =====

    pub async fn is_playing(&self) -> bool {
        self.inner.lock().await.state == ControllerState::Playing
    }

    pub async fn state(&self) -> ControllerState {
        self.inner.lock().await.state
    }

    pub async fn current_track(&self) -> Option<TrackDescriptor> {
        self.inner.lock().await.session.current_track.clone()
    }

    pub async fn queue(&self) -> Vec<TrackDescriptor> {
        self.inner.lock().await.session.queue.clone()
    }

    pub async fn current_context(&self) -> Option<PlaybackContext> {
        self.inner.lock().await.session.current_context.clone()
    }

    /// Copy of the whole session
    pub async fn session(&self) -> PlaybackSession {
        self.inner.lock().await.session.clone()
    }

    // ===== Engine events =====

    /// React to an engine notification
    ///
    /// Events for a resource the controller already released are ignored.
    /// `Ended` plays the next track. Load and play failures stop playback and
    /// are returned, or skip to the next track when `advance_on_error` is set.
    /// Skipping gives up once every track of the queue has failed in a row.
    pub async fn handle_engine_event(&self, event: EngineEvent) -> Result<Option<PlayOutcome>> {
        let failure = {
            let mut inner = self.inner.lock().await;
            if inner.loaded != Some(event.token()) {
                debug!(token = %event.token(), "Ignoring event for released resource");
                return Ok(None);
            }
            let Some(track_id) = inner.current_track_id() else {
                return Ok(None);
            };

            let failure = match event {
                EngineEvent::Ready { .. } => {
                    debug!(track_id = %track_id, "Engine ready");
                    return Ok(None);
                }
                EngineEvent::Ended { .. } => {
                    debug!(track_id = %track_id, "Track ended");
                    self.failures.store(0, Ordering::SeqCst);
                    None
                }
                EngineEvent::LoadFailed { message, .. } => {
                    Some(PlaybackError::AudioLoad { track_id, message })
                }
                EngineEvent::PlayFailed { message, .. } => {
                    Some(PlaybackError::AudioPlay { track_id, message })
                }
            };

            match failure {
                Some(err) => {
                    warn!(error = %err, "Engine reported failure");
                    inner.release_audio();
                    inner.set_state(ControllerState::Stopped);
                    self.store.publish(&inner.session);

                    let failures = self.failures.fetch_add(1, Ordering::SeqCst) + 1;
                    Some((err, failures < inner.session.queue.len()))
                }
                None => None,
            }
        };

        match failure {
            None => self.step(Step::Next).await,
            Some((_, true)) if self.config.advance_on_error => {
                info!("Advancing past failed track");
                self.step(Step::Next).await
            }
            Some((err, untried_left)) => {
                if self.config.advance_on_error && !untried_left {
                    warn!("Every track in the queue failed, leaving playback stopped");
                }
                Err(err)
            }
        }
    }

    /// Drain engine events until the engine goes away
    ///
    /// Holds only a weak reference between events, so dropping the last
    /// controller handle ends the loop.
    pub async fn run_engine_events(self: Arc<Self>) {
        let events = self
            .events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(mut events) = events else {
            warn!("Engine event loop already running");
            return;
        };

        let controller = Arc::downgrade(&self);
        drop(self);

        while let Some(event) = events.recv().await {
            let Some(controller) = controller.upgrade() else {
                break;
            };
            if let Err(e) = controller.handle_engine_event(event).await {
                warn!(error = %e, kind = ?e.kind(), "Engine event left playback stopped");
            }
        }
        debug!("Engine event loop finished");
    }
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
