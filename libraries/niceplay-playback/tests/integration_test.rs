//! Integration tests for the playback controller
//!
//! Drive the controller through real playback flows with in-memory providers
//! and a recording audio engine.

use async_trait::async_trait;
use niceplay_client::SongRecord;
use niceplay_core::{PlaybackContext, PlaylistId, TrackDescriptor, TrackId};
use niceplay_playback::{
    AudioEngine, ControllerState, EngineError, EngineEvent, EngineEventSink, ErrorKind,
    LoadToken, PlayOutcome, PlaybackConfig, PlaybackController, PlaybackError, PlaybackSnapshot,
    QueueResolver, TransportState,
};
use niceplay_sources::{PlaylistInfo, SourceError, SourceProvider, SourceRecord, SourceRegistry};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

// ===== Test Helpers =====

fn song(id: &str) -> SongRecord {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "title": format!("Track {}", id),
        "artist": "Artist",
        "file_path": format!("/audio/{}.mp3", id),
    }))
    .unwrap()
}

fn records(ids: &[&str]) -> Vec<SourceRecord> {
    ids.iter().map(|id| SourceRecord::from(song(id))).collect()
}

#[derive(Default)]
struct EngineState {
    calls: Vec<String>,
    sink: Option<EngineEventSink>,
    last_token: Option<LoadToken>,
    /// Report every load as failed through the event sink
    fail_loads: bool,
}

/// Engine that records calls and lets the test emit events
#[derive(Clone, Default)]
struct RecordingEngine {
    state: Arc<Mutex<EngineState>>,
}

impl RecordingEngine {
    fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    fn fail_every_load(&self) {
        self.state.lock().unwrap().fail_loads = true;
    }

    fn load_count(&self) -> usize {
        self.calls().iter().filter(|call| call.starts_with("load")).count()
    }

    fn emit(&self, event: impl FnOnce(LoadToken) -> EngineEvent) {
        let state = self.state.lock().unwrap();
        let token = state.last_token.expect("nothing loaded");
        assert!(state.sink.as_ref().unwrap().emit(event(token)));
    }
}

impl AudioEngine for RecordingEngine {
    fn set_event_sink(&mut self, sink: EngineEventSink) {
        self.state.lock().unwrap().sink = Some(sink);
    }

    fn load(&mut self, url: &str, token: LoadToken) -> Result<(), EngineError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("load {}", url));
        state.last_token = Some(token);
        if state.fail_loads {
            if let Some(sink) = &state.sink {
                sink.emit(EngineEvent::LoadFailed {
                    token,
                    message: "unreadable file".to_string(),
                });
            }
        }
        Ok(())
    }

    fn play(&mut self) -> Result<(), EngineError> {
        self.state.lock().unwrap().calls.push("play".to_string());
        Ok(())
    }

    fn pause(&mut self) {
        self.state.lock().unwrap().calls.push("pause".to_string());
    }

    fn stop(&mut self) {
        self.state.lock().unwrap().calls.push("stop".to_string());
    }

    fn unload(&mut self) {
        self.state.lock().unwrap().calls.push("unload".to_string());
    }

    fn seek(&mut self, position: Duration) -> Result<(), EngineError> {
        self.state
            .lock()
            .unwrap()
            .calls
            .push(format!("seek {}", position.as_secs_f64()));
        Ok(())
    }
}

/// Provider serving a fixed collection, optionally after a gate opens
struct TestProvider {
    name: String,
    records: Vec<SourceRecord>,
    fetches: AtomicUsize,
    gate: Option<Notify>,
    error: Option<SourceError>,
}

impl TestProvider {
    fn new(name: &str, ids: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            records: records(ids),
            fetches: AtomicUsize::new(0),
            gate: None,
            error: None,
        })
    }

    fn gated(name: &str, ids: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            records: records(ids),
            fetches: AtomicUsize::new(0),
            gate: Some(Notify::new()),
            error: None,
        })
    }

    fn failing(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            records: Vec::new(),
            fetches: AtomicUsize::new(0),
            gate: None,
            error: Some(SourceError::fetch(name, "connection refused")),
        })
    }

    fn open(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    async fn wait_for_fetch(&self) {
        for _ in 0..200 {
            if self.fetches.load(Ordering::SeqCst) > 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("provider {} was never fetched", self.name);
    }
}

#[async_trait]
impl SourceProvider for TestProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_if_absent(&self) -> niceplay_sources::Result<Vec<SourceRecord>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match &self.error {
            Some(e) => Err(e.clone()),
            None => Ok(self.records.clone()),
        }
    }

    fn cached(&self) -> Vec<SourceRecord> {
        self.records.clone()
    }

    fn reset(&self) {}
}

struct Harness {
    controller: Arc<PlaybackController>,
    engine: RecordingEngine,
    registry: SourceRegistry,
}

fn harness_with(
    banner: Arc<TestProvider>,
    chart: Arc<TestProvider>,
    recommendation: Arc<TestProvider>,
    config: PlaybackConfig,
) -> Harness {
    let registry = SourceRegistry::new(banner, chart, recommendation);
    let engine = RecordingEngine::default();
    let controller = Arc::new(PlaybackController::new(
        QueueResolver::new(registry.clone()),
        Box::new(engine.clone()),
        config,
    ));

    Harness {
        controller,
        engine,
        registry,
    }
}

fn harness() -> Harness {
    harness_with(
        TestProvider::new("banner", &[]),
        TestProvider::new("chart", &["1", "2", "3"]),
        TestProvider::new("recommendation", &[]),
        PlaybackConfig::default(),
    )
}

fn current_id(snapshot: &PlaybackSnapshot) -> Option<&str> {
    snapshot.current_track.as_ref().map(|t| t.track_id.as_str())
}

async fn wait_for_snapshot(
    controller: &PlaybackController,
    predicate: impl Fn(&PlaybackSnapshot) -> bool,
) -> PlaybackSnapshot {
    let store = controller.store();
    for _ in 0..200 {
        let snapshot = store.read();
        if predicate(&snapshot) {
            return snapshot;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("snapshot condition never met: {:?}", store.read());
}

// ===== Scenarios =====

#[tokio::test]
async fn chart_play_then_next_wraps() {
    let h = harness();

    let outcome = h
        .controller
        .handle_play("2".into(), PlaybackContext::Chart)
        .await
        .unwrap();
    assert_eq!(outcome.track().unwrap().track_id.as_str(), "2");
    assert_eq!(h.controller.queue().await.len(), 3);

    h.controller.next().await.unwrap();
    assert_eq!(current_id(&h.controller.store().read()), Some("3"));

    h.controller.next().await.unwrap();
    assert_eq!(current_id(&h.controller.store().read()), Some("1"));
    assert!(h.controller.is_playing().await);
}

#[tokio::test]
async fn mismatched_liked_songs_leave_session_untouched() {
    let h = harness();
    h.registry.liked_songs().set_playlist(
        PlaylistInfo {
            id: PlaylistId::new("9"),
            name: "Liked".to_string(),
            description: None,
            track_count: 1,
        },
        vec![song("5")],
    );

    h.controller
        .handle_play("1".into(), PlaybackContext::Chart)
        .await
        .unwrap();

    let err = h
        .controller
        .handle_play("5".into(), PlaybackContext::LikedSongs(PlaylistId::new("5")))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ContextMismatch);
    assert_eq!(
        err,
        PlaybackError::ContextMismatch {
            context: PlaybackContext::LikedSongs(PlaylistId::new("5")),
            loaded: Some(PlaylistId::new("9")),
        }
    );
    assert_eq!(
        h.controller.current_track().await.unwrap().track_id.as_str(),
        "1"
    );
    assert_eq!(h.controller.queue().await.len(), 3);
    assert_eq!(h.controller.current_context().await, Some(PlaybackContext::Chart));
}

#[tokio::test]
async fn empty_recommendation_reports_track_not_found() {
    let h = harness();

    let err = h
        .controller
        .handle_play("1".into(), PlaybackContext::Recommendation)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        PlaybackError::TrackNotFound {
            track_id: TrackId::new("1"),
            context: PlaybackContext::Recommendation,
        }
    );
    assert_eq!(h.controller.state().await, ControllerState::Stopped);
    assert_eq!(h.controller.store().read().transport_state, TransportState::Stopped);
    assert!(h.controller.current_track().await.is_none());
}

#[tokio::test]
async fn upcoming_on_two_track_queue() {
    let h = harness();
    let tracks = vec![
        TrackDescriptor::new("a", "A", "").with_audio_url("/a.mp3"),
        TrackDescriptor::new("b", "B", "").with_audio_url("/b.mp3"),
    ];

    h.controller
        .handle_play_with_tracks("a".into(), PlaybackContext::Chart, tracks)
        .await
        .unwrap();

    let upcoming = h.controller.store().derive_upcoming(2);
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0].track_id.as_str(), "b");
}

#[tokio::test]
async fn upcoming_on_single_track_queue_repeats() {
    let h = harness();
    let tracks = vec![TrackDescriptor::new("a", "A", "").with_audio_url("/a.mp3")];

    h.controller
        .handle_play_with_tracks("a".into(), PlaybackContext::Chart, tracks)
        .await
        .unwrap();

    let upcoming = h.controller.store().derive_upcoming(2);
    let ids: Vec<_> = upcoming.iter().map(|t| t.track_id.as_str()).collect();
    assert_eq!(ids, vec!["a", "a"]);
}

#[tokio::test]
async fn pause_while_stopped_is_silent() {
    let h = harness();
    let published = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&published);
    let _subscription = h.controller.store().subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    assert!(!h.controller.pause().await);
    assert!(!h.controller.resume().await.unwrap());
    assert!(!h.controller.stop().await);
    assert!(h.controller.next().await.unwrap().is_none());
    assert!(h.controller.previous().await.unwrap().is_none());

    assert_eq!(published.load(Ordering::SeqCst), 0);
    assert_eq!(h.controller.state().await, ControllerState::Idle);
    assert!(h.engine.calls().is_empty());
}

// ===== Properties =====

#[tokio::test]
async fn every_present_track_becomes_current_exactly_once_in_queue() {
    let h = harness_with(
        TestProvider::new("banner", &[]),
        TestProvider::new("chart", &["1", "2", "1", "3", "2"]),
        TestProvider::new("recommendation", &[]),
        PlaybackConfig::default(),
    );

    for id in ["1", "2", "3"] {
        h.controller
            .handle_play(id.into(), PlaybackContext::Chart)
            .await
            .unwrap();

        let session = h.controller.session().await;
        assert_eq!(session.current_track.unwrap().track_id.as_str(), id);
        let occurrences = session
            .queue
            .iter()
            .filter(|t| t.track_id.as_str() == id)
            .count();
        assert_eq!(occurrences, 1);
        assert_eq!(session.queue.len(), 3);
    }
}

#[tokio::test]
async fn subscribers_never_see_track_outside_queue() {
    let h = harness_with(
        TestProvider::new("banner", &[]),
        TestProvider::new("chart", &["1", "2", "3"]),
        TestProvider::new("recommendation", &["7", "8"]),
        PlaybackConfig::default(),
    );
    let snapshots = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&snapshots);
    let _subscription = h.controller.store().subscribe(move |snapshot| {
        sink.lock().unwrap().push(snapshot.clone());
    });

    h.controller
        .handle_play("2".into(), PlaybackContext::Chart)
        .await
        .unwrap();
    h.controller.next().await.unwrap();
    h.controller
        .handle_play("8".into(), PlaybackContext::Recommendation)
        .await
        .unwrap();
    h.controller.previous().await.unwrap();
    h.controller.pause().await;
    h.controller.stop().await;

    let snapshots = snapshots.lock().unwrap();
    assert!(!snapshots.is_empty());
    for pair in snapshots.windows(2) {
        assert!(pair[0].sequence < pair[1].sequence);
    }
    for snapshot in snapshots.iter() {
        if let Some(track) = &snapshot.current_track {
            assert!(
                snapshot.queue.iter().any(|t| t.track_id == track.track_id),
                "track {} published with a foreign queue",
                track.track_id
            );
        }
    }
}

#[tokio::test]
async fn each_successful_play_from_idle_publishes_once() {
    let h = harness();
    let published = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&published);
    let _subscription = h.controller.store().subscribe(move |snapshot| {
        sink.lock().unwrap().push(current_id(snapshot).map(str::to_string));
    });

    h.controller
        .handle_play("1".into(), PlaybackContext::Chart)
        .await
        .unwrap();

    assert_eq!(*published.lock().unwrap(), vec![Some("1".to_string())]);
}

#[tokio::test]
async fn pause_and_resume_are_idempotent() {
    let h = harness();
    h.controller
        .handle_play("1".into(), PlaybackContext::Chart)
        .await
        .unwrap();

    assert!(!h.controller.resume().await.unwrap());
    assert_eq!(h.controller.state().await, ControllerState::Playing);

    assert!(h.controller.pause().await);
    let sequence = h.controller.store().read().sequence;
    assert!(!h.controller.pause().await);
    assert_eq!(h.controller.state().await, ControllerState::Paused);
    assert_eq!(h.controller.store().read().sequence, sequence);

    assert!(h.controller.resume().await.unwrap());
    assert!(!h.controller.resume().await.unwrap());
    assert!(h.controller.is_playing().await);

    let pauses = h.engine.calls().iter().filter(|c| *c == "pause").count();
    assert_eq!(pauses, 1);
}

#[tokio::test]
async fn slower_older_request_is_superseded() {
    let chart = TestProvider::gated("chart", &["1", "2"]);
    let h = harness_with(
        TestProvider::new("banner", &[]),
        Arc::clone(&chart),
        TestProvider::new("recommendation", &["7", "8"]),
        PlaybackConfig::default(),
    );

    let slow = {
        let controller = Arc::clone(&h.controller);
        tokio::spawn(async move {
            controller
                .handle_play("1".into(), PlaybackContext::Chart)
                .await
        })
    };
    chart.wait_for_fetch().await;

    let fast = h
        .controller
        .handle_play("8".into(), PlaybackContext::Recommendation)
        .await
        .unwrap();
    assert_eq!(fast.track().unwrap().track_id.as_str(), "8");

    chart.open();
    assert_eq!(slow.await.unwrap().unwrap(), PlayOutcome::Superseded);

    let session = h.controller.session().await;
    assert_eq!(session.current_track.unwrap().track_id.as_str(), "8");
    assert_eq!(session.current_context, Some(PlaybackContext::Recommendation));
    let ids: Vec<_> = session.queue.iter().map(|t| t.track_id.as_str()).collect();
    assert_eq!(ids, vec!["7", "8"]);

    let loads = h
        .engine
        .calls()
        .iter()
        .filter(|c| c.starts_with("load"))
        .count();
    assert_eq!(loads, 1);
}

// ===== Contexts =====

#[tokio::test]
async fn banner_titles_are_split_from_label() {
    let banner = Arc::new(TestProvider {
        name: "banner".to_string(),
        records: vec![SourceRecord::Banner(
            serde_json::from_value(serde_json::json!({
                "song_id": 11,
                "song_title": "Morning",
                "song_artist": "Birds",
                "file_path": "/audio/11.mp3",
            }))
            .unwrap(),
        )],
        fetches: AtomicUsize::new(0),
        gate: None,
        error: None,
    });
    let h = harness_with(
        banner,
        TestProvider::new("chart", &[]),
        TestProvider::new("recommendation", &[]),
        PlaybackConfig::default(),
    );

    let outcome = h
        .controller
        .handle_play(TrackId::from(11u64), PlaybackContext::Banner)
        .await
        .unwrap();

    let track = outcome.track().unwrap();
    assert_eq!(track.title, "Morning");
    assert_eq!(track.artist, "Birds");
    assert_eq!(h.engine.calls().last().map(String::as_str), Some("play"));
}

#[tokio::test]
async fn user_playlist_requires_matching_non_empty_cache() {
    let h = harness();
    let info = |id: &str| PlaylistInfo {
        id: PlaylistId::new(id),
        name: "Mix".to_string(),
        description: None,
        track_count: 0,
    };

    let err = h
        .controller
        .handle_play("4".into(), PlaybackContext::UserPlaylist(PlaylistId::new("8")))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ContextMismatch);

    h.registry.current_playlist().set_playlist(info("8"), Vec::new());
    let err = h
        .controller
        .handle_play("4".into(), PlaybackContext::UserPlaylist(PlaylistId::new("8")))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ContextMismatch);

    h.registry
        .current_playlist()
        .set_playlist(info("8"), vec![song("4"), song("5")]);
    h.controller
        .handle_play("4".into(), PlaybackContext::UserPlaylist(PlaylistId::new("8")))
        .await
        .unwrap();
    assert_eq!(h.controller.queue().await.len(), 2);
}

#[tokio::test]
async fn provider_failure_is_propagated() {
    let h = harness_with(
        TestProvider::new("banner", &[]),
        TestProvider::failing("chart"),
        TestProvider::new("recommendation", &[]),
        PlaybackConfig::default(),
    );

    let err = h
        .controller
        .handle_play("1".into(), PlaybackContext::Chart)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ProviderFetch);
    assert_eq!(err.context(), Some(&PlaybackContext::Chart));
    assert_eq!(h.controller.state().await, ControllerState::Stopped);
}

#[tokio::test]
async fn explicit_tracks_need_no_cache() {
    let h = harness();
    let tracks = vec![
        TrackDescriptor::new("x", "X", "").with_audio_url("/x.mp3"),
        TrackDescriptor::new("y", "Y", "").with_audio_url("/y.mp3"),
        TrackDescriptor::new("x", "X again", "").with_audio_url("/x2.mp3"),
    ];

    h.controller
        .handle_play_with_tracks(
            "y".into(),
            PlaybackContext::UserPlaylist(PlaylistId::new("42")),
            tracks,
        )
        .await
        .unwrap();

    assert_eq!(h.controller.queue().await.len(), 2);
    h.controller.previous().await.unwrap();
    assert_eq!(h.controller.current_track().await.unwrap().title, "X");
}

// ===== Transport =====

#[tokio::test]
async fn stop_keeps_queue_and_releases_audio() {
    let h = harness();
    h.controller
        .handle_play("2".into(), PlaybackContext::Chart)
        .await
        .unwrap();

    assert!(h.controller.stop().await);

    let snapshot = h.controller.store().read();
    assert!(snapshot.current_track.is_none());
    assert_eq!(snapshot.queue.len(), 3);
    assert_eq!(snapshot.transport_state, TransportState::Stopped);
    assert_eq!(h.engine.calls().last().map(String::as_str), Some("unload"));
    assert!(h.controller.next().await.unwrap().is_none());
}

#[tokio::test]
async fn seek_keeps_transport_state() {
    let h = harness();
    h.controller
        .handle_play("1".into(), PlaybackContext::Chart)
        .await
        .unwrap();
    h.controller.pause().await;

    assert!(h.controller.seek(12.5).await.unwrap());

    assert_eq!(h.controller.state().await, ControllerState::Paused);
    assert!(h.engine.calls().contains(&"seek 12.5".to_string()));
}

#[tokio::test]
async fn logout_reset_clears_everything() {
    let h = harness();
    h.controller
        .handle_play("1".into(), PlaybackContext::Chart)
        .await
        .unwrap();

    h.controller.reset().await;

    let snapshot = h.controller.store().read();
    assert!(snapshot.current_track.is_none());
    assert!(snapshot.queue.is_empty());
    assert!(snapshot.current_context.is_none());
    assert_eq!(snapshot.transport_state, TransportState::Stopped);
    assert!(h.controller.next().await.unwrap().is_none());
    assert_eq!(h.controller.state().await, ControllerState::Idle);
}

// ===== Engine events =====

#[tokio::test]
async fn ended_track_advances() {
    let h = harness();
    tokio::spawn(Arc::clone(&h.controller).run_engine_events());

    h.controller
        .handle_play("3".into(), PlaybackContext::Chart)
        .await
        .unwrap();
    h.engine.emit(|token| EngineEvent::Ended { token });

    let snapshot = wait_for_snapshot(&h.controller, |s| current_id(s) == Some("1")).await;
    assert!(snapshot.is_playing());
}

#[tokio::test]
async fn load_failure_stops_without_advancing() {
    let h = harness();
    h.controller
        .handle_play("1".into(), PlaybackContext::Chart)
        .await
        .unwrap();
    let token = LoadToken::new(1);

    let err = h
        .controller
        .handle_engine_event(EngineEvent::LoadFailed {
            token,
            message: "unsupported codec".to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(
        err,
        PlaybackError::AudioLoad {
            track_id: TrackId::new("1"),
            message: "unsupported codec".to_string(),
        }
    );
    let snapshot = h.controller.store().read();
    assert_eq!(snapshot.transport_state, TransportState::Stopped);
    assert_eq!(current_id(&snapshot), Some("1"));
}

#[tokio::test]
async fn load_failure_advances_when_configured() {
    let h = harness_with(
        TestProvider::new("banner", &[]),
        TestProvider::new("chart", &["1", "2", "3"]),
        TestProvider::new("recommendation", &[]),
        PlaybackConfig {
            advance_on_error: true,
            ..PlaybackConfig::default()
        },
    );
    tokio::spawn(Arc::clone(&h.controller).run_engine_events());

    h.controller
        .handle_play("1".into(), PlaybackContext::Chart)
        .await
        .unwrap();
    h.engine.emit(|token| EngineEvent::PlayFailed {
        token,
        message: "device lost".to_string(),
    });

    let snapshot = wait_for_snapshot(&h.controller, |s| current_id(s) == Some("2")).await;
    assert!(snapshot.is_playing());
}

#[tokio::test]
async fn advancing_gives_up_after_whole_queue_fails() {
    let h = harness_with(
        TestProvider::new("banner", &[]),
        TestProvider::new("chart", &["1", "2"]),
        TestProvider::new("recommendation", &[]),
        PlaybackConfig {
            advance_on_error: true,
            ..PlaybackConfig::default()
        },
    );
    h.engine.fail_every_load();
    tokio::spawn(Arc::clone(&h.controller).run_engine_events());

    h.controller
        .handle_play("1".into(), PlaybackContext::Chart)
        .await
        .unwrap();

    let snapshot = wait_for_snapshot(&h.controller, |s| {
        current_id(s) == Some("2") && s.transport_state == TransportState::Stopped
    })
    .await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(h.engine.load_count(), 2);
    assert_eq!(h.controller.state().await, ControllerState::Stopped);
    assert_eq!(h.controller.store().read().sequence, snapshot.sequence);
}

#[tokio::test]
async fn second_event_loop_returns_immediately() {
    let h = harness();
    let first = tokio::spawn(Arc::clone(&h.controller).run_engine_events());
    // Let the spawned loop claim the receiver
    tokio::task::yield_now().await;

    tokio::time::timeout(
        Duration::from_secs(1),
        Arc::clone(&h.controller).run_engine_events(),
    )
    .await
    .unwrap();

    first.abort();
}
