//! Simulated audio output for headless runs
//!
//! Logs every engine call, reports the resource ready right away and, when a
//! track length is configured, reports the end of the track after that long.

use niceplay_playback::{AudioEngine, EngineError, EngineEvent, EngineEventSink, LoadToken};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

pub struct SimulatedEngine {
    sink: Option<EngineEventSink>,
    loaded: Option<(LoadToken, String)>,
    track_length: Option<Duration>,
    timer: Option<JoinHandle<()>>,
}

impl SimulatedEngine {
    pub fn new(track_length: Option<Duration>) -> Self {
        Self {
            sink: None,
            loaded: None,
            track_length,
            timer: None,
        }
    }

    fn emit(&self, event: EngineEvent) {
        if let Some(sink) = &self.sink {
            if !sink.emit(event) {
                debug!("Controller gone, dropping engine event");
            }
        }
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl AudioEngine for SimulatedEngine {
    fn set_event_sink(&mut self, sink: EngineEventSink) {
        self.sink = Some(sink);
    }

    fn load(&mut self, url: &str, token: LoadToken) -> Result<(), EngineError> {
        if self.loaded.is_some() {
            return Err(EngineError::new("previous resource was not unloaded"));
        }

        info!(url, token = %token, "Loading");
        self.loaded = Some((token, url.to_string()));
        self.emit(EngineEvent::Ready { token });
        Ok(())
    }

    fn play(&mut self) -> Result<(), EngineError> {
        let (token, url) = self
            .loaded
            .clone()
            .ok_or_else(|| EngineError::new("nothing loaded"))?;
        info!(url = %url, "Playing");

        self.cancel_timer();
        if let (Some(length), Some(sink)) = (self.track_length, self.sink.clone()) {
            self.timer = Some(tokio::spawn(async move {
                tokio::time::sleep(length).await;
                sink.emit(EngineEvent::Ended { token });
            }));
        }
        Ok(())
    }

    fn pause(&mut self) {
        info!("Paused");
        self.cancel_timer();
    }

    fn stop(&mut self) {
        self.cancel_timer();
    }

    fn unload(&mut self) {
        if let Some((_, url)) = self.loaded.take() {
            debug!(url = %url, "Unloaded");
        }
    }

    fn seek(&mut self, position: Duration) -> Result<(), EngineError> {
        if self.loaded.is_none() {
            return Err(EngineError::new("nothing loaded"));
        }
        info!(position_secs = position.as_secs_f64(), "Seek");
        Ok(())
    }
}

impl Drop for SimulatedEngine {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}
