//! Async session driver.
//!
//! `SessionRuntime` owns the collaborators and wires one session together:
//! sensor callbacks push samples into mpsc channels, and a single spawned
//! actor task is the only writer of coordinator state. The watchdog interval
//! lives inside the actor loop, and fade completions are spawned sleeps that
//! message the loop with their generation, so a superseded fade can never
//! resurrect a stale transition. Stopping a session awaits the actor before
//! returning, which cancels the watchdog and any in-flight fade.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, Duration, MissedTickBehavior};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::audio::AudioAction;
use crate::events::Event;
use crate::samples::{HeartRateSample, PaceSample, StepsSample, WorkoutMode, WorkoutSummary};
use crate::session::config::SessionConfig;
use crate::session::coordinator::{SessionCoordinator, SessionEffect};
use crate::session::metrics::LiveMetrics;
use crate::sources::{EventSink, HeartRateSource, MotionSource, PlaybackService};
use crate::zones::ZoneRange;

const SAMPLE_CHANNEL_CAPACITY: usize = 64;

/// Drives sessions over a fixed target zone. Only one session may be active
/// at a time; `start_session` while running and `stop_session` while idle are
/// no-ops.
pub struct SessionRuntime {
    heart: Box<dyn HeartRateSource>,
    motion: Box<dyn MotionSource>,
    playback: Arc<dyn PlaybackService>,
    sink: Arc<dyn EventSink>,
    zone: ZoneRange,
    config: SessionConfig,
    metrics_tx: watch::Sender<LiveMetrics>,
    active: Option<ActiveSession>,
}

struct ActiveSession {
    session_id: Uuid,
    stop_tx: oneshot::Sender<()>,
    join: JoinHandle<()>,
}

impl SessionRuntime {
    pub fn new(
        heart: Box<dyn HeartRateSource>,
        motion: Box<dyn MotionSource>,
        playback: Arc<dyn PlaybackService>,
        sink: Arc<dyn EventSink>,
        zone: ZoneRange,
        config: SessionConfig,
    ) -> Self {
        let (metrics_tx, _) = watch::channel(LiveMetrics::default());
        Self {
            heart,
            motion,
            playback,
            sink,
            zone,
            config,
            metrics_tx,
            active: None,
        }
    }

    /// Latest fused snapshot; updated after every processed sample.
    pub fn metrics(&self) -> watch::Receiver<LiveMetrics> {
        self.metrics_tx.subscribe()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Begin observing sensors and gating playback. A collaborator that fails
    /// to start is recorded and the session continues degraded.
    pub async fn start_session(&mut self, mode: WorkoutMode) {
        if self.active.is_some() {
            return;
        }
        let session_id = Uuid::new_v4();

        let (hr_tx, hr_rx) = mpsc::channel(SAMPLE_CHANNEL_CAPACITY);
        let (pace_tx, pace_rx) = mpsc::channel(SAMPLE_CHANNEL_CAPACITY);
        let (cadence_tx, cadence_rx) = mpsc::channel(SAMPLE_CHANNEL_CAPACITY);
        self.heart.observe(hr_tx);
        self.motion.observe_pace(pace_tx);
        self.motion.observe_cadence(cadence_tx);

        if let Err(error) = self.heart.start_session(mode).await {
            warn!(%error, "heart-rate session failed to start, continuing degraded");
            self.sink.record(Event::SessionError {
                message: error.to_string(),
                at: Utc::now(),
            });
        }

        let (fade_tx, fade_rx) = mpsc::channel(SAMPLE_CHANNEL_CAPACITY);
        let (stop_tx, stop_rx) = oneshot::channel();
        let mut actor = SessionActor {
            core: SessionCoordinator::new(session_id, self.zone, mode, self.config),
            playback: Arc::clone(&self.playback),
            sink: Arc::clone(&self.sink),
            metrics_tx: self.metrics_tx.clone(),
            fade_tx,
        };

        let effects = actor.core.begin(Utc::now());
        actor.apply(effects).await;

        let watchdog_interval_ms = self.config.watchdog_interval_ms;
        let join = tokio::spawn(actor.run(
            hr_rx,
            pace_rx,
            cadence_rx,
            fade_rx,
            stop_rx,
            watchdog_interval_ms,
        ));
        self.active = Some(ActiveSession {
            session_id,
            stop_tx,
            join,
        });
    }

    /// Stop observing, force the audio engine to stopped, and return the
    /// collaborator's workout summary. The actor is awaited first, so no
    /// watchdog tick or fade completion can land after teardown.
    pub async fn stop_session(&mut self) -> Option<WorkoutSummary> {
        let active = self.active.take()?;
        let _ = active.stop_tx.send(());
        let _ = active.join.await;

        self.motion.stop_observing_pace();
        self.motion.stop_observing_cadence();
        self.heart.stop_observing();

        match self.heart.end_session().await {
            Ok(summary) => {
                self.sink.record(Event::SessionEnded {
                    session_id: active.session_id,
                    summary: summary.clone(),
                    at: Utc::now(),
                });
                Some(summary)
            }
            Err(error) => {
                warn!(%error, "heart-rate session failed to end");
                self.sink.record(Event::SessionError {
                    message: error.to_string(),
                    at: Utc::now(),
                });
                None
            }
        }
    }
}

/// The single writer of session state for one session.
struct SessionActor {
    core: SessionCoordinator,
    playback: Arc<dyn PlaybackService>,
    sink: Arc<dyn EventSink>,
    metrics_tx: watch::Sender<LiveMetrics>,
    fade_tx: mpsc::Sender<u64>,
}

impl SessionActor {
    async fn run(
        mut self,
        mut hr_rx: mpsc::Receiver<HeartRateSample>,
        mut pace_rx: mpsc::Receiver<PaceSample>,
        mut cadence_rx: mpsc::Receiver<StepsSample>,
        mut fade_rx: mpsc::Receiver<u64>,
        mut stop_rx: oneshot::Receiver<()>,
        watchdog_interval_ms: u64,
    ) {
        let mut watchdog = interval(Duration::from_millis(watchdog_interval_ms));
        watchdog.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                Some(sample) = hr_rx.recv() => {
                    let effects = self.core.handle_heart_rate(sample);
                    self.apply(effects).await;
                }
                Some(sample) = pace_rx.recv() => {
                    let effects = self.core.handle_pace(sample, Utc::now());
                    self.apply(effects).await;
                }
                Some(sample) = cadence_rx.recv() => {
                    let effects = self.core.handle_cadence(sample, Utc::now());
                    self.apply(effects).await;
                }
                Some(generation) = fade_rx.recv() => {
                    let effects = self.core.complete_fade(generation, Utc::now());
                    self.apply(effects).await;
                }
                _ = watchdog.tick() => {
                    let effects = self.core.tick_watchdog(Utc::now());
                    self.apply(effects).await;
                }
                _ = &mut stop_rx => {
                    let effects = self.core.finish(Utc::now());
                    self.apply(effects).await;
                    break;
                }
            }
        }
    }

    async fn apply(&mut self, effects: Vec<SessionEffect>) {
        for effect in effects {
            match effect {
                SessionEffect::Playback(action) => self.dispatch(action).await,
                SessionEffect::ScheduleFade(fade) => {
                    let fade_tx = self.fade_tx.clone();
                    tokio::spawn(async move {
                        sleep(Duration::from_millis(fade.delay_ms)).await;
                        // Receiver gone means the session ended first.
                        let _ = fade_tx.send(fade.generation).await;
                    });
                }
                SessionEffect::Record(event) => self.sink.record(event),
            }
        }
        self.metrics_tx.send_replace(self.core.metrics().clone());
    }

    async fn dispatch(&self, action: AudioAction) {
        let result = match action {
            AudioAction::Play => self.playback.resume().await,
            AudioAction::Pause => self.playback.pause().await,
            AudioAction::FadeTo(level) => {
                // Volume levels are a presentation concern.
                debug!(level, "fade level delegated to the player surface");
                Ok(())
            }
            AudioAction::Stop => Ok(()),
        };
        if let Err(error) = result {
            warn!(%error, "playback command failed");
            self.sink.record(Event::SessionError {
                message: error.to_string(),
                at: Utc::now(),
            });
        }
    }
}
