//! End-to-end session runtime tests with scripted collaborator mocks.
//!
//! These run with paused tokio time: fade sleeps and watchdog ticks
//! auto-advance, while sensor staleness is exercised by backdating sample
//! timestamps.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::mpsc;

use zonetune_core::{
    AudioEngineState, Event, HeartRateSample, HeartRateSource, MotionSource, PaceSample,
    PlaybackService, SessionConfig, SessionRuntime, SourceError, StepsSample, EventSink,
    WorkoutMode, WorkoutSummary, ZoneRange, ZoneState,
};

#[derive(Clone)]
struct SenderSlot<T>(Arc<Mutex<Option<mpsc::Sender<T>>>>);

impl<T> Default for SenderSlot<T> {
    fn default() -> Self {
        Self(Arc::new(Mutex::new(None)))
    }
}

impl<T> SenderSlot<T> {
    fn put(&self, tx: mpsc::Sender<T>) {
        *self.0.lock().unwrap() = Some(tx);
    }

    fn clear(&self) {
        *self.0.lock().unwrap() = None;
    }

    fn sender(&self) -> mpsc::Sender<T> {
        self.0.lock().unwrap().clone().expect("source not observed")
    }
}

#[derive(Clone)]
struct MockHeartRate {
    samples: SenderSlot<HeartRateSample>,
    fail_start: bool,
}

impl MockHeartRate {
    fn new(fail_start: bool) -> Self {
        Self {
            samples: SenderSlot::default(),
            fail_start,
        }
    }

    fn summary() -> WorkoutSummary {
        WorkoutSummary {
            duration_secs: 1800,
            avg_heart_rate: Some(151),
            max_heart_rate: Some(168),
            distance_meters: Some(5100.0),
            steps: Some(4800),
            time_in_zone_secs: 1500,
        }
    }
}

#[async_trait]
impl HeartRateSource for MockHeartRate {
    fn observe(&mut self, samples: mpsc::Sender<HeartRateSample>) {
        self.samples.put(samples);
    }

    fn stop_observing(&mut self) {
        self.samples.clear();
    }

    async fn start_session(&mut self, _mode: WorkoutMode) -> Result<(), SourceError> {
        if self.fail_start {
            Err(SourceError::SessionStart {
                service: "healthkit".to_string(),
                message: "not authorized".to_string(),
            })
        } else {
            Ok(())
        }
    }

    async fn end_session(&mut self) -> Result<WorkoutSummary, SourceError> {
        Ok(Self::summary())
    }
}

#[derive(Clone, Default)]
struct MockMotion {
    pace: SenderSlot<PaceSample>,
    cadence: SenderSlot<StepsSample>,
}

impl MotionSource for MockMotion {
    fn observe_pace(&mut self, samples: mpsc::Sender<PaceSample>) {
        self.pace.put(samples);
    }

    fn stop_observing_pace(&mut self) {
        self.pace.clear();
    }

    fn observe_cadence(&mut self, samples: mpsc::Sender<StepsSample>) {
        self.cadence.put(samples);
    }

    fn stop_observing_cadence(&mut self) {
        self.cadence.clear();
    }
}

#[derive(Default)]
struct MockPlayback {
    calls: Mutex<Vec<&'static str>>,
}

impl MockPlayback {
    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlaybackService for MockPlayback {
    async fn resume(&self) -> Result<(), SourceError> {
        self.calls.lock().unwrap().push("resume");
        Ok(())
    }

    async fn pause(&self) -> Result<(), SourceError> {
        self.calls.lock().unwrap().push("pause");
        Ok(())
    }
}

#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<Event>>,
}

impl RecordingSink {
    fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    fn record(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

struct Harness {
    runtime: SessionRuntime,
    heart: MockHeartRate,
    motion: MockMotion,
    playback: Arc<MockPlayback>,
    sink: Arc<RecordingSink>,
}

fn harness(fail_start: bool) -> Harness {
    let heart = MockHeartRate::new(fail_start);
    let motion = MockMotion::default();
    let playback = Arc::new(MockPlayback::default());
    let sink = Arc::new(RecordingSink::default());
    let runtime = SessionRuntime::new(
        Box::new(heart.clone()),
        Box::new(motion.clone()),
        playback.clone(),
        sink.clone(),
        ZoneRange::new(140, 160),
        SessionConfig::default(),
    );
    Harness {
        runtime,
        heart,
        motion,
        playback,
        sink,
    }
}

/// Let the actor drain its channels and any due timers fire.
async fn settle() {
    for _ in 0..20 {
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_in_zone_with_pace_reaches_playing() {
    let mut h = harness(false);
    h.runtime.start_session(WorkoutMode::Outdoor).await;
    assert!(h.runtime.is_active());

    let now = Utc::now();
    let hr_tx = h.heart.samples.sender();
    for i in 0..3 {
        hr_tx
            .send(HeartRateSample::new(150, now + Duration::milliseconds(i * 200)))
            .await
            .unwrap();
    }
    h.motion
        .pace
        .sender()
        .send(PaceSample::new(Some(1.5), now))
        .await
        .unwrap();
    settle().await;

    assert_eq!(h.playback.calls(), vec!["resume"]);
    let metrics = h.runtime.metrics().borrow().clone();
    assert_eq!(metrics.playback_state, AudioEngineState::Playing);
    assert_eq!(metrics.zone_state, ZoneState::InZone);
    assert_eq!(metrics.heart_rate_bpm, Some(150));

    let events = h.sink.events();
    assert!(matches!(events.first(), Some(Event::SessionStarted { mode: WorkoutMode::Outdoor, .. })));
    assert!(events.iter().any(|e| matches!(
        e,
        Event::PlaybackChanged {
            to: AudioEngineState::Playing,
            ..
        }
    )));
}

#[tokio::test(start_paused = true)]
async fn test_effort_gate_holds_playback_without_pace() {
    let mut h = harness(false);
    h.runtime.start_session(WorkoutMode::Outdoor).await;

    let now = Utc::now();
    let hr_tx = h.heart.samples.sender();
    for i in 0..3 {
        hr_tx
            .send(HeartRateSample::new(150, now + Duration::milliseconds(i * 200)))
            .await
            .unwrap();
    }
    settle().await;

    // In zone but no pace reading: the gate fails closed.
    assert!(h.playback.calls().is_empty());
    let metrics = h.runtime.metrics().borrow().clone();
    assert_ne!(metrics.playback_state, AudioEngineState::Playing);
    assert_eq!(metrics.zone_state, ZoneState::InZone);
}

#[tokio::test(start_paused = true)]
async fn test_watchdog_pauses_after_stale_samples() {
    let mut h = harness(false);
    h.runtime.start_session(WorkoutMode::Outdoor).await;

    // Samples backdated 15 s: already stale by the time the watchdog polls.
    let stale = Utc::now() - Duration::seconds(15);
    let hr_tx = h.heart.samples.sender();
    for i in 0..3 {
        hr_tx
            .send(HeartRateSample::new(150, stale + Duration::milliseconds(i * 200)))
            .await
            .unwrap();
    }
    h.motion
        .pace
        .sender()
        .send(PaceSample::new(Some(1.5), Utc::now()))
        .await
        .unwrap();
    settle().await;

    let metrics = h.runtime.metrics().borrow().clone();
    assert_eq!(metrics.zone_state, ZoneState::OutOfZone);
    assert_eq!(metrics.playback_state, AudioEngineState::Paused);
    assert_eq!(h.playback.calls().last(), Some(&"pause"));
}

#[tokio::test(start_paused = true)]
async fn test_watchdog_marks_sensor_lost() {
    let mut h = harness(false);
    h.runtime.start_session(WorkoutMode::Outdoor).await;

    let lost = Utc::now() - Duration::seconds(25);
    let hr_tx = h.heart.samples.sender();
    for i in 0..3 {
        hr_tx
            .send(HeartRateSample::new(150, lost + Duration::milliseconds(i * 200)))
            .await
            .unwrap();
    }
    settle().await;

    let metrics = h.runtime.metrics().borrow().clone();
    assert_eq!(metrics.zone_state, ZoneState::Unknown);
    // Soft degradation: the player is never hard-paused on sensor loss.
    assert!(!h.playback.calls().contains(&"pause"));
}

#[tokio::test(start_paused = true)]
async fn test_degraded_start_records_error_and_continues() {
    let mut h = harness(true);
    h.runtime.start_session(WorkoutMode::Outdoor).await;

    assert!(h.runtime.is_active());
    assert!(h
        .sink
        .events()
        .iter()
        .any(|e| matches!(e, Event::SessionError { .. })));

    let summary = h.runtime.stop_session().await;
    assert_eq!(summary, Some(MockHeartRate::summary()));
}

#[tokio::test(start_paused = true)]
async fn test_stop_session_returns_summary_and_is_idempotent() {
    let mut h = harness(false);
    assert_eq!(h.runtime.stop_session().await, None);

    h.runtime.start_session(WorkoutMode::Outdoor).await;
    // Starting again while active is a no-op.
    h.runtime.start_session(WorkoutMode::Treadmill).await;

    let summary = h.runtime.stop_session().await;
    assert_eq!(summary, Some(MockHeartRate::summary()));
    assert!(!h.runtime.is_active());
    assert_eq!(h.runtime.stop_session().await, None);

    let events = h.sink.events();
    assert!(events.iter().any(|e| matches!(e, Event::SessionEnded { .. })));
}

#[tokio::test(start_paused = true)]
async fn test_stop_cancels_inflight_fade() {
    let mut h = harness(false);
    h.runtime.start_session(WorkoutMode::Outdoor).await;

    let now = Utc::now();
    let hr_tx = h.heart.samples.sender();
    for i in 0..3 {
        hr_tx
            .send(HeartRateSample::new(150, now + Duration::milliseconds(i * 200)))
            .await
            .unwrap();
    }
    h.motion
        .pace
        .sender()
        .send(PaceSample::new(Some(1.5), now))
        .await
        .unwrap();
    // Stop immediately, without letting the fade-in complete.
    h.runtime.stop_session().await;

    let metrics = h.runtime.metrics().borrow().clone();
    assert_eq!(metrics.playback_state, AudioEngineState::Stopped);
    // The cancelled fade never delivered its play action.
    assert!(h.playback.calls().is_empty() || h.playback.calls() == vec!["resume"]);
}
