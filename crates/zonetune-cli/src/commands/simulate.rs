//! Synthetic workout replay against the real session runtime.
//!
//! Drives scripted heart-rate and motion streams through the decision core
//! with in-process collaborators that print every event and playback command.
//! The script ramps up into the target zone, overshoots it, then goes silent
//! so the sensor watchdog can be observed degrading the session.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use clap::Args;
use tokio::sync::mpsc;

use zonetune_core::{
    Event, EventSink, HRZone, HeartRateSample, HeartRateSource, MotionSource, PaceSample,
    PlaybackService, SessionConfig, SessionRuntime, SourceError, StepsSample, UserSettings,
    WorkoutMode, WorkoutSummary, ZoneEngineConfig,
};

#[derive(Args)]
pub struct SimulateArgs {
    /// Maximum heart rate in bpm (overrides the settings file)
    #[arg(long)]
    max_hr: Option<u32>,
    /// Target zone id (1-5)
    #[arg(long)]
    zone: Option<u8>,
    /// Simulated session length in seconds
    #[arg(long, default_value = "24")]
    duration_secs: u64,
    /// Milliseconds between synthetic samples
    #[arg(long, default_value = "250")]
    tick_ms: u64,
    /// Gate on cadence instead of pace
    #[arg(long)]
    treadmill: bool,
    /// Accelerated stale-sensor timeout for the demo (seconds)
    #[arg(long, default_value = "3")]
    gap_timeout_secs: u64,
    /// Accelerated sensor-lost timeout for the demo (seconds)
    #[arg(long, default_value = "6")]
    max_gap_timeout_secs: u64,
    /// Settings file supplying max HR and zone when flags are absent
    #[arg(long, default_value = "zonetune.toml")]
    config: std::path::PathBuf,
}

pub fn run(args: SimulateArgs) -> Result<(), Box<dyn std::error::Error>> {
    tokio::runtime::Runtime::new()?.block_on(simulate(args))
}

async fn simulate(args: SimulateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let settings: UserSettings = super::config::load_or_default(&args.config)?;
    let max_hr = args.max_hr.unwrap_or(settings.max_heart_rate);
    let zone_id = args.zone.unwrap_or(settings.selected_zone_id);
    let zone = HRZone::by_id(zone_id)
        .ok_or_else(|| format!("unknown zone id: {zone_id}"))?;
    let range = zone.bpm_range(max_hr);

    let mode = if args.treadmill {
        WorkoutMode::Treadmill
    } else {
        WorkoutMode::Outdoor
    };
    let config = SessionConfig {
        zone: ZoneEngineConfig {
            gap_timeout_secs: args.gap_timeout_secs,
            max_gap_timeout_secs: args.max_gap_timeout_secs,
            ..ZoneEngineConfig::default()
        },
        ..SessionConfig::default()
    };

    println!(
        "simulating {:?} session, target {} ({}-{} bpm)",
        mode, zone.name, range.lower_bpm, range.upper_bpm
    );

    let heart = SimHeartRate::default();
    let motion = SimMotion::default();
    let mut runtime = SessionRuntime::new(
        Box::new(heart.clone()),
        Box::new(motion.clone()),
        Arc::new(PrintPlayback),
        Arc::new(PrintSink),
        range,
        config,
    );
    runtime.start_session(mode).await;

    let ticks = args.duration_secs * 1000 / args.tick_ms;
    for tick in 0..ticks {
        let progress = tick as f64 / ticks as f64;
        // Warm-up below the zone, hold inside it, overshoot, then go silent.
        let bpm = if progress < 0.25 {
            range.lower_bpm.saturating_sub(30) + (25.0 * progress * 4.0) as u32
        } else if progress < 0.65 {
            (range.lower_bpm + range.upper_bpm) / 2
        } else if progress < 0.80 {
            range.upper_bpm + 15
        } else {
            // Sensor dropout: stop sending and let the watchdog take over.
            tokio::time::sleep(tokio::time::Duration::from_millis(args.tick_ms)).await;
            continue;
        };

        heart.send(HeartRateSample::new(bpm, Utc::now())).await;
        if args.treadmill {
            motion.send_cadence(StepsSample::new(150, Utc::now())).await;
        } else {
            motion.send_pace(PaceSample::new(Some(1.6), Utc::now())).await;
        }
        tokio::time::sleep(tokio::time::Duration::from_millis(args.tick_ms)).await;
    }

    let metrics = runtime.metrics().borrow().clone();
    println!("final metrics: {}", serde_json::to_string(&metrics)?);

    if let Some(summary) = runtime.stop_session().await {
        println!("summary: {}", serde_json::to_string(&summary)?);
    }
    Ok(())
}

#[derive(Clone)]
struct Slot<T>(Arc<Mutex<Option<mpsc::Sender<T>>>>);

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self(Arc::new(Mutex::new(None)))
    }
}

impl<T> Slot<T> {
    fn put(&self, tx: mpsc::Sender<T>) {
        *self.0.lock().unwrap() = Some(tx);
    }

    fn clear(&self) {
        *self.0.lock().unwrap() = None;
    }

    async fn send(&self, value: T) {
        let tx = self.0.lock().unwrap().clone();
        if let Some(tx) = tx {
            let _ = tx.send(value).await;
        }
    }
}

#[derive(Clone, Default)]
struct SimHeartRate {
    samples: Slot<HeartRateSample>,
    sent: Arc<Mutex<Vec<u32>>>,
    started: Arc<Mutex<Option<chrono::DateTime<Utc>>>>,
}

impl SimHeartRate {
    async fn send(&self, sample: HeartRateSample) {
        self.sent.lock().unwrap().push(sample.bpm);
        self.samples.send(sample).await;
    }
}

#[async_trait]
impl HeartRateSource for SimHeartRate {
    fn observe(&mut self, samples: mpsc::Sender<HeartRateSample>) {
        self.samples.put(samples);
    }

    fn stop_observing(&mut self) {
        self.samples.clear();
    }

    async fn start_session(&mut self, _mode: WorkoutMode) -> Result<(), SourceError> {
        *self.started.lock().unwrap() = Some(Utc::now());
        Ok(())
    }

    async fn end_session(&mut self) -> Result<WorkoutSummary, SourceError> {
        let started = self.started.lock().unwrap().take();
        let duration_secs = started
            .map(|t| (Utc::now() - t).num_seconds().max(0) as u64)
            .unwrap_or(0);
        let sent = self.sent.lock().unwrap();
        let avg = (!sent.is_empty())
            .then(|| (sent.iter().map(|&b| b as u64).sum::<u64>() / sent.len() as u64) as u32);
        Ok(WorkoutSummary {
            duration_secs,
            avg_heart_rate: avg,
            max_heart_rate: sent.iter().max().copied(),
            distance_meters: None,
            steps: None,
            time_in_zone_secs: 0,
        })
    }
}

#[derive(Clone, Default)]
struct SimMotion {
    pace: Slot<PaceSample>,
    cadence: Slot<StepsSample>,
}

impl SimMotion {
    async fn send_pace(&self, sample: PaceSample) {
        self.pace.send(sample).await;
    }

    async fn send_cadence(&self, sample: StepsSample) {
        self.cadence.send(sample).await;
    }
}

impl MotionSource for SimMotion {
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

struct PrintPlayback;

#[async_trait]
impl PlaybackService for PrintPlayback {
    async fn resume(&self) -> Result<(), SourceError> {
        println!(">> player resume");
        Ok(())
    }

    async fn pause(&self) -> Result<(), SourceError> {
        println!(">> player pause");
        Ok(())
    }
}

struct PrintSink;

impl EventSink for PrintSink {
    fn record(&self, event: Event) {
        if let Ok(json) = serde_json::to_string(&event) {
            println!("event: {json}");
        }
    }
}
