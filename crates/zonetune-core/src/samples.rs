//! Sensor sample and session value types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One heart-rate sensor event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeartRateSample {
    pub bpm: u32,
    pub at: DateTime<Utc>,
}

impl HeartRateSample {
    pub fn new(bpm: u32, at: DateTime<Utc>) -> Self {
        Self { bpm, at }
    }
}

/// One pace sensor event. A missing speed models a sensor with no velocity lock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaceSample {
    pub speed_mps: Option<f64>,
    pub at: DateTime<Utc>,
}

impl PaceSample {
    pub fn new(speed_mps: Option<f64>, at: DateTime<Utc>) -> Self {
        Self { speed_mps, at }
    }
}

/// One cadence sensor event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepsSample {
    pub steps_per_minute: u32,
    pub at: DateTime<Utc>,
}

impl StepsSample {
    pub fn new(steps_per_minute: u32, at: DateTime<Utc>) -> Self {
        Self { steps_per_minute, at }
    }
}

/// Workout mode, selecting which effort signal gates playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutMode {
    /// Pace-gated (GPS speed)
    Outdoor,
    /// Cadence-gated (steps per minute)
    Treadmill,
}

/// Summary returned by the heart-rate collaborator when a session ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSummary {
    pub duration_secs: u64,
    pub avg_heart_rate: Option<u32>,
    pub max_heart_rate: Option<u32>,
    pub distance_meters: Option<f64>,
    pub steps: Option<u64>,
    pub time_in_zone_secs: u64,
}

/// User-facing settings, supplied programmatically at session start.
/// Persistence is an external concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    pub max_heart_rate: u32,
    pub selected_zone_id: u8,
    pub require_minimum_effort: bool,
    pub minimum_pace_kmh: f64,
    pub minimum_cadence_spm: u32,
    pub workout_mode: WorkoutMode,
}

impl UserSettings {
    /// Defaults for a user of the given age, estimating max HR as 220 - age
    /// with a floor of 150.
    pub fn default_for_age(age: u32) -> Self {
        let estimated_max = 220u32.saturating_sub(age).max(150);
        Self {
            max_heart_rate: estimated_max,
            selected_zone_id: 2,
            require_minimum_effort: true,
            minimum_pace_kmh: 2.5,
            minimum_cadence_spm: 60,
            workout_mode: WorkoutMode::Outdoor,
        }
    }
}
