//! Session configuration.

use serde::{Deserialize, Serialize};

use crate::zone::ZoneEngineConfig;

/// Tuning for one session. Immutable after session start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Minimum pace for the effort gate in outdoor mode (km/h)
    pub minimum_pace_kmh: f64,
    /// Minimum cadence for the effort gate in treadmill mode (steps/min)
    pub minimum_cadence_spm: u32,
    /// Rolling window for pace and cadence averaging (seconds)
    pub pace_window_secs: u64,
    /// Whether the effort gate applies at all
    pub require_minimum_effort: bool,
    /// Fade duration for the audio policy engine (milliseconds)
    pub fade_duration_ms: u64,
    /// Watchdog poll interval (milliseconds)
    pub watchdog_interval_ms: u64,
    /// Zone decision engine tuning
    pub zone: ZoneEngineConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            minimum_pace_kmh: 2.5,
            minimum_cadence_spm: 60,
            pace_window_secs: 5,
            require_minimum_effort: true,
            fade_duration_ms: 800,
            watchdog_interval_ms: 1000,
            zone: ZoneEngineConfig::default(),
        }
    }
}
