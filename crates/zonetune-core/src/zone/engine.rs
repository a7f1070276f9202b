//! Zone classification state machine.
//!
//! The engine keeps the last N heart-rate samples and only changes state when
//! all N agree on the same side of the hysteresis-widened zone band. Mixed
//! windows straddling a boundary hold the previous state, which is what stops
//! playback from flapping when the heart rate sits on a zone edge.
//!
//! ## State Transitions
//!
//! ```text
//! Unknown -> (InZone | OutOfZone), then debounced flips between the two.
//! The sensor-gap watchdog can force OutOfZone (stale) or Unknown (lost).
//! ```
//!
//! The engine has no internal clock or thread: the caller feeds samples and
//! the session watchdog calls `handle_sensor_gap()` periodically.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::samples::HeartRateSample;
use crate::zones::ZoneRange;

/// Zone membership as seen through the debounce filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneState {
    InZone,
    OutOfZone,
    /// Initial state, and the state forced when heart-rate data is lost.
    Unknown,
}

/// Tuning knobs for the zone decision engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneEngineConfig {
    /// Margin added to both zone bounds before classifying (bpm)
    pub hysteresis_bpm: u32,
    /// Consecutive agreeing samples required before the state may change
    pub required_consecutive_samples: usize,
    /// Sample gap after which readings are too stale to trust (forces out-of-zone)
    pub gap_timeout_secs: u64,
    /// Sample gap after which the sensor is considered lost (forces unknown)
    pub max_gap_timeout_secs: u64,
}

impl Default for ZoneEngineConfig {
    fn default() -> Self {
        Self {
            hysteresis_bpm: 2,
            required_consecutive_samples: 3,
            gap_timeout_secs: 10,
            max_gap_timeout_secs: 20,
        }
    }
}

/// Debounced zone classifier over a rolling heart-rate window.
#[derive(Debug, Clone)]
pub struct ZoneDecisionEngine {
    zone: ZoneRange,
    config: ZoneEngineConfig,
    window: VecDeque<u32>,
    state: ZoneState,
}

impl ZoneDecisionEngine {
    pub fn new(zone: ZoneRange, config: ZoneEngineConfig) -> Self {
        Self {
            zone,
            config,
            window: VecDeque::with_capacity(config.required_consecutive_samples),
            state: ZoneState::Unknown,
        }
    }

    pub fn state(&self) -> ZoneState {
        self.state
    }

    pub fn zone(&self) -> ZoneRange {
        self.zone
    }

    /// Ingest one sample. Returns the new state only when it changed
    /// (edge-triggered), so callers never see duplicate notifications.
    pub fn add_sample(&mut self, sample: &HeartRateSample) -> Option<ZoneState> {
        self.window.push_back(sample.bpm);
        while self.window.len() > self.config.required_consecutive_samples {
            self.window.pop_front();
        }
        if self.window.len() < self.config.required_consecutive_samples {
            return None;
        }

        let band = self.zone.expanded(self.config.hysteresis_bpm);
        if self.window.iter().all(|&bpm| band.contains(bpm)) {
            self.set_state(ZoneState::InZone)
        } else if self.window.iter().all(|&bpm| !band.contains(bpm)) {
            self.set_state(ZoneState::OutOfZone)
        } else {
            // Mixed window straddling the band: hold the previous state.
            None
        }
    }

    /// Degrade the state when heart-rate samples have stopped arriving.
    /// Invoked by the session watchdog, not by new samples. Returns the new
    /// state only when it changed.
    pub fn handle_sensor_gap(
        &mut self,
        last_sample_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Option<ZoneState> {
        let gap_secs = (now - last_sample_at).num_seconds();
        if gap_secs >= self.config.max_gap_timeout_secs as i64 {
            self.set_state(ZoneState::Unknown)
        } else if gap_secs >= self.config.gap_timeout_secs as i64 {
            self.set_state(ZoneState::OutOfZone)
        } else {
            None
        }
    }

    fn set_state(&mut self, new_state: ZoneState) -> Option<ZoneState> {
        if self.state == new_state {
            return None;
        }
        self.state = new_state;
        Some(new_state)
    }
}
