//! Live session metrics snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::audio::AudioEngineState;
use crate::zone::ZoneState;

/// Last-known fused state, rebuilt on every sample. Read-only to consumers;
/// `playback_state` always mirrors the audio policy engine after any
/// transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveMetrics {
    pub heart_rate_bpm: Option<u32>,
    pub pace_kmh: Option<f64>,
    pub cadence_spm: Option<u32>,
    pub zone_state: ZoneState,
    pub playback_state: AudioEngineState,
    pub last_sample_at: Option<DateTime<Utc>>,
}

impl Default for LiveMetrics {
    fn default() -> Self {
        Self {
            heart_rate_bpm: None,
            pace_kmh: None,
            cadence_spm: None,
            zone_state: ZoneState::Unknown,
            playback_state: AudioEngineState::Stopped,
            last_sample_at: None,
        }
    }
}
