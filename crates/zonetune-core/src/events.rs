//! Session events.
//!
//! Every externally visible state change produces an Event. The session
//! runtime hands them to the event-sink collaborator; the core never records
//! anything itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audio::AudioEngineState;
use crate::samples::{WorkoutMode, WorkoutSummary};
use crate::zone::ZoneState;

/// Why the playback verdict changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictReason {
    InZone,
    OutOfZone,
    PaceFailed,
    SensorLost,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        session_id: Uuid,
        mode: WorkoutMode,
        at: DateTime<Utc>,
    },
    /// Playback state transition record, emitted whenever the combined
    /// zone+effort verdict moves the audio engine.
    PlaybackChanged {
        from: AudioEngineState,
        to: AudioEngineState,
        reason: VerdictReason,
        at: DateTime<Utc>,
    },
    ZoneChanged {
        state: ZoneState,
        at: DateTime<Utc>,
    },
    SessionEnded {
        session_id: Uuid,
        summary: WorkoutSummary,
        at: DateTime<Utc>,
    },
    /// A collaborator call failed; the session continues degraded.
    SessionError {
        message: String,
        at: DateTime<Utc>,
    },
}
