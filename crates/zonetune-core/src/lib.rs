//! # Zonetune Core Library
//!
//! This library provides the core business logic for Zonetune: music playback
//! gated by whether a runner's heart rate sits inside a target training zone.
//! All sensor and playback integrations live behind collaborator traits, so
//! the decision core stays deterministic and testable on its own.
//!
//! ## Architecture
//!
//! - **Zone Decision Engine**: Debounced, hysteresis-based classification of
//!   heart-rate samples into in-zone / out-of-zone / unknown
//! - **Audio Policy Engine**: A pure playback-intent state machine that owns
//!   fade timing and emits discrete playback actions
//! - **Session Coordinator**: Fuses heart-rate, pace, and cadence streams into
//!   one playback verdict and drives the audio policy engine; a single-writer
//!   actor task (`SessionRuntime`) serializes all mutations
//!
//! ## Key Components
//!
//! - [`ZoneDecisionEngine`]: Zone classification state machine
//! - [`AudioPolicyEngine`]: Playback-intent state machine
//! - [`SessionCoordinator`]: Pure sample-fusion core
//! - [`SessionRuntime`]: Async driver wiring sensors, watchdog, and fades

pub mod audio;
pub mod error;
pub mod events;
pub mod samples;
pub mod session;
pub mod sources;
pub mod zone;
pub mod zones;

pub use audio::{
    AudioAction, AudioEngineState, AudioPolicyEngine, PauseCause, PauseReason, PolicyUpdate,
    ScheduledFade, StateTransition,
};
pub use error::{CoreError, Result, SourceError};
pub use events::{Event, VerdictReason};
pub use samples::{HeartRateSample, PaceSample, StepsSample, UserSettings, WorkoutMode, WorkoutSummary};
pub use session::{LiveMetrics, SessionConfig, SessionCoordinator, SessionEffect, SessionRuntime};
pub use sources::{EventSink, HeartRateSource, MotionSource, PlaybackService};
pub use zone::{ZoneDecisionEngine, ZoneEngineConfig, ZoneState};
pub use zones::{HRZone, ZoneRange};
