//! Collaborator traits for sensors, playback, and event recording.
//!
//! The physical integrations (heart-rate monitor, motion provider, music
//! service, analytics backend) live outside this crate. Sample observation is
//! sender-injection: the session runtime hands each source an mpsc sender and
//! the source pushes samples into it from whatever thread or callback context
//! it owns. The runtime's actor task is the only consumer, which keeps all
//! state mutation single-writer.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::SourceError;
use crate::events::Event;
use crate::samples::{HeartRateSample, PaceSample, StepsSample, WorkoutMode, WorkoutSummary};

/// A heart-rate monitor plus its workout-session bookkeeping.
#[async_trait]
pub trait HeartRateSource: Send {
    /// Begin delivering samples into `samples` until `stop_observing`.
    fn observe(&mut self, samples: mpsc::Sender<HeartRateSample>);

    fn stop_observing(&mut self);

    async fn start_session(&mut self, mode: WorkoutMode) -> Result<(), SourceError>;

    async fn end_session(&mut self) -> Result<WorkoutSummary, SourceError>;
}

/// A pace and cadence provider.
pub trait MotionSource: Send {
    fn observe_pace(&mut self, samples: mpsc::Sender<PaceSample>);

    fn stop_observing_pace(&mut self);

    fn observe_cadence(&mut self, samples: mpsc::Sender<StepsSample>);

    fn stop_observing_cadence(&mut self);
}

/// The music playback collaborator. Fade levels are a presentation concern
/// and are not part of this contract.
#[async_trait]
pub trait PlaybackService: Send + Sync {
    async fn resume(&self) -> Result<(), SourceError>;

    async fn pause(&self) -> Result<(), SourceError>;
}

/// Fire-and-forget event recording. Implementations must not block.
pub trait EventSink: Send + Sync {
    fn record(&self, event: Event);
}
