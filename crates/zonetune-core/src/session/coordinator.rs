//! Session coordination core.
//!
//! `SessionCoordinator` is the pure, single-writer heart of a session: it
//! fuses heart-rate, pace, and cadence samples, asks the zone engine for a
//! classification, applies the effort gate, and drives the audio policy
//! engine. It never touches a clock, a channel, or a collaborator — every
//! call returns the [`SessionEffect`]s the async runtime must execute, which
//! keeps the whole decision path deterministic and replayable.
//!
//! Within one sample's processing the order is fixed: zone re-evaluation,
//! then the effort gate, then the audio-policy call. A single sample can
//! therefore never produce two contradictory playback directives.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::audio::{AudioAction, AudioPolicyEngine, PauseCause, PauseReason, PolicyUpdate, ScheduledFade};
use crate::events::{Event, VerdictReason};
use crate::samples::{HeartRateSample, PaceSample, StepsSample, WorkoutMode};
use crate::session::config::SessionConfig;
use crate::session::metrics::LiveMetrics;
use crate::zone::{ZoneDecisionEngine, ZoneState};
use crate::zones::ZoneRange;

/// Pace readings below this are GPS/accelerometer noise, not movement.
const MIN_VALID_SPEED_MPS: f64 = 0.5;

/// Duck volume while heart-rate data is only transiently missing.
const SENSOR_LOST_VOLUME_FLOOR: f64 = 0.2;

const MPS_TO_KMH: f64 = 3.6;

/// A directive the session runtime must execute on the core's behalf.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEffect {
    /// Deliver an action to the playback collaborator
    Playback(AudioAction),
    /// Schedule a cancellable fade completion
    ScheduleFade(ScheduledFade),
    /// Hand an event to the event sink
    Record(Event),
}

/// Pure sample-fusion and verdict core for one session.
#[derive(Debug)]
pub struct SessionCoordinator {
    session_id: Uuid,
    mode: WorkoutMode,
    config: SessionConfig,
    zone_engine: ZoneDecisionEngine,
    audio: AudioPolicyEngine,
    metrics: LiveMetrics,
    last_heart_rate_at: Option<DateTime<Utc>>,
    pace_window: VecDeque<PaceSample>,
    cadence_window: VecDeque<StepsSample>,
    last_reason: Option<VerdictReason>,
}

impl SessionCoordinator {
    pub fn new(session_id: Uuid, zone: ZoneRange, mode: WorkoutMode, config: SessionConfig) -> Self {
        Self {
            session_id,
            mode,
            config,
            zone_engine: ZoneDecisionEngine::new(zone, config.zone),
            audio: AudioPolicyEngine::new(config.fade_duration_ms),
            metrics: LiveMetrics::default(),
            last_heart_rate_at: None,
            pace_window: VecDeque::new(),
            cadence_window: VecDeque::new(),
            last_reason: None,
        }
    }

    pub fn metrics(&self) -> &LiveMetrics {
        &self.metrics
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Open the session: audio engine moves to waiting-for-zone.
    pub fn begin(&mut self, now: DateTime<Utc>) -> Vec<SessionEffect> {
        let mut effects = vec![SessionEffect::Record(Event::SessionStarted {
            session_id: self.session_id,
            mode: self.mode,
            at: now,
        })];
        let update = self.audio.start_session();
        self.apply_update(update, None, now, &mut effects);
        effects
    }

    /// Close the session: audio engine to stopped, pending fades cancelled.
    pub fn finish(&mut self, now: DateTime<Utc>) -> Vec<SessionEffect> {
        let mut effects = Vec::new();
        let update = self.audio.stop_session();
        self.apply_update(update, None, now, &mut effects);
        effects
    }

    pub fn handle_heart_rate(&mut self, sample: HeartRateSample) -> Vec<SessionEffect> {
        let mut effects = Vec::new();
        self.last_heart_rate_at = Some(sample.at);
        if let Some(state) = self.zone_engine.add_sample(&sample) {
            effects.push(SessionEffect::Record(Event::ZoneChanged {
                state,
                at: sample.at,
            }));
        }
        self.metrics.heart_rate_bpm = Some(sample.bpm);
        self.metrics.last_sample_at = Some(sample.at);
        self.evaluate(sample.at, &mut effects);
        effects
    }

    pub fn handle_pace(&mut self, sample: PaceSample, now: DateTime<Utc>) -> Vec<SessionEffect> {
        let mut effects = Vec::new();
        self.pace_window.push_back(sample);
        let cutoff = now - Duration::seconds(self.config.pace_window_secs as i64);
        self.pace_window.retain(|s| s.at >= cutoff);

        let speeds: Vec<f64> = self
            .pace_window
            .iter()
            .filter_map(|s| s.speed_mps)
            .filter(|&v| v >= MIN_VALID_SPEED_MPS)
            .collect();
        self.metrics.pace_kmh = if speeds.is_empty() {
            None
        } else {
            Some(speeds.iter().sum::<f64>() / speeds.len() as f64 * MPS_TO_KMH)
        };

        self.evaluate(now, &mut effects);
        effects
    }

    pub fn handle_cadence(&mut self, sample: StepsSample, now: DateTime<Utc>) -> Vec<SessionEffect> {
        let mut effects = Vec::new();
        self.cadence_window.push_back(sample);
        let cutoff = now - Duration::seconds(self.config.pace_window_secs as i64);
        self.cadence_window.retain(|s| s.at >= cutoff);

        self.metrics.cadence_spm = if self.cadence_window.is_empty() {
            None
        } else {
            let sum: u64 = self.cadence_window.iter().map(|s| s.steps_per_minute as u64).sum();
            Some((sum as f64 / self.cadence_window.len() as f64).round() as u32)
        };

        self.evaluate(now, &mut effects);
        effects
    }

    /// Watchdog poll: degrade the zone state when heart-rate samples have
    /// stopped arriving. Does nothing before the first sample.
    pub fn tick_watchdog(&mut self, now: DateTime<Utc>) -> Vec<SessionEffect> {
        let Some(last) = self.last_heart_rate_at else {
            return Vec::new();
        };
        let mut effects = Vec::new();
        if let Some(state) = self.zone_engine.handle_sensor_gap(last, now) {
            effects.push(SessionEffect::Record(Event::ZoneChanged { state, at: now }));
            self.evaluate(now, &mut effects);
        }
        effects
    }

    /// A scheduled fade elapsed. Stale generations are no-ops.
    pub fn complete_fade(&mut self, generation: u64, now: DateTime<Utc>) -> Vec<SessionEffect> {
        let mut effects = Vec::new();
        let update = self.audio.complete_fade(generation);
        self.apply_update(update, self.last_reason, now, &mut effects);
        effects
    }

    /// Combined verdict: zone gate first, then the effort gate, then one
    /// audio-policy call.
    fn evaluate(&mut self, now: DateTime<Utc>, effects: &mut Vec<SessionEffect>) {
        self.metrics.zone_state = self.zone_engine.state();
        let effort_ok = self.effort_gate_satisfied();

        let (update, reason) = match (self.zone_engine.state(), effort_ok) {
            (ZoneState::InZone, true) => (self.audio.request_play(), VerdictReason::InZone),
            (ZoneState::Unknown, _) => (
                self.audio.request_pause(PauseReason::soft(
                    PauseCause::SensorLost,
                    SENSOR_LOST_VOLUME_FLOOR,
                )),
                VerdictReason::SensorLost,
            ),
            (ZoneState::InZone, false) => (
                self.audio
                    .request_pause(PauseReason::hard(PauseCause::PaceRequirementFailed)),
                VerdictReason::PaceFailed,
            ),
            (ZoneState::OutOfZone, _) => (
                self.audio.request_pause(PauseReason::hard(PauseCause::OutOfZone)),
                VerdictReason::OutOfZone,
            ),
        };

        self.last_reason = Some(reason);
        self.apply_update(update, Some(reason), now, effects);
    }

    /// The effort gate: satisfied when disabled, otherwise requires a recent
    /// averaged pace (outdoor) or cadence (treadmill) above the minimum.
    /// A missing reading fails the gate, never defaults to satisfied.
    fn effort_gate_satisfied(&self) -> bool {
        if !self.config.require_minimum_effort {
            return true;
        }
        match self.mode {
            WorkoutMode::Outdoor => self
                .metrics
                .pace_kmh
                .is_some_and(|pace| pace >= self.config.minimum_pace_kmh),
            WorkoutMode::Treadmill => self
                .metrics
                .cadence_spm
                .is_some_and(|spm| spm >= self.config.minimum_cadence_spm),
        }
    }

    fn apply_update(
        &mut self,
        update: PolicyUpdate,
        reason: Option<VerdictReason>,
        now: DateTime<Utc>,
        effects: &mut Vec<SessionEffect>,
    ) {
        for transition in &update.transitions {
            if let Some(reason) = reason {
                effects.push(SessionEffect::Record(Event::PlaybackChanged {
                    from: transition.from,
                    to: transition.to,
                    reason,
                    at: now,
                }));
            }
        }
        for action in update.actions {
            effects.push(SessionEffect::Playback(action));
        }
        if let Some(fade) = update.fade {
            effects.push(SessionEffect::ScheduleFade(fade));
        }
        // Invariant: the snapshot always mirrors the audio engine.
        self.metrics.playback_state = self.audio.state();
    }
}
