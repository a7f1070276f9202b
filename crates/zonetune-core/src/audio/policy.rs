//! Audio policy state machine.
//!
//! The engine is a pure state machine over playback intent. It never touches
//! a player or a clock: each command returns a [`PolicyUpdate`] describing the
//! transitions taken, the actions to deliver to the playback collaborator,
//! and, for fades, a generation-keyed completion the caller must schedule.
//!
//! ## State Transitions
//!
//! ```text
//! Stopped -> WaitingForZone -> FadingIn -> Playing
//!                 ^                            |
//!                 +------- FadingOut <---------+
//!                 |            |
//!                 +-- soft     +-- hard --> Paused
//! ```
//!
//! A fade completion is only honored when its generation matches the pending
//! one, so a contradicting request issued mid-fade atomically invalidates the
//! stale continuation and a superseded fade can never resurrect a transition.

use serde::{Deserialize, Serialize};

/// Playback-intent states. Single owner: [`AudioPolicyEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioEngineState {
    Stopped,
    WaitingForZone,
    FadingIn,
    Playing,
    FadingOut,
    Paused,
}

/// Discrete actions delivered to the playback collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioAction {
    Play,
    Pause,
    FadeTo(f64),
    Stop,
}

/// Why playback is being receded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PauseCause {
    OutOfZone,
    PaceRequirementFailed,
    SensorLost,
    UserPaused,
}

/// A pause request, carrying enough information to choose between a hard
/// pause and a soft volume-reduced hold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PauseReason {
    pub cause: PauseCause,
    pub full_pause: bool,
    /// Fade target volume (0.0-1.0)
    pub volume_floor: f64,
}

impl PauseReason {
    /// A hard pause: fade to silence, then pause the player.
    pub fn hard(cause: PauseCause) -> Self {
        Self {
            cause,
            full_pause: true,
            volume_floor: 0.0,
        }
    }

    /// A soft hold: duck to `volume_floor` without pausing the player.
    pub fn soft(cause: PauseCause, volume_floor: f64) -> Self {
        Self {
            cause,
            full_pause: false,
            volume_floor,
        }
    }
}

/// One completed state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTransition {
    pub from: AudioEngineState,
    pub to: AudioEngineState,
}

/// A fade completion the caller must schedule. Delivering it back via
/// [`AudioPolicyEngine::complete_fade`] with a stale generation is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledFade {
    pub generation: u64,
    pub delay_ms: u64,
}

/// Everything one command produced.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PolicyUpdate {
    pub transitions: Vec<StateTransition>,
    pub actions: Vec<AudioAction>,
    pub fade: Option<ScheduledFade>,
}

impl PolicyUpdate {
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty() && self.actions.is_empty() && self.fade.is_none()
    }
}

/// Where a pending fade lands once its delay elapses.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingFade {
    generation: u64,
    target: AudioEngineState,
    completion_action: Option<AudioAction>,
}

/// Pure playback-intent state machine with cancellable, generation-keyed
/// fades.
#[derive(Debug, Clone)]
pub struct AudioPolicyEngine {
    state: AudioEngineState,
    fade_duration_ms: u64,
    generation: u64,
    pending: Option<PendingFade>,
}

impl AudioPolicyEngine {
    pub fn new(fade_duration_ms: u64) -> Self {
        Self {
            state: AudioEngineState::Stopped,
            fade_duration_ms,
            generation: 0,
            pending: None,
        }
    }

    pub fn state(&self) -> AudioEngineState {
        self.state
    }

    /// Open the session: `Stopped -> WaitingForZone`. No-op elsewhere.
    pub fn start_session(&mut self) -> PolicyUpdate {
        let mut update = PolicyUpdate::default();
        if self.state == AudioEngineState::Stopped {
            self.transition(AudioEngineState::WaitingForZone, &mut update);
        }
        update
    }

    /// Request playback. Already-playing states are a no-op; receding states
    /// begin a fade-in whose completion lands in `Playing`.
    pub fn request_play(&mut self) -> PolicyUpdate {
        let mut update = PolicyUpdate::default();
        self.play_into(&mut update);
        update
    }

    fn play_into(&mut self, update: &mut PolicyUpdate) {
        match self.state {
            AudioEngineState::Playing | AudioEngineState::FadingIn => {}
            AudioEngineState::WaitingForZone
            | AudioEngineState::Paused
            | AudioEngineState::FadingOut => {
                self.transition(AudioEngineState::FadingIn, update);
                update.actions.push(AudioAction::FadeTo(1.0));
                self.schedule_fade(AudioEngineState::Playing, Some(AudioAction::Play), update);
            }
            AudioEngineState::Stopped => {
                // Playing from cold always passes through WaitingForZone.
                self.transition(AudioEngineState::WaitingForZone, update);
                self.play_into(update);
            }
        }
    }

    /// Request a pause or soft duck.
    pub fn request_pause(&mut self, reason: PauseReason) -> PolicyUpdate {
        let mut update = PolicyUpdate::default();
        match self.state {
            AudioEngineState::Playing | AudioEngineState::FadingIn => {
                self.transition(AudioEngineState::FadingOut, &mut update);
                update.actions.push(AudioAction::FadeTo(reason.volume_floor));
                let (target, action) = Self::pause_outcome(reason);
                self.schedule_fade(target, action, &mut update);
            }
            AudioEngineState::FadingOut => {
                // Already receding. A strictly harder reason upgrades the
                // pending outcome in place; equal or softer ones are no-ops.
                if reason.full_pause {
                    if let Some(pending) = self.pending.as_mut() {
                        if pending.target == AudioEngineState::WaitingForZone {
                            pending.target = AudioEngineState::Paused;
                            pending.completion_action = Some(AudioAction::Pause);
                            update.actions.push(AudioAction::FadeTo(reason.volume_floor));
                        }
                    }
                }
            }
            AudioEngineState::WaitingForZone => {
                if reason.full_pause {
                    self.transition(AudioEngineState::Paused, &mut update);
                }
            }
            AudioEngineState::Paused | AudioEngineState::Stopped => {}
        }
        update
    }

    /// Deliver a fade completion. Stale generations are ignored.
    pub fn complete_fade(&mut self, generation: u64) -> PolicyUpdate {
        let mut update = PolicyUpdate::default();
        let Some(pending) = self.pending else {
            return update;
        };
        if pending.generation != generation {
            return update;
        }
        self.pending = None;
        self.transition(pending.target, &mut update);
        if let Some(action) = pending.completion_action {
            update.actions.push(action);
        }
        update
    }

    /// Close the session from any state, cancelling any pending fade.
    pub fn stop_session(&mut self) -> PolicyUpdate {
        let mut update = PolicyUpdate::default();
        self.cancel_pending();
        if self.state != AudioEngineState::Stopped {
            self.transition(AudioEngineState::Stopped, &mut update);
            update.actions.push(AudioAction::Stop);
        }
        update
    }

    fn pause_outcome(reason: PauseReason) -> (AudioEngineState, Option<AudioAction>) {
        if reason.full_pause {
            (AudioEngineState::Paused, Some(AudioAction::Pause))
        } else {
            (AudioEngineState::WaitingForZone, None)
        }
    }

    fn schedule_fade(
        &mut self,
        target: AudioEngineState,
        completion_action: Option<AudioAction>,
        update: &mut PolicyUpdate,
    ) {
        self.generation += 1;
        self.pending = Some(PendingFade {
            generation: self.generation,
            target,
            completion_action,
        });
        update.fade = Some(ScheduledFade {
            generation: self.generation,
            delay_ms: self.fade_duration_ms,
        });
    }

    fn cancel_pending(&mut self) {
        if self.pending.take().is_some() {
            self.generation += 1;
        }
    }

    fn transition(&mut self, to: AudioEngineState, update: &mut PolicyUpdate) {
        if self.state == to {
            return;
        }
        // Any state change invalidates a fade still in flight, unless the
        // change is the fade landing itself (pending already cleared then).
        self.cancel_pending();
        update.transitions.push(StateTransition {
            from: self.state,
            to,
        });
        self.state = to;
    }
}
