mod policy;

pub use policy::{
    AudioAction, AudioEngineState, AudioPolicyEngine, PauseCause, PauseReason, PolicyUpdate,
    ScheduledFade, StateTransition,
};
