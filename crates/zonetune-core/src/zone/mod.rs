mod engine;

pub use engine::{ZoneDecisionEngine, ZoneEngineConfig, ZoneState};
