mod config;
mod coordinator;
mod metrics;
mod runtime;

pub use config::SessionConfig;
pub use coordinator::{SessionCoordinator, SessionEffect};
pub use metrics::LiveMetrics;
pub use runtime::SessionRuntime;
