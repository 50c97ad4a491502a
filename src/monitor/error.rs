//! Monitor error types.

use thiserror::Error;

use crate::config::ConfigError;
use crate::probe::SchedulerError;

/// Errors surfaced by [`Monitor`](super::Monitor).
///
/// Per-probe failures never appear here; they are recorded as total-loss samples.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Target host did not resolve; no worker was started.
    #[error("host '{host}' could not be resolved: {source}")]
    HostUnresolvable {
        host: String,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Worker management failed.
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    /// Shutdown did not complete cleanly.
    #[error("shutdown error: {0}")]
    Shutdown(String),
}
