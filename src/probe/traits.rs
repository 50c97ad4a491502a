//! Core probe traits and types.

use thiserror::Error;

/// Errors a single probe can end with.
///
/// None of these stop a worker: they are recorded as total-loss samples.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Probe process ran but reported failure (non-zero exit).
    #[error("probe failed: {0}")]
    Failed(String),

    /// Timeout elapsed.
    #[error("timeout elapsed")]
    Timeout,

    /// Probe output did not contain a packet loss figure.
    #[error("unparseable probe output: {0}")]
    Unparseable(String),

    /// Probe process could not be spawned or awaited.
    #[error("probe i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// One reachability check against a host.
///
/// # Contract
///
/// - Input: hostname or IP literal.
/// - `Ok(loss)`: packet loss percentage in `[0, 100]`.
/// - `Err(_)`: the probe could not complete; callers record this as 100% loss.
///
/// Implementations own their timeout. Workers never cancel an in-flight probe.
#[async_trait::async_trait]
pub trait ProbeExecutor: Send + Sync + 'static {
    /// Short identifier used in logs (e.g., "ping").
    fn name(&self) -> &str;

    /// Perform one probe.
    async fn probe(&self, host: &str) -> Result<f64, ProbeError>;
}
