//! System `ping` probe executor.
//!
//! Runs one `ping` invocation per probe and parses the `N% packet loss`
//! summary line from its output.

use std::process::Stdio;
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tokio::time::timeout;

use crate::probe::{ProbeError, ProbeExecutor};

/// Default probe timeout (2 seconds). `ping` itself waits about 1 second for a reply.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

fn default_command() -> String {
    "ping".to_string()
}

#[cfg(target_os = "macos")]
fn default_args() -> Vec<String> {
    ["-c", "1", "-t", "1", "-q"].map(String::from).to_vec()
}

#[cfg(not(target_os = "macos"))]
fn default_args() -> Vec<String> {
    ["-c", "1", "-W", "1", "-q"].map(String::from).to_vec()
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

/// Configuration for the `ping` executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PingConfig {
    /// Program to run (default: "ping").
    #[serde(default = "default_command")]
    pub command: String,
    /// Arguments placed before the host (default: one quiet packet, 1s wait).
    #[serde(default = "default_args")]
    pub args: Vec<String>,
    /// Hard limit on a single invocation (default: 2s).
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for PingConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            args: default_args(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl PingConfig {
    /// Set the program to run.
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    /// Set the arguments placed before the host.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Set the probe timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Extract the packet loss percentage from `ping` output.
///
/// # Examples
///
/// ```
/// use proping::probe::parse_packet_loss;
///
/// let linux = "1 packets transmitted, 1 received, 0% packet loss, time 0ms";
/// assert_eq!(parse_packet_loss(linux), Some(0.0));
///
/// let macos = "1 packets transmitted, 0 packets received, 100.0% packet loss";
/// assert_eq!(parse_packet_loss(macos), Some(100.0));
///
/// assert_eq!(parse_packet_loss("ping: unknown host"), None);
/// ```
pub fn parse_packet_loss(output: &str) -> Option<f64> {
    static LOSS_REGEX: OnceLock<Regex> = OnceLock::new();

    let regex = LOSS_REGEX.get_or_init(|| {
        Regex::new(r"(\d+(?:\.\d+)?)% packet loss").expect("failed to compile packet loss regex")
    });

    regex
        .captures(output)
        .and_then(|caps| caps[1].parse::<f64>().ok())
}

/// Probe executor backed by the system `ping` utility.
#[derive(Debug, Clone)]
pub struct PingExecutor {
    config: PingConfig,
}

impl PingExecutor {
    /// Create a new executor with the given configuration.
    pub fn new(config: PingConfig) -> Self {
        Self { config }
    }

    /// Get the executor's configuration.
    pub fn config(&self) -> &PingConfig {
        &self.config
    }
}

#[async_trait::async_trait]
impl ProbeExecutor for PingExecutor {
    fn name(&self) -> &str {
        "ping"
    }

    async fn probe(&self, host: &str) -> Result<f64, ProbeError> {
        let mut command = Command::new(&self.config.command);
        command
            .args(&self.config.args)
            .arg(host)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = match timeout(self.config.timeout, command.output()).await {
            Ok(result) => result?,
            Err(_) => {
                tracing::debug!(
                    host = %host,
                    timeout_ms = self.config.timeout.as_millis(),
                    "Ping process timed out"
                );
                return Err(ProbeError::Timeout);
            }
        };

        if !output.status.success() {
            return Err(ProbeError::Failed(format!(
                "{} exited with {}",
                self.config.command, output.status
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_packet_loss(&stdout).ok_or_else(|| {
            let first_line = stdout.lines().next().unwrap_or_default().trim();
            ProbeError::Unparseable(first_line.to_string())
        })
    }
}
