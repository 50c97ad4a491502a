//! Configuration module for proping.
//!
//! Provides YAML-based configuration loading and validation for:
//! - Probe settings (frequency, `ping` command and timeout)
//! - History settings (bucket count, retention, store capacity)
//! - Driver settings (tick period, instant-loss window, shutdown grace)

mod app;
mod validation;

pub use app::{AppConfig, DriverConfig, HistoryConfig, ProbeConfig};
pub use validation::{ConfigError, parse_duration};

// Re-export constants
pub use app::{DEFAULT_FREQUENCY, DEFAULT_MAX_INTERVAL_MINUTES, MAX_BUCKET_COUNT};
