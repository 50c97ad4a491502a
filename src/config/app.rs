//! Application configuration structures.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::aggregate::DEFAULT_BUCKET_COUNT;
use crate::probe::{MAX_FREQUENCY, PingConfig};

use super::validation::ConfigError;

// =============================================================================
// Constants
// =============================================================================

/// Default probe frequency (probes per second).
pub const DEFAULT_FREQUENCY: u32 = 10;

/// Default retention, in minutes per bucket of the coarsest history.
pub const DEFAULT_MAX_INTERVAL_MINUTES: u32 = 5;

/// Upper bound on buckets per history.
pub const MAX_BUCKET_COUNT: usize = 3_600;

/// Default driver tick (1 second).
pub const DEFAULT_TICK: Duration = Duration::from_secs(1);

/// Default trailing window for the instantaneous loss indicator (1 second).
pub const DEFAULT_INSTANT_WINDOW: Duration = Duration::from_secs(1);

/// Longest accepted instant-loss window (1 hour).
pub const MAX_INSTANT_WINDOW: Duration = Duration::from_secs(3_600);

/// Default shutdown grace for in-flight probes (1.5 seconds).
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_millis(1_500);

fn default_frequency() -> u32 {
    DEFAULT_FREQUENCY
}

fn default_bucket_count() -> usize {
    DEFAULT_BUCKET_COUNT
}

fn default_max_interval_minutes() -> u32 {
    DEFAULT_MAX_INTERVAL_MINUTES
}

fn default_tick() -> Duration {
    DEFAULT_TICK
}

fn default_instant_window() -> Duration {
    DEFAULT_INSTANT_WINDOW
}

fn default_shutdown_grace() -> Duration {
    DEFAULT_SHUTDOWN_GRACE
}

// =============================================================================
// Probe Configuration
// =============================================================================

/// Probe scheduling configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Probes per second; one worker per probe slot (default: 10).
    #[serde(default = "default_frequency")]
    pub frequency: u32,

    /// `ping` executor settings.
    #[serde(default)]
    pub ping: PingConfig,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            frequency: DEFAULT_FREQUENCY,
            ping: PingConfig::default(),
        }
    }
}

// =============================================================================
// History Configuration
// =============================================================================

/// History and retention configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Buckets per history (default: 60).
    #[serde(default = "default_bucket_count")]
    pub bucket_count: usize,

    /// Width of the coarsest bucket in minutes; sizes the store (default: 5).
    #[serde(default = "default_max_interval_minutes")]
    pub max_interval_minutes: u32,

    /// Explicit store capacity, overriding the derived one.
    #[serde(default)]
    pub capacity: Option<usize>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            bucket_count: DEFAULT_BUCKET_COUNT,
            max_interval_minutes: DEFAULT_MAX_INTERVAL_MINUTES,
            capacity: None,
        }
    }
}

// =============================================================================
// Driver Configuration
// =============================================================================

/// Aggregation driver configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Aggregation period (default: 1s).
    #[serde(default = "default_tick", with = "humantime_serde")]
    pub tick: Duration,

    /// Trailing window for instantaneous loss (default: 1s).
    #[serde(default = "default_instant_window", with = "humantime_serde")]
    pub instant_window: Duration,

    /// How long shutdown waits for in-flight probes (default: 1.5s).
    #[serde(default = "default_shutdown_grace", with = "humantime_serde")]
    pub shutdown_grace: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            tick: DEFAULT_TICK,
            instant_window: DEFAULT_INSTANT_WINDOW,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        }
    }
}

// =============================================================================
// Application Configuration
// =============================================================================

/// Top-level application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub probe: ProbeConfig,

    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub driver: DriverConfig,
}

impl AppConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read, parsed, or validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Sample store capacity.
    ///
    /// Defaults to frequency × buckets × coarsest interval in seconds, enough
    /// raw samples to rebuild the full 5-minute history.
    pub fn store_capacity(&self) -> usize {
        self.history.capacity.unwrap_or_else(|| {
            self.probe.frequency as usize
                * self.history.bucket_count
                * self.history.max_interval_minutes as usize
                * 60
        })
    }

    /// Validate configuration values.
    ///
    /// # Errors
    /// Returns `ConfigError::ValidationError` if any field is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Validate probe frequency
        if self.probe.frequency == 0 || self.probe.frequency > MAX_FREQUENCY {
            return Err(ConfigError::ValidationError(format!(
                "probe frequency must be between 1 and {}, got {}",
                MAX_FREQUENCY, self.probe.frequency
            )));
        }

        if self.probe.ping.command.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "probe ping command cannot be empty".to_string(),
            ));
        }

        if self.probe.ping.timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "probe ping timeout must be positive".to_string(),
            ));
        }

        // Validate history sizing
        if self.history.bucket_count == 0 || self.history.bucket_count > MAX_BUCKET_COUNT {
            return Err(ConfigError::ValidationError(format!(
                "history bucket_count must be between 1 and {}, got {}",
                MAX_BUCKET_COUNT, self.history.bucket_count
            )));
        }

        if self.history.max_interval_minutes == 0 {
            return Err(ConfigError::ValidationError(
                "history max_interval_minutes must be positive".to_string(),
            ));
        }

        if self.store_capacity() == 0 {
            return Err(ConfigError::ValidationError(
                "history capacity must be positive".to_string(),
            ));
        }

        // Validate driver timings
        if self.driver.tick.is_zero() {
            return Err(ConfigError::ValidationError(
                "driver tick must be positive".to_string(),
            ));
        }

        if self.driver.instant_window.is_zero() || self.driver.instant_window > MAX_INSTANT_WINDOW {
            return Err(ConfigError::ValidationError(format!(
                "driver instant_window must be positive and at most {}",
                humantime::format_duration(MAX_INSTANT_WINDOW)
            )));
        }

        Ok(())
    }
}
