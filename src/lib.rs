//! proping - Sub-second Packet Loss Monitor
//!
//! This crate provides the core of a packet loss monitor for a single host:
//! phase-offset probe workers, a bounded sample store, and rolling loss
//! histories at 1-second, 1-minute and 5-minute resolution. It can be used as
//! a library behind any display, or run as the `proping` executable.
//!
//! # Architecture
//!
//! - **Probe**: N workers, each probing once per second at offset `i / N`
//! - **Store**: Bounded FIFO of timestamped loss samples shared by all workers
//! - **Aggregate**: Wall-clock aligned bucket averages with explicit "no data"
//! - **Monitor**: Startup validation, 1 Hz driver, snapshot push channel, shutdown
//!
//! # Example
//!
//! ```rust,no_run
//! use proping::{AppConfig, Monitor, Resolution};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let monitor = Monitor::with_ping(AppConfig::default(), "example.com").await?;
//!
//!     tokio::time::sleep(std::time::Duration::from_secs(5)).await;
//!     let stats = monitor.current_stats(Resolution::OneSecond);
//!     println!("avg {:.1}% / max {:.1}%", stats.average, stats.maximum);
//!
//!     monitor.shutdown().await?;
//!     Ok(())
//! }
//! ```

pub mod aggregate;
pub mod config;
pub mod monitor;
pub mod probe;
pub mod store;

pub use aggregate::{Bucket, History, LossStats, Resolution};
pub use config::{AppConfig, ConfigError};
pub use monitor::{Monitor, MonitorError, Snapshot};
pub use probe::{PingConfig, PingExecutor, ProbeError, ProbeExecutor};
pub use store::{Sample, SampleKind, SampleStore};
