//! Monitor Layer
//!
//! Top-level controller tying the probe workers, the sample store and the
//! aggregation driver together, and the push interface presentation code
//! consumes.
//!
//! # Components
//!
//! - [`Monitor`]: Startup (host validation), presentation queries, orderly shutdown
//! - [`Snapshot`]: Everything a display needs for one driver tick
//! - [`MonitorError`]: Failures that reach the process boundary
//!
//! # Example
//!
//! ```rust,no_run
//! use proping::{AppConfig, Monitor, Resolution};
//!
//! # async fn run() -> Result<(), proping::MonitorError> {
//! let monitor = Monitor::with_ping(AppConfig::default(), "1.1.1.1").await?;
//! let mut updates = monitor.subscribe();
//! while updates.changed().await.is_ok() {
//!     let snapshot = updates.borrow_and_update().clone();
//!     println!("1m avg {:.1}%", snapshot.stats(Resolution::OneMinute).average);
//! }
//! monitor.shutdown().await?;
//! # Ok(())
//! # }
//! ```

mod controller;
mod driver;
mod error;
mod snapshot;
mod uptime;

pub use controller::{Monitor, resolve_host};
pub use error::MonitorError;
pub use snapshot::{ResolutionView, Snapshot};
pub use uptime::format_uptime;
