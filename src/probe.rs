//! Probe Layer
//!
//! Phase-offset probe workers that feed the [`SampleStore`](crate::store::SampleStore).
//! Each worker runs in its own Tokio task and invokes a [`ProbeExecutor`] once per
//! second at its own sub-second offset, so N workers yield N evenly spaced samples
//! per second.
//!
//! # Architecture
//!
//! - [`ProbeExecutor`]: Core trait for one reachability probe against a host
//! - [`PingExecutor`]: Default executor that shells out to the system `ping`
//! - [`ProbeWorker`]: Sleep-probe-record loop for one phase offset
//! - [`ProbeScheduler`]: Spawns workers and owns their cancellation and shutdown
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use proping::probe::{PingConfig, PingExecutor, ProbeCounters, ProbeScheduler, ProbeWorker};
//! use proping::store::SampleStore;
//!
//! # async fn run() {
//! let store = Arc::new(SampleStore::new(180_000));
//! let counters = Arc::new(ProbeCounters::default());
//! let executor = Arc::new(PingExecutor::new(PingConfig::default()));
//! let scheduler = ProbeScheduler::new();
//! for index in 0..10 {
//!     let worker = ProbeWorker::new("1.1.1.1", index, 10, executor.clone(), store.clone(), counters.clone());
//!     scheduler.spawn(worker).unwrap();
//! }
//! scheduler.shutdown().await;
//! # }
//! ```

mod counters;
mod ping;
mod scheduler;
mod traits;
mod worker;

pub use counters::{CounterSnapshot, ProbeCounters};
pub use ping::{PingConfig, PingExecutor, parse_packet_loss};
pub use scheduler::{DEFAULT_SHUTDOWN_TIMEOUT, ProbeScheduler, SchedulerError, ShutdownReport, WorkerInfo};
pub use traits::{ProbeError, ProbeExecutor};
pub use worker::{MAX_FREQUENCY, ProbeWorker, next_probe_at, phase_offset};
