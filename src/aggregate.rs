//! Aggregation Layer
//!
//! Turns raw samples into fixed-length loss histories at three wall-clock
//! aligned resolutions, and summarises them.
//!
//! # Components
//!
//! - [`Resolution`]: Bucket width (1s / 1m / 5m) and grid alignment
//! - [`Aggregator`] / [`History`] / [`Bucket`]: Windowed averages with explicit "no data" buckets
//! - [`HistorySet`]: The three histories plus their recomputation cadence
//! - [`summarize`] / [`instant_loss`]: Average and maximum over a history, raw trailing loss

mod history;
mod resolution;
mod set;
mod stats;

pub use history::{Aggregator, Bucket, DEFAULT_BUCKET_COUNT, History};
pub use resolution::Resolution;
pub use set::HistorySet;
pub use stats::{LossStats, instant_loss, summarize};
