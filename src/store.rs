//! Sample Store
//!
//! Bounded, in-memory time series of probe outcomes shared between the probe
//! workers (writers) and the aggregation driver (reader).
//!
//! # Components
//!
//! - [`Sample`] / [`SampleKind`]: One timestamped probe outcome
//! - [`SampleStore`]: FIFO ring with a fixed capacity and half-open range queries
//!
//! # Example
//!
//! ```
//! use chrono::{TimeDelta, Utc};
//! use proping::store::{Sample, SampleStore};
//!
//! let store = SampleStore::new(3);
//! let now = Utc::now();
//! for i in 0..5 {
//!     store.append(Sample::measured(now + TimeDelta::seconds(i), 0.0));
//! }
//! assert_eq!(store.len(), 3);
//! assert_eq!(store.total_evicted(), 2);
//! ```

mod ring;
mod sample;

pub use ring::SampleStore;
pub use sample::{FAILURE_LOSS, Sample, SampleKind};
