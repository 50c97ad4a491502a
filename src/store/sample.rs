//! Probe sample type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::probe::ProbeError;

/// Loss recorded for a probe that failed or timed out.
pub const FAILURE_LOSS: f64 = 100.0;

/// How a sample's loss value was obtained.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SampleKind {
    /// Loss parsed from a completed probe.
    Measured,
    /// Probe could not complete (non-zero exit, unparseable output, spawn error).
    ProbeFailed,
    /// Probe exceeded the executor timeout.
    ProbeTimeout,
}

/// A single probe outcome.
///
/// Immutable once created; owned by the [`SampleStore`](super::SampleStore)
/// after it is appended.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Probe completion time (UTC).
    pub ts: DateTime<Utc>,
    /// Loss percentage in `[0, 100]`.
    pub loss: f64,
    /// Outcome classification.
    pub kind: SampleKind,
}

impl Sample {
    /// Create a measured sample. Loss is clamped to `[0, 100]`; NaN counts as total loss.
    pub fn measured(ts: DateTime<Utc>, loss: f64) -> Self {
        let loss = if loss.is_nan() {
            FAILURE_LOSS
        } else {
            loss.clamp(0.0, FAILURE_LOSS)
        };
        Self {
            ts,
            loss,
            kind: SampleKind::Measured,
        }
    }

    /// Create a total-loss sample for a failed probe.
    pub fn failed(ts: DateTime<Utc>) -> Self {
        Self {
            ts,
            loss: FAILURE_LOSS,
            kind: SampleKind::ProbeFailed,
        }
    }

    /// Create a total-loss sample for a timed out probe.
    pub fn timed_out(ts: DateTime<Utc>) -> Self {
        Self {
            ts,
            loss: FAILURE_LOSS,
            kind: SampleKind::ProbeTimeout,
        }
    }

    /// Map an executor result onto a sample.
    pub fn from_outcome(ts: DateTime<Utc>, outcome: &Result<f64, ProbeError>) -> Self {
        match outcome {
            Ok(loss) => Self::measured(ts, *loss),
            Err(ProbeError::Timeout) => Self::timed_out(ts),
            Err(_) => Self::failed(ts),
        }
    }

    /// Whether the sample represents a probe that did not complete.
    pub fn is_failure(&self) -> bool {
        self.kind != SampleKind::Measured
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_measured_clamps_loss() {
        let now = Utc::now();
        assert_eq!(Sample::measured(now, 150.0).loss, 100.0);
        assert_eq!(Sample::measured(now, -3.0).loss, 0.0);
        assert_eq!(Sample::measured(now, f64::NAN).loss, 100.0);
        assert_eq!(Sample::measured(now, 42.5).loss, 42.5);
    }

    #[test]
    fn test_from_outcome() {
        let now = Utc::now();

        let ok = Sample::from_outcome(now, &Ok(20.0));
        assert_eq!(ok.kind, SampleKind::Measured);
        assert_eq!(ok.loss, 20.0);
        assert!(!ok.is_failure());

        let timeout = Sample::from_outcome(now, &Err(ProbeError::Timeout));
        assert_eq!(timeout.kind, SampleKind::ProbeTimeout);
        assert_eq!(timeout.loss, FAILURE_LOSS);

        let failed = Sample::from_outcome(now, &Err(ProbeError::Failed("exit 2".into())));
        assert_eq!(failed.kind, SampleKind::ProbeFailed);
        assert_eq!(failed.loss, FAILURE_LOSS);
        assert!(failed.is_failure());
    }

    #[test]
    fn test_sample_kind_strings() {
        assert_eq!(SampleKind::ProbeFailed.as_ref(), "probe_failed");
        assert_eq!(SampleKind::Measured.to_string(), "measured");
        assert_eq!(
            SampleKind::from_str("PROBE_TIMEOUT").unwrap(),
            SampleKind::ProbeTimeout
        );
    }
}
