//! Reader configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::channel::{DEFAULT_POLL_INTERVAL, DEFAULT_READ_AHEAD_HIGH, DEFAULT_READ_AHEAD_LOW};
use crate::{TraceError, TraceResult};

/// Options recognised when opening a trace.
///
/// Typically built through [`TraceReaderBuilder`][crate::TraceReaderBuilder],
/// or loaded from the host application's settings file (with the `serde`
/// feature) and passed to `TraceReaderBuilder::from_config`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TraceConfig {
    /// Trace file to open.  Ignored by `build_from_reader`.
    pub source_path: PathBuf,

    /// Shift time and positions so the header minimums map to zero.
    /// Default: `true`.
    #[cfg_attr(feature = "serde", serde(default = "default_normalize"))]
    pub normalize: bool,

    /// Producer resumes once the queue has drained to this many batches.
    /// Default: 2,000.
    #[cfg_attr(feature = "serde", serde(default = "default_read_ahead_low"))]
    pub read_ahead_low: usize,

    /// Producer stalls once this many batches are queued.  Default: 20,000.
    #[cfg_attr(feature = "serde", serde(default = "default_read_ahead_high"))]
    pub read_ahead_high: usize,

    /// Stop at the first record whose timestamp (after normalisation, if
    /// enabled) is greater than this.
    #[cfg_attr(feature = "serde", serde(default))]
    pub end_time: Option<f64>,

    /// Consumer re-check interval while waiting for a batch.  Tuning only.
    /// Default: 50 ms.
    #[cfg_attr(feature = "serde", serde(default = "default_poll_interval_ms"))]
    pub poll_interval_ms: u64,
}

impl TraceConfig {
    pub fn new(source_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path:      source_path.into(),
            normalize:        default_normalize(),
            read_ahead_low:   default_read_ahead_low(),
            read_ahead_high:  default_read_ahead_high(),
            end_time:         None,
            poll_interval_ms: default_poll_interval_ms(),
        }
    }

    /// # Errors
    ///
    /// `Config` if the read-ahead marks are not `low < high`, the poll
    /// interval is zero, or `end_time` is not finite.
    pub fn validate(&self) -> TraceResult<()> {
        if self.read_ahead_low >= self.read_ahead_high {
            return Err(TraceError::Config(format!(
                "read_ahead_low ({}) must be below read_ahead_high ({})",
                self.read_ahead_low, self.read_ahead_high
            )));
        }
        if self.poll_interval_ms == 0 {
            return Err(TraceError::Config("poll_interval_ms must be positive".into()));
        }
        if let Some(end) = self.end_time {
            if !end.is_finite() {
                return Err(TraceError::Config(format!("end_time {end} is not finite")));
            }
        }
        Ok(())
    }

    #[inline]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn default_normalize() -> bool {
    true
}

fn default_read_ahead_low() -> usize {
    DEFAULT_READ_AHEAD_LOW
}

fn default_read_ahead_high() -> usize {
    DEFAULT_READ_AHEAD_HIGH
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL.as_millis() as u64
}
