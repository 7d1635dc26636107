//! Fluent builder for constructing a [`TraceReader`].

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;
use std::time::Duration;

use crate::{TraceConfig, TraceError, TraceReader, TraceResult};

/// Fluent builder for [`TraceReader`].
///
/// # Options (have defaults)
///
/// | Method                  | Default         |
/// |-------------------------|-----------------|
/// | `.normalize(b)`         | `true`          |
/// | `.read_ahead(lo, hi)`   | `2_000, 20_000` |
/// | `.end_time(t)`          | none            |
/// | `.poll_interval(d)`     | 50 ms           |
///
/// # Example
///
/// ```rust,ignore
/// let mut reader = TraceReaderBuilder::new("traces/campus.txt")
///     .normalize(false)
///     .read_ahead(100, 1_000)
///     .build()?;
/// while let Some(batch) = reader.pull_next_batch()? {
///     apply(batch);
/// }
/// ```
pub struct TraceReaderBuilder {
    config: TraceConfig,
}

impl TraceReaderBuilder {
    pub fn new(source_path: impl Into<PathBuf>) -> Self {
        Self {
            config: TraceConfig::new(source_path),
        }
    }

    /// Start from a fully populated configuration.
    pub fn from_config(config: TraceConfig) -> Self {
        Self { config }
    }

    pub fn normalize(mut self, normalize: bool) -> Self {
        self.config.normalize = normalize;
        self
    }

    /// Low/high water marks for the batch queue (`low < high`).
    pub fn read_ahead(mut self, low: usize, high: usize) -> Self {
        self.config.read_ahead_low = low;
        self.config.read_ahead_high = high;
        self
    }

    pub fn end_time(mut self, end_time: f64) -> Self {
        self.config.end_time = Some(end_time);
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval_ms = interval.as_millis().max(1) as u64;
        self
    }

    pub fn config(&self) -> &TraceConfig {
        &self.config
    }

    /// Open `source_path`, parse its header, and start ingestion.
    ///
    /// # Errors
    ///
    /// `Config`, `SourceNotFound` or `MalformedHeader`; no thread is
    /// started in any of these cases.
    pub fn build(self) -> TraceResult<TraceReader> {
        self.config.validate()?;
        let path = &self.config.source_path;
        let file = File::open(path).map_err(|source| TraceError::SourceNotFound {
            path: path.clone(),
            source,
        })?;
        tracing::info!(path = %path.display(), "reading trace");
        TraceReader::start(BufReader::new(file), &self.config)
    }

    /// Like [`build`](Self::build) but reads from any byte stream.
    ///
    /// Useful for testing (pass a `std::io::Cursor`) or decompressing
    /// readers.  For sources that can stall (pipes, sockets) see the
    /// blocking note on [`TraceReader::shutdown`]; dropping the reader never
    /// waits on a stalled read.
    pub fn build_from_reader<R: Read + Send + 'static>(self, reader: R) -> TraceResult<TraceReader> {
        self.config.validate()?;
        TraceReader::start(BufReader::new(reader), &self.config)
    }
}
