//! The consumer-facing pull API: [`TraceReader`].

use std::io::BufRead;
use std::path::Path;
use std::thread::JoinHandle;

use crate::channel::{self, BatchReceiver, ChannelStats, ReadAhead, WorkerState};
use crate::record::{LineParser, decode_line};
use crate::worker::{IngestSummary, IngestWorker};
use crate::{MovementBatch, Offsets, TraceConfig, TraceError, TraceReaderBuilder, TraceResult};

/// A trace being streamed in the background, consumed one batch per step.
///
/// Construction parses the header synchronously and then hands the rest of
/// the source to a dedicated ingestion thread.  The caller polls with
/// [`pull_next_batch`](Self::pull_next_batch), typically once per
/// simulation step.
///
/// Dropping the reader cancels ingestion.  If the worker has already
/// stopped its thread is joined; otherwise it is detached and exits at its
/// next line or send, so a source that has stopped producing never blocks
/// the drop.
pub struct TraceReader {
    offsets:        Offsets,
    normalize:      bool,
    receiver:       BatchReceiver,
    worker:         Option<JoinHandle<IngestSummary>>,
    summary:        Option<IngestSummary>,
    last_timestamp: Option<f64>,
}

impl TraceReader {
    /// Open `path` with default options.
    pub fn open(path: impl AsRef<Path>) -> TraceResult<Self> {
        TraceReaderBuilder::new(path.as_ref()).build()
    }

    pub fn builder(path: impl AsRef<Path>) -> TraceReaderBuilder {
        TraceReaderBuilder::new(path.as_ref())
    }

    pub(crate) fn start<R: BufRead + Send + 'static>(
        mut source: R,
        config:     &TraceConfig,
    ) -> TraceResult<Self> {
        let read_ahead = ReadAhead::new(config.read_ahead_low, config.read_ahead_high)?;
        let (sender, receiver) = channel::bounded(read_ahead, config.poll_interval());

        sender.set_state(WorkerState::ReadingHeader);
        let offsets = read_header(&mut source)?;
        let parser = LineParser::new(offsets, config.normalize);

        let worker = IngestWorker::new(source, parser, config.end_time, sender)
            .spawn()
            .map_err(TraceError::Spawn)?;

        Ok(Self {
            offsets,
            normalize: config.normalize,
            receiver,
            worker: Some(worker),
            summary: None,
            last_timestamp: None,
        })
    }

    // ── Pull API ──────────────────────────────────────────────────────────

    /// Return the next batch in source order.
    ///
    /// Waits while the queue is empty and ingestion is still running.
    /// `Ok(None)` means the trace is exhausted; every later call returns
    /// `Ok(None)` as well.
    ///
    /// # Errors
    ///
    /// A streaming failure (`MalformedRecord`, `Read`) is returned once,
    /// after every batch sealed before it has been pulled.
    pub fn pull_next_batch(&mut self) -> TraceResult<Option<MovementBatch>> {
        let batch = self.receiver.recv()?;
        self.observe(batch.as_ref());
        Ok(batch)
    }

    /// Non-waiting variant of [`pull_next_batch`](Self::pull_next_batch).
    /// `Ok(None)` may mean "not read yet"; check [`is_exhausted`](Self::is_exhausted).
    pub fn try_pull_next_batch(&mut self) -> TraceResult<Option<MovementBatch>> {
        let batch = self.receiver.try_recv()?;
        self.observe(batch.as_ref());
        Ok(batch)
    }

    /// Iterate over the remaining batches.  Stops after the first error.
    pub fn batches(&mut self) -> Batches<'_> {
        Batches {
            reader: self,
            done:   false,
        }
    }

    fn observe(&mut self, batch: Option<&MovementBatch>) {
        if let Some(batch) = batch {
            self.last_timestamp = Some(batch.timestamp);
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn offsets(&self) -> &Offsets {
        &self.offsets
    }

    /// Timestamp of the batch most recently returned, `None` before the
    /// first one.
    pub fn last_timestamp(&self) -> Option<f64> {
        self.last_timestamp
    }

    pub fn normalizes(&self) -> bool {
        self.normalize
    }

    pub fn worker_state(&self) -> WorkerState {
        self.receiver.producer_state()
    }

    pub fn is_exhausted(&self) -> bool {
        self.receiver.is_exhausted()
    }

    pub fn stats(&self) -> ChannelStats {
        self.receiver.stats()
    }

    /// Ingestion counters, available once the worker has stopped.
    pub fn summary(&mut self) -> Option<IngestSummary> {
        // The worker closes the channel as its last act, so joining after
        // `Finished` is published waits only for the thread to return.
        let stopped = self.worker_state() == WorkerState::Finished
            || self.worker.as_ref().is_some_and(JoinHandle::is_finished);
        if stopped {
            self.join_worker();
        }
        self.summary
    }

    // ── Shutdown ──────────────────────────────────────────────────────────

    /// Cancel ingestion, wait for the thread to exit, and return its
    /// counters.
    ///
    /// # Blocking
    ///
    /// A worker blocked inside a read only notices the cancellation when
    /// that read returns.  For files this is immediate; for a pipe or socket
    /// that has gone quiet, prefer dropping the reader, which does not wait.
    pub fn shutdown(mut self) -> Option<IngestSummary> {
        self.stop();
        self.summary
    }

    fn stop(&mut self) {
        self.receiver.cancel();
        self.join_worker();
    }

    fn join_worker(&mut self) {
        if let Some(handle) = self.worker.take() {
            match handle.join() {
                Ok(summary) => self.summary = Some(summary),
                Err(_) => tracing::error!("trace ingestion thread panicked"),
            }
        }
    }
}

impl Drop for TraceReader {
    fn drop(&mut self) {
        self.receiver.cancel();
        let stopped = self.worker_state() == WorkerState::Finished
            || self.worker.as_ref().is_some_and(JoinHandle::is_finished);
        if stopped {
            self.join_worker();
        } else if self.worker.take().is_some() {
            tracing::debug!("trace reader dropped mid-read, detaching ingestion thread");
        }
    }
}

// ── Batches iterator ──────────────────────────────────────────────────────────

/// Iterator returned by [`TraceReader::batches`].
pub struct Batches<'a> {
    reader: &'a mut TraceReader,
    done:   bool,
}

impl Iterator for Batches<'_> {
    type Item = TraceResult<MovementBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.pull_next_batch() {
            Ok(Some(batch)) => Some(Ok(batch)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(error) => {
                self.done = true;
                Some(Err(error))
            }
        }
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn read_header<R: BufRead>(source: &mut R) -> TraceResult<Offsets> {
    let mut buf = Vec::new();
    match source.read_until(b'\n', &mut buf) {
        Ok(0) => Err(TraceError::header("", "missing offset line")),
        Ok(_) => match decode_line(&buf) {
            Ok(line) => Offsets::parse(line),
            Err(lossy) => Err(TraceError::header(&lossy, "offset line is not valid UTF-8")),
        },
        Err(source) => Err(TraceError::Read { line_no: 1, source }),
    }
}
