//! The ingestion worker: read → skip → parse → batch → send, on its own
//! thread.
//!
//! ```text
//! ReadingHeader ──▶ Streaming ◀──▶ Draining (stalled on backpressure)
//!                       │
//!                       └──▶ Finished   (EOF, end-time cutoff, error, cancel)
//! ```
//!
//! Header parsing happens on the caller's thread (see
//! [`TraceReader`][crate::TraceReader]) so that a bad header fails
//! construction; the worker only ever sees data lines.

use std::io::{self, BufRead};
use std::thread::{self, JoinHandle};

use crate::channel::{BatchSender, WorkerState};
use crate::record::{LineParser, decode_line, is_skippable};
use crate::{BatchAccumulator, MovementBatch, TraceError, TraceResult};

/// Counters reported by the worker when it stops.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct IngestSummary {
    /// Lines consumed, header included.
    pub lines_read:          u64,
    pub records:             u64,
    pub batches:             u64,
    /// Blank and comment lines.
    pub skipped_lines:       u64,
    /// Ingestion stopped at the configured end time with input remaining.
    pub stopped_at_end_time: bool,
}

pub(crate) struct IngestWorker<R> {
    source:   R,
    parser:   LineParser,
    end_time: Option<f64>,
    sender:   BatchSender,
    summary:  IngestSummary,
}

impl<R: BufRead + Send + 'static> IngestWorker<R> {
    /// `source` must be positioned just past the header line.
    pub(crate) fn new(
        source:   R,
        parser:   LineParser,
        end_time: Option<f64>,
        sender:   BatchSender,
    ) -> Self {
        Self {
            source,
            parser,
            end_time,
            sender,
            summary: IngestSummary {
                lines_read: 1,
                ..IngestSummary::default()
            },
        }
    }

    /// Move the worker onto a dedicated thread.
    pub(crate) fn spawn(self) -> io::Result<JoinHandle<IngestSummary>> {
        self.sender.set_state(WorkerState::Streaming);
        thread::Builder::new()
            .name("dt-trace-ingest".into())
            .spawn(move || self.run())
    }

    /// Drive the loop to completion and close the channel.  The source is
    /// dropped (closing the file) before this returns.
    pub(crate) fn run(mut self) -> IngestSummary {
        let outcome = self.stream();
        let summary = self.summary;
        let Self { source, sender, .. } = self;
        drop(source);

        match outcome {
            Ok(()) => {
                tracing::info!(
                    records = summary.records,
                    batches = summary.batches,
                    skipped = summary.skipped_lines,
                    stopped_at_end_time = summary.stopped_at_end_time,
                    "trace ingestion finished"
                );
                sender.finish();
            }
            Err(TraceError::InterruptedWait) => {
                tracing::debug!(batches = summary.batches, "trace ingestion cancelled");
                sender.finish();
            }
            Err(error) => {
                tracing::error!(%error, batches = summary.batches, "trace ingestion aborted");
                sender.fail(error);
            }
        }
        summary
    }

    fn stream(&mut self) -> TraceResult<()> {
        let mut accumulator = BatchAccumulator::new();
        let mut buf = Vec::new();

        loop {
            if self.sender.is_cancelled() {
                return Err(TraceError::InterruptedWait);
            }

            buf.clear();
            let line_no = self.summary.lines_read + 1;
            let n = self
                .source
                .read_until(b'\n', &mut buf)
                .map_err(|source| TraceError::Read { line_no, source })?;
            if n == 0 {
                break;
            }
            self.summary.lines_read = line_no;

            let text = decode_line(&buf).map_err(|lossy| {
                TraceError::record(line_no, &lossy, "line is not valid UTF-8")
            })?;
            if is_skippable(text) {
                self.summary.skipped_lines += 1;
                continue;
            }

            let parsed = self.parser.parse(line_no, text)?;
            if self.end_time.is_some_and(|end| parsed.timestamp > end) {
                self.summary.stopped_at_end_time = true;
                break;
            }

            self.summary.records += 1;
            if let Some(batch) = accumulator.push(parsed) {
                self.emit(batch)?;
            }
        }

        if let Some(batch) = accumulator.finish() {
            self.emit(batch)?;
        }
        Ok(())
    }

    fn emit(&mut self, batch: MovementBatch) -> TraceResult<()> {
        self.sender.send(batch)?;
        self.summary.batches += 1;
        Ok(())
    }
}
