//! `dt-trace` — streaming ingestion of external movement traces.
//!
//! A trace is a text file of `time id x y` lines, grouped by time, after a
//! one-line offset header.  [`TraceReader`] parses the header on the caller's
//! thread, then reads the rest on a background thread, grouping each run of
//! equal timestamps into a [`MovementBatch`] and queueing it in a bounded
//! channel.  The caller pulls one batch per step.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                   |
//! |--------------|------------------------------------------------------------|
//! | [`header`]   | `Offsets` (first-line bounding ranges)                     |
//! | [`record`]   | `MovementRecord`, `LineParser`, comment/blank detection    |
//! | [`batch`]    | `MovementBatch`, `BatchAccumulator`                        |
//! | [`channel`]  | `bounded`, `BatchSender`/`BatchReceiver`, `ReadAhead`      |
//! | [`worker`]   | Ingestion thread loop, `IngestSummary`                     |
//! | [`config`]   | `TraceConfig`                                              |
//! | [`builder`]  | `TraceReaderBuilder`                                       |
//! | [`reader`]   | `TraceReader` pull API, `Batches` iterator                 |
//! | [`error`]    | `TraceError`, `TraceResult<T>`                             |
//!
//! # Backpressure (summary)
//!
//! ```text
//! queued ≥ read_ahead_high  → producer stalls
//! queued ≤ read_ahead_low   → producer resumes
//! ```
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use dt_trace::TraceReader;
//!
//! let mut reader = TraceReader::open("movement.txt")?;
//! while let Some(batch) = reader.pull_next_batch()? {
//!     for rec in &batch.records {
//!         positions.insert(rec.entity.clone(), rec.position);
//!     }
//! }
//! ```

pub mod batch;
pub mod builder;
pub mod channel;
pub mod config;
pub mod error;
pub mod header;
pub mod reader;
pub mod record;
pub mod worker;


pub use batch::{BatchAccumulator, MovementBatch};
pub use builder::TraceReaderBuilder;
pub use channel::{BatchReceiver, BatchSender, ChannelStats, ReadAhead, WorkerState};
pub use config::TraceConfig;
pub use error::{TraceError, TraceResult};
pub use header::Offsets;
pub use reader::{Batches, TraceReader};
pub use record::{LineParser, MovementRecord, ParsedLine};
pub use worker::IngestSummary;
