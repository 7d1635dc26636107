//! Error types for dt-trace.
//!
//! Construction-time failures (`SourceNotFound`, `MalformedHeader`, `Config`)
//! are returned directly from [`TraceReader::open`][crate::TraceReader::open]
//! and the builder.  Streaming-time failures (`MalformedRecord`, `Read`) are
//! detected on the ingestion thread and handed to the consumer through the
//! batch channel, surfacing as the `Err` of a later
//! [`pull_next_batch`][crate::TraceReader::pull_next_batch].

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when opening or streaming a movement trace.
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("couldn't open trace file {}: {source}", .path.display())]
    SourceNotFound {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid offset line {line:?}: {reason}")]
    MalformedHeader {
        line:   String,
        reason: String,
    },

    #[error("invalid line {line_no} {line:?}: {reason}")]
    MalformedRecord {
        line_no: u64,
        line:    String,
        reason:  String,
    },

    #[error("I/O error reading trace at line {line_no}: {source}")]
    Read {
        line_no: u64,
        #[source]
        source:  io::Error,
    },

    #[error("failed to start ingestion thread: {0}")]
    Spawn(#[source] io::Error),

    #[error("wait interrupted: trace reader was shut down")]
    InterruptedWait,

    #[error("trace configuration error: {0}")]
    Config(String),
}

impl TraceError {
    pub(crate) fn header(line: &str, reason: impl Into<String>) -> Self {
        TraceError::MalformedHeader {
            line:   line.to_owned(),
            reason: reason.into(),
        }
    }

    pub(crate) fn record(line_no: u64, line: &str, reason: impl Into<String>) -> Self {
        TraceError::MalformedRecord {
            line_no,
            line:   line.to_owned(),
            reason: reason.into(),
        }
    }
}

pub type TraceResult<T> = Result<T, TraceError>;
