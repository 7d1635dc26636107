//! Contiguous-timestamp grouping of parsed records.
//!
//! The accumulator only ever compares a record with the batch currently
//! open, so a timestamp that reappears after a different one starts a new
//! batch rather than merging with the earlier group.

use crate::{MovementRecord, ParsedLine};

/// All records sharing one timestamp, in source order.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MovementBatch {
    pub timestamp: f64,
    pub records:   Vec<MovementRecord>,
}

impl MovementBatch {
    pub fn new(timestamp: f64) -> Self {
        Self {
            timestamp,
            records: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Stateful fold from [`ParsedLine`]s to sealed [`MovementBatch`]es.
#[derive(Default, Debug)]
pub struct BatchAccumulator {
    open: Option<MovementBatch>,
}

impl BatchAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one record.
    ///
    /// Returns the previously open batch if `line` starts a new timestamp;
    /// the caller is responsible for forwarding it.
    pub fn push(&mut self, line: ParsedLine) -> Option<MovementBatch> {
        let starts_new = self
            .open
            .as_ref()
            .is_some_and(|batch| batch.timestamp != line.timestamp);
        let sealed = if starts_new { self.open.take() } else { None };

        self.open
            .get_or_insert_with(|| MovementBatch::new(line.timestamp))
            .records
            .push(line.record);

        sealed
    }

    /// Seal whatever is still open.  Returns `None` rather than an empty batch.
    pub fn finish(&mut self) -> Option<MovementBatch> {
        self.open.take().filter(|b| !b.is_empty())
    }

    /// Timestamp of the batch currently being filled, if any.
    pub fn open_timestamp(&self) -> Option<f64> {
        self.open.as_ref().map(|b| b.timestamp)
    }
}
