//! Data-line parsing: `time id xPos yPos` → [`ParsedLine`].

use dt_core::{Coord, EntityId};

use crate::{Offsets, TraceError, TraceResult};

/// Lines whose first non-blank character is this are ignored.
pub const COMMENT_PREFIX: char = '#';

/// One entity's position at one instant.  The instant itself lives on the
/// enclosing [`MovementBatch`][crate::MovementBatch].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MovementRecord {
    pub entity:   EntityId,
    pub position: Coord,
}

/// A parsed data line: the record plus the timestamp it belongs to.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedLine {
    pub timestamp: f64,
    pub record:    MovementRecord,
}

/// `true` for blank and comment lines, which never reach [`LineParser`].
#[inline]
pub fn is_skippable(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.is_empty() || trimmed.starts_with(COMMENT_PREFIX)
}

/// Strip the line terminator and check the bytes are UTF-8.
///
/// On failure returns the line decoded lossily (invalid sequences become
/// U+FFFD) so the caller can still report what was read.
pub(crate) fn decode_line(buf: &[u8]) -> Result<&str, String> {
    let end = buf
        .iter()
        .rposition(|&b| b != b'\n' && b != b'\r')
        .map_or(0, |i| i + 1);
    let bytes = &buf[..end];
    std::str::from_utf8(bytes).map_err(|_| String::from_utf8_lossy(bytes).into_owned())
}

/// Stateless parser for data lines.
///
/// With `normalize` on, `min_time`, `min_x` and `min_y` from the header are
/// subtracted from every timestamp and position so each axis starts at zero.
#[derive(Copy, Clone, Debug)]
pub struct LineParser {
    offsets:   Offsets,
    normalize: bool,
}

impl LineParser {
    pub fn new(offsets: Offsets, normalize: bool) -> Self {
        Self { offsets, normalize }
    }

    pub fn normalizes(&self) -> bool {
        self.normalize
    }

    /// Parse one non-blank, non-comment line.
    ///
    /// `line_no` is the 1-based line number in the source and is carried
    /// into the error for diagnostics only.
    ///
    /// # Errors
    ///
    /// `MalformedRecord` (holding the offending text) if the line does not
    /// have exactly four fields or a numeric field fails to parse.
    pub fn parse(&self, line_no: u64, line: &str) -> TraceResult<ParsedLine> {
        let mut fields = line.split_ascii_whitespace();
        let (Some(time), Some(id), Some(x), Some(y), None) = (
            fields.next(),
            fields.next(),
            fields.next(),
            fields.next(),
            fields.next(),
        ) else {
            let found = line.split_ascii_whitespace().count();
            return Err(TraceError::record(
                line_no,
                line,
                format!("expected 4 fields (time id x y), found {found}"),
            ));
        };

        let mut timestamp = parse_number(line_no, line, "time", time)?;
        let mut position = Coord::new(
            parse_number(line_no, line, "x", x)?,
            parse_number(line_no, line, "y", y)?,
        );

        if self.normalize {
            timestamp -= self.offsets.min_time;
            position = position.shifted(self.offsets.min_x, self.offsets.min_y);
        }

        Ok(ParsedLine {
            timestamp,
            record: MovementRecord {
                entity: EntityId::new(id),
                position,
            },
        })
    }
}

fn parse_number(line_no: u64, line: &str, what: &str, field: &str) -> TraceResult<f64> {
    match field.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(TraceError::record(
            line_no,
            line,
            format!("{what} field {field:?} is not a number"),
        )),
    }
}
