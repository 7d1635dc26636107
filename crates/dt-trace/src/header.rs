//! The offset header, first line of every trace file.
//!
//! ```text
//! minTime maxTime minX maxX minY maxY [minZ maxZ]
//! ```
//!
//! The Z range is accepted (and must be numeric) but is not exposed; traces
//! are planar.

use std::str::FromStr;

use crate::{TraceError, TraceResult};

/// Global bounding ranges declared by a trace's first line.
///
/// Values are stored exactly as written.  No `min ≤ max` check is made: the
/// header is trusted as metadata, and the only use the core makes of it is
/// subtracting the minimums during normalisation.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Offsets {
    pub min_time: f64,
    pub max_time: f64,
    pub min_x:    f64,
    pub max_x:    f64,
    pub min_y:    f64,
    pub max_y:    f64,
}

impl Offsets {
    /// Parse a header line.  Fields are separated by any run of whitespace.
    ///
    /// # Errors
    ///
    /// `MalformedHeader` if the line does not have exactly 6 or 8 fields or
    /// any field is not a finite number.
    pub fn parse(line: &str) -> TraceResult<Offsets> {
        let fields: Vec<&str> = line.split_ascii_whitespace().collect();
        if fields.len() != 6 && fields.len() != 8 {
            return Err(TraceError::header(
                line,
                format!("expected 6 or 8 fields, found {}", fields.len()),
            ));
        }

        let mut values = [0.0_f64; 8];
        for (slot, field) in values.iter_mut().zip(&fields) {
            *slot = parse_field(line, field)?;
        }

        Ok(Offsets {
            min_time: values[0],
            max_time: values[1],
            min_x:    values[2],
            max_x:    values[3],
            min_y:    values[4],
            max_y:    values[5],
        })
    }

    /// `max_time - min_time`.
    #[inline]
    pub fn time_span(&self) -> f64 {
        self.max_time - self.min_time
    }

    /// `max_x - min_x`.
    #[inline]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// `max_y - min_y`.
    #[inline]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

impl FromStr for Offsets {
    type Err = TraceError;

    fn from_str(s: &str) -> TraceResult<Offsets> {
        Offsets::parse(s)
    }
}

fn parse_field(line: &str, field: &str) -> TraceResult<f64> {
    match field.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(TraceError::header(line, format!("{field:?} is not a number"))),
    }
}
