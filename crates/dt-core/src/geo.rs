//! Planar coordinate type for trace positions.
//!
//! Trace files describe positions in an arbitrary Cartesian frame (metres in
//! most generators, but the unit is never interpreted).  `Coord` keeps both
//! axes in `f64` so values parsed from text round-trip exactly.

use std::fmt;

/// A point in the trace's planar coordinate frame.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    pub const ORIGIN: Coord = Coord { x: 0.0, y: 0.0 };

    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Shift the point so that `(min_x, min_y)` maps to the origin.
    #[inline]
    pub fn shifted(self, min_x: f64, min_y: f64) -> Coord {
        Coord {
            x: self.x - min_x,
            y: self.y - min_y,
        }
    }

    /// Euclidean distance to `other`, in the frame's own units.
    #[inline]
    pub fn distance(self, other: Coord) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Component-wise minimum.  Handy for folding a bounding box.
    #[inline]
    pub fn min(self, other: Coord) -> Coord {
        Coord::new(self.x.min(other.x), self.y.min(other.y))
    }

    /// Component-wise maximum.
    #[inline]
    pub fn max(self, other: Coord) -> Coord {
        Coord::new(self.x.max(other.x), self.y.max(other.y))
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}
