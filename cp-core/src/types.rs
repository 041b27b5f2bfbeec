use std::fmt;

use glam::DVec2;

/// A point in the plane.
///
/// Points are plain coordinates: two points with the same coordinates are
/// equal, and the engine never relies on points being unique.
pub type Point = DVec2;

/// Identifier for a visual element created by an [`crate::event::Event`].
///
/// Ids are allocated by an [`crate::event::EventStream`] and are only
/// meaningful within that stream. A fresh stream starts again from zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(pub u64);

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The x-range a recursive call is responsible for.
///
/// Used for framing only; the algorithm never reads it back.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub left: f64,
    pub right: f64,
}

impl Bounds {
    pub fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }

    /// Horizontal extent, clamped at zero like an SVG rect width.
    pub fn width(&self) -> f64 {
        (self.right - self.left).max(0.0)
    }
}

/// A candidate closest pair.
///
/// `a` and `b` always come from two different positions of the input,
/// although their coordinates may coincide.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pair {
    pub a: Point,
    pub b: Point,
}

impl Pair {
    pub fn new(a: Point, b: Point) -> Self {
        Self { a, b }
    }

    pub fn distance(&self) -> f64 {
        crate::geometry::distance(self.a, self.b)
    }
}

/// Styling tag of a highlighted x-range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockTag {
    /// The range of the call currently being entered.
    Subproblem,
    /// One of the two halves being combined.
    Half,
    /// The strip around the dividing line.
    Strip,
}

/// Styling tag of a drawn line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LineKind {
    /// Segment joining a candidate closest pair.
    Pair,
    /// Vertical dividing line of a subproblem.
    Divider,
}
