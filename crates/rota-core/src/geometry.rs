//! Ring layout for a wheel drawn on a fixed-size canvas.
//!
//! Rings are assigned outermost-first: layer 0 gets the outer edge of the
//! radius budget and every following layer sits one ring width plus
//! [`RING_SPACING`] further in.

use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Gap between the outermost ring and the canvas edge.
pub const MARGIN: f64 = 12.0;
/// Gap between two neighbouring rings.
pub const RING_SPACING: f64 = 6.0;
/// Smallest radius budget a canvas must leave for its rings.
pub const MIN_RADIUS_BUDGET: f64 = 24.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Point {
        Point::new(f64::from(self.width) / 2.0, f64::from(self.height) / 2.0)
    }

    /// Radius available to all rings together: half the smaller side minus
    /// [`MARGIN`], never negative.
    pub fn radius_budget(&self) -> f64 {
        (f64::from(self.width.min(self.height)) / 2.0 - MARGIN).max(0.0)
    }

    /// Whether the canvas leaves room for rings of non-zero width.
    pub fn fits_rings(&self) -> bool {
        self.radius_budget() >= MIN_RADIUS_BUDGET
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self::new(520, 520)
    }
}

impl fmt::Display for CanvasSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid canvas size '{0}', expected <width>x<height>")]
pub struct ParseCanvasSizeError(String);

impl FromStr for CanvasSize {
    type Err = ParseCanvasSizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseCanvasSizeError(s.to_string());
        let (w, h) = s.trim().split_once(['x', 'X']).ok_or_else(err)?;
        let width = w.trim().parse().map_err(|_| err())?;
        let height = h.trim().parse().map_err(|_| err())?;
        Ok(Self::new(width, height))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RingBounds {
    pub outer: f64,
    pub inner: f64,
}

impl RingBounds {
    pub fn width(&self) -> f64 {
        self.outer - self.inner
    }

    pub fn mid(&self) -> f64 {
        (self.outer + self.inner) / 2.0
    }

    pub fn contains(&self, radius: f64) -> bool {
        radius >= self.inner && radius <= self.outer
    }
}

/// Splits the canvas radius budget into `count` equal rings, outermost first.
///
/// Ring widths are whole pixels while that leaves at least one pixel per ring.
/// When the budget is too small for that, spacing is dropped and the budget is
/// divided exactly so the rings still shrink strictly inwards.
pub fn ring_bounds(count: usize, canvas: CanvasSize) -> Vec<RingBounds> {
    if count == 0 {
        return Vec::new();
    }
    let total = canvas.radius_budget();
    let n = count as f64;

    let mut spacing = RING_SPACING;
    let mut ring_width = ((total - (n - 1.0) * spacing) / n).floor();
    if ring_width < 1.0 {
        spacing = 0.0;
        ring_width = total / n;
    }

    (0..count)
        .map(|i| {
            let outer = total - i as f64 * (ring_width + spacing);
            RingBounds {
                outer,
                inner: (outer - ring_width).max(0.0),
            }
        })
        .collect()
}
