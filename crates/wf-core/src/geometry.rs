//! Canvas geometry shared by the graph model and the editors.
//!
//! Placement and drag use the same clamping rule so a restored circuit lands
//! exactly where an interactive drag would have put it.

use crate::numeric::Real;

/// A position on a circuit canvas, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: Real,
    pub y: Real,
}

impl Point {
    pub const fn new(x: Real, y: Real) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> Real {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Shortest distance from `self` to the segment `a`-`b`.
    pub fn distance_to_segment(self, a: Point, b: Point) -> Real {
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let len_sq = dx * dx + dy * dy;
        if len_sq <= Real::EPSILON {
            return self.distance(a);
        }
        let t = (((self.x - a.x) * dx + (self.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
        self.distance(Point::new(a.x + t * dx, a.y + t * dy))
    }
}

impl From<[Real; 2]> for Point {
    fn from(value: [Real; 2]) -> Self {
        Point::new(value[0], value[1])
    }
}

impl From<Point> for [Real; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

/// Drawable area of one canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasRect {
    pub width: Real,
    pub height: Real,
}

impl CanvasRect {
    pub const fn new(width: Real, height: Real) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= 0.0 && p.y >= 0.0 && p.x <= self.width && p.y <= self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

impl Default for CanvasRect {
    fn default() -> Self {
        Self::new(1000.0, 600.0)
    }
}

/// Clamp `pos` into `rect` keeping `inset` clear of every border.
///
/// When the canvas is narrower than twice the inset the axis collapses to its
/// midpoint. Non-finite coordinates land on the canvas centre.
pub fn clamp_to_canvas(pos: Point, rect: CanvasRect, inset: Real) -> Point {
    Point::new(
        clamp_axis(pos.x, rect.width, inset),
        clamp_axis(pos.y, rect.height, inset),
    )
}

fn clamp_axis(v: Real, extent: Real, inset: Real) -> Real {
    let lo = inset;
    let hi = extent - inset;
    if hi < lo {
        return extent / 2.0;
    }
    if !v.is_finite() {
        return (lo + hi) / 2.0;
    }
    v.clamp(lo, hi)
}
