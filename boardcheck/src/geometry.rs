//! Geometry primitives for board-level checks.
//!
//! Components carry a point position only (no footprint polygons yet), so the
//! clearance and board-edge checks reduce to point-vs-point and
//! point-vs-polygon tests built from the helpers here.

use serde::{Deserialize, Serialize};

/// Distance below which two positions are considered coincident.
pub const COINCIDENT_EPS: f64 = 1e-6;

/// A 2D point in board units. Serializes as `[x, y]` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Midpoint between two points, used to locate pairwise findings.
    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point { x, y }
    }
}

impl From<Point> for (f64, f64) {
    fn from(p: Point) -> Self {
        (p.x, p.y)
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
}

impl BoundingBox {
    /// Smallest box enclosing all points, or `None` for an empty slice.
    pub fn from_points(points: &[Point]) -> Option<BoundingBox> {
        let first = points.first()?;
        let mut bbox = BoundingBox { min: *first, max: *first };
        for p in &points[1..] {
            bbox.min.x = bbox.min.x.min(p.x);
            bbox.min.y = bbox.min.y.min(p.y);
            bbox.max.x = bbox.max.x.max(p.x);
            bbox.max.y = bbox.max.y.max(p.y);
        }
        Some(bbox)
    }

    /// Inclusive containment test.
    pub fn contains(&self, p: &Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn expand(&self, margin: f64) -> BoundingBox {
        BoundingBox {
            min: Point::new(self.min.x - margin, self.min.y - margin),
            max: Point::new(self.max.x + margin, self.max.y + margin),
        }
    }
}

/// Distance from `p` to the segment `a`-`b`.
pub fn segment_distance(p: &Point, a: &Point, b: &Point) -> f64 {
    let ab_x = b.x - a.x;
    let ab_y = b.y - a.y;
    let len_sq = ab_x * ab_x + ab_y * ab_y;
    if len_sq <= COINCIDENT_EPS * COINCIDENT_EPS {
        return p.distance_to(a);
    }
    let t = (((p.x - a.x) * ab_x + (p.y - a.y) * ab_y) / len_sq).clamp(0.0, 1.0);
    let proj = Point::new(a.x + t * ab_x, a.y + t * ab_y);
    p.distance_to(&proj)
}

/// Point-in-polygon test with an inclusive boundary: a point lying on an edge
/// or vertex counts as inside. Polygons with fewer than 3 vertices contain
/// nothing.
pub fn point_in_polygon(p: &Point, polygon: &[Point]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    // Boundary first, so edge-crossing parity cannot misclassify it.
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        if segment_distance(p, &polygon[j], &polygon[i]) <= COINCIDENT_EPS {
            return true;
        }
        j = i;
    }

    // Even-odd ray cast to the right of `p`.
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (pi, pj) = (polygon[i], polygon[j]);
        if (pi.y > p.y) != (pj.y > p.y) {
            let x_cross = pi.x + (p.y - pi.y) * (pj.x - pi.x) / (pj.y - pi.y);
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}
