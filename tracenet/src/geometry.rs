//! Geometry primitives
//!
//! Board coordinates are plain `f64` units in image space. Nothing here knows
//! about board sides or features; it only answers distance and overlap
//! questions for the model and store layers.

use serde::{Deserialize, Serialize};

/// A 2D point on the board
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// True when `other` lies within `tolerance` (closed interval)
    pub fn is_near(&self, other: &Point, tolerance: f64) -> bool {
        self.distance_to(other) <= tolerance
    }

    /// Distance from this point to the segment `start`-`end`
    pub fn distance_to_segment(&self, start: &Point, end: &Point) -> f64 {
        let dx = end.x - start.x;
        let dy = end.y - start.y;
        let length_sq = dx * dx + dy * dy;

        if length_sq < 1e-12 {
            return self.distance_to(start);
        }

        let t = ((self.x - start.x) * dx + (self.y - start.y) * dy) / length_sq;
        let t = t.clamp(0.0, 1.0);
        let proj = Point::new(start.x + t * dx, start.y + t * dy);
        self.distance_to(&proj)
    }
}

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct Rect {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Rect {
    /// Build a rectangle from two corners in any order
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            min_x: x1.min(x2),
            min_y: y1.min(y2),
            max_x: x1.max(x2),
            max_y: y1.max(y2),
        }
    }

    /// Square of half-size `half` centred on `center`
    pub fn around(center: Point, half: f64) -> Self {
        Self::new(
            center.x - half,
            center.y - half,
            center.x + half,
            center.y + half,
        )
    }

    /// Rectangle of `width` x `height` centred on `center`
    pub fn centered(center: Point, width: f64, height: f64) -> Self {
        Self::new(
            center.x - width / 2.0,
            center.y - height / 2.0,
            center.x + width / 2.0,
            center.y + height / 2.0,
        )
    }

    /// Bounding box of a point sequence, `None` when empty
    pub fn bounding(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let mut rect = Rect::new(first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            rect.min_x = rect.min_x.min(p.x);
            rect.min_y = rect.min_y.min(p.y);
            rect.max_x = rect.max_x.max(p.x);
            rect.max_y = rect.max_y.max(p.y);
        }
        Some(rect)
    }

    /// Grow the rectangle by `margin` on every side
    pub fn inflate(&self, margin: f64) -> Self {
        Self {
            min_x: self.min_x - margin,
            min_y: self.min_y - margin,
            max_x: self.max_x + margin,
            max_y: self.max_y + margin,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Closed containment test (edges count as inside)
    pub fn contains(&self, p: &Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    /// Open-interval overlap test; rectangles that only touch do not intersect
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min_x < other.max_x
            && self.max_x > other.min_x
            && self.min_y < other.max_y
            && self.max_y > other.min_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let p1 = Point::new(0.0, 0.0);
        let p2 = Point::new(3.0, 4.0);
        assert!((p1.distance_to(&p2) - 5.0).abs() < 1e-9);
        assert!(p1.is_near(&p2, 5.0));
        assert!(!p1.is_near(&p2, 4.999));
    }

    #[test]
    fn test_distance_to_segment() {
        let start = Point::new(0.0, 0.0);
        let end = Point::new(10.0, 0.0);

        assert!((Point::new(5.0, 2.0).distance_to_segment(&start, &end) - 2.0).abs() < 1e-9);
        // Beyond the end the nearest point is the endpoint itself
        assert!((Point::new(13.0, 4.0).distance_to_segment(&start, &end) - 5.0).abs() < 1e-9);
        // Degenerate segment
        assert!((Point::new(3.0, 4.0).distance_to_segment(&start, &start) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_rect_intersects_is_open() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 20.0, 10.0);
        let c = Rect::new(9.0, 9.0, 20.0, 20.0);

        assert!(!a.intersects(&b), "touching edges do not intersect");
        assert!(a.intersects(&c));
        assert!(c.intersects(&a));
    }

    #[test]
    fn test_bounding() {
        assert!(Rect::bounding(&[]).is_none());

        let rect = Rect::bounding(&[
            Point::new(5.0, 1.0),
            Point::new(-2.0, 7.0),
            Point::new(3.0, 3.0),
        ])
        .unwrap();
        assert_eq!(rect, Rect::new(-2.0, 1.0, 5.0, 7.0));
        assert!(rect.contains(&Point::new(-2.0, 7.0)));
        assert_eq!(rect.inflate(1.0).width(), 9.0);
    }
}
