use glam::DVec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    #[inline]
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    #[must_use]
    pub fn from_min_max(min: DVec2, max: DVec2) -> Self {
        Self {
            x: min.x,
            y: min.y,
            width: max.x - min.x,
            height: max.y - min.y,
        }
    }

    /// Bounding box of a point set. Returns `None` for an empty slice.
    #[must_use]
    pub fn from_points(points: &[DVec2]) -> Option<Self> {
        let first = points.first()?;
        let mut min = *first;
        let mut max = *first;
        for p in &points[1..] {
            min = min.min(*p);
            max = max.max(*p);
        }
        Some(Self::from_min_max(min, max))
    }

    #[inline]
    #[must_use]
    pub fn min(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    #[inline]
    #[must_use]
    pub fn max(&self) -> DVec2 {
        DVec2::new(self.x + self.width, self.y + self.height)
    }

    /// Smallest rectangle containing both operands.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self::from_min_max(self.min().min(other.min()), self.max().max(other.max()))
    }

    /// Containment test, inclusive of all edges.
    #[inline]
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}

impl Default for Rect {
    fn default() -> Self {
        Self::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_expands() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, -5.0, 10.0, 10.0);
        let u = a.union(&b);
        assert_eq!(u, Rect::new(0.0, -5.0, 15.0, 15.0));
    }

    #[test]
    fn contains_is_edge_inclusive() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains(0.0, 0.0));
        assert!(r.contains(10.0, 10.0));
        assert!(!r.contains(10.1, 5.0));
    }

    #[test]
    fn from_points_empty_is_none() {
        assert!(Rect::from_points(&[]).is_none());
    }
}
