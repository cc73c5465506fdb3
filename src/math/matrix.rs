use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::math::rect::Rect;

/// A 2D affine transform stored as six floats `[a, b, c, d, e, f]`,
/// standing for the 3x3 matrix
///
/// ```text
/// | a c e |
/// | b d f |
/// | 0 0 1 |
/// ```
///
/// The component ordering matches mainstream 2D canvas APIs so downstream
/// renderers can hand the array to `setTransform` unchanged. Serializes as a
/// bare 6-element array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mat2D(pub [f64; 6]);

impl Mat2D {
    /// The identity transform `[1, 0, 0, 1, 0, 0]`.
    pub const IDENTITY: Self = Self([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    #[inline]
    #[must_use]
    pub fn identity() -> Self {
        Self::IDENTITY
    }

    /// A pure translation by `(x, y)`.
    #[inline]
    #[must_use]
    pub fn translation(x: f64, y: f64) -> Self {
        Self([1.0, 0.0, 0.0, 1.0, x, y])
    }

    /// A pure scale about the origin.
    #[inline]
    #[must_use]
    pub fn scale(sx: f64, sy: f64) -> Self {
        Self([sx, 0.0, 0.0, sy, 0.0, 0.0])
    }

    /// A counter-clockwise rotation about the origin, in radians.
    #[inline]
    #[must_use]
    pub fn rotation(radians: f64) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self([cos, sin, -sin, cos, 0.0, 0.0])
    }

    /// A shear along both axes, angles in radians.
    #[inline]
    #[must_use]
    pub fn skew(skew_x: f64, skew_y: f64) -> Self {
        Self([1.0, skew_y.tan(), skew_x.tan(), 1.0, 0.0, 0.0])
    }

    /// Matrix product `self * other`. Applying the result to a point applies
    /// `other` first, then `self`.
    #[must_use]
    pub fn multiply(&self, other: &Self) -> Self {
        let [a1, b1, c1, d1, e1, f1] = self.0;
        let [a2, b2, c2, d2, e2, f2] = other.0;
        Self([
            a1 * a2 + c1 * b2,
            b1 * a2 + d1 * b2,
            a1 * c2 + c1 * d2,
            b1 * c2 + d1 * d2,
            a1 * e2 + c1 * f2 + e1,
            b1 * e2 + d1 * f2 + f1,
        ])
    }

    /// Analytic inverse. A singular matrix (zero determinant) inverts to
    /// identity rather than producing non-finite components.
    #[must_use]
    pub fn invert(&self) -> Self {
        let [a, b, c, d, e, f] = self.0;
        let det = a * d - b * c;
        if det == 0.0 {
            return Self::IDENTITY;
        }
        let inv = 1.0 / det;
        Self([
            d * inv,
            -b * inv,
            -c * inv,
            a * inv,
            (c * f - d * e) * inv,
            (b * e - a * f) * inv,
        ])
    }

    /// Transforms a point.
    #[inline]
    #[must_use]
    pub fn apply_point(&self, x: f64, y: f64) -> DVec2 {
        let [a, b, c, d, e, f] = self.0;
        DVec2::new(a * x + c * y + e, b * x + d * y + f)
    }

    /// Axis-aligned bounding box of the four transformed corners of `rect`.
    #[must_use]
    pub fn apply_rect(&self, rect: &Rect) -> Rect {
        let corners = [
            self.apply_point(rect.x, rect.y),
            self.apply_point(rect.x + rect.width, rect.y),
            self.apply_point(rect.x + rect.width, rect.y + rect.height),
            self.apply_point(rect.x, rect.y + rect.height),
        ];
        Rect::from_points(&corners).unwrap_or(Rect::ZERO)
    }

    /// Composes the full node transform. Applied to a local point the steps
    /// run anchor-shift, scale, skew, rotation, then placement at `(x, y)`,
    /// so the anchor point `(ax, ay)` is the pivot of rotation/scale/skew
    /// and maps to `(x, y)` in parent space.
    ///
    /// Rotation and skew angles are in degrees.
    #[must_use]
    pub fn from_transform(
        x: f64,
        y: f64,
        sx: f64,
        sy: f64,
        rotation_deg: f64,
        ax: f64,
        ay: f64,
        skew_x_deg: f64,
        skew_y_deg: f64,
    ) -> Self {
        let mut m = Self::translation(x, y);
        m = m.multiply(&Self::rotation(rotation_deg.to_radians()));
        m = m.multiply(&Self::skew(skew_x_deg.to_radians(), skew_y_deg.to_radians()));
        m = m.multiply(&Self::scale(sx, sy));
        m.multiply(&Self::translation(-ax, -ay))
    }

    /// Component-wise approximate equality.
    #[must_use]
    pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.0
            .iter()
            .zip(other.0.iter())
            .all(|(a, b)| (a - b).abs() <= epsilon)
    }
}

impl Default for Mat2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn multiply_applies_right_operand_first() {
        let t = Mat2D::translation(10.0, 0.0);
        let s = Mat2D::scale(2.0, 2.0);
        // multiply(t, s): scale first, then translate
        let p = t.multiply(&s).apply_point(1.0, 1.0);
        assert!((p.x - 12.0).abs() < EPSILON);
        assert!((p.y - 2.0).abs() < EPSILON);
    }

    #[test]
    fn invert_roundtrip() {
        let m = Mat2D::from_transform(12.0, -7.5, 2.0, 0.5, 33.0, 4.0, 9.0, 10.0, -5.0);
        let round = m.invert().multiply(&m);
        assert!(round.approx_eq(&Mat2D::IDENTITY, EPSILON));

        let double = m.invert().invert();
        assert!(double.approx_eq(&m, EPSILON));
    }

    #[test]
    fn invert_singular_returns_identity() {
        let m = Mat2D([0.0, 0.0, 0.0, 0.0, 5.0, 5.0]);
        assert_eq!(m.invert(), Mat2D::IDENTITY);
    }

    #[test]
    fn from_transform_pure_translation() {
        let m = Mat2D::from_transform(3.0, 4.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        assert!(m.approx_eq(&Mat2D::translation(3.0, 4.0), EPSILON));
    }

    #[test]
    fn anchor_maps_to_position() {
        let m = Mat2D::from_transform(100.0, 50.0, 3.0, 0.5, 77.0, 8.0, 6.0, 0.0, 0.0);
        let p = m.apply_point(8.0, 6.0);
        assert!((p.x - 100.0).abs() < EPSILON);
        assert!((p.y - 50.0).abs() < EPSILON);
    }

    #[test]
    fn apply_rect_identity_is_noop() {
        let r = Rect::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(Mat2D::IDENTITY.apply_rect(&r), r);
    }
}
