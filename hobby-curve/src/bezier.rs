//! Cubic Bezier segment evaluation.

use crate::types::{Bezier, Point, Scalar, Vec2};

/// Four control points of a cubic Bezier segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicSegment {
    pub p0: Point,
    pub p1: Point,
    pub p2: Point,
    pub p3: Point,
}

impl CubicSegment {
    #[must_use]
    pub const fn new(p0: Point, p1: Point, p2: Point, p3: Point) -> Self {
        Self { p0, p1, p2, p3 }
    }

    /// The full segment described by a solved [`Bezier`] starting at `start`.
    #[must_use]
    pub const fn from_bezier(start: Point, b: &Bezier) -> Self {
        Self::new(start, b.control_start, b.control_end, b.point)
    }

    /// Evaluate the point at parameter `t` in [0, 1].
    #[expect(
        clippy::many_single_char_names,
        reason = "Bernstein basis weights a, b, c, d at s = 1 - t"
    )]
    #[must_use]
    pub fn eval(&self, t: Scalar) -> Point {
        let s = 1.0 - t;
        let a = s * s * s;
        let b = 3.0 * s * s * t;
        let c = 3.0 * s * t * t;
        let d = t * t * t;
        Point::new(
            d.mul_add(
                self.p3.x,
                a.mul_add(self.p0.x, b.mul_add(self.p1.x, c * self.p2.x)),
            ),
            d.mul_add(
                self.p3.y,
                a.mul_add(self.p0.y, b.mul_add(self.p1.y, c * self.p2.y)),
            ),
        )
    }

    /// Evaluate the derivative (tangent vector) at parameter `t` in [0, 1].
    #[must_use]
    pub fn eval_deriv(&self, t: Scalar) -> Vec2 {
        let s = 1.0 - t;
        let a = 3.0 * s * s;
        let b = 6.0 * s * t;
        let c = 3.0 * t * t;
        a * (self.p1 - self.p0) + b * (self.p2 - self.p1) + c * (self.p3 - self.p2)
    }

    /// Length of the outgoing handle, `|p1 - p0|`.
    #[must_use]
    pub fn start_handle(&self) -> Scalar {
        (self.p1 - self.p0).hypot()
    }

    /// Length of the incoming handle, `|p3 - p2|`.
    #[must_use]
    pub fn end_handle(&self) -> Scalar {
        (self.p3 - self.p2).hypot()
    }
}
