//! Control-point synthesis from solved edge angles.

use crate::{
    math,
    path::solver::EdgeAngles,
    types::{Point, Scalar, Tension, Vec2},
};

/// Below this the tangent lines of an edge are treated as parallel and the
/// bounding triangle is unbounded.
const MIN_SINE: Scalar = 1e-12;

/// Widening applied to the bounding triangle, `1 + 2^-12`.
const SAFETY_FACTOR: Scalar = 1.000_244_140_62;

/// The two inner control points of one cubic edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Controls {
    /// Outgoing control point of the source knot.
    pub start: Point,
    /// Incoming control point of the destination knot.
    pub end: Point,
}

/// Controls for an edge drawn as a straight line from `p` to `q`.
///
/// `delta` is `q - p`. The handles lie on the chord, a third of its length
/// from each end divided by the tension on that side.
pub fn straight(p: Point, q: Point, delta: Vec2, right: Tension, left: Tension) -> Controls {
    Controls {
        start: p + delta / (3.0 * right.value),
        end: q - delta / (3.0 * left.value),
    }
}

/// Controls for the edge from `p` to `q` leaving at `angles.theta` and
/// arriving at `angles.phi`, both relative to the chord `delta`.
pub fn curved(
    p: Point,
    q: Point,
    delta: Vec2,
    angles: EdgeAngles,
    right: Tension,
    left: Tension,
) -> Controls {
    let (st, ct) = angles.theta.sin_cos();
    let (sf, cf) = angles.phi.sin_cos();

    let rr = math::velocity(st, ct, sf, cf, right.value);
    let ss = math::velocity(sf, cf, st, ct, left.value);
    let (rr, ss) = clamp_at_least(rr, ss, st, ct, sf, cf, right.at_least, left.at_least);

    // start = p + rr·R(theta)·delta, end = q − ss·R(−phi)·delta
    let start = Point::new(
        rr.mul_add(delta.x.mul_add(ct, -(delta.y * st)), p.x),
        rr.mul_add(delta.y.mul_add(ct, delta.x * st), p.y),
    );
    let end = Point::new(
        ss.mul_add(-delta.x.mul_add(cf, delta.y * sf), q.x),
        ss.mul_add(-delta.y.mul_add(cf, -(delta.x * sf)), q.y),
    );
    Controls { start, end }
}

/// Cap the velocities of `at_least` sides so the handles stay inside the
/// triangle formed by the chord and the two tangent lines.
///
/// Only applies when the tangents bend to the same side of the chord.
#[expect(
    clippy::too_many_arguments,
    reason = "takes both velocities, both sin/cos pairs and both side flags"
)]
pub fn clamp_at_least(
    rr: Scalar,
    ss: Scalar,
    st: Scalar,
    ct: Scalar,
    sf: Scalar,
    cf: Scalar,
    right_at_least: bool,
    left_at_least: bool,
) -> (Scalar, Scalar) {
    if !(right_at_least || left_at_least) {
        return (rr, ss);
    }
    if !((st >= 0.0 && sf >= 0.0) || (st <= 0.0 && sf <= 0.0)) {
        return (rr, ss);
    }

    // sin(|theta| + |phi|)
    let sine = st.abs().mul_add(cf, sf.abs() * ct);
    if sine <= MIN_SINE {
        return (rr, ss);
    }
    let sine = sine * SAFETY_FACTOR;

    let rr = if right_at_least {
        rr.min(sf.abs() / sine)
    } else {
        rr
    };
    let ss = if left_at_least {
        ss.min(st.abs() / sine)
    } else {
        ss
    };
    (rr, ss)
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_4;

    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn straight_handles_sit_on_the_chord() {
        let p = Point::new(0.0, 0.0);
        let q = Point::new(6.0, 3.0);
        let c = straight(p, q, q - p, Tension::UNIT, Tension::new(2.0));
        assert_relative_eq!(c.start.x, 2.0);
        assert_relative_eq!(c.start.y, 1.0);
        assert_relative_eq!(c.end.x, 5.0);
        assert_relative_eq!(c.end.y, 2.5);
    }

    #[test]
    fn quarter_circle_handles() {
        // Counter-clockwise arc from (1, 0) to (0, 1).
        let p = Point::new(1.0, 0.0);
        let q = Point::new(0.0, 1.0);
        let angles = EdgeAngles {
            theta: -FRAC_PI_4,
            phi: -FRAC_PI_4,
        };
        let c = curved(p, q, q - p, angles, Tension::UNIT, Tension::UNIT);
        assert_relative_eq!(c.start.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(c.start.y, 0.552_285, epsilon = 1e-5);
        assert_relative_eq!(c.end.x, 0.552_285, epsilon = 1e-5);
        assert_relative_eq!(c.end.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn zero_angles_match_the_straight_line() {
        let p = Point::new(-2.0, 1.0);
        let q = Point::new(4.0, -5.0);
        let angles = EdgeAngles {
            theta: 0.0,
            phi: 0.0,
        };
        let t = Tension::new(1.5);
        let a = curved(p, q, q - p, angles, t, t);
        let b = straight(p, q, q - p, t, t);
        assert_relative_eq!(a.start.x, b.start.x, epsilon = 1e-12);
        assert_relative_eq!(a.start.y, b.start.y, epsilon = 1e-12);
        assert_relative_eq!(a.end.x, b.end.x, epsilon = 1e-12);
        assert_relative_eq!(a.end.y, b.end.y, epsilon = 1e-12);
    }

    #[test]
    fn clamp_caps_the_left_velocity() {
        let (st, ct) = 0.1_f64.sin_cos();
        let (sf, cf) = 1.4_f64.sin_cos();
        let rr = math::velocity(st, ct, sf, cf, 1.0);
        let ss = math::velocity(sf, cf, st, ct, 1.0);

        let (r2, s2) = clamp_at_least(rr, ss, st, ct, sf, cf, false, true);
        assert_relative_eq!(r2, rr);
        assert!(s2 < ss, "{s2} should be below {ss}");
        let bound = st / (1.5_f64.sin() * SAFETY_FACTOR);
        assert_relative_eq!(s2, bound, epsilon = 1e-12);
    }

    #[test]
    fn clamp_ignores_opposite_bends_and_exact_tensions() {
        let (st, ct) = 0.3_f64.sin_cos();
        let (sf, cf) = (-1.2_f64).sin_cos();
        assert_eq!(
            clamp_at_least(3.0, 3.0, st, ct, sf, cf, true, true),
            (3.0, 3.0)
        );

        let (sf, cf) = 1.2_f64.sin_cos();
        assert_eq!(
            clamp_at_least(3.0, 3.0, st, ct, sf, cf, false, false),
            (3.0, 3.0)
        );
    }

    #[test]
    fn clamp_never_lengthens() {
        for theta in [-1.3, -0.5, 0.0, 0.2, 0.9, 1.4] {
            for phi in [-1.1, -0.2, 0.0, 0.4, 1.5] {
                let (st, ct) = f64::sin_cos(theta);
                let (sf, cf) = f64::sin_cos(phi);
                let rr = math::velocity(st, ct, sf, cf, 1.0);
                let ss = math::velocity(sf, cf, st, ct, 1.0);
                let (r2, s2) = clamp_at_least(rr, ss, st, ct, sf, cf, true, true);
                assert!(r2 <= rr && s2 <= ss);
            }
        }
    }
}
