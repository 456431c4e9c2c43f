//! Core types: knots, their boundary conditions and tensions, and the
//! Bezier segments produced by the solver.

pub use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Scalar
// ---------------------------------------------------------------------------

/// Convenience alias; all geometry is computed in `f64`.
pub type Scalar = f64;

/// Tolerance for floating-point comparisons.
pub const EPSILON: Scalar = 1.0 / 65536.0;

/// Chords shorter than this have no usable direction.
pub const DEGENERATE_CHORD: Scalar = 1e-12;

/// Tensions at or below this make `3·t − 1` vanish or change sign.
pub const MIN_TENSION: Scalar = 1.0 / 3.0;

/// Curl applied to a free end of an open path.
pub const DEFAULT_CURL: Scalar = 1.0;

// ---------------------------------------------------------------------------
// Tension
// ---------------------------------------------------------------------------

/// Tension on one side of a knot.
///
/// Higher values pull the curve tauter toward its chords. `MetaPost`'s
/// `tension atleast t` is expressed with `at_least`: the velocity on that
/// side is additionally capped so the segment stays inside the triangle
/// formed by its chord and the two tangent directions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tension {
    /// Tension magnitude; must be finite and greater than 1/3.
    pub value: Scalar,
    /// Bound the velocity by the bounding triangle.
    #[serde(default)]
    pub at_least: bool,
}

impl Tension {
    /// The default tension of 1.
    pub const UNIT: Self = Self::new(1.0);

    /// An exact tension.
    #[inline]
    pub const fn new(value: Scalar) -> Self {
        Self {
            value,
            at_least: false,
        }
    }

    /// A tension that also keeps the curve inside its bounding triangle.
    #[inline]
    pub const fn at_least(value: Scalar) -> Self {
        Self {
            value,
            at_least: true,
        }
    }

    /// Whether the magnitude is usable by the solver.
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.value.is_finite() && self.value > MIN_TENSION
    }
}

impl Default for Tension {
    fn default() -> Self {
        Self::UNIT
    }
}

// ---------------------------------------------------------------------------
// Boundary — constraint on one side of a knot
// ---------------------------------------------------------------------------

/// Constraint on the incoming (left) or outgoing (right) side of a knot.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Boundary {
    /// Let the solver choose the direction.
    #[default]
    Open,
    /// Zero mock curvature at this end, scaled by the curl ratio `gamma`.
    Curl(Scalar),
    /// A fixed direction, in radians, measured counter-clockwise from +x.
    Given(Scalar),
    /// The Bezier control point on this side is already known.
    Explicit(Point),
}

impl Boundary {
    /// A given direction pointing along `v`.
    pub fn towards(v: Vec2) -> Self {
        Self::Given(v.atan2())
    }

    /// Whether this side splits the path into independently solved runs.
    #[inline]
    pub const fn is_constrained(&self) -> bool {
        !matches!(self, Self::Open)
    }
}

// ---------------------------------------------------------------------------
// Knot
// ---------------------------------------------------------------------------

/// A point the curve must pass through, with its side constraints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Knot {
    /// The on-curve point.
    pub point: Point,
    /// Incoming side constraint.
    #[serde(default)]
    pub left: Boundary,
    /// Outgoing side constraint.
    #[serde(default)]
    pub right: Boundary,
    /// Tension on the incoming side.
    #[serde(default)]
    pub left_tension: Tension,
    /// Tension on the outgoing side.
    #[serde(default)]
    pub right_tension: Tension,
}

impl Knot {
    /// A knot with open sides and unit tensions.
    pub const fn new(point: Point) -> Self {
        Self::with_tension(point, Tension::UNIT)
    }

    /// A knot with open sides and the same tension on both of them.
    pub const fn with_tension(point: Point, tension: Tension) -> Self {
        Self {
            point,
            left: Boundary::Open,
            right: Boundary::Open,
            left_tension: tension,
            right_tension: tension,
        }
    }

    /// A knot whose control points are already fixed on both sides.
    pub const fn with_controls(point: Point, left_cp: Point, right_cp: Point) -> Self {
        Self {
            point,
            left: Boundary::Explicit(left_cp),
            right: Boundary::Explicit(right_cp),
            left_tension: Tension::UNIT,
            right_tension: Tension::UNIT,
        }
    }

    /// Whether either side carries a constraint.
    #[inline]
    pub const fn is_breakpoint(&self) -> bool {
        self.left.is_constrained() || self.right.is_constrained()
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// One cubic segment of a solved curve.
///
/// The segment starts at the previous segment's `point` (or the curve's
/// start for the first one).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bezier {
    /// Outgoing control point of the source knot.
    pub control_start: Point,
    /// Incoming control point of the destination knot.
    pub control_end: Point,
    /// The destination knot.
    pub point: Point,
}

/// Options for [`crate::build_curve`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveOptions {
    /// Tension applied to both sides of every knot.
    pub tension: Scalar,
    /// Close the path back onto its first point.
    pub cyclic: bool,
}

impl CurveOptions {
    pub const fn new(tension: Scalar, cyclic: bool) -> Self {
        Self { tension, cyclic }
    }
}

impl Default for CurveOptions {
    fn default() -> Self {
        Self {
            tension: 1.0,
            cyclic: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn knot_defaults() {
        let k = Knot::new(Point::new(1.0, 2.0));
        assert_eq!(k.point, Point::new(1.0, 2.0));
        assert_eq!(k.left, Boundary::Open);
        assert_eq!(k.right, Boundary::Open);
        assert_eq!(k.left_tension, Tension::UNIT);
        assert_eq!(k.right_tension.value, 1.0);
        assert!(!k.is_breakpoint());
    }

    #[test]
    fn tension_validity() {
        assert!(Tension::new(0.75).is_valid());
        assert!(Tension::at_least(4.0).is_valid());
        assert!(!Tension::new(1.0 / 3.0).is_valid());
        assert!(!Tension::new(0.0).is_valid());
        assert!(!Tension::new(-1.0).is_valid());
        assert!(!Tension::new(Scalar::NAN).is_valid());
        assert!(!Tension::new(Scalar::INFINITY).is_valid());
    }

    #[test]
    fn boundary_towards_vector() {
        let Boundary::Given(a) = Boundary::towards(Vec2::new(0.0, 2.0)) else {
            panic!("expected a given direction");
        };
        assert!((a - std::f64::consts::FRAC_PI_2).abs() < EPSILON);
        assert!(Boundary::Curl(1.0).is_constrained());
        assert!(!Boundary::Open.is_constrained());
    }

    #[test]
    fn explicit_controls_make_a_breakpoint() {
        let k = Knot::with_controls(Point::ZERO, Point::new(-1.0, 0.0), Point::new(1.0, 0.0));
        assert!(k.is_breakpoint());
    }

    #[test]
    fn bezier_serializes_camel_case() {
        let b = Bezier {
            control_start: Point::new(1.0, 2.0),
            control_end: Point::new(3.0, 4.0),
            point: Point::new(5.0, 6.0),
        };
        let json = serde_json::to_string(&b).unwrap();
        assert!(json.contains("\"controlStart\""), "{json}");
        assert!(json.contains("\"controlEnd\""), "{json}");
        assert!(json.contains("\"point\""), "{json}");
    }

    #[test]
    fn options_fill_missing_keys() {
        let opts: CurveOptions = serde_json::from_str(r#"{"cyclic": true}"#).unwrap();
        assert_eq!(opts, CurveOptions::new(1.0, true));
        let opts: CurveOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts, CurveOptions::default());
    }
}
