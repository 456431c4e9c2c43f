//! Curve construction: validation, boundary normalization, breakpoint runs
//! and control-point synthesis.
//!
//! The knots are held in a slice and visited by index; the successor of
//! knot `i` is `(i + 1) % n`. Every pass is a function from the previous
//! pass's output to a new value, so a failed build leaves nothing behind.

pub mod controls;
pub mod geometry;
pub mod solver;

use std::fmt;

use kurbo::BezPath;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use self::{
    controls::Controls,
    geometry::Geometry,
    solver::{EdgeAngles, EndCondition, Solution},
};
use crate::{
    bezier::CubicSegment,
    error::CurveError,
    format,
    types::{
        Bezier, Boundary, CurveOptions, DEFAULT_CURL, EPSILON, Knot, Point, Scalar, Tension, Vec2,
    },
};

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Compute the Bezier segments of the curve through `points`.
///
/// Returns one [`Bezier`] per edge: `points.len() - 1` for an open path,
/// `points.len()` for a cyclic one, in which case the last segment ends at
/// `points[0]`.
///
/// # Errors
///
/// See [`Curve::through`].
pub fn build_curve(points: &[Point], options: &CurveOptions) -> Result<Vec<Bezier>, CurveError> {
    Curve::through(points, options).map(|curve| curve.segments)
}

/// A solved curve: a start point followed by one cubic segment per edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Curve {
    /// The first knot.
    pub start: Point,
    /// One segment per edge, each ending at the next knot.
    pub segments: Vec<Bezier>,
    /// Whether the last segment returns to `start`.
    pub cyclic: bool,
}

impl Curve {
    /// Solve the curve through `points` with one tension on every knot.
    ///
    /// # Errors
    ///
    /// - [`CurveError::InvalidInput`] for fewer than two points or a
    ///   non-finite coordinate;
    /// - [`CurveError::DegenerateGeometry`] if two consecutive points
    ///   coincide (including the last and first of a cyclic path);
    /// - [`CurveError::NumericInstability`] if the tension is not finite or
    ///   not greater than 1/3.
    pub fn through(points: &[Point], options: &CurveOptions) -> Result<Self, CurveError> {
        let tension = Tension::new(options.tension);
        let knots: Vec<Knot> = points
            .iter()
            .map(|&p| Knot::with_tension(p, tension))
            .collect();
        Self::from_knots(&knots, options.cyclic)
    }

    /// Solve the curve through fully specified knots.
    ///
    /// # Errors
    ///
    /// As [`Curve::through`]; additionally [`CurveError::InvalidInput`] for a
    /// non-finite direction or control point, or a negative curl.
    pub fn from_knots(knots: &[Knot], cyclic: bool) -> Result<Self, CurveError> {
        validate(knots)?;
        let points: Vec<Point> = knots.iter().map(|k| k.point).collect();
        let geom = Geometry::measure(&points, cyclic)?;

        let knots = normalize_boundaries(knots, cyclic);
        let choices = plan(&knots, &geom);
        let segments = synthesize(&knots, &geom, &choices);

        debug!(
            knots = knots.len(),
            segments = segments.len(),
            cyclic,
            "solved curve"
        );

        Ok(Self {
            start: points[0],
            segments,
            cyclic,
        })
    }

    /// Number of segments.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The on-curve points in order. A cyclic curve ends with its start
    /// point again.
    #[must_use]
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        std::iter::once(self.start).chain(self.segments.iter().map(|s| s.point))
    }

    /// Segment `i` with its start point filled in.
    #[must_use]
    pub fn cubic(&self, i: usize) -> Option<CubicSegment> {
        let seg = self.segments.get(i)?;
        let from = if i == 0 {
            self.start
        } else {
            self.segments[i - 1].point
        };
        Some(CubicSegment::from_bezier(from, seg))
    }

    /// Point at time `t`, where segment `i` spans `[i, i + 1]`.
    ///
    /// `t` is clamped on an open curve and wraps on a cyclic one.
    #[must_use]
    pub fn point_at(&self, t: Scalar) -> Point {
        self.locate(t)
            .map_or(self.start, |(seg, frac)| seg.eval(frac))
    }

    /// Tangent vector at time `t` (see [`Curve::point_at`]).
    #[must_use]
    pub fn direction_at(&self, t: Scalar) -> Vec2 {
        self.locate(t)
            .map_or(Vec2::ZERO, |(seg, frac)| seg.eval_deriv(frac))
    }

    #[expect(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "t is clamped to [0, n] before flooring"
    )]
    fn locate(&self, t: Scalar) -> Option<(CubicSegment, Scalar)> {
        let n = self.len();
        if n == 0 || !t.is_finite() {
            return None;
        }
        let n_f = n as Scalar;
        let t = if self.cyclic {
            t.rem_euclid(n_f)
        } else {
            t.clamp(0.0, n_f)
        };
        let seg = (t.floor() as usize).min(n - 1);
        Some((self.cubic(seg)?, t - seg as Scalar))
    }

    /// The curve as a kurbo path, closed if cyclic.
    #[must_use]
    pub fn to_bez_path(&self) -> BezPath {
        let mut bp = BezPath::new();
        bp.move_to(self.start);
        for seg in &self.segments {
            bp.curve_to(seg.control_start, seg.control_end, seg.point);
        }
        if self.cyclic {
            bp.close_path();
        }
        bp
    }

    /// The curve as a path-description string; see [`format::path_data`].
    #[must_use]
    pub fn to_path_data(&self, precision: Option<usize>) -> String {
        format::path_data(self.start, &self.segments, precision)
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_path_data(None))
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(knots: &[Knot]) -> Result<(), CurveError> {
    if knots.len() < 2 {
        return Err(CurveError::InvalidInput(format!(
            "need at least 2 points, got {}",
            knots.len()
        )));
    }

    for (i, knot) in knots.iter().enumerate() {
        if !knot.point.is_finite() {
            return Err(CurveError::InvalidInput(format!(
                "point {i} is not finite: ({}, {})",
                knot.point.x, knot.point.y
            )));
        }
        for side in [knot.left, knot.right] {
            check_boundary(i, side)?;
        }
        for tension in [knot.left_tension, knot.right_tension] {
            if !tension.is_valid() {
                return Err(CurveError::NumericInstability {
                    knot: i,
                    tension: tension.value,
                });
            }
        }
    }
    Ok(())
}

fn check_boundary(knot: usize, side: Boundary) -> Result<(), CurveError> {
    let ok = match side {
        Boundary::Open => true,
        Boundary::Curl(gamma) => gamma.is_finite() && gamma >= 0.0,
        Boundary::Given(angle) => angle.is_finite(),
        Boundary::Explicit(p) => p.is_finite(),
    };
    if ok {
        Ok(())
    } else {
        Err(CurveError::InvalidInput(format!(
            "knot {knot} has an unusable constraint: {side:?}"
        )))
    }
}

// ---------------------------------------------------------------------------
// Boundary normalization
// ---------------------------------------------------------------------------

/// Give every breakpoint a constraint on both sides.
///
/// A curl or direction on one side of a knot applies to its open side too.
/// An open side next to a fixed control point continues the line through
/// that control, or curls if the control sits on the knot. Finally the free
/// ends of an open path curl.
fn normalize_boundaries(knots: &[Knot], cyclic: bool) -> Vec<Knot> {
    let mut knots = knots.to_vec();

    for knot in &mut knots {
        match (knot.left, knot.right) {
            (Boundary::Open, side @ (Boundary::Curl(_) | Boundary::Given(_))) => knot.left = side,
            (side @ (Boundary::Curl(_) | Boundary::Given(_)), Boundary::Open) => knot.right = side,
            (Boundary::Open, Boundary::Explicit(cp)) => {
                knot.left = direction_or_curl(cp - knot.point);
            }
            (Boundary::Explicit(cp), Boundary::Open) => {
                knot.right = direction_or_curl(knot.point - cp);
            }
            _ => {}
        }
    }

    if !cyclic {
        if let Some(first) = knots.first_mut() {
            if first.right == Boundary::Open {
                first.right = Boundary::Curl(DEFAULT_CURL);
            }
        }
        if let Some(last) = knots.last_mut() {
            if last.left == Boundary::Open {
                last.left = Boundary::Curl(DEFAULT_CURL);
            }
        }
    }
    knots
}

fn direction_or_curl(v: Vec2) -> Boundary {
    if v.hypot() < EPSILON {
        Boundary::Curl(DEFAULT_CURL)
    } else {
        Boundary::towards(v)
    }
}

// ---------------------------------------------------------------------------
// Run planning
// ---------------------------------------------------------------------------

/// How the controls of one edge are obtained.
#[derive(Debug, Clone, Copy)]
enum EdgeChoice {
    /// Both controls were supplied.
    Fixed(Controls),
    /// Two facing curls: a straight line.
    Straight,
    /// Solved departure and arrival angles.
    Angles(EdgeAngles),
}

/// Split the path at its breakpoints and choose every edge, in edge order.
fn plan(knots: &[Knot], geom: &Geometry) -> Vec<EdgeChoice> {
    let n = knots.len();
    let mut choices: Vec<(usize, EdgeChoice)> = Vec::with_capacity(geom.edge_count());

    if geom.cyclic {
        let breaks: Vec<usize> = (0..n).filter(|&k| knots[k].is_breakpoint()).collect();
        if breaks.is_empty() {
            choices.extend(angles_of(&solver::solve_cycle(knots, geom)));
        } else {
            for (i, &from) in breaks.iter().enumerate() {
                let to = breaks[(i + 1) % breaks.len()];
                choose_run(knots, geom, &cyclic_index_range(from, to, n), &mut choices);
            }
        }
    } else {
        let mut breaks = vec![0];
        breaks.extend((1..n - 1).filter(|&k| knots[k].is_breakpoint()));
        breaks.push(n - 1);
        for w in breaks.windows(2) {
            let indices: Vec<usize> = (w[0]..=w[1]).collect();
            choose_run(knots, geom, &indices, &mut choices);
        }
    }

    choices.sort_unstable_by_key(|&(edge, _)| edge);
    debug_assert_eq!(choices.len(), geom.edge_count());
    choices.into_iter().map(|(_, choice)| choice).collect()
}

/// Knot indices from `start` forward to `end` around a cycle of `n`
/// knots. When `start == end` the whole cycle is listed, with `start`
/// at both ends.
fn cyclic_index_range(start: usize, end: usize, n: usize) -> Vec<usize> {
    let mut indices = vec![start];
    let mut k = start;
    loop {
        k = (k + 1) % n;
        indices.push(k);
        if k == end {
            break;
        }
    }
    indices
}

fn choose_run(
    knots: &[Knot],
    geom: &Geometry,
    indices: &[usize],
    choices: &mut Vec<(usize, EdgeChoice)>,
) {
    let first = &knots[indices[0]];
    let last = &knots[indices[indices.len() - 1]];
    trace!(from = indices[0], to = indices[indices.len() - 1], "solving run");

    if let (2, Boundary::Explicit(start), Boundary::Explicit(end)) =
        (indices.len(), first.right, last.left)
    {
        choices.push((indices[0], EdgeChoice::Fixed(Controls { start, end })));
        return;
    }

    let start = start_condition(first);
    let end = end_condition(last);
    if indices.len() == 2 && matches!((start, end), (EndCondition::Curl(_), EndCondition::Curl(_)))
    {
        choices.push((indices[0], EdgeChoice::Straight));
        return;
    }

    choices.extend(angles_of(&solver::solve_open(
        knots, geom, indices, start, end,
    )));
}

fn angles_of(solution: &Solution) -> impl Iterator<Item = (usize, EdgeChoice)> + '_ {
    solution
        .edges()
        .map(|(edge, angles)| (edge, EdgeChoice::Angles(angles)))
}

/// Boundary condition where a run leaves `knot`.
fn start_condition(knot: &Knot) -> EndCondition {
    match knot.right {
        Boundary::Curl(gamma) => EndCondition::Curl(gamma),
        Boundary::Given(angle) => EndCondition::Given(angle),
        Boundary::Explicit(cp) => end_condition_along(cp - knot.point),
        Boundary::Open => EndCondition::Curl(DEFAULT_CURL),
    }
}

/// Boundary condition where a run arrives at `knot`.
fn end_condition(knot: &Knot) -> EndCondition {
    match knot.left {
        Boundary::Curl(gamma) => EndCondition::Curl(gamma),
        Boundary::Given(angle) => EndCondition::Given(angle),
        Boundary::Explicit(cp) => end_condition_along(knot.point - cp),
        Boundary::Open => EndCondition::Curl(DEFAULT_CURL),
    }
}

fn end_condition_along(v: Vec2) -> EndCondition {
    if v.hypot() < EPSILON {
        EndCondition::Curl(DEFAULT_CURL)
    } else {
        EndCondition::Given(v.atan2())
    }
}

// ---------------------------------------------------------------------------
// Synthesis
// ---------------------------------------------------------------------------

fn synthesize(knots: &[Knot], geom: &Geometry, choices: &[EdgeChoice]) -> Vec<Bezier> {
    let n = knots.len();
    choices
        .iter()
        .enumerate()
        .map(|(i, choice)| {
            let from = &knots[i];
            let to = &knots[(i + 1) % n];
            let (p, q, delta) = (from.point, to.point, geom.delta[i]);
            let (right, left) = (from.right_tension, to.left_tension);

            let mut c = match *choice {
                EdgeChoice::Fixed(c) => c,
                EdgeChoice::Straight => controls::straight(p, q, delta, right, left),
                EdgeChoice::Angles(angles) => controls::curved(p, q, delta, angles, right, left),
            };
            if let Boundary::Explicit(cp) = from.right {
                c.start = cp;
            }
            if let Boundary::Explicit(cp) = to.left {
                c.end = cp;
            }

            Bezier {
                control_start: c.start,
                control_end: c.end,
                point: q,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
