//! Tridiagonal solver for the tangent angles.
//!
//! The unknown `theta_k` is the angle between the outgoing chord at knot
//! `k` and the curve's tangent there. Matching `MetaPost`'s mock curvature on
//! both sides of every interior knot gives one linear equation per knot,
//! relating `theta_{k-1}`, `theta_k` and `theta_{k+1}`. The resulting
//! tridiagonal system is solved by one forward elimination sweep and one
//! back-substitution sweep.
//!
//! An open run is closed by boundary conditions at its two ends. A cycle
//! has no ends; its extra wrap-around dependency on `theta_0` is carried by
//! the `ww` coefficients and eliminated by a second backward pass.

use tracing::trace;

use crate::{
    math,
    path::geometry::Geometry,
    types::{Knot, Scalar},
};

/// Constraint at either end of an open run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EndCondition {
    /// Curl with ratio `gamma`.
    Curl(Scalar),
    /// Absolute tangent direction in radians.
    Given(Scalar),
}

/// Departure and arrival angles of one edge, relative to its chord.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeAngles {
    /// Angle from the chord to the tangent leaving the source knot.
    pub theta: Scalar,
    /// Angle from the tangent entering the destination knot to the chord.
    pub phi: Scalar,
}

/// Solved angles for a run of consecutive knots.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Global knot indices in path order. A full cycle lists knot 0 again
    /// at the end.
    pub knots: Vec<usize>,
    /// Tangent angle at each listed knot.
    pub theta: Vec<Scalar>,
    /// Turning angle at each listed knot; zero at the ends of an open run.
    pub psi: Vec<Scalar>,
}

impl Solution {
    /// The angles of every edge in the run, keyed by edge index.
    pub fn edges(&self) -> impl Iterator<Item = (usize, EdgeAngles)> + '_ {
        (0..self.knots.len() - 1).map(|i| {
            let theta = self.theta[i];
            let phi = -self.psi[i + 1] - self.theta[i + 1];
            (self.knots[i], EdgeAngles { theta, phi })
        })
    }
}

/// Coefficients of one mock-curvature equation after forward elimination.
struct Row {
    /// `uu_k`: how `theta_k` depends on `theta_{k+1}`.
    uu: Scalar,
    /// Weight of `psi_k` in `vv_k`.
    psi_weight: Scalar,
    /// Weight of the previous row's `vv` (and `ww`).
    carry: Scalar,
}

/// Eliminate `theta_{k-1}` from the equation at knot `k`.
///
/// `prev` and `next` are the neighbouring knots; edge `prev` runs into `k`
/// and edge `k` leaves it.
fn eliminate(
    knots: &[Knot],
    geom: &Geometry,
    prev: usize,
    k: usize,
    next: usize,
    uu_prev: Scalar,
) -> Row {
    let rt_prev = knots[prev].right_tension.value;
    let lt_next = knots[next].left_tension.value;

    // aa = A_k/B_k, bb = D_k/C_k, dd = (3 - alpha_{k-1})·d_{k,k+1},
    // ee = (3 - beta_{k+1})·d_{k-1,k}, cc = (B_k - u_{k-1}·A_k)/B_k
    let aa = 1.0 / 3.0f64.mul_add(rt_prev, -1.0);
    let bb = 1.0 / 3.0f64.mul_add(lt_next, -1.0);
    let mut dd = geom.dist[k] * (3.0 - 1.0 / rt_prev);
    let mut ee = geom.dist[prev] * (3.0 - 1.0 / lt_next);
    let cc = uu_prev.mul_add(-aa, 1.0);

    dd *= cc;
    let lt = knots[k].left_tension.value;
    let rt = knots[k].right_tension.value;
    if lt < rt {
        dd *= (lt / rt).powi(2);
    } else if lt > rt {
        ee *= (rt / lt).powi(2);
    }

    // ff = C_k / (C_k + B_k - u_{k-1}·A_k)
    let ff = ee / (ee + dd);
    let psi_weight = (1.0 - ff) / cc;
    Row {
        uu: ff * bb,
        psi_weight,
        carry: psi_weight * aa,
    }
}

/// Solve an open run of knots `indices[0] ..= indices[m]`.
///
/// Interior knots use their turning angles from `geom`; the two ends use the
/// given boundary conditions. `indices` may wrap around a cyclic path.
///
/// # Panics
///
/// Panics if `indices` has fewer than two entries.
pub fn solve_open(
    knots: &[Knot],
    geom: &Geometry,
    indices: &[usize],
    start: EndCondition,
    end: EndCondition,
) -> Solution {
    assert!(indices.len() >= 2, "a run needs at least two knots");
    let m = indices.len() - 1;

    let mut psi: Vec<Scalar> = vec![0.0; m + 1];
    for li in 1..m {
        psi[li] = geom.psi[indices[li]];
    }

    let mut theta: Vec<Scalar> = vec![0.0; m + 1];

    // Two curls facing each other leave nothing to solve: the run is a
    // straight line.
    if m == 1 && matches!((start, end), (EndCondition::Curl(_), EndCondition::Curl(_))) {
        return Solution {
            knots: indices.to_vec(),
            theta,
            psi,
        };
    }

    let mut uu: Vec<Scalar> = vec![0.0; m + 1];
    let mut vv: Vec<Scalar> = vec![0.0; m + 1];

    match start {
        EndCondition::Given(angle) => {
            vv[0] = math::normalize_angle(angle - geom.chord_angle(indices[0]));
        }
        EndCondition::Curl(gamma) => {
            let rt = knots[indices[0]].right_tension.value;
            let lt = knots[indices[1]].left_tension.value;
            uu[0] = math::curl_ratio(gamma, rt, lt);
            vv[0] = -psi[1] * uu[0];
        }
    }

    for li in 1..m {
        let row = eliminate(
            knots,
            geom,
            indices[li - 1],
            indices[li],
            indices[li + 1],
            uu[li - 1],
        );
        uu[li] = row.uu;
        let acc = psi[li].mul_add(-row.psi_weight, -psi[li + 1] * row.uu);
        vv[li] = vv[li - 1].mul_add(-row.carry, acc);
    }

    theta[m] = match end {
        EndCondition::Given(angle) => {
            math::normalize_angle(angle - geom.chord_angle(indices[m - 1]))
        }
        EndCondition::Curl(gamma) => {
            let lt = knots[indices[m]].left_tension.value;
            let rt = knots[indices[m - 1]].right_tension.value;
            let ff = math::curl_ratio(gamma, lt, rt);
            -(vv[m - 1] * ff) / ff.mul_add(-uu[m - 1], 1.0)
        }
    };

    for li in (0..m).rev() {
        theta[li] = uu[li].mul_add(-theta[li + 1], vv[li]);
    }

    for (&k, &t) in indices.iter().zip(&theta) {
        trace!(knot = k, theta = t.to_degrees(), "open run choice");
    }

    Solution {
        knots: indices.to_vec(),
        theta,
        psi,
    }
}

/// Solve a cyclic path whose knots are all unconstrained.
///
/// Passes run over `1..=n`, where pass `n` is knot 0 again. Each pass
/// leaves `theta_{k-1} + uu_{k-1}·theta_k = vv_{k-1} + ww_{k-1}·theta_0`;
/// walking those relations backward expresses `theta_n` in terms of itself,
/// which fixes `theta_0 = theta_n`.
///
/// # Panics
///
/// Panics if `geom` was not measured from `knots` as a cyclic path.
pub fn solve_cycle(knots: &[Knot], geom: &Geometry) -> Solution {
    let n = knots.len();
    assert!(
        geom.cyclic && geom.knot_count() == n,
        "expected cyclic geometry over {n} knots, got {} knots (cyclic: {})",
        geom.knot_count(),
        geom.cyclic
    );

    let mut uu: Vec<Scalar> = vec![0.0; n + 1];
    let mut vv: Vec<Scalar> = vec![0.0; n + 1];
    let mut ww: Vec<Scalar> = vec![0.0; n + 1];
    ww[0] = 1.0;

    for k in 1..=n {
        let knot = k % n;
        let next = (k + 1) % n;
        let row = eliminate(knots, geom, k - 1, knot, next, uu[k - 1]);
        uu[k] = row.uu;
        let acc = geom.psi[knot].mul_add(-row.psi_weight, -geom.psi[next] * row.uu);
        vv[k] = vv[k - 1].mul_add(-row.carry, acc);
        ww[k] = -ww[k - 1] * row.carry;
    }

    // Closing elimination over k = n-1, ..., 1, then the wrap pass n.
    let mut aa: Scalar = 0.0;
    let mut bb: Scalar = 1.0;
    for k in (1..n).rev().chain(std::iter::once(n)) {
        aa = aa.mul_add(-uu[k], vv[k]);
        bb = bb.mul_add(-uu[k], ww[k]);
    }
    let theta_n = aa / (1.0 - bb);

    vv[0] = theta_n;
    for k in 1..n {
        vv[k] = theta_n.mul_add(ww[k], vv[k]);
    }

    let mut theta: Vec<Scalar> = vec![0.0; n + 1];
    theta[n] = theta_n;
    for k in (0..n).rev() {
        theta[k] = uu[k].mul_add(-theta[k + 1], vv[k]);
    }

    for (k, t) in theta.iter().take(n).enumerate() {
        trace!(knot = k, theta = t.to_degrees(), "cycle choice");
    }

    Solution {
        knots: (0..=n).map(|k| k % n).collect(),
        theta,
        psi: (0..=n).map(|k| geom.psi[k % n]).collect(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    use approx::assert_relative_eq;

    use super::*;
    use crate::types::{Point, Tension};

    fn knots_at(points: &[Point]) -> Vec<Knot> {
        points.iter().map(|&p| Knot::new(p)).collect()
    }

    fn arc() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(2.0, 0.0),
        ]
    }

    fn diamond() -> Vec<Point> {
        vec![
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(-1.0, 0.0),
            Point::new(0.0, -1.0),
        ]
    }

    #[test]
    fn symmetric_arc_with_curls() {
        let pts = arc();
        let knots = knots_at(&pts);
        let geom = Geometry::measure(&pts, false).unwrap();
        let sol = solve_open(
            &knots,
            &geom,
            &[0, 1, 2],
            EndCondition::Curl(1.0),
            EndCondition::Curl(1.0),
        );
        // The curve is the circular arc centred at (1, 0): it leaves
        // straight up, crosses the top horizontally and lands straight down.
        assert_relative_eq!(sol.theta[0], FRAC_PI_4, epsilon = 1e-12);
        assert_relative_eq!(sol.theta[1], FRAC_PI_4, epsilon = 1e-12);
        assert_relative_eq!(sol.theta[2], -FRAC_PI_4, epsilon = 1e-12);

        let edges: Vec<_> = sol.edges().collect();
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].0, 0);
        assert_relative_eq!(edges[0].1.phi, FRAC_PI_4, epsilon = 1e-12);
        assert_relative_eq!(edges[1].1.phi, FRAC_PI_4, epsilon = 1e-12);
    }

    #[test]
    fn given_directions_are_honoured() {
        let pts = arc();
        let knots = knots_at(&pts);
        let geom = Geometry::measure(&pts, false).unwrap();
        // Leave heading east, arrive heading east.
        let sol = solve_open(
            &knots,
            &geom,
            &[0, 1, 2],
            EndCondition::Given(0.0),
            EndCondition::Given(0.0),
        );
        // Chord 0 points at 45°, so leaving east is theta = -45°.
        assert_relative_eq!(sol.theta[0], -FRAC_PI_4, epsilon = 1e-12);
        // Chord 1 points at -45°; arriving east is phi = -45°.
        let (_, last) = sol.edges().last().unwrap();
        assert_relative_eq!(last.phi, -FRAC_PI_4, epsilon = 1e-12);
    }

    #[test]
    fn facing_curls_on_two_knots_stay_straight() {
        let pts = [Point::new(0.0, 0.0), Point::new(3.0, 4.0)];
        let knots = knots_at(&pts);
        let geom = Geometry::measure(&pts, false).unwrap();
        let sol = solve_open(
            &knots,
            &geom,
            &[0, 1],
            EndCondition::Curl(1.0),
            EndCondition::Curl(1.0),
        );
        assert_eq!(sol.theta, vec![0.0, 0.0]);
    }

    #[test]
    fn two_knots_given_start_curl_end() {
        let pts = [Point::new(0.0, 0.0), Point::new(10.0, 0.0)];
        let knots = knots_at(&pts);
        let geom = Geometry::measure(&pts, false).unwrap();
        let sol = solve_open(
            &knots,
            &geom,
            &[0, 1],
            EndCondition::Given(FRAC_PI_2),
            EndCondition::Curl(1.0),
        );
        let (_, angles) = sol.edges().next().unwrap();
        assert_relative_eq!(angles.theta, FRAC_PI_2, epsilon = 1e-12);
        // With unit curl and tensions the arrival mirrors the departure.
        assert_relative_eq!(angles.phi, FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn cycle_through_diamond_is_a_circle() {
        let pts = diamond();
        let knots = knots_at(&pts);
        let geom = Geometry::measure(&pts, true).unwrap();
        let sol = solve_cycle(&knots, &geom);
        assert_eq!(sol.theta.len(), 5);
        assert_eq!(sol.knots, vec![0, 1, 2, 3, 0]);
        for &t in &sol.theta {
            assert_relative_eq!(t, -FRAC_PI_4, epsilon = 1e-12);
        }
        for (_, angles) in sol.edges() {
            assert_relative_eq!(angles.phi, -FRAC_PI_4, epsilon = 1e-12);
        }
    }

    #[test]
    fn cycle_closes_on_itself() {
        let pts = [
            Point::new(0.0, 0.0),
            Point::new(200.0, 133.0),
            Point::new(130.0, 300.0),
            Point::new(33.0, 233.0),
            Point::new(100.0, 167.0),
        ];
        let knots = knots_at(&pts);
        let geom = Geometry::measure(&pts, true).unwrap();
        let sol = solve_cycle(&knots, &geom);
        assert_relative_eq!(sol.theta[0], sol.theta[5]);
        assert!(sol.theta.iter().all(|t| t.is_finite()));
    }

    #[test]
    fn cycle_does_not_depend_on_the_starting_knot() {
        let pts = [
            Point::new(0.0, 0.0),
            Point::new(4.0, 1.0),
            Point::new(5.0, 5.0),
            Point::new(1.0, 3.0),
        ];
        let knots = knots_at(&pts);
        let geom = Geometry::measure(&pts, true).unwrap();
        let sol = solve_cycle(&knots, &geom);

        let rotated: Vec<Point> = pts.iter().cycle().skip(1).take(4).copied().collect();
        let rknots = knots_at(&rotated);
        let rgeom = Geometry::measure(&rotated, true).unwrap();
        let rsol = solve_cycle(&rknots, &rgeom);
        for k in 0..4 {
            assert_relative_eq!(sol.theta[(k + 1) % 4], rsol.theta[k], epsilon = 1e-12);
        }
    }

    #[test]
    fn higher_tension_changes_nothing_on_a_symmetric_cycle() {
        let pts = diamond();
        let knots: Vec<Knot> = pts
            .iter()
            .map(|&p| Knot::with_tension(p, Tension::new(3.0)))
            .collect();
        let geom = Geometry::measure(&pts, true).unwrap();
        let sol = solve_cycle(&knots, &geom);
        for &t in &sol.theta {
            assert_relative_eq!(t, -FRAC_PI_4, epsilon = 1e-12);
        }
    }

    #[test]
    #[should_panic(expected = "cyclic geometry")]
    fn cycle_rejects_mismatched_geometry() {
        let pts = diamond();
        let geom = Geometry::measure(&pts[..3], true).unwrap();
        let _ = solve_cycle(&knots_at(&pts), &geom);
    }

    #[test]
    fn wrapped_run_on_a_cycle() {
        // A run that starts at knot 2 and wraps through knot 0.
        let pts = diamond();
        let knots = knots_at(&pts);
        let geom = Geometry::measure(&pts, true).unwrap();
        let sol = solve_open(
            &knots,
            &geom,
            &[2, 3, 0],
            EndCondition::Given(-FRAC_PI_2),
            EndCondition::Given(FRAC_PI_2),
        );
        let edges: Vec<_> = sol.edges().collect();
        assert_eq!(edges[0].0, 2);
        assert_eq!(edges[1].0, 3);
        // Symmetric about the y axis: the tangent at the bottom points east,
        // 45° clockwise of the outgoing chord.
        assert_relative_eq!(sol.theta[1], -FRAC_PI_4, epsilon = 1e-12);
    }
}
