//! Chord vectors, chord lengths and turning angles.
//!
//! Edge `i` runs from knot `i` to its successor: knot `i + 1`, or knot 0
//! after the last knot of a cyclic path.

use crate::{
    error::CurveError,
    math,
    types::{DEGENERATE_CHORD, Point, Scalar, Vec2},
};

/// Per-edge and per-knot quantities derived from knot positions alone.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    /// Chord vector of each edge.
    pub delta: Vec<Vec2>,
    /// Chord length of each edge.
    pub dist: Vec<Scalar>,
    /// Turning angle at each knot, from its incoming chord to its outgoing
    /// chord. Zero at the two ends of an open path.
    pub psi: Vec<Scalar>,
    /// Whether the last knot connects back to the first.
    pub cyclic: bool,
}

impl Geometry {
    /// Measure the polyline through `points`.
    ///
    /// Fails if fewer than two points are given or if two consecutive points
    /// coincide.
    pub fn measure(points: &[Point], cyclic: bool) -> Result<Self, CurveError> {
        let n = points.len();
        if n < 2 {
            return Err(CurveError::InvalidInput(format!(
                "need at least 2 points, got {n}"
            )));
        }

        let edges = if cyclic { n } else { n - 1 };
        let (delta, dist): (Vec<Vec2>, Vec<Scalar>) = (0..edges)
            .map(|i| {
                let d = points[(i + 1) % n] - points[i];
                (d, d.hypot())
            })
            .unzip();

        if let Some(edge) = dist.iter().position(|&d| d < DEGENERATE_CHORD) {
            return Err(CurveError::DegenerateGeometry {
                edge,
                length: dist[edge],
            });
        }

        let mut psi = vec![0.0; n];
        let turning = if cyclic { 0..n } else { 1..n - 1 };
        for k in turning {
            let prev = (k + n - 1) % n;
            psi[k] = math::turning_angle(delta[prev], dist[prev], delta[k]);
        }

        Ok(Self {
            delta,
            dist,
            psi,
            cyclic,
        })
    }

    /// Number of edges: the knot count if cyclic, one less otherwise.
    #[inline]
    pub const fn edge_count(&self) -> usize {
        self.delta.len()
    }

    /// Number of knots.
    #[inline]
    pub const fn knot_count(&self) -> usize {
        self.psi.len()
    }

    /// Direction of edge `edge`, in radians.
    #[inline]
    pub fn chord_angle(&self, edge: usize) -> Scalar {
        self.delta[edge].atan2()
    }
}
