use thiserror::Error;

use crate::types::Scalar;

/// Errors returned while building a curve.
///
/// Construction is atomic: when any of these is returned, no partial curve
/// is produced.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum CurveError {
    /// The point list cannot describe a curve (too few points, non-finite
    /// coordinates).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Two consecutive knots coincide, so the chord between them has no
    /// direction.
    #[error("degenerate geometry: edge {edge} has length {length:e}")]
    DegenerateGeometry {
        /// Index of the edge (the edge starting at knot `edge`).
        edge: usize,
        /// Its chord length.
        length: Scalar,
    },

    /// A tension would make a solver denominator vanish or blow up.
    #[error("numeric instability: tension {tension} at knot {knot} must be finite and greater than 1/3")]
    NumericInstability {
        /// Index of the offending knot.
        knot: usize,
        /// The rejected tension magnitude.
        tension: Scalar,
    },
}
