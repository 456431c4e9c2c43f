//! Numeric primitives of Hobby's algorithm.
//!
//! These correspond to `MetaPost`'s internal routines of the same names
//! (`curl_ratio`, `velocity`) plus the angle helpers used by the geometry
//! pass and the solver.

use std::f64::consts::{PI, SQRT_2, TAU};

use crate::types::{Scalar, Vec2};

/// Upper bound shared by the curl ratio and the velocity.
const RATIO_CAP: Scalar = 4.0;

/// Relative size of the cross term below which opposite chords count as an
/// exact reversal.
const REVERSAL_TOLERANCE: Scalar = 1e-12;

/// Reduce an angle in radians to the range (-π, π].
pub fn normalize_angle(angle: Scalar) -> Scalar {
    let a = angle.rem_euclid(TAU);
    if a > PI { a - TAU } else { a }
}

/// Signed angle that rotates the direction of `incoming` onto `outgoing`.
///
/// Computed from the sine and cosine of the incoming direction rather than
/// as a difference of two `atan2` values, so no wraparound correction is
/// needed. `incoming_len` is the length of `incoming`.
///
/// An exact reversal is always a turn of +π, whatever the rounding residue
/// of the cross term, matching `MetaPost`'s `n_arg(-x, 0) = 180°`.
#[inline]
pub fn turning_angle(incoming: Vec2, incoming_len: Scalar, outgoing: Vec2) -> Scalar {
    let sin = incoming.y / incoming_len;
    let cos = incoming.x / incoming_len;
    let cross = outgoing.y.mul_add(cos, -(outgoing.x * sin));
    let dot = outgoing.x.mul_add(cos, outgoing.y * sin);
    if dot < 0.0 && cross.abs() <= REVERSAL_TOLERANCE * -dot {
        return PI;
    }
    cross.atan2(dot)
}

/// `MetaPost`'s `curl_ratio(gamma, a_tension, b_tension)`.
///
/// With `alpha = 1/a_tension` and `beta = 1/b_tension`:
///
/// ```text
/// ((3 − α)·α²·γ + β³) / (α³·γ + (3 − β)·β²)
/// ```
///
/// capped at 4.
pub fn curl_ratio(gamma: Scalar, a_tension: Scalar, b_tension: Scalar) -> Scalar {
    let alpha = 1.0 / a_tension;
    let beta = 1.0 / b_tension;
    let num = ((3.0 - alpha) * alpha * alpha).mul_add(gamma, beta * beta * beta);
    let denom = (alpha * alpha * alpha).mul_add(gamma, (3.0 - beta) * beta * beta);
    (num / denom).min(RATIO_CAP)
}

/// Hobby's velocity function.
///
/// Given the sines and cosines of the departure angle θ and the arrival
/// angle φ, returns the control-point distance as a fraction of the chord:
///
/// ```text
/// (2 + √2·(sin θ − sin φ/16)·(sin φ − sin θ/16)·(cos θ − cos φ))
///   / (1.5·t·(2 + (√5 − 1)·cos θ + (3 − √5)·cos φ))
/// ```
///
/// capped at 4.
pub fn velocity(st: Scalar, ct: Scalar, sf: Scalar, cf: Scalar, tension: Scalar) -> Scalar {
    let sqrt5 = 5.0_f64.sqrt();
    let num = (SQRT_2 * (st - sf / 16.0) * (sf - st / 16.0)).mul_add(ct - cf, 2.0);
    let denom = 1.5 * tension * (3.0 - sqrt5).mul_add(cf, (sqrt5 - 1.0).mul_add(ct, 2.0));
    (num / denom).min(RATIO_CAP)
}
