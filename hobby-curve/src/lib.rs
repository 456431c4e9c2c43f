//! Hobby's smooth interpolating splines.
//!
//! Given an ordered list of points, [`build_curve`] returns the cubic Bezier
//! control points of the curve `MetaPost` would draw through them with
//! `z0..z1..z2..` (or `..cycle` when the path is closed). Finer control over
//! tensions, curls, directions and fixed control points is available through
//! [`Knot`] and [`Curve::from_knots`].
//!
//! ```
//! use hobby_curve::{CurveOptions, Point, build_curve};
//!
//! let points = [Point::new(0.0, 0.0), Point::new(10.0, 10.0), Point::new(20.0, 0.0)];
//! let segments = build_curve(&points, &CurveOptions::default()).unwrap();
//! assert_eq!(segments.len(), 2);
//! assert_eq!(segments[1].point, Point::new(20.0, 0.0));
//! ```

pub mod bezier;
pub mod error;
pub mod format;
pub mod math;
pub mod path;
pub mod types;

pub use error::CurveError;
pub use path::{Curve, build_curve};
pub use types::{Bezier, Boundary, CurveOptions, Knot, Point, Scalar, Tension, Vec2};
