//! Path-description strings.
//!
//! A solved curve is written as `M x0,y0 C c1x,c1y c2x,c2y x1,y1 ...`: one
//! move-to followed by one cubic command whose arguments are the control
//! points and destination of every segment in order. The string never ends
//! with a close command; a cyclic curve's last segment already returns to
//! the start point.

use std::fmt::Write;

use crate::types::{Bezier, Point, Scalar};

/// Format a curve as a path-description string.
///
/// With `precision`, coordinates are rounded to that many decimals and
/// trailing zeros are stripped; without it they are printed exactly.
pub fn path_data(start: Point, segments: &[Bezier], precision: Option<usize>) -> String {
    let mut d = String::from("M ");
    write_point(&mut d, start, precision);
    if segments.is_empty() {
        return d;
    }

    d.push_str(" C");
    for seg in segments {
        for p in [seg.control_start, seg.control_end, seg.point] {
            d.push(' ');
            write_point(&mut d, p, precision);
        }
    }
    d
}

/// Append "x,y".
fn write_point(d: &mut String, p: Point, precision: Option<usize>) {
    let _ = write!(d, "{},{}", fmt_scalar(p.x, precision), fmt_scalar(p.y, precision));
}

/// Format a scalar, normalizing negative zero to zero.
fn fmt_scalar(v: Scalar, precision: Option<usize>) -> String {
    let Some(precision) = precision else {
        let v = if v == 0.0 { 0.0 } else { v };
        return format!("{v}");
    };

    let s = format!("{v:.precision$}");
    let s = if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s.as_str()
    };
    // Small negatives round to "-0".
    if s == "-0" { "0".to_owned() } else { s.to_owned() }
}
