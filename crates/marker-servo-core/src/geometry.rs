//! Centroid and area of detected marker quads.
//!
//! All helpers take the corners in the order the detector reported them and
//! reject anything that is not exactly four points. Winding is not corrected:
//! the shoelace area is only meaningful for simple quads with consistent
//! (clockwise or counter-clockwise) ordering, which is what fiducial detectors
//! produce.

use crate::GeometryError;
use nalgebra::Point2;

/// Number of corners of a marker quad.
pub const QUAD_CORNERS: usize = 4;

/// Check cardinality and copy the corners into a fixed-size quad.
pub fn quad(corners: &[Point2<f64>]) -> Result<[Point2<f64>; 4], GeometryError> {
    <[Point2<f64>; 4]>::try_from(corners).map_err(|_| GeometryError::InvalidGeometry {
        len: corners.len(),
    })
}

/// Unweighted mean of the four corners.
///
/// This is the vertex centroid, not the area-weighted centroid of the
/// polygon; for a projected square the two differ only under strong
/// perspective.
pub fn center(corners: &[Point2<f64>]) -> Result<Point2<f64>, GeometryError> {
    let q = quad(corners)?;
    let (sx, sy) = q
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    let n = QUAD_CORNERS as f64;
    Ok(Point2::new(sx / n, sy / n))
}

/// Signed shoelace area of an ordered quad.
///
/// Positive for counter-clockwise winding in a y-up frame (equivalently,
/// clockwise in image coordinates where y grows downwards).
#[inline]
pub fn signed_area(q: &[Point2<f64>; 4]) -> f64 {
    let mut acc = 0.0;
    for i in 0..QUAD_CORNERS {
        let a = q[i];
        let b = q[(i + 1) % QUAD_CORNERS];
        acc += a.x * b.y - a.y * b.x;
    }
    0.5 * acc
}

/// Unsigned shoelace area of the quad.
pub fn area(corners: &[Point2<f64>]) -> Result<f64, GeometryError> {
    let q = quad(corners)?;
    Ok(signed_area(&q).abs())
}
