//! Per-frame marker data model.

use std::ops::Deref;

use crate::{geometry, GeometryError};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Corner points of one detected marker, in detector order.
///
/// Cardinality is not enforced here: detectors occasionally report malformed
/// corner sets and the selection layer decides whether to skip or surface
/// them. Geometry helpers reject anything other than 4 points.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkerCorners(Vec<Point2<f64>>);

impl MarkerCorners {
    pub fn new(points: Vec<Point2<f64>>) -> Self {
        Self(points)
    }

    /// Corners of a well-formed quad (TL, TR, BR, BL for OpenCV-style detectors).
    pub fn from_quad(quad: [Point2<f64>; 4]) -> Self {
        Self(quad.to_vec())
    }

    /// `true` when the set has exactly four corners.
    #[inline]
    pub fn is_quad(&self) -> bool {
        self.0.len() == geometry::QUAD_CORNERS
    }

    pub fn as_slice(&self) -> &[Point2<f64>] {
        &self.0
    }
}

impl Deref for MarkerCorners {
    type Target = [Point2<f64>];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Point2<f64>>> for MarkerCorners {
    fn from(points: Vec<Point2<f64>>) -> Self {
        Self(points)
    }
}

/// A single marker observation: dictionary id plus corner points.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub id: u32,
    pub corners: MarkerCorners,
}

impl Marker {
    pub fn new(id: u32, corners: impl Into<MarkerCorners>) -> Self {
        Self {
            id,
            corners: corners.into(),
        }
    }

    /// Vertex centroid of the marker quad.
    pub fn center(&self) -> Result<Point2<f64>, GeometryError> {
        geometry::center(&self.corners)
    }

    /// Unsigned shoelace area of the marker quad.
    pub fn area(&self) -> Result<f64, GeometryError> {
        geometry::area(&self.corners)
    }
}

/// Output of a detection backend in its native shape.
///
/// OpenCV-like backends return parallel `corners` / `ids` arrays and may
/// return nothing at all for a frame without markers.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDetections {
    #[serde(default)]
    pub corners: Option<Vec<Vec<[f64; 2]>>>,
    #[serde(default)]
    pub ids: Option<Vec<u32>>,
}

/// All markers detected in one frame, in detector report order.
///
/// Duplicate ids are kept as reported.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkerSet(Vec<Marker>);

impl MarkerSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, marker: Marker) {
        self.0.push(marker);
    }

    /// Normalize backend output into a marker set.
    ///
    /// Missing corners or ids yield an empty set. When the two arrays
    /// disagree in length only the paired prefix is kept.
    pub fn from_raw(raw: RawDetections) -> Self {
        let (Some(corners), Some(ids)) = (raw.corners, raw.ids) else {
            return Self::new();
        };
        if corners.len() != ids.len() {
            log::warn!(
                "detector returned {} corner sets but {} ids; keeping {} paired entries",
                corners.len(),
                ids.len(),
                corners.len().min(ids.len())
            );
        }
        corners
            .into_iter()
            .zip(ids)
            .map(|(pts, id)| {
                let pts = pts.into_iter().map(|[x, y]| Point2::new(x, y)).collect();
                Marker::new(id, MarkerCorners::new(pts))
            })
            .collect()
    }

    pub fn into_vec(self) -> Vec<Marker> {
        self.0
    }
}

impl Deref for MarkerSet {
    type Target = [Marker];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Marker>> for MarkerSet {
    fn from(markers: Vec<Marker>) -> Self {
        Self(markers)
    }
}

impl FromIterator<Marker> for MarkerSet {
    fn from_iter<I: IntoIterator<Item = Marker>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a MarkerSet {
    type Item = &'a Marker;
    type IntoIter = std::slice::Iter<'a, Marker>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_square(x0: f64, y0: f64, side: f64) -> Vec<[f64; 2]> {
        vec![
            [x0, y0],
            [x0 + side, y0],
            [x0 + side, y0 + side],
            [x0, y0 + side],
        ]
    }

    #[test]
    fn absent_backend_output_normalizes_to_empty() {
        assert!(MarkerSet::from_raw(RawDetections::default()).is_empty());

        let ids_only = RawDetections {
            corners: None,
            ids: Some(vec![1, 2]),
        };
        assert!(MarkerSet::from_raw(ids_only).is_empty());

        let corners_only = RawDetections {
            corners: Some(vec![raw_square(0.0, 0.0, 1.0)]),
            ids: None,
        };
        assert!(MarkerSet::from_raw(corners_only).is_empty());
    }

    #[test]
    fn paired_arrays_keep_report_order() {
        let raw = RawDetections {
            corners: Some(vec![raw_square(0.0, 0.0, 1.0), raw_square(5.0, 5.0, 2.0)]),
            ids: Some(vec![7, 3]),
        };
        let set = MarkerSet::from_raw(raw);
        assert_eq!(set.len(), 2);
        assert_eq!(set[0].id, 7);
        assert_eq!(set[1].id, 3);
        assert_eq!(set[1].corners[2], Point2::new(7.0, 7.0));
    }

    #[test]
    fn length_mismatch_keeps_paired_prefix() {
        let raw = RawDetections {
            corners: Some(vec![raw_square(0.0, 0.0, 1.0), raw_square(2.0, 0.0, 1.0)]),
            ids: Some(vec![4]),
        };
        let markers = MarkerSet::from_raw(raw).into_vec();
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].id, 4);
        assert_eq!(
            markers[0].corners,
            MarkerCorners::from_quad([
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(1.0, 1.0),
                Point2::new(0.0, 1.0),
            ])
        );
    }

    #[test]
    fn malformed_corners_survive_normalization() {
        let raw = RawDetections {
            corners: Some(vec![vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]]),
            ids: Some(vec![9]),
        };
        let set = MarkerSet::from_raw(raw);
        assert_eq!(set.len(), 1);
        assert!(!set[0].corners.is_quad());
        assert_eq!(
            set[0].area(),
            Err(GeometryError::InvalidGeometry { len: 3 })
        );
    }

    #[test]
    fn marker_set_json_is_a_plain_array() {
        let set = MarkerSet::from(vec![Marker::new(
            1,
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(1.0, 1.0),
                Point2::new(0.0, 1.0),
            ],
        )]);
        let json = serde_json::to_string(&set).expect("serialize");
        assert!(json.starts_with('['));
        let back: MarkerSet = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, set);
    }
}
