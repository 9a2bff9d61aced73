//! Selecting the marker of interest and measuring it.
//!
//! Two policies with deliberately different failure behavior:
//! - [`largest`] is a best-effort scan over everything the detector reported;
//!   markers with malformed corners are skipped and counted.
//! - [`find_by_id`] and its measuring variants target one specific marker, so
//!   a malformed marker found by id surfaces [`GeometryError`].
//!
//! "Nothing found" is always `None`, never an error.

use marker_servo_core::{area, center, GeometryError, Marker, MarkerSet};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Outcome of a largest-marker scan.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LargestScan<'a> {
    /// Winning marker and its area, if any valid marker was seen.
    pub best: Option<(&'a Marker, f64)>,
    /// Markers skipped because their corner set was not a quad or their area
    /// was not finite.
    pub skipped: usize,
}

impl<'a> LargestScan<'a> {
    pub fn marker(&self) -> Option<&'a Marker> {
        self.best.map(|(m, _)| m)
    }

    pub fn area(&self) -> Option<f64> {
        self.best.map(|(_, a)| a)
    }
}

/// Scan every marker and keep the one with the strictly greatest area.
///
/// Ties resolve to the first maximal marker in set order. A valid marker
/// with zero area is still a candidate; a non-finite area (NaN or infinite
/// corner coordinates) is skipped like a malformed quad.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(markers), fields(count = markers.len()))
)]
pub fn scan_largest(markers: &MarkerSet) -> LargestScan<'_> {
    let mut best: Option<(&Marker, f64)> = None;
    let mut skipped = 0usize;

    for marker in markers {
        let a = match area(&marker.corners) {
            Ok(a) if a.is_finite() => a,
            Ok(a) => {
                log::warn!("skipping marker {}: non-finite area {a}", marker.id);
                skipped += 1;
                continue;
            }
            Err(err) => {
                log::warn!("skipping marker {}: {err}", marker.id);
                skipped += 1;
                continue;
            }
        };
        if best.is_none_or(|(_, best_area)| a > best_area) {
            best = Some((marker, a));
        }
    }

    match best {
        Some((m, a)) => log::debug!("largest marker id={} area={a:.3}", m.id),
        None if markers.is_empty() => log::debug!("no markers detected"),
        None => log::debug!("no valid marker among {} detections", markers.len()),
    }

    LargestScan { best, skipped }
}

/// Largest marker by shoelace area, skipping malformed detections.
pub fn largest(markers: &MarkerSet) -> Option<&Marker> {
    scan_largest(markers).marker()
}

/// First marker with the given id, in set order.
pub fn find_by_id(markers: &MarkerSet, target_id: u32) -> Option<&Marker> {
    let found = markers.iter().find(|m| m.id == target_id);
    match found {
        Some(m) => log::debug!("found marker id={} corners={:?}", m.id, m.corners.as_slice()),
        None => log::debug!("marker id={target_id} not found among {}", markers.len()),
    }
    found
}

/// Center of the marker with the given id.
///
/// `Ok(None)` when the id is absent; `Err` when the marker exists but its
/// corners are not a quad.
pub fn center_of(
    markers: &MarkerSet,
    target_id: u32,
) -> Result<Option<Point2<f64>>, GeometryError> {
    find_by_id(markers, target_id)
        .map(|m| center(&m.corners))
        .transpose()
}

/// Area of the marker with the given id. Same contract as [`center_of`].
pub fn area_of(markers: &MarkerSet, target_id: u32) -> Result<Option<f64>, GeometryError> {
    find_by_id(markers, target_id)
        .map(|m| area(&m.corners))
        .transpose()
}

/// Which marker a control loop follows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetSelection {
    /// Largest marker in frame, typically the closest one.
    #[default]
    Largest,
    /// A specific marker id.
    ById(u32),
}

/// Scalar reduced from the selected marker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measurement {
    /// Horizontal center coordinate, pixels.
    #[default]
    CenterX,
    /// Vertical center coordinate, pixels.
    CenterY,
    /// Apparent area, square pixels. Grows as the marker gets closer.
    Area,
}

impl Measurement {
    /// Evaluate this measurement on one marker.
    pub fn evaluate(self, marker: &Marker) -> Result<f64, GeometryError> {
        match self {
            Self::CenterX => Ok(center(&marker.corners)?.x),
            Self::CenterY => Ok(center(&marker.corners)?.y),
            Self::Area => area(&marker.corners),
        }
    }
}

/// A selection policy bound to a target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerSelector {
    pub target: TargetSelection,
}

impl MarkerSelector {
    pub fn new(target: TargetSelection) -> Self {
        Self { target }
    }

    /// Marker this policy follows in the given frame.
    pub fn select<'a>(&self, markers: &'a MarkerSet) -> Option<&'a Marker> {
        match self.target {
            TargetSelection::Largest => largest(markers),
            TargetSelection::ById(id) => find_by_id(markers, id),
        }
    }

    /// Select and reduce to a scalar.
    ///
    /// The largest policy only ever selects well-formed markers, so errors can
    /// only come from by-id selection.
    pub fn measure(
        &self,
        markers: &MarkerSet,
        measurement: Measurement,
    ) -> Result<Option<f64>, GeometryError> {
        self.select(markers)
            .map(|m| measurement.evaluate(m))
            .transpose()
    }
}
