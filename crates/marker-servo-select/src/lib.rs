//! Marker selection and the detector seam.
//!
//! This crate focuses on:
//! - picking the marker of interest out of one frame's detections
//!   (largest-by-area or by id),
//! - reducing the selected marker to a scalar measurement,
//! - normalizing the output of an external fiducial detector into a
//!   [`MarkerSet`](marker_servo_core::MarkerSet).
//!
//! It does **not** perform marker detection itself. Concrete backends plug in
//! through [`DetectionBackend`] and are wrapped by [`DetectorAdapter`].

mod detector;
mod profile;
mod selector;

pub use detector::{DetectionBackend, DetectorAdapter, MarkerDetector};
pub use profile::{DictionaryProfile, UnknownProfile};
pub use selector::{
    area_of, center_of, find_by_id, largest, scan_largest, LargestScan, MarkerSelector,
    Measurement, TargetSelection,
};
