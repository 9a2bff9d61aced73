//! Core types and utilities for marker-based visual servoing.
//!
//! This crate is intentionally small and purely geometric. It does *not*
//! depend on any concrete fiducial detector or image type: markers arrive as
//! an id plus the corner points a detector reported, and the geometry helpers
//! reduce them to the scalar measurements a feedback loop consumes.

mod error;
mod geometry;
mod logger;
mod marker;

pub use error::GeometryError;
pub use geometry::{area, center, quad, signed_area, QUAD_CORNERS};
pub use marker::{Marker, MarkerCorners, MarkerSet, RawDetections};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{filter_directive, init_with_level, level_from_verbosity};
