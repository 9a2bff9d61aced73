//! High-level facade crate for the `marker-servo-*` workspace.
//!
//! This crate provides:
//! - stable re-exports of the geometry, selection and PID crates
//! - [`Tracker`]: one control cycle per frame, from detector output to
//!   per-axis controller outputs
//! - JSON configuration and recorded-session replay helpers
//!
//! ## Quickstart
//!
//! ```
//! use marker_servo::{replay::RecordedBackend, Tracker, TrackingConfig};
//! use marker_servo::select::{DetectorAdapter, DictionaryProfile};
//!
//! let config = TrackingConfig::default();
//! let detector = DetectorAdapter::new(RecordedBackend, DictionaryProfile::default());
//! let mut tracker = Tracker::new(detector, &config);
//! tracker.start();
//! ```
//!
//! ## API map
//! - `marker_servo::core`: marker types, quad geometry, logger.
//! - `marker_servo::select`: largest / by-id selection and the detector seam.
//! - `marker_servo::pid`: the PID controller and clocks.
//! - `marker_servo::replay`: drive a tracker from a recorded JSON session.

pub use marker_servo_core as core;
pub use marker_servo_pid as pid;
pub use marker_servo_select as select;

pub use marker_servo_core::{GeometryError, Marker, MarkerSet};
pub use marker_servo_pid::{PidController, PidError, PidGains};
pub use marker_servo_select::{MarkerSelector, Measurement, TargetSelection};

mod config;
pub mod replay;
mod tracking;

pub use config::{AxisConfig, ConfigIoError, TrackingConfig};
pub use tracking::{AxisReport, CycleReport, TrackError, Tracker};
