//! One control cycle per frame: detect, select, measure, update each axis.

use marker_servo_core::GeometryError;
use marker_servo_pid::{Clock, MonotonicClock, PidController, PidError, PidOutput};
use marker_servo_select::{
    scan_largest, MarkerDetector, MarkerSelector, Measurement, TargetSelection,
};
use serde::Serialize;

use crate::TrackingConfig;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors that abort a control cycle.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Pid(#[from] PidError),
}

/// Result of one axis in one cycle.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AxisReport {
    pub name: String,
    pub measured: f64,
    pub set_point: f64,
    #[serde(flatten)]
    pub pid: PidOutput,
}

/// Result of one cycle.
///
/// `marker` is `None` when the target was not in frame; no controller is
/// updated in that case and `axes` is empty.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CycleReport {
    pub marker: Option<u32>,
    /// Detections skipped as malformed while searching for the largest marker.
    pub skipped: usize,
    pub axes: Vec<AxisReport>,
}

#[derive(Clone, Debug)]
struct Axis<C> {
    name: String,
    measurement: Measurement,
    set_point: f64,
    pid: PidController<C>,
}

/// Detector plus one independent PID loop per configured axis.
pub struct Tracker<D, C = MonotonicClock> {
    detector: D,
    selector: MarkerSelector,
    axes: Vec<Axis<C>>,
    clock: C,
}

impl<D: MarkerDetector> Tracker<D, MonotonicClock> {
    pub fn new(detector: D, config: &TrackingConfig) -> Self {
        Self::with_clock(detector, config, MonotonicClock)
    }
}

impl<D: MarkerDetector, C: Clock + Clone> Tracker<D, C> {
    pub fn with_clock(detector: D, config: &TrackingConfig, clock: C) -> Self {
        if detector.profile() != config.profile {
            log::warn!(
                "detector uses {} but config asks for {}",
                detector.profile(),
                config.profile
            );
        }
        let axes = config
            .axes
            .iter()
            .map(|a| Axis {
                name: a.name.clone(),
                measurement: a.measurement,
                set_point: a.set_point,
                pid: PidController::with_clock(a.gains, clock.clone()),
            })
            .collect();
        Self {
            detector,
            selector: MarkerSelector::new(config.target),
            axes,
            clock,
        }
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    pub fn selector(&self) -> MarkerSelector {
        self.selector
    }

    /// Controller for the named axis.
    pub fn controller(&self, axis: &str) -> Option<&PidController<C>> {
        self.axes.iter().find(|a| a.name == axis).map(|a| &a.pid)
    }

    /// Start every axis controller from the same timestamp.
    pub fn start(&mut self) {
        let now = self.clock.now();
        for axis in &mut self.axes {
            axis.pid.start_at(now);
        }
    }

    /// Clear accumulated integral and previous error on every axis.
    pub fn reset(&mut self) {
        for axis in &mut self.axes {
            axis.pid.reset();
        }
    }

    /// Run one control cycle on a frame.
    ///
    /// All axis measurements are taken before any controller is touched, so a
    /// geometry error leaves every controller unchanged.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all))]
    pub fn step(&mut self, frame: &D::Frame) -> Result<CycleReport, TrackError> {
        let markers = self.detector.detect(frame);

        let (marker, skipped) = match self.selector.target {
            TargetSelection::Largest => {
                let scan = scan_largest(&markers);
                (scan.marker(), scan.skipped)
            }
            TargetSelection::ById(_) => (self.selector.select(&markers), 0),
        };
        let Some(marker) = marker else {
            return Ok(CycleReport {
                marker: None,
                skipped,
                axes: Vec::new(),
            });
        };

        let measured = self
            .axes
            .iter()
            .map(|a| a.measurement.evaluate(marker))
            .collect::<Result<Vec<f64>, GeometryError>>()?;

        let now = self.clock.now();
        let mut axes = Vec::with_capacity(self.axes.len());
        for (axis, measured) in self.axes.iter_mut().zip(measured) {
            let pid = axis.pid.update_at(axis.set_point, measured, now)?;
            axes.push(AxisReport {
                name: axis.name.clone(),
                measured,
                set_point: axis.set_point,
                pid,
            });
        }

        Ok(CycleReport {
            marker: Some(marker.id),
            skipped,
            axes,
        })
    }
}
