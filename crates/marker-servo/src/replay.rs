//! Drive a [`Tracker`] from a recorded session.
//!
//! A recording is a JSON document of timestamped backend outputs:
//!
//! ```json
//! {
//!   "start": 0.0,
//!   "frames": [
//!     { "t": 0.033, "corners": [[[300, 200], [340, 200], [340, 240], [300, 240]]], "ids": [7] },
//!     { "t": 0.066 }
//!   ]
//! }
//! ```
//!
//! Frames without `corners`/`ids` are frames where nothing was detected.

use std::{fs, path::Path};

use marker_servo_core::RawDetections;
use marker_servo_pid::ManualClock;
use marker_servo_select::{DetectionBackend, DetectorAdapter, DictionaryProfile};
use serde::{Deserialize, Serialize};

use crate::{ConfigIoError, CycleReport, TrackError, Tracker, TrackingConfig};

/// One recorded frame: capture time plus what the backend returned.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordedFrame {
    /// Capture time in seconds since the recording origin.
    pub t: f64,
    #[serde(flatten)]
    pub detections: RawDetections,
}

/// A recorded session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    /// Time at which the controllers are started.
    #[serde(default)]
    pub start: f64,
    pub frames: Vec<RecordedFrame>,
}

impl Recording {
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigIoError> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Backend that hands back the detections stored in a recorded frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct RecordedBackend;

impl DetectionBackend for RecordedBackend {
    type Frame = RecordedFrame;

    fn detect_raw(&mut self, frame: &RecordedFrame, _profile: DictionaryProfile) -> RawDetections {
        frame.detections.clone()
    }
}

/// One replayed cycle.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReplayStep {
    pub t: f64,
    #[serde(flatten)]
    pub report: CycleReport,
}

/// Replay a recording through a fresh tracker built from `config`.
///
/// The tracker's clock follows the frame timestamps, so the controllers see
/// the recorded timing rather than wall-clock time. Timestamps are measured
/// from the earliest time in the recording, so negative times are fine.
pub fn replay(
    config: &TrackingConfig,
    recording: &Recording,
) -> Result<Vec<ReplayStep>, TrackError> {
    replay_with(config, recording, |_| {})
}

/// [`replay`] with a callback invoked for every cycle as it completes.
pub fn replay_with(
    config: &TrackingConfig,
    recording: &Recording,
    mut on_step: impl FnMut(&ReplayStep),
) -> Result<Vec<ReplayStep>, TrackError> {
    let clock = ManualClock::new();
    let detector = DetectorAdapter::new(RecordedBackend, config.profile);
    let mut tracker = Tracker::with_clock(detector, config, clock.clone());

    let origin = recording
        .frames
        .iter()
        .map(|f| f.t)
        .fold(recording.start, f64::min);
    clock.set_secs_f64(recording.start - origin);
    tracker.start();
    log::info!(
        "replaying {} frames from t={:.3}s",
        recording.frames.len(),
        recording.start
    );

    let mut steps = Vec::with_capacity(recording.frames.len());
    for frame in &recording.frames {
        clock.set_secs_f64(frame.t - origin);
        let report = tracker.step(frame)?;
        let step = ReplayStep { t: frame.t, report };
        on_step(&step);
        steps.push(step);
    }
    Ok(steps)
}
