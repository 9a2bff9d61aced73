//! JSON configuration for a tracking loop.

use std::{fs, path::Path};

use marker_servo_pid::PidGains;
use marker_servo_select::{DictionaryProfile, Measurement, TargetSelection};
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum ConfigIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// One controlled axis: what to measure, where it should be, and the gains.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AxisConfig {
    pub name: String,
    #[serde(default)]
    pub measurement: Measurement,
    pub set_point: f64,
    pub gains: PidGains,
}

/// Configuration of a [`Tracker`](crate::Tracker).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Dictionary handed to the detector backend.
    #[serde(default)]
    pub profile: DictionaryProfile,
    #[serde(default)]
    pub target: TargetSelection,
    pub axes: Vec<AxisConfig>,
}

impl Default for TrackingConfig {
    /// Pan/tilt centering of the largest marker in a 640x480 frame.
    fn default() -> Self {
        Self {
            profile: DictionaryProfile::default(),
            target: TargetSelection::Largest,
            axes: vec![
                AxisConfig {
                    name: "pan".to_owned(),
                    measurement: Measurement::CenterX,
                    set_point: 320.0,
                    gains: PidGains::new(0.004, 0.0005, 0.0002),
                },
                AxisConfig {
                    name: "tilt".to_owned(),
                    measurement: Measurement::CenterY,
                    set_point: 240.0,
                    gains: PidGains::new(0.004, 0.0005, 0.0002),
                },
            ],
        }
    }
}

impl TrackingConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
