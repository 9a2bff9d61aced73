//! PID feedback controller with explicit, injectable timing.
//!
//! ```
//! use marker_servo_pid::{ManualClock, PidController, PidGains};
//! use std::time::Duration;
//!
//! let clock = ManualClock::new();
//! let mut pid = PidController::with_clock(PidGains::new(0.5, 0.1, 0.0), clock.clone());
//! pid.start();
//! clock.advance(Duration::from_millis(33));
//! let output = pid.update(320.0, 300.0)?;
//! assert!(output > 0.0);
//! # Ok::<(), marker_servo_pid::PidError>(())
//! ```
//!
//! One controller instance owns its state; run one per controlled axis.

mod clock;
mod controller;
mod error;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use controller::{ControllerState, PidController, PidGains, PidOutput, MIN_DT};
pub use error::{DegenerateTiming, PidError};
