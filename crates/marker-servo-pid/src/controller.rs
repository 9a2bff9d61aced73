//! Continuous-time PID controller.
//!
//! `output = kp·e + ki·∫e dt + kd·de/dt`, with `dt` taken from the clock
//! between consecutive samples. The integral accumulates for the lifetime of
//! the controller unless [`PidController::reset`] is called; there is no
//! anti-windup and no output clamping, callers compose those around it.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::{Clock, DegenerateTiming, MonotonicClock, PidError};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Elapsed time (seconds) at or below which a sample is treated as
/// simultaneous with the previous one.
pub const MIN_DT: f64 = 1e-9;

/// Controller gains, fixed for the lifetime of a controller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PidGains {
    pub kp: f64,
    #[serde(default)]
    pub ki: f64,
    #[serde(default)]
    pub kd: f64,
}

impl PidGains {
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self { kp, ki, kd }
    }
}

/// Lifecycle of a controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerState {
    Idle,
    Started,
}

/// Full breakdown of one update.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PidOutput {
    /// `proportional_term + integral_term + derivative_term`.
    pub output: f64,
    /// `kp·e`.
    pub proportional_term: f64,
    /// `ki·∫e dt`. The raw accumulator is [`PidController::integral`].
    pub integral_term: f64,
    /// `kd·de/dt`, zero for samples with degenerate timing.
    pub derivative_term: f64,
    /// Error used for this sample (`set_point − measured`).
    pub error: f64,
    /// Effective time step in seconds after clamping.
    pub dt: f64,
    /// Set when `dt` had to be clamped.
    pub timing: Option<DegenerateTiming>,
}

#[derive(Clone, Copy, Debug, Default)]
struct PidState {
    integral: f64,
    previous_error: f64,
    previous_time: Option<Instant>,
}

/// PID controller owning its accumulator and timing reference.
///
/// Mutating operations take `&mut self`; sharing one controller between
/// threads needs external locking.
#[derive(Clone, Debug)]
pub struct PidController<C = MonotonicClock> {
    gains: PidGains,
    state: PidState,
    clock: C,
}

impl PidController<MonotonicClock> {
    /// Controller timed by `Instant::now()`.
    pub fn new(gains: PidGains) -> Self {
        Self::with_clock(gains, MonotonicClock)
    }
}

impl<C: Clock> PidController<C> {
    pub fn with_clock(gains: PidGains, clock: C) -> Self {
        Self {
            gains,
            state: PidState::default(),
            clock,
        }
    }

    pub fn gains(&self) -> PidGains {
        self.gains
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn state(&self) -> ControllerState {
        if self.state.previous_time.is_some() {
            ControllerState::Started
        } else {
            ControllerState::Idle
        }
    }

    #[inline]
    pub fn is_started(&self) -> bool {
        self.state.previous_time.is_some()
    }

    /// Accumulated `∫e dt`, before multiplying by `ki`.
    pub fn integral(&self) -> f64 {
        self.state.integral
    }

    pub fn previous_error(&self) -> f64 {
        self.state.previous_error
    }

    /// Stamp the timing reference and enter `Started`.
    ///
    /// Calling it again only re-stamps the reference; the accumulated integral
    /// and previous error are kept. Use [`reset`](Self::reset) to clear them.
    pub fn start(&mut self) {
        self.start_at(self.clock.now());
    }

    /// [`start`](Self::start) with an explicit timestamp.
    pub fn start_at(&mut self, now: Instant) {
        if self.is_started() {
            log::debug!("PID restarted; integral={:.4} kept", self.state.integral);
        }
        self.state.previous_time = Some(now);
    }

    /// Clear the integral and previous error. Lifecycle and timing reference
    /// are unchanged.
    pub fn reset(&mut self) {
        self.state.integral = 0.0;
        self.state.previous_error = 0.0;
    }

    /// Advance the controller one sample and return the control output.
    pub fn update(&mut self, set_point: f64, measured_value: f64) -> Result<f64, PidError> {
        let now = self.clock.now();
        self.update_at(set_point, measured_value, now)
            .map(|out| out.output)
    }

    /// Advance the controller one sample at an explicit timestamp.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "trace",
            skip(self, now),
            fields(kp = self.gains.kp, ki = self.gains.ki, kd = self.gains.kd)
        )
    )]
    pub fn update_at(
        &mut self,
        set_point: f64,
        measured_value: f64,
        now: Instant,
    ) -> Result<PidOutput, PidError> {
        let previous_time = self.state.previous_time.ok_or(PidError::NotStarted)?;

        let (dt, timing) = match now.checked_duration_since(previous_time) {
            None => (0.0, Some(DegenerateTiming::NonMonotonic)),
            Some(elapsed) => {
                let dt = elapsed.as_secs_f64();
                if dt <= MIN_DT {
                    (0.0, Some(DegenerateTiming::ZeroElapsed))
                } else {
                    (dt, None)
                }
            }
        };
        if let Some(anomaly) = timing {
            log::warn!("PID update: {anomaly}; derivative term dropped for this sample");
        }

        let PidGains { kp, ki, kd } = self.gains;
        let error = set_point - measured_value;

        let proportional_term = kp * error;

        self.state.integral += error * dt;
        let integral_term = ki * self.state.integral;

        let derivative_term = if timing.is_none() {
            kd * (error - self.state.previous_error) / dt
        } else {
            0.0
        };

        self.state.previous_time = Some(now);
        self.state.previous_error = error;

        Ok(PidOutput {
            output: proportional_term + integral_term + derivative_term,
            proportional_term,
            integral_term,
            derivative_term,
            error,
            dt,
            timing,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ManualClock;
    use approx::assert_relative_eq;
    use std::time::Duration;

    fn controller(kp: f64, ki: f64, kd: f64) -> (PidController<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let pid = PidController::with_clock(PidGains::new(kp, ki, kd), clock.clone());
        (pid, clock)
    }

    #[test]
    fn update_before_start_fails() {
        let (mut pid, _clock) = controller(1.0, 0.0, 0.0);
        assert_eq!(pid.state(), ControllerState::Idle);
        assert_eq!(pid.update(1.0, 0.0), Err(PidError::NotStarted));
        assert_eq!(pid.integral(), 0.0);
    }

    #[test]
    fn pure_proportional_ignores_elapsed_time() {
        for wait in [0, 1, 1_000, 5_000_000] {
            let (mut pid, clock) = controller(1.0, 0.0, 0.0);
            pid.start();
            clock.advance(Duration::from_micros(wait));
            assert_relative_eq!(pid.update(10.0, 7.0).expect("started"), 3.0);
        }
    }

    #[test]
    fn integral_accumulates_over_samples() {
        let (mut pid, clock) = controller(0.0, 1.0, 0.0);
        pid.start();

        clock.advance(Duration::from_secs(1));
        assert_relative_eq!(pid.update(2.0, 0.0).expect("started"), 2.0);

        clock.advance(Duration::from_secs(1));
        assert_relative_eq!(pid.update(2.0, 0.0).expect("started"), 4.0);
        assert_relative_eq!(pid.integral(), 4.0);
    }

    #[test]
    fn integral_term_is_scaled_accumulator() {
        let (mut pid, clock) = controller(0.0, 0.25, 0.0);
        pid.start();
        clock.advance(Duration::from_secs(2));
        let out = pid.update_at(3.0, 0.0, clock.now()).expect("started");
        assert_relative_eq!(pid.integral(), 6.0);
        assert_relative_eq!(out.integral_term, 1.5);
        assert_relative_eq!(out.output, out.integral_term);

        let json = serde_json::to_value(out).expect("serialize");
        assert_eq!(json["integral_term"], 1.5);
        assert!(json.get("integral").is_none());
    }

    #[test]
    fn derivative_uses_previous_error() {
        let (mut pid, clock) = controller(0.0, 0.0, 1.0);
        pid.start();

        clock.advance(Duration::from_millis(500));
        let first = pid.update_at(5.0, 4.0, clock.now()).expect("started");
        // previous_error starts at 0: (1 - 0) / 0.5
        assert_relative_eq!(first.derivative_term, 2.0, epsilon = 1e-12);

        clock.advance(Duration::from_millis(250));
        let second = pid.update_at(5.0, 4.5, clock.now()).expect("started");
        // (0.5 - 1) / 0.25
        assert_relative_eq!(second.derivative_term, -2.0, epsilon = 1e-12);
        assert_eq!(second.timing, None);
    }

    #[test]
    fn same_instant_drops_derivative() {
        let (mut pid, clock) = controller(1.0, 1.0, 10.0);
        pid.start();
        clock.advance(Duration::from_millis(100));
        let first = pid.update_at(1.0, 0.0, clock.now()).expect("started");
        assert!(first.timing.is_none());

        let integral_before = pid.integral();
        let second = pid.update_at(3.0, 0.0, clock.now()).expect("started");
        assert_eq!(second.timing, Some(DegenerateTiming::ZeroElapsed));
        assert_eq!(second.derivative_term, 0.0);
        assert_eq!(second.dt, 0.0);
        assert!(second.output.is_finite());
        assert_relative_eq!(pid.integral(), integral_before);
        assert_relative_eq!(second.output, 3.0 + integral_before);
        assert_relative_eq!(pid.previous_error(), 3.0);
    }

    #[test]
    fn backwards_timestamp_is_clamped() {
        let (mut pid, clock) = controller(0.0, 1.0, 1.0);
        clock.set(Duration::from_secs(10));
        pid.start();
        clock.set(Duration::from_secs(11));
        pid.update(1.0, 0.0).expect("started");
        assert_relative_eq!(pid.integral(), 1.0);

        clock.set(Duration::from_secs(5));
        let out = pid.update_at(1.0, 0.0, clock.now()).expect("started");
        assert_eq!(out.timing, Some(DegenerateTiming::NonMonotonic));
        assert_eq!(out.derivative_term, 0.0);
        assert_relative_eq!(pid.integral(), 1.0);

        // The reference follows the clock, so the next sample is regular.
        clock.set(Duration::from_secs(6));
        let out = pid.update_at(1.0, 0.0, clock.now()).expect("started");
        assert_eq!(out.timing, None);
        assert_relative_eq!(out.dt, 1.0);
        assert_relative_eq!(pid.integral(), 2.0);
    }

    #[test]
    fn restart_keeps_integral_reset_clears_it() {
        let (mut pid, clock) = controller(0.0, 1.0, 0.0);
        pid.start();
        clock.advance(Duration::from_secs(2));
        pid.update(1.5, 0.0).expect("started");
        assert_relative_eq!(pid.integral(), 3.0);

        clock.advance(Duration::from_secs(60));
        pid.start();
        assert!(pid.is_started());
        assert_relative_eq!(pid.integral(), 3.0);
        assert_relative_eq!(pid.previous_error(), 1.5);

        // Only one second counted since the re-stamp.
        clock.advance(Duration::from_secs(1));
        pid.update(1.5, 0.0).expect("started");
        assert_relative_eq!(pid.integral(), 4.5);

        pid.reset();
        assert_eq!(pid.integral(), 0.0);
        assert_eq!(pid.previous_error(), 0.0);
        assert_eq!(pid.state(), ControllerState::Started);
    }

    #[test]
    fn gains_deserialize_with_defaults() {
        let gains: PidGains = serde_json::from_str(r#"{"kp": 0.8}"#).expect("parse");
        assert_eq!(gains, PidGains::new(0.8, 0.0, 0.0));
    }
}
