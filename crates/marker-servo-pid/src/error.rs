use serde::{Deserialize, Serialize};

/// Errors returned by [`PidController`](crate::PidController).
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PidError {
    #[error("PID controller has not been started; call start() before update()")]
    NotStarted,
}

/// Timing anomaly detected during an update.
///
/// Not an error: the update proceeds with `dt` clamped to zero, so the
/// integral does not grow and the derivative term is zero.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegenerateTiming {
    #[error("no time elapsed since the previous sample")]
    ZeroElapsed,
    #[error("timestamp precedes the previous sample")]
    NonMonotonic,
}
