//! Time sources for the controller.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Source of monotonic timestamps.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// `std::time::Instant::now()`.
#[derive(Clone, Copy, Debug, Default)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock driven by hand, for replaying recordings and for tests.
///
/// Clones share the same time, so a caller can keep one handle and give
/// another to a controller. Setting the offset backwards is allowed; the
/// controller reports it as [`DegenerateTiming::NonMonotonic`](crate::DegenerateTiming).
#[derive(Clone, Debug)]
pub struct ManualClock {
    origin: Instant,
    offset_nanos: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset_nanos: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Time elapsed since the clock was created.
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.offset_nanos.load(Ordering::Acquire))
    }

    /// Jump to an absolute offset from the clock origin.
    pub fn set(&self, offset: Duration) {
        let nanos = u64::try_from(offset.as_nanos()).unwrap_or(u64::MAX);
        self.offset_nanos.store(nanos, Ordering::Release);
    }

    /// Jump to an absolute offset given in seconds.
    ///
    /// The clock cannot go before its origin: negative or NaN values clamp to 0
    /// with a warning. Callers replaying signed timestamps should shift them
    /// first.
    pub fn set_secs_f64(&self, secs: f64) {
        if secs.is_nan() || secs < 0.0 {
            log::warn!("manual clock set to {secs}s; clamped to the origin");
            self.set(Duration::ZERO);
            return;
        }
        self.set(Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX));
    }

    pub fn advance(&self, by: Duration) {
        let nanos = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        let _ = self
            .offset_nanos
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |cur| {
                Some(cur.saturating_add(nanos))
            });
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }
}
