//! Time source for the execution loop.
//!
//! The TWAP simulator never reads the wall clock or sleeps directly; it asks a
//! [`Clock`]. `SystemClock` is the real thing, `ManualClock` is virtual time
//! that jumps forward on every pause so a five-minute schedule runs instantly.

use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;
use std::time::Duration as StdDuration;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Block (or advance virtual time) for `interval`.
    fn pause(&self, interval: StdDuration);
}

/// Wall clock backed by `Utc::now` and `thread::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn pause(&self, interval: StdDuration) {
        std::thread::sleep(interval);
    }
}

/// Virtual clock: starts at a fixed instant and advances only on `pause`.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Move the clock by a signed amount. Negative values simulate a clock
    /// anomaly.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn pause(&self, interval: StdDuration) {
        let by = Duration::from_std(interval).unwrap_or(Duration::zero());
        self.advance(by);
    }
}
