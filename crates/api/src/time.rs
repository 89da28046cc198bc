// Path: crates/api/src/time.rs
//! Pluggable time source.
//!
//! Replay guards, caches, and the dispatcher take their notion of "now"
//! from a [`Clock`] so that tests can drive time deterministically.
//! System time is wall-clock and may jump; steady time is monotonic and is
//! expressed as a duration since an arbitrary process-local epoch.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use std::time::{Duration, Instant};

/// A source of wall-clock and monotonic time.
pub trait Clock: Send + Sync {
    /// Wall-clock now.
    fn system_now(&self) -> DateTime<Utc>;

    /// Monotonic now, as elapsed time since an arbitrary fixed epoch.
    fn steady_now(&self) -> Duration;
}

static STEADY_EPOCH: Lazy<Instant> = Lazy::new(Instant::now);

/// The real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn system_now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn steady_now(&self) -> Duration {
        STEADY_EPOCH.elapsed()
    }
}
