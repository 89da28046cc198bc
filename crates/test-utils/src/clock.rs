// Path: crates/test-utils/src/clock.rs
//! A manually advanced clock.

use chrono::{DateTime, TimeZone, Utc};
use ndn_api::time::Clock;
use std::sync::Mutex;
use std::time::Duration;

/// A clock whose system and steady time only move when told to.
pub struct VirtualClock {
    system: Mutex<DateTime<Utc>>,
    steady: Mutex<Duration>,
}

impl Default for VirtualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualClock {
    /// Starts at a fixed epoch (2024-01-01T00:00:00Z, steady zero).
    pub fn new() -> Self {
        let start = Utc
            .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or_else(Utc::now);
        Self::starting_at(start)
    }

    /// Starts at the given wall-clock time, steady zero.
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            system: Mutex::new(start),
            steady: Mutex::new(Duration::ZERO),
        }
    }

    /// Advances both system and steady time.
    pub fn advance(&self, delta: Duration) {
        if let Ok(mut system) = self.system.lock() {
            *system += chrono::Duration::from_std(delta).unwrap_or_else(|_| chrono::Duration::zero());
        }
        if let Ok(mut steady) = self.steady.lock() {
            *steady += delta;
        }
    }

    /// Sets the wall-clock time without touching steady time.
    pub fn set_system(&self, at: DateTime<Utc>) {
        if let Ok(mut system) = self.system.lock() {
            *system = at;
        }
    }
}

impl Clock for VirtualClock {
    fn system_now(&self) -> DateTime<Utc> {
        self.system.lock().map(|t| *t).unwrap_or_else(|_| Utc::now())
    }

    fn steady_now(&self) -> Duration {
        self.steady.lock().map(|t| *t).unwrap_or(Duration::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_both_timelines() {
        let clock = VirtualClock::new();
        let t0 = clock.system_now();
        clock.advance(Duration::from_secs(5));
        assert_eq!(clock.system_now() - t0, chrono::Duration::seconds(5));
        assert_eq!(clock.steady_now(), Duration::from_secs(5));
    }
}
