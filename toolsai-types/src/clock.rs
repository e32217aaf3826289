//! Wall clock abstraction and subscription day arithmetic.
//!
//! Session code never reads the system time directly; it asks a [`Clock`].
//! Production wiring uses [`SystemClock`], tests drive a [`FixedClock`] to
//! simulate "now" moving forward by whole days.

use chrono::{DateTime, Duration, Utc};
use std::sync::RwLock;

/// Milliseconds in one day.
pub const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a settable instant.
#[derive(Debug)]
pub struct FixedClock {
    now: RwLock<DateTime<Utc>>,
}

impl FixedClock {
    /// Creates a clock that reports `now` until moved.
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(now),
        }
    }

    /// Moves the clock to `now`.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.write().unwrap_or_else(|e| e.into_inner()) = now;
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut guard = self.now.write().unwrap_or_else(|e| e.into_inner());
        *guard += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().unwrap_or_else(|e| e.into_inner())
    }
}

/// Whole days left until `expiry`, rounded up.
///
/// Computes `ceil((expiry - now) / 1 day)` on the millisecond difference.
/// The result is negative once the expiry is more than a day in the past.
#[must_use]
pub fn days_remaining(expiry: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let diff = (expiry - now).num_milliseconds();
    let whole = diff / MILLIS_PER_DAY;
    // Integer division truncates toward zero, which is already the ceiling
    // for negative differences.
    if diff % MILLIS_PER_DAY > 0 {
        whole + 1
    } else {
        whole
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn exact_days_do_not_round_up() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let expiry = now + Duration::days(10);
        assert_eq!(days_remaining(expiry, now), 10);
    }

    #[test]
    fn partial_day_rounds_up() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let expiry = now + Duration::days(3) + Duration::milliseconds(1);
        assert_eq!(days_remaining(expiry, now), 4);
    }

    #[test]
    fn past_expiry_is_negative() {
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
        let expiry = Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap();
        // -2.5 days rounds up to -2
        assert_eq!(days_remaining(expiry, now), -2);
    }

    #[test]
    fn fixed_clock_advances() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let clock = FixedClock::new(start);
        clock.advance(Duration::days(2));
        assert_eq!(clock.now(), start + Duration::days(2));
        clock.set(start);
        assert_eq!(clock.now(), start);
    }
}
