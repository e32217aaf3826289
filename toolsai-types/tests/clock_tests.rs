use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use toolsai_types::{days_remaining, Clock, FixedClock, SystemClock};

#[test]
fn system_clock_is_close_to_now() {
    let before = Utc::now();
    let now = SystemClock.now();
    let after = Utc::now();
    assert!(before <= now && now <= after);
}

#[test]
fn days_remaining_scenario_2024_to_2099() {
    let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let expiry = Utc.with_ymd_and_hms(2099, 3, 20, 0, 0, 0).unwrap();
    assert_eq!(days_remaining(expiry, now), 27472);
}

#[test]
fn days_remaining_zero_at_expiry() {
    let t = Utc.with_ymd_and_hms(2030, 6, 1, 0, 0, 0).unwrap();
    assert_eq!(days_remaining(t, t), 0);
}

#[test]
fn days_remaining_one_ms_before_expiry() {
    let expiry = Utc.with_ymd_and_hms(2030, 6, 1, 0, 0, 0).unwrap();
    let now = expiry - Duration::milliseconds(1);
    assert_eq!(days_remaining(expiry, now), 1);
}

proptest! {
    #[test]
    fn days_remaining_strictly_decreases_by_whole_days(
        offset_ms in 0i64..(400 * 86_400_000),
        steps in 1i64..50,
    ) {
        let expiry = Utc.with_ymd_and_hms(2099, 3, 20, 0, 0, 0).unwrap();
        let clock = FixedClock::new(expiry - Duration::milliseconds(offset_ms));
        let before = days_remaining(expiry, clock.now());
        clock.advance(Duration::days(steps));
        let after = days_remaining(expiry, clock.now());
        prop_assert_eq!(before - after, steps);
    }
}
