pub mod clock;
pub mod metrics;
pub mod tasks;
pub mod validation;
pub mod week;

pub use clock::{Clock, FixedClock, SystemClock};
pub use tasks::TaskSpawner;
pub use week::{cache_key, iso_week_id, likes_key};

/// Week id for the instant reported by `clock`.
pub fn current_week_id(clock: &dyn Clock) -> String {
    iso_week_id(&clock.now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    #[test]
    fn test_current_week_id_follows_clock() {
        let clock = FixedClock(Local.with_ymd_and_hms(2024, 3, 6, 12, 0, 0).unwrap());
        assert_eq!(current_week_id(&clock), "2024-W10");
    }
}
