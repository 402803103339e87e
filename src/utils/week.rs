//! Week identifiers and the cache document keys derived from them.
//!
//! The week id is named after ISO-8601 but is not ISO week numbering:
//! weeks start on Sunday, week 1 is the week containing January 1st, and
//! the year is always the calendar year. Existing cache documents were
//! written with these ids, so the formula must stay as is.

use chrono::{DateTime, Datelike, LocalResult, NaiveDate, TimeZone};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// `"{year}-W{week:02}"` where `week = ceil((days_since_jan1 + weekday(jan1) + 1) / 7)`
/// and weekday counts from Sunday = 0.
pub fn iso_week_id<Tz: TimeZone>(now: &DateTime<Tz>) -> String {
    let year = now.year();
    let jan1 = NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or_default();
    let midnight = jan1.and_hms_opt(0, 0, 0).unwrap_or_default();

    // Elapsed time is measured between instants, so a DST shift between
    // January and `now` moves day boundaries by the offset change.
    let elapsed = match now.timezone().from_local_datetime(&midnight) {
        LocalResult::Single(start) | LocalResult::Ambiguous(start, _) => {
            now.clone().signed_duration_since(start)
        }
        LocalResult::None => now.naive_local() - midnight,
    };

    let days = elapsed.num_milliseconds().div_euclid(MILLIS_PER_DAY);
    let offset = jan1.weekday().num_days_from_sunday() as i64;
    let week = (days + offset + 1 + 6).div_euclid(7);

    format!("{}-W{:02}", year, week)
}

/// `"{subject_tag}_{lowercase category}_{week_id}"`. Separators are not escaped.
pub fn cache_key(subject_tag: &str, category: &str, week_id: &str) -> String {
    format!("{}_{}_{}", subject_tag, category.to_lowercase(), week_id)
}

pub fn likes_key(cache_key: &str) -> String {
    format!("{}_likes", cache_key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDateTime, Utc};

    /// Zone at UTC+0 that moves to UTC+1 at the UTC instant `AT` (unix seconds).
    #[derive(Debug, Clone, Copy)]
    struct SpringForward<const AT: i64>;

    impl<const AT: i64> SpringForward<AT> {
        fn before() -> FixedOffset {
            FixedOffset::east_opt(0).unwrap()
        }

        fn after() -> FixedOffset {
            FixedOffset::east_opt(3600).unwrap()
        }
    }

    impl<const AT: i64> TimeZone for SpringForward<AT> {
        type Offset = FixedOffset;

        fn from_offset(_offset: &FixedOffset) -> Self {
            SpringForward
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
            self.offset_from_local_datetime(&local.and_hms_opt(0, 0, 0).unwrap())
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            let wall = local.and_utc().timestamp();
            if wall < AT {
                LocalResult::Single(Self::before())
            } else if wall - 3600 >= AT {
                LocalResult::Single(Self::after())
            } else {
                // skipped hour
                LocalResult::None
            }
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
            self.offset_from_utc_datetime(&utc.and_hms_opt(0, 0, 0).unwrap())
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            if utc.and_utc().timestamp() < AT {
                Self::before()
            } else {
                Self::after()
            }
        }
    }

    // 2024-03-31T01:00:00Z
    const SUMMER_TIME: SpringForward<1_711_846_800> = SpringForward;
    // 2024-01-01T00:00:00Z, so local midnight on January 1st never happens
    const NEW_YEAR_GAP: SpringForward<1_704_067_200> = SpringForward;

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_known_week_ids() {
        // 2024-01-01 is a Monday
        assert_eq!(iso_week_id(&utc(2024, 1, 1, 0)), "2024-W01");
        assert_eq!(iso_week_id(&utc(2024, 1, 6, 23)), "2024-W01");
        assert_eq!(iso_week_id(&utc(2024, 1, 7, 0)), "2024-W02");
        assert_eq!(iso_week_id(&utc(2024, 3, 6, 12)), "2024-W10");
        assert_eq!(iso_week_id(&utc(2024, 12, 31, 12)), "2024-W53");
    }

    #[test]
    fn test_sunday_new_year() {
        // 2023-01-01 is a Sunday
        assert_eq!(iso_week_id(&utc(2023, 1, 1, 10)), "2023-W01");
        assert_eq!(iso_week_id(&utc(2023, 1, 7, 10)), "2023-W01");
        assert_eq!(iso_week_id(&utc(2023, 1, 8, 10)), "2023-W02");
    }

    #[test]
    fn test_stable_within_week_and_changes_across() {
        let tuesday = utc(2024, 3, 5, 9);
        let thursday = utc(2024, 3, 7, 18);
        let next_wednesday = utc(2024, 3, 13, 9);

        assert_eq!(iso_week_id(&tuesday), iso_week_id(&thursday));
        assert_ne!(iso_week_id(&tuesday), iso_week_id(&next_wednesday));
    }

    #[test]
    fn test_year_rolls_with_calendar_year() {
        assert_eq!(iso_week_id(&utc(2024, 12, 31, 23)), "2024-W53");
        assert_eq!(iso_week_id(&utc(2025, 1, 1, 0)), "2025-W01");
    }

    #[test]
    fn test_uses_local_calendar_of_timestamp() {
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        // Saturday 20:00 UTC is already Sunday in Tokyo
        let instant = utc(2024, 1, 6, 20);
        assert_eq!(iso_week_id(&instant), "2024-W01");
        assert_eq!(iso_week_id(&instant.with_timezone(&tokyo)), "2024-W02");
    }

    #[test]
    fn test_dst_shift_moves_day_boundary() {
        // Sunday 2024-04-07 00:30 local is still 2024-04-06 23:30 UTC, less
        // than 97 whole days after local new year
        let after_midnight = SUMMER_TIME.with_ymd_and_hms(2024, 4, 7, 0, 30, 0).unwrap();
        assert_eq!(iso_week_id(&after_midnight), "2024-W14");

        let an_hour_later = SUMMER_TIME.with_ymd_and_hms(2024, 4, 7, 1, 30, 0).unwrap();
        assert_eq!(iso_week_id(&an_hour_later), "2024-W15");

        // A zone that was already at +1 on January 1st counts 97 days
        let fixed = FixedOffset::east_opt(3600).unwrap();
        assert_eq!(iso_week_id(&after_midnight.with_timezone(&fixed)), "2024-W15");
    }

    #[test]
    fn test_missing_new_year_midnight_uses_wall_clock() {
        let midnight = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert!(matches!(NEW_YEAR_GAP.from_local_datetime(&midnight), LocalResult::None));

        let saturday = NEW_YEAR_GAP.with_ymd_and_hms(2024, 1, 6, 23, 30, 0).unwrap();
        let sunday = NEW_YEAR_GAP.with_ymd_and_hms(2024, 1, 7, 12, 0, 0).unwrap();
        assert_eq!(iso_week_id(&saturday), "2024-W01");
        assert_eq!(iso_week_id(&sunday), "2024-W02");
    }

    #[test]
    fn test_cache_key_shape() {
        assert_eq!(cache_key("ArchetypeX", "Movies", "2024-W10"), "ArchetypeX_movies_2024-W10");
        assert_eq!(
            likes_key(&cache_key("Cultural Curator", "MUSIC", "2025-W02")),
            "Cultural Curator_music_2025-W02_likes"
        );
    }
}
