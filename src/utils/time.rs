use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::fmt::Display;

/// Current wall-clock time in `tz`
pub fn now_in(tz: Tz) -> DateTime<Tz> {
    Utc::now().with_timezone(&tz)
}

/// Format as YYYY-MM-DD in the datetime's own zone
pub fn calendar_date<T: TimeZone>(dt: &DateTime<T>) -> String
where
    T::Offset: Display,
{
    dt.format("%Y-%m-%d").to_string()
}

/// Format as zero-padded 24-hour HH:MM in the datetime's own zone
pub fn clock_time<T: TimeZone>(dt: &DateTime<T>) -> String
where
    T::Offset: Display,
{
    dt.format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn test_formats_use_own_zone() {
        // 2026-03-16 01:05 UTC is still the 15th in New York
        let utc = Utc.with_ymd_and_hms(2026, 3, 16, 1, 5, 0).unwrap();
        let local = utc.with_timezone(&Tz::America__New_York);

        assert_eq!(calendar_date(&utc), "2026-03-16");
        assert_eq!(clock_time(&utc), "01:05");
        assert_eq!(calendar_date(&local), "2026-03-15");
        assert_eq!(clock_time(&local), "21:05");
    }

    #[test]
    fn test_clock_time_is_zero_padded() {
        let dt = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2026, 1, 2, 3, 4, 0)
            .unwrap();
        assert_eq!(clock_time(&dt), "03:04");
    }

    #[test]
    fn test_now_in_zone() {
        let now = now_in(Tz::Europe__Helsinki);
        assert_eq!(now.timezone(), Tz::Europe__Helsinki);
    }
}
