use chrono::{DateTime, Utc};

/// Age label for a timestamp as seen from `now`.
///
/// Under an hour gives whole minutes (`"5m ago"`), under a day whole hours
/// (`"1h ago"`), anything older the calendar date (`"6/1/2025"`). Timestamps
/// in the future clamp to `"0m ago"`.
#[must_use]
pub fn format_relative(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(timestamp);
    let minutes = elapsed.num_minutes().max(0);

    if minutes < 60 {
        format!("{minutes}m ago")
    } else if minutes < 24 * 60 {
        format!("{}h ago", minutes / 60)
    } else {
        format_date(timestamp)
    }
}

/// Calendar date as `M/D/YYYY`.
#[must_use]
pub fn format_date(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%-m/%-d/%Y").to_string()
}

/// Header clock label, `HH:MM:SS`.
#[must_use]
pub fn format_clock(now: DateTime<Utc>) -> String {
    now.format("%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 10, 15, 30, 0).unwrap()
    }

    #[test]
    fn five_minutes_ago() {
        assert_eq!(format_relative(now() - Duration::minutes(5), now()), "5m ago");
    }

    #[test]
    fn ninety_minutes_is_one_hour() {
        assert_eq!(format_relative(now() - Duration::minutes(90), now()), "1h ago");
    }

    #[test]
    fn two_days_is_absolute_date() {
        let label = format_relative(now() - Duration::days(2), now());
        assert_eq!(label, "6/8/2025");
        assert!(!label.ends_with("ago"));
    }

    #[test]
    fn boundaries() {
        assert_eq!(format_relative(now() - Duration::seconds(59), now()), "0m ago");
        assert_eq!(format_relative(now() - Duration::minutes(59), now()), "59m ago");
        assert_eq!(format_relative(now() - Duration::minutes(60), now()), "1h ago");
        assert_eq!(format_relative(now() - Duration::minutes(1439), now()), "23h ago");
        assert_eq!(format_relative(now() - Duration::hours(24), now()), "6/9/2025");
    }

    #[test]
    fn future_timestamp_clamps_to_zero() {
        assert_eq!(format_relative(now() + Duration::minutes(10), now()), "0m ago");
    }

    #[test]
    fn label_changes_as_now_advances() {
        let ts = now() - Duration::minutes(5);
        let first = format_relative(ts, now());
        let later = format_relative(ts, now() + Duration::minutes(3));
        assert_eq!(first, "5m ago");
        assert_eq!(later, "8m ago");
    }

    #[test]
    fn clock_is_24_hour() {
        assert_eq!(format_clock(now()), "15:30:00");
    }
}
