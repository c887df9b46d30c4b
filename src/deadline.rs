//! Deadline parsing and day arithmetic

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const MILLIS_PER_DAY: i64 = 86_400_000;

const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Offset forms RFC 3339 rejects (minute precision, colon-less offsets)
const OFFSET_DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

/// Parse an ISO-8601 deadline.
///
/// Accepts RFC 3339 timestamps, minute-precision timestamps with `Z` or an
/// offset, naive date-times (read as UTC) and bare `YYYY-MM-DD` dates
/// (UTC midnight). Returns `None` for anything else.
pub fn parse_deadline(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(raw, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    // A trailing `Z` on a form RFC 3339 rejects still means UTC
    let naive_raw = raw.strip_suffix(['Z', 'z']).unwrap_or(raw);
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(naive_raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Whole days from `now` until `deadline`, rounded up. Negative once overdue.
pub fn days_remaining(deadline: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    ceil_days((deadline - now).num_milliseconds())
}

/// Days from `now` until midnight UTC of `date`, rounded up
pub fn days_until_date(date: NaiveDate, now: DateTime<Utc>) -> i64 {
    match date.and_hms_opt(0, 0, 0) {
        Some(midnight) => days_remaining(midnight.and_utc(), now),
        None => 0,
    }
}

fn ceil_days(millis: i64) -> i64 {
    let days = millis.div_euclid(MILLIS_PER_DAY);
    if millis.rem_euclid(MILLIS_PER_DAY) == 0 {
        days
    } else {
        days + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_date_only_is_utc_midnight() {
        let parsed = parse_deadline("2026-08-02").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 8, 2, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let parsed = parse_deadline("2026-08-02T02:00:00+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 8, 2, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_naive_datetime() {
        let parsed = parse_deadline(" 2026-08-02T10:30:00.250 ").unwrap();
        assert_eq!(parsed.timestamp_subsec_millis(), 250);
        assert!(parse_deadline("2026-08-02 10:30:00").is_some());
    }

    #[test]
    fn test_parse_minute_precision() {
        let utc = Utc.with_ymd_and_hms(2026, 8, 2, 10, 30, 0).unwrap();
        assert_eq!(parse_deadline("2026-08-02T10:30Z"), Some(utc));
        assert_eq!(parse_deadline("2026-08-02T10:30"), Some(utc));
        assert_eq!(parse_deadline("2026-08-02 10:30"), Some(utc));

        let shifted = Utc.with_ymd_and_hms(2026, 8, 2, 8, 30, 0).unwrap();
        assert_eq!(parse_deadline("2026-08-02T10:30+02:00"), Some(shifted));
    }

    #[test]
    fn test_parse_colon_less_offset() {
        let parsed = parse_deadline("2026-08-02T10:30:00+0200").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 8, 2, 8, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_deadline("").is_none());
        assert!(parse_deadline("   ").is_none());
        assert!(parse_deadline("next quarter").is_none());
        assert!(parse_deadline("2026-13-45").is_none());
        assert!(parse_deadline("2026-08-02T10").is_none());
        assert!(parse_deadline("Z").is_none());
    }

    #[test]
    fn test_days_remaining_rounds_up() {
        let now = noon();
        assert_eq!(days_remaining(now + Duration::days(30), now), 30);
        assert_eq!(days_remaining(now + Duration::hours(1), now), 1);
        assert_eq!(days_remaining(now + Duration::hours(25), now), 2);
        assert_eq!(days_remaining(now, now), 0);
    }

    #[test]
    fn test_days_remaining_negative_when_overdue() {
        let now = noon();
        assert_eq!(days_remaining(now - Duration::days(5), now), -5);
        // ceil(-1.5) == -1
        assert_eq!(days_remaining(now - Duration::hours(36), now), -1);
        // ceil(-0.5) == 0, not yet counted as overdue
        assert_eq!(days_remaining(now - Duration::hours(12), now), 0);
    }

    #[test]
    fn test_days_until_date() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 20).unwrap();
        assert_eq!(days_until_date(date, noon()), 5);
    }
}
