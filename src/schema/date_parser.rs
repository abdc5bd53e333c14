use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

const DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
];

pub const RFC3339: &str = "rfc3339";

/// Parse a date or timestamp into millis UTC, along with the pattern that matched.
/// Values without an offset are taken as UTC.
pub fn parse_timestamp_millis(s: &str) -> Option<(i64, &'static str)> {
    let s = s.trim();
    // every supported pattern has at least `YYYY-M-D`
    if s.len() < 8 || !s.starts_with(|c: char| c.is_ascii_alphanumeric()) {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some((dt.timestamp_millis(), RFC3339));
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some((naive.and_utc().timestamp_millis(), fmt));
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            let midnight = date.and_hms_opt(0, 0, 0)?;
            return Some((midnight.and_utc().timestamp_millis(), fmt));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_dates_as_utc_midnight() {
        assert_eq!(parse_timestamp_millis("1970-01-02"), Some((86_400_000, "%Y-%m-%d")));
        assert_eq!(parse_timestamp_millis("1970/01/02"), Some((86_400_000, "%Y/%m/%d")));
        assert_eq!(parse_timestamp_millis("01/02/1970"), Some((86_400_000, "%m/%d/%Y")));
    }

    #[test]
    fn parses_timestamps() {
        assert_eq!(
            parse_timestamp_millis("1970-01-01 00:00:01"),
            Some((1_000, "%Y-%m-%d %H:%M:%S"))
        );
        assert_eq!(
            parse_timestamp_millis("2024/12/22 00:05:00").map(|(_, f)| f),
            Some("%Y/%m/%d %H:%M:%S")
        );
        assert_eq!(
            parse_timestamp_millis("1970-01-01T01:00:00+01:00"),
            Some((0, RFC3339))
        );
    }

    #[test]
    fn parses_month_names() {
        assert_eq!(
            parse_timestamp_millis("January 02, 1970"),
            Some((86_400_000, "%B %d, %Y"))
        );
    }

    #[test]
    fn rejects_non_dates() {
        assert_eq!(parse_timestamp_millis("2020"), None);
        assert_eq!(parse_timestamp_millis("hello world"), None);
        assert_eq!(parse_timestamp_millis("2020-13-45"), None);
        assert_eq!(parse_timestamp_millis(""), None);
    }
}
