//! Conditional request handling.
//!
//! Browsers revalidate with the `ETag` we hand out (the raw mtime in
//! milliseconds, echoed back in `If-Match`) or with `If-Modified-Since`.
//! HTTP dates only carry whole seconds, so that comparison truncates.

use chrono::{DateTime, NaiveDateTime, Utc};

const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Obsolete forms recipients must still accept: RFC 850 and asctime.
const OBSOLETE_DATE_FORMATS: [&str; 2] = ["%A, %d-%b-%y %H:%M:%S GMT", "%a %b %e %H:%M:%S %Y"];

/// Whether the client's copy of a file modified at `modified_ms` is current.
///
/// An integer `If-Match` decides on its own; a malformed one falls through
/// to `If-Modified-Since`.
pub fn is_up_to_date(
    modified_ms: u64,
    if_match: Option<&str>,
    if_modified_since: Option<&str>,
) -> bool {
    if let Some(tag) = if_match.and_then(|value| value.trim().parse::<u64>().ok()) {
        return tag == modified_ms;
    }

    if let Some(since) = if_modified_since.and_then(parse_http_date) {
        return since.timestamp() == (modified_ms / 1000) as i64;
    }

    false
}

pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(date) = DateTime::parse_from_rfc2822(value) {
        return Some(date.with_timezone(&Utc));
    }
    OBSOLETE_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|date| date.and_utc())
}

/// IMF-fixdate rendering of a millisecond timestamp.
pub fn format_http_date(ms: u64) -> String {
    let date = i64::try_from(ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    date.format(HTTP_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2024-03-01T12:30:45.678Z
    const MTIME: u64 = 1_709_296_245_678;

    #[test]
    fn test_format_http_date() {
        assert_eq!(format_http_date(MTIME), "Fri, 01 Mar 2024 12:30:45 GMT");
        assert_eq!(format_http_date(0), "Thu, 01 Jan 1970 00:00:00 GMT");
    }

    #[test]
    fn test_if_match_exact_millis() {
        assert!(is_up_to_date(MTIME, Some("1709296245678"), None));
        assert!(!is_up_to_date(MTIME, Some("1709296245000"), None));
    }

    #[test]
    fn test_if_match_wins_over_if_modified_since() {
        let same_second = format_http_date(MTIME);
        assert!(!is_up_to_date(MTIME, Some("1"), Some(same_second.as_str())));
    }

    #[test]
    fn test_malformed_if_match_falls_through() {
        let same_second = format_http_date(MTIME);
        assert!(is_up_to_date(MTIME, Some("\"abc\""), Some(same_second.as_str())));
    }

    #[test]
    fn test_if_modified_since_second_resolution() {
        assert!(is_up_to_date(MTIME, None, Some("Fri, 01 Mar 2024 12:30:45 GMT")));
        assert!(!is_up_to_date(MTIME, None, Some("Fri, 01 Mar 2024 11:30:45 GMT")));
        assert!(!is_up_to_date(MTIME, None, Some("yesterday")));
    }

    #[test]
    fn test_obsolete_date_formats() {
        let expected = parse_http_date("Fri, 01 Mar 2024 12:30:45 GMT").unwrap();
        assert_eq!(parse_http_date("Friday, 01-Mar-24 12:30:45 GMT"), Some(expected));
        assert_eq!(parse_http_date("Fri Mar  1 12:30:45 2024"), Some(expected));

        assert!(is_up_to_date(MTIME, None, Some("Friday, 01-Mar-24 12:30:45 GMT")));
        assert!(is_up_to_date(MTIME, None, Some("Fri Mar  1 12:30:45 2024")));
        assert!(!is_up_to_date(MTIME, None, Some("Fri Mar  1 11:30:45 2024")));
    }

    #[test]
    fn test_no_headers_is_stale() {
        assert!(!is_up_to_date(MTIME, None, None));
    }
}
