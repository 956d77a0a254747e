//! Value coercion for typed controls.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Coerce a raw value into canonical `YYYY-MM-DD` form.
///
/// Accepts an already-canonical date, an RFC 3339 timestamp, a naive ISO
/// datetime, or any string opening with an ISO date. Returns `None` for
/// anything else; the caller reports the failure and leaves the control
/// unset.
pub(crate) fn normalize_date(raw: &str) -> Option<String> {
    let raw = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date.format("%Y-%m-%d").to_string());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive().format("%Y-%m-%d").to_string());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date().format("%Y-%m-%d").to_string());
    }
    // ISO-like prefix, e.g. "2024-03-05 00:00:00"
    if let Some(prefix) = raw.get(..10) {
        if let Ok(date) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d") {
            return Some(date.format("%Y-%m-%d").to_string());
        }
    }

    None
}

/// Interpret boolean-like values: `true`/`false`/`1`/`0` and their string
/// forms. Anything else is left for value-attribute comparison.
pub(crate) fn parse_bool_like(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_date_passes_through() {
        assert_eq!(normalize_date("2024-03-05"), Some("2024-03-05".to_string()));
    }

    #[test]
    fn test_rfc3339_is_truncated_to_date() {
        assert_eq!(
            normalize_date("2024-03-05T00:00:00Z"),
            Some("2024-03-05".to_string())
        );
        assert_eq!(
            normalize_date("2024-03-05T10:30:00+02:00"),
            Some("2024-03-05".to_string())
        );
    }

    #[test]
    fn test_iso_like_prefix() {
        assert_eq!(
            normalize_date("2024-03-05 00:00:00"),
            Some("2024-03-05".to_string())
        );
        assert_eq!(
            normalize_date("2024-03-05T08:15:00"),
            Some("2024-03-05".to_string())
        );
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert_eq!(normalize_date("not-a-date"), None);
        assert_eq!(normalize_date("05/03/2024"), None);
        assert_eq!(normalize_date(""), None);
    }

    #[test]
    fn test_bool_like() {
        assert_eq!(parse_bool_like("true"), Some(true));
        assert_eq!(parse_bool_like("0"), Some(false));
        assert_eq!(parse_bool_like(" TRUE "), Some(true));
        assert_eq!(parse_bool_like("yes"), None);
    }
}
