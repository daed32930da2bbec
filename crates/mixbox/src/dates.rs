//! Date and datetime parsing and serialization

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Timelike, Utc};

/// Naive datetime layouts accepted when a string carries no offset.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// The current time in UTC.
pub fn now() -> DateTime<FixedOffset> {
    Utc::now().fixed_offset()
}

/// Parse an ISO 8601 datetime. Strings without an offset are taken as UTC,
/// and a bare date is midnight UTC. `None` and unparseable input give `None`.
pub fn parse_datetime(value: Option<&str>) -> Option<DateTime<FixedOffset>> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt);
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc().fixed_offset());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Parse an ISO 8601 date. Full datetimes yield their date part.
pub fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    let raw = value?.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_datetime(Some(raw)).map(|dt| dt.date_naive()))
}

/// Serialize a date as `YYYY-MM-DD`.
pub fn serialize_date(value: &NaiveDate) -> String {
    value.format("%Y-%m-%d").to_string()
}

/// Serialize a datetime as ISO 8601, with microseconds only when non-zero
/// and the offset as `+HH:MM`.
pub fn serialize_datetime(value: &DateTime<FixedOffset>) -> String {
    if value.nanosecond() / 1_000 == 0 {
        value.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
    } else {
        value.format("%Y-%m-%dT%H:%M:%S%.6f%:z").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_datetime_round_trip() {
        let raw = "2015-04-02T16:44:30.423149+00:00";
        let parsed = parse_datetime(Some(raw)).unwrap();
        assert_eq!(serialize_datetime(&parsed), raw);
    }

    #[test]
    fn test_parse_datetime_without_offset_is_utc() {
        let parsed = parse_datetime(Some("2015-04-02T16:44:30")).unwrap();
        assert_eq!(serialize_datetime(&parsed), "2015-04-02T16:44:30+00:00");
    }

    #[test]
    fn test_parse_date_from_datetime() {
        let parsed = parse_date(Some("2015-04-02T16:44:30+00:00")).unwrap();
        assert_eq!(serialize_date(&parsed), "2015-04-02");
    }

    #[test]
    fn test_parse_garbage() {
        assert_eq!(parse_datetime(Some("not a date")), None);
        assert_eq!(parse_date(Some("")), None);
    }
}
