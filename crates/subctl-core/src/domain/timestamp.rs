//! ISO-8601 timestamp parsing.
//!
//! Producers are not consistent about offsets: some write RFC 3339 with a
//! zone, others write naive local wall-clock time. Naive values are read in
//! the local time zone.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
const NAIVE_MINUTE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"];
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Parse an ISO-8601 timestamp into UTC.
///
/// Accepts RFC 3339 (`2024-05-01T12:00:00Z`, `...+02:00`), compact offsets
/// (`...+0200`), naive date-times with `T` or space separator and optional
/// fractional seconds, and bare dates (midnight local time).
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("empty timestamp".to_string());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(raw, format) {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    let naive = NAIVE_FORMATS
        .iter()
        .chain(NAIVE_MINUTE_FORMATS.iter())
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| format!("not an ISO-8601 timestamp: {raw:?}"))?;

    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| format!("local time does not exist: {raw:?}"))
}

/// Serde adapter: RFC 3339 out, any [`parse_timestamp`] form in.
pub mod iso8601 {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_rfc3339_with_zone() {
        let dt = parse_timestamp("2024-05-01T12:30:45Z").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-05-01T12:30:45+00:00");

        let dt = parse_timestamp("2024-05-01T14:30:45+02:00").unwrap();
        assert_eq!(dt.hour(), 12);
    }

    #[test]
    fn test_compact_offset() {
        let dt = parse_timestamp("2024-05-01T14:30:45+0200").unwrap();
        assert_eq!(dt.hour(), 12);
        assert_eq!(dt.minute(), 30);
    }

    #[test]
    fn test_naive_forms_are_local_time() {
        let expected = Local
            .with_ymd_and_hms(2024, 5, 1, 12, 30, 45)
            .earliest()
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(parse_timestamp("2024-05-01T12:30:45").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-05-01 12:30:45").unwrap(), expected);

        let fractional = parse_timestamp("2024-05-01T12:30:45.123456").unwrap();
        assert_eq!(fractional.timestamp(), expected.timestamp());
        assert_eq!(fractional.timestamp_subsec_micros(), 123_456);
    }

    #[test]
    fn test_bare_date_is_local_midnight() {
        let dt = parse_timestamp("2024-05-01").unwrap().with_timezone(&Local);
        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 5, 1));
        assert_eq!((dt.hour(), dt.minute()), (0, 0));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(parse_timestamp("").is_err());
        assert!(parse_timestamp("yesterday").is_err());
        assert!(parse_timestamp("2024-13-01T00:00:00").is_err());
    }
}
