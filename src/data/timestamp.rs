//! Timestamp normalization for display.
//!
//! The controller writes ISO-8601 timestamps on some paths and a
//! `DD/MM/YYYY, HH:MM:SS` layout on others. Both are shown as
//! `May 17, 2025, 2:30 PM`.

use std::fmt::Display;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};

/// Medium date style followed by short time style.
const DISPLAY_FORMAT: &str = "%b %-d, %Y, %-I:%M %p";

/// Format `raw` in the local time zone.
///
/// Absent input gives `"N/A"`; input that cannot be parsed is returned as is.
pub fn format_timestamp(raw: Option<&str>) -> String {
    format_timestamp_in(raw, &Local)
}

/// Format `raw` in the given time zone.
pub fn format_timestamp_in<Tz>(raw: Option<&str>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let Some(raw) = raw.filter(|r| !r.is_empty()) else {
        return "N/A".to_string();
    };
    match parse_timestamp(raw, tz) {
        Some(date) => date.format(DISPLAY_FORMAT).to_string(),
        None => raw.to_string(),
    }
}

/// Parse either supported layout. Day-first timestamps are read as local time
/// in `tz`.
pub fn parse_timestamp<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<DateTime<Tz>> {
    if raw.contains('T') {
        parse_iso(raw, tz)
    } else {
        parse_day_first(raw, tz)
    }
}

fn parse_iso<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<DateTime<Tz>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date.with_timezone(tz));
    }
    // Without an offset the time is local
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .ok()?;
    tz.from_local_datetime(&naive).earliest()
}

fn parse_day_first<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<DateTime<Tz>> {
    let mut parts = raw.split(", ");
    let mut date = parts.next()?.split('/');
    let day = parse_int(date.next()?)?;
    let month = parse_int(date.next()?)?;
    let year = parse_int(date.next()?)?;

    let (hour, minute, second) = match parts.next() {
        Some(time) => {
            let mut time = time.split(':');
            let hour = parse_int(time.next()?)?;
            let minute = parse_int(time.next()?)?;
            let second = match time.next() {
                Some(s) if !s.is_empty() => parse_int(s)?,
                _ => 0,
            };
            (hour, minute, second)
        }
        None => (0, 0, 0),
    };

    let date = NaiveDate::from_ymd_opt(
        i32::try_from(year).ok()?,
        u32::try_from(month).ok()?,
        u32::try_from(day).ok()?,
    )?;
    let naive = date.and_hms_opt(
        u32::try_from(hour).ok()?,
        u32::try_from(minute).ok()?,
        u32::try_from(second).ok()?,
    )?;
    tz.from_local_datetime(&naive).earliest()
}

/// Leading integer of `s`, after optional whitespace and sign.
fn parse_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(digits.len());
    let value: i64 = digits[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn test_absent_is_na() {
        assert_eq!(format_timestamp(None), "N/A");
        assert_eq!(format_timestamp(Some("")), "N/A");
    }

    #[test]
    fn test_iso_timestamp() {
        assert_eq!(
            format_timestamp_in(Some("2025-05-17T00:02:37.520Z"), &Utc),
            "May 17, 2025, 12:02 AM"
        );
        assert_eq!(
            format_timestamp_in(Some("2025-05-17T14:30:00Z"), &Utc),
            "May 17, 2025, 2:30 PM"
        );
    }

    #[test]
    fn test_both_layouts_normalize_identically() {
        assert_eq!(
            format_timestamp_in(Some("2025-05-17T00:02:37.520Z"), &Utc),
            format_timestamp_in(Some("17/05/2025, 00:02:38"), &Utc)
        );
    }

    #[test]
    fn test_day_first_is_local_time() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(
            format_timestamp_in(Some("17/05/2025, 09:05:00"), &tz),
            "May 17, 2025, 9:05 AM"
        );
        let parsed = parse_timestamp("17/05/2025, 09:05:00", &tz).unwrap();
        assert_eq!(parsed.with_timezone(&Utc).to_rfc3339(), "2025-05-17T07:05:00+00:00");
    }

    #[test]
    fn test_day_first_optional_parts() {
        assert_eq!(format_timestamp_in(Some("17/05/2025"), &Utc), "May 17, 2025, 12:00 AM");
        assert_eq!(
            format_timestamp_in(Some("1/2/2025, 13:07"), &Utc),
            "Feb 1, 2025, 1:07 PM"
        );
    }

    #[test]
    fn test_iso_without_offset_is_local() {
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        assert_eq!(
            format_timestamp_in(Some("2025-05-17T18:45:10"), &tz),
            "May 17, 2025, 6:45 PM"
        );
    }

    #[test]
    fn test_unparseable_passes_through() {
        for raw in ["garbage", "Tuesday", "32/13/2025, 00:00:00", "17/05", "ab/cd/efgh"] {
            assert_eq!(format_timestamp_in(Some(raw), &Utc), raw);
        }
        assert_eq!(format_timestamp(Some("not a date")), "not a date");
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int("05"), Some(5));
        assert_eq!(parse_int(" 17abc"), Some(17));
        assert_eq!(parse_int("-3"), Some(-3));
        assert_eq!(parse_int("x1"), None);
        assert_eq!(parse_int(""), None);
    }
}
