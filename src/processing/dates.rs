//! Date/time parsing and spreadsheet serial conversion.
//!
//! Parsing is best-effort over the shapes sign-up exports actually contain: ISO 8601 / RFC 3339,
//! RFC 2822, US month-first numeric dates, and spelled-out month names, each with an optional
//! time of day. Timestamps without an offset are taken as UTC.

use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use regex::Regex;

/// Timezone used for serial dates unless configured otherwise.
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::US::Eastern;

const MICROS_PER_DAY: f64 = 86_400_000_000.0;

static WEEKDAY_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(mon|tue|tues|wed|thu|thur|thurs|fri|sat|sun)[a-z]*\.?,?\s+")
        .expect("weekday regex")
});
static ORDINAL_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{1,2})(st|nd|rd|th)\b").expect("ordinal regex"));
static AT_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+at\s+").expect("at regex"));
// A bare `Z` only counts as UTC right after a digit; the digit is put back on replacement.
static UTC_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:\s+(?:utc|gmt)|(?P<digit>\d)z)$").expect("utc regex")
});
// Trailing zone abbreviation such as EST or PDT. Matched case-sensitively so "pm" is never
// taken for a zone; "AM"/"PM" are filtered in code.
static ZONE_ABBREVIATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+([A-Z]{2,5})$").expect("zone regex"));
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex"));

const AWARE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M%z",
    "%m/%d/%Y %H:%M:%S %z",
    "%m/%d/%Y %I:%M %p %z",
];

// Two-digit-year formats come first: `%Y` would otherwise accept "25" as year 25.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %I:%M %p",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%y %H:%M:%S",
    "%m/%d/%y %H:%M",
    "%m/%d/%y %I:%M:%S %p",
    "%m/%d/%y %I:%M %p",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%Y-%m-%d %I:%M:%S %p",
    "%b %d, %Y %I:%M %p",
    "%B %d, %Y %I:%M %p",
    "%b %d, %Y %I:%M:%S %p",
    "%B %d, %Y %I:%M:%S %p",
    "%b %d, %Y %H:%M",
    "%B %d, %Y %H:%M",
    "%b %d, %Y %H:%M:%S",
    "%B %d, %Y %H:%M:%S",
    "%b %d %Y %I:%M %p",
    "%B %d %Y %I:%M %p",
    "%b %d %Y %H:%M:%S",
    // asctime, once the weekday is gone: "Mar 10 14:30:00 2025"
    "%b %d %H:%M:%S %Y",
    "%d %b %Y %H:%M:%S",
    "%d %b %Y %H:%M",
    "%d-%b-%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%y",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%B %d %Y",
    "%d %b %Y",
    "%d %B %Y",
    "%d-%b-%Y",
    "%Y%m%d",
];

/// A parsed timestamp, with or without explicit offset information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedTimestamp {
    /// The text carried an explicit UTC offset.
    Aware(DateTime<FixedOffset>),
    /// No offset in the text.
    Naive(NaiveDateTime),
}

impl ParsedTimestamp {
    /// The instant in UTC. Naive timestamps are taken as already UTC.
    pub fn to_utc(self) -> DateTime<Utc> {
        match self {
            ParsedTimestamp::Aware(dt) => dt.with_timezone(&Utc),
            ParsedTimestamp::Naive(naive) => Utc.from_utc_datetime(&naive),
        }
    }
}

/// Parse a free-form timestamp. Returns `None` if no supported shape matches.
pub fn parse_timestamp(raw: &str) -> Option<ParsedTimestamp> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(ParsedTimestamp::Aware(dt));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(ParsedTimestamp::Aware(dt));
    }
    for fmt in AWARE_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(trimmed, fmt) {
            return Some(ParsedTimestamp::Aware(dt));
        }
    }

    let cleaned = clean_natural_text(trimmed);
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&cleaned, fmt) {
            return Some(ParsedTimestamp::Naive(dt));
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(&cleaned, fmt) {
            return Some(ParsedTimestamp::Naive(d.and_hms_opt(0, 0, 0)?));
        }
    }

    None
}

/// Strip the decorations that carry no information for parsing: a leading weekday, ordinal
/// suffixes, the word "at", a trailing UTC marker and a trailing zone abbreviation.
///
/// Zone abbreviations are ambiguous, so the time in front of one is kept as written and
/// treated like any other timestamp without an offset.
fn clean_natural_text(text: &str) -> String {
    let s = WEEKDAY_PREFIX.replace(text, "");
    let s = ORDINAL_SUFFIX.replace_all(&s, "$1");
    let s = AT_WORD.replace_all(&s, " ");
    let s = UTC_SUFFIX.replace(s.trim(), "${digit}");
    let s = strip_zone_abbreviation(&s);
    WHITESPACE.replace_all(s.trim(), " ").into_owned()
}

fn strip_zone_abbreviation(text: &str) -> &str {
    match ZONE_ABBREVIATION.captures(text) {
        Some(caps) if !matches!(&caps[1], "AM" | "PM") => {
            let start = caps.get(0).map_or(text.len(), |m| m.start());
            &text[..start]
        }
        _ => text,
    }
}

/// The spreadsheet epoch, 1899-12-30T00:00:00.
pub fn serial_epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// Days since the spreadsheet epoch for a wall-clock time; the fraction is the time of day.
pub fn serial_from_local(local: NaiveDateTime) -> f64 {
    let delta = local - serial_epoch();
    match delta.num_microseconds() {
        Some(micros) => micros as f64 / MICROS_PER_DAY,
        None => delta.num_seconds() as f64 / 86_400.0,
    }
}

/// Serial number of a UTC instant as seen on the wall clock in `tz`.
pub fn serial_from_utc(utc: DateTime<Utc>, tz: Tz) -> f64 {
    serial_from_local(utc.with_timezone(&tz).naive_local())
}

/// Parse `raw` and convert it to a serial in `tz`.
pub fn parse_to_serial(raw: &str, tz: Tz) -> Option<f64> {
    parse_timestamp(raw).map(|ts| serial_from_utc(ts.to_utc(), tz))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    fn serial(raw: &str) -> f64 {
        parse_to_serial(raw, DEFAULT_TIMEZONE).unwrap_or_else(|| panic!("failed to parse {raw:?}"))
    }

    #[test]
    fn epoch_is_day_zero() {
        assert_close(serial_from_local(serial_epoch()), 0.0);
        let d = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap().and_hms_opt(12, 0, 0).unwrap();
        assert_close(serial_from_local(d), 2.5);
    }

    #[test]
    fn naive_timestamp_is_treated_as_utc_then_shifted_to_eastern() {
        // 14:30 UTC on 2025-03-10 is 10:30 EDT.
        assert_close(serial("2025-03-10 14:30:00"), 45726.4375);
    }

    #[test]
    fn explicit_utc_marker() {
        // 17:00 UTC in January is noon EST.
        assert_close(serial("2025-01-15T17:00:00Z"), 45672.5);
        assert_close(serial("2025-01-15 17:00:00 UTC"), 45672.5);
    }

    #[test]
    fn explicit_offset_is_converted_through_utc() {
        // 08:00-07:00 is 15:00 UTC, 11:00 EDT.
        assert_close(serial("2025-07-04T08:00:00-07:00"), 45842.0 + 11.0 / 24.0);
    }

    #[test]
    fn date_only_midnight_utc_lands_on_previous_eastern_day() {
        let s = serial("2025-11-02");
        assert_eq!(s.floor() as i64, 45962);
        assert_close(s, 45962.0 + 20.0 / 24.0);
    }

    #[test]
    fn us_twelve_hour_format() {
        assert_close(serial("09/14/2025 06:00 PM"), 45914.0 + 14.0 / 24.0);
        assert_close(serial("9/14/25 6:00 PM"), 45914.0 + 14.0 / 24.0);
    }

    #[test]
    fn natural_language_decorations_are_ignored() {
        assert_close(serial("Sunday, September 14th, 2025 at 6:00 PM"), 45914.0 + 14.0 / 24.0);
        assert_close(serial("Sep 14, 2025"), 45913.0 + 20.0 / 24.0);
    }

    #[test]
    fn month_name_with_seconds() {
        assert_close(serial("Mar 10, 2025 14:30:00"), 45726.4375);
    }

    #[test]
    fn twelve_hour_with_seconds_after_month_name() {
        assert_close(serial("March 10, 2025 2:30:00 PM"), 45726.4375);
    }

    #[test]
    fn twelve_hour_with_seconds_after_iso_date() {
        assert_close(serial("2025-03-10 2:30:00 PM"), 45726.4375);
    }

    #[test]
    fn asctime_shape() {
        assert_close(serial("Mon Mar 10 14:30:00 2025"), 45726.4375);
    }

    #[test]
    fn trailing_zone_abbreviation_is_ignored() {
        assert_close(serial("2025-03-10 14:30:00 EST"), 45726.4375);
        assert_close(serial("Mar 10, 2025 2:30 PM PDT"), 45726.4375);
        // The meridiem is not mistaken for a zone.
        assert_close(serial("2025-03-10 2:30 PM"), 45726.4375);
    }

    #[test]
    fn trailing_z_is_only_stripped_after_a_digit() {
        assert_eq!(clean_natural_text("2025-03-10T14:30Z"), "2025-03-10T14:30");
        assert_eq!(clean_natural_text("Quiz"), "Quiz");
        assert_eq!(clean_natural_text("Jazz night"), "Jazz night");
        assert_eq!(clean_natural_text("2025-01-15 17:00:00 UTC"), "2025-01-15 17:00:00");
        assert_close(serial("2025-03-10T14:30Z"), 45726.4375);
    }

    #[test]
    fn unparseable_text_yields_none() {
        for raw in ["", "   ", "TBD", "next tuesday-ish", "13/45/2025"] {
            assert_eq!(parse_timestamp(raw), None, "input {raw:?}");
        }
    }
}
