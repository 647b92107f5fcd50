// Copyright 2023 Marsh J. Ray
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Recognizes the YAML 1.1 `timestamp` scalar forms.

use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum Timestamp {
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
}

fn date_only_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([0-9]{4})-([0-9]{2})-([0-9]{2})$").expect("valid date regex")
    })
}

fn date_time_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"^([0-9]{4})-([0-9]{1,2})-([0-9]{1,2})",
            r"(?:[Tt]|[ \t]+)",
            r"([0-9]{1,2}):([0-9]{2}):([0-9]{2})",
            r"(?:\.([0-9]*))?",
            r"(?:[ \t]*(Z|([-+])([0-9]{1,2})(?::([0-9]{2}))?))?$",
        ))
        .expect("valid timestamp regex")
    })
}

/// Returns the timestamp `text` denotes, or `None` if it isn't one.
///
/// Shapes that match but name an impossible instant (e.g. `2001-02-30`) are
/// not timestamps. A date-time without a zone is taken as UTC.
pub fn resolve_timestamp(text: &str) -> Option<Timestamp> {
    if let Some(caps) = date_only_re().captures(text) {
        let date = NaiveDate::from_ymd_opt(
            caps[1].parse().ok()?,
            caps[2].parse().ok()?,
            caps[3].parse().ok()?,
        )?;
        return Some(Timestamp::Date(date));
    }

    let caps = date_time_re().captures(text)?;

    let date = NaiveDate::from_ymd_opt(
        caps[1].parse().ok()?,
        caps[2].parse().ok()?,
        caps[3].parse().ok()?,
    )?;

    let nanos = match caps.get(7) {
        Some(frac) => fraction_to_nanos(frac.as_str())?,
        None => 0,
    };
    let naive = date.and_hms_nano_opt(
        caps[4].parse().ok()?,
        caps[5].parse().ok()?,
        caps[6].parse().ok()?,
        nanos,
    )?;

    let offset_secs = match (caps.get(9), caps.get(10)) {
        (Some(sign), Some(hh)) => {
            let hh: i32 = hh.as_str().parse().ok()?;
            let mm: i32 = match caps.get(11) {
                Some(mm) => mm.as_str().parse().ok()?,
                None => 0,
            };
            let secs = hh * 3600 + mm * 60;
            if sign.as_str() == "-" {
                -secs
            } else {
                secs
            }
        }
        // "Z" or no zone at all
        _ => 0,
    };

    let offset = FixedOffset::east_opt(offset_secs)?;
    let date_time = offset.from_local_datetime(&naive).single()?;
    Some(Timestamp::DateTime(date_time.with_timezone(&Utc)))
}

/// Digits after the decimal point, truncated to nanosecond precision.
fn fraction_to_nanos(digits: &str) -> Option<u32> {
    let digits = &digits[..digits.len().min(9)];
    if digits.is_empty() {
        return Some(0);
    }
    let value: u32 = digits.parse().ok()?;
    Some(value * 10u32.pow(9 - digits.len() as u32))
}

#[cfg(test)]
mod test {
    use chrono::Timelike;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Timestamp {
        Timestamp::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    fn utc(text: &str) -> Timestamp {
        Timestamp::DateTime(DateTime::parse_from_rfc3339(text).unwrap().with_timezone(&Utc))
    }

    #[test]
    fn date_only() {
        assert_eq!(resolve_timestamp("2001-07-23"), Some(date(2001, 7, 23)));
        assert_eq!(resolve_timestamp("2002-12-14"), Some(date(2002, 12, 14)));
    }

    #[test]
    fn date_only_requires_two_digit_fields() {
        assert_eq!(resolve_timestamp("2001-7-23"), None);
        assert_eq!(resolve_timestamp("01-07-23"), None);
    }

    #[test]
    fn impossible_dates_are_not_timestamps() {
        assert_eq!(resolve_timestamp("2001-02-30"), None);
        assert_eq!(resolve_timestamp("2001-13-01"), None);
    }

    #[test]
    fn canonical_and_spaced_forms() {
        assert_eq!(
            resolve_timestamp("2001-12-15T02:59:43.1Z"),
            Some(utc("2001-12-15T02:59:43.100Z"))
        );
        assert_eq!(
            resolve_timestamp("2001-12-14t21:59:43.10-05:00"),
            Some(utc("2001-12-15T02:59:43.100Z"))
        );
        assert_eq!(
            resolve_timestamp("2001-12-14 21:59:43.10 -5"),
            Some(utc("2001-12-15T02:59:43.100Z"))
        );
        assert_eq!(
            resolve_timestamp("2001-12-15 2:59:43.10"),
            Some(utc("2001-12-15T02:59:43.100Z"))
        );
    }

    #[test]
    fn fraction_truncates_past_nanos() {
        let Some(Timestamp::DateTime(dt)) = resolve_timestamp("2001-01-01T00:00:00.1234567891Z")
        else {
            panic!("expected a date-time");
        };
        assert_eq!(dt.nanosecond(), 123_456_789);
    }

    #[test]
    fn non_timestamps() {
        for text in ["", "Detroit Tigers", "2001-07-23x", "2001-07-23T", "12:30:00", "20010723"] {
            assert_eq!(resolve_timestamp(text), None, "{text:?}");
        }
    }
}
