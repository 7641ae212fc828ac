//! Minute-precision due times.
//!
//! Users type `DD/MM/YYYY HH:MM`; the table stores `YYYY-MM-DDTHH:MM:00`; the
//! engine compares against the local clock truncated to the minute. All three
//! go through [`DueAt`] so they can never disagree on granularity.

use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Format shown to users and accepted by [`DueAt::parse`].
pub const DISPLAY_FORMAT: &str = "%d/%m/%Y %H:%M";
/// Format of the `reminders.due_at` column. Lexicographic order is chronological.
pub const STORAGE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A local date and time with seconds and sub-seconds always zero.
///
/// Deserialization goes through [`DueAt::truncate`], so a serialized value
/// with seconds comes back on the whole minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "NaiveDateTime", into = "NaiveDateTime")]
pub struct DueAt(NaiveDateTime);

impl DueAt {
    /// Parse `DD/MM/YYYY HH:MM` (surrounding whitespace ignored).
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let mut parts = raw.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some(date), Some(time), None) => Self::parse_parts(date, time),
            _ => Err(ValidationError::MalformedDueAt {
                input: raw.to_string(),
            }),
        }
    }

    /// Parse an already split `DD/MM/YYYY` date and `HH:MM` time.
    pub fn parse_parts(date: &str, time: &str) -> Result<Self, ValidationError> {
        let input = format!("{date} {time}");

        let date_fields = numeric_fields(date, '/', &[(1, 2), (1, 2), (4, 4)]);
        let time_fields = numeric_fields(time, ':', &[(1, 2), (2, 2)]);
        let (Some(d), Some(t)) = (date_fields, time_fields) else {
            return Err(ValidationError::MalformedDueAt { input });
        };

        let date = NaiveDate::from_ymd_opt(d[2] as i32, d[1], d[0]);
        let time = NaiveTime::from_hms_opt(t[0], t[1], 0);
        match (date, time) {
            (Some(date), Some(time)) => Ok(Self(NaiveDateTime::new(date, time))),
            _ => Err(ValidationError::ImpossibleDueAt { input }),
        }
    }

    /// Drop seconds and sub-seconds.
    pub fn truncate(dt: NaiveDateTime) -> Self {
        Self(
            dt.with_second(0)
                .and_then(|d| d.with_nanosecond(0))
                .unwrap_or(dt),
        )
    }

    /// The current local wall-clock time, truncated to the minute.
    pub fn now_local() -> Self {
        Self::truncate(Local::now().naive_local())
    }

    pub fn as_naive(&self) -> NaiveDateTime {
        self.0
    }

    pub fn to_storage(&self) -> String {
        self.0.format(STORAGE_FORMAT).to_string()
    }

    /// Inverse of [`DueAt::to_storage`]. `None` for anything else.
    pub fn from_storage(s: &str) -> Option<Self> {
        NaiveDateTime::parse_from_str(s, STORAGE_FORMAT)
            .ok()
            .map(Self::truncate)
    }
}

impl fmt::Display for DueAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DISPLAY_FORMAT))
    }
}

impl FromStr for DueAt {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<NaiveDateTime> for DueAt {
    fn from(dt: NaiveDateTime) -> Self {
        Self::truncate(dt)
    }
}

impl From<DueAt> for NaiveDateTime {
    fn from(due: DueAt) -> Self {
        due.0
    }
}

/// Split `s` on `sep` into exactly `widths.len()` all-digit fields, each with
/// a length inside its `(min, max)` bounds.
fn numeric_fields(s: &str, sep: char, widths: &[(usize, usize)]) -> Option<Vec<u32>> {
    let fields: Vec<&str> = s.split(sep).collect();
    if fields.len() != widths.len() {
        return None;
    }
    fields
        .iter()
        .zip(widths)
        .map(|(field, &(min, max))| {
            let ok = (min..=max).contains(&field.len()) && field.bytes().all(|b| b.is_ascii_digit());
            if ok {
                field.parse().ok()
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    #[test]
    fn parses_canonical_input() {
        let due = DueAt::parse("09/01/2026 12:00").unwrap();
        assert_eq!(due.as_naive(), at(2026, 1, 9, 12, 0));
    }

    #[test]
    fn display_round_trips() {
        for raw in ["09/01/2026 12:00", "31/12/2025 23:59", "29/02/2028 00:00", "01/07/2030 07:05"] {
            let due = DueAt::parse(raw).unwrap();
            assert_eq!(due.to_string(), raw);
            assert_eq!(DueAt::parse(&due.to_string()).unwrap(), due);
        }
    }

    #[test]
    fn single_digit_fields_normalize() {
        let due = DueAt::parse("9/1/2026 7:30").unwrap();
        assert_eq!(due.to_string(), "09/01/2026 07:30");
        assert_eq!(due, DueAt::parse("09/01/2026 07:30").unwrap());
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let due = DueAt::parse("  09/01/2026   12:00 ").unwrap();
        assert_eq!(due.as_naive(), at(2026, 1, 9, 12, 0));
    }

    #[test]
    fn wrong_shape_is_malformed() {
        for raw in [
            "09-01-2026 1200",
            "09/01/2026",
            "12:00",
            "",
            "09/01/26 12:00",
            "09/01/2026 12:0",
            "09/01/2026 12:00 extra",
            "aa/01/2026 12:00",
            "09/01/2026T12:00",
            "+9/01/2026 12:00",
        ] {
            assert!(
                matches!(DueAt::parse(raw), Err(ValidationError::MalformedDueAt { .. })),
                "{raw:?} should be malformed"
            );
        }
    }

    #[test]
    fn impossible_calendar_values_are_rejected() {
        for raw in ["31/02/2026 12:00", "29/02/2026 12:00", "00/01/2026 12:00", "09/13/2026 12:00", "09/01/2026 24:00", "09/01/2026 12:60"] {
            assert!(
                matches!(DueAt::parse(raw), Err(ValidationError::ImpossibleDueAt { .. })),
                "{raw:?} should be impossible"
            );
        }
    }

    #[test]
    fn storage_format_round_trips_and_sorts() {
        let a = DueAt::parse("09/01/2026 12:00").unwrap();
        let b = DueAt::parse("10/01/2025 13:00").unwrap();
        assert_eq!(a.to_storage(), "2026-01-09T12:00:00");
        assert_eq!(DueAt::from_storage(&a.to_storage()), Some(a));
        assert!(b.to_storage() < a.to_storage());
        assert!(b < a);
    }

    #[test]
    fn from_storage_rejects_garbage() {
        assert_eq!(DueAt::from_storage("not a date"), None);
        assert_eq!(DueAt::from_storage("09/01/2026 12:00"), None);
    }

    #[test]
    fn truncate_drops_seconds() {
        let dt = at(2026, 1, 9, 12, 0) + chrono::Duration::seconds(59) + chrono::Duration::milliseconds(250);
        assert_eq!(DueAt::truncate(dt).as_naive(), at(2026, 1, 9, 12, 0));
    }

    #[test]
    fn now_local_has_no_seconds() {
        let now = DueAt::now_local().as_naive();
        assert_eq!(now.second(), 0);
        assert_eq!(now.nanosecond(), 0);
    }

    #[test]
    fn deserialized_value_lands_on_the_minute() {
        use serde::de::value::{Error, StrDeserializer};
        use serde::de::IntoDeserializer;

        let de: StrDeserializer<'_, Error> = "2026-01-09T12:00:59.250".into_deserializer();
        let due = DueAt::deserialize(de).unwrap();
        assert_eq!(due.as_naive(), at(2026, 1, 9, 12, 0));
    }
}
