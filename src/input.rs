use std::sync::LazyLock;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use regex::Regex;

use crate::date_value::DateValue;

/// Anything the picker can coerce into a date.
#[derive(Clone, Debug, Default)]
pub enum DateInput {
    #[default]
    Empty,
    Value(DateValue),
    Text(String),
    Native(DateTime<Utc>),
    Naive(NaiveDateTime),
    /// Milliseconds since the Unix epoch.
    Timestamp(i64),
    /// `[year, month, day, hour, minute, second]`, trailing entries optional.
    Fields(Vec<i64>),
}

impl From<DateValue> for DateInput {
    fn from(value: DateValue) -> Self {
        DateInput::Value(value)
    }
}

impl From<&DateValue> for DateInput {
    fn from(value: &DateValue) -> Self {
        DateInput::Value(value.clone())
    }
}

impl From<&str> for DateInput {
    fn from(text: &str) -> Self {
        DateInput::Text(text.to_string())
    }
}

impl From<String> for DateInput {
    fn from(text: String) -> Self {
        DateInput::Text(text)
    }
}

impl From<DateTime<Utc>> for DateInput {
    fn from(dt: DateTime<Utc>) -> Self {
        DateInput::Native(dt)
    }
}

impl From<NaiveDateTime> for DateInput {
    fn from(naive: NaiveDateTime) -> Self {
        DateInput::Naive(naive)
    }
}

impl From<NaiveDate> for DateInput {
    fn from(date: NaiveDate) -> Self {
        DateInput::Naive(date.and_time(chrono::NaiveTime::MIN))
    }
}

impl From<SystemTime> for DateInput {
    fn from(time: SystemTime) -> Self {
        match time.duration_since(UNIX_EPOCH) {
            Ok(d) => DateInput::Timestamp(i64::try_from(d.as_millis()).unwrap_or(i64::MAX)),
            Err(e) => DateInput::Timestamp(-i64::try_from(e.duration().as_millis()).unwrap_or(i64::MAX)),
        }
    }
}

impl From<i64> for DateInput {
    fn from(ms: i64) -> Self {
        DateInput::Timestamp(ms)
    }
}

impl From<Vec<i64>> for DateInput {
    fn from(fields: Vec<i64>) -> Self {
        DateInput::Fields(fields)
    }
}

impl<T: Into<DateInput>> From<Option<T>> for DateInput {
    fn from(value: Option<T>) -> Self {
        value.map_or(DateInput::Empty, Into::into)
    }
}

static ISO_LIKE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})(?:[T ](\d{1,2}):(\d{2})(?::(\d{2}))?)?$")
        .expect("static pattern")
});

/// Lenient fallback used when text matches none of the picker's patterns:
/// RFC 3339, RFC 2822, then a bare `yyyy-M-d[ H:mm[:ss]]` wall-clock time.
pub fn parse_generic(text: &str, zone: Tz, locale: &str) -> Option<DateValue> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(DateValue::new(dt.with_timezone(&zone), locale));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(DateValue::new(dt.with_timezone(&zone), locale));
    }
    let caps = ISO_LIKE.captures(text)?;
    let fields: Vec<i64> = caps
        .iter()
        .skip(1)
        .map_while(|m| m.and_then(|m| m.as_str().parse().ok()))
        .collect();
    DateValue::from_fields(&fields, zone, locale)
}
