use thiserror::Error;

/// Contradictory or malformed picker configuration. Raised at construction,
/// no picker is created.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("format `{0}` contains no date or time component")]
    EmptyFormat(String),
    #[error("format `{0}` has a day of month but no month")]
    DayWithoutMonth(String),
    #[error("format `{0}` has a month but no year")]
    MonthWithoutYear(String),
    #[error("format `{0}` has minutes but no hours")]
    MinutesWithoutHours(String),
    #[error("format `{0}` has a year and hours but no day of month")]
    HoursWithoutDate(String),
    #[error("multi-date selection cannot be combined with time format `{0}`")]
    MultiDateWithTime(String),
    #[error("minute stepping must be at least 1")]
    ZeroStepping,
    #[error("min date {min} is after max date {max}")]
    InvertedBounds { min: String, max: String },
    #[error("invalid locale `{0}`")]
    InvalidLocale(String),
    #[error("unknown time zone `{0}`")]
    InvalidTimeZone(String),
    #[error("cannot interpret {0} bound")]
    InvalidBound(&'static str),
}

/// Text did not match a pattern. Never escapes the parsing boundary of the
/// picker; surfaces only from [`crate::DateValue::from_format`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("expected `{expected}` at offset {offset}")]
    Mismatch { expected: String, offset: usize },
    #[error("expected digits for {field} at offset {offset}")]
    ExpectedDigits { field: &'static str, offset: usize },
    #[error("unknown {field} name at offset {offset}")]
    UnknownName { field: &'static str, offset: usize },
    #[error("trailing input at offset {0}")]
    TrailingInput(usize),
    #[error("{0} out of range")]
    OutOfRange(&'static str),
    #[error("no such calendar date {year:04}-{month:02}-{day:02}")]
    InvalidDate { year: i32, month: u32, day: u32 },
    #[error("local time does not exist in zone {0}")]
    NonexistentLocalTime(String),
}
