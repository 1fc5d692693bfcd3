//! Immutable point in time bound to a time zone and locale.
//!
//! Every mutator returns a new value; nothing here changes `self`.

use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use chrono::{
    DateTime, Datelike, Days, Duration, Months, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc,
};
use chrono_tz::Tz;

use crate::error::{ConfigError, PatternError};
use crate::pattern;

pub const DEFAULT_LOCALE: &str = "en-US";

/// Calendar or clock unit used for arithmetic and start/end-of.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Unit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

/// Resolve a zone name, falling back to the host zone and then UTC.
pub fn resolve_zone(name: Option<&str>) -> Result<Tz, ConfigError> {
    match name {
        Some(name) => name
            .parse::<Tz>()
            .map_err(|_| ConfigError::InvalidTimeZone(name.to_string())),
        None => {
            let host = iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string());
            Ok(host.parse::<Tz>().unwrap_or(Tz::UTC))
        }
    }
}

/// Map a local wall-clock time onto `zone`. Ambiguous times take the earlier
/// instant; times inside a DST gap move forward one hour.
pub(crate) fn localize(zone: Tz, naive: &NaiveDateTime) -> Option<DateTime<Tz>> {
    zone.from_local_datetime(naive).earliest().or_else(|| {
        let shifted = naive.checked_add_signed(Duration::hours(1))?;
        zone.from_local_datetime(&shifted).earliest()
    })
}

#[derive(Clone)]
pub struct DateValue {
    dt: DateTime<Tz>,
    locale: Rc<str>,
}

impl DateValue {
    pub fn new(dt: DateTime<Tz>, locale: &str) -> Self {
        Self {
            dt,
            locale: Rc::from(locale),
        }
    }

    pub fn now(zone: Tz, locale: &str) -> Self {
        Self::new(Utc::now().with_timezone(&zone), locale)
    }

    pub fn from_timestamp_millis(ms: i64, zone: Tz, locale: &str) -> Option<Self> {
        let utc = DateTime::<Utc>::from_timestamp_millis(ms)?;
        Some(Self::new(utc.with_timezone(&zone), locale))
    }

    pub fn from_naive(naive: &NaiveDateTime, zone: Tz, locale: &str) -> Option<Self> {
        localize(zone, naive).map(|dt| Self::new(dt, locale))
    }

    /// Build from `[year, month, day, hour, minute, second]`; trailing
    /// entries may be omitted. Months are 1-based.
    pub fn from_fields(fields: &[i64], zone: Tz, locale: &str) -> Option<Self> {
        let (&year, rest) = fields.split_first()?;
        let get = |idx: usize, default: i64| -> Option<u32> {
            u32::try_from(rest.get(idx).copied().unwrap_or(default)).ok()
        };
        let date = NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, get(0, 1)?, get(1, 1)?)?;
        let naive = date.and_hms_opt(get(2, 0)?, get(3, 0)?, get(4, 0)?)?;
        Self::from_naive(&naive, zone, locale)
    }

    /// Parse `text` against `pattern`, filling missing coarse units from now.
    pub fn from_format(
        pattern: &str,
        text: &str,
        zone: Tz,
        locale: &str,
    ) -> Result<Self, PatternError> {
        let reference = Self::now(zone, locale);
        Self::from_format_at(pattern, text, &reference)
    }

    /// Parse `text` against `pattern`; missing coarse units come from
    /// `reference`, which also supplies zone and locale.
    pub fn from_format_at(
        pattern: &str,
        text: &str,
        reference: &DateValue,
    ) -> Result<Self, PatternError> {
        let tokens = pattern::tokenize(pattern);
        let fields = pattern::parse_tokens(&tokens, text)?;
        let naive = fields.resolve(&reference.naive_local())?;
        let zone = reference.zone();
        // Exact wall-clock match only; DST-gap times do not parse.
        let dt = zone
            .from_local_datetime(&naive)
            .earliest()
            .ok_or_else(|| PatternError::NonexistentLocalTime(zone.name().to_string()))?;
        Ok(Self {
            dt,
            locale: reference.locale.clone(),
        })
    }

    pub fn format(&self, pattern: &str) -> String {
        pattern::format_tokens(&pattern::tokenize(pattern), &self.naive_local())
    }

    /// Same instant, carried into another zone and locale.
    pub fn rebase(&self, zone: Tz, locale: &str) -> Self {
        Self::new(self.dt.with_timezone(&zone), locale)
    }

    pub fn datetime(&self) -> DateTime<Tz> {
        self.dt
    }

    pub fn naive_local(&self) -> NaiveDateTime {
        self.dt.naive_local()
    }

    pub fn zone(&self) -> Tz {
        self.dt.timezone()
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn timestamp_millis(&self) -> i64 {
        self.dt.timestamp_millis()
    }

    pub fn year(&self) -> i32 {
        self.dt.year()
    }

    /// 1-based.
    pub fn month(&self) -> u32 {
        self.dt.month()
    }

    pub fn day(&self) -> u32 {
        self.dt.day()
    }

    pub fn hour(&self) -> u32 {
        self.dt.hour()
    }

    pub fn minute(&self) -> u32 {
        self.dt.minute()
    }

    pub fn second(&self) -> u32 {
        self.dt.second()
    }

    pub fn weekday(&self) -> chrono::Weekday {
        self.dt.weekday()
    }

    fn with_naive(&self, naive: NaiveDateTime) -> Option<Self> {
        localize(self.zone(), &naive).map(|dt| Self {
            dt,
            locale: self.locale.clone(),
        })
    }

    fn with_date(&self, year: i32, month: u32, day: u32) -> Option<Self> {
        let last = days_in_month(year, month)?;
        let date = NaiveDate::from_ymd_opt(year, month, day.min(last))?;
        self.with_naive(date.and_time(self.naive_local().time()))
    }

    /// Day of month is clamped to the target month's length.
    pub fn with_year(&self, year: i32) -> Option<Self> {
        self.with_date(year, self.month(), self.day())
    }

    /// Day of month is clamped to the target month's length.
    pub fn with_month(&self, month: u32) -> Option<Self> {
        self.with_date(self.year(), month, self.day())
    }

    pub fn with_day(&self, day: u32) -> Option<Self> {
        let date = self.naive_local().date().with_day(day)?;
        self.with_naive(date.and_time(self.naive_local().time()))
    }

    pub fn with_hour(&self, hour: u32) -> Option<Self> {
        self.with_naive(self.naive_local().with_hour(hour)?)
    }

    pub fn with_minute(&self, minute: u32) -> Option<Self> {
        self.with_naive(self.naive_local().with_minute(minute)?)
    }

    pub fn with_second(&self, second: u32) -> Option<Self> {
        let naive = self.naive_local().with_second(second)?.with_nanosecond(0)?;
        self.with_naive(naive)
    }

    /// Copy year, month and day from `other`, keeping this value's time of day.
    pub fn with_date_of(&self, other: &DateValue) -> Option<Self> {
        let date = other.naive_local().date();
        self.with_naive(date.and_time(self.naive_local().time()))
    }

    /// Calendar units move the wall clock, clock units move the instant.
    /// Overflow leaves the value unchanged.
    pub fn add(&self, unit: Unit, amount: i64) -> Self {
        let moved = match unit {
            Unit::Second => self.shift(Duration::try_seconds(amount)),
            Unit::Minute => self.shift(Duration::try_minutes(amount)),
            Unit::Hour => self.shift(Duration::try_hours(amount)),
            Unit::Day => self.shift_days(amount),
            Unit::Week => amount.checked_mul(7).and_then(|days| self.shift_days(days)),
            Unit::Month => self.shift_months(amount),
            Unit::Year => amount.checked_mul(12).and_then(|months| self.shift_months(months)),
        };
        moved.unwrap_or_else(|| self.clone())
    }

    pub fn sub(&self, unit: Unit, amount: i64) -> Self {
        self.add(unit, -amount)
    }

    fn shift(&self, delta: Option<Duration>) -> Option<Self> {
        let dt = self.dt.checked_add_signed(delta?)?;
        Some(Self {
            dt,
            locale: self.locale.clone(),
        })
    }

    fn shift_days(&self, days: i64) -> Option<Self> {
        let naive = self.naive_local();
        let magnitude = Days::new(days.unsigned_abs());
        let moved = if days >= 0 {
            naive.checked_add_days(magnitude)?
        } else {
            naive.checked_sub_days(magnitude)?
        };
        self.with_naive(moved)
    }

    fn shift_months(&self, months: i64) -> Option<Self> {
        let naive = self.naive_local();
        let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
        let moved = if months >= 0 {
            naive.checked_add_months(magnitude)?
        } else {
            naive.checked_sub_months(magnitude)?
        };
        self.with_naive(moved)
    }

    /// Weeks start on Monday.
    pub fn start_of(&self, unit: Unit) -> Self {
        let naive = self.naive_local();
        let date = naive.date();
        let start = match unit {
            Unit::Second => naive.with_nanosecond(0),
            Unit::Minute => naive.with_second(0).and_then(|n| n.with_nanosecond(0)),
            Unit::Hour => date.and_hms_opt(naive.hour(), 0, 0),
            Unit::Day => date.and_hms_opt(0, 0, 0),
            Unit::Week => date
                .checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_monday())))
                .and_then(|d| d.and_hms_opt(0, 0, 0)),
            Unit::Month => date.with_day(1).and_then(|d| d.and_hms_opt(0, 0, 0)),
            Unit::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0)),
        };
        start
            .and_then(|n| self.with_naive(n))
            .unwrap_or_else(|| self.clone())
    }

    /// Last millisecond of the unit.
    pub fn end_of(&self, unit: Unit) -> Self {
        self.start_of(unit)
            .add(unit, 1)
            .shift(Some(Duration::milliseconds(-1)))
            .unwrap_or_else(|| self.clone())
    }
}

pub(crate) fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = first.checked_add_months(Months::new(1))?;
    u32::try_from(next.signed_duration_since(first).num_days()).ok()
}

impl PartialEq for DateValue {
    fn eq(&self, other: &Self) -> bool {
        self.dt == other.dt
    }
}

impl Eq for DateValue {}

impl PartialOrd for DateValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DateValue {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dt.cmp(&other.dt)
    }
}

impl fmt::Debug for DateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DateValue({self} {})", self.locale)
    }
}

impl fmt::Display for DateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.dt.format("%Y-%m-%dT%H:%M:%S%:z"), self.zone().name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn berlin(fields: &[i64]) -> DateValue {
        DateValue::from_fields(fields, Tz::Europe__Berlin, "de-DE").unwrap()
    }

    #[test]
    fn fields_round_trip() {
        let d = berlin(&[2024, 2, 29, 13, 5, 9]);
        assert_eq!(
            (d.year(), d.month(), d.day(), d.hour(), d.minute(), d.second()),
            (2024, 2, 29, 13, 5, 9)
        );
        assert!(DateValue::from_fields(&[2023, 2, 29], Tz::UTC, "en-US").is_none());
        assert!(DateValue::from_fields(&[], Tz::UTC, "en-US").is_none());
    }

    #[test]
    fn month_arithmetic_clamps_day() {
        let d = berlin(&[2024, 1, 31, 10, 0]);
        assert_eq!(d.add(Unit::Month, 1), berlin(&[2024, 2, 29, 10, 0]));
        assert_eq!(d.sub(Unit::Year, 1), berlin(&[2023, 1, 31, 10, 0]));
        assert_eq!(d.with_month(4).unwrap(), berlin(&[2024, 4, 30, 10, 0]));
    }

    #[test]
    fn day_arithmetic_keeps_wall_clock_across_dst() {
        let before = berlin(&[2024, 3, 30, 12, 0]);
        let after = before.add(Unit::Day, 1);
        assert_eq!((after.day(), after.hour()), (31, 12));
        assert_eq!(after.timestamp_millis() - before.timestamp_millis(), 23 * 3_600_000);
    }

    #[test]
    fn start_and_end_of_units() {
        let d = berlin(&[2024, 5, 15, 13, 44, 10]);
        assert_eq!(d.start_of(Unit::Month), berlin(&[2024, 5, 1]));
        assert_eq!(d.start_of(Unit::Week), berlin(&[2024, 5, 13]));
        assert_eq!(d.start_of(Unit::Year), berlin(&[2024, 1, 1]));
        let end = d.end_of(Unit::Day);
        assert_eq!((end.hour(), end.minute(), end.second()), (23, 59, 59));
        assert_eq!(end.timestamp_millis() + 1, berlin(&[2024, 5, 16]).timestamp_millis());
    }

    #[test]
    fn format_and_parse() {
        let d = berlin(&[2024, 1, 5, 9, 30]);
        assert_eq!(d.format("dd.MM.yyyy, HH:mm"), "05.01.2024, 09:30");
        let parsed = DateValue::from_format_at("dd.MM.yyyy, HH:mm", "05.01.2024, 09:30", &d).unwrap();
        assert_eq!(parsed, d);
        assert!(DateValue::from_format_at("yyyy-MM-dd", "2024-02-30", &d).is_err());
    }

    #[test]
    fn parse_rejects_dst_gap() {
        let reference = berlin(&[2024, 1, 1]);
        let result = DateValue::from_format_at("yyyy-MM-dd HH:mm", "2024-03-31 02:30", &reference);
        assert!(matches!(result, Err(PatternError::NonexistentLocalTime(_))));
    }

    #[test]
    fn rebase_keeps_instant() {
        let d = berlin(&[2024, 7, 1, 12, 0]);
        let utc = d.rebase(Tz::UTC, "en-GB");
        assert_eq!(utc, d);
        assert_eq!(utc.hour(), 10);
        assert_eq!(utc.locale(), "en-GB");
    }

    #[test]
    fn zone_resolution() {
        assert_eq!(resolve_zone(Some("Europe/Berlin")).unwrap(), Tz::Europe__Berlin);
        assert!(matches!(
            resolve_zone(Some("Mars/Olympus")),
            Err(ConfigError::InvalidTimeZone(_))
        ));
        assert!(resolve_zone(None).is_ok());
    }
}
