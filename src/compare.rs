//! Comparisons of two dates at year, month, day or second granularity.
//!
//! Each coarse comparison is built from the next-coarser one plus one more
//! field, so `same_year` never looks at the month or day. Second granularity
//! compares raw instants.

use crate::date_value::DateValue;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Granularity {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

impl Granularity {
    /// Granularity used for comparisons; anything finer than a day compares
    /// instants.
    pub fn coarsen(self) -> Granularity {
        match self {
            Granularity::Year | Granularity::Month | Granularity::Day => self,
            Granularity::Hour | Granularity::Minute | Granularity::Second => Granularity::Second,
        }
    }
}

pub fn same_year(a: &DateValue, b: &DateValue) -> bool {
    a.year() == b.year()
}

pub fn after_year(a: &DateValue, b: &DateValue) -> bool {
    a.year() > b.year()
}

pub fn before_year(a: &DateValue, b: &DateValue) -> bool {
    a.year() < b.year()
}

pub fn same_month(a: &DateValue, b: &DateValue) -> bool {
    same_year(a, b) && a.month() == b.month()
}

pub fn after_month(a: &DateValue, b: &DateValue) -> bool {
    after_year(a, b) || (same_year(a, b) && a.month() > b.month())
}

pub fn before_month(a: &DateValue, b: &DateValue) -> bool {
    before_year(a, b) || (same_year(a, b) && a.month() < b.month())
}

pub fn same_day(a: &DateValue, b: &DateValue) -> bool {
    same_month(a, b) && a.day() == b.day()
}

pub fn after_day(a: &DateValue, b: &DateValue) -> bool {
    after_month(a, b) || (same_month(a, b) && a.day() > b.day())
}

pub fn before_day(a: &DateValue, b: &DateValue) -> bool {
    before_month(a, b) || (same_month(a, b) && a.day() < b.day())
}

pub fn same_second(a: &DateValue, b: &DateValue) -> bool {
    a.timestamp_millis().div_euclid(1000) == b.timestamp_millis().div_euclid(1000)
}

pub fn after_second(a: &DateValue, b: &DateValue) -> bool {
    a.timestamp_millis().div_euclid(1000) > b.timestamp_millis().div_euclid(1000)
}

pub fn before_second(a: &DateValue, b: &DateValue) -> bool {
    a.timestamp_millis().div_euclid(1000) < b.timestamp_millis().div_euclid(1000)
}

pub fn is_same(a: &DateValue, b: &DateValue, granularity: Granularity) -> bool {
    match granularity.coarsen() {
        Granularity::Year => same_year(a, b),
        Granularity::Month => same_month(a, b),
        Granularity::Day => same_day(a, b),
        _ => same_second(a, b),
    }
}

pub fn is_after(a: &DateValue, b: &DateValue, granularity: Granularity) -> bool {
    match granularity.coarsen() {
        Granularity::Year => after_year(a, b),
        Granularity::Month => after_month(a, b),
        Granularity::Day => after_day(a, b),
        _ => after_second(a, b),
    }
}

pub fn is_before(a: &DateValue, b: &DateValue, granularity: Granularity) -> bool {
    match granularity.coarsen() {
        Granularity::Year => before_year(a, b),
        Granularity::Month => before_month(a, b),
        Granularity::Day => before_day(a, b),
        _ => before_second(a, b),
    }
}
