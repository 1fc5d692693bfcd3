//! Render model for the calendar and clock grids.
//!
//! Pure functions of picker state; nothing here mutates the picker.

use chrono::Weekday;

use crate::compare::{self, Granularity};
use crate::date_value::{DateValue, Unit};
use crate::locale;
use crate::pattern::month_name_short;
use crate::picker::{BoundInput, Picker};

/// Cells per row in the month and year grids.
pub const GRID_COLUMNS: u32 = 3;

pub const DAY_CELLS: usize = 42;

/// First year of the decade block containing `year`.
pub fn decade_start(year: i32) -> i32 {
    year - year.rem_euclid(10)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DayCell {
    pub date: DateValue,
    pub selected: bool,
    pub disabled: bool,
    pub today: bool,
    /// Leading or trailing day of a neighbouring month.
    pub other_month: bool,
    pub weekend: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonthCell {
    pub date: DateValue,
    pub label: &'static str,
    pub selected: bool,
    pub disabled: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct YearCell {
    pub date: DateValue,
    pub selected: bool,
    pub disabled: bool,
    /// Last year of the previous decade or first of the next.
    pub other_decade: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeCell {
    pub date: DateValue,
    pub value: u32,
    pub selected: bool,
    pub disabled: bool,
}

fn is_selected<B: BoundInput>(
    picker: &Picker<B>,
    cell: &DateValue,
    same: fn(&DateValue, &DateValue) -> bool,
) -> bool {
    if picker.is_multi() {
        picker.dates().iter().any(|date| same(date, cell))
    } else {
        picker.date().is_some_and(|date| same(date, cell))
    }
}

/// Weekday labels in grid column order.
pub fn weekday_header(locale: &str) -> Vec<Weekday> {
    let first = locale::first_weekday(locale);
    std::iter::successors(Some(first), |day| Some(day.succ()))
        .take(7)
        .collect()
}

/// Six weeks starting on the locale's first weekday on or before the first
/// of the view month.
pub fn day_grid<B: BoundInput>(picker: &Picker<B>) -> Vec<DayCell> {
    let view = picker.view_date();
    let first = view.start_of(Unit::Month);
    let first_weekday = locale::first_weekday(picker.locale());
    let lead = (first.weekday().num_days_from_monday() + 7 - first_weekday.num_days_from_monday()) % 7;
    let start = first.sub(Unit::Day, i64::from(lead));
    let weekend = locale::weekend(picker.locale());
    let today = picker.now();

    (0..DAY_CELLS as i64)
        .map(|offset| {
            let date = start.add(Unit::Day, offset);
            DayCell {
                selected: is_selected(picker, &date, compare::same_day),
                disabled: !picker.is_valid(&date, Granularity::Day),
                today: compare::same_day(&date, &today),
                other_month: !compare::same_month(&date, view),
                weekend: weekend.contains(&date.weekday()),
                date,
            }
        })
        .collect()
}

pub fn month_grid<B: BoundInput>(picker: &Picker<B>) -> Vec<MonthCell> {
    let start = picker.view_date().start_of(Unit::Year);
    (0..12)
        .map(|offset| {
            let date = start.add(Unit::Month, offset);
            MonthCell {
                label: month_name_short(date.month()),
                selected: is_selected(picker, &date, compare::same_month),
                disabled: !picker.is_valid(&date, Granularity::Month),
                date,
            }
        })
        .collect()
}

/// The view date's decade plus one year either side.
pub fn year_grid<B: BoundInput>(picker: &Picker<B>) -> Vec<YearCell> {
    let view = picker.view_date();
    let first = decade_start(view.year()) - 1;
    let start = view
        .start_of(Unit::Year)
        .sub(Unit::Year, i64::from(view.year() - first));
    (0..12)
        .map(|offset| {
            let date = start.add(Unit::Year, offset);
            YearCell {
                selected: is_selected(picker, &date, compare::same_year),
                disabled: !picker.is_valid(&date, Granularity::Year),
                other_decade: offset == 0 || offset == 11,
                date,
            }
        })
        .collect()
}

fn time_base<B: BoundInput>(picker: &Picker<B>) -> DateValue {
    picker
        .date()
        .cloned()
        .unwrap_or_else(|| picker.state().default_date.clone())
}

/// Hours of the selected (or default) day.
pub fn hour_grid<B: BoundInput>(picker: &Picker<B>) -> Vec<TimeCell> {
    let base = time_base(picker);
    let start = base.start_of(Unit::Day);
    (0..24)
        .filter_map(|hour| {
            let date = start.with_hour(hour)?;
            Some(TimeCell {
                value: hour,
                selected: picker.date().is_some() && hour == base.hour(),
                disabled: !picker.is_valid(&date, Granularity::Hour),
                date,
            })
        })
        .collect()
}

/// Minutes of the selected (or default) hour at the stepping interval.
pub fn minute_grid<B: BoundInput>(picker: &Picker<B>) -> Vec<TimeCell> {
    let base = time_base(picker);
    let start = base.start_of(Unit::Hour);
    let step = picker.constraints().minute_stepping.max(1);
    (0..60)
        .step_by(step as usize)
        .map(|minute| {
            let date = start.add(Unit::Minute, i64::from(minute));
            TimeCell {
                value: minute,
                selected: picker.date().is_some() && minute == base.minute(),
                disabled: !picker.is_valid(&date, Granularity::Minute),
                date,
            }
        })
        .collect()
}
