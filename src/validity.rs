//! Bounds, user predicates and minute stepping.

use std::fmt;
use std::rc::Rc;

use crate::compare::{self, Granularity};
use crate::components::FormatComponents;
use crate::date_value::{DateValue, Unit};

/// User-supplied acceptance test for a candidate date.
pub type Predicate = Rc<dyn Fn(&DateValue) -> bool>;

#[derive(Clone, Default)]
pub struct Predicates {
    pub year: Option<Predicate>,
    pub month: Option<Predicate>,
    pub day: Option<Predicate>,
    pub time: Option<Predicate>,
}

impl fmt::Debug for Predicates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicates")
            .field("year", &self.year.is_some())
            .field("month", &self.month.is_some())
            .field("day", &self.day.is_some())
            .field("time", &self.time.is_some())
            .finish()
    }
}

fn rejects(predicate: &Option<Predicate>, date: &DateValue) -> bool {
    predicate.as_ref().is_some_and(|accept| !accept(date))
}

#[derive(Clone, Debug)]
pub struct Constraints {
    pub min_date: Option<DateValue>,
    pub max_date: Option<DateValue>,
    pub predicates: Predicates,
    pub components: FormatComponents,
    pub minute_stepping: u32,
}

impl Constraints {
    pub fn new(components: FormatComponents) -> Self {
        Self {
            min_date: None,
            max_date: None,
            predicates: Predicates::default(),
            components,
            minute_stepping: 1,
        }
    }

    pub fn is_after_min(&self, date: &DateValue, granularity: Granularity, allow_same: bool) -> bool {
        let Some(min) = &self.min_date else {
            return true;
        };
        compare::is_after(date, min, granularity)
            || (allow_same && compare::is_same(date, min, granularity))
    }

    pub fn is_before_max(&self, date: &DateValue, granularity: Granularity, allow_same: bool) -> bool {
        let Some(max) = &self.max_date else {
            return true;
        };
        compare::is_before(date, max, granularity)
            || (allow_same && compare::is_same(date, max, granularity))
    }

    /// Layered check: bounds at the coarsened granularity, then the year,
    /// month, day and time predicates, stopping at the requested
    /// granularity. Finer predicates never run for a coarse check.
    pub fn is_valid(&self, date: &DateValue, granularity: Granularity) -> bool {
        let bounds = granularity.coarsen();
        if !self.is_after_min(date, bounds, true) || !self.is_before_max(date, bounds, true) {
            return false;
        }
        if rejects(&self.predicates.year, date) {
            return false;
        }
        if granularity == Granularity::Year {
            return true;
        }
        if rejects(&self.predicates.month, date) {
            return false;
        }
        if granularity == Granularity::Month {
            return true;
        }
        if rejects(&self.predicates.day, date) {
            return false;
        }
        if granularity == Granularity::Day || !self.components.has_time() {
            return true;
        }
        !rejects(&self.predicates.time, date)
    }

    /// Move an out-of-range date onto the violated bound. The max bound is
    /// applied last.
    pub fn clamp_date(&self, date: &DateValue) -> DateValue {
        let mut clamped = date.clone();
        if !self.is_after_min(&clamped, Granularity::Second, false)
            && let Some(min) = &self.min_date
        {
            clamped = min.rebase(date.zone(), date.locale());
        }
        if !self.is_before_max(&clamped, Granularity::Second, false)
            && let Some(max) = &self.max_date
        {
            clamped = max.rebase(date.zone(), date.locale());
        }
        clamped
    }

    /// Round minutes half-up to the nearest stepping multiple (60 rolls into
    /// the next hour) and zero the seconds. No-op for formats without
    /// minutes or with a stepping of 1.
    pub fn clamp_stepping(&self, date: &DateValue) -> DateValue {
        let stepping = self.minute_stepping;
        if !self.components.has_minutes || stepping <= 1 {
            return date.clone();
        }
        let minute = u64::from(date.minute());
        let stepping = u64::from(stepping);
        let rounded = ((2 * minute + stepping) / (2 * stepping) * stepping).min(60);
        date.start_of(Unit::Minute)
            .add(Unit::Minute, rounded as i64 - minute as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use chrono_tz::Tz;
    use std::cell::Cell;

    fn d(fields: &[i64]) -> DateValue {
        DateValue::from_fields(fields, Tz::UTC, "en-US").unwrap()
    }

    fn constraints(format: &str) -> Constraints {
        Constraints::new(FormatComponents::detect(format))
    }

    #[test]
    fn unbounded_accepts_everything() {
        let c = constraints("yyyy-MM-dd");
        assert!(c.is_after_min(&d(&[1, 1, 1]), Granularity::Second, false));
        assert!(c.is_before_max(&d(&[9999, 1, 1]), Granularity::Second, false));
        assert!(c.is_valid(&d(&[2024, 1, 1]), Granularity::Second));
    }

    #[test]
    fn bounds_are_inclusive_at_each_granularity() {
        let mut c = constraints("yyyy-MM-dd HH:mm");
        c.min_date = Some(d(&[2024, 1, 10, 12]));
        c.max_date = Some(d(&[2024, 1, 20, 12]));
        assert!(!c.is_valid(&d(&[2024, 1, 10, 8]), Granularity::Second));
        assert!(c.is_valid(&d(&[2024, 1, 10, 8]), Granularity::Day));
        assert!(c.is_valid(&d(&[2024, 1, 20, 12]), Granularity::Minute));
        assert!(!c.is_valid(&d(&[2024, 1, 21]), Granularity::Day));
        assert!(c.is_valid(&d(&[2024, 1, 31]), Granularity::Month));
        assert!(!c.is_valid(&d(&[2024, 2, 1]), Granularity::Month));
        assert!(c.is_after_min(&d(&[2024, 1, 10, 12]), Granularity::Second, true));
        assert!(!c.is_after_min(&d(&[2024, 1, 10, 12]), Granularity::Second, false));
    }

    #[test]
    fn coarse_checks_never_run_fine_predicates() {
        let day_calls = Rc::new(Cell::new(0));
        let calls = day_calls.clone();
        let mut c = constraints("yyyy-MM-dd HH:mm");
        c.predicates.day = Some(Rc::new(move |_: &DateValue| {
            calls.set(calls.get() + 1);
            false
        }));
        c.predicates.year = Some(Rc::new(|date: &DateValue| date.year() != 2023));
        assert!(c.is_valid(&d(&[2024, 5, 5]), Granularity::Year));
        assert!(c.is_valid(&d(&[2024, 5, 5]), Granularity::Month));
        assert_eq!(day_calls.get(), 0);
        assert!(!c.is_valid(&d(&[2024, 5, 5]), Granularity::Day));
        assert_eq!(day_calls.get(), 1);
        assert!(!c.is_valid(&d(&[2023, 5, 5]), Granularity::Year));
    }

    #[test]
    fn time_predicate_skipped_for_date_formats() {
        let mut c = constraints("yyyy-MM-dd");
        c.predicates.time = Some(Rc::new(|_: &DateValue| false));
        assert!(c.is_valid(&d(&[2024, 5, 5]), Granularity::Second));
        c.components = FormatComponents::detect("yyyy-MM-dd HH:mm");
        assert!(!c.is_valid(&d(&[2024, 5, 5]), Granularity::Second));
        assert!(c.is_valid(&d(&[2024, 5, 5]), Granularity::Day));
    }

    #[test]
    fn coarse_rejection_implies_fine_rejection() {
        let mut c = constraints("yyyy-MM-dd HH:mm");
        c.min_date = Some(d(&[2022, 6, 1]));
        c.predicates.year = Some(Rc::new(|date: &DateValue| date.datetime().year() % 2 == 0));
        for year in 2019..2027 {
            let date = d(&[year, 3, 15, 9, 30]);
            if !c.is_valid(&date, Granularity::Year) {
                assert!(!c.is_valid(&date, Granularity::Second));
            }
        }
    }

    #[test]
    fn clamp_to_bounds() {
        let mut c = constraints("yyyy-MM-dd");
        c.min_date = Some(d(&[2024, 1, 10]));
        c.max_date = Some(d(&[2024, 1, 20]));
        assert_eq!(c.clamp_date(&d(&[2024, 1, 5])), d(&[2024, 1, 10]));
        assert_eq!(c.clamp_date(&d(&[2024, 2, 5])), d(&[2024, 1, 20]));
        assert_eq!(c.clamp_date(&d(&[2024, 1, 15])), d(&[2024, 1, 15]));
    }

    #[test]
    fn stepping_rounds_half_up() {
        let mut c = constraints("yyyy-MM-dd HH:mm");
        c.minute_stepping = 15;
        assert_eq!(c.clamp_stepping(&d(&[2024, 1, 1, 10, 7])), d(&[2024, 1, 1, 10, 0]));
        assert_eq!(c.clamp_stepping(&d(&[2024, 1, 1, 10, 8])), d(&[2024, 1, 1, 10, 15]));
        assert_eq!(c.clamp_stepping(&d(&[2024, 1, 1, 10, 53, 40])), d(&[2024, 1, 1, 11, 0]));
        assert_eq!(c.clamp_stepping(&d(&[2024, 12, 31, 23, 59])), d(&[2025, 1, 1, 0, 0]));
        c.minute_stepping = 10;
        assert_eq!(c.clamp_stepping(&d(&[2024, 1, 1, 10, 5])), d(&[2024, 1, 1, 10, 10]));
    }

    #[test]
    fn stepping_is_idempotent() {
        let mut c = constraints("yyyy-MM-dd HH:mm");
        for stepping in [2, 5, 7, 15, 25, 30] {
            c.minute_stepping = stepping;
            for minute in 0..60 {
                let once = c.clamp_stepping(&d(&[2024, 1, 1, 10, minute, 31]));
                assert_eq!(c.clamp_stepping(&once), once);
                assert_eq!(once.second(), 0);
            }
        }
    }

    #[test]
    fn huge_stepping_rounds_to_hour() {
        let mut c = constraints("yyyy-MM-dd HH:mm");
        c.minute_stepping = u32::MAX;
        assert_eq!(c.clamp_stepping(&d(&[2024, 1, 1, 10, 7])), d(&[2024, 1, 1, 10, 0]));
        assert_eq!(c.clamp_stepping(&d(&[2024, 1, 1, 10, 59])), d(&[2024, 1, 1, 10, 0]));
    }

    #[test]
    fn stepping_ignored_without_minutes() {
        let mut c = constraints("yyyy-MM-dd");
        c.minute_stepping = 15;
        let date = d(&[2024, 1, 1, 10, 7, 3]);
        assert_eq!(c.clamp_stepping(&date), date);
        let mut c = constraints("yyyy-MM-dd HH:mm");
        c.minute_stepping = 1;
        assert_eq!(c.clamp_stepping(&date), date);
    }
}
