use tracing::debug;

use super::{BoundInput, Picker};
use crate::compare::Granularity;
use crate::components::ViewMode;
use crate::date_value::{DateValue, Unit};
use crate::grid::{GRID_COLUMNS, decade_start};
use crate::locale;

/// Step of the calendar's previous/next controls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavUnit {
    Month,
    Year,
    Decade,
}

impl NavUnit {
    fn granularity(self) -> Granularity {
        match self {
            NavUnit::Month => Granularity::Month,
            NavUnit::Year | NavUnit::Decade => Granularity::Year,
        }
    }

    fn step(self) -> (Unit, i64) {
        match self {
            NavUnit::Month => (Unit::Month, 1),
            NavUnit::Year => (Unit::Year, 1),
            NavUnit::Decade => (Unit::Year, 10),
        }
    }
}

/// Which of the previous/next controls are enabled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Navigation {
    pub prev: bool,
    pub next: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    Enter,
    Escape,
}

/// First instant of the period `date` falls in.
fn period_start(date: &DateValue, unit: NavUnit) -> DateValue {
    match unit {
        NavUnit::Month => date.start_of(Unit::Month),
        NavUnit::Year => date.start_of(Unit::Year),
        NavUnit::Decade => date
            .sub(Unit::Year, i64::from(date.year() - decade_start(date.year())))
            .start_of(Unit::Year),
    }
}

/// Last instant of the period `date` falls in.
fn period_end(date: &DateValue, unit: NavUnit) -> DateValue {
    match unit {
        NavUnit::Month => date.end_of(Unit::Month),
        NavUnit::Year => date.end_of(Unit::Year),
        NavUnit::Decade => date
            .add(Unit::Year, i64::from(decade_start(date.year()) + 9 - date.year()))
            .end_of(Unit::Year),
    }
}

impl<B: BoundInput> Picker<B> {
    /// Show the picker. With `use_current` and nothing selected, the default
    /// date is selected.
    pub fn open(&mut self) {
        if self.state.is_open {
            return;
        }
        if !self.is_editable() {
            debug!("field not editable, not opening");
            return;
        }
        self.state.is_open = true;
        let empty = if self.is_multi() {
            self.state.dates.is_empty()
        } else {
            self.state.date.is_none()
        };
        if self.options.use_current && empty {
            let current = self.state.default_date.clone();
            if self.is_multi() {
                self.toggle_date(&current);
            } else {
                self.set_date(Some(current), true);
            }
        }
        self.state.view_date = self
            .state
            .date
            .clone()
            .or_else(|| self.state.dates.last().cloned())
            .unwrap_or_else(|| self.state.default_date.clone());
        self.state.view_mode = self.min_view;
        self.state.time_view_mode = None;
        self.state.showing_clock = !self.components().has_calendar();
        debug!(view_mode = self.state.view_mode.name(), "picker opened");
        self.refresh_date_view();
        self.refresh_time_view();
    }

    pub fn close(&mut self) {
        if !self.state.is_open {
            return;
        }
        self.state.is_open = false;
        if self.components().has_calendar() {
            self.state.showing_clock = false;
        }
        debug!("picker closed");
    }

    pub fn toggle_open(&mut self) {
        if self.state.is_open {
            self.close();
        } else {
            self.open();
        }
    }

    /// Switch the calendar grid, never finer than `min_view`. An anchor moves
    /// the view date onto the anchor's calendar date.
    pub fn change_view(&mut self, view: ViewMode, anchor: Option<&DateValue>) {
        let view = view.min(self.min_view);
        if let Some(anchor) = anchor {
            self.state.view_date = self
                .state
                .view_date
                .with_date_of(anchor)
                .unwrap_or_else(|| anchor.clone());
        }
        self.state.view_mode = view;
        if self.components().has_calendar() {
            self.state.showing_clock = false;
        }
        debug!(view = view.name(), "calendar view changed");
        self.refresh_date_view();
    }

    /// Navigation unit of the visible grid.
    pub fn nav_unit(&self) -> NavUnit {
        match self.state.view_mode {
            ViewMode::Days => NavUnit::Month,
            ViewMode::Months => NavUnit::Year,
            ViewMode::Years => NavUnit::Decade,
        }
    }

    /// Moving `periods` units must keep the bound-adjacent edge of the target
    /// period inside `[min_date, max_date]`.
    fn can_shift(&self, unit: NavUnit, periods: i64) -> bool {
        let (step_unit, step) = unit.step();
        let target = self.state.view_date.add(step_unit, step * periods);
        let granularity = unit.granularity();
        if periods >= 0 {
            self.constraints
                .is_before_max(&period_start(&target, unit), granularity, true)
        } else {
            self.constraints
                .is_after_min(&period_end(&target, unit), granularity, true)
        }
    }

    fn shift(&mut self, unit: NavUnit, periods: i64) -> bool {
        if !self.can_shift(unit, periods) {
            debug!(?unit, periods, "navigation blocked by bounds");
            return false;
        }
        let (step_unit, step) = unit.step();
        self.state.view_date = self.state.view_date.add(step_unit, step * periods);
        self.refresh_date_view();
        true
    }

    pub fn navigation(&self) -> Navigation {
        let unit = self.nav_unit();
        Navigation {
            prev: self.can_shift(unit, -1),
            next: self.can_shift(unit, 1),
        }
    }

    pub fn prev(&mut self, unit: NavUnit, amount: u32) -> bool {
        self.shift(unit, -i64::from(amount))
    }

    pub fn next(&mut self, unit: NavUnit, amount: u32) -> bool {
        self.shift(unit, i64::from(amount))
    }

    pub fn select_year(&mut self, year: i32) {
        let Some(target) = self.state.view_date.with_year(year) else {
            return;
        };
        if !self.is_valid(&target, Granularity::Year) {
            debug!(year, "year not selectable");
            return;
        }
        if self.min_view == ViewMode::Years {
            self.commit(target);
        } else {
            self.state.view_date = target;
            self.change_view(ViewMode::Months, None);
        }
    }

    pub fn select_month(&mut self, month: u32) {
        let Some(target) = self.state.view_date.with_month(month) else {
            return;
        };
        if !self.is_valid(&target, Granularity::Month) {
            debug!(month, "month not selectable");
            return;
        }
        if self.min_view == ViewMode::Months {
            self.commit(target);
        } else {
            self.state.view_date = target;
            self.change_view(ViewMode::Days, None);
        }
    }

    pub fn select_day(&mut self, day: &DateValue) {
        if !self.is_valid(day, Granularity::Day) {
            debug!(%day, "day not selectable");
            return;
        }
        self.commit(day.clone());
    }

    pub fn select_today(&mut self) {
        let today = self.calendar_value(self.now());
        if !self.is_valid(&today, Granularity::Day) {
            debug!("today is not selectable");
            return;
        }
        if self.is_multi() {
            self.toggle_date(&today);
        } else {
            self.set_date(Some(today), true);
        }
    }

    /// Select a calendar cell. Date-only formats store the start of the
    /// selected period; time formats keep the current (or default) time.
    fn commit(&mut self, target: DateValue) {
        let components = self.components();
        let value = if components.has_time() {
            let time_source = self
                .state
                .date
                .clone()
                .unwrap_or_else(|| self.state.default_date.clone());
            time_source.with_date_of(&target).unwrap_or(target)
        } else {
            self.calendar_value(target)
        };

        if self.is_multi() {
            self.toggle_date(&value);
            self.state.view_date = value;
        } else {
            self.set_date(Some(value), true);
        }

        if components.has_time() && !self.options.side_by_side {
            self.show_clock();
        } else if !self.options.keep_open && !self.is_multi() {
            self.close();
        }
    }

    /// Keyboard navigation over the visible grid. Returns whether the key
    /// was handled.
    pub fn handle_key(&mut self, key: Key) -> bool {
        if key == Key::Escape {
            self.close();
            return true;
        }
        if self.state.showing_clock && !self.options.side_by_side {
            return false;
        }
        let view = self.state.view_date.clone();
        let columns = i64::from(GRID_COLUMNS);
        let (target, granularity) = match (self.state.view_mode, key) {
            (_, Key::Enter) => {
                match self.state.view_mode {
                    ViewMode::Days => self.select_day(&view),
                    ViewMode::Months => self.select_month(view.month()),
                    ViewMode::Years => self.select_year(view.year()),
                }
                return true;
            }
            (_, Key::Escape) => return true,
            (ViewMode::Days, key) => {
                let target = match key {
                    Key::Left => view.sub(Unit::Day, 1),
                    Key::Right => view.add(Unit::Day, 1),
                    Key::Up => view.sub(Unit::Week, 1),
                    Key::Down => view.add(Unit::Week, 1),
                    Key::PageUp => view.sub(Unit::Month, 1),
                    Key::PageDown => view.add(Unit::Month, 1),
                    Key::Home => self.week_start(&view),
                    _ => self.week_start(&view).add(Unit::Day, 6),
                };
                (target, Granularity::Day)
            }
            (ViewMode::Months, key) => {
                let target = match key {
                    Key::Left => view.sub(Unit::Month, 1),
                    Key::Right => view.add(Unit::Month, 1),
                    Key::Up => view.sub(Unit::Month, columns),
                    Key::Down => view.add(Unit::Month, columns),
                    Key::PageUp => view.sub(Unit::Year, 1),
                    Key::PageDown => view.add(Unit::Year, 1),
                    Key::Home => view.sub(Unit::Month, i64::from(view.month()) - 1),
                    _ => view.add(Unit::Month, 12 - i64::from(view.month())),
                };
                (target, Granularity::Month)
            }
            (ViewMode::Years, key) => {
                let offset = i64::from(view.year() - decade_start(view.year()));
                let target = match key {
                    Key::Left => view.sub(Unit::Year, 1),
                    Key::Right => view.add(Unit::Year, 1),
                    Key::Up => view.sub(Unit::Year, columns),
                    Key::Down => view.add(Unit::Year, columns),
                    Key::PageUp => view.sub(Unit::Year, 10),
                    Key::PageDown => view.add(Unit::Year, 10),
                    Key::Home => view.sub(Unit::Year, offset),
                    _ => view.add(Unit::Year, 9 - offset),
                };
                (target, Granularity::Year)
            }
        };
        if !self.constraints.is_after_min(&target, granularity, true)
            || !self.constraints.is_before_max(&target, granularity, true)
        {
            debug!(?key, %target, "cursor move blocked by bounds");
            return true;
        }
        self.state.view_date = target;
        self.refresh_date_view();
        true
    }

    fn week_start(&self, date: &DateValue) -> DateValue {
        let first = locale::first_weekday(&self.locale);
        let back = (date.weekday().num_days_from_monday() + 7 - first.num_days_from_monday()) % 7;
        date.sub(Unit::Day, i64::from(back))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::PickerOptions;
    use crate::picker::TextField;
    use chrono_tz::Tz;

    fn d(fields: &[i64]) -> DateValue {
        DateValue::from_fields(fields, Tz::UTC, "en-US").unwrap()
    }

    fn picker(options: PickerOptions) -> Picker {
        Picker::new(
            TextField::default(),
            options.with_locale("en-US").with_time_zone("UTC"),
        )
        .unwrap()
    }

    fn at(picker: &mut Picker, date: DateValue) {
        picker.change_view(picker.min_view(), Some(&date));
    }

    #[test]
    fn min_view_follows_format() {
        assert_eq!(picker(PickerOptions::new().with_format("yyyy")).min_view(), ViewMode::Years);
        assert_eq!(picker(PickerOptions::new().with_format("MM/yyyy")).min_view(), ViewMode::Months);
        let p = picker(PickerOptions::new().with_format("yyyy-MM-dd").with_min_view(ViewMode::Months));
        assert_eq!(p.min_view(), ViewMode::Months);
    }

    #[test]
    fn change_view_clamps_and_anchors() {
        let mut p = picker(PickerOptions::new().with_format("MM/yyyy"));
        p.change_view(ViewMode::Days, Some(&d(&[2030, 4, 9])));
        assert_eq!(p.state().view_mode, ViewMode::Months);
        assert_eq!((p.view_date().year(), p.view_date().month()), (2030, 4));
    }

    #[test]
    fn navigation_stops_at_bounds() {
        let mut p = picker(
            PickerOptions::new()
                .with_format("yyyy-MM-dd")
                .with_min_date("2024-01-10")
                .with_max_date("2024-03-05"),
        );
        at(&mut p, d(&[2024, 1, 15]));
        assert_eq!(p.navigation(), Navigation { prev: false, next: true });
        assert!(!p.prev(NavUnit::Month, 1));
        assert!(p.next(NavUnit::Month, 1));
        assert!(p.next(NavUnit::Month, 1));
        assert_eq!(p.view_date().month(), 3);
        assert_eq!(p.navigation(), Navigation { prev: true, next: false });
        assert!(!p.next(NavUnit::Month, 1));
        assert!(!p.prev(NavUnit::Month, 3));
    }

    #[test]
    fn decade_navigation_tests_adjacent_decade_edge() {
        let mut p = picker(
            PickerOptions::new()
                .with_format("yyyy")
                .with_min_date("2019-06-01")
                .with_max_date("2030-01-01"),
        );
        at(&mut p, d(&[2024, 6, 1]));
        assert_eq!(p.nav_unit(), NavUnit::Decade);
        assert_eq!(p.navigation(), Navigation { prev: true, next: true });
        assert!(p.next(NavUnit::Decade, 1));
        assert_eq!(p.view_date().year(), 2034);
        assert_eq!(p.navigation(), Navigation { prev: true, next: false });
        assert!(p.prev(NavUnit::Decade, 2));
        assert_eq!(p.view_date().year(), 2014);
        assert!(!p.prev(NavUnit::Decade, 1));
    }

    #[test]
    fn drill_down_then_select() {
        let mut p = picker(PickerOptions::new().with_format("yyyy-MM-dd"));
        p.open();
        p.change_view(ViewMode::Years, None);
        p.select_year(2031);
        assert_eq!(p.state().view_mode, ViewMode::Months);
        assert_eq!(p.view_date().year(), 2031);
        p.select_month(2);
        assert_eq!(p.state().view_mode, ViewMode::Days);
        assert_eq!(p.view_date().month(), 2);
        p.select_day(&d(&[2031, 2, 14, 16, 30]));
        assert_eq!(p.date(), Some(&d(&[2031, 2, 14])));
        assert_eq!(p.input().text, "2031-02-14");
        assert!(!p.state().is_open);
    }

    #[test]
    fn coarse_format_selects_at_min_view() {
        let mut p = picker(PickerOptions::new().with_format("MM/yyyy").with_keep_open(true));
        at(&mut p, d(&[2024, 1, 1]));
        p.select_month(7);
        assert_eq!(p.date(), Some(&d(&[2024, 7, 1])));
        assert_eq!(p.input().text, "07/2024");
    }

    #[test]
    fn disabled_cells_are_ignored() {
        let mut p = picker(
            PickerOptions::new()
                .with_format("yyyy-MM-dd")
                .with_valid_day(|date| date.weekday() != chrono::Weekday::Sun),
        );
        p.select_day(&d(&[2024, 6, 2]));
        assert_eq!(p.date(), None);
        p.select_day(&d(&[2024, 6, 3]));
        assert_eq!(p.date(), Some(&d(&[2024, 6, 3])));
    }

    #[test]
    fn date_time_selection_moves_to_clock() {
        let mut p = picker(
            PickerOptions::new()
                .with_format("yyyy-MM-dd HH:mm")
                .with_default_date("2024-01-01 09:30"),
        );
        p.open();
        assert_eq!(p.date(), Some(&d(&[2024, 1, 1, 9, 30])));
        p.select_day(&d(&[2024, 1, 20]));
        assert_eq!(p.date(), Some(&d(&[2024, 1, 20, 9, 30])));
        assert!(p.state().showing_clock);
        assert_eq!(p.state().time_view_mode, None);
        assert!(p.state().is_open);

        let mut p = picker(
            PickerOptions::new()
                .with_format("yyyy-MM-dd HH:mm")
                .with_side_by_side(true),
        );
        p.open();
        p.select_day(&d(&[2024, 1, 20]));
        assert!(!p.state().showing_clock);
    }

    #[test]
    fn multi_date_clicks_toggle() {
        let mut p = picker(
            PickerOptions::new()
                .with_format("yyyy-MM-dd")
                .with_multi_date(", ")
                .with_use_current(false),
        );
        p.open();
        assert!(p.dates().is_empty());
        p.select_day(&d(&[2024, 1, 10]));
        p.select_day(&d(&[2024, 1, 5]));
        assert_eq!(p.input().text, "2024-01-05, 2024-01-10");
        p.select_day(&d(&[2024, 1, 10]));
        assert_eq!(p.dates(), &[d(&[2024, 1, 5])]);
        assert!(p.state().is_open);
    }

    #[test]
    fn open_honours_use_current() {
        let mut p = picker(PickerOptions::new().with_format("yyyy-MM-dd").with_default_date("2024-05-05"));
        p.toggle_open();
        assert!(p.state().is_open);
        assert_eq!(p.date(), Some(&d(&[2024, 5, 5])));
        p.toggle_open();
        assert!(!p.state().is_open);

        let mut p = picker(
            PickerOptions::new()
                .with_format("yyyy-MM-dd")
                .with_default_date("2024-05-05")
                .with_use_current(false),
        );
        p.open();
        assert_eq!(p.date(), None);
        assert_eq!(p.view_date(), &d(&[2024, 5, 5]));
    }

    #[test]
    fn keyboard_moves_cursor() {
        let mut p = picker(PickerOptions::new().with_format("yyyy-MM-dd").with_max_date("2024-06-30"));
        p.open();
        at(&mut p, d(&[2024, 6, 12]));
        assert!(p.handle_key(Key::Right));
        assert_eq!(p.view_date().day(), 13);
        p.handle_key(Key::Up);
        assert_eq!(p.view_date().day(), 6);
        p.handle_key(Key::Home);
        assert_eq!(p.view_date().day(), 2);
        p.handle_key(Key::End);
        assert_eq!(p.view_date().day(), 8);
        p.handle_key(Key::PageUp);
        assert_eq!((p.view_date().month(), p.view_date().day()), (5, 8));
        p.handle_key(Key::PageDown);
        p.handle_key(Key::PageDown);
        assert_eq!((p.view_date().month(), p.view_date().day()), (6, 8));
        p.handle_key(Key::Enter);
        assert_eq!(p.date(), Some(&d(&[2024, 6, 8])));
        assert!(p.handle_key(Key::Escape));
        assert!(!p.state().is_open);
    }

    #[test]
    fn keyboard_in_coarser_grids() {
        let mut p = picker(PickerOptions::new().with_format("yyyy-MM-dd"));
        at(&mut p, d(&[2024, 5, 1]));
        p.change_view(ViewMode::Months, None);
        p.handle_key(Key::Down);
        assert_eq!(p.view_date().month(), 5 + GRID_COLUMNS);
        p.handle_key(Key::Home);
        assert_eq!(p.view_date().month(), 1);
        p.change_view(ViewMode::Years, None);
        p.handle_key(Key::End);
        assert_eq!(p.view_date().year(), 2029);
        p.handle_key(Key::PageDown);
        assert_eq!(p.view_date().year(), 2039);
        p.handle_key(Key::Enter);
        assert_eq!(p.state().view_mode, ViewMode::Months);
    }

    #[test]
    fn week_start_follows_locale() {
        let p = Picker::new(
            TextField::default(),
            PickerOptions::new()
                .with_format("yyyy-MM-dd")
                .with_locale("de-DE")
                .with_time_zone("UTC"),
        )
        .unwrap();
        assert_eq!(p.week_start(&d(&[2024, 6, 12])).day(), 10);
        let p = picker(PickerOptions::new().with_format("yyyy-MM-dd"));
        assert_eq!(p.week_start(&d(&[2024, 6, 12])).day(), 9);
    }

    #[test]
    fn today_selectable_when_max_is_today() {
        let today = DateValue::now(Tz::UTC, "en-US").format("yyyy-MM-dd");
        let mut p = picker(PickerOptions::new().with_format("yyyy-MM-dd").with_max_date(today.as_str()));
        p.select_today();
        assert_eq!(p.input().text, today);

        let mut p = picker(PickerOptions::new().with_format("yyyy-MM-dd").with_max_date(today.as_str()));
        p.open();
        assert_eq!(p.input().text, today);
        assert_eq!(p.date().map(DateValue::hour), Some(0));
    }

    #[test]
    fn opening_past_range_shows_range() {
        let mut p = picker(
            PickerOptions::new()
                .with_format("yyyy-MM-dd")
                .with_min_date("2020-01-01")
                .with_max_date("2020-12-31"),
        );
        p.open();
        assert_eq!(p.date(), Some(&d(&[2020, 12, 31])));
        assert_eq!(p.view_date().year(), 2020);
        assert!(p.is_valid(p.view_date(), Granularity::Day));
        assert_eq!(p.navigation(), Navigation { prev: true, next: false });
    }
}
