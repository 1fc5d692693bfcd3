use tracing::debug;

use super::{BoundInput, Picker, TimeViewMode};
use crate::compare::Granularity;
use crate::date_value::{DateValue, Unit};

impl<B: BoundInput> Picker<B> {
    /// Swap the calendar for the clock face.
    pub fn show_clock(&mut self) {
        if !self.components().has_time() {
            return;
        }
        self.state.showing_clock = true;
        self.state.time_view_mode = None;
        self.refresh_time_view();
    }

    pub fn show_calendar(&mut self) {
        if !self.components().has_calendar() {
            return;
        }
        self.state.showing_clock = false;
        self.refresh_date_view();
    }

    /// `None` returns to the clock face.
    pub fn change_time_view(&mut self, mode: Option<TimeViewMode>) {
        if !self.components().has_time() {
            return;
        }
        if mode == Some(TimeViewMode::Minutes) && !self.components().has_minutes {
            return;
        }
        self.state.time_view_mode = mode;
        debug!(mode = mode.map_or("clock", TimeViewMode::name), "time view changed");
        self.refresh_time_view();
    }

    fn time_base(&self) -> DateValue {
        self.state
            .date
            .clone()
            .unwrap_or_else(|| self.state.default_date.clone())
    }

    /// Apply a clock edit through `set_date`. Edits landing on an invalid
    /// time are refused instead of clearing the selection.
    fn apply_time(&mut self, target: DateValue) -> bool {
        if !self.components().has_time() {
            return false;
        }
        let rounded = self.constraints.clamp_stepping(&target);
        if !self.options.keep_invalid && !self.is_valid(&rounded, Granularity::Second) {
            debug!(%rounded, "time not selectable");
            return false;
        }
        self.set_date(Some(rounded), true);
        true
    }

    pub fn increment_hour(&mut self) -> bool {
        let target = self.time_base().add(Unit::Hour, 1);
        self.apply_time(target)
    }

    pub fn decrement_hour(&mut self) -> bool {
        let target = self.time_base().sub(Unit::Hour, 1);
        self.apply_time(target)
    }

    pub fn increment_minute(&mut self) -> bool {
        let step = i64::from(self.constraints.minute_stepping);
        let target = self.time_base().add(Unit::Minute, step);
        self.apply_time(target)
    }

    pub fn decrement_minute(&mut self) -> bool {
        let step = i64::from(self.constraints.minute_stepping);
        let target = self.time_base().sub(Unit::Minute, step);
        self.apply_time(target)
    }

    /// Pick an hour from the hour grid and go back to the clock face.
    pub fn set_hour(&mut self, hour: u32) -> bool {
        let Some(target) = self.time_base().with_hour(hour) else {
            return false;
        };
        let applied = self.apply_time(target);
        if applied {
            self.change_time_view(None);
        }
        applied
    }

    pub fn set_minute(&mut self, minute: u32) -> bool {
        let Some(target) = self.time_base().with_minute(minute) else {
            return false;
        };
        let applied = self.apply_time(target);
        if applied {
            self.change_time_view(None);
        }
        applied
    }

    /// Flip AM/PM, staying on the same calendar day.
    pub fn toggle_period(&mut self) -> bool {
        let base = self.time_base();
        let Some(target) = base.with_hour((base.hour() + 12) % 24) else {
            return false;
        };
        self.apply_time(target)
    }
}
