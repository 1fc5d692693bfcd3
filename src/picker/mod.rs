//! Selection state machine.
//!
//! A [`Picker`] owns the current selection, the calendar cursor and the
//! bound text field. Every state change funnels through [`Picker::set_date`]
//! or [`Picker::set_dates`], which round to the minute stepping, drop invalid
//! values, and notify listeners only when the formatted field text changes.

mod clock;
mod events;
mod view;

use chrono_tz::Tz;
use tracing::{debug, trace, warn};

use crate::compare::{self, Granularity};
use crate::components::{FormatComponents, ViewMode};
use crate::date_value::{DateValue, Unit, resolve_zone};
use crate::error::ConfigError;
use crate::input::{DateInput, parse_generic};
use crate::locale::{check_day_period, default_date_format, default_format, resolve_locale};
use crate::options::PickerOptions;
use crate::validity::Constraints;

pub use events::{BoundInput, ChangeEvent, RenderSignal, TextField, TimeViewMode};
pub use view::{Key, NavUnit, Navigation};

#[derive(Clone, Debug)]
pub struct PickerState {
    /// Single selection; unused in multi-date mode.
    pub date: Option<DateValue>,
    /// Multi-date selection, ascending, no two entries in the same second.
    pub dates: Vec<DateValue>,
    pub view_date: DateValue,
    /// Used wherever a concrete instant is needed before anything is selected.
    pub default_date: DateValue,
    pub view_mode: ViewMode,
    pub time_view_mode: Option<TimeViewMode>,
    /// Clock pane visible instead of the calendar (ignored side by side).
    pub showing_clock: bool,
    pub is_open: bool,
}

type ChangeListener = Box<dyn FnMut(&ChangeEvent)>;
type RenderListener = Box<dyn FnMut(&RenderSignal)>;

pub struct Picker<B: BoundInput = TextField> {
    input: B,
    options: PickerOptions,
    format: String,
    locale: String,
    zone: Tz,
    constraints: Constraints,
    min_view: ViewMode,
    state: PickerState,
    change_listeners: Vec<ChangeListener>,
    render_listeners: Vec<RenderListener>,
}

impl<B: BoundInput> Picker<B> {
    /// Attach a picker to `input`, reading its current text as the initial
    /// value. Contradictory options fail here and no picker is created.
    pub fn new(input: B, options: PickerOptions) -> Result<Self, ConfigError> {
        if options.minute_stepping == 0 {
            return Err(ConfigError::ZeroStepping);
        }
        let locale = resolve_locale(options.locale.as_deref())?;
        let zone = resolve_zone(options.time_zone.as_deref())?;
        let format = match &options.format {
            Some(format) => format.clone(),
            None if options.multi_date => default_date_format(&locale),
            None => default_format(&locale, check_day_period(&locale)),
        };
        let components = FormatComponents::detect(&format);
        components.validate(&format, options.multi_date)?;

        let min_view = match (components.min_view(), options.min_view) {
            (Some(derived), Some(explicit)) => derived.min(explicit),
            (Some(derived), None) => derived,
            (None, _) => ViewMode::Days,
        };
        let mut constraints = Constraints::new(components);
        constraints.predicates = options.predicates();
        constraints.minute_stepping = options.minute_stepping;

        let now = DateValue::now(zone, &locale);
        let mut picker = Self {
            input,
            options,
            format,
            locale,
            zone,
            constraints,
            min_view,
            state: PickerState {
                date: None,
                dates: Vec::new(),
                view_date: now.clone(),
                default_date: now,
                view_mode: min_view,
                time_view_mode: None,
                showing_clock: !components.has_calendar(),
                is_open: false,
            },
            change_listeners: Vec::new(),
            render_listeners: Vec::new(),
        };

        picker.constraints.min_date = picker.parse_bound(picker.options.min_date.clone(), "min")?;
        picker.constraints.max_date = picker.parse_bound(picker.options.max_date.clone(), "max")?;
        picker.check_bounds()?;
        picker.state.default_date = picker.compute_default_date();
        picker.state.view_date = picker.state.default_date.clone();
        picker.apply_text(false);

        debug!(
            format = %picker.format,
            locale = %picker.locale,
            zone = picker.zone.name(),
            "picker initialized"
        );
        Ok(picker)
    }

    fn parse_bound(
        &self,
        input: Option<DateInput>,
        which: &'static str,
    ) -> Result<Option<DateValue>, ConfigError> {
        match input {
            None | Some(DateInput::Empty) => Ok(None),
            Some(input) => self
                .parse_date(input)
                .map(Some)
                .ok_or(ConfigError::InvalidBound(which)),
        }
    }

    fn check_bounds(&self) -> Result<(), ConfigError> {
        if let (Some(min), Some(max)) = (&self.constraints.min_date, &self.constraints.max_date)
            && compare::after_second(min, max)
        {
            return Err(ConfigError::InvertedBounds {
                min: min.to_string(),
                max: max.to_string(),
            });
        }
        Ok(())
    }

    /// `default_date` option or now, moved into the bounds; for formats with
    /// a time, advanced by the minute stepping (for at most a day) until it
    /// is valid.
    fn compute_default_date(&self) -> DateValue {
        let base = self
            .options
            .default_date
            .clone()
            .and_then(|input| self.parse_date(input))
            .map(|date| self.constraints.clamp_stepping(&date))
            .unwrap_or_else(|| self.now());
        let base = self.constraints.clamp_date(&self.calendar_value(base));
        if !self.components().has_time() || self.is_valid(&base, Granularity::Second) {
            return base;
        }
        let step = i64::from(self.constraints.minute_stepping);
        let mut candidate = base.clone();
        for _ in 0..(24 * 60 / step) {
            candidate = candidate.add(Unit::Minute, step);
            if self.is_valid(&candidate, Granularity::Second) {
                return candidate;
            }
        }
        base
    }

    pub fn options(&self) -> &PickerOptions {
        &self.options
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    pub fn components(&self) -> FormatComponents {
        self.constraints.components
    }

    /// Grid at which a click selects rather than drills down.
    pub fn min_view(&self) -> ViewMode {
        self.min_view
    }

    pub fn state(&self) -> &PickerState {
        &self.state
    }

    pub fn date(&self) -> Option<&DateValue> {
        self.state.date.as_ref()
    }

    pub fn dates(&self) -> &[DateValue] {
        &self.state.dates
    }

    pub fn view_date(&self) -> &DateValue {
        &self.state.view_date
    }

    pub fn input(&self) -> &B {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut B {
        &mut self.input
    }

    pub fn is_multi(&self) -> bool {
        self.options.multi_date
    }

    pub fn is_editable(&self) -> bool {
        !self.input.is_disabled() && (!self.input.is_readonly() || self.options.ignore_readonly)
    }

    pub fn is_valid(&self, date: &DateValue, granularity: Granularity) -> bool {
        self.constraints.is_valid(date, granularity)
    }

    pub fn on_change(&mut self, listener: impl FnMut(&ChangeEvent) + 'static) {
        self.change_listeners.push(Box::new(listener));
    }

    pub fn on_render(&mut self, listener: impl FnMut(&RenderSignal) + 'static) {
        self.render_listeners.push(Box::new(listener));
    }

    /// Current instant in the picker's zone, rounded to the stepping.
    pub fn now(&self) -> DateValue {
        self.constraints
            .clamp_stepping(&DateValue::now(self.zone, &self.locale))
    }

    /// Date-only formats select the start of the day, month or year at
    /// `min_view`; formats with a time keep the value as is.
    pub(crate) fn calendar_value(&self, date: DateValue) -> DateValue {
        if self.components().has_time() {
            return date;
        }
        match self.min_view {
            ViewMode::Years => date.start_of(Unit::Year),
            ViewMode::Months => date.start_of(Unit::Month),
            ViewMode::Days => date.start_of(Unit::Day),
        }
    }

    /// Parse trimmed text against the format, then each alternate format.
    pub fn make_date(&self, text: &str) -> Option<DateValue> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        std::iter::once(self.format.as_str())
            .chain(self.options.alt_formats.iter().map(String::as_str))
            .find_map(|pattern| {
                match DateValue::from_format(pattern, text, self.zone, &self.locale) {
                    Ok(date) => Some(date),
                    Err(err) => {
                        trace!(pattern, text, %err, "pattern did not match");
                        None
                    }
                }
            })
            .map(|date| self.constraints.clamp_stepping(&date))
    }

    /// Coerce anything date-like into this picker's zone and locale.
    pub fn parse_date(&self, value: impl Into<DateInput>) -> Option<DateValue> {
        match value.into() {
            DateInput::Empty => None,
            DateInput::Value(date) => Some(date.rebase(self.zone, &self.locale)),
            DateInput::Text(text) => {
                if text.trim().is_empty() {
                    return None;
                }
                self.make_date(&text)
                    .or_else(|| parse_generic(&text, self.zone, &self.locale))
            }
            DateInput::Native(dt) => Some(DateValue::new(dt.with_timezone(&self.zone), &self.locale)),
            DateInput::Naive(naive) => DateValue::from_naive(&naive, self.zone, &self.locale),
            DateInput::Timestamp(ms) => DateValue::from_timestamp_millis(ms, self.zone, &self.locale),
            DateInput::Fields(fields) => DateValue::from_fields(&fields, self.zone, &self.locale),
        }
    }

    /// Parse each value, dropping the ones that do not parse.
    pub fn parse_dates<I>(&self, values: Option<I>) -> Option<Vec<DateValue>>
    where
        I: IntoIterator,
        I::Item: Into<DateInput>,
    {
        values.map(|values| {
            values
                .into_iter()
                .filter_map(|value| self.parse_date(value))
                .collect()
        })
    }

    /// Text the field shows for the current selection.
    pub fn formatted_value(&self) -> String {
        if self.options.multi_date {
            self.state
                .dates
                .iter()
                .map(|date| date.format(&self.format))
                .collect::<Vec<_>>()
                .join(&self.options.multi_date_separator)
        } else {
            self.state
                .date
                .as_ref()
                .map(|date| date.format(&self.format))
                .unwrap_or_default()
        }
    }

    /// Write the formatted selection to the field without notifying.
    pub fn update_value(&mut self) {
        let text = self.formatted_value();
        self.input.set_value(&text);
    }

    /// Select a single date (`None` clears). Ignored when the field is not
    /// editable. The field is rewritten and listeners notified only when
    /// `update_value` is set and the formatted text differs from the field.
    /// Ignored in multi-date mode.
    pub fn set_date(&mut self, date: Option<DateValue>, update_value: bool) {
        if !self.is_editable() {
            debug!("field not editable, selection ignored");
            return;
        }
        if self.options.multi_date {
            debug!("multi-date picker, use set_dates or toggle_date");
            return;
        }
        let baseline = self.input.value();
        self.apply_date(date, update_value, &baseline);
    }

    /// `baseline` is the text the new value is compared against when
    /// deciding whether a change happened.
    fn apply_date(&mut self, date: Option<DateValue>, update_value: bool, baseline: &str) {
        let candidate = date
            .map(|date| self.constraints.clamp_stepping(&date))
            .filter(|date| {
                self.options.keep_invalid || self.constraints.is_valid(date, Granularity::Second)
            });
        let old = std::mem::replace(&mut self.state.date, candidate);
        if let Some(date) = &self.state.date {
            self.state.view_date = date.clone();
        }
        self.refresh();
        if !update_value {
            return;
        }
        let text = self.formatted_value();
        if text == baseline {
            if text != self.input.value() {
                self.input.set_value(&text);
            }
            debug!(%text, "value unchanged, change suppressed");
            return;
        }
        self.input.set_value(&text);
        let event = ChangeEvent::Single {
            old,
            new: self.state.date.clone(),
        };
        self.emit_change(&event);
    }

    /// Replace the multi-date selection. Invalid entries are dropped; the
    /// rest is sorted and deduplicated to the second.
    pub fn set_dates(&mut self, dates: Vec<DateValue>, update_value: bool) {
        if !self.is_editable() {
            debug!("field not editable, selection ignored");
            return;
        }
        let baseline = self.input.value();
        self.apply_dates(dates, update_value, &baseline);
    }

    fn apply_dates(&mut self, dates: Vec<DateValue>, update_value: bool, baseline: &str) {
        let mut next: Vec<DateValue> = dates
            .iter()
            .map(|date| self.constraints.clamp_stepping(date))
            .filter(|date| self.constraints.is_valid(date, Granularity::Second))
            .collect();
        if next.len() < dates.len() {
            debug!(dropped = dates.len() - next.len(), "invalid dates dropped");
        }
        next.sort();
        next.dedup_by(|a, b| compare::same_second(a, b));
        let old = std::mem::replace(&mut self.state.dates, next);
        self.refresh();
        if !update_value {
            return;
        }
        let text = self.formatted_value();
        if text == baseline {
            if text != self.input.value() {
                self.input.set_value(&text);
            }
            debug!(%text, "value unchanged, change suppressed");
            return;
        }
        self.input.set_value(&text);
        let event = ChangeEvent::Multi {
            old,
            new: self.state.dates.clone(),
        };
        self.emit_change(&event);
    }

    /// Multi-date day toggle: removes every selected date on the same day as
    /// `date`, or adds `date` when there is none. Single mode selects it.
    pub fn toggle_date(&mut self, date: &DateValue) {
        if !self.options.multi_date {
            self.set_date(Some(date.clone()), true);
            return;
        }
        let mut next = self.state.dates.clone();
        let before = next.len();
        next.retain(|selected| !compare::same_day(selected, date));
        if next.len() == before {
            next.push(date.clone());
        }
        self.set_dates(next, true);
    }

    pub fn clear(&mut self) {
        if self.options.multi_date {
            self.set_dates(Vec::new(), true);
        } else {
            self.set_date(None, true);
        }
    }

    /// Re-read the field after the user edited it.
    pub fn input_changed(&mut self) {
        if !self.is_editable() {
            return;
        }
        self.apply_text(true);
    }

    /// Unparsable or invalid text reverts the field to the last good value,
    /// or with `keep_invalid` stays in the field while the selection clears.
    /// Changes are judged against the last formatted value, not the typed
    /// text.
    fn apply_text(&mut self, notify: bool) {
        let text = self.input.value();
        let baseline = self.formatted_value();
        if text.trim().is_empty() {
            if self.options.multi_date {
                self.apply_dates(Vec::new(), notify, &baseline);
            } else {
                self.apply_date(None, notify, &baseline);
            }
            return;
        }

        if self.options.multi_date {
            let parsed: Vec<DateValue> = text
                .split(self.options.multi_date_separator.as_str())
                .filter_map(|part| self.make_date(part))
                .collect();
            self.apply_dates(parsed, notify, &baseline);
            return;
        }

        match self.make_date(&text) {
            Some(date)
                if self.options.keep_invalid
                    || self.constraints.is_valid(&date, Granularity::Second) =>
            {
                self.apply_date(Some(date), notify, &baseline);
            }
            _ if self.options.keep_invalid => {
                debug!(%text, "keeping unparsable text, selection cleared");
                let old = self.state.date.take();
                self.refresh();
                if notify && old.is_some() {
                    self.emit_change(&ChangeEvent::Single { old, new: None });
                }
            }
            _ => {
                warn!(%text, "rejected input, reverting field");
                self.update_value();
            }
        }
    }

    pub fn set_min_date(&mut self, min: Option<DateInput>) -> Result<(), ConfigError> {
        let min = self.parse_bound(min, "min")?;
        let previous = std::mem::replace(&mut self.constraints.min_date, min);
        if let Err(err) = self.check_bounds() {
            self.constraints.min_date = previous;
            return Err(err);
        }
        self.revalidate();
        Ok(())
    }

    pub fn set_max_date(&mut self, max: Option<DateInput>) -> Result<(), ConfigError> {
        let max = self.parse_bound(max, "max")?;
        let previous = std::mem::replace(&mut self.constraints.max_date, max);
        if let Err(err) = self.check_bounds() {
            self.constraints.max_date = previous;
            return Err(err);
        }
        self.revalidate();
        Ok(())
    }

    pub fn set_minute_stepping(&mut self, stepping: u32) -> Result<(), ConfigError> {
        if stepping == 0 {
            return Err(ConfigError::ZeroStepping);
        }
        self.constraints.minute_stepping = stepping;
        self.options.minute_stepping = stepping;
        self.state.date = self
            .state
            .date
            .as_ref()
            .map(|date| self.constraints.clamp_stepping(date));
        self.revalidate();
        Ok(())
    }

    /// After a constraint change: drop selections that became invalid
    /// (single mode honours `keep_invalid`), redraw and rewrite the field.
    fn revalidate(&mut self) {
        if !self.options.keep_invalid
            && let Some(date) = &self.state.date
            && !self.constraints.is_valid(date, Granularity::Second)
        {
            self.state.date = None;
        }
        let constraints = &self.constraints;
        self.state
            .dates
            .retain(|date| constraints.is_valid(date, Granularity::Second));
        self.refresh();
        self.update_value();
    }

    fn emit_change(&mut self, event: &ChangeEvent) {
        debug!(?event, "value changed");
        for listener in &mut self.change_listeners {
            listener(event);
        }
    }

    fn emit_render(&mut self, signal: RenderSignal) {
        for listener in &mut self.render_listeners {
            listener(&signal);
        }
    }

    pub(crate) fn refresh_date_view(&mut self) {
        let signal = RenderSignal::Date {
            view_mode: self.state.view_mode,
            view_date: self.state.view_date.clone(),
        };
        self.emit_render(signal);
    }

    pub(crate) fn refresh_time_view(&mut self) {
        let signal = RenderSignal::Time {
            time_view_mode: self.state.time_view_mode,
            view_date: self.state.view_date.clone(),
        };
        self.emit_render(signal);
    }

    fn refresh(&mut self) {
        self.refresh_date_view();
        self.refresh_time_view();
    }

    /// Detach and hand the field back. Listeners and dates are dropped.
    pub fn dispose(self) -> B {
        debug!("picker disposed");
        self.input
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn d(fields: &[i64]) -> DateValue {
        DateValue::from_fields(fields, Tz::UTC, "en-US").unwrap()
    }

    fn base(format: &str) -> PickerOptions {
        PickerOptions::new()
            .with_format(format)
            .with_locale("en-US")
            .with_time_zone("UTC")
    }

    fn picker(options: PickerOptions) -> Picker {
        Picker::new(TextField::default(), options).unwrap()
    }

    fn record(picker: &mut Picker) -> Rc<RefCell<Vec<ChangeEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        picker.on_change(move |event| sink.borrow_mut().push(event.clone()));
        events
    }

    #[test]
    fn derived_format_follows_locale() {
        let p = Picker::new(
            TextField::default(),
            PickerOptions::new().with_locale("en-US").with_time_zone("UTC"),
        )
        .unwrap();
        assert_eq!(p.format(), "MM/dd/yyyy hh:mm a");
        let p = Picker::new(
            TextField::default(),
            PickerOptions::new()
                .with_locale("de-DE")
                .with_time_zone("UTC")
                .with_multi_date(", "),
        )
        .unwrap();
        assert_eq!(p.format(), "dd.MM.yyyy");
    }

    #[test]
    fn contradictory_configuration_fails() {
        let err = Picker::new(TextField::default(), base("HH:mm").with_multi_date(",")).err();
        assert!(matches!(err, Some(ConfigError::MultiDateWithTime(_))));
        let err = Picker::new(TextField::default(), base("dd yyyy")).err();
        assert!(matches!(err, Some(ConfigError::DayWithoutMonth(_))));
        let err = Picker::new(TextField::default(), base("yyyy-MM-dd").with_minute_stepping(0)).err();
        assert_eq!(err, Some(ConfigError::ZeroStepping));
        let err = Picker::new(
            TextField::default(),
            base("yyyy-MM-dd")
                .with_min_date("2024-02-01")
                .with_max_date("2024-01-01"),
        )
        .err();
        assert!(matches!(err, Some(ConfigError::InvertedBounds { .. })));
        let err = Picker::new(TextField::default(), base("yyyy-MM-dd").with_min_date("soon")).err();
        assert_eq!(err, Some(ConfigError::InvalidBound("min")));
        let err = Picker::new(TextField::default(), base("yyyy").with_time_zone("Nowhere/Else")).err();
        assert!(matches!(err, Some(ConfigError::InvalidTimeZone(_))));
    }

    #[test]
    fn make_date_rejects_impossible_calendar_date() {
        let p = picker(base("yyyy-MM-dd"));
        assert_eq!(p.make_date("2024-02-30"), None);
        assert_eq!(p.make_date("  2024-02-29 "), Some(d(&[2024, 2, 29])));
        assert_eq!(p.make_date("   "), None);
    }

    #[test]
    fn make_date_tries_alt_formats_in_order() {
        let p = picker(base("yyyy-MM-dd").with_alt_format("dd.MM.yyyy").with_alt_format("d/M/yyyy"));
        assert_eq!(p.make_date("05.01.2024"), Some(d(&[2024, 1, 5])));
        assert_eq!(p.make_date("5/1/2024"), Some(d(&[2024, 1, 5])));
        assert_eq!(p.make_date("January 5"), None);
    }

    #[test]
    fn make_date_rounds_to_stepping() {
        let p = picker(base("yyyy-MM-dd HH:mm").with_minute_stepping(15));
        assert_eq!(p.make_date("2024-01-01 10:08"), Some(d(&[2024, 1, 1, 10, 15])));
    }

    #[test]
    fn parse_date_coerces_inputs() {
        let p = picker(base("yyyy-MM-dd HH:mm").with_time_zone("Europe/Berlin"));
        let utc = d(&[2024, 6, 1, 10]);
        let rebased = p.parse_date(&utc).unwrap();
        assert_eq!(rebased, utc);
        assert_eq!(rebased.hour(), 12);
        assert_eq!(p.parse_date("2024-06-01 12:00").unwrap(), utc);
        assert_eq!(p.parse_date("2024-06-01T10:00:00Z").unwrap(), utc);
        assert_eq!(p.parse_date(utc.timestamp_millis()).unwrap(), utc);
        assert_eq!(p.parse_date(utc.datetime().with_timezone(&chrono::Utc)).unwrap(), utc);
        assert_eq!(p.parse_date(vec![2024, 6, 1, 12]).unwrap(), utc);
        assert_eq!(p.parse_date(DateInput::Empty), None);
        assert_eq!(p.parse_date(""), None);
        assert_eq!(p.parse_date("not a date"), None);
    }

    #[test]
    fn parse_dates_drops_failures() {
        let p = picker(base("yyyy-MM-dd").with_multi_date(", "));
        assert_eq!(p.parse_dates(None::<Vec<&str>>), None);
        let parsed = p.parse_dates(Some(vec!["2024-01-02", "nope", "2024-01-01"])).unwrap();
        assert_eq!(parsed, vec![d(&[2024, 1, 2]), d(&[2024, 1, 1])]);
    }

    #[test]
    fn out_of_range_selection_is_discarded() {
        let mut p = picker(
            base("yyyy-MM-dd")
                .with_min_date("2024-01-10")
                .with_max_date("2024-01-20"),
        );
        p.set_date(Some(d(&[2024, 1, 5])), true);
        assert_eq!(p.date(), None);
        assert_eq!(p.input().text, "");
    }

    #[test]
    fn keep_invalid_retains_out_of_range_selection() {
        let mut p = picker(
            base("yyyy-MM-dd")
                .with_min_date("2024-01-10")
                .with_max_date("2024-01-20")
                .with_keep_invalid(true),
        );
        p.set_date(Some(d(&[2024, 1, 5])), true);
        assert_eq!(p.date(), Some(&d(&[2024, 1, 5])));
        assert!(!p.is_valid(&d(&[2024, 1, 5]), Granularity::Second));
        assert_eq!(p.input().text, "2024-01-05");
    }

    #[test]
    fn set_date_rounds_minutes() {
        let mut p = picker(base("yyyy-MM-dd HH:mm").with_minute_stepping(15));
        p.set_date(Some(d(&[2024, 1, 1, 10, 7])), true);
        assert_eq!(p.date().map(DateValue::minute), Some(0));
        p.set_date(Some(d(&[2024, 1, 1, 10, 8])), true);
        assert_eq!(p.date().map(DateValue::minute), Some(15));
        assert_eq!(p.input().text, "2024-01-01 10:15");
    }

    #[test]
    fn repeated_selection_notifies_once() {
        let mut p = picker(base("yyyy-MM-dd"));
        let events = record(&mut p);
        p.set_date(Some(d(&[2024, 3, 3])), true);
        p.set_date(Some(d(&[2024, 3, 3])), true);
        assert_eq!(events.borrow().len(), 1);
        assert_eq!(
            events.borrow()[0],
            ChangeEvent::Single {
                old: None,
                new: Some(d(&[2024, 3, 3]))
            }
        );
        p.set_date(Some(d(&[2024, 3, 4])), true);
        assert_eq!(
            events.borrow()[1],
            ChangeEvent::Single {
                old: Some(d(&[2024, 3, 3])),
                new: Some(d(&[2024, 3, 4]))
            }
        );
    }

    #[test]
    fn silent_updates_do_not_touch_the_field() {
        let mut p = picker(base("yyyy-MM-dd"));
        let events = record(&mut p);
        p.set_date(Some(d(&[2024, 3, 3])), false);
        assert_eq!(p.input().text, "");
        assert_eq!(p.date(), Some(&d(&[2024, 3, 3])));
        p.update_value();
        assert_eq!(p.input().text, "2024-03-03");
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn multi_dates_are_sorted_and_unique() {
        let mut p = picker(base("yyyy-MM-dd").with_multi_date(", ").with_max_date("2024-12-31"));
        let events = record(&mut p);
        p.set_dates(
            vec![
                d(&[2024, 5, 3]),
                d(&[2024, 1, 9]),
                d(&[2025, 1, 1]),
                d(&[2024, 5, 3]),
                d(&[2024, 2, 2]),
            ],
            true,
        );
        assert_eq!(p.dates(), &[d(&[2024, 1, 9]), d(&[2024, 2, 2]), d(&[2024, 5, 3])]);
        assert!(p.dates().windows(2).all(|w| compare::before_second(&w[0], &w[1])));
        assert_eq!(p.input().text, "2024-01-09, 2024-02-02, 2024-05-03");
        assert_eq!(events.borrow().len(), 1);
    }

    #[test]
    fn multi_date_day_toggle() {
        let mut p = picker(base("yyyy-MM-dd").with_multi_date(", "));
        p.set_dates(vec![d(&[2024, 1, 5]), d(&[2024, 1, 10])], true);
        p.toggle_date(&d(&[2024, 1, 5, 18]));
        assert_eq!(p.dates(), &[d(&[2024, 1, 10])]);
        p.set_dates(vec![d(&[2024, 1, 5]), d(&[2024, 1, 10])], true);
        p.toggle_date(&d(&[2024, 1, 7]));
        assert_eq!(p.dates(), &[d(&[2024, 1, 5]), d(&[2024, 1, 7]), d(&[2024, 1, 10])]);
    }

    #[test]
    fn initial_value_is_read_from_field() {
        let p = Picker::new(TextField::new("2024-07-04"), base("yyyy-MM-dd")).unwrap();
        assert_eq!(p.date(), Some(&d(&[2024, 7, 4])));
        assert_eq!(p.view_date(), &d(&[2024, 7, 4]));
        let p = Picker::new(
            TextField::new("2024-07-04; junk; 2024-01-01"),
            base("yyyy-MM-dd").with_multi_date("; "),
        )
        .unwrap();
        assert_eq!(p.dates(), &[d(&[2024, 1, 1]), d(&[2024, 7, 4])]);
    }

    #[test]
    fn typed_text_reverts_or_is_kept() {
        let mut p = picker(base("yyyy-MM-dd"));
        p.set_date(Some(d(&[2024, 1, 1])), true);
        p.input_mut().text = "garbage".to_string();
        p.input_changed();
        assert_eq!(p.input().text, "2024-01-01");
        assert_eq!(p.date(), Some(&d(&[2024, 1, 1])));

        let mut p = picker(base("yyyy-MM-dd").with_keep_invalid(true));
        let events = record(&mut p);
        p.set_date(Some(d(&[2024, 1, 1])), true);
        p.input_mut().text = "garbage".to_string();
        p.input_changed();
        assert_eq!(p.input().text, "garbage");
        assert_eq!(p.date(), None);
        assert_eq!(events.borrow().len(), 2);
    }

    #[test]
    fn typed_text_is_normalized() {
        let mut p = picker(base("yyyy-MM-dd").with_alt_format("d.M.yyyy"));
        let events = record(&mut p);
        p.input_mut().text = "4.7.2024".to_string();
        p.input_changed();
        assert_eq!(p.input().text, "2024-07-04");
        assert_eq!(events.borrow().len(), 1);
        p.input_mut().text = "2024-07-05".to_string();
        p.input_changed();
        assert_eq!(events.borrow().len(), 2);
        p.input_mut().text = String::new();
        p.input_changed();
        assert_eq!(p.date(), None);
        assert_eq!(events.borrow().len(), 3);
    }

    #[test]
    fn non_editable_field_ignores_selection() {
        let field = TextField {
            readonly: true,
            ..TextField::default()
        };
        let mut p = Picker::new(field.clone(), base("yyyy-MM-dd")).unwrap();
        p.set_date(Some(d(&[2024, 1, 1])), true);
        assert_eq!(p.date(), None);
        let mut p = Picker::new(field, base("yyyy-MM-dd").with_ignore_readonly(true)).unwrap();
        p.set_date(Some(d(&[2024, 1, 1])), true);
        assert_eq!(p.date(), Some(&d(&[2024, 1, 1])));
    }

    #[test]
    fn default_date_skips_to_valid_slot() {
        let p = picker(
            base("yyyy-MM-dd HH:mm")
                .with_default_date(vec![2024, 1, 1, 11, 50])
                .with_minute_stepping(30)
                .with_valid_time(|date| (9..12).contains(&date.hour()) && date.minute() == 0),
        );
        assert_eq!(p.state().default_date, d(&[2024, 1, 2, 9, 0]));
    }

    #[test]
    fn tightening_bounds_rewrites_field() {
        let mut p = picker(base("yyyy-MM-dd"));
        let events = record(&mut p);
        p.set_date(Some(d(&[2024, 1, 5])), true);
        p.set_min_date(Some("2024-01-10".into())).unwrap();
        assert_eq!(p.date(), None);
        assert_eq!(p.input().text, "");
        assert_eq!(events.borrow().len(), 1);
        let err = p.set_max_date(Some("2024-01-01".into()));
        assert!(matches!(err, Err(ConfigError::InvertedBounds { .. })));
        assert_eq!(p.constraints().max_date, None);
    }

    #[test]
    fn render_hooks_carry_view_state() {
        let mut p = picker(base("yyyy-MM-dd"));
        let signals = Rc::new(RefCell::new(Vec::new()));
        let sink = signals.clone();
        p.on_render(move |signal| sink.borrow_mut().push(signal.clone()));
        p.set_date(Some(d(&[2024, 2, 2])), true);
        assert!(signals.borrow().contains(&RenderSignal::Date {
            view_mode: ViewMode::Days,
            view_date: d(&[2024, 2, 2]),
        }));
    }

    #[test]
    fn dispose_returns_field() {
        let mut p = picker(base("yyyy-MM-dd"));
        p.set_date(Some(d(&[2024, 2, 2])), true);
        assert_eq!(p.dispose().text, "2024-02-02");
    }

    #[test]
    fn multi_dates_ignore_keep_invalid() {
        let mut p = picker(
            base("yyyy-MM-dd")
                .with_multi_date(", ")
                .with_keep_invalid(true)
                .with_max_date("2024-06-30"),
        );
        p.set_dates(vec![d(&[2024, 6, 1]), d(&[2024, 7, 1])], true);
        assert_eq!(p.dates(), &[d(&[2024, 6, 1])]);
        assert_eq!(p.input().text, "2024-06-01");
    }

    #[test]
    fn single_selection_ignored_in_multi_mode() {
        let mut p = picker(base("yyyy-MM-dd").with_multi_date(", "));
        let events = record(&mut p);
        p.set_date(Some(d(&[2024, 6, 1])), true);
        assert_eq!(p.date(), None);
        assert!(p.dates().is_empty());
        assert_eq!(p.input().text, "");
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn default_date_is_moved_into_range() {
        let p = picker(
            base("yyyy-MM-dd")
                .with_min_date("2020-01-01")
                .with_max_date("2020-12-31"),
        );
        assert_eq!(p.state().default_date, d(&[2020, 12, 31]));
        assert_eq!(p.view_date(), &d(&[2020, 12, 31]));
        let p = picker(
            base("yyyy-MM-dd")
                .with_min_date("2020-01-01")
                .with_max_date("2020-12-31")
                .with_default_date("2019-05-05"),
        );
        assert_eq!(p.state().default_date, d(&[2020, 1, 1]));
    }

    #[test]
    fn date_only_default_starts_at_midnight() {
        let p = picker(base("yyyy-MM-dd").with_default_date("2024-05-05T15:30:00Z"));
        assert_eq!(p.state().default_date, d(&[2024, 5, 5]));
        let p = picker(base("MM/yyyy").with_default_date("2024-05-05T15:30:00Z"));
        assert_eq!(p.state().default_date, d(&[2024, 5, 1]));
    }

    #[test]
    fn oversized_stepping_is_accepted() {
        let mut p = picker(base("yyyy-MM-dd HH:mm").with_minute_stepping(u32::MAX));
        p.set_date(Some(d(&[2024, 6, 1, 10, 20])), true);
        assert_eq!(p.input().text, "2024-06-01 10:00");
    }
}
