use std::fmt;
use std::rc::Rc;

use crate::components::ViewMode;
use crate::date_value::DateValue;
use crate::input::DateInput;
use crate::validity::{Predicate, Predicates};

/// Picker configuration. Unset values are derived when the picker is built:
/// the format from the locale, the locale from the host, the zone from the
/// host.
#[derive(Clone)]
pub struct PickerOptions {
    /// Display and parse pattern.
    pub format: Option<String>,
    /// Tried in order after `format` when parsing typed text.
    pub alt_formats: Vec<String>,
    pub locale: Option<String>,
    /// IANA zone name.
    pub time_zone: Option<String>,
    pub default_date: Option<DateInput>,
    pub min_date: Option<DateInput>,
    pub max_date: Option<DateInput>,
    pub multi_date: bool,
    pub multi_date_separator: String,
    pub minute_stepping: u32,
    /// Select the default date when the picker opens with no selection.
    pub use_current: bool,
    /// Keep unparsable or out-of-range values instead of discarding them.
    pub keep_invalid: bool,
    /// Stay open after a date is picked.
    pub keep_open: bool,
    /// Calendar and clock are shown together.
    pub side_by_side: bool,
    /// Allow edits through a read-only field.
    pub ignore_readonly: bool,
    pub is_valid_year: Option<Predicate>,
    pub is_valid_month: Option<Predicate>,
    pub is_valid_day: Option<Predicate>,
    pub is_valid_time: Option<Predicate>,
    /// Coarsest grid at which a click selects instead of drilling down. Can
    /// only make selection coarser than the format allows.
    pub min_view: Option<ViewMode>,
}

impl Default for PickerOptions {
    fn default() -> Self {
        Self {
            format: None,
            alt_formats: Vec::new(),
            locale: None,
            time_zone: None,
            default_date: None,
            min_date: None,
            max_date: None,
            multi_date: false,
            multi_date_separator: ", ".to_string(),
            minute_stepping: 1,
            use_current: true,
            keep_invalid: false,
            keep_open: false,
            side_by_side: false,
            ignore_readonly: false,
            is_valid_year: None,
            is_valid_month: None,
            is_valid_day: None,
            is_valid_time: None,
            min_view: None,
        }
    }
}

impl PickerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_alt_format(mut self, format: impl Into<String>) -> Self {
        self.alt_formats.push(format.into());
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn with_time_zone(mut self, zone: impl Into<String>) -> Self {
        self.time_zone = Some(zone.into());
        self
    }

    pub fn with_default_date(mut self, date: impl Into<DateInput>) -> Self {
        self.default_date = Some(date.into());
        self
    }

    pub fn with_min_date(mut self, date: impl Into<DateInput>) -> Self {
        self.min_date = Some(date.into());
        self
    }

    pub fn with_max_date(mut self, date: impl Into<DateInput>) -> Self {
        self.max_date = Some(date.into());
        self
    }

    pub fn with_multi_date(mut self, separator: impl Into<String>) -> Self {
        self.multi_date = true;
        self.multi_date_separator = separator.into();
        self
    }

    pub fn with_minute_stepping(mut self, stepping: u32) -> Self {
        self.minute_stepping = stepping;
        self
    }

    pub fn with_use_current(mut self, use_current: bool) -> Self {
        self.use_current = use_current;
        self
    }

    pub fn with_keep_invalid(mut self, keep_invalid: bool) -> Self {
        self.keep_invalid = keep_invalid;
        self
    }

    pub fn with_keep_open(mut self, keep_open: bool) -> Self {
        self.keep_open = keep_open;
        self
    }

    pub fn with_side_by_side(mut self, side_by_side: bool) -> Self {
        self.side_by_side = side_by_side;
        self
    }

    pub fn with_ignore_readonly(mut self, ignore_readonly: bool) -> Self {
        self.ignore_readonly = ignore_readonly;
        self
    }

    pub fn with_min_view(mut self, view: ViewMode) -> Self {
        self.min_view = Some(view);
        self
    }

    pub fn with_valid_year(mut self, accept: impl Fn(&DateValue) -> bool + 'static) -> Self {
        self.is_valid_year = Some(Rc::new(accept));
        self
    }

    pub fn with_valid_month(mut self, accept: impl Fn(&DateValue) -> bool + 'static) -> Self {
        self.is_valid_month = Some(Rc::new(accept));
        self
    }

    pub fn with_valid_day(mut self, accept: impl Fn(&DateValue) -> bool + 'static) -> Self {
        self.is_valid_day = Some(Rc::new(accept));
        self
    }

    pub fn with_valid_time(mut self, accept: impl Fn(&DateValue) -> bool + 'static) -> Self {
        self.is_valid_time = Some(Rc::new(accept));
        self
    }

    pub(crate) fn predicates(&self) -> Predicates {
        Predicates {
            year: self.is_valid_year.clone(),
            month: self.is_valid_month.clone(),
            day: self.is_valid_day.clone(),
            time: self.is_valid_time.clone(),
        }
    }
}

impl fmt::Debug for PickerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PickerOptions")
            .field("format", &self.format)
            .field("alt_formats", &self.alt_formats)
            .field("locale", &self.locale)
            .field("time_zone", &self.time_zone)
            .field("default_date", &self.default_date)
            .field("min_date", &self.min_date)
            .field("max_date", &self.max_date)
            .field("multi_date", &self.multi_date)
            .field("multi_date_separator", &self.multi_date_separator)
            .field("minute_stepping", &self.minute_stepping)
            .field("use_current", &self.use_current)
            .field("keep_invalid", &self.keep_invalid)
            .field("keep_open", &self.keep_open)
            .field("side_by_side", &self.side_by_side)
            .field("ignore_readonly", &self.ignore_readonly)
            .field("predicates", &self.predicates())
            .field("min_view", &self.min_view)
            .finish()
    }
}
