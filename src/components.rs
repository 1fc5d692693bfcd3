use crate::error::ConfigError;
use crate::pattern::{self, Field};

/// Calendar grid shown by the picker, coarsest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ViewMode {
    Years,
    Months,
    Days,
}

impl ViewMode {
    pub fn parse(name: &str) -> Option<ViewMode> {
        match name {
            "years" => Some(ViewMode::Years),
            "months" => Some(ViewMode::Months),
            "days" => Some(ViewMode::Days),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ViewMode::Years => "years",
            ViewMode::Months => "months",
            ViewMode::Days => "days",
        }
    }
}

/// Which temporal components a pattern carries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FormatComponents {
    pub has_year: bool,
    pub has_month: bool,
    pub has_date: bool,
    pub has_hours: bool,
    pub has_minutes: bool,
    pub has_seconds: bool,
}

impl FormatComponents {
    pub fn detect(format: &str) -> Self {
        let mut components = FormatComponents::default();
        for token in pattern::tokenize(format) {
            match token.field() {
                Some(Field::Year) => components.has_year = true,
                Some(Field::Month) => components.has_month = true,
                Some(Field::Day) => components.has_date = true,
                Some(Field::Hour) => components.has_hours = true,
                Some(Field::Minute) => components.has_minutes = true,
                Some(Field::Second) => components.has_seconds = true,
                Some(Field::DayPeriod) | None => {}
            }
        }
        components
    }

    /// Reject patterns the picker cannot navigate: a day needs a month, a
    /// month needs a year, minutes need hours, a dated time needs a day, and
    /// multi-date selection cannot carry a time.
    pub fn validate(&self, format: &str, multi_date: bool) -> Result<(), ConfigError> {
        if !self.has_calendar() && !self.has_time() {
            return Err(ConfigError::EmptyFormat(format.to_string()));
        }
        if self.has_date && !self.has_month {
            return Err(ConfigError::DayWithoutMonth(format.to_string()));
        }
        if self.has_month && !self.has_year {
            return Err(ConfigError::MonthWithoutYear(format.to_string()));
        }
        if self.has_minutes && !self.has_hours {
            return Err(ConfigError::MinutesWithoutHours(format.to_string()));
        }
        if self.has_hours && self.has_year && !self.has_date {
            return Err(ConfigError::HoursWithoutDate(format.to_string()));
        }
        if self.has_hours && multi_date {
            return Err(ConfigError::MultiDateWithTime(format.to_string()));
        }
        Ok(())
    }

    pub fn has_calendar(&self) -> bool {
        self.has_year || self.has_month || self.has_date
    }

    pub fn has_time(&self) -> bool {
        self.has_hours || self.has_minutes || self.has_seconds
    }

    /// Finest calendar grid the format can select in, `None` for time-only
    /// formats.
    pub fn min_view(&self) -> Option<ViewMode> {
        if self.has_date {
            Some(ViewMode::Days)
        } else if self.has_month {
            Some(ViewMode::Months)
        } else if self.has_year {
            Some(ViewMode::Years)
        } else {
            None
        }
    }
}
