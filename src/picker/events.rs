use crate::components::ViewMode;
use crate::date_value::DateValue;

/// The text field a picker is attached to.
pub trait BoundInput {
    fn value(&self) -> String;
    fn set_value(&mut self, value: &str);

    fn is_disabled(&self) -> bool {
        false
    }

    fn is_readonly(&self) -> bool {
        false
    }
}

/// In-memory field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextField {
    pub text: String,
    pub disabled: bool,
    pub readonly: bool,
}

impl TextField {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

impl BoundInput for TextField {
    fn value(&self) -> String {
        self.text.clone()
    }

    fn set_value(&mut self, value: &str) {
        self.text = value.to_string();
    }

    fn is_disabled(&self) -> bool {
        self.disabled
    }

    fn is_readonly(&self) -> bool {
        self.readonly
    }
}

/// Emitted when the formatted value of the field actually changes. Both
/// sides are snapshots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChangeEvent {
    Single {
        old: Option<DateValue>,
        new: Option<DateValue>,
    },
    Multi {
        old: Vec<DateValue>,
        new: Vec<DateValue>,
    },
}

/// Clock sub-view; `None` in [`RenderSignal::Time`] is the clock face.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimeViewMode {
    Hours,
    Minutes,
}

impl TimeViewMode {
    pub fn name(self) -> &'static str {
        match self {
            TimeViewMode::Hours => "hours",
            TimeViewMode::Minutes => "minutes",
        }
    }
}

/// Redraw requests for the presentation layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderSignal {
    Date {
        view_mode: ViewMode,
        view_date: DateValue,
    },
    Time {
        time_view_mode: Option<TimeViewMode>,
        view_date: DateValue,
    },
}
