//! State and validation engine for a date/time picker.
//!
//! The crate parses and formats dates through locale-derived patterns,
//! keeps a single or multi-date selection, enforces bounds and predicates at
//! year, month, day or second granularity, and drives the calendar and clock
//! views. Rendering is left to the caller; see [`grid`] for the render model.

pub mod compare;
pub mod components;
pub mod date_value;
pub mod error;
pub mod grid;
pub mod input;
pub mod locale;
pub mod options;
pub mod pattern;
pub mod picker;
pub mod validity;

pub use compare::Granularity;
pub use components::{FormatComponents, ViewMode};
pub use date_value::{DateValue, Unit};
pub use error::{ConfigError, PatternError};
pub use input::DateInput;
pub use options::PickerOptions;
pub use picker::{
    BoundInput, ChangeEvent, Key, NavUnit, Navigation, Picker, PickerState, RenderSignal,
    TextField, TimeViewMode,
};
