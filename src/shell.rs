//! Command language of the terminal driver and text rendering of the picker.

use std::fmt::Write as _;

use datepick::grid::{self, GRID_COLUMNS};
use datepick::pattern;
use datepick::{
    ChangeEvent, ConfigError, DateInput, DateValue, Key, Picker, TextField, TimeViewMode, ViewMode,
};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShellError {
    #[error("unknown command `{0}`, try `help`")]
    UnknownCommand(String),
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    #[error("invalid argument `{1}` for `{0}`")]
    InvalidArgument(&'static str, String),
    #[error("cannot read `{0}` as a date")]
    UnparsableDate(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Replace the field text as if the user typed it.
    Type(String),
    Set(String),
    Toggle(String),
    Clear,
    Today,
    Open,
    Close,
    View(ViewMode),
    Prev,
    Next,
    Year(i32),
    Month(u32),
    Day(u32),
    Key(Key),
    Clock,
    Calendar,
    TimeView(Option<TimeViewMode>),
    Hour(u32),
    Minute(u32),
    HourUp,
    HourDown,
    MinuteUp,
    MinuteDown,
    Period,
    Min(Option<String>),
    Max(Option<String>),
    Stepping(u32),
    Show,
    Value,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  type <text>        edit the field and commit it
  set <date>         select a date       toggle <date>   multi-date toggle
  clear | today      clear or select today
  open | close       show or hide the picker
  view years|months|days, prev, next
  year <n> | month <n> | day <n>   click a calendar cell
  key left|right|up|down|pageup|pagedown|home|end|enter|escape
  clock | calendar | hours | minutes | face
  hour <n> | minute <n> | +h | -h | +m | -m | ampm
  min <date|none> | max <date|none> | stepping <n>
  show | value | help | quit";

fn arg<'a>(name: &'static str, rest: &'a str) -> Result<&'a str, ShellError> {
    if rest.is_empty() {
        Err(ShellError::MissingArgument(name))
    } else {
        Ok(rest)
    }
}

fn number<T: std::str::FromStr>(name: &'static str, rest: &str) -> Result<T, ShellError> {
    arg(name, rest)?
        .parse()
        .map_err(|_| ShellError::InvalidArgument(name, rest.to_string()))
}

fn bound(rest: &str) -> Option<String> {
    match rest {
        "" | "none" => None,
        text => Some(text.to_string()),
    }
}

fn parse_key(name: &str) -> Option<Key> {
    Some(match name {
        "left" => Key::Left,
        "right" => Key::Right,
        "up" => Key::Up,
        "down" => Key::Down,
        "pageup" => Key::PageUp,
        "pagedown" => Key::PageDown,
        "home" => Key::Home,
        "end" => Key::End,
        "enter" => Key::Enter,
        "escape" | "esc" => Key::Escape,
        _ => return None,
    })
}

impl Command {
    pub fn parse(line: &str) -> Result<Command, ShellError> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(word, rest)| (word, rest.trim()));
        Ok(match word {
            "type" => Command::Type(rest.to_string()),
            "set" => Command::Set(arg("set", rest)?.to_string()),
            "toggle" => Command::Toggle(arg("toggle", rest)?.to_string()),
            "clear" => Command::Clear,
            "today" => Command::Today,
            "open" => Command::Open,
            "close" => Command::Close,
            "view" => Command::View(
                ViewMode::parse(arg("view", rest)?)
                    .ok_or_else(|| ShellError::InvalidArgument("view", rest.to_string()))?,
            ),
            "prev" => Command::Prev,
            "next" => Command::Next,
            "year" => Command::Year(number("year", rest)?),
            "month" => Command::Month(number("month", rest)?),
            "day" => Command::Day(number("day", rest)?),
            "key" => Command::Key(
                parse_key(arg("key", rest)?)
                    .ok_or_else(|| ShellError::InvalidArgument("key", rest.to_string()))?,
            ),
            "clock" => Command::Clock,
            "calendar" => Command::Calendar,
            "hours" => Command::TimeView(Some(TimeViewMode::Hours)),
            "minutes" => Command::TimeView(Some(TimeViewMode::Minutes)),
            "face" => Command::TimeView(None),
            "hour" => Command::Hour(number("hour", rest)?),
            "minute" => Command::Minute(number("minute", rest)?),
            "+h" => Command::HourUp,
            "-h" => Command::HourDown,
            "+m" => Command::MinuteUp,
            "-m" => Command::MinuteDown,
            "ampm" => Command::Period,
            "min" => Command::Min(bound(rest)),
            "max" => Command::Max(bound(rest)),
            "stepping" => Command::Stepping(number("stepping", rest)?),
            "show" => Command::Show,
            "value" => Command::Value,
            "help" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(ShellError::UnknownCommand(other.to_string())),
        })
    }
}

/// Run one command, returning the text to print.
pub fn execute(picker: &mut Picker, command: Command) -> Result<String, ShellError> {
    match command {
        Command::Type(text) => {
            picker.input_mut().text = text;
            picker.input_changed();
            return Ok(picker.input().text.clone());
        }
        Command::Set(text) => {
            let date = picker
                .parse_date(text.as_str())
                .ok_or(ShellError::UnparsableDate(text))?;
            if picker.is_multi() {
                let mut dates = picker.dates().to_vec();
                dates.push(date);
                picker.set_dates(dates, true);
            } else {
                picker.set_date(Some(date), true);
            }
        }
        Command::Toggle(text) => {
            let date = picker
                .parse_date(text.as_str())
                .ok_or(ShellError::UnparsableDate(text))?;
            picker.toggle_date(&date);
        }
        Command::Clear => picker.clear(),
        Command::Today => picker.select_today(),
        Command::Open => picker.open(),
        Command::Close => picker.close(),
        Command::View(view) => picker.change_view(view, None),
        Command::Prev => {
            let unit = picker.nav_unit();
            picker.prev(unit, 1);
        }
        Command::Next => {
            let unit = picker.nav_unit();
            picker.next(unit, 1);
        }
        Command::Year(year) => picker.select_year(year),
        Command::Month(month) => picker.select_month(month),
        Command::Day(day) => {
            let date = picker
                .view_date()
                .with_day(day)
                .ok_or_else(|| ShellError::InvalidArgument("day", day.to_string()))?;
            picker.select_day(&date);
        }
        Command::Key(key) => {
            picker.handle_key(key);
        }
        Command::Clock => picker.show_clock(),
        Command::Calendar => picker.show_calendar(),
        Command::TimeView(mode) => picker.change_time_view(mode),
        Command::Hour(hour) => {
            picker.set_hour(hour);
        }
        Command::Minute(minute) => {
            picker.set_minute(minute);
        }
        Command::HourUp => {
            picker.increment_hour();
        }
        Command::HourDown => {
            picker.decrement_hour();
        }
        Command::MinuteUp => {
            picker.increment_minute();
        }
        Command::MinuteDown => {
            picker.decrement_minute();
        }
        Command::Period => {
            picker.toggle_period();
        }
        Command::Min(bound) => picker.set_min_date(bound.map(DateInput::from))?,
        Command::Max(bound) => picker.set_max_date(bound.map(DateInput::from))?,
        Command::Stepping(stepping) => picker.set_minute_stepping(stepping)?,
        Command::Value => return Ok(picker.input().text.clone()),
        Command::Help => return Ok(HELP.to_string()),
        Command::Show | Command::Quit => {}
    }
    Ok(render(picker))
}

pub fn describe_change(event: &ChangeEvent, format: &str) -> String {
    let one = |date: &Option<DateValue>| {
        date.as_ref()
            .map_or_else(|| "-".to_string(), |date| date.format(format))
    };
    let many = |dates: &[DateValue]| {
        let list: Vec<String> = dates.iter().map(|date| date.format(format)).collect();
        format!("[{}]", list.join(", "))
    };
    match event {
        ChangeEvent::Single { old, new } => format!("change: {} -> {}", one(old), one(new)),
        ChangeEvent::Multi { old, new } => format!("change: {} -> {}", many(old), many(new)),
    }
}

fn cell(text: &str, selected: bool, marked: bool, disabled: bool) -> String {
    if selected {
        format!("[{text}]")
    } else if disabled {
        format!("-{text}-")
    } else if marked {
        format!("({text})")
    } else {
        format!(" {text} ")
    }
}

fn title(picker: &Picker) -> String {
    let view = picker.view_date();
    match picker.state().view_mode {
        ViewMode::Days => format!("{} {}", pattern::month_name_long(view.month()), view.year()),
        ViewMode::Months => view.year().to_string(),
        ViewMode::Years => {
            let start = grid::decade_start(view.year());
            format!("{}-{}", start, start + 9)
        }
    }
}

fn render_calendar(picker: &Picker, out: &mut String) {
    let nav = picker.navigation();
    let _ = writeln!(
        out,
        "{} {:^22} {}",
        if nav.prev { '<' } else { ' ' },
        title(picker),
        if nav.next { '>' } else { ' ' }
    );
    match picker.state().view_mode {
        ViewMode::Days => {
            let header: Vec<String> = grid::weekday_header(picker.locale())
                .iter()
                .map(|day| format!(" {} ", &day.to_string()[..2]))
                .collect();
            let _ = writeln!(out, "{}", header.concat());
            for week in grid::day_grid(picker).chunks(7) {
                let row: Vec<String> = week
                    .iter()
                    .map(|c| {
                        let text = if c.other_month {
                            "  ".to_string()
                        } else {
                            format!("{:>2}", c.date.day())
                        };
                        cell(&text, c.selected, c.today, c.disabled)
                    })
                    .collect();
                let _ = writeln!(out, "{}", row.concat());
            }
        }
        ViewMode::Months => {
            for row in grid::month_grid(picker).chunks(GRID_COLUMNS as usize) {
                let row: Vec<String> = row
                    .iter()
                    .map(|c| cell(c.label, c.selected, false, c.disabled))
                    .collect();
                let _ = writeln!(out, "{}", row.join(" "));
            }
        }
        ViewMode::Years => {
            for row in grid::year_grid(picker).chunks(GRID_COLUMNS as usize) {
                let row: Vec<String> = row
                    .iter()
                    .map(|c| cell(&c.date.year().to_string(), c.selected, c.other_decade, c.disabled))
                    .collect();
                let _ = writeln!(out, "{}", row.join(" "));
            }
        }
    }
}

fn render_clock(picker: &Picker, out: &mut String) {
    let base = picker
        .date()
        .cloned()
        .unwrap_or_else(|| picker.state().default_date.clone());
    let _ = writeln!(out, "time {:02}:{:02}", base.hour(), base.minute());
    let cells = match picker.state().time_view_mode {
        None => return,
        Some(TimeViewMode::Hours) => grid::hour_grid(picker),
        Some(TimeViewMode::Minutes) => grid::minute_grid(picker),
    };
    for row in cells.chunks(6) {
        let row: Vec<String> = row
            .iter()
            .map(|c| cell(&format!("{:02}", c.value), c.selected, false, c.disabled))
            .collect();
        let _ = writeln!(out, "{}", row.concat());
    }
}

/// Text rendering of the visible panes and the field.
pub fn render(picker: &Picker) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "field: {}", picker.input().text);
    let state = picker.state();
    if !state.is_open {
        return out;
    }
    let components = picker.components();
    let side_by_side = picker.options().side_by_side;
    if components.has_calendar() && (side_by_side || !state.showing_clock) {
        render_calendar(picker, &mut out);
    }
    if components.has_time() && (side_by_side || state.showing_clock) {
        render_clock(picker, &mut out);
    }
    out
}

/// Picker over an in-memory field, as the driver builds it.
pub fn bind(text: &str, options: datepick::PickerOptions) -> Result<Picker, ConfigError> {
    Picker::new(TextField::new(text), options)
}
