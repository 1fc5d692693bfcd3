//! Locale-derived default patterns.
//!
//! `format_to_parts` reproduces the field/literal breakdown a native
//! formatter produces for a fixed instant; the default patterns are derived
//! from that breakdown and memoized per locale for the life of the thread.

use std::cell::RefCell;

use chrono::Weekday;
use icu::locale::Locale as IcuLocale;
use icu::locale::locale;
use icu::locale::extensions::unicode::Key;
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::date_value::DEFAULT_LOCALE;
use crate::error::ConfigError;
use crate::pattern::quote_literal;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PartKind {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    DayPeriod,
    Literal,
}

impl PartKind {
    fn is_date(self) -> bool {
        matches!(self, PartKind::Year | PartKind::Month | PartKind::Day)
    }

    fn is_time(self) -> bool {
        matches!(self, PartKind::Hour | PartKind::Minute | PartKind::DayPeriod)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatePart {
    pub kind: PartKind,
    pub value: String,
}

/// Field groups requested from [`format_to_parts`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSet {
    pub date: bool,
    pub time: bool,
}

impl FieldSet {
    pub const DATE: FieldSet = FieldSet {
        date: true,
        time: false,
    };
    pub const DATE_TIME: FieldSet = FieldSet {
        date: true,
        time: true,
    };
    pub const TIME: FieldSet = FieldSet {
        date: false,
        time: true,
    };
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HourCycle {
    H11,
    H12,
    H23,
    H24,
}

impl HourCycle {
    pub fn uses_day_period(self) -> bool {
        matches!(self, HourCycle::H11 | HourCycle::H12)
    }
}

#[derive(Clone, Copy)]
enum Piece {
    Field(PartKind),
    Lit(&'static str),
}

use Piece::{Field, Lit};

const MDY_SLASH: &[Piece] = &[
    Field(PartKind::Month),
    Lit("/"),
    Field(PartKind::Day),
    Lit("/"),
    Field(PartKind::Year),
];
const DMY_SLASH: &[Piece] = &[
    Field(PartKind::Day),
    Lit("/"),
    Field(PartKind::Month),
    Lit("/"),
    Field(PartKind::Year),
];
const DMY_DOT: &[Piece] = &[
    Field(PartKind::Day),
    Lit("."),
    Field(PartKind::Month),
    Lit("."),
    Field(PartKind::Year),
];
const DMY_DASH: &[Piece] = &[
    Field(PartKind::Day),
    Lit("-"),
    Field(PartKind::Month),
    Lit("-"),
    Field(PartKind::Year),
];
const YMD_DASH: &[Piece] = &[
    Field(PartKind::Year),
    Lit("-"),
    Field(PartKind::Month),
    Lit("-"),
    Field(PartKind::Day),
];
const YMD_SLASH: &[Piece] = &[
    Field(PartKind::Year),
    Lit("/"),
    Field(PartKind::Month),
    Lit("/"),
    Field(PartKind::Day),
];
const YMD_DOT_SPACE: &[Piece] = &[
    Field(PartKind::Year),
    Lit(". "),
    Field(PartKind::Month),
    Lit(". "),
    Field(PartKind::Day),
    Lit("."),
];
const DMY_DOT_YEAR_SUFFIX: &[Piece] = &[
    Field(PartKind::Day),
    Lit("."),
    Field(PartKind::Month),
    Lit("."),
    Field(PartKind::Year),
    Lit(" г."),
];

/// Date field layout, date/time joiner, hour/minute separator and trailing
/// time suffix for a language/region pair.
struct Layout {
    date: &'static [Piece],
    joiner: &'static str,
    time_sep: &'static str,
    time_suffix: &'static str,
    period_first: bool,
}

fn layout_for(language: &str, region: Option<&str>) -> Layout {
    let mut layout = Layout {
        date: MDY_SLASH,
        joiner: ", ",
        time_sep: ":",
        time_suffix: "",
        period_first: false,
    };
    match language {
        "en" => {
            layout.date = match region {
                Some("GB" | "AU" | "NZ" | "IE" | "IN" | "ZA") => DMY_SLASH,
                Some("CA") => YMD_DASH,
                _ => MDY_SLASH,
            };
        }
        "de" | "ru" | "pl" | "tr" | "uk" | "nb" | "ro" => layout.date = DMY_DOT,
        "da" => {
            layout.date = DMY_DOT;
            layout.joiner = " ";
            layout.time_sep = ".";
        }
        "fi" => {
            layout.date = DMY_DOT;
            layout.joiner = " klo ";
            layout.time_sep = ".";
        }
        "bg" => {
            layout.date = DMY_DOT_YEAR_SUFFIX;
            layout.time_suffix = " ч.";
        }
        "fr" => {
            layout.date = DMY_SLASH;
            layout.joiner = " ";
        }
        "es" | "it" | "pt" | "el" | "vi" | "id" | "ms" => layout.date = DMY_SLASH,
        "nl" => {
            layout.date = DMY_DASH;
            layout.joiner = " ";
        }
        "sv" | "lt" => {
            layout.date = YMD_DASH;
            layout.joiner = " ";
        }
        "ja" | "zh" => {
            layout.date = YMD_SLASH;
            layout.joiner = " ";
        }
        "ko" => {
            layout.date = YMD_DOT_SPACE;
            layout.joiner = " ";
            layout.period_first = true;
        }
        "hu" => {
            layout.date = YMD_DOT_SPACE;
            layout.joiner = " ";
        }
        _ => {}
    }
    layout
}

fn extract_unicode_keyword(locale: &IcuLocale, key_str: &str) -> Option<String> {
    let key: Key = key_str.parse().ok()?;
    locale
        .extensions
        .unicode
        .keywords
        .get(&key)
        .map(|v| v.to_string())
}

fn locale_default_hour_cycle(language: &str) -> HourCycle {
    match language {
        "en" | "ar" | "ko" | "hi" | "bn" => HourCycle::H12,
        "ja" | "zh" | "de" | "fr" | "it" | "es" | "pt" | "ru" | "nl" | "sv" | "da" | "nb"
        | "fi" | "pl" | "cs" | "hu" | "ro" | "tr" | "uk" | "hr" | "sk" | "sl" | "bg"
        | "el" | "he" | "th" | "vi" | "id" | "ms" => HourCycle::H23,
        _ => HourCycle::H12,
    }
}

const H12_REGIONS: &[&str] = &[
    "US", "CA", "AU", "NZ", "PH", "IN", "EG", "SA", "CO", "PK", "MY", "KR", "MX",
];

/// Hour cycle from the `-u-hc-` keyword, else the region, else the language.
pub fn hour_cycle(locale: &IcuLocale) -> HourCycle {
    match extract_unicode_keyword(locale, "hc").as_deref() {
        Some("h11") => return HourCycle::H11,
        Some("h12") => return HourCycle::H12,
        Some("h23") => return HourCycle::H23,
        Some("h24") => return HourCycle::H24,
        _ => {}
    }
    match locale.id.region {
        Some(region) if H12_REGIONS.contains(&region.as_str()) => HourCycle::H12,
        Some(_) => HourCycle::H23,
        None => locale_default_hour_cycle(locale.id.language.as_str()),
    }
}

pub fn parse_locale(tag: &str) -> Result<IcuLocale, ConfigError> {
    tag.parse::<IcuLocale>()
        .map_err(|_| ConfigError::InvalidLocale(tag.to_string()))
}

fn parse_or_default(tag: &str) -> IcuLocale {
    parse_locale(tag).unwrap_or_else(|_| locale!("en-US"))
}

/// Host locale from `LC_ALL`, `LC_TIME` or `LANG` (`de_DE.UTF-8` becomes
/// `de-DE`); `C`, `POSIX` and unparsable values fall back to `en-US`.
pub fn host_locale() -> String {
    let raw = ["LC_ALL", "LC_TIME", "LANG"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|v| !v.is_empty());
    let Some(raw) = raw else {
        return DEFAULT_LOCALE.to_string();
    };
    let base = raw.split(['.', '@']).next().unwrap_or_default().replace('_', "-");
    if base == "C" || base == "POSIX" || parse_locale(&base).is_err() {
        return DEFAULT_LOCALE.to_string();
    }
    base
}

/// Canonical tag for an explicit locale, or the host locale.
pub fn resolve_locale(tag: Option<&str>) -> Result<String, ConfigError> {
    match tag {
        Some(tag) => Ok(parse_locale(tag)?.to_string()),
        None => Ok(host_locale()),
    }
}

// 2000-11-22 13:44
const SAMPLE: (i32, u32, u32, u32, u32) = (2000, 11, 22, 13, 44);

fn sample_value(kind: PartKind, cycle: HourCycle) -> String {
    let (year, month, day, hour, minute) = SAMPLE;
    match kind {
        PartKind::Year => year.to_string(),
        PartKind::Month => format!("{month:02}"),
        PartKind::Day => format!("{day:02}"),
        PartKind::Hour => {
            let h = match cycle {
                HourCycle::H12 => match hour % 12 {
                    0 => 12,
                    h => h,
                },
                HourCycle::H11 => hour % 12,
                HourCycle::H23 => hour,
                HourCycle::H24 => {
                    if hour == 0 {
                        24
                    } else {
                        hour
                    }
                }
            };
            format!("{h:02}")
        }
        PartKind::Minute => format!("{minute:02}"),
        PartKind::DayPeriod => (if hour < 12 { "AM" } else { "PM" }).to_string(),
        PartKind::Literal => String::new(),
    }
}

fn push_part(parts: &mut Vec<DatePart>, kind: PartKind, value: String) {
    if value.is_empty() {
        return;
    }
    if kind == PartKind::Literal
        && let Some(last) = parts.last_mut()
        && last.kind == PartKind::Literal
    {
        last.value.push_str(&value);
        return;
    }
    parts.push(DatePart { kind, value });
}

/// Ordered field and literal parts for 2000-11-22 13:44 in `locale`, with
/// two-digit month, day, hour and minute. Adjacent literals are merged.
pub fn format_to_parts(locale: &str, fields: FieldSet) -> Vec<DatePart> {
    let locale = parse_or_default(locale);
    let region = locale.id.region.map(|r| r.to_string());
    let layout = layout_for(locale.id.language.as_str(), region.as_deref());
    let cycle = hour_cycle(&locale);
    let mut parts: Vec<DatePart> = Vec::new();

    if fields.date {
        for piece in layout.date {
            match *piece {
                Field(kind) => push_part(&mut parts, kind, sample_value(kind, cycle)),
                Lit(text) => push_part(&mut parts, PartKind::Literal, text.to_string()),
            }
        }
    }
    if fields.date && fields.time {
        push_part(&mut parts, PartKind::Literal, layout.joiner.to_string());
    }
    if fields.time {
        let period = cycle.uses_day_period();
        if period && layout.period_first {
            push_part(&mut parts, PartKind::DayPeriod, sample_value(PartKind::DayPeriod, cycle));
            push_part(&mut parts, PartKind::Literal, " ".to_string());
        }
        push_part(&mut parts, PartKind::Hour, sample_value(PartKind::Hour, cycle));
        push_part(&mut parts, PartKind::Literal, layout.time_sep.to_string());
        push_part(&mut parts, PartKind::Minute, sample_value(PartKind::Minute, cycle));
        if period && !layout.period_first {
            push_part(&mut parts, PartKind::Literal, " ".to_string());
            push_part(&mut parts, PartKind::DayPeriod, sample_value(PartKind::DayPeriod, cycle));
        }
        push_part(&mut parts, PartKind::Literal, layout.time_suffix.to_string());
    }
    parts
}

fn parts_to_pattern(parts: &[DatePart], hour12: bool) -> String {
    let mut pattern = String::new();
    for (idx, part) in parts.iter().enumerate() {
        let token = match part.kind {
            PartKind::Year => "yyyy",
            PartKind::Month => "MM",
            PartKind::Day => "dd",
            PartKind::Hour if hour12 => "hh",
            PartKind::Hour => "HH",
            PartKind::Minute => "mm",
            PartKind::DayPeriod => "a",
            PartKind::Literal => {
                // Literals are merged, so the neighbours are fields.
                let between_groups = idx > 0
                    && parts[idx - 1].kind.is_date()
                    && parts.get(idx + 1).is_some_and(|next| next.kind.is_time());
                if between_groups {
                    pattern.push_str(&quote_literal(&part.value.replace(", ", " ")));
                } else {
                    pattern.push_str(&quote_literal(&part.value));
                }
                continue;
            }
        };
        pattern.push_str(token);
    }
    pattern
}

thread_local! {
    static DAY_PERIOD_CACHE: RefCell<FxHashMap<String, bool>> = RefCell::new(FxHashMap::default());
    static DATE_FORMAT_CACHE: RefCell<FxHashMap<String, String>> = RefCell::new(FxHashMap::default());
    static FORMAT_CACHE: RefCell<FxHashMap<(String, bool), String>> = RefCell::new(FxHashMap::default());
}

fn memoize<K, V>(
    cache: &'static std::thread::LocalKey<RefCell<FxHashMap<K, V>>>,
    key: K,
    compute: impl FnOnce() -> V,
) -> V
where
    K: std::hash::Hash + Eq,
    V: Clone,
{
    if let Some(hit) = cache.with(|c| c.borrow().get(&key).cloned()) {
        return hit;
    }
    let value = compute();
    cache.with(|c| c.borrow_mut().insert(key, value.clone()));
    value
}

/// Whether formatting an hour in `locale` yields an AM/PM marker.
pub fn check_day_period(locale: &str) -> bool {
    memoize(&DAY_PERIOD_CACHE, locale.to_string(), || {
        let has = format_to_parts(locale, FieldSet::TIME)
            .iter()
            .any(|p| p.kind == PartKind::DayPeriod);
        trace!(locale, has, "resolved day period");
        has
    })
}

/// Year/month/day pattern for `locale`.
pub fn default_date_format(locale: &str) -> String {
    memoize(&DATE_FORMAT_CACHE, locale.to_string(), || {
        let pattern = parts_to_pattern(&format_to_parts(locale, FieldSet::DATE), false);
        trace!(locale, %pattern, "resolved default date format");
        pattern
    })
}

/// Year/month/day/hour/minute pattern for `locale`; the hour is `hh` when
/// `has_day_period`, `HH` otherwise.
pub fn default_format(locale: &str, has_day_period: bool) -> String {
    memoize(&FORMAT_CACHE, (locale.to_string(), has_day_period), || {
        let pattern = parts_to_pattern(&format_to_parts(locale, FieldSet::DATE_TIME), has_day_period);
        trace!(locale, %pattern, "resolved default format");
        pattern
    })
}

fn weekday_from_icu(wd: icu::calendar::types::Weekday) -> Weekday {
    use icu::calendar::types::Weekday as W;
    match wd {
        W::Monday => Weekday::Mon,
        W::Tuesday => Weekday::Tue,
        W::Wednesday => Weekday::Wed,
        W::Thursday => Weekday::Thu,
        W::Friday => Weekday::Fri,
        W::Saturday => Weekday::Sat,
        W::Sunday => Weekday::Sun,
    }
}

/// First day of the week in `locale`, Monday when unknown.
pub fn first_weekday(locale: &str) -> Weekday {
    let locale = parse_or_default(locale);
    icu::calendar::week::WeekInformation::try_new((&locale).into())
        .map(|info| weekday_from_icu(info.first_weekday))
        .unwrap_or(Weekday::Mon)
}

/// Weekend days in `locale`, Saturday and Sunday when unknown.
pub fn weekend(locale: &str) -> Vec<Weekday> {
    use icu::calendar::types::Weekday as W;
    let locale = parse_or_default(locale);
    match icu::calendar::week::WeekInformation::try_new((&locale).into()) {
        Ok(info) => [
            W::Monday,
            W::Tuesday,
            W::Wednesday,
            W::Thursday,
            W::Friday,
            W::Saturday,
            W::Sunday,
        ]
        .into_iter()
        .filter(|wd| info.weekend.contains(*wd))
        .map(weekday_from_icu)
        .collect(),
        Err(_) => vec![Weekday::Sat, Weekday::Sun],
    }
}
