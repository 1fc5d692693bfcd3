//! Lexer, formatter and parser for display patterns such as `yyyy-MM-dd HH:mm`.
//!
//! Letters from the token alphabet (`y M d H h m s a`) form tokens by run
//! length; any other character is literal. Text inside single quotes is
//! literal and `''` produces a single quote.

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::error::PatternError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    Year,      // y
    Year2,     // yy
    Year4,     // yyyy
    Month,     // M
    Month2,    // MM
    MonthShort, // MMM
    MonthLong, // MMMM
    Day,       // d
    Day2,      // dd
    Hour24,    // H
    Hour24Pad, // HH
    Hour12,    // h
    Hour12Pad, // hh
    Minute,    // m
    Minute2,   // mm
    Second,    // s
    Second2,   // ss
    DayPeriod, // a
    Literal(String),
}

/// Calendar or clock field a token reads or writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    DayPeriod,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Year => "year",
            Field::Month => "month",
            Field::Day => "day",
            Field::Hour => "hour",
            Field::Minute => "minute",
            Field::Second => "second",
            Field::DayPeriod => "day period",
        };
        f.write_str(name)
    }
}

impl Token {
    pub fn field(&self) -> Option<Field> {
        match self {
            Token::Year | Token::Year2 | Token::Year4 => Some(Field::Year),
            Token::Month | Token::Month2 | Token::MonthShort | Token::MonthLong => {
                Some(Field::Month)
            }
            Token::Day | Token::Day2 => Some(Field::Day),
            Token::Hour24 | Token::Hour24Pad | Token::Hour12 | Token::Hour12Pad => {
                Some(Field::Hour)
            }
            Token::Minute | Token::Minute2 => Some(Field::Minute),
            Token::Second | Token::Second2 => Some(Field::Second),
            Token::DayPeriod => Some(Field::DayPeriod),
            Token::Literal(_) => None,
        }
    }

    fn from_run(ch: char, len: usize) -> Option<Token> {
        let token = match (ch, len) {
            ('y', 1) => Token::Year,
            ('y', 2) => Token::Year2,
            ('y', _) => Token::Year4,
            ('M', 1) => Token::Month,
            ('M', 2) => Token::Month2,
            ('M', 3) => Token::MonthShort,
            ('M', _) => Token::MonthLong,
            ('d', 1) => Token::Day,
            ('d', _) => Token::Day2,
            ('H', 1) => Token::Hour24,
            ('H', _) => Token::Hour24Pad,
            ('h', 1) => Token::Hour12,
            ('h', _) => Token::Hour12Pad,
            ('m', 1) => Token::Minute,
            ('m', _) => Token::Minute2,
            ('s', 1) => Token::Second,
            ('s', _) => Token::Second2,
            ('a', _) => Token::DayPeriod,
            _ => return None,
        };
        Some(token)
    }
}

pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(pattern: &'a str) -> Self {
        Self {
            chars: pattern.chars().peekable(),
        }
    }

    pub fn tokenize_all(mut self) -> Vec<Token> {
        let mut tokens: Vec<Token> = Vec::new();
        while let Some(ch) = self.chars.next() {
            if ch == '\'' {
                let text = self.read_quoted();
                push_literal(&mut tokens, &text);
                continue;
            }
            let mut len = 1;
            while self.chars.peek() == Some(&ch) {
                self.chars.next();
                len += 1;
            }
            match Token::from_run(ch, len) {
                Some(token) => tokens.push(token),
                None => push_literal(&mut tokens, &ch.to_string().repeat(len)),
            }
        }
        tokens
    }

    // Opening quote already consumed. An unterminated quote runs to the end.
    fn read_quoted(&mut self) -> String {
        let mut text = String::new();
        if self.chars.peek() == Some(&'\'') {
            self.chars.next();
            return "'".to_string();
        }
        while let Some(ch) = self.chars.next() {
            if ch == '\'' {
                if self.chars.peek() == Some(&'\'') {
                    self.chars.next();
                    text.push('\'');
                    continue;
                }
                break;
            }
            text.push(ch);
        }
        text
    }
}

fn push_literal(tokens: &mut Vec<Token>, text: &str) {
    if let Some(Token::Literal(prev)) = tokens.last_mut() {
        prev.push_str(text);
    } else {
        tokens.push(Token::Literal(text.to_string()));
    }
}

pub fn tokenize(pattern: &str) -> Vec<Token> {
    Lexer::new(pattern).tokenize_all()
}

/// Quote a literal so that it survives a round trip through [`tokenize`].
/// Alphabetic runs are wrapped in single quotes, quotes are doubled.
pub fn quote_literal(text: &str) -> String {
    let mut out = String::new();
    let mut in_quote = false;
    for ch in text.chars() {
        if ch == '\'' {
            out.push_str("''");
            continue;
        }
        if ch.is_alphabetic() != in_quote {
            out.push('\'');
            in_quote = !in_quote;
        }
        out.push(ch);
    }
    if in_quote {
        out.push('\'');
    }
    out
}

pub fn month_name_long(m: u32) -> &'static str {
    match m {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        _ => "December",
    }
}

pub fn month_name_short(m: u32) -> &'static str {
    &month_name_long(m)[..3]
}

fn format_2digit(n: u32) -> String {
    format!("{:02}", n % 100)
}

pub fn format_tokens(tokens: &[Token], dt: &NaiveDateTime) -> String {
    let mut out = String::new();
    let hour12 = match dt.hour() % 12 {
        0 => 12,
        h => h,
    };
    for token in tokens {
        match token {
            Token::Year => out.push_str(&dt.year().to_string()),
            Token::Year2 => out.push_str(&format_2digit(dt.year().unsigned_abs())),
            Token::Year4 => {
                if dt.year() < 0 {
                    out.push_str(&format!("-{:04}", dt.year().unsigned_abs()));
                } else {
                    out.push_str(&format!("{:04}", dt.year()));
                }
            }
            Token::Month => out.push_str(&dt.month().to_string()),
            Token::Month2 => out.push_str(&format_2digit(dt.month())),
            Token::MonthShort => out.push_str(month_name_short(dt.month())),
            Token::MonthLong => out.push_str(month_name_long(dt.month())),
            Token::Day => out.push_str(&dt.day().to_string()),
            Token::Day2 => out.push_str(&format_2digit(dt.day())),
            Token::Hour24 => out.push_str(&dt.hour().to_string()),
            Token::Hour24Pad => out.push_str(&format_2digit(dt.hour())),
            Token::Hour12 => out.push_str(&hour12.to_string()),
            Token::Hour12Pad => out.push_str(&format_2digit(hour12)),
            Token::Minute => out.push_str(&dt.minute().to_string()),
            Token::Minute2 => out.push_str(&format_2digit(dt.minute())),
            Token::Second => out.push_str(&dt.second().to_string()),
            Token::Second2 => out.push_str(&format_2digit(dt.second())),
            Token::DayPeriod => out.push_str(if dt.hour() < 12 { "AM" } else { "PM" }),
            Token::Literal(text) => out.push_str(text),
        }
    }
    out
}

/// Fields read from text, before defaults are filled in.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParsedFields {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub hour: Option<u32>,
    pub minute: Option<u32>,
    pub second: Option<u32>,
    pub pm: Option<bool>,
    pub hour12: bool,
}

impl ParsedFields {
    /// Build a local date-time. Units coarser than the first parsed unit
    /// come from `reference`; finer ones default to their minimum.
    pub fn resolve(&self, reference: &NaiveDateTime) -> Result<NaiveDateTime, PatternError> {
        let hour = match self.hour {
            Some(h) if self.hour12 => {
                if !(1..=12).contains(&h) {
                    return Err(PatternError::OutOfRange("hour"));
                }
                match self.pm {
                    Some(true) => Some(h % 12 + 12),
                    Some(false) => Some(h % 12),
                    None => Some(h),
                }
            }
            other => other,
        };

        let specified = [
            self.year.is_some(),
            self.month.is_some(),
            self.day.is_some(),
            hour.is_some(),
            self.minute.is_some(),
            self.second.is_some(),
        ];
        let first = specified.iter().position(|s| *s).unwrap_or(specified.len());
        let pick = |idx: usize, value: Option<u32>, current: u32, min: u32| -> u32 {
            match value {
                Some(v) => v,
                None if idx < first => current,
                None => min,
            }
        };

        let year = match self.year {
            Some(y) => y,
            None => reference.year(),
        };
        let month = pick(1, self.month, reference.month(), 1);
        let day = pick(2, self.day, reference.day(), 1);
        let hour = pick(3, hour, reference.hour(), 0);
        let minute = pick(4, self.minute, reference.minute(), 0);
        let second = pick(5, self.second, reference.second(), 0);

        if !(1..=12).contains(&month) {
            return Err(PatternError::OutOfRange("month"));
        }
        if hour > 23 {
            return Err(PatternError::OutOfRange("hour"));
        }
        if minute > 59 {
            return Err(PatternError::OutOfRange("minute"));
        }
        if second > 59 {
            return Err(PatternError::OutOfRange("second"));
        }
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or(PatternError::InvalidDate { year, month, day })?;
        let time = NaiveTime::from_hms_opt(hour, minute, second)
            .ok_or(PatternError::OutOfRange("time"))?;
        Ok(NaiveDateTime::new(date, time))
    }
}

struct Scanner<'a> {
    text: &'a str,
    offset: usize,
}

impl<'a> Scanner<'a> {
    fn rest(&self) -> &'a str {
        &self.text[self.offset..]
    }

    fn digits(&mut self, field: &'static str, min: usize, max: usize) -> Result<u32, PatternError> {
        let run = self
            .rest()
            .bytes()
            .take(max)
            .take_while(u8::is_ascii_digit)
            .count();
        if run < min {
            return Err(PatternError::ExpectedDigits {
                field,
                offset: self.offset,
            });
        }
        let value = self.rest()[..run]
            .parse::<u32>()
            .map_err(|_| PatternError::OutOfRange(field))?;
        self.offset += run;
        Ok(value)
    }

    fn signed_year(&mut self, min: usize, max: usize) -> Result<i32, PatternError> {
        let negative = self.rest().starts_with('-');
        if negative {
            self.offset += 1;
        }
        let value = self.digits("year", min, max)? as i32;
        Ok(if negative { -value } else { value })
    }

    fn literal(&mut self, expected: &str) -> Result<(), PatternError> {
        if self.rest().starts_with(expected) {
            self.offset += expected.len();
            Ok(())
        } else {
            Err(PatternError::Mismatch {
                expected: expected.to_string(),
                offset: self.offset,
            })
        }
    }

    fn month_name(&mut self, long: bool) -> Result<u32, PatternError> {
        let rest = self.rest();
        for m in 1..=12 {
            let name = if long {
                month_name_long(m)
            } else {
                month_name_short(m)
            };
            if let Some(head) = rest.get(..name.len())
                && head.eq_ignore_ascii_case(name)
            {
                self.offset += name.len();
                return Ok(m);
            }
        }
        Err(PatternError::UnknownName {
            field: "month",
            offset: self.offset,
        })
    }

    fn day_period(&mut self) -> Result<bool, PatternError> {
        let head = self.rest().get(..2).unwrap_or_default();
        let pm = if head.eq_ignore_ascii_case("am") {
            false
        } else if head.eq_ignore_ascii_case("pm") {
            true
        } else {
            return Err(PatternError::UnknownName {
                field: "day period",
                offset: self.offset,
            });
        };
        self.offset += 2;
        Ok(pm)
    }
}

/// Two-digit years below 60 land in the 2000s, the rest in the 1900s.
fn expand_two_digit_year(yy: u32) -> i32 {
    if yy < 60 {
        2000 + yy as i32
    } else {
        1900 + yy as i32
    }
}

pub fn parse_tokens(tokens: &[Token], text: &str) -> Result<ParsedFields, PatternError> {
    let mut scanner = Scanner { text, offset: 0 };
    let mut fields = ParsedFields::default();
    for token in tokens {
        match token {
            Token::Year => fields.year = Some(scanner.signed_year(1, 6)?),
            Token::Year2 => fields.year = Some(expand_two_digit_year(scanner.digits("year", 2, 2)?)),
            Token::Year4 => fields.year = Some(scanner.signed_year(4, 4)?),
            Token::Month => fields.month = Some(scanner.digits("month", 1, 2)?),
            Token::Month2 => fields.month = Some(scanner.digits("month", 2, 2)?),
            Token::MonthShort => fields.month = Some(scanner.month_name(false)?),
            Token::MonthLong => fields.month = Some(scanner.month_name(true)?),
            Token::Day => fields.day = Some(scanner.digits("day", 1, 2)?),
            Token::Day2 => fields.day = Some(scanner.digits("day", 2, 2)?),
            Token::Hour24 => fields.hour = Some(scanner.digits("hour", 1, 2)?),
            Token::Hour24Pad => fields.hour = Some(scanner.digits("hour", 2, 2)?),
            Token::Hour12 => {
                fields.hour = Some(scanner.digits("hour", 1, 2)?);
                fields.hour12 = true;
            }
            Token::Hour12Pad => {
                fields.hour = Some(scanner.digits("hour", 2, 2)?);
                fields.hour12 = true;
            }
            Token::Minute => fields.minute = Some(scanner.digits("minute", 1, 2)?),
            Token::Minute2 => fields.minute = Some(scanner.digits("minute", 2, 2)?),
            Token::Second => fields.second = Some(scanner.digits("second", 1, 2)?),
            Token::Second2 => fields.second = Some(scanner.digits("second", 2, 2)?),
            Token::DayPeriod => fields.pm = Some(scanner.day_period()?),
            Token::Literal(expected) => scanner.literal(expected)?,
        }
    }
    if scanner.offset < text.len() {
        return Err(PatternError::TrailingInput(scanner.offset));
    }
    Ok(fields)
}
