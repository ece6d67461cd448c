//! Date/time normalizer — turns the SYSLOG date and time encodings into the
//! canonical `YYYY-MM-DD` / `HH:MM:SS` pair.
//!
//! Two date encodings are understood:
//!
//! - ordinal ("Julian") form, `YYDDD` or `YYYYDDD`, via [`convert_ordinal_date`]
//! - slash form, `MM/DD/YYYY`, via [`convert_slash_date`]
//!
//! and two time encodings:
//!
//! - colon form `HH:MM:SS[.ff]`, or packed `HHMMSS`, via [`convert_colon_time`]
//! - dot form `HH.MM.SS`, via [`convert_dot_time`]
//!
//! The calendar here is the SYSLOG tooling calendar, not the Gregorian one:
//! a year is a leap year whenever `year % 4 == 0`. Downstream consumers
//! compare against values produced with the same rule, so this must not be
//! swapped for `chrono`.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Month lengths for a non-leap year; February is patched for leap years.
const MONTH_DAYS: [u16; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A date or time token that could not be normalised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    #[error("malformed ordinal date {0:?}")]
    OrdinalDate(String),
    #[error("malformed slash date {0:?}")]
    SlashDate(String),
    #[error("malformed colon time {0:?}")]
    ColonTime(String),
    #[error("malformed dot time {0:?}")]
    DotTime(String),
    #[error("malformed timestamp {0:?}")]
    Timestamp(String),
}

// ---------------------------------------------------------------------------
// Canonical value types
// ---------------------------------------------------------------------------

/// A calendar date in the SYSLOG calendar. Field order gives chronological
/// ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LogDate {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

/// A wall-clock time with whole-second precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LogTime {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

/// A full date + time. Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    pub date: LogDate,
    pub time: LogTime,
}

impl LogDate {
    pub fn new(year: u16, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }

    /// Day-of-year in the SYSLOG calendar (inverse of [`convert_ordinal_date`]).
    pub fn ordinal(&self) -> u16 {
        let leap = is_leap(self.year);
        let before: u16 = (0..usize::from(self.month.saturating_sub(1)))
            .map(|i| month_length(i, leap))
            .sum();
        before + u16::from(self.day)
    }
}

impl LogTime {
    pub fn new(hour: u8, minute: u8, second: u8) -> Self {
        Self {
            hour,
            minute,
            second,
        }
    }
}

impl Timestamp {
    pub fn new(date: LogDate, time: LogTime) -> Self {
        Self { date, time }
    }
}

impl fmt::Display for LogDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl fmt::Display for LogTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date, self.time)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parses the canonical `YYYY-MM-DD HH:MM:SS` rendering produced by
/// [`Timestamp`]'s `Display` impl.
impl FromStr for Timestamp {
    type Err = TimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || TimestampError::Timestamp(s.to_string());
        let (date, time) = s.trim().split_once(' ').ok_or_else(malformed)?;

        let mut parts = date.split('-');
        let (Some(y), Some(m), Some(d), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(malformed());
        };
        if y.len() != 4 {
            return Err(malformed());
        }
        let date = LogDate::new(
            parse_digits(y).ok_or_else(malformed)?,
            parse_digits(m).ok_or_else(malformed)?,
            parse_digits(d).ok_or_else(malformed)?,
        );
        if !(1..=12).contains(&date.month) || !(1..=31).contains(&date.day) {
            return Err(malformed());
        }

        let time = split_three(time, ':').ok_or_else(malformed)?;
        Ok(Timestamp::new(date, time))
    }
}

// ---------------------------------------------------------------------------
// Date conversions
// ---------------------------------------------------------------------------

/// Convert an ordinal date token (`YYDDD` or `YYYYDDD`) to a calendar date.
///
/// A 7-character token carries a 4-digit year; a 5-character token carries
/// a 2-digit year which is placed in the 2000s. The day-of-year is walked
/// through cumulative month lengths. Day `0`, a day past the end of the year,
/// or any day above 366 is rejected.
pub fn convert_ordinal_date(token: &str) -> Result<LogDate, TimestampError> {
    let malformed = || TimestampError::OrdinalDate(token.to_string());

    if !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    let (year, ordinal) = match token.len() {
        7 => (&token[..4], &token[4..]),
        5 => (&token[..2], &token[2..]),
        _ => return Err(malformed()),
    };
    let mut year: u16 = parse_digits(year).ok_or_else(malformed)?;
    if token.len() == 5 {
        year += 2000;
    }
    let ordinal: u16 = parse_digits(ordinal).ok_or_else(malformed)?;
    if ordinal == 0 || ordinal > 366 {
        return Err(malformed());
    }

    let leap = is_leap(year);
    let mut elapsed = 0u16;
    for month in 0..12 {
        let len = month_length(month, leap);
        if ordinal <= elapsed + len {
            // month < 12 and day <= 31, both fit in u8.
            return Ok(LogDate::new(year, month as u8 + 1, (ordinal - elapsed) as u8));
        }
        elapsed += len;
    }
    Err(malformed())
}

/// Convert a `MM/DD/YYYY` token to a calendar date.
pub fn convert_slash_date(token: &str) -> Result<LogDate, TimestampError> {
    let malformed = || TimestampError::SlashDate(token.to_string());

    let mut parts = token.split('/');
    let (Some(m), Some(d), Some(y), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(malformed());
    };
    if y.len() != 4 || m.is_empty() || m.len() > 2 || d.is_empty() || d.len() > 2 {
        return Err(malformed());
    }
    let month: u8 = parse_digits(m).ok_or_else(malformed)?;
    let day: u8 = parse_digits(d).ok_or_else(malformed)?;
    let year: u16 = parse_digits(y).ok_or_else(malformed)?;
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return Err(malformed());
    }
    Ok(LogDate::new(year, month, day))
}

// ---------------------------------------------------------------------------
// Time conversions
// ---------------------------------------------------------------------------

/// Convert a colon time (`HH:MM:SS`, optional `.ff` fraction dropped) or a
/// packed 6-digit `HHMMSS` token.
pub fn convert_colon_time(token: &str) -> Result<LogTime, TimestampError> {
    let malformed = || TimestampError::ColonTime(token.to_string());

    if token.contains(':') {
        let (whole, _fraction) = match token.rsplit_once('.') {
            Some((whole, fraction)) if fraction.bytes().all(|b| b.is_ascii_digit()) => {
                (whole, fraction)
            }
            Some(_) => return Err(malformed()),
            None => (token, ""),
        };
        return split_three(whole, ':').ok_or_else(malformed);
    }

    if token.len() != 6 || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    checked_time(&token[0..2], &token[2..4], &token[4..6]).ok_or_else(malformed)
}

/// Convert a dot-delimited `HH.MM.SS` token.
pub fn convert_dot_time(token: &str) -> Result<LogTime, TimestampError> {
    split_three(token, '.').ok_or_else(|| TimestampError::DotTime(token.to_string()))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub(crate) fn is_leap(year: u16) -> bool {
    year % 4 == 0
}

fn month_length(month_index: usize, leap: bool) -> u16 {
    if month_index == 1 && leap {
        29
    } else {
        MONTH_DAYS[month_index]
    }
}

fn parse_digits<T: FromStr>(s: &str) -> Option<T> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn split_three(token: &str, sep: char) -> Option<LogTime> {
    let mut parts = token.split(sep);
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(h), Some(m), Some(s), None) if h.len() <= 2 && m.len() == 2 && s.len() == 2 => {
            checked_time(h, m, s)
        }
        _ => None,
    }
}

fn checked_time(h: &str, m: &str, s: &str) -> Option<LogTime> {
    let hour: u8 = parse_digits(h)?;
    let minute: u8 = parse_digits(m)?;
    let second: u8 = parse_digits(s)?;
    (hour < 24 && minute < 60 && second < 60).then(|| LogTime::new(hour, minute, second))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
