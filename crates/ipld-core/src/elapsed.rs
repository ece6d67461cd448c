//! Elapsed-time calculator.
//!
//! Durations are computed on a fixed, non-calendar epoch model:
//!
//! ```text
//! seconds = (year - 1970) * 31_557_600   // 365.25 days
//!         + month         *  2_629_800   // 1/12 of that year
//!         + day           *     86_400
//!         + hour * 3600 + minute * 60 + second
//! ```
//!
//! Month and day are not zero-adjusted. The model is approximate on purpose
//! and must stay bit-for-bit compatible with the resume files already in
//! circulation.
//!
//! Two renderings exist: [`Elapsed::to_csv`] folds whole days into the hour
//! count (`50:00:00`), [`Elapsed::to_display`] keeps a separate day counter
//! for interactive output.

use std::fmt;

use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::datetime::Timestamp;

const SECONDS_PER_YEAR: i64 = 31_557_600;
const SECONDS_PER_MONTH: i64 = 2_629_800;
const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ElapsedError {
    #[error("end {end} precedes start {start}")]
    NonMonotonicTimestamps { start: Timestamp, end: Timestamp },
}

/// A non-negative span of seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Elapsed(u64);

impl Elapsed {
    pub fn from_seconds(seconds: u64) -> Self {
        Self(seconds)
    }

    pub fn as_seconds(&self) -> u64 {
        self.0
    }

    /// `HH:MM:SS`, with hours growing past 24 instead of rolling into days.
    pub fn to_csv(&self) -> String {
        let mut rest = self.0;
        let mut hours = 0;
        if rest >= SECONDS_PER_DAY as u64 {
            hours += (rest / SECONDS_PER_DAY as u64) * 24;
            rest %= SECONDS_PER_DAY as u64;
        }
        hours += rest / 3600;
        rest %= 3600;
        format!("{:02}:{:02}:{:02}", hours, rest / 60, rest % 60)
    }

    /// `[N day(s), H hour(s), M minute(s), S second(s)]`.
    pub fn to_display(&self) -> String {
        let days = self.0 / SECONDS_PER_DAY as u64;
        let rest = self.0 % SECONDS_PER_DAY as u64;
        format!(
            "[{} day(s), {} hour(s), {} minute(s), {} second(s)]",
            days,
            rest / 3600,
            rest % 3600 / 60,
            rest % 60
        )
    }

    /// Inverse of [`Elapsed::to_csv`].
    pub fn parse_csv(s: &str) -> Option<Self> {
        let mut parts = s.split(':');
        let (Some(h), Some(m), Some(sec), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return None;
        };
        let h = digits(h)?;
        let m = digits(m)?;
        let sec = digits(sec)?;
        if m >= 60 || sec >= 60 {
            return None;
        }
        h.checked_mul(3600)?.checked_add(m * 60 + sec).map(Self)
    }
}

/// Unsigned decimal cell; no sign, no whitespace.
fn digits(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl fmt::Display for Elapsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_csv())
    }
}

impl Serialize for Elapsed {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_csv())
    }
}

/// Scalar position of `ts` on the approximate epoch.
pub fn epoch_seconds(ts: &Timestamp) -> i64 {
    (i64::from(ts.date.year) - 1970) * SECONDS_PER_YEAR
        + i64::from(ts.date.month) * SECONDS_PER_MONTH
        + i64::from(ts.date.day) * SECONDS_PER_DAY
        + i64::from(ts.time.hour) * 3600
        + i64::from(ts.time.minute) * 60
        + i64::from(ts.time.second)
}

/// Time from `start` to `end`. An `end` that lands before `start` on the
/// epoch scale is an error, never a negative span.
pub fn duration(start: &Timestamp, end: &Timestamp) -> Result<Elapsed, ElapsedError> {
    let diff = epoch_seconds(end) - epoch_seconds(start);
    if diff < 0 {
        return Err(ElapsedError::NonMonotonicTimestamps {
            start: *start,
            end: *end,
        });
    }
    Ok(Elapsed(diff as u64))
}
