use chrono::{DateTime, NaiveDate, NaiveTime};
use std::num::{ParseFloatError, ParseIntError};
use std::str::FromStr;
use thiserror::Error;

/// Number of seconds in one UTC day.
pub const SECONDS_PER_DAY: f64 = 86400.0;

/// The error type returned when parsing a user-supplied time string fails.
#[derive(Debug, Error)]
pub enum ParseTimeSpecError {
    /// Input string doesn't match any of the known time grammars.
    #[error("pattern mismatch")]
    PatternMismatch,
    /// A calendar field doesn't parse as an integer.
    #[error("bad integer field")]
    BadInteger(#[from] ParseIntError),
    /// A seconds field doesn't parse as a number.
    #[error("bad seconds field")]
    BadSeconds(#[from] ParseFloatError),
    /// Calendar date doesn't exist.
    #[error("invalid calendar date `{year:04}-{month:02}-{day:02}`")]
    InvalidDate { year: i32, month: u32, day: u32 },
    /// A time-of-day field is out of range.
    #[error("time of day field out of range")]
    FieldOutOfRange,
}

/// A user-supplied instant or offset.
///
/// Three grammars are accepted:
/// - `UTYYYYMMDDTHH[:MM[:SS.fff…]]`: UTC calendar time, omitted trailing
///   fields default to zero.
/// - Floating-point seconds since the Unix epoch.
/// - `+SS.fff`, `+MM:SS.fff` or `+HH:MM:SS.fff`: an offset, meaningful only
///   relative to another instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TimeSpec {
    /// Absolute time in seconds since the Unix epoch.
    Epoch(f64),
    /// Offset in seconds from some other instant.
    Offset(f64),
}

impl FromStr for TimeSpec {
    type Err = ParseTimeSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(rest) = s.strip_prefix('+') {
            return Ok(TimeSpec::Offset(parse_offset(rest)?));
        }
        if let Some(rest) = s.strip_prefix("UT") {
            return Ok(TimeSpec::Epoch(parse_calendar(rest)?));
        }
        let epoch: f64 = s.parse()?;
        if !epoch.is_finite() {
            return Err(ParseTimeSpecError::PatternMismatch);
        }
        Ok(TimeSpec::Epoch(epoch))
    }
}

// `YYYYMMDDTHH[:MM[:SS.fff...]]` (the `UT` prefix is already stripped).
fn parse_calendar(s: &str) -> Result<f64, ParseTimeSpecError> {
    if s.len() < 11 || !s.is_ascii() || s.as_bytes()[8] != b'T' {
        return Err(ParseTimeSpecError::PatternMismatch);
    }
    let year: i32 = s[..4].parse()?;
    let month: u32 = s[4..6].parse()?;
    let day: u32 = s[6..8].parse()?;
    let date = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or(ParseTimeSpecError::InvalidDate { year, month, day })?;

    let mut fields = s[9..].split(':');
    // The length check above guarantees at least the hour field.
    let hour: u32 = fields.next().ok_or(ParseTimeSpecError::PatternMismatch)?.parse()?;
    let minute: u32 = match fields.next() {
        Some(field) => field.parse()?,
        None => 0,
    };
    let second: f64 = match fields.next() {
        Some(field) => field.parse()?,
        None => 0.0,
    };
    if fields.next().is_some() {
        return Err(ParseTimeSpecError::PatternMismatch);
    }
    if hour > 23 || minute > 59 || !(0.0..61.0).contains(&second) {
        return Err(ParseTimeSpecError::FieldOutOfRange);
    }

    let midnight = date.and_time(NaiveTime::MIN).and_utc().timestamp() as f64;
    Ok(midnight + f64::from(hour) * 3600.0 + f64::from(minute) * 60.0 + second)
}

// `SS.fff`, `MM:SS.fff` or `HH:MM:SS.fff` (the `+` is already stripped).
fn parse_offset(s: &str) -> Result<f64, ParseTimeSpecError> {
    let fields: Vec<&str> = s.split(':').collect();
    if fields.len() > 3 {
        return Err(ParseTimeSpecError::PatternMismatch);
    }
    let seconds: f64 = fields[fields.len() - 1].parse()?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(ParseTimeSpecError::FieldOutOfRange);
    }
    let mut whole: u32 = 0;
    for field in &fields[..fields.len() - 1] {
        whole = whole * 60 + field.parse::<u32>()?;
    }
    Ok(f64::from(whole) * 60.0 + seconds)
}

/// The error type returned when constructing an empty or reversed
/// [`TimeWindow`].
#[derive(Debug, Error)]
#[error("empty time window (tstart `{tstart}` must precede tend `{tend}`)")]
pub struct InvalidTimeWindow {
    tstart: f64,
    tend: f64,
}

/// Half-open query window `[tstart, tend)` in seconds since the Unix epoch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeWindow {
    pub tstart: f64,
    pub tend: f64,
}

impl TimeWindow {
    pub fn new(tstart: f64, tend: f64) -> Result<Self, InvalidTimeWindow> {
        if tstart < tend {
            Ok(TimeWindow { tstart, tend })
        } else {
            Err(InvalidTimeWindow { tstart, tend })
        }
    }
    /// An acquisition interval `[start, end)` intersects the window.
    pub fn overlaps(&self, start: f64, end: f64) -> bool {
        start < self.tend && end > self.tstart
    }
    pub fn duration(&self) -> f64 {
        self.tend - self.tstart
    }
}

/// UTC calendar date of the day containing `t` (seconds since the Unix
/// epoch). `None` if `t` is not representable as a calendar date.
pub fn utc_date(t: f64) -> Option<NaiveDate> {
    if !t.is_finite() {
        return None;
    }
    DateTime::from_timestamp(t.floor() as i64, 0).map(|instant| instant.date_naive())
}

/// `YYYYMMDD` directory name of the UTC day containing `t`.
pub fn day_directory(t: f64) -> Option<String> {
    utc_date(t).map(|date| date.format("%Y%m%d").to_string())
}

/// Midnight UTC at the start of `date`, in seconds since the Unix epoch.
pub fn day_start(date: NaiveDate) -> f64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp() as f64
}

/// Every UTC day `D` whose interval `[D, D + 86400)` intersects `[lo, hi]`.
pub fn utc_days(lo: f64, hi: f64) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let (Some(first), Some(last)) = (utc_date(lo), utc_date(hi)) else {
        return days;
    };
    let mut day = first;
    while day <= last {
        days.push(day);
        let Some(next) = day.succ_opt() else { break };
        day = next;
    }
    days
}

/// Human-readable UTC rendering of an epoch instant, with millisecond
/// precision. Falls back to raw seconds for unrepresentable instants.
pub fn format_utc(t: f64) -> String {
    let (mut secs, mut nanos) = (t.floor(), ((t - t.floor()) * 1e9).round() as u32);
    if nanos >= 1_000_000_000 {
        secs += 1.0;
        nanos = 0;
    }
    if !secs.is_finite() {
        return format!("{t:.6}");
    }
    match DateTime::from_timestamp(secs as i64, nanos) {
        Some(instant) => instant.format("%Y-%m-%d %H:%M:%S%.3f UTC").to_string(),
        None => format!("{t:.6}"),
    }
}

#[cfg(test)]
mod tests;
