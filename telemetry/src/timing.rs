use std::num::{ParseFloatError, ParseIntError};
use thiserror::Error;

/// The error type returned when parsing a timing-file data row fails.
#[derive(Debug, Error)]
pub enum ParseTimingRowError {
    /// Fewer than five columns.
    #[error("missing column")]
    MissingColumn,
    /// The frame index column doesn't parse as an integer.
    #[error("bad frame index")]
    BadIndex(#[from] ParseIntError),
    /// A numeric column doesn't parse as a number.
    #[error("bad numeric column")]
    BadNumber(#[from] ParseFloatError),
    /// The acquisition end time is not a finite number.
    #[error("non-finite end time")]
    NonFiniteEndTime,
}

/// One data row of a timing file.
///
/// Only the frame index (column 1) and the acquisition end time (column 5)
/// are consumed; columns 2–4 must parse as numbers but are passed through.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimingRow {
    /// Frame index within the enclosing file, 0-based.
    pub local_index: u32,
    /// Acquisition end time in seconds since the Unix epoch.
    pub end_time: f64,
}

impl TryFrom<&str> for TimingRow {
    type Error = ParseTimingRowError;

    fn try_from(line: &str) -> Result<Self, Self::Error> {
        let mut columns = line.split_whitespace();
        let local_index = columns
            .next()
            .ok_or(ParseTimingRowError::MissingColumn)?
            .parse()?;
        for _ in 0..3 {
            let _: f64 = columns
                .next()
                .ok_or(ParseTimingRowError::MissingColumn)?
                .parse()?;
        }
        let end_time: f64 = columns
            .next()
            .ok_or(ParseTimingRowError::MissingColumn)?
            .parse()?;
        if !end_time.is_finite() {
            return Err(ParseTimingRowError::NonFiniteEndTime);
        }
        Ok(TimingRow {
            local_index,
            end_time,
        })
    }
}

/// Lines that carry no frame data: blanks and `#` comments.
pub fn is_ignorable(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// The error type returned when parsing a timing file name fails.
#[derive(Debug, Error)]
pub enum ParseTimingFileNameError {
    /// Name doesn't match `<stream>_HH:MM:SS.fff….txt`.
    #[error("pattern mismatch")]
    PatternMismatch,
    /// A time-of-day field doesn't parse as an integer.
    #[error("bad integer field")]
    BadInteger(#[from] ParseIntError),
    /// The seconds field doesn't parse as a number.
    #[error("bad seconds field")]
    BadSeconds(#[from] ParseFloatError),
    /// A time-of-day field is out of range.
    #[error("time of day field out of range")]
    FieldOutOfRange,
}

/// Name of an on-disk timing file: `<stream>_HH:MM:SS.fffffffff.txt`.
///
/// The time of day is taken from the substring following the *last*
/// underscore, so stream names may themselves contain underscores.
#[derive(Clone, Debug, PartialEq)]
pub struct TimingFileName {
    /// Name of the telemetry stream.
    pub stream: String,
    /// Seconds past UTC midnight encoded in the name.
    pub time_of_day: f64,
}

impl TryFrom<&str> for TimingFileName {
    type Error = ParseTimingFileNameError;

    fn try_from(name: &str) -> Result<Self, Self::Error> {
        let stem = name
            .strip_suffix(".txt")
            .ok_or(ParseTimingFileNameError::PatternMismatch)?;
        let (stream, time) = stem
            .rsplit_once('_')
            .ok_or(ParseTimingFileNameError::PatternMismatch)?;
        if stream.is_empty() {
            return Err(ParseTimingFileNameError::PatternMismatch);
        }

        let mut fields = time.split(':');
        let (Some(hour), Some(minute), Some(second), None) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return Err(ParseTimingFileNameError::PatternMismatch);
        };
        let hour: u32 = hour.parse()?;
        let minute: u32 = minute.parse()?;
        let second: f64 = second.parse()?;
        if hour > 23 || minute > 59 || !(0.0..61.0).contains(&second) {
            return Err(ParseTimingFileNameError::FieldOutOfRange);
        }

        Ok(TimingFileName {
            stream: stream.to_owned(),
            time_of_day: f64::from(hour) * 3600.0 + f64::from(minute) * 60.0 + second,
        })
    }
}
