use crate::grid::ResampleGrid;
use crate::time::TimeWindow;
use crate::timing::TimingRow;
use std::num::{ParseFloatError, ParseIntError};
use thiserror::Error;

/// One row of a resampling manifest.
///
/// A record describes a single input frame overlapping the query window:
/// its acquisition interval `[start_time, end_time)` in epoch seconds, the
/// timing file its end time was read from, its frame index within that
/// file, and the same interval in grid coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameRecord {
    /// Position of the record within the manifest, contiguous from 0.
    pub index: usize,
    /// Acquisition start in seconds since the Unix epoch, inferred from the
    /// end time of the preceding frame.
    pub start_time: f64,
    /// Acquisition end in seconds since the Unix epoch.
    pub end_time: f64,
    /// Basename of the timing file the end time was read from.
    pub source: String,
    /// Frame index within `source`, 0-based.
    pub local_index: u32,
    /// `start_time` in grid coordinates.
    pub grid_start: f64,
    /// `end_time` in grid coordinates.
    pub grid_end: f64,
}

/// Streaming builder of manifest records.
///
/// Feed every data row of every selected timing file, in chronological
/// order. A frame's start time is the end time of the row fed before it;
/// the chain carries across file boundaries and is broken only by
/// [`break_chain`](ManifestBuilder::break_chain) (an unreadable file).
/// Rows whose inferred interval overlaps the query window come out as
/// [`FrameRecord`]s.
#[derive(Clone, Debug)]
pub struct ManifestBuilder {
    window: TimeWindow,
    grid: ResampleGrid,
    prev_end: Option<f64>,
    records: Vec<FrameRecord>,
}

impl ManifestBuilder {
    pub fn new(window: TimeWindow, grid: ResampleGrid) -> Self {
        ManifestBuilder {
            window,
            grid,
            prev_end: None,
            records: Vec::new(),
        }
    }

    /// Forget the rolling end time. The next row fed will only seed the
    /// chain, exactly like the first row of the first file.
    pub fn break_chain(&mut self) {
        self.prev_end = None;
    }

    /// Feed one data row read from the timing file named `source`.
    pub fn push_row(&mut self, source: &str, row: TimingRow) {
        let end_time = row.end_time;
        let Some(start_time) = self.prev_end.replace(end_time) else {
            return;
        };
        // A row whose end time does not advance past the chain cannot form
        // a non-empty acquisition interval.
        if end_time <= start_time {
            return;
        }
        if !self.window.overlaps(start_time, end_time) {
            return;
        }
        self.records.push(FrameRecord {
            index: self.records.len(),
            start_time,
            end_time,
            source: source.to_owned(),
            local_index: row.local_index,
            grid_start: self.grid.to_grid(start_time),
            grid_end: self.grid.to_grid(end_time),
        });
    }

    pub fn records(&self) -> &[FrameRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<FrameRecord> {
        self.records
    }
}

/// The error type returned when parsing a single manifest row fails.
#[derive(Debug, Error)]
pub enum ParseFrameRecordError {
    /// Fewer than seven columns.
    #[error("missing column")]
    MissingColumn,
    /// An index column doesn't parse as an integer.
    #[error("bad integer column")]
    BadInteger(#[from] ParseIntError),
    /// A time column doesn't parse as a number.
    #[error("bad numeric column")]
    BadNumber(#[from] ParseFloatError),
}

impl TryFrom<&str> for FrameRecord {
    type Error = ParseFrameRecordError;

    fn try_from(line: &str) -> Result<Self, Self::Error> {
        let mut columns = line.split_whitespace();
        let mut column = || columns.next().ok_or(ParseFrameRecordError::MissingColumn);
        Ok(FrameRecord {
            index: column()?.parse()?,
            start_time: column()?.parse()?,
            end_time: column()?.parse()?,
            source: column()?.to_owned(),
            local_index: column()?.parse()?,
            grid_start: column()?.parse()?,
            grid_end: column()?.parse()?,
        })
    }
}

/// The error type returned when a manifest file is malformed or violates
/// the manifest ordering invariants.
#[derive(Debug, Error)]
pub enum ParseManifestError {
    /// A row doesn't parse.
    #[error("malformed row on line {number}")]
    Row {
        number: usize,
        source: ParseFrameRecordError,
    },
    /// Record indices are not contiguous from 0.
    #[error("bad record index on line {number} (expected `{expected}`, found `{found}`)")]
    IndexMismatch {
        number: usize,
        expected: usize,
        found: usize,
    },
    /// A record's acquisition interval is empty or reversed.
    #[error("empty acquisition interval on line {number}")]
    EmptyInterval { number: usize },
    /// Records are not in non-decreasing grid start order.
    #[error("time ordering violation on line {number}")]
    OrderViolation { number: usize },
}

/// Parse and validate the contents of a manifest file.
///
/// `#` comment lines and blank lines are ignored. Validation enforces the
/// invariants the cube assembler relies on: indices contiguous from 0,
/// non-empty intervals, and non-decreasing grid start times.
pub fn parse_manifest(contents: &str) -> Result<Vec<FrameRecord>, ParseManifestError> {
    let mut records: Vec<FrameRecord> = Vec::new();
    for (number, line) in contents.lines().enumerate() {
        let number = number + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let record = FrameRecord::try_from(trimmed)
            .map_err(|source| ParseManifestError::Row { number, source })?;
        if record.index != records.len() {
            return Err(ParseManifestError::IndexMismatch {
                number,
                expected: records.len(),
                found: record.index,
            });
        }
        if record.end_time <= record.start_time || record.grid_end <= record.grid_start {
            return Err(ParseManifestError::EmptyInterval { number });
        }
        if let Some(previous) = records.last() {
            if record.grid_start < previous.grid_start {
                return Err(ParseManifestError::OrderViolation { number });
            }
        }
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests;
