/// Resampled grid coordinates.
///
/// A uniform output time grid is fully described by its origin `tstart` and
/// its sampling interval `dt`. This module maps absolute times onto the grid
/// and computes the overlap of acquisition intervals with output planes.
pub mod grid;

/// Resampling manifests.
///
/// A manifest lists every input frame that overlaps a query window, in
/// chronological order, together with its position on the output grid. This
/// module defines the row type, the streaming builder that emits rows from
/// raw timing data, and the parser/validator for manifest files on disk.
pub mod manifest;

/// User-supplied instants and windows.
///
/// Command-line start/end times come in three grammars (UTC calendar, epoch
/// seconds, relative offset). This module parses them and provides the UTC
/// day arithmetic used to locate date-partitioned telemetry directories.
pub mod time;

/// Timing files.
///
/// Each telemetry stream records per-frame acquisition end times in ASCII
/// timing files named `<stream>_HH:MM:SS.fffffffff.txt`. This module parses
/// both the file names and the data rows.
pub mod timing;
