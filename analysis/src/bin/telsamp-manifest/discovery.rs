use glob::glob;
use std::path::{Path, PathBuf};
use telsamp_telemetry::time::{day_start, utc_days, TimeWindow, SECONDS_PER_DAY};
use telsamp_telemetry::timing::TimingFileName;

/// A timing file selected for scanning.
#[derive(Clone, Debug, PartialEq)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    /// Absolute capture-sequence start encoded in the file name, seconds
    /// since the Unix epoch.
    pub timestamp: f64,
}

/// Find every timing file of `stream` whose contents may overlap the
/// window, sorted by filename timestamp.
///
/// Day directories `<teldir>/YYYYMMDD/<stream>/` are probed for every UTC
/// day intersecting `[tstart − 86400, tend]`; the extra day on the low side
/// covers files starting just before midnight whose frames reach into the
/// next day. Missing directories match nothing, and entries whose name
/// doesn't parse as `<stream>_HH:MM:SS.fff….txt` are skipped.
pub fn discover(teldir: &Path, stream: &str, window: &TimeWindow) -> Vec<DiscoveredFile> {
    let mut files = Vec::new();
    for day in utc_days(window.tstart - SECONDS_PER_DAY, window.tend) {
        let pattern = teldir
            .join(day.format("%Y%m%d").to_string())
            .join(stream)
            .join(format!("{stream}_*.txt"));
        let Some(pattern) = pattern.to_str() else {
            continue;
        };
        let Ok(entries) = glob(pattern) else { continue };
        for path in entries.flatten() {
            let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            let Ok(name) = TimingFileName::try_from(name) else {
                continue;
            };
            if name.stream != stream {
                continue;
            }
            files.push(DiscoveredFile {
                timestamp: day_start(day) + name.time_of_day,
                path,
            });
        }
    }
    files.sort_by(|a, b| {
        a.timestamp
            .total_cmp(&b.timestamp)
            .then_with(|| a.path.cmp(&b.path))
    });
    files
}

/// Trim a sorted file list to the query window.
///
/// The pivot is the last file starting at or before `tstart`; its
/// predecessor is kept too, because the pivot's first usable frame start is
/// the end time of the predecessor's last frame. Files past `tend` are
/// dropped. Without a pivot the list starts from the earliest file.
pub fn select_window(files: Vec<DiscoveredFile>, window: &TimeWindow) -> Vec<DiscoveredFile> {
    let first = match files.iter().rposition(|file| file.timestamp <= window.tstart) {
        Some(pivot) => pivot.saturating_sub(1),
        None => 0,
    };
    let tend = window.tend;
    files
        .into_iter()
        .skip(first)
        .filter(|file| file.timestamp <= tend)
        .collect()
}
