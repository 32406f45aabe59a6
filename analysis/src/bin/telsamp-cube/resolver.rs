use std::path::{Path, PathBuf};
use telsamp_telemetry::time::day_directory;
use telsamp_telemetry::timing::TimingFileName;

// Extension of lz4-compressed cubes, probed after the plain candidate.
const COMPRESSED_EXTENSION: &str = "lz4";

/// Map a manifest row to the image cube that backs it.
///
/// The conventional location is
/// `<teldir>/YYYYMMDD/<stream>/<src with .txt replaced by .fits>` with the
/// day derived from the frame start time in UTC. The plain cube is probed
/// first, then its compressed variant; if neither exists the plain
/// candidate is returned so that the open error names the conventional
/// path. `src` itself is never modified.
pub fn resolve(teldir: &Path, source: &str, start_time: f64) -> PathBuf {
    let cube_name = cube_file_name(source);
    let conventional = match (TimingFileName::try_from(source), day_directory(start_time)) {
        (Ok(name), Some(day)) => teldir.join(day).join(name.stream).join(cube_name),
        // An unconventional source name still gets a well-defined candidate.
        _ => teldir.join(cube_name),
    };
    if conventional.is_file() {
        return conventional;
    }
    let mut compressed = conventional.clone().into_os_string();
    compressed.push(".");
    compressed.push(COMPRESSED_EXTENSION);
    let compressed = PathBuf::from(compressed);
    if compressed.is_file() {
        compressed
    } else {
        conventional
    }
}

// `<source>` with its `.txt` extension replaced by `.fits`.
fn cube_file_name(source: &str) -> String {
    match source.strip_suffix(".txt") {
        Some(stem) => format!("{stem}.fits"),
        None => format!("{source}.fits"),
    }
}
