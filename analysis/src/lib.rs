use std::io::Write;
use std::path::Path;
use telsamp_telemetry::manifest::{parse_manifest, FrameRecord, ParseManifestError};
use thiserror::Error;

/// The error type for I/O operations on manifest files.
#[derive(Debug, Error)]
pub enum ManifestIoError {
    /// The error type for I/O operations of the Read, Write, and associated
    /// traits.
    #[error("io error")]
    Io(#[from] std::io::Error),
    /// Manifest contents are malformed or violate the ordering invariants.
    #[error("malformed manifest")]
    Malformed(#[from] ParseManifestError),
    /// Row serialization error.
    #[error("csv error")]
    Csv(#[from] csv::Error),
}

/// Conventional manifest file name for a stream.
pub fn manifest_file_name(stream: &str) -> String {
    format!("{stream}.resample.txt")
}

/// Read and validate a manifest file.
pub fn read_manifest<P: AsRef<Path>>(path: P) -> Result<Vec<FrameRecord>, ManifestIoError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(parse_manifest(&contents)?)
}

/// Write a manifest file.
///
/// `header` lines are emitted first as `#` comments, then one
/// space-delimited row per record with times formatted to six decimal
/// places. Identical inputs produce byte-identical files.
pub fn write_manifest<P: AsRef<Path>>(
    path: P,
    header: &[String],
    records: &[FrameRecord],
) -> Result<(), ManifestIoError> {
    let mut file = std::fs::File::create(path)?;
    for line in header {
        writeln!(file, "# {line}")?;
    }
    let mut wtr = csv::WriterBuilder::new().delimiter(b' ').from_writer(file);
    for record in records {
        wtr.write_record([
            record.index.to_string(),
            format!("{:.6}", record.start_time),
            format!("{:.6}", record.end_time),
            record.source.clone(),
            record.local_index.to_string(),
            format!("{:.6}", record.grid_start),
            format!("{:.6}", record.grid_end),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
