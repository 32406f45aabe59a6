//! Assemble a resampled image cube from a manifest.
//!
//! Streams the manifest produced by `telsamp-manifest`, reads each input
//! frame's plane from its backing image cube, and distributes it into the
//! output planes it overlaps, weighted by temporal overlap. Completed
//! planes are flushed in ascending order, so memory stays bounded by the
//! number of planes a single frame can straddle.

use crate::assembler::Assembler;
use anyhow::{ensure, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::path::PathBuf;
use telsamp_fitscube::{CubeReader, CubeWriter};
use telsamp_telemetry::grid::plane_count;
use telsamp_telemetry::manifest::FrameRecord;

/// Overlap-weighted accumulation of output planes.
mod assembler;

/// Mapping from manifest rows to image-cube files.
mod resolver;

#[derive(Parser)]
#[command(author, version)]
#[command(about = "Assemble a resampled image cube from a manifest", long_about = None)]
struct Args {
    /// Manifest produced by `telsamp-manifest`
    manifest: PathBuf,
    /// Top-level telemetry directory (contains `YYYYMMDD` day directories)
    #[arg(default_value = "./")]
    teldir: PathBuf,
}

// The currently open input cube. `None` means the open already failed and
// was warned about; records backed by it are skipped without re-probing.
struct CurrentInput {
    source: String,
    reader: Option<CubeReader>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let records = telsamp_analysis::read_manifest(&args.manifest)
        .with_context(|| format!("failed to read `{}`", args.manifest.display()))?;
    ensure!(
        !records.is_empty(),
        "no frames in `{}`",
        args.manifest.display()
    );

    // First pass: the first record's cube fixes the plane dimensions; the
    // largest grid end fixes the output depth.
    let first = &records[0];
    let first_path = resolver::resolve(&args.teldir, &first.source, first.start_time);
    let probe = CubeReader::open(&first_path)
        .with_context(|| format!("failed to open `{}`", first_path.display()))?;
    let (width, height) = (probe.width(), probe.height());
    drop(probe);
    let max_end = records
        .iter()
        .map(|record| record.grid_end)
        .fold(f64::NEG_INFINITY, f64::max);
    let planes = plane_count(max_end);
    ensure!(planes > 0, "output grid is empty");

    let output = args.manifest.with_extension("fits");
    let writer = CubeWriter::create(&output, width, height, planes)
        .with_context(|| format!("failed to create `{}`", output.display()))?;
    let mut assembler = Assembler::new(width, height, planes, writer);

    let bar = ProgressBar::new(records.len().try_into().unwrap()).with_style(
        ProgressStyle::with_template("  Assembling [{bar:25}] {percent}%,  ETA: {eta}")
            .unwrap()
            .progress_chars("=> "),
    );
    bar.tick();

    let mut current: Option<CurrentInput> = None;
    for record in &records {
        bar.inc(1);
        let changed = current
            .as_ref()
            .map_or(true, |input| input.source != record.source);
        if changed {
            let path = resolver::resolve(&args.teldir, &record.source, record.start_time);
            let reader = match CubeReader::open(&path) {
                Ok(reader) => {
                    if reader.width() == width && reader.height() == height {
                        Some(reader)
                    } else {
                        eprintln!(
                            "Warning: skipping `{}` ({}x{} pixels, expected {width}x{height})",
                            path.display(),
                            reader.width(),
                            reader.height(),
                        );
                        None
                    }
                }
                Err(error) => {
                    eprintln!("Warning: failed to open `{}`: {error}", path.display());
                    None
                }
            };
            current = Some(CurrentInput {
                source: record.source.clone(),
                reader,
            });
        }
        // The `current` state is always `Some` at this point.
        let Some(reader) = current.as_mut().and_then(|input| input.reader.as_mut()) else {
            continue;
        };
        let plane = match reader.read_plane(record.local_index as usize) {
            Ok(plane) => plane,
            Err(error) => {
                eprintln!(
                    "Warning: failed to read plane {} of `{}`: {error}",
                    record.local_index, record.source
                );
                continue;
            }
        };
        assembler
            .add(record.grid_start, record.grid_end, &plane)
            .with_context(|| format!("failed to write `{}`", output.display()))?;
    }
    let coverage = assembler
        .finish()
        .with_context(|| format!("failed to write `{}`", output.display()))?;
    bar.finish_and_clear();
    eprintln!("Created `{}` ({width}x{height}x{planes})", output.display());

    write_coverage_log(&args.manifest.with_extension("csv"), &coverage, &records)
        .context("failed to write coverage log")?;

    Ok(())
}

// Companion log: one row per output plane with its contribution count and
// summed overlap weight.
fn write_coverage_log(
    path: &std::path::Path,
    coverage: &[assembler::PlaneCoverage],
    records: &[FrameRecord],
) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(
        format!(
            "# {} {}\n# {} frames\n",
            env!("CARGO_BIN_NAME"),
            env!("CARGO_PKG_VERSION"),
            records.len()
        )
        .as_bytes(),
    )?;
    let mut wtr = csv::Writer::from_writer(file);
    for entry in coverage {
        wtr.serialize(entry)?;
    }
    wtr.flush()?;
    eprintln!("Created `{}`", path.display());
    Ok(())
}
