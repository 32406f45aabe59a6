//! Build a resampling manifest for one telemetry stream.
//!
//! Lists every timing file that can contribute frames to the query window,
//! infers per-frame start times from the preceding frame's end time, and
//! writes the window-filtered frames as a manifest for `telsamp-cube`.

use anyhow::{bail, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use telsamp_telemetry::grid::{plane_count, ResampleGrid};
use telsamp_telemetry::manifest::ManifestBuilder;
use telsamp_telemetry::time::{format_utc, ParseTimeSpecError, TimeSpec, TimeWindow};
use telsamp_telemetry::timing::{is_ignorable, TimingRow};

/// Discovery of timing files in date-partitioned directories.
mod discovery;

#[derive(Parser)]
#[command(author, version)]
#[command(about = "Build a resampling manifest for a telemetry stream", long_about = None)]
struct Args {
    /// Top-level telemetry directory (contains `YYYYMMDD` day directories)
    teldir: PathBuf,
    /// Name of the telemetry stream
    stream: String,
    /// Start of the output grid: `UTYYYYMMDDTHH[:MM[:SS.fff]]` or seconds
    /// since the epoch
    #[arg(value_parser = time_spec)]
    tstart: TimeSpec,
    /// End of the output grid: same grammars, or `+[[HH:]MM:]SS.fff`
    /// relative to TSTART
    #[arg(value_parser = time_spec)]
    tend: TimeSpec,
    /// Output sampling interval in seconds
    #[arg(value_parser = valid_sampling_interval)]
    dt: f64,
    /// Write the manifest into this directory
    #[arg(short, long, default_value = "./", value_parser(is_directory))]
    output_path: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let window = resolve_window(args.tstart, args.tend)?;
    let grid =
        ResampleGrid::new(window.tstart, args.dt).context("failed to construct output grid")?;

    let nominal_planes = plane_count(window.duration() / args.dt);
    println!(
        "tstart: {} ({:.6})",
        format_utc(window.tstart),
        window.tstart
    );
    println!("tend:   {} ({:.6})", format_utc(window.tend), window.tend);
    println!(
        "window: {:.6} s at dt = {:.6} s ({nominal_planes} output planes)",
        window.duration(),
        args.dt
    );

    let files = discovery::discover(&args.teldir, &args.stream, &window);
    let files = discovery::select_window(files, &window);
    for file in &files {
        match std::fs::canonicalize(&file.path) {
            Ok(path) => println!("{}", path.display()),
            Err(_) => println!("{}", file.path.display()),
        }
    }

    let bar = ProgressBar::new(files.len().try_into().unwrap()).with_style(
        ProgressStyle::with_template("  Scanning [{bar:25}] {percent}%,  ETA: {eta}")
            .unwrap()
            .progress_chars("=> "),
    );
    bar.tick();

    let mut builder = ManifestBuilder::new(window, grid);
    for file in &files {
        // Invalid names never survive discovery, so the file name is UTF-8.
        let source = file.path.file_name().unwrap().to_str().unwrap();
        scan_file(&mut builder, &file.path, source);
        bar.inc(1);
    }
    bar.finish_and_clear();

    let records = builder.into_records();
    let output = args.output_path.join(telsamp_analysis::manifest_file_name(&args.stream));
    let header = [
        format!("{} {}", env!("CARGO_BIN_NAME"), env!("CARGO_PKG_VERSION")),
        std::env::args().collect::<Vec<_>>().join(" "),
        "g fs fe src index rs re".to_owned(),
    ];
    telsamp_analysis::write_manifest(&output, &header, &records)
        .with_context(|| format!("failed to write `{}`", output.display()))?;
    eprintln!("Created `{}` ({} frames)", output.display(), records.len());

    Ok(())
}

// Pin the relative grammar to TEND and resolve it against TSTART.
fn resolve_window(tstart: TimeSpec, tend: TimeSpec) -> Result<TimeWindow> {
    let TimeSpec::Epoch(tstart) = tstart else {
        bail!("TSTART cannot be a relative offset");
    };
    let tend = match tend {
        TimeSpec::Epoch(tend) => tend,
        TimeSpec::Offset(offset) => tstart + offset,
    };
    TimeWindow::new(tstart, tend).context("invalid query window")
}

// Feed every data row of one timing file through the rolling chain. An
// unreadable file is warned about and breaks the chain; malformed rows are
// skipped silently.
fn scan_file(builder: &mut ManifestBuilder, path: &Path, source: &str) {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(error) => {
            eprintln!("Warning: failed to open `{}`: {error}", path.display());
            builder.break_chain();
            return;
        }
    };
    for line in BufReader::new(file).lines() {
        let line = match line {
            Ok(line) => line,
            Err(error) => {
                eprintln!("Warning: failed to read `{}`: {error}", path.display());
                builder.break_chain();
                return;
            }
        };
        if is_ignorable(&line) {
            continue;
        }
        let Ok(row) = TimingRow::try_from(line.as_str()) else {
            continue;
        };
        builder.push_row(source, row);
    }
}

/// Parse a `TSTART`/`TEND` argument as one of the three time grammars.
fn time_spec(s: &str) -> Result<TimeSpec, ParseTimeSpecError> {
    s.parse()
}

/// Parse the `DT` argument as a positive number of seconds.
fn valid_sampling_interval(s: &str) -> Result<f64> {
    let dt: f64 = s.parse().context("not a number")?;
    if dt.is_finite() && dt > 0.0 {
        Ok(dt)
    } else {
        bail!("`{dt}` is not a positive sampling interval")
    }
}

/// Parse `--output-path` flag as valid directory
fn is_directory(s: &str) -> Result<PathBuf> {
    let path: PathBuf = s.into();
    if path.is_dir() {
        Ok(path)
    } else {
        bail!("`{}` is not a directory on disk", path.display())
    }
}

#[cfg(test)]
mod tests;
