use std::collections::BTreeMap;
use telsamp_fitscube::{CubeWriter, FitsError};
use telsamp_telemetry::grid::{overlap, plane_span};

/// Per-plane coverage, reported in the companion log.
#[derive(Clone, Copy, Debug, Default, serde::Serialize)]
pub struct PlaneCoverage {
    pub plane: usize,
    /// Number of input frames that contributed.
    pub contributions: u32,
    /// Summed overlap weight; 1.0 for a fully covered plane.
    pub weight: f64,
}

/// Streaming accumulator of overlap-weighted output planes.
///
/// Records must arrive in non-decreasing grid start order. A plane becomes
/// active on its first contribution and is flushed to the output cube, in
/// ascending index, as soon as the current record can no longer reach it;
/// planes the manifest never touches are zero-filled on the way. The active
/// set therefore never holds more planes than a single input frame can
/// straddle.
pub struct Assembler {
    pixels: usize,
    planes: usize,
    /// Active accumulators keyed by output plane index.
    active: BTreeMap<usize, Vec<f32>>,
    /// Next plane index the writer expects.
    next_out: usize,
    writer: CubeWriter,
    zero: Vec<f32>,
    coverage: Vec<PlaneCoverage>,
}

impl Assembler {
    pub fn new(width: usize, height: usize, planes: usize, writer: CubeWriter) -> Self {
        let coverage = (0..planes)
            .map(|plane| PlaneCoverage {
                plane,
                ..Default::default()
            })
            .collect();
        Assembler {
            pixels: width * height,
            planes,
            active: BTreeMap::new(),
            next_out: 0,
            writer,
            zero: vec![0.0; width * height],
            coverage,
        }
    }

    /// Number of planes currently held in memory.
    pub fn active_planes(&self) -> usize {
        self.active.len()
    }

    /// Fold one input plane covering the grid interval `[start, end)` into
    /// the cube.
    pub fn add(&mut self, start: f64, end: f64, plane: &[f32]) -> Result<(), FitsError> {
        if plane.len() != self.pixels {
            return Err(FitsError::PlaneLengthMismatch {
                expected: self.pixels,
                found: plane.len(),
            });
        }
        let (first, last) = plane_span(start, end);
        // Planes before the grid origin do not exist.
        let first = first.max(0);
        // No future record can reach below `first` any more.
        self.flush_below(first as usize)?;
        for k in first..=last {
            let weight = overlap(start, end, k);
            if weight <= 0.0 {
                continue;
            }
            let k = k as usize;
            let acc = self
                .active
                .entry(k)
                .or_insert_with(|| vec![0.0; self.pixels]);
            let weight_f32 = weight as f32;
            for (acc, &value) in acc.iter_mut().zip(plane) {
                *acc += weight_f32 * value;
            }
            self.coverage[k].contributions += 1;
            self.coverage[k].weight += weight;
        }
        Ok(())
    }

    /// Flush the remaining active planes, zero-fill the tail, and finish
    /// the output cube. Returns the coverage table for the companion log.
    pub fn finish(mut self) -> Result<Vec<PlaneCoverage>, FitsError> {
        self.flush_below(self.planes)?;
        while self.next_out < self.planes {
            self.writer.write_plane(&self.zero)?;
            self.next_out += 1;
        }
        self.writer.finish()?;
        Ok(self.coverage)
    }

    fn flush_below(&mut self, limit: usize) -> Result<(), FitsError> {
        while let Some(entry) = self.active.first_entry() {
            if *entry.key() >= limit {
                break;
            }
            let (plane, accumulator) = entry.remove_entry();
            while self.next_out < plane {
                self.writer.write_plane(&self.zero)?;
                self.next_out += 1;
            }
            self.writer.write_plane(&accumulator)?;
            self.next_out += 1;
        }
        Ok(())
    }
}
