use thiserror::Error;

// Guard against an acquisition boundary landing exactly on a plane boundary.
const PLANE_EPSILON: f64 = 1e-9;

/// The error type returned when constructing a [`ResampleGrid`] with an
/// unusable sampling interval.
#[derive(Debug, Error)]
#[error("bad sampling interval `{dt}` (expected a finite positive number)")]
pub struct InvalidSamplingInterval {
    dt: f64,
}

/// Uniform output time grid.
///
/// Grid coordinates express time as `(t − tstart) / dt`, so integer values
/// coincide with output plane boundaries and plane `k` covers `[k, k + 1)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResampleGrid {
    tstart: f64,
    dt: f64,
}

impl ResampleGrid {
    pub fn new(tstart: f64, dt: f64) -> Result<Self, InvalidSamplingInterval> {
        if dt.is_finite() && dt > 0.0 {
            Ok(ResampleGrid { tstart, dt })
        } else {
            Err(InvalidSamplingInterval { dt })
        }
    }

    pub fn tstart(&self) -> f64 {
        self.tstart
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Map an absolute time (seconds since the Unix epoch) to grid
    /// coordinates.
    pub fn to_grid(&self, t: f64) -> f64 {
        (t - self.tstart) / self.dt
    }
}

/// Output planes `[k₀, k₁]` overlapped by the grid interval `[start, end)`.
///
/// An interval ending exactly on a plane boundary does not reach into the
/// next plane. Indices may be negative for intervals starting before the
/// grid origin.
pub fn plane_span(start: f64, end: f64) -> (i64, i64) {
    (start.floor() as i64, (end - PLANE_EPSILON).floor() as i64)
}

/// Overlap of the grid interval `[start, end)` with output plane `k`, in
/// grid units. Zero when they are disjoint.
pub fn overlap(start: f64, end: f64, k: i64) -> f64 {
    let lo = start.max(k as f64);
    let hi = end.min((k + 1) as f64);
    (hi - lo).max(0.0)
}

/// Number of output planes needed to hold everything up to the grid
/// coordinate `end`: `⌊end − ε⌋ + 1`.
pub fn plane_count(end: f64) -> usize {
    let planes = (end - PLANE_EPSILON).floor() as i64 + 1;
    planes.max(0) as usize
}
