//! # Resampling onto a shared depth grid
//!
//! Two surveys of the same well are rarely sampled at the same measured depths. Before they
//! can be compared point-for-point, both are interpolated onto a common, evenly spaced grid
//! covering only the depth range where they **overlap**:
//!
//! ```text
//! min_overlap = max(first depths)
//! max_overlap = min(last depths)
//! grid        = [min_overlap, min_overlap + h, …, max_overlap]
//! ```
//!
//! The last node is always `max_overlap` itself (appended when the step does not land on it)
//! and nodes closer than a depth tolerance are merged. Values are linearly interpolated inside
//! the overlap; nothing is ever extrapolated.
//!
//! Azimuth is circular: [`interpolate_azimuth`] walks the shortest arc between neighbouring
//! samples, so `359°` and `1°` interpolate through `0°` rather than through `180°`.
//!
//! All functions here are pure.
//!
//! ## See also
//! ------------
//! * [`crate::comparison::compare`] – Aligns two station sets with [`align_stations`].

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::constants::{Degree, Length, DEPTH_EPS, MAX_GRID_NODES};
use crate::survey::Station;
use crate::wellpath_errors::WellpathError;

/// Two station sequences sampled at exactly the same depths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedPair {
    pub reference: Vec<Station>,
    pub candidate: Vec<Station>,
}

impl AlignedPair {
    /// The shared depth vector.
    pub fn depth(&self) -> Vec<Length> {
        self.reference.iter().map(|s| s.depth).collect()
    }

    pub fn len(&self) -> usize {
        self.reference.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reference.is_empty()
    }
}

/// Tolerance scaled to the magnitude of the depths involved.
#[inline]
fn depth_tolerance(scale: f64) -> f64 {
    DEPTH_EPS * scale.abs().max(1.0)
}

/// Build the evenly spaced grid covering the overlap of two depth vectors.
///
/// Arguments
/// -----------------
/// * `depth_a`, `depth_b`: Depth vectors sorted ascending.
/// * `step`: Grid spacing, strictly positive.
///
/// Return
/// ----------
/// * The grid, or [`WellpathError::EmptyOverlap`] when the ranges do not intersect.
///
/// Errors
/// ----------
/// * [`WellpathError::InvalidParameter`] if `step` is not a positive finite number, or is so
///   small the grid would exceed [`MAX_GRID_NODES`] nodes.
/// * [`WellpathError::InputMismatch`] if either depth vector is empty.
pub fn common_depth_grid(
    depth_a: &[Length],
    depth_b: &[Length],
    step: Length,
) -> Result<Vec<Length>, WellpathError> {
    if !(step.is_finite() && step > 0.0) {
        return Err(WellpathError::InvalidParameter(format!(
            "resampling step must be > 0, got {step}"
        )));
    }

    let (Some(first_a), Some(last_a)) = (depth_a.first(), depth_a.last()) else {
        return Err(WellpathError::InputMismatch("empty depth vector".into()));
    };
    let (Some(first_b), Some(last_b)) = (depth_b.first(), depth_b.last()) else {
        return Err(WellpathError::InputMismatch("empty depth vector".into()));
    };

    let min_overlap = first_a.max(*first_b);
    let max_overlap = last_a.min(*last_b);

    if min_overlap > max_overlap {
        return Err(WellpathError::EmptyOverlap {
            min_overlap,
            max_overlap,
        });
    }

    let tol = depth_tolerance(max_overlap);
    let n_steps = ((max_overlap - min_overlap + tol) / step).floor();
    if !n_steps.is_finite() || n_steps >= MAX_GRID_NODES as f64 {
        return Err(WellpathError::InvalidParameter(format!(
            "step {step} over [{min_overlap}, {max_overlap}] exceeds {MAX_GRID_NODES} grid nodes"
        )));
    }
    let n_steps = n_steps as usize;

    let mut grid: Vec<Length> = (0..=n_steps)
        .map(|k| (min_overlap + k as f64 * step).min(max_overlap))
        .collect();

    if grid.last().is_some_and(|&last| max_overlap - last > tol) {
        grid.push(max_overlap);
    }

    Ok(grid
        .into_iter()
        .dedup_by(|a, b| (a - b).abs() <= tol)
        .collect())
}

/// Locate the bracketing segment of `x` in `xs` and the interpolation weight.
///
/// Returns `(lower_index, upper_index, t)` with `t ∈ [0, 1]`; outside the range the nearest
/// end sample is returned with `t = 0`.
fn bracket(xs: &[f64], x: f64) -> (usize, usize, f64) {
    let idx = xs.partition_point(|&d| d < x);
    if idx == 0 {
        return (0, 0, 0.0);
    }
    if idx >= xs.len() {
        let last = xs.len() - 1;
        return (last, last, 0.0);
    }
    let (x0, x1) = (xs[idx - 1], xs[idx]);
    let span = x1 - x0;
    if span <= 0.0 {
        return (idx, idx, 0.0);
    }
    (idx - 1, idx, (x - x0) / span)
}

/// Linearly interpolate `values` sampled at `depth` onto `grid`.
///
/// `depth` must be sorted ascending and non-empty; grid nodes outside its range take the
/// nearest end value (the grid is always built inside the overlap, so this only absorbs
/// rounding at the edges).
pub fn interpolate_linear(depth: &[Length], values: &[f64], grid: &[Length]) -> Vec<f64> {
    grid.iter()
        .map(|&x| {
            let (lo, hi, t) = bracket(depth, x);
            values[lo] + t * (values[hi] - values[lo])
        })
        .collect()
}

/// Signed shortest angular difference `to − from`, in `(-180°, 180°]`.
#[inline]
pub fn azimuth_difference(to: Degree, from: Degree) -> Degree {
    let d = (to - from + 180.0).rem_euclid(360.0) - 180.0;
    if d == -180.0 {
        180.0
    } else {
        d
    }
}

/// Interpolate azimuths along the shortest arc, wrapped into `[0°, 360°)`.
pub fn interpolate_azimuth(depth: &[Length], azimuth: &[Degree], grid: &[Length]) -> Vec<Degree> {
    grid.iter()
        .map(|&x| {
            let (lo, hi, t) = bracket(depth, x);
            let sweep = azimuth_difference(azimuth[hi], azimuth[lo]);
            (azimuth[lo] + t * sweep).rem_euclid(360.0)
        })
        .collect()
}

/// Resample a station list onto `grid`.
pub fn resample_stations(stations: &[Station], grid: &[Length]) -> Vec<Station> {
    let depth = stations.iter().map(|s| s.depth).collect_vec();
    let inclination = stations.iter().map(|s| s.inclination_deg).collect_vec();
    let azimuth = stations.iter().map(|s| s.azimuth_deg).collect_vec();

    let inc = interpolate_linear(&depth, &inclination, grid);
    let azi = interpolate_azimuth(&depth, &azimuth, grid);

    itertools::izip!(grid, inc, azi)
        .map(|(&d, i, a)| Station::new(d, i, a))
        .collect()
}

/// Align two station lists onto their common depth grid.
///
/// Arguments
/// -----------------
/// * `reference`, `candidate`: Depth-ordered station lists (possibly different depths).
/// * `step`: Grid spacing.
///
/// Return
/// ----------
/// * An [`AlignedPair`] whose two sequences share exactly the same depth vector.
///
/// See also
/// ------------
/// * [`common_depth_grid`] – Grid construction and overlap errors.
pub fn align_stations(
    reference: &[Station],
    candidate: &[Station],
    step: Length,
) -> Result<AlignedPair, WellpathError> {
    let ref_depth = reference.iter().map(|s| s.depth).collect_vec();
    let cand_depth = candidate.iter().map(|s| s.depth).collect_vec();

    let grid = common_depth_grid(&ref_depth, &cand_depth, step)?;

    Ok(AlignedPair {
        reference: resample_stations(reference, &grid),
        candidate: resample_stations(candidate, &grid),
    })
}
