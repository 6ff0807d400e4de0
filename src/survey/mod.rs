//! # Survey stations and the trajectory-service seam
//!
//! This module holds the raw data model of a directional survey and the boundary to the
//! trajectory solver consumed by every component of the crate.
//!
//! ## Overview
//!
//! - [`Station`] – one survey measurement `(depth, inclination, azimuth)`, in degrees.
//! - [`TrajectoryPoint`] – one solved position `(depth, north, east, tvd)`.
//! - [`TrajectoryService`] – maps ordered stations plus a tie-on [`StartPoint`] to trajectory
//!   points. It is treated as a pure, deterministic function.
//! - [`MinimumCurvature`](crate::survey::min_curvature::MinimumCurvature) – the reference
//!   implementation shipped with the crate.
//!
//! Any closure with the signature
//! `Fn(&[Station], StartPoint) -> Result<Vec<TrajectoryPoint>, TrajectoryError>` is also a
//! [`TrajectoryService`], which makes it easy to plug an external solver or a failing stub.
//!
//! ## Validation
//!
//! The core does not validate station monotonicity itself (upstream parsers do). Services are
//! expected to reject fewer than two stations and non-monotonic depths; the helper
//! [`validate_stations`] implements those checks for service authors.
//!
//! ## See also
//! ------------
//! * [`crate::comparison::compare`] – Calls the service on resampled station sets.
//! * [`crate::inverse::solve_inverse`] – Calls the service repeatedly on perturbed orientations.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{Degree, Length, StartPoint};

pub mod min_curvature;

/// One directional survey measurement.
///
/// Stations are ordered by `depth` ascending; the caller guarantees strict monotonicity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub depth: Length,
    pub inclination_deg: Degree,
    pub azimuth_deg: Degree,
}

impl Station {
    pub fn new(depth: Length, inclination_deg: Degree, azimuth_deg: Degree) -> Self {
        Station {
            depth,
            inclination_deg,
            azimuth_deg,
        }
    }
}

impl From<(f64, f64, f64)> for Station {
    fn from((depth, inclination_deg, azimuth_deg): (f64, f64, f64)) -> Self {
        Station::new(depth, inclination_deg, azimuth_deg)
    }
}

/// A solved position along the wellbore.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    pub depth: Length,
    pub north: Length,
    pub east: Length,
    pub tvd: Length,
}

/// Build a station list from parallel depth / inclination / azimuth slices.
///
/// Arguments
/// -----------------
/// * `depth`, `inclination`, `azimuth`: Parallel slices of equal length.
///
/// Return
/// ----------
/// * The zipped stations. Extra trailing entries of longer slices are ignored; callers that
///   need a strict check compare lengths first.
pub fn stations_from_slices(depth: &[f64], inclination: &[f64], azimuth: &[f64]) -> Vec<Station> {
    itertools::izip!(depth, inclination, azimuth)
        .map(|(&d, &i, &a)| Station::new(d, i, a))
        .collect()
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrajectoryError {
    #[error("At least 2 stations are required, got {0}")]
    NotEnoughStations(usize),

    #[error("Depth is not strictly increasing at station {index}: {previous} then {current}")]
    NonMonotonicDepth {
        index: usize,
        previous: f64,
        current: f64,
    },

    #[error("Non-finite value at station {index}")]
    NonFinite { index: usize },

    #[error("Degenerate trajectory input: {0}")]
    Degenerate(String),
}

/// Boundary to the trajectory solver.
///
/// Implementations must be deterministic for identical inputs and must return exactly one
/// [`TrajectoryPoint`] per input [`Station`], in the same order.
pub trait TrajectoryService {
    /// Solve the positions of `stations`, anchored at `start_point` for the first station.
    fn compute(
        &self,
        stations: &[Station],
        start_point: StartPoint,
    ) -> Result<Vec<TrajectoryPoint>, TrajectoryError>;
}

impl<F> TrajectoryService for F
where
    F: Fn(&[Station], StartPoint) -> Result<Vec<TrajectoryPoint>, TrajectoryError>,
{
    fn compute(
        &self,
        stations: &[Station],
        start_point: StartPoint,
    ) -> Result<Vec<TrajectoryPoint>, TrajectoryError> {
        self(stations, start_point)
    }
}

/// Check the preconditions every trajectory service shares.
///
/// Return
/// ----------
/// * `Ok(())` when there are at least two finite stations with strictly increasing depth.
pub fn validate_stations(stations: &[Station]) -> Result<(), TrajectoryError> {
    if stations.len() < 2 {
        return Err(TrajectoryError::NotEnoughStations(stations.len()));
    }

    for (index, st) in stations.iter().enumerate() {
        if !(st.depth.is_finite() && st.inclination_deg.is_finite() && st.azimuth_deg.is_finite())
        {
            return Err(TrajectoryError::NonFinite { index });
        }
        if index > 0 {
            let previous = stations[index - 1].depth;
            if st.depth <= previous {
                return Err(TrajectoryError::NonMonotonicDepth {
                    index,
                    previous,
                    current: st.depth,
                });
            }
        }
    }
    Ok(())
}
