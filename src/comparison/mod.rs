//! # Trajectory comparison
//!
//! This module aligns a **reference** survey and a **candidate** survey of the same well and
//! measures how far apart their trajectories are, point by point.
//!
//! ## Pipeline
//!
//! 1. **Angle-space alignment** – both station lists are resampled onto their common depth
//!    grid with [`align_stations`](crate::resampler::align_stations). Alignment happens on
//!    inclination/azimuth, *before* any position is computed, because the two surveys are
//!    generally measured at different depths.
//! 2. **Positions** – the [`TrajectoryService`] is run on each aligned station list, both tied
//!    on at the same start point, giving two position trajectories that are comparable
//!    node-for-node.
//! 3. **Deltas** – for every node (`reference − candidate`):
//!    * `Δnorth`, `Δeast`, `Δtvd`,
//!    * `horizontal = √(Δnorth² + Δeast²)`, `displacement = √(Δnorth² + Δeast² + Δtvd²)`,
//!    * `Δinclination`,
//!    * `Δazimuth`, wrapped into `(-180°, 180°]` so `359° − 1° = −2°`.
//! 4. **Summary** – maximum and mean absolute value of every channel, plus the maximum
//!    displacement and the depth where it first occurs.
//!
//! The whole computation is deterministic: the same inputs always produce a bit-identical
//! [`ComparisonResult`].
//!
//! ## Example
//!
//! ```rust
//! use wellpath::comparison::{compare, ComparisonParams};
//! use wellpath::survey::{min_curvature::MinimumCurvature, Station};
//!
//! let reference = vec![
//!     Station::new(0.0, 0.0, 0.0),
//!     Station::new(100.0, 10.0, 45.0),
//!     Station::new(200.0, 20.0, 90.0),
//! ];
//! let params = ComparisonParams::builder().step(25.0).build().unwrap();
//!
//! let result = compare(&MinimumCurvature, &reference, &reference, &params).unwrap();
//! assert_eq!(result.summary.max_displacement, 0.0);
//! ```
//!
//! ## See also
//! ------------
//! * [`crate::resampler`] – Grid construction and interpolation.
//! * [`crate::adjustment`] – Corrections applied on top of a comparison's candidate arrays.

use std::fmt;

use itertools::{izip, Itertools};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{Degree, Length, StartPoint, DEFAULT_STEP};
use crate::resampler::{align_stations, azimuth_difference, AlignedPair};
use crate::survey::{Station, TrajectoryPoint, TrajectoryService};
use crate::wellpath_errors::WellpathError;

pub mod display;

/// Parameters of a comparison.
///
/// Fields
/// -----------------
/// * `step` – spacing of the common depth grid (same unit as the station depths).
/// * `start_point` – tie-on `(north, east, tvd)` shared by both trajectories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonParams {
    pub step: Length,
    pub start_point: StartPoint,
}

impl Default for ComparisonParams {
    fn default() -> Self {
        ComparisonParams {
            step: DEFAULT_STEP,
            start_point: StartPoint::zeros(),
        }
    }
}

impl ComparisonParams {
    pub fn builder() -> ComparisonParamsBuilder {
        ComparisonParamsBuilder::new()
    }
}

/// Builder for [`ComparisonParams`], with validation.
#[derive(Debug, Clone, Default)]
pub struct ComparisonParamsBuilder {
    params: ComparisonParams,
}

impl ComparisonParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: ComparisonParams::default(),
        }
    }

    pub fn step(mut self, v: Length) -> Self {
        self.params.step = v;
        self
    }

    pub fn start_point(mut self, v: StartPoint) -> Self {
        self.params.start_point = v;
        self
    }

    /// Finalize the builder.
    ///
    /// Validation rules
    /// -----------------
    /// * `step` must be finite and strictly positive.
    /// * every component of `start_point` must be finite.
    pub fn build(self) -> Result<ComparisonParams, WellpathError> {
        let p = &self.params;
        if !(p.step.is_finite() && p.step > 0.0) {
            return Err(WellpathError::InvalidParameter(format!(
                "step must be > 0, got {}",
                p.step
            )));
        }
        if p.start_point.iter().any(|c| !c.is_finite()) {
            return Err(WellpathError::InvalidParameter(
                "start_point must be finite".into(),
            ));
        }
        Ok(self.params)
    }
}

impl fmt::Display for ComparisonParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ComparisonParams(step={:.2}, start=[N {:.2}, E {:.2}, TVD {:.2}])",
            self.step, self.start_point.x, self.start_point.y, self.start_point.z
        )
    }
}

/// Per-node differences `reference − candidate`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ComparisonDeltas {
    pub north: Vec<Length>,
    pub east: Vec<Length>,
    pub tvd: Vec<Length>,
    pub horizontal: Vec<Length>,
    pub displacement: Vec<Length>,
    pub inclination: Vec<Degree>,
    pub azimuth: Vec<Degree>,
}

/// Aggregate statistics over a [`ComparisonDeltas`].
///
/// `max_*` fields hold the largest absolute value of the channel and `avg_*` fields the mean
/// absolute value. `max_displacement_depth` is the depth of the first node reaching
/// `max_displacement`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub max_north: Length,
    pub max_east: Length,
    pub max_tvd: Length,
    pub max_horizontal: Length,
    pub max_displacement: Length,
    pub max_inclination: Degree,
    pub max_azimuth: Degree,
    pub avg_north: Length,
    pub avg_east: Length,
    pub avg_tvd: Length,
    pub avg_horizontal: Length,
    pub avg_displacement: Length,
    pub avg_inclination: Degree,
    pub avg_azimuth: Degree,
    pub max_displacement_depth: Length,
    pub point_count: usize,
}

/// Outcome of [`compare`]. Immutable once built; owned by the caller for persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub depth: Vec<Length>,
    pub aligned: AlignedPair,
    pub reference_path: Vec<TrajectoryPoint>,
    pub candidate_path: Vec<TrajectoryPoint>,
    pub deltas: ComparisonDeltas,
    pub summary: ComparisonSummary,
}

impl ComparisonResult {
    /// Candidate positions as `(north, east, tvd)` column vectors.
    pub fn candidate_columns(&self) -> (Vec<Length>, Vec<Length>, Vec<Length>) {
        self.candidate_path
            .iter()
            .map(|p| (p.north, p.east, p.tvd))
            .multiunzip()
    }
}

fn max_abs(values: &[f64]) -> f64 {
    values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()))
}

fn mean_abs(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().map(|v| v.abs()).sum::<f64>() / values.len() as f64
    }
}

/// Compute per-node deltas between two position trajectories sampled on the same grid.
///
/// Arguments
/// -----------------
/// * `aligned`: The angle-space aligned stations (source of the inclination/azimuth deltas).
/// * `reference_path`, `candidate_path`: Position trajectories on the same depths as `aligned`.
///
/// Return
/// ----------
/// * The [`ComparisonDeltas`] of `reference − candidate`.
pub fn compute_deltas(
    aligned: &AlignedPair,
    reference_path: &[TrajectoryPoint],
    candidate_path: &[TrajectoryPoint],
) -> ComparisonDeltas {
    let mut deltas = ComparisonDeltas::default();

    for (r_st, c_st, r_pt, c_pt) in izip!(
        &aligned.reference,
        &aligned.candidate,
        reference_path,
        candidate_path
    ) {
        let d = Vector3::new(r_pt.north - c_pt.north, r_pt.east - c_pt.east, r_pt.tvd - c_pt.tvd);

        deltas.north.push(d.x);
        deltas.east.push(d.y);
        deltas.tvd.push(d.z);
        deltas.horizontal.push(d.xy().norm());
        deltas.displacement.push(d.norm());
        deltas
            .inclination
            .push(r_st.inclination_deg - c_st.inclination_deg);
        deltas
            .azimuth
            .push(azimuth_difference(r_st.azimuth_deg, c_st.azimuth_deg));
    }

    deltas
}

/// Aggregate a set of deltas sampled at `depth`.
pub fn summarize(depth: &[Length], deltas: &ComparisonDeltas) -> ComparisonSummary {
    // Strict comparison keeps the first node on ties.
    let (max_idx, max_displacement) = deltas.displacement.iter().enumerate().fold(
        (0usize, 0.0_f64),
        |(best_i, best), (i, &v)| if v > best { (i, v) } else { (best_i, best) },
    );

    ComparisonSummary {
        max_north: max_abs(&deltas.north),
        max_east: max_abs(&deltas.east),
        max_tvd: max_abs(&deltas.tvd),
        max_horizontal: max_abs(&deltas.horizontal),
        max_displacement,
        max_inclination: max_abs(&deltas.inclination),
        max_azimuth: max_abs(&deltas.azimuth),
        avg_north: mean_abs(&deltas.north),
        avg_east: mean_abs(&deltas.east),
        avg_tvd: mean_abs(&deltas.tvd),
        avg_horizontal: mean_abs(&deltas.horizontal),
        avg_displacement: mean_abs(&deltas.displacement),
        avg_inclination: mean_abs(&deltas.inclination),
        avg_azimuth: mean_abs(&deltas.azimuth),
        max_displacement_depth: depth.get(max_idx).copied().unwrap_or_default(),
        point_count: depth.len(),
    }
}

/// Compare a reference and a candidate survey.
///
/// Arguments
/// -----------------
/// * `service`: The trajectory solver used to turn aligned stations into positions.
/// * `reference_stations`, `candidate_stations`: Depth-ordered surveys (at least 2 stations each).
/// * `params`: Grid step and shared tie-on point.
///
/// Return
/// ----------
/// * A [`ComparisonResult`] holding the shared depth vector, per-node deltas and summary.
///
/// Errors
/// ----------
/// * [`WellpathError::InputMismatch`] if either survey has fewer than 2 stations or the
///   overlap collapses to a single depth.
/// * [`WellpathError::EmptyOverlap`] if the surveys share no depth range.
/// * [`WellpathError::Trajectory`] if the service rejects an aligned survey.
pub fn compare<S>(
    service: &S,
    reference_stations: &[Station],
    candidate_stations: &[Station],
    params: &ComparisonParams,
) -> Result<ComparisonResult, WellpathError>
where
    S: TrajectoryService + ?Sized,
{
    if reference_stations.len() < 2 || candidate_stations.len() < 2 {
        return Err(WellpathError::InputMismatch(format!(
            "comparison needs at least 2 stations per survey (reference: {}, candidate: {})",
            reference_stations.len(),
            candidate_stations.len()
        )));
    }

    let aligned = align_stations(reference_stations, candidate_stations, params.step)?;
    let depth = aligned.depth();

    if depth.len() < 2 {
        return Err(WellpathError::InputMismatch(format!(
            "surveys overlap at a single depth ({:?})",
            depth.first()
        )));
    }

    debug!(
        points = depth.len(),
        from = depth[0],
        to = depth[depth.len() - 1],
        step = params.step,
        "aligned surveys on common depth grid"
    );

    let reference_path = service.compute(&aligned.reference, params.start_point)?;
    let candidate_path = service.compute(&aligned.candidate, params.start_point)?;

    if reference_path.len() != depth.len() || candidate_path.len() != depth.len() {
        return Err(WellpathError::InputMismatch(format!(
            "trajectory service returned {} / {} points for {} stations",
            reference_path.len(),
            candidate_path.len(),
            depth.len()
        )));
    }

    let deltas = compute_deltas(&aligned, &reference_path, &candidate_path);
    let summary = summarize(&depth, &deltas);

    debug!(
        max_displacement = summary.max_displacement,
        at_depth = summary.max_displacement_depth,
        "comparison done"
    );

    Ok(ComparisonResult {
        depth,
        aligned,
        reference_path,
        candidate_path,
        deltas,
        summary,
    })
}

#[cfg(test)]
mod test_comparison {
    use approx::assert_relative_eq;

    use super::*;
    use crate::survey::{min_curvature::MinimumCurvature, TrajectoryError};

    fn scenario_stations() -> Vec<Station> {
        vec![
            Station::new(0.0, 0.0, 0.0),
            Station::new(100.0, 10.0, 45.0),
            Station::new(200.0, 20.0, 90.0),
        ]
    }

    #[test]
    fn test_self_comparison_is_zero() {
        let stations = scenario_stations();
        let params = ComparisonParams::builder().step(10.0).build().unwrap();
        let result = compare(&MinimumCurvature, &stations, &stations, &params).unwrap();

        assert_eq!(result.depth.len(), 21);
        for channel in [
            &result.deltas.north,
            &result.deltas.east,
            &result.deltas.tvd,
            &result.deltas.horizontal,
            &result.deltas.displacement,
            &result.deltas.inclination,
            &result.deltas.azimuth,
        ] {
            assert!(channel.iter().all(|&v| v == 0.0));
        }
        assert_eq!(result.summary.max_displacement, 0.0);
        assert_eq!(result.summary.max_displacement_depth, 0.0);
    }

    #[test]
    fn test_azimuth_delta_wraps() {
        let reference = vec![Station::new(0.0, 5.0, 359.0), Station::new(100.0, 5.0, 359.0)];
        let candidate = vec![Station::new(0.0, 5.0, 1.0), Station::new(100.0, 5.0, 1.0)];
        let params = ComparisonParams::builder().step(50.0).build().unwrap();

        let result = compare(&MinimumCurvature, &reference, &candidate, &params).unwrap();
        for d in &result.deltas.azimuth {
            assert_relative_eq!(*d, -2.0, epsilon = 1e-9);
        }
        assert_relative_eq!(result.summary.max_azimuth, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_offset_surveys() {
        // Candidate reads 1° less inclination all along a straight tangent.
        let reference = vec![Station::new(0.0, 30.0, 0.0), Station::new(300.0, 30.0, 0.0)];
        let candidate = vec![Station::new(0.0, 29.0, 0.0), Station::new(300.0, 29.0, 0.0)];
        let params = ComparisonParams::builder().step(100.0).build().unwrap();

        let result = compare(&MinimumCurvature, &reference, &candidate, &params).unwrap();

        let expected_north =
            300.0 * (30.0_f64.to_radians().sin() - 29.0_f64.to_radians().sin());
        assert_relative_eq!(result.deltas.north[3], expected_north, epsilon = 1e-9);
        assert_relative_eq!(result.summary.max_inclination, 1.0, epsilon = 1e-12);
        assert_eq!(result.summary.max_displacement_depth, 300.0);
        assert!(result.summary.avg_displacement < result.summary.max_displacement);
    }

    #[test]
    fn test_max_displacement_first_occurrence() {
        let depth = vec![0.0, 10.0, 20.0, 30.0];
        let deltas = ComparisonDeltas {
            displacement: vec![0.0, 2.0, 2.0, 1.0],
            ..Default::default()
        };
        let summary = summarize(&depth, &deltas);
        assert_eq!(summary.max_displacement, 2.0);
        assert_eq!(summary.max_displacement_depth, 10.0);
    }

    #[test]
    fn test_compare_errors() {
        let stations = scenario_stations();
        let params = ComparisonParams::default();

        assert!(matches!(
            compare(&MinimumCurvature, &stations[..1], &stations, &params),
            Err(WellpathError::InputMismatch(_))
        ));

        let deeper = vec![Station::new(500.0, 0.0, 0.0), Station::new(600.0, 0.0, 0.0)];
        assert_eq!(
            compare(&MinimumCurvature, &stations, &deeper, &params).unwrap_err(),
            WellpathError::EmptyOverlap {
                min_overlap: 500.0,
                max_overlap: 200.0
            }
        );

        let touching = vec![Station::new(200.0, 20.0, 90.0), Station::new(300.0, 25.0, 95.0)];
        assert!(matches!(
            compare(&MinimumCurvature, &stations, &touching, &params),
            Err(WellpathError::InputMismatch(_))
        ));

        let tiny_step = ComparisonParams::builder().step(1e-300).build().unwrap();
        assert!(matches!(
            compare(&MinimumCurvature, &stations, &stations, &tiny_step),
            Err(WellpathError::InvalidParameter(_))
        ));

        let failing = |_: &[Station], _: StartPoint| -> Result<Vec<TrajectoryPoint>, TrajectoryError> {
            Err(TrajectoryError::Degenerate("offline".into()))
        };
        assert_eq!(
            compare(&failing, &stations, &stations, &params).unwrap_err(),
            WellpathError::Trajectory(TrajectoryError::Degenerate("offline".into()))
        );
    }

    #[test]
    fn test_params_validation() {
        assert!(ComparisonParams::builder().step(-1.0).build().is_err());
        assert!(ComparisonParams::builder()
            .start_point(StartPoint::new(f64::NAN, 0.0, 0.0))
            .build()
            .is_err());
        let p = ComparisonParams::builder()
            .step(5.0)
            .start_point(StartPoint::new(1.0, 2.0, 3.0))
            .build()
            .unwrap();
        assert_eq!(
            p.to_string(),
            "ComparisonParams(step=5.00, start=[N 1.00, E 2.00, TVD 3.00])"
        );
    }
}
