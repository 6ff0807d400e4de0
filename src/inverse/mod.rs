//! # Inverse orientation search
//!
//! Once an operator has moved parts of a trajectory in space, the survey angles no longer
//! match the path. This module recovers inclination/azimuth arrays that reproduce a given
//! 3-D path as closely as possible when fed back through the [`TrajectoryService`].
//!
//! ## Algorithm
//!
//! 1. **Seed** – for each pair of consecutive nodes, the chord direction gives
//!    `inclination = acos(clamp(Δtvd / Δdepth, −1, 1))` and
//!    `azimuth = atan2(Δeast, Δnorth) mod 360`, assigned to the lower node. A degenerate
//!    segment (`Δdepth ≤ 0`) leaves the node at zero. The tie-on node takes the orientation of
//!    the first segment.
//! 2. **Local search** – iteration `0` evaluates the seed. Every later iteration perturbs the
//!    best arrays so far with Gaussian noise (`σ_inc`, clamped to `[0°, 180°]`; `σ_azi`,
//!    wrapped into `[0°, 360°)`), runs the service, and keeps the trial if its residual
//!
//!    ```text
//!    residual = √ Σᵢ (Δnorthᵢ² + Δeastᵢ² + Δtvdᵢ²)
//!    ```
//!
//!    is **strictly** lower than the best so far.
//! 3. The best arrays and their residual are returned.
//!
//! This is a randomized, local, non-convex search: it is not guaranteed to reach the global
//! optimum and its cost is linear in `iterations × points`. The random generator is passed in
//! explicitly, so a seeded generator reproduces a run exactly.
//!
//! ## Failures
//!
//! * If the service rejects the **seed**, the whole solve fails with
//!   [`WellpathError::SeedCalculation`].
//! * If it rejects a perturbed trial, the trial is logged at `debug` level and skipped.
//!
//! ## Example
//!
//! ```rust
//! use rand::{rngs::StdRng, SeedableRng};
//! use wellpath::inverse::{solve_inverse, InverseParams, TargetPath};
//! use wellpath::survey::min_curvature::MinimumCurvature;
//!
//! let depth = vec![0.0, 100.0, 200.0];
//! let target = TargetPath::new(depth.clone(), vec![0.0; 3], vec![0.0; 3], depth).unwrap();
//! let params = InverseParams::builder().iterations(50).build().unwrap();
//! let mut rng = StdRng::seed_from_u64(42);
//!
//! let solution = solve_inverse(&MinimumCurvature, &target, &params, &mut rng).unwrap();
//! assert!(solution.residual_error < 0.01);
//! ```

use std::cmp::Ordering::{Equal, Greater};
use std::fmt;

use itertools::{izip, Itertools};
use rand::Rng;
use rand_distr::Normal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::adjustment::AdjustmentSnapshot;
use crate::constants::{
    Degree, Length, StartPoint, DEFAULT_AZIMUTH_SIGMA, DEFAULT_INCLINATION_SIGMA,
    DEFAULT_INVERSE_ITERATIONS,
};
use crate::survey::{stations_from_slices, TrajectoryPoint, TrajectoryService};
use crate::wellpath_errors::WellpathError;

mod progress_bar;

use progress_bar::SolverProgress;

/// Configuration of [`solve_inverse`].
///
/// Fields
/// -----------------
/// * `iterations` – total number of evaluations, the seed included (`≥ 1`).
/// * `inclination_sigma` – standard deviation of the inclination perturbation, degrees.
/// * `azimuth_sigma` – standard deviation of the azimuth perturbation, degrees.
///
/// Defaults
/// -----------------
/// * `iterations`: 100
/// * `inclination_sigma`: 0.5°
/// * `azimuth_sigma`: 5.0°
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InverseParams {
    pub iterations: usize,
    pub inclination_sigma: Degree,
    pub azimuth_sigma: Degree,
}

impl Default for InverseParams {
    fn default() -> Self {
        InverseParams {
            iterations: DEFAULT_INVERSE_ITERATIONS,
            inclination_sigma: DEFAULT_INCLINATION_SIGMA,
            azimuth_sigma: DEFAULT_AZIMUTH_SIGMA,
        }
    }
}

impl InverseParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> InverseParamsBuilder {
        InverseParamsBuilder::new()
    }
}

/// Builder for [`InverseParams`], with validation.
#[derive(Debug, Clone, Default)]
pub struct InverseParamsBuilder {
    params: InverseParams,
}

impl InverseParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: InverseParams::default(),
        }
    }

    pub fn iterations(mut self, v: usize) -> Self {
        self.params.iterations = v;
        self
    }

    pub fn inclination_sigma(mut self, v: Degree) -> Self {
        self.params.inclination_sigma = v;
        self
    }

    pub fn azimuth_sigma(mut self, v: Degree) -> Self {
        self.params.azimuth_sigma = v;
        self
    }

    /// Return true iff x >= 0.0 and comparable (i.e., not NaN) and finite.
    #[inline]
    fn ge0(x: f64) -> bool {
        x.is_finite() && matches!(x.partial_cmp(&0.0), Some(Greater) | Some(Equal))
    }

    /// Finalize the builder.
    ///
    /// Validation rules
    /// -----------------
    /// * `iterations ≥ 1` – the seed evaluation always counts as one iteration.
    /// * `inclination_sigma ≥ 0`, `azimuth_sigma ≥ 0`, both finite.
    pub fn build(self) -> Result<InverseParams, WellpathError> {
        let p = &self.params;
        if p.iterations == 0 {
            return Err(WellpathError::InvalidParameter(
                "iterations must be >= 1".into(),
            ));
        }
        if !Self::ge0(p.inclination_sigma) || !Self::ge0(p.azimuth_sigma) {
            return Err(WellpathError::InvalidParameter(
                "perturbation sigmas must be finite and >= 0".into(),
            ));
        }
        Ok(self.params)
    }
}

impl fmt::Display for InverseParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "Inverse Solver Parameters")?;
            writeln!(f, "-------------------------")?;
            writeln!(
                f,
                "  iterations        = {:<10} # Evaluations, seed included",
                self.iterations
            )?;
            writeln!(
                f,
                "  inclination_sigma = {:<10.3} # Inclination perturbation σ [deg]",
                self.inclination_sigma
            )?;
            writeln!(
                f,
                "  azimuth_sigma     = {:<10.3} # Azimuth perturbation σ [deg]",
                self.azimuth_sigma
            )
        } else {
            write!(
                f,
                "InverseParams(iterations={}, σ_inc={:.2}°, σ_azi={:.2}°)",
                self.iterations, self.inclination_sigma, self.azimuth_sigma
            )
        }
    }
}

/// The 3-D path the search tries to reproduce.
///
/// Always holds at least two nodes and four columns of equal length; the only ways in are
/// [`TargetPath::new`] and deserialization, which goes through the same checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TargetColumns")]
pub struct TargetPath {
    depth: Vec<Length>,
    north: Vec<Length>,
    east: Vec<Length>,
    tvd: Vec<Length>,
}

#[derive(Deserialize)]
struct TargetColumns {
    depth: Vec<Length>,
    north: Vec<Length>,
    east: Vec<Length>,
    tvd: Vec<Length>,
}

impl TryFrom<TargetColumns> for TargetPath {
    type Error = WellpathError;

    fn try_from(c: TargetColumns) -> Result<Self, Self::Error> {
        TargetPath::new(c.depth, c.north, c.east, c.tvd)
    }
}

impl TargetPath {
    /// Build a target from parallel arrays.
    ///
    /// Errors
    /// ----------
    /// * [`WellpathError::InputMismatch`] if the arrays differ in length or hold fewer than
    ///   two points.
    pub fn new(
        depth: Vec<Length>,
        north: Vec<Length>,
        east: Vec<Length>,
        tvd: Vec<Length>,
    ) -> Result<Self, WellpathError> {
        let n = depth.len();
        if north.len() != n || east.len() != n || tvd.len() != n {
            return Err(WellpathError::InputMismatch(format!(
                "target arrays differ in length: depth {n}, north {}, east {}, tvd {}",
                north.len(),
                east.len(),
                tvd.len()
            )));
        }
        if n < 2 {
            return Err(WellpathError::InputMismatch(format!(
                "target path needs at least 2 points, got {n}"
            )));
        }
        Ok(TargetPath {
            depth,
            north,
            east,
            tvd,
        })
    }

    pub fn depth(&self) -> &[Length] {
        &self.depth
    }

    pub fn north(&self) -> &[Length] {
        &self.north
    }

    pub fn east(&self) -> &[Length] {
        &self.east
    }

    pub fn tvd(&self) -> &[Length] {
        &self.tvd
    }

    pub fn len(&self) -> usize {
        self.depth.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depth.is_empty()
    }

    /// Tie-on point of the path: its first node.
    pub fn start_point(&self) -> StartPoint {
        StartPoint::new(self.north[0], self.east[0], self.tvd[0])
    }

    /// L2 distance between `path` and this target, or `None` if the lengths differ.
    pub fn residual(&self, path: &[TrajectoryPoint]) -> Option<f64> {
        if path.len() != self.len() {
            return None;
        }
        let sum_sq: f64 = izip!(path, &self.north, &self.east, &self.tvd)
            .map(|(p, n, e, v)| (p.north - n).powi(2) + (p.east - e).powi(2) + (p.tvd - v).powi(2))
            .sum();
        Some(sum_sq.sqrt())
    }
}

impl TryFrom<&AdjustmentSnapshot> for TargetPath {
    type Error = WellpathError;

    fn try_from(snapshot: &AdjustmentSnapshot) -> Result<Self, Self::Error> {
        TargetPath::new(
            snapshot.depth.clone(),
            snapshot.adjusted_north.clone(),
            snapshot.adjusted_east.clone(),
            snapshot.adjusted_tvd.clone(),
        )
    }
}

/// Best orientation found by [`solve_inverse`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InverseSolution {
    pub depth: Vec<Length>,
    pub inclination_deg: Vec<Degree>,
    pub azimuth_deg: Vec<Degree>,
    pub residual_error: f64,
    /// Trials adopted as the new best (the seed not included).
    pub improvements: usize,
    /// Trials rejected by the trajectory service.
    pub failed_trials: usize,
}

/// Chord-based starting orientation for every node of `target`.
pub fn seed_orientation(target: &TargetPath) -> (Vec<Degree>, Vec<Degree>) {
    let n = target.len();
    let mut inclination = vec![0.0; n];
    let mut azimuth = vec![0.0; n];

    for (i, ((d0, d1), (n0, n1), (e0, e1), (v0, v1))) in izip!(
        target.depth.iter().tuple_windows(),
        target.north.iter().tuple_windows(),
        target.east.iter().tuple_windows(),
        target.tvd.iter().tuple_windows()
    )
    .enumerate()
    {
        let d_depth = d1 - d0;
        if d_depth <= 0.0 {
            continue;
        }
        inclination[i + 1] = ((v1 - v0) / d_depth).clamp(-1.0, 1.0).acos().to_degrees();
        azimuth[i + 1] = (e1 - e0).atan2(n1 - n0).to_degrees().rem_euclid(360.0);
    }

    if n > 1 {
        inclination[0] = inclination[1];
        azimuth[0] = azimuth[1];
    }

    (inclination, azimuth)
}

/// Gaussian perturbation of an orientation, clamped/wrapped into valid ranges.
fn perturb(
    inclination: &[Degree],
    azimuth: &[Degree],
    inc_noise: &Normal<f64>,
    azi_noise: &Normal<f64>,
    rng: &mut impl Rng,
) -> (Vec<Degree>, Vec<Degree>) {
    let inc = inclination
        .iter()
        .map(|i| (i + rng.sample(inc_noise)).clamp(0.0, 180.0))
        .collect();
    let azi = azimuth
        .iter()
        .map(|a| (a + rng.sample(azi_noise)).rem_euclid(360.0))
        .collect();
    (inc, azi)
}

/// Search the orientation arrays that best reproduce `target`.
///
/// Arguments
/// -----------------
/// * `service`: Trajectory solver evaluated on every trial.
/// * `target`: Path to reproduce; its first node is the tie-on point.
/// * `params`: Iteration count and perturbation widths.
/// * `rng`: Random generator driving the perturbations (seed it for reproducible runs).
///
/// Return
/// ----------
/// * The best [`InverseSolution`] found.
///
/// Errors
/// ----------
/// * [`WellpathError::SeedCalculation`] if the service rejects the seed orientation.
/// * [`WellpathError::InvalidParameter`] / [`WellpathError::NoiseInjectionError`] for invalid
///   perturbation widths.
pub fn solve_inverse<S>(
    service: &S,
    target: &TargetPath,
    params: &InverseParams,
    rng: &mut impl Rng,
) -> Result<InverseSolution, WellpathError>
where
    S: TrajectoryService + ?Sized,
{
    let inc_noise = Normal::new(0.0, params.inclination_sigma)?;
    let azi_noise = Normal::new(0.0, params.azimuth_sigma)?;
    let start_point = target.start_point();

    let (mut best_inc, mut best_azi) = seed_orientation(target);
    let seed_path = service
        .compute(
            &stations_from_slices(&target.depth, &best_inc, &best_azi),
            start_point,
        )
        .map_err(WellpathError::SeedCalculation)?;
    let mut best_residual = target.residual(&seed_path).ok_or_else(|| {
        WellpathError::InputMismatch(format!(
            "trajectory service returned {} points for {} stations",
            seed_path.len(),
            target.len()
        ))
    })?;

    debug!(seed_residual = best_residual, "inverse search seeded");

    let mut progress = SolverProgress::new(params.iterations);
    progress.tick(best_residual);

    let mut improvements = 0;
    let mut failed_trials = 0;

    for iteration in 1..params.iterations {
        let (inc, azi) = perturb(&best_inc, &best_azi, &inc_noise, &azi_noise, rng);
        let stations = stations_from_slices(&target.depth, &inc, &azi);

        match service.compute(&stations, start_point) {
            Ok(path) => match target.residual(&path) {
                Some(residual) if residual < best_residual => {
                    best_residual = residual;
                    best_inc = inc;
                    best_azi = azi;
                    improvements += 1;
                }
                Some(_) => {}
                None => {
                    failed_trials += 1;
                    debug!(iteration, "trial skipped: point count mismatch");
                }
            },
            Err(err) => {
                failed_trials += 1;
                debug!(iteration, error = %err, "trial skipped");
            }
        }

        progress.tick(best_residual);
    }

    progress.finish();

    info!(
        iterations = params.iterations,
        improvements,
        failed_trials,
        residual = best_residual,
        "inverse search finished"
    );

    Ok(InverseSolution {
        depth: target.depth.clone(),
        inclination_deg: best_inc,
        azimuth_deg: best_azi,
        residual_error: best_residual,
        improvements,
        failed_trials,
    })
}
