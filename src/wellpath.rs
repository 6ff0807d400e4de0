//! # Wellpath engine
//!
//! [`Wellpath`] bundles one [`TrajectoryService`] with one [`AdjustmentStore`] and exposes the
//! whole engine behind a single value: compare two surveys, correct the candidate, recover
//! survey angles from a corrected path and score survey quality.
//!
//! ## Example
//!
//! ```rust
//! use rand::{rngs::StdRng, SeedableRng};
//! use wellpath::adjustment::OffsetVector;
//! use wellpath::constants::StartPoint;
//! use wellpath::survey::Station;
//! use wellpath::wellpath::Wellpath;
//!
//! let mut engine: Wellpath = Wellpath::default();
//! let stations = vec![
//!     Station::new(0.0, 0.0, 0.0),
//!     Station::new(100.0, 10.0, 45.0),
//!     Station::new(200.0, 20.0, 90.0),
//! ];
//!
//! let (id, result) = engine
//!     .compare(&stations, &stations, 50.0, StartPoint::zeros())
//!     .unwrap();
//! assert_eq!(result.summary.max_displacement, 0.0);
//!
//! engine
//!     .apply_offset(id, (100.0, 200.0), OffsetVector::new(1.0, 0.0, 0.0))
//!     .unwrap();
//! let mut rng = StdRng::seed_from_u64(42);
//! let solution = engine.solve_current(id, 50, &mut rng).unwrap();
//! assert_eq!(solution.depth, result.depth);
//! ```

use rand::Rng;
use tracing::debug;

use crate::adjustment::{
    AdjustmentSnapshot, AdjustmentStore, AppliedOffset, OffsetVector, OriginalArrays,
    RedoOutcome, UndoOutcome,
};
use crate::comparison::{compare, ComparisonParams, ComparisonResult};
use crate::constants::{ComparisonId, Degree, Length, StartPoint};
use crate::inverse::{solve_inverse, InverseParams, InverseSolution, TargetPath};
use crate::qa::{score_qa, QAAggregate, QAStationResult};
use crate::survey::{min_curvature::MinimumCurvature, Station, TrajectoryService};
use crate::wellpath_errors::WellpathError;

/// The engine: a trajectory service and the adjustment history of every comparison it made.
#[derive(Debug, Clone)]
pub struct Wellpath<S = MinimumCurvature> {
    service: S,
    store: AdjustmentStore,
    next_id: ComparisonId,
}

impl Default for Wellpath<MinimumCurvature> {
    fn default() -> Self {
        Wellpath::new(MinimumCurvature)
    }
}

impl<S: TrajectoryService> Wellpath<S> {
    pub fn new(service: S) -> Self {
        Wellpath {
            service,
            store: AdjustmentStore::new(),
            next_id: 1,
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn store(&self) -> &AdjustmentStore {
        &self.store
    }

    /// Compare two surveys and register the candidate's positions for later adjustment.
    ///
    /// Arguments
    /// -----------------
    /// * `reference`, `candidate`: The two surveys, each sorted by depth.
    /// * `step`: Spacing of the common depth grid.
    /// * `start_point`: Tie-on `(north, east, tvd)` shared by both trajectories.
    ///
    /// Return
    /// ----------
    /// * The id under which the comparison's adjustment history is kept, and the result.
    ///
    /// See also
    /// ------------
    /// * [`compare`] – The comparison itself.
    pub fn compare(
        &mut self,
        reference: &[Station],
        candidate: &[Station],
        step: Length,
        start_point: StartPoint,
    ) -> Result<(ComparisonId, ComparisonResult), WellpathError> {
        let params = ComparisonParams::builder()
            .step(step)
            .start_point(start_point)
            .build()?;
        self.compare_with(reference, candidate, &params)
    }

    /// Same as [`Wellpath::compare`] with prebuilt parameters.
    pub fn compare_with(
        &mut self,
        reference: &[Station],
        candidate: &[Station],
        params: &ComparisonParams,
    ) -> Result<(ComparisonId, ComparisonResult), WellpathError> {
        let result = compare(&self.service, reference, candidate, params)?;

        let id = self.next_id;
        self.next_id += 1;
        self.store.register(id, OriginalArrays::from(&result));
        debug!(id, points = result.depth.len(), "comparison registered");

        Ok((id, result))
    }

    /// Drop a comparison and its whole adjustment history.
    pub fn forget(&mut self, id: ComparisonId) -> Result<(), WellpathError> {
        self.store
            .remove(id)
            .map(|_| ())
            .ok_or(WellpathError::UnknownComparison(id))
    }

    pub fn apply_offset(
        &mut self,
        id: ComparisonId,
        depth_window: (Length, Length),
        offset: OffsetVector,
    ) -> Result<AppliedOffset, WellpathError> {
        self.store.apply_offset(id, depth_window, offset)
    }

    pub fn undo(&mut self, id: ComparisonId) -> Result<UndoOutcome, WellpathError> {
        self.store.undo(id)
    }

    pub fn redo(&mut self, id: ComparisonId) -> Result<RedoOutcome, WellpathError> {
        self.store.redo(id)
    }

    pub fn reset(&mut self, id: ComparisonId) -> Result<OriginalArrays, WellpathError> {
        self.store.reset(id)
    }

    pub fn current(&self, id: ComparisonId) -> Result<Option<&AdjustmentSnapshot>, WellpathError> {
        self.store.current(id)
    }

    pub fn history(&self, id: ComparisonId) -> Result<&[AdjustmentSnapshot], WellpathError> {
        self.store.history(id)
    }

    pub fn archived(&self, id: ComparisonId) -> Result<&[AdjustmentSnapshot], WellpathError> {
        Ok(self.store.chain(id)?.archived())
    }

    pub fn recalculate_orientation(
        &mut self,
        id: ComparisonId,
    ) -> Result<(Vec<Degree>, Vec<Degree>), WellpathError> {
        self.store.recalculate_orientation(id)
    }

    /// Recover survey angles reproducing the path `(depth, north, east, tvd)`.
    ///
    /// Arguments
    /// -----------------
    /// * `depth`, `north`, `east`, `tvd`: Target path; its first node is the tie-on point.
    /// * `iterations`: Evaluations of the trajectory service, the seed included.
    /// * `rng`: Random generator driving the search.
    ///
    /// See also
    /// ------------
    /// * [`solve_inverse`] – The search itself and its failure modes.
    pub fn solve_inverse(
        &self,
        depth: &[Length],
        north: &[Length],
        east: &[Length],
        tvd: &[Length],
        iterations: usize,
        rng: &mut impl Rng,
    ) -> Result<InverseSolution, WellpathError> {
        let target = TargetPath::new(depth.to_vec(), north.to_vec(), east.to_vec(), tvd.to_vec())?;
        let params = InverseParams::builder().iterations(iterations).build()?;
        solve_inverse(&self.service, &target, &params, rng)
    }

    /// Recover survey angles for the adjusted path currently in effect for `id`.
    ///
    /// Errors
    /// ----------
    /// * [`WellpathError::NoAdjustment`] if the comparison is in its original state.
    pub fn solve_current(
        &self,
        id: ComparisonId,
        iterations: usize,
        rng: &mut impl Rng,
    ) -> Result<InverseSolution, WellpathError> {
        let snapshot = self.store.current(id)?.ok_or(WellpathError::NoAdjustment)?;
        let target = TargetPath::try_from(snapshot)?;
        let params = InverseParams::builder().iterations(iterations).build()?;
        solve_inverse(&self.service, &target, &params, rng)
    }

    /// Score survey quality; see [`score_qa`].
    #[allow(clippy::too_many_arguments)]
    pub fn score_qa(
        &self,
        depth: &[Length],
        inclination: &[Degree],
        azimuth: &[Degree],
        g_signal: &[Option<f64>],
        w_signal: &[Option<f64>],
        g_reference: f64,
        w_reference: f64,
    ) -> Result<(Vec<QAStationResult>, QAAggregate), WellpathError> {
        score_qa(
            depth,
            inclination,
            azimuth,
            g_signal,
            w_signal,
            g_reference,
            w_reference,
        )
    }
}
