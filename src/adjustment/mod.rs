//! # Adjustment history
//!
//! An operator can shift parts of a compared candidate trajectory in space, step back and
//! forth through those corrections, and go back to the untouched comparison. Every correction
//! is kept as an immutable [`AdjustmentSnapshot`]; only its `is_current` flag ever changes.
//!
//! ## State machine
//!
//! ```text
//!            apply_offset                apply_offset
//! Original ───────────────► AtSequence(1) ───────────► AtSequence(2) ─► …
//!    ▲   ◄─────────────────      │   ▲    ◄───────────      │
//!    │          undo             │   │        undo          │
//!    │                           └───┘ redo ────────────────┘
//!    └──────────────────────── reset (from any state) ───────
//! ```
//!
//! * `Original` is sequence `0`: no snapshot is current and the comparison's own candidate
//!   arrays are in effect.
//! * Offsets are **cumulative**: a new snapshot starts from whatever is current.
//! * The live chain is always `1, 2, …, n` with no gaps and at most one current snapshot.
//! * `redo` never creates snapshots, it only moves the current pointer forward.
//! * Applying an offset while positioned below the head of the chain moves the forward
//!   snapshots to the **archive**; `reset` moves the whole live chain there. Archived
//!   snapshots are kept for audit and are never reachable by undo/redo again.
//!
//! ## Storage
//!
//! [`AdjustmentStore`] is an arena of [`AdjustmentChain`]s keyed by [`ComparisonId`]. Callers
//! must serialize writes per comparison (one writer at a time); reads may run concurrently.
//!
//! ## See also
//! ------------
//! * [`crate::comparison::ComparisonResult`] – Source of the original candidate arrays.
//! * [`gradient::orientation_from_path`] – Orientation recovery used by
//!   [`AdjustmentChain::recalculate_orientation`].

use std::collections::HashMap;

use ahash::RandomState;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::comparison::ComparisonResult;
use crate::constants::{ComparisonId, Degree, Length};
use crate::wellpath_errors::WellpathError;

pub mod gradient;

/// Spatial correction `(dx, dy, dz)`, applied to `(east, north, tvd)` respectively.
pub type OffsetVector = Vector3<f64>;

/// The untouched candidate arrays of a comparison (sequence `0`).
///
/// The four columns always have the same length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "OriginalColumns")]
pub struct OriginalArrays {
    depth: Vec<Length>,
    north: Vec<Length>,
    east: Vec<Length>,
    tvd: Vec<Length>,
}

#[derive(Deserialize)]
struct OriginalColumns {
    depth: Vec<Length>,
    north: Vec<Length>,
    east: Vec<Length>,
    tvd: Vec<Length>,
}

impl TryFrom<OriginalColumns> for OriginalArrays {
    type Error = WellpathError;

    fn try_from(c: OriginalColumns) -> Result<Self, Self::Error> {
        OriginalArrays::new(c.depth, c.north, c.east, c.tvd)
    }
}

impl OriginalArrays {
    /// Build from parallel arrays.
    ///
    /// Errors
    /// ----------
    /// * [`WellpathError::InputMismatch`] if the arrays differ in length.
    pub fn new(
        depth: Vec<Length>,
        north: Vec<Length>,
        east: Vec<Length>,
        tvd: Vec<Length>,
    ) -> Result<Self, WellpathError> {
        let n = depth.len();
        if north.len() != n || east.len() != n || tvd.len() != n {
            return Err(WellpathError::InputMismatch(format!(
                "original arrays differ in length: depth {n}, north {}, east {}, tvd {}",
                north.len(),
                east.len(),
                tvd.len()
            )));
        }
        Ok(OriginalArrays {
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

    /// Always `0`: the original arrays sit below the first snapshot.
    pub fn sequence(&self) -> u32 {
        0
    }
}

impl From<&ComparisonResult> for OriginalArrays {
    fn from(result: &ComparisonResult) -> Self {
        let (north, east, tvd) = result.candidate_columns();
        OriginalArrays {
            depth: result.depth.clone(),
            north,
            east,
            tvd,
        }
    }
}

/// One correction in the history of a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentSnapshot {
    pub sequence: u32,
    pub depth_window: (Length, Length),
    pub offset: OffsetVector,
    pub depth: Vec<Length>,
    pub adjusted_north: Vec<Length>,
    pub adjusted_east: Vec<Length>,
    pub adjusted_tvd: Vec<Length>,
    pub inclination_recalculated: Option<Vec<Degree>>,
    pub azimuth_recalculated: Option<Vec<Degree>>,
    pub is_current: bool,
}

/// Result of [`AdjustmentChain::apply_offset`].
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedOffset {
    pub snapshot: AdjustmentSnapshot,
    pub points_affected: usize,
}

/// Result of [`AdjustmentChain::undo`].
#[derive(Debug, Clone, PartialEq)]
pub enum UndoOutcome {
    /// Stepped back to an earlier snapshot.
    Snapshot(AdjustmentSnapshot),
    /// Stepped back to the unmodified comparison (sequence `0`).
    Original(OriginalArrays),
}

impl UndoOutcome {
    pub fn sequence(&self) -> u32 {
        match self {
            UndoOutcome::Snapshot(s) => s.sequence,
            UndoOutcome::Original(o) => o.sequence(),
        }
    }
}

/// Result of [`AdjustmentChain::redo`].
#[derive(Debug, Clone, PartialEq)]
pub enum RedoOutcome {
    /// Moved forward to the next snapshot.
    Snapshot(AdjustmentSnapshot),
    /// Already at the head of the chain; the position is unchanged.
    NothingToRedo { sequence: u32 },
}

impl RedoOutcome {
    pub fn sequence(&self) -> u32 {
        match self {
            RedoOutcome::Snapshot(s) => s.sequence,
            RedoOutcome::NothingToRedo { sequence } => *sequence,
        }
    }
}

/// The adjustment chain of a single comparison.
///
/// `snapshots[i].sequence == i + 1` always holds, and `current` is the sequence of the single
/// snapshot with `is_current = true` (or `None` in the original state).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentChain {
    original: OriginalArrays,
    snapshots: Vec<AdjustmentSnapshot>,
    current: Option<u32>,
    archived: Vec<AdjustmentSnapshot>,
}

impl AdjustmentChain {
    pub fn new(original: OriginalArrays) -> Self {
        AdjustmentChain {
            original,
            snapshots: Vec::new(),
            current: None,
            archived: Vec::new(),
        }
    }

    pub fn original(&self) -> &OriginalArrays {
        &self.original
    }

    /// Live chain, ordered by sequence.
    pub fn history(&self) -> &[AdjustmentSnapshot] {
        &self.snapshots
    }

    /// Snapshots superseded by a branch-cutting apply or by a reset, in archival order.
    pub fn archived(&self) -> &[AdjustmentSnapshot] {
        &self.archived
    }

    /// Sequence currently in effect, `0` for the original arrays.
    pub fn current_sequence(&self) -> u32 {
        self.current.unwrap_or(0)
    }

    pub fn current(&self) -> Option<&AdjustmentSnapshot> {
        self.current.and_then(|seq| self.snapshot(seq))
    }

    fn snapshot(&self, sequence: u32) -> Option<&AdjustmentSnapshot> {
        let idx = (sequence as usize).checked_sub(1)?;
        self.snapshots.get(idx)
    }

    fn snapshot_mut(&mut self, sequence: u32) -> Option<&mut AdjustmentSnapshot> {
        let idx = (sequence as usize).checked_sub(1)?;
        self.snapshots.get_mut(idx)
    }

    /// Move the current pointer, keeping the `is_current` flags in sync.
    fn set_current(&mut self, sequence: Option<u32>) {
        if let Some(prev) = self.current {
            if let Some(snapshot) = self.snapshot_mut(prev) {
                snapshot.is_current = false;
            }
        }
        self.current = sequence;
        if let Some(next) = sequence {
            if let Some(snapshot) = self.snapshot_mut(next) {
                snapshot.is_current = true;
            }
        }
    }

    /// Move every snapshot above `keep` from the live chain to the archive.
    fn archive_above(&mut self, keep: u32) {
        if self.snapshots.len() > keep as usize {
            let superseded = self.snapshots.split_off(keep as usize);
            self.archived.extend(superseded.into_iter().map(|mut s| {
                s.is_current = false;
                s
            }));
        }
    }

    /// Positions currently in effect: the current snapshot's, or the original arrays.
    pub fn current_positions(&self) -> (&[Length], &[Length], &[Length], &[Length]) {
        match self.current() {
            Some(s) => (&s.depth, &s.adjusted_north, &s.adjusted_east, &s.adjusted_tvd),
            None => (
                &self.original.depth,
                &self.original.north,
                &self.original.east,
                &self.original.tvd,
            ),
        }
    }

    /// Shift every point inside `[depth_start, depth_end]` by `offset` and record a snapshot.
    ///
    /// Arguments
    /// -----------------
    /// * `depth_start`, `depth_end`: Inclusive depth window.
    /// * `offset`: `(dx, dy, dz)` added to `(east, north, tvd)`.
    ///
    /// Return
    /// ----------
    /// * The new current snapshot and the number of points inside the window.
    ///
    /// Errors
    /// ----------
    /// * [`WellpathError::InvalidParameter`] if the window is reversed or not finite, or the
    ///   offset is not finite.
    pub fn apply_offset(
        &mut self,
        depth_start: Length,
        depth_end: Length,
        offset: OffsetVector,
    ) -> Result<AppliedOffset, WellpathError> {
        if !(depth_start.is_finite() && depth_end.is_finite()) || depth_start > depth_end {
            return Err(WellpathError::InvalidParameter(format!(
                "invalid depth window [{depth_start}, {depth_end}]"
            )));
        }
        if offset.iter().any(|c| !c.is_finite()) {
            return Err(WellpathError::InvalidParameter(
                "offset must be finite".into(),
            ));
        }

        let (depth, north, east, tvd) = self.current_positions();
        let mut adjusted_north = north.to_vec();
        let mut adjusted_east = east.to_vec();
        let mut adjusted_tvd = tvd.to_vec();
        let depth = depth.to_vec();

        let mut points_affected = 0;
        for (i, d) in depth.iter().enumerate() {
            if (depth_start..=depth_end).contains(d) {
                adjusted_east[i] += offset.x;
                adjusted_north[i] += offset.y;
                adjusted_tvd[i] += offset.z;
                points_affected += 1;
            }
        }

        let base = self.current_sequence();
        self.archive_above(base);

        let sequence = base + 1;
        self.snapshots.push(AdjustmentSnapshot {
            sequence,
            depth_window: (depth_start, depth_end),
            offset,
            depth,
            adjusted_north,
            adjusted_east,
            adjusted_tvd,
            inclination_recalculated: None,
            azimuth_recalculated: None,
            is_current: false,
        });
        self.set_current(Some(sequence));

        debug!(
            from = base,
            to = sequence,
            points_affected,
            "applied offset [{depth_start}, {depth_end}]"
        );

        let snapshot = self.snapshots[sequence as usize - 1].clone();
        Ok(AppliedOffset {
            snapshot,
            points_affected,
        })
    }

    /// Step back one snapshot, or to the original arrays from sequence `1` or below.
    pub fn undo(&mut self) -> UndoOutcome {
        let from = self.current_sequence();
        if from <= 1 {
            self.set_current(None);
            debug!(from, to = 0, "undo to original");
            return UndoOutcome::Original(self.original.clone());
        }

        let to = from - 1;
        self.set_current(Some(to));
        debug!(from, to, "undo");
        match self.snapshot(to) {
            Some(s) => UndoOutcome::Snapshot(s.clone()),
            None => UndoOutcome::Original(self.original.clone()),
        }
    }

    /// Step forward one snapshot if the chain has one.
    pub fn redo(&mut self) -> RedoOutcome {
        let from = self.current_sequence();
        let to = from + 1;

        if self.snapshot(to).is_none() {
            debug!(sequence = from, "nothing to redo");
            return RedoOutcome::NothingToRedo { sequence: from };
        }

        self.set_current(Some(to));
        debug!(from, to, "redo");
        match self.snapshot(to) {
            Some(s) => RedoOutcome::Snapshot(s.clone()),
            None => RedoOutcome::NothingToRedo { sequence: from },
        }
    }

    /// Return to the original arrays, archiving the whole live chain.
    pub fn reset(&mut self) -> OriginalArrays {
        let from = self.current_sequence();
        self.set_current(None);
        self.archive_above(0);
        debug!(from, to = 0, "reset");
        self.original.clone()
    }

    /// Recover inclination/azimuth from the current snapshot's adjusted path.
    ///
    /// The result is stored on the snapshot (overwriting earlier values) and returned.
    ///
    /// Errors
    /// ----------
    /// * [`WellpathError::NoAdjustment`] in the original state.
    /// * [`WellpathError::InputMismatch`] if the snapshot holds fewer than 2 points.
    pub fn recalculate_orientation(
        &mut self,
    ) -> Result<(Vec<Degree>, Vec<Degree>), WellpathError> {
        let sequence = self.current.ok_or(WellpathError::NoAdjustment)?;
        let snapshot = self
            .snapshot_mut(sequence)
            .ok_or(WellpathError::NoAdjustment)?;

        let (inclination, azimuth) = gradient::orientation_from_path(
            &snapshot.depth,
            &snapshot.adjusted_north,
            &snapshot.adjusted_east,
            &snapshot.adjusted_tvd,
        )?;

        snapshot.inclination_recalculated = Some(inclination.clone());
        snapshot.azimuth_recalculated = Some(azimuth.clone());
        debug!(sequence, "orientation recalculated");

        Ok((inclination, azimuth))
    }
}

/// Arena of adjustment chains, one per comparison.
#[derive(Debug, Clone, Default)]
pub struct AdjustmentStore {
    chains: HashMap<ComparisonId, AdjustmentChain, RandomState>,
}

impl AdjustmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the original arrays of a comparison, replacing any previous chain.
    pub fn register(&mut self, id: ComparisonId, original: OriginalArrays) {
        self.chains.insert(id, AdjustmentChain::new(original));
    }

    pub fn contains(&self, id: ComparisonId) -> bool {
        self.chains.contains_key(&id)
    }

    pub fn remove(&mut self, id: ComparisonId) -> Option<AdjustmentChain> {
        self.chains.remove(&id)
    }

    pub fn chain(&self, id: ComparisonId) -> Result<&AdjustmentChain, WellpathError> {
        self.chains
            .get(&id)
            .ok_or(WellpathError::UnknownComparison(id))
    }

    pub fn chain_mut(&mut self, id: ComparisonId) -> Result<&mut AdjustmentChain, WellpathError> {
        self.chains
            .get_mut(&id)
            .ok_or(WellpathError::UnknownComparison(id))
    }

    pub fn apply_offset(
        &mut self,
        id: ComparisonId,
        depth_window: (Length, Length),
        offset: OffsetVector,
    ) -> Result<AppliedOffset, WellpathError> {
        self.chain_mut(id)?
            .apply_offset(depth_window.0, depth_window.1, offset)
    }

    pub fn undo(&mut self, id: ComparisonId) -> Result<UndoOutcome, WellpathError> {
        Ok(self.chain_mut(id)?.undo())
    }

    pub fn redo(&mut self, id: ComparisonId) -> Result<RedoOutcome, WellpathError> {
        Ok(self.chain_mut(id)?.redo())
    }

    pub fn reset(&mut self, id: ComparisonId) -> Result<OriginalArrays, WellpathError> {
        Ok(self.chain_mut(id)?.reset())
    }

    pub fn current(&self, id: ComparisonId) -> Result<Option<&AdjustmentSnapshot>, WellpathError> {
        Ok(self.chain(id)?.current())
    }

    pub fn history(&self, id: ComparisonId) -> Result<&[AdjustmentSnapshot], WellpathError> {
        Ok(self.chain(id)?.history())
    }

    pub fn recalculate_orientation(
        &mut self,
        id: ComparisonId,
    ) -> Result<(Vec<Degree>, Vec<Degree>), WellpathError> {
        self.chain_mut(id)?.recalculate_orientation()
    }
}
