//! # Constants and type definitions for Wellpath
//!
//! This module centralizes the **numerical tolerances**, **QA thresholds**, and **common type
//! definitions** used throughout the `wellpath` library.
//!
//! ## Overview
//!
//! - Unit type aliases (degrees, lengths)
//! - Floating-point tolerances used by the resampler and the trajectory service
//! - G(t)/W(t) tier thresholds and tier point values used by the QA scorer
//! - Default parameters for comparisons and the inverse solver
//!
//! The QA thresholds are compared against differences rounded to [`QA_DIFF_DECIMALS`] decimal
//! places, so the boundaries are exact (`1.00` is *high*, `1.01` is *good*).

use nalgebra::Vector3;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in radians
pub type Radian = f64;
/// Length along or across the wellbore (same unit as the input depths)
pub type Length = f64;

/// Tie-on position `(north, east, tvd)` seeding a trajectory.
pub type StartPoint = Vector3<f64>;

/// Identifier of a persisted comparison owning an adjustment chain.
pub type ComparisonId = u64;

// -------------------------------------------------------------------------------------------------
// Numerical tolerances
// -------------------------------------------------------------------------------------------------

/// Tolerance used when building and de-duplicating depth grids
pub const DEPTH_EPS: f64 = 1e-9;

/// Upper bound on the number of nodes of a resampling grid
pub const MAX_GRID_NODES: usize = 1_000_000;

/// Dogleg angle (radians) below which the minimum-curvature ratio factor is taken as 1
pub const DOGLEG_EPS: Radian = 1e-7;

// -------------------------------------------------------------------------------------------------
// Defaults
// -------------------------------------------------------------------------------------------------

/// Default resampling step of a comparison grid
pub const DEFAULT_STEP: Length = 10.0;

/// Default number of inverse-solver iterations
pub const DEFAULT_INVERSE_ITERATIONS: usize = 100;

/// Default standard deviation of the inclination perturbation
pub const DEFAULT_INCLINATION_SIGMA: Degree = 0.5;

/// Default standard deviation of the azimuth perturbation
pub const DEFAULT_AZIMUTH_SIGMA: Degree = 5.0;

// -------------------------------------------------------------------------------------------------
// QA scoring
// -------------------------------------------------------------------------------------------------

/// Decimal places kept on G(t)/W(t) differences before tier classification
pub const QA_DIFF_DECIMALS: i32 = 2;

/// Decimal places kept on QA percentages
pub const QA_PERCENT_DECIMALS: i32 = 2;

/// G(t) tier upper bounds (inclusive): high, good, low
pub const G_HIGH: f64 = 1.0;
pub const G_GOOD: f64 = 3.0;
pub const G_LOW: f64 = 10.0;

/// W(t) tier upper bounds (inclusive): high, good, low
pub const W_HIGH: f64 = 1.0;
pub const W_GOOD: f64 = 5.0;
pub const W_LOW: f64 = 10.0;

/// Tier point values
pub const HIGH_POINTS: f64 = 1.5;
pub const GOOD_POINTS: f64 = 1.2;
pub const LOW_POINTS: f64 = 1.0;
pub const NO_CORRELATION_POINTS: f64 = 0.0;

/// Round `value` to `decimals` decimal places, ties to the even digit.
///
/// Reported figures (deltas, residuals, QA points) are rounded this way so a tie like `0.125`
/// gives `0.12` rather than `0.13`.
///
/// Arguments
/// -----------------
/// * `value`: The number to round.
/// * `decimals`: Number of decimal places to keep.
///
/// Return
/// ----------
/// * The rounded value.
#[inline]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}
