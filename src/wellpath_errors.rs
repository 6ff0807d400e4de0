use thiserror::Error;

use crate::constants::ComparisonId;
use crate::survey::TrajectoryError;

#[derive(Error, Debug)]
pub enum WellpathError {
    #[error("Input mismatch: {0}")]
    InputMismatch(String),

    #[error("No common depth range: overlap would start at {min_overlap} but ends at {max_overlap}")]
    EmptyOverlap { min_overlap: f64, max_overlap: f64 },

    #[error("No adjustment is current for this comparison")]
    NoAdjustment,

    #[error("Trajectory service rejected the seed orientation: {0}")]
    SeedCalculation(TrajectoryError),

    #[error("QA arrays are misaligned: {name} has {found} entries, expected {expected}")]
    ArrayLengthMismatch {
        name: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Trajectory service error: {0}")]
    Trajectory(#[from] TrajectoryError),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Gaussian noise generation failed: {0:?}")]
    NoiseInjectionError(rand_distr::NormalError),

    #[error("Unknown comparison: {0}")]
    UnknownComparison(ComparisonId),
}

impl From<rand_distr::NormalError> for WellpathError {
    fn from(err: rand_distr::NormalError) -> Self {
        WellpathError::NoiseInjectionError(err)
    }
}

impl WellpathError {
    /// Whether the error is recoverable at the caller's boundary (a 4xx-equivalent).
    ///
    /// Only [`WellpathError::SeedCalculation`] is server-side: the service rejected angles the
    /// solver derived itself. A [`WellpathError::Trajectory`] comes from the caller's own
    /// stations, and a noise error from the caller's sigmas.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, WellpathError::SeedCalculation(_))
    }
}

impl PartialEq for WellpathError {
    fn eq(&self, other: &Self) -> bool {
        use WellpathError::*;
        match (self, other) {
            (InputMismatch(a), InputMismatch(b)) => a == b,
            (
                EmptyOverlap {
                    min_overlap: a1,
                    max_overlap: a2,
                },
                EmptyOverlap {
                    min_overlap: b1,
                    max_overlap: b2,
                },
            ) => a1 == b1 && a2 == b2,
            (SeedCalculation(a), SeedCalculation(b)) => a == b,
            (
                ArrayLengthMismatch {
                    name: n1,
                    expected: e1,
                    found: f1,
                },
                ArrayLengthMismatch {
                    name: n2,
                    expected: e2,
                    found: f2,
                },
            ) => n1 == n2 && e1 == e2 && f1 == f2,
            (Trajectory(a), Trajectory(b)) => a == b,
            (InvalidParameter(a), InvalidParameter(b)) => a == b,
            (NoiseInjectionError(a), NoiseInjectionError(b)) => a == b,
            (UnknownComparison(a), UnknownComparison(b)) => a == b,

            (NoAdjustment, NoAdjustment) => true,

            _ => false,
        }
    }
}

#[cfg(test)]
mod test_wellpath_errors {
    use rand_distr::Normal;

    use super::*;

    #[test]
    fn test_only_seed_failure_is_server_side() {
        let non_monotonic = TrajectoryError::NonMonotonicDepth {
            index: 2,
            previous: 100.0,
            current: 90.0,
        };
        assert!(!WellpathError::SeedCalculation(non_monotonic.clone()).is_client_error());
        assert!(WellpathError::Trajectory(non_monotonic).is_client_error());

        let noise = Normal::new(0.0, f64::NAN).unwrap_err();
        assert!(WellpathError::from(noise).is_client_error());

        assert!(WellpathError::NoAdjustment.is_client_error());
        assert!(WellpathError::UnknownComparison(3).is_client_error());
        assert!(WellpathError::EmptyOverlap {
            min_overlap: 10.0,
            max_overlap: 5.0
        }
        .is_client_error());
    }
}
