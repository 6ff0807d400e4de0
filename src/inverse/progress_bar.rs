//! Progress reporting for the inverse search.
//!
//! With the `progress` feature the solver draws an `indicatif` bar whose message shows the
//! best residual so far and the smoothed time per trial. Without it, [`SolverProgress`] is a
//! zero-sized no-op so the search loop is identical in both builds.
//!
//! The time per trial is an exponential moving average, seeded with the first trial:
//!
//! ```text
//! avg ← α·dt + (1 − α)·avg
//! ```

#[cfg(feature = "progress")]
use std::time::{Duration, Instant};

#[cfg(feature = "progress")]
use indicatif::{ProgressBar, ProgressStyle};

/// Weight of the newest trial in the moving average.
#[cfg(feature = "progress")]
const TRIAL_TIME_ALPHA: f64 = 0.2;

#[cfg(feature = "progress")]
pub(crate) struct SolverProgress {
    pb: ProgressBar,
    last_tick: Instant,
    avg_trial: Option<Duration>,
}

#[cfg(feature = "progress")]
impl SolverProgress {
    pub(crate) fn new(total: usize) -> Self {
        let pb = ProgressBar::new(total.max(1) as u64);
        let style = ProgressStyle::with_template(
            "{bar:40.cyan/blue} {pos}/{len} ({percent:>3}%) | ETA {eta_precise} | {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(200));

        SolverProgress {
            pb,
            last_tick: Instant::now(),
            avg_trial: None,
        }
    }

    /// Count one evaluated trial and refresh the message.
    pub(crate) fn tick(&mut self, best_residual: f64) {
        let now = Instant::now();
        let avg = smoothed(self.avg_trial, now - self.last_tick, TRIAL_TIME_ALPHA);
        self.last_tick = now;
        self.avg_trial = Some(avg);

        self.pb
            .set_message(format!("best residual {best_residual:.4} | {avg:.1?}/trial"));
        self.pb.inc(1);
    }

    pub(crate) fn finish(self) {
        self.pb.disable_steady_tick();
        self.pb.finish_and_clear();
    }
}

#[cfg(feature = "progress")]
fn smoothed(avg: Option<Duration>, dt: Duration, alpha: f64) -> Duration {
    match avg {
        None => dt,
        Some(avg) => dt.mul_f64(alpha) + avg.mul_f64(1.0 - alpha),
    }
}

#[cfg(not(feature = "progress"))]
pub(crate) struct SolverProgress;

#[cfg(not(feature = "progress"))]
impl SolverProgress {
    #[inline]
    pub(crate) fn new(_total: usize) -> Self {
        SolverProgress
    }

    #[inline]
    pub(crate) fn tick(&mut self, _best_residual: f64) {}

    #[inline]
    pub(crate) fn finish(self) {}
}

#[cfg(all(test, feature = "progress"))]
mod test_progress_bar {
    use super::*;

    #[test]
    fn test_first_trial_seeds_average() {
        let dt = Duration::from_millis(40);
        assert_eq!(smoothed(None, dt, TRIAL_TIME_ALPHA), dt);
    }

    #[test]
    fn test_average_moves_toward_latest_trial() {
        let avg = Some(Duration::from_millis(100));
        assert_eq!(
            smoothed(avg, Duration::from_millis(200), 0.5),
            Duration::from_millis(150)
        );
        assert_eq!(
            smoothed(avg, Duration::from_millis(10), 1.0),
            Duration::from_millis(10)
        );
    }

    #[test]
    fn test_tick_counts_trials() {
        let mut progress = SolverProgress::new(3);
        progress.tick(1.5);
        progress.tick(0.5);
        assert_eq!(progress.pb.position(), 2);
        assert!(progress.avg_trial.is_some());
        progress.finish();
    }
}
