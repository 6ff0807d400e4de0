//! # Survey quality assurance
//!
//! Scores each station of a survey by how far its measured total gravity `G(t)` and total
//! magnetic field `W(t)` sit from the reference values of the site, and aggregates the result
//! into a per-survey score.
//!
//! ## Tiers
//!
//! Differences are rounded to two decimals **before** classification, then matched against
//! inclusive bounds in order, first match wins:
//!
//! | Tier             | `|ΔG(t)|` | `|ΔW(t)|` | Points |
//! |------------------|-----------|-----------|--------|
//! | `High`           | ≤ 1       | ≤ 1       | 1.5    |
//! | `Good`           | ≤ 3       | ≤ 5       | 1.2    |
//! | `Low`            | ≤ 10      | ≤ 10      | 1.0    |
//! | `NoCorrelation`  | otherwise | otherwise | 0.0    |
//!
//! A station passes iff both tiers are correlated (`High`, `Good` or `Low`). A station missing
//! either signal is `NoCorrelation` on both and removed.
//!
//! ## Aggregate
//!
//! * `percentage = Σ pass diffs / Σ diffs · 100` per signal (0 when the total is 0).
//! * `score = Σ points / (rows · 1.5)`, a value in `[0, 1]`, and its percentage.
//!
//! ## See also
//! ------------
//! * [`filter_by_status`] – Station selection that always keeps the deepest station.

use std::fmt;

use itertools::izip;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{
    round_to, Degree, Length, GOOD_POINTS, G_GOOD, G_HIGH, G_LOW, HIGH_POINTS, LOW_POINTS,
    NO_CORRELATION_POINTS, QA_DIFF_DECIMALS, QA_PERCENT_DECIMALS, W_GOOD, W_HIGH, W_LOW,
};
use crate::wellpath_errors::WellpathError;

/// Correlation tier of one signal at one station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QATier {
    High,
    Good,
    Low,
    NoCorrelation,
}

impl QATier {
    /// Classify a rounded difference against inclusive `(high, good, low)` bounds.
    fn classify(diff: f64, (high, good, low): (f64, f64, f64)) -> Self {
        let d = diff.abs();
        if d <= high {
            QATier::High
        } else if d <= good {
            QATier::Good
        } else if d <= low {
            QATier::Low
        } else {
            QATier::NoCorrelation
        }
    }

    pub fn points(self) -> f64 {
        match self {
            QATier::High => HIGH_POINTS,
            QATier::Good => GOOD_POINTS,
            QATier::Low => LOW_POINTS,
            QATier::NoCorrelation => NO_CORRELATION_POINTS,
        }
    }

    pub fn is_correlated(self) -> bool {
        self != QATier::NoCorrelation
    }
}

impl fmt::Display for QATier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QATier::High => "high",
            QATier::Good => "good",
            QATier::Low => "low",
            QATier::NoCorrelation => "no_correlation",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QAStatus {
    Pass,
    Remove,
}

/// Which of the two QA signals a station carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalPresence {
    Both,
    GravityOnly,
    MagneticOnly,
    Neither,
}

impl SignalPresence {
    pub fn from_signals(g_t: Option<f64>, w_t: Option<f64>) -> Self {
        match (g_t, w_t) {
            (Some(_), Some(_)) => SignalPresence::Both,
            (Some(_), None) => SignalPresence::GravityOnly,
            (None, Some(_)) => SignalPresence::MagneticOnly,
            (None, None) => SignalPresence::Neither,
        }
    }
}

/// QA verdict for a single station.
///
/// `g_t_diff` / `w_t_diff` are `reference − signal` rounded to two decimals, `None` when the
/// station is missing a signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QAStationResult {
    pub depth: Length,
    pub inclination_deg: Degree,
    pub azimuth_deg: Degree,
    pub presence: SignalPresence,
    pub g_t_diff: Option<f64>,
    pub w_t_diff: Option<f64>,
    pub g_t_tier: QATier,
    pub w_t_tier: QATier,
    pub overall: QAStatus,
}

/// Survey-level QA figures.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QAAggregate {
    pub rows: usize,
    pub pass_count: usize,
    pub remove_count: usize,

    pub g_t_diff_sum: f64,
    pub w_t_diff_sum: f64,
    pub g_t_diff_pass_sum: f64,
    pub w_t_diff_pass_sum: f64,

    /// Share of the summed difference carried by passing stations, in percent.
    pub g_t_percentage: f64,
    pub w_t_percentage: f64,

    /// Normalized tier points in `[0, 1]`.
    pub g_t_score: f64,
    pub w_t_score: f64,
    pub g_t_score_percentage: f64,
    pub w_t_score_percentage: f64,
}

fn percentage(part: f64, total: f64) -> f64 {
    if total == 0.0 {
        0.0
    } else {
        round_to(part / total * 100.0, QA_PERCENT_DECIMALS)
    }
}

fn score_one(
    depth: Length,
    inclination_deg: Degree,
    azimuth_deg: Degree,
    g_t: Option<f64>,
    w_t: Option<f64>,
    g_reference: f64,
    w_reference: f64,
) -> QAStationResult {
    let presence = SignalPresence::from_signals(g_t, w_t);
    let (g_t_diff, w_t_diff, g_t_tier, w_t_tier) = match (g_t, w_t) {
        (Some(g), Some(w)) => {
            let dg = round_to(g_reference - g, QA_DIFF_DECIMALS);
            let dw = round_to(w_reference - w, QA_DIFF_DECIMALS);
            (
                Some(dg),
                Some(dw),
                QATier::classify(dg, (G_HIGH, G_GOOD, G_LOW)),
                QATier::classify(dw, (W_HIGH, W_GOOD, W_LOW)),
            )
        }
        _ => (None, None, QATier::NoCorrelation, QATier::NoCorrelation),
    };

    let overall = if g_t_tier.is_correlated() && w_t_tier.is_correlated() {
        QAStatus::Pass
    } else {
        QAStatus::Remove
    };

    QAStationResult {
        depth,
        inclination_deg,
        azimuth_deg,
        presence,
        g_t_diff,
        w_t_diff,
        g_t_tier,
        w_t_tier,
        overall,
    }
}

/// Fold per-station verdicts into the survey-level figures.
pub fn aggregate(results: &[QAStationResult]) -> QAAggregate {
    let mut agg = QAAggregate {
        rows: results.len(),
        ..QAAggregate::default()
    };
    let mut g_points = 0.0;
    let mut w_points = 0.0;

    for r in results {
        let dg = r.g_t_diff.unwrap_or(0.0);
        let dw = r.w_t_diff.unwrap_or(0.0);
        agg.g_t_diff_sum += dg;
        agg.w_t_diff_sum += dw;

        match r.overall {
            QAStatus::Pass => {
                agg.pass_count += 1;
                agg.g_t_diff_pass_sum += dg;
                agg.w_t_diff_pass_sum += dw;
            }
            QAStatus::Remove => agg.remove_count += 1,
        }

        g_points += r.g_t_tier.points();
        w_points += r.w_t_tier.points();
    }

    agg.g_t_percentage = percentage(agg.g_t_diff_pass_sum, agg.g_t_diff_sum);
    agg.w_t_percentage = percentage(agg.w_t_diff_pass_sum, agg.w_t_diff_sum);

    let max_points = agg.rows as f64 * HIGH_POINTS;
    if max_points > 0.0 {
        agg.g_t_score = g_points / max_points;
        agg.w_t_score = w_points / max_points;
    }
    agg.g_t_score_percentage = round_to(agg.g_t_score * 100.0, QA_PERCENT_DECIMALS);
    agg.w_t_score_percentage = round_to(agg.w_t_score * 100.0, QA_PERCENT_DECIMALS);

    agg
}

/// Score every station of a survey against the site's reference `G(t)` and `W(t)`.
///
/// Arguments
/// -----------------
/// * `depth`, `inclination`, `azimuth`: Station columns.
/// * `g_signal`, `w_signal`: Measured total gravity / magnetic field per station, `None` when
///   the tool did not report it.
/// * `g_reference`, `w_reference`: Site reference values.
///
/// Return
/// ----------
/// * One [`QAStationResult`] per station, in input order, and the [`QAAggregate`].
///
/// Errors
/// ----------
/// * [`WellpathError::ArrayLengthMismatch`] if any column differs in length from `depth`.
pub fn score_qa(
    depth: &[Length],
    inclination: &[Degree],
    azimuth: &[Degree],
    g_signal: &[Option<f64>],
    w_signal: &[Option<f64>],
    g_reference: f64,
    w_reference: f64,
) -> Result<(Vec<QAStationResult>, QAAggregate), WellpathError> {
    let expected = depth.len();
    for (name, found) in [
        ("inclination", inclination.len()),
        ("azimuth", azimuth.len()),
        ("g_signal", g_signal.len()),
        ("w_signal", w_signal.len()),
    ] {
        if found != expected {
            return Err(WellpathError::ArrayLengthMismatch {
                name,
                expected,
                found,
            });
        }
    }

    let results: Vec<QAStationResult> = izip!(depth, inclination, azimuth, g_signal, w_signal)
        .map(|(&d, &inc, &azi, &g, &w)| score_one(d, inc, azi, g, w, g_reference, w_reference))
        .collect();
    let agg = aggregate(&results);

    debug!(
        rows = agg.rows,
        pass = agg.pass_count,
        remove = agg.remove_count,
        "QA scored"
    );

    Ok((results, agg))
}

/// Stations whose overall status is `status`, plus the deepest station whatever its status.
///
/// The deepest station is the target depth downstream consumers tie the survey to, so it is
/// never filtered out. It appears once even when it also matches `status`.
pub fn filter_by_status(results: &[QAStationResult], status: QAStatus) -> Vec<QAStationResult> {
    let deepest = results
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.depth.total_cmp(&b.depth))
        .map(|(i, _)| i);

    results
        .iter()
        .enumerate()
        .filter(|(i, r)| r.overall == status || Some(*i) == deepest)
        .map(|(_, r)| r.clone())
        .collect()
}

impl fmt::Display for QAAggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "QA Aggregate")?;
            writeln!(f, "------------")?;
            writeln!(
                f,
                "  stations        = {:<8} # pass {} / remove {}",
                self.rows, self.pass_count, self.remove_count
            )?;
            writeln!(
                f,
                "  G(t) diff sum   = {:<8.2} # pass-only {:.2} ({:.2} %)",
                self.g_t_diff_sum, self.g_t_diff_pass_sum, self.g_t_percentage
            )?;
            writeln!(
                f,
                "  W(t) diff sum   = {:<8.2} # pass-only {:.2} ({:.2} %)",
                self.w_t_diff_sum, self.w_t_diff_pass_sum, self.w_t_percentage
            )?;
            writeln!(
                f,
                "  G(t) score      = {:<8.4} # {:.2} %",
                self.g_t_score, self.g_t_score_percentage
            )?;
            writeln!(
                f,
                "  W(t) score      = {:<8.4} # {:.2} %",
                self.w_t_score, self.w_t_score_percentage
            )
        } else {
            write!(
                f,
                "QAAggregate(rows={}, pass={}, remove={}, G(t)={:.2}%, W(t)={:.2}%)",
                self.rows,
                self.pass_count,
                self.remove_count,
                self.g_t_score_percentage,
                self.w_t_score_percentage
            )
        }
    }
}

#[cfg(test)]
mod test_qa {
    use approx::assert_relative_eq;

    use super::*;

    const G_REF: f64 = 1000.0;
    const W_REF: f64 = 50.0;

    fn score_single(g: Option<f64>, w: Option<f64>) -> QAStationResult {
        let (results, _) = score_qa(&[100.0], &[10.0], &[45.0], &[g], &[w], G_REF, W_REF).unwrap();
        results[0].clone()
    }

    #[test]
    fn test_g_tier_boundaries() {
        let cases = [
            (999.0, QATier::High),
            (998.99, QATier::Good),
            (997.0, QATier::Good),
            (990.0, QATier::Low),
            (989.99, QATier::NoCorrelation),
            (1001.0, QATier::High),
            (1001.01, QATier::Good),
            (1010.01, QATier::NoCorrelation),
        ];
        for (g, tier) in cases {
            let r = score_single(Some(g), Some(W_REF));
            assert_eq!(r.g_t_tier, tier, "G(t) = {g}, diff = {:?}", r.g_t_diff);
        }
    }

    #[test]
    fn test_w_tier_boundaries() {
        let cases = [
            (49.0, QATier::High),
            (48.99, QATier::Good),
            (45.0, QATier::Good),
            (44.99, QATier::Low),
            (40.0, QATier::Low),
            (39.99, QATier::NoCorrelation),
            (60.01, QATier::NoCorrelation),
        ];
        for (w, tier) in cases {
            let r = score_single(Some(G_REF), Some(w));
            assert_eq!(r.w_t_tier, tier, "W(t) = {w}, diff = {:?}", r.w_t_diff);
        }
    }

    #[test]
    fn test_differences_are_rounded_before_classification() {
        // 1.004 rounds to 1.00 and stays high.
        let r = score_single(Some(G_REF - 1.004), Some(W_REF));
        assert_eq!(r.g_t_diff, Some(1.0));
        assert_eq!(r.g_t_tier, QATier::High);
    }

    #[test]
    fn test_missing_signal_is_removed() {
        let r = score_single(Some(G_REF), None);
        assert_eq!(r.presence, SignalPresence::GravityOnly);
        assert_eq!(r.g_t_tier, QATier::NoCorrelation);
        assert_eq!(r.w_t_tier, QATier::NoCorrelation);
        assert_eq!(r.overall, QAStatus::Remove);
        assert_eq!(r.g_t_diff, None);

        assert_eq!(
            SignalPresence::from_signals(None, None),
            SignalPresence::Neither
        );
        assert_eq!(
            SignalPresence::from_signals(None, Some(1.0)),
            SignalPresence::MagneticOnly
        );
    }

    #[test]
    fn test_overall_needs_both_tiers() {
        assert_eq!(score_single(Some(990.0), Some(40.0)).overall, QAStatus::Pass);
        assert_eq!(
            score_single(Some(G_REF), Some(30.0)).overall,
            QAStatus::Remove
        );
    }

    #[test]
    fn test_aggregate() {
        let depth = [0.0, 100.0, 200.0, 300.0];
        let inc = [0.0, 5.0, 10.0, 15.0];
        let azi = [0.0, 90.0, 90.0, 90.0];
        let g = [Some(999.0), Some(997.0), Some(980.0), None];
        let w = [Some(50.0), Some(48.0), Some(50.0), Some(50.0)];

        let (results, agg) = score_qa(&depth, &inc, &azi, &g, &w, G_REF, W_REF).unwrap();

        let overall: Vec<_> = results.iter().map(|r| r.overall).collect();
        assert_eq!(
            overall,
            vec![QAStatus::Pass, QAStatus::Pass, QAStatus::Remove, QAStatus::Remove]
        );
        assert_eq!(agg.rows, 4);
        assert_eq!(agg.pass_count, 2);
        assert_eq!(agg.remove_count, 2);

        assert_relative_eq!(agg.g_t_diff_sum, 24.0);
        assert_relative_eq!(agg.g_t_diff_pass_sum, 4.0);
        assert_relative_eq!(agg.g_t_percentage, 16.67);
        assert_relative_eq!(agg.w_t_diff_sum, 2.0);
        assert_relative_eq!(agg.w_t_percentage, 100.0);

        // G(t): high + good + 0 + 0; W(t): high + good + high + 0.
        assert_relative_eq!(agg.g_t_score, 2.7 / 6.0, epsilon = 1e-12);
        assert_relative_eq!(agg.g_t_score_percentage, 45.0);
        assert_relative_eq!(agg.w_t_score, 4.2 / 6.0, epsilon = 1e-12);
        assert_relative_eq!(agg.w_t_score_percentage, 70.0);
    }

    #[test]
    fn test_zero_total_percentage() {
        let (_, agg) = score_qa(
            &[0.0, 10.0],
            &[0.0, 0.0],
            &[0.0, 0.0],
            &[Some(G_REF), Some(G_REF)],
            &[Some(W_REF), Some(W_REF)],
            G_REF,
            W_REF,
        )
        .unwrap();
        assert_eq!(agg.g_t_percentage, 0.0);
        assert_eq!(agg.w_t_percentage, 0.0);
        assert_relative_eq!(agg.g_t_score, 1.0);

        let (results, empty) = score_qa(&[], &[], &[], &[], &[], G_REF, W_REF).unwrap();
        assert!(results.is_empty());
        assert_eq!(empty.g_t_score, 0.0);
        assert_eq!(empty.g_t_score_percentage, 0.0);
    }

    #[test]
    fn test_length_mismatch() {
        let err = score_qa(
            &[0.0, 10.0],
            &[0.0, 0.0],
            &[0.0, 0.0],
            &[Some(G_REF)],
            &[None, None],
            G_REF,
            W_REF,
        )
        .unwrap_err();
        assert_eq!(
            err,
            WellpathError::ArrayLengthMismatch {
                name: "g_signal",
                expected: 2,
                found: 1
            }
        );
        assert!(err.is_client_error());
    }

    #[test]
    fn test_filter_keeps_deepest_station() {
        let depth = [0.0, 100.0, 200.0];
        let g = [Some(G_REF), Some(900.0), Some(900.0)];
        let w = [Some(W_REF); 3];
        let (results, _) =
            score_qa(&depth, &[0.0; 3], &[0.0; 3], &g, &w, G_REF, W_REF).unwrap();

        let passed = filter_by_status(&results, QAStatus::Pass);
        let depths: Vec<_> = passed.iter().map(|r| r.depth).collect();
        assert_eq!(depths, vec![0.0, 200.0]);
        assert_eq!(passed[1].overall, QAStatus::Remove);

        let removed = filter_by_status(&results, QAStatus::Remove);
        let depths: Vec<_> = removed.iter().map(|r| r.depth).collect();
        assert_eq!(depths, vec![100.0, 200.0]);

        assert!(filter_by_status(&[], QAStatus::Pass).is_empty());
    }

    #[test]
    fn test_display() {
        let (_, agg) = score_qa(
            &[0.0],
            &[0.0],
            &[0.0],
            &[Some(G_REF)],
            &[Some(W_REF)],
            G_REF,
            W_REF,
        )
        .unwrap();
        assert_eq!(
            agg.to_string(),
            "QAAggregate(rows=1, pass=1, remove=0, G(t)=100.00%, W(t)=100.00%)"
        );
        assert!(format!("{agg:#}").contains("QA Aggregate"));
        assert_eq!(QATier::NoCorrelation.to_string(), "no_correlation");
    }
}
