#![allow(dead_code)]

use approx::assert_relative_eq;
use wellpath::adjustment::AdjustmentSnapshot;
use wellpath::survey::{Station, TrajectoryPoint};

/// Three-station build used across the integration tests.
pub fn scenario_stations() -> Vec<Station> {
    vec![
        Station::new(0.0, 0.0, 0.0),
        Station::new(100.0, 10.0, 45.0),
        Station::new(200.0, 20.0, 90.0),
    ]
}

/// Build-and-turn survey: `n` stations every `step`, inclination growing by `build` and
/// azimuth by `turn` per station.
pub fn build_and_turn(n: usize, step: f64, build: f64, azimuth0: f64, turn: f64) -> Vec<Station> {
    (0..n)
        .map(|i| {
            let i = i as f64;
            Station::new(
                i * step,
                (i * build).min(90.0),
                (azimuth0 + i * turn).rem_euclid(360.0),
            )
        })
        .collect()
}

pub fn assert_points_close(actual: &[TrajectoryPoint], expected: &[TrajectoryPoint], epsilon: f64) {
    assert_eq!(actual.len(), expected.len());
    for (a, e) in actual.iter().zip(expected) {
        assert_relative_eq!(a.depth, e.depth, epsilon = epsilon);
        assert_relative_eq!(a.north, e.north, epsilon = epsilon);
        assert_relative_eq!(a.east, e.east, epsilon = epsilon);
        assert_relative_eq!(a.tvd, e.tvd, epsilon = epsilon);
    }
}

/// Live chain is `1..=n` with at most one current snapshot, matching `current`.
pub fn assert_chain_invariant(history: &[AdjustmentSnapshot], current: Option<&AdjustmentSnapshot>) {
    for (i, s) in history.iter().enumerate() {
        assert_eq!(s.sequence as usize, i + 1, "gap in the live chain");
    }
    let flagged: Vec<u32> = history
        .iter()
        .filter(|s| s.is_current)
        .map(|s| s.sequence)
        .collect();
    assert!(flagged.len() <= 1, "several current snapshots: {flagged:?}");
    assert_eq!(flagged.first().copied(), current.map(|s| s.sequence));
}
