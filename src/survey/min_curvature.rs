//! Minimum-curvature trajectory solver.
//!
//! Each pair of consecutive stations is joined by a circular arc tangent to both station
//! directions. With inclinations `I1, I2` and azimuths `A1, A2` (radians) the dogleg angle is
//!
//! ```text
//! cos β = cos(I2 − I1) − sin I1 · sin I2 · (1 − cos(A2 − A1))
//! ```
//!
//! and the ratio factor `RF = 2/β · tan(β/2)` (taken as `1` for a straight segment). The
//! position increments of the segment are then
//!
//! ```text
//! ΔN   = ΔMD/2 · (sin I1 cos A1 + sin I2 cos A2) · RF
//! ΔE   = ΔMD/2 · (sin I1 sin A1 + sin I2 sin A2) · RF
//! ΔTVD = ΔMD/2 · (cos I1 + cos I2) · RF
//! ```

use itertools::Itertools;

use crate::constants::{StartPoint, DOGLEG_EPS};
use crate::survey::{validate_stations, Station, TrajectoryError, TrajectoryPoint, TrajectoryService};

/// Reference [`TrajectoryService`] based on the minimum-curvature method.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinimumCurvature;

impl MinimumCurvature {
    pub fn new() -> Self {
        MinimumCurvature
    }
}

/// Ratio factor of a segment with dogleg angle `dogleg` (radians).
#[inline]
fn ratio_factor(dogleg: f64) -> f64 {
    if dogleg.abs() < DOGLEG_EPS {
        1.0
    } else {
        2.0 / dogleg * (dogleg / 2.0).tan()
    }
}

/// Dogleg angle (radians) between two station directions.
pub fn dogleg_angle(upper: &Station, lower: &Station) -> f64 {
    let (i1, i2) = (
        upper.inclination_deg.to_radians(),
        lower.inclination_deg.to_radians(),
    );
    let da = (lower.azimuth_deg - upper.azimuth_deg).to_radians();

    let cos_beta = (i2 - i1).cos() - i1.sin() * i2.sin() * (1.0 - da.cos());
    cos_beta.clamp(-1.0, 1.0).acos()
}

impl TrajectoryService for MinimumCurvature {
    fn compute(
        &self,
        stations: &[Station],
        start_point: StartPoint,
    ) -> Result<Vec<TrajectoryPoint>, TrajectoryError> {
        validate_stations(stations)?;

        let mut points = Vec::with_capacity(stations.len());
        let mut current = TrajectoryPoint {
            depth: stations[0].depth,
            north: start_point.x,
            east: start_point.y,
            tvd: start_point.z,
        };
        points.push(current);

        for (upper, lower) in stations.iter().tuple_windows() {
            let (i1, i2) = (
                upper.inclination_deg.to_radians(),
                lower.inclination_deg.to_radians(),
            );
            let (a1, a2) = (
                upper.azimuth_deg.to_radians(),
                lower.azimuth_deg.to_radians(),
            );

            let half_course = (lower.depth - upper.depth) / 2.0;
            let rf = ratio_factor(dogleg_angle(upper, lower));

            current = TrajectoryPoint {
                depth: lower.depth,
                north: current.north
                    + half_course * (i1.sin() * a1.cos() + i2.sin() * a2.cos()) * rf,
                east: current.east + half_course * (i1.sin() * a1.sin() + i2.sin() * a2.sin()) * rf,
                tvd: current.tvd + half_course * (i1.cos() + i2.cos()) * rf,
            };
            points.push(current);
        }

        Ok(points)
    }
}

#[cfg(test)]
mod test_min_curvature {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_vertical_well() {
        let stations = vec![
            Station::new(0., 0., 0.),
            Station::new(100., 0., 0.),
            Station::new(250., 0., 120.),
        ];
        let points = MinimumCurvature
            .compute(&stations, StartPoint::new(5., -3., 10.))
            .unwrap();

        assert_eq!(points.len(), 3);
        assert_relative_eq!(points[2].tvd, 260.0, epsilon = 1e-12);
        assert_relative_eq!(points[2].north, 5.0, epsilon = 1e-12);
        assert_relative_eq!(points[2].east, -3.0, epsilon = 1e-12);
        assert_eq!(points[1].depth, 100.);
    }

    #[test]
    fn test_horizontal_east() {
        let stations = vec![Station::new(1000., 90., 90.), Station::new(1100., 90., 90.)];
        let points = MinimumCurvature
            .compute(&stations, StartPoint::zeros())
            .unwrap();

        assert_relative_eq!(points[1].east, 100.0, epsilon = 1e-9);
        assert_relative_eq!(points[1].north, 0.0, epsilon = 1e-9);
        assert_relative_eq!(points[1].tvd, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_quarter_circle_build() {
        // 0° → 90° over a quarter circle of radius 100 heading north.
        let radius = 100.0;
        let arc = std::f64::consts::FRAC_PI_2 * radius;
        let stations = vec![Station::new(0., 0., 0.), Station::new(arc, 90., 0.)];
        let points = MinimumCurvature
            .compute(&stations, StartPoint::zeros())
            .unwrap();

        assert_relative_eq!(points[1].north, radius, epsilon = 1e-9);
        assert_relative_eq!(points[1].tvd, radius, epsilon = 1e-9);
        assert_relative_eq!(points[1].east, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rejects_invalid_input() {
        let err = MinimumCurvature
            .compute(&[Station::new(0., 0., 0.)], StartPoint::zeros())
            .unwrap_err();
        assert_eq!(err, TrajectoryError::NotEnoughStations(1));
    }
}
