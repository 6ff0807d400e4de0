//! Numerical derivatives on non-uniform grids.
//!
//! Interior nodes use the second-order central difference for unequal spacing
//!
//! ```text
//! f'(x_i) ≈ (h_s² f_{i+1} + (h_d² − h_s²) f_i − h_d² f_{i−1}) / (h_s h_d (h_s + h_d))
//! ```
//!
//! with `h_s = x_i − x_{i−1}` and `h_d = x_{i+1} − x_i`; the two end nodes use first-order
//! one-sided differences.

use crate::constants::{Degree, Length};
use crate::wellpath_errors::WellpathError;

/// Derivative of `values` with respect to `coords`.
///
/// Errors
/// ----------
/// * [`WellpathError::InputMismatch`] if the slices differ in length, hold fewer than two
///   samples, or `coords` is not strictly increasing.
pub fn gradient(values: &[f64], coords: &[f64]) -> Result<Vec<f64>, WellpathError> {
    let n = values.len();
    if n != coords.len() {
        return Err(WellpathError::InputMismatch(format!(
            "gradient of {n} values against {} coordinates",
            coords.len()
        )));
    }
    if n < 2 {
        return Err(WellpathError::InputMismatch(format!(
            "gradient needs at least 2 samples, got {n}"
        )));
    }
    if coords.windows(2).any(|w| w[1] <= w[0]) {
        return Err(WellpathError::InputMismatch(
            "gradient coordinates must be strictly increasing".into(),
        ));
    }

    let mut out = Vec::with_capacity(n);
    out.push((values[1] - values[0]) / (coords[1] - coords[0]));

    for i in 1..n - 1 {
        let hs = coords[i] - coords[i - 1];
        let hd = coords[i + 1] - coords[i];
        out.push(
            (hs * hs * values[i + 1] + (hd * hd - hs * hs) * values[i] - hd * hd * values[i - 1])
                / (hs * hd * (hd + hs)),
        );
    }

    out.push((values[n - 1] - values[n - 2]) / (coords[n - 1] - coords[n - 2]));
    Ok(out)
}

/// Recover inclination/azimuth (degrees) from a position path sampled along `depth`.
///
/// `inclination = atan2(√(dN² + dE²), dTVD)` and `azimuth = atan2(dE, dN)` wrapped into
/// `[0°, 360°)`.
pub fn orientation_from_path(
    depth: &[Length],
    north: &[Length],
    east: &[Length],
    tvd: &[Length],
) -> Result<(Vec<Degree>, Vec<Degree>), WellpathError> {
    let d_north = gradient(north, depth)?;
    let d_east = gradient(east, depth)?;
    let d_tvd = gradient(tvd, depth)?;

    Ok(itertools::izip!(d_north, d_east, d_tvd)
        .map(|(dn, de, dv)| {
            let inclination = dn.hypot(de).atan2(dv).to_degrees();
            let azimuth = (de.atan2(dn).to_degrees() + 360.0) % 360.0;
            (inclination, azimuth)
        })
        .unzip())
}

#[cfg(test)]
mod test_gradient {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_gradient_of_quadratic() {
        // Second-order scheme is exact for a quadratic in the interior.
        let x = [0.0, 1.0, 3.0, 4.0, 7.0];
        let f: Vec<f64> = x.iter().map(|v| v * v).collect();
        let g = gradient(&f, &x).unwrap();

        assert_relative_eq!(g[0], 1.0);
        assert_relative_eq!(g[1], 2.0, epsilon = 1e-12);
        assert_relative_eq!(g[2], 6.0, epsilon = 1e-12);
        assert_relative_eq!(g[3], 8.0, epsilon = 1e-12);
        assert_relative_eq!(g[4], 11.0);
    }

    #[test]
    fn test_gradient_errors() {
        assert!(gradient(&[1.0], &[0.0]).is_err());
        assert!(gradient(&[1.0, 2.0], &[0.0]).is_err());
        assert!(gradient(&[1.0, 2.0], &[1.0, 1.0]).is_err());
    }

    #[test]
    fn test_orientation_of_tangent() {
        let inc = 30.0_f64.to_radians();
        let azi = 135.0_f64.to_radians();
        let depth = [0.0, 10.0, 25.0, 40.0];
        let north: Vec<f64> = depth.iter().map(|d| d * inc.sin() * azi.cos()).collect();
        let east: Vec<f64> = depth.iter().map(|d| d * inc.sin() * azi.sin()).collect();
        let tvd: Vec<f64> = depth.iter().map(|d| d * inc.cos()).collect();

        let (i, a) = orientation_from_path(&depth, &north, &east, &tvd).unwrap();
        for (i, a) in i.iter().zip(&a) {
            assert_relative_eq!(*i, 30.0, epsilon = 1e-9);
            assert_relative_eq!(*a, 135.0, epsilon = 1e-9);
        }
    }
}
