//! Bandpass sampling and trapezoidal integration.
//!
//! Transmission curves are piecewise linear between their tabulated points.
//! Outside `[min_wave, max_wave]` the curve is held flat at its edge value,
//! so a grid that overhangs a filter sees the edge transmission rather than
//! a linear extrapolation.

use crate::data::model::FilterDefinition;

/// Transmission of `filter` at every wavelength of `grid`.
pub fn interpolate(filter: &FilterDefinition, grid: &[f64]) -> Vec<f64> {
    grid.iter()
        .map(|&w| interp_linear(filter.wavelengths(), filter.transmission(), w))
        .collect()
}

/// Linear interpolation of `(xs, ys)` at `x` with flat extrapolation.
///
/// `xs` must be strictly increasing and non-empty.
fn interp_linear(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    let last = xs.len() - 1;
    if x <= xs[0] {
        return ys[0];
    }
    if x >= xs[last] {
        return ys[last];
    }

    // First tabulated point strictly above x; 1..=last given the checks above.
    let hi = xs.partition_point(|&xi| xi <= x);
    let lo = hi - 1;
    let t = (x - xs[lo]) / (xs[hi] - xs[lo]);
    ys[lo] * (1.0 - t) + ys[hi] * t
}

/// Trapezoidal integral of `ys` over the abscissae `xs`.
///
/// Slices are walked pairwise up to the shorter length; fewer than two
/// points integrate to zero.
pub fn trapezoid(ys: &[f64], xs: &[f64]) -> f64 {
    xs.windows(2)
        .zip(ys.windows(2))
        .map(|(x, y)| (x[1] - x[0]) * (y[0] + y[1]) / 2.0)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ramp() -> FilterDefinition {
        FilterDefinition::from_table(
            "ramp",
            vec![(400.0, 0.0), (500.0, 0.8), (600.0, 0.4), (700.0, 0.2)],
            0.0,
        )
        .unwrap()
    }

    #[test]
    fn test_interpolate_hits_tabulated_points() {
        let filter = ramp();
        let values = interpolate(&filter, &[400.0, 500.0, 600.0, 700.0]);
        assert_eq!(values, vec![0.0, 0.8, 0.4, 0.2]);
    }

    #[test]
    fn test_interpolate_between_points() {
        let filter = ramp();
        let values = interpolate(&filter, &[450.0, 550.0, 675.0]);
        assert_relative_eq!(values[0], 0.4, epsilon = 1e-12);
        assert_relative_eq!(values[1], 0.6, epsilon = 1e-12);
        assert_relative_eq!(values[2], 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_interpolate_clamps_outside_range() {
        let filter = ramp();
        let values = interpolate(&filter, &[100.0, 399.999, 700.001, 5000.0]);
        assert_eq!(values, vec![0.0, 0.0, 0.2, 0.2]);
    }

    #[test]
    fn test_interpolate_preserves_grid_length() {
        let filter = ramp();
        assert!(interpolate(&filter, &[]).is_empty());
        let grid: Vec<f64> = (0..57).map(|i| 380.0 + 6.0 * i as f64).collect();
        assert_eq!(interpolate(&filter, &grid).len(), grid.len());
    }

    #[test]
    fn test_trapezoid_known_areas() {
        // Triangle of base 200 and height 1
        assert_relative_eq!(trapezoid(&[0.0, 1.0, 0.0], &[0.0, 100.0, 200.0]), 100.0);
        // Uneven spacing
        assert_relative_eq!(trapezoid(&[1.0, 1.0, 3.0], &[0.0, 1.0, 4.0]), 7.0);
        assert_eq!(trapezoid(&[1.0], &[0.0]), 0.0);
    }
}
