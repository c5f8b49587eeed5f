//! Effective flux: transmission-weighted SED integral, normalized by the
//! band's own transmission integral.

use crate::bandpass::interpolate;
use crate::data::catalog::Catalog;
use crate::data::model::{FilterDefinition, Observation};
use crate::error::{FilterError, Result};

/// Effective flux of every observation, in input order.
pub fn effective_fluxes(catalog: &Catalog, observations: &[Observation<'_>]) -> Result<Vec<f64>> {
    observations
        .iter()
        .map(|obs| -> Result<f64> {
            effective_flux(catalog.definition(obs.band)?, obs.sed, obs.grid)
        })
        .collect()
}

/// Effective flux of one SED sample through `filter`.
///
/// The product of interpolated transmission and SED is integrated with the
/// trapezoid rule over the actual grid spacing, so uniform and non-uniform
/// grids are both handled. A zero result is valid (non-detection).
pub fn effective_flux(filter: &FilterDefinition, sed: &[f64], grid: &[f64]) -> Result<f64> {
    check_sample(sed, grid)?;

    let itrans = interpolate(filter, grid);
    let integral: f64 = grid
        .windows(2)
        .zip(itrans.windows(2).zip(sed.windows(2)))
        .map(|(x, (t, s))| (x[1] - x[0]) * (t[0] * s[0] + t[1] * s[1]) / 2.0)
        .sum();

    Ok(integral / filter.normalization_integral())
}

fn check_sample(sed: &[f64], grid: &[f64]) -> Result<()> {
    if sed.len() != grid.len() {
        return Err(FilterError::InputShape(format!(
            "SED has {} samples but wavelength grid has {}",
            sed.len(),
            grid.len()
        )));
    }
    if grid.len() < 2 {
        return Err(FilterError::InputShape(format!(
            "wavelength grid needs at least 2 points, got {}",
            grid.len()
        )));
    }
    if let Some(i) = grid.iter().position(|w| !w.is_finite()) {
        return Err(FilterError::Numeric(format!("grid[{i}] is {}", grid[i])));
    }
    if let Some(i) = sed.iter().position(|s| !s.is_finite()) {
        return Err(FilterError::Numeric(format!("sed[{i}] is {}", sed[i])));
    }
    if let Some(i) = grid.windows(2).position(|w| w[1] <= w[0]) {
        return Err(FilterError::Numeric(format!(
            "wavelength grid not strictly increasing at index {}",
            i + 1
        )));
    }
    Ok(())
}
