//! AB magnitudes from effective fluxes.

use crate::constants::{AB_OFFSET, FOUR_PI, MAG_FAC, MPC_CGS};
use crate::error::{FilterError, Result};

/// `log10(4π d²)` with `d` the luminosity distance converted to centimetres.
pub fn distance_constant(lumdist_mpc: f64) -> Result<f64> {
    if !lumdist_mpc.is_finite() || lumdist_mpc <= 0.0 {
        return Err(FilterError::Numeric(format!(
            "luminosity distance must be finite and positive, got {lumdist_mpc} Mpc"
        )));
    }
    Ok((FOUR_PI * (lumdist_mpc * MPC_CGS).powi(2)).log10())
}

/// Magnitude for a precomputed [`distance_constant`].
///
/// Zero flux maps to `+inf`, the non-detection sentinel. Negative or
/// non-finite flux cannot come out of a physical SED and is rejected.
pub fn ab_magnitude(effective_flux: f64, dist_const: f64) -> Result<f64> {
    if effective_flux == 0.0 {
        return Ok(f64::INFINITY);
    }
    if !effective_flux.is_finite() || effective_flux < 0.0 {
        return Err(FilterError::Numeric(format!(
            "effective flux must be non-negative and finite, got {effective_flux}"
        )));
    }
    Ok(AB_OFFSET - MAG_FAC * (effective_flux.log10() - dist_const))
}

/// AB magnitude of `effective_flux` seen from `lumdist_mpc` megaparsecs.
pub fn to_magnitude(effective_flux: f64, lumdist_mpc: f64) -> Result<f64> {
    ab_magnitude(effective_flux, distance_constant(lumdist_mpc)?)
}
