//! Physical and photometric constants used by the magnitude conversion.

/// Zero point of the AB system in cgs units.
pub const AB_OFFSET: f64 = 48.60;

/// Pogson ratio: magnitudes per decade of flux.
pub const MAG_FAC: f64 = 2.5;

/// One megaparsec in centimetres.
pub const MPC_CGS: f64 = 3.085_677_581_491_367e24;

pub const FOUR_PI: f64 = 4.0 * std::f64::consts::PI;
