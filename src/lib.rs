//! Broadband photometry for simulated transients.
//!
//! A [`FilterModule`] is built once from band selectors, a rules document
//! and transmission-curve files. Afterwards it turns SED samples plus a
//! luminosity distance into AB magnitudes without touching the filesystem.
//!
//! ```text
//!  selectors ──► Catalog::build ──► FilterDefinition per band
//!                                          │
//!  SED + grid ──► bandpass::interpolate ──►│
//!                                          ▼
//!                 flux::effective_flux ──► magnitude::ab_magnitude
//! ```

pub mod bandpass;
pub mod constants;
pub mod data;
pub mod error;
pub mod flux;
pub mod magnitude;
pub mod pipeline;

pub use data::catalog::Catalog;
pub use data::loader::{DirResources, MemoryResources, ResourceSource};
pub use data::model::{BandSelector, FilterConfig, FilterDefinition, Observation};
pub use error::{FilterError, Result};
pub use pipeline::{FilterModule, ProcessInput, ProcessOutput, RequestResponse};
