use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::data::catalog::Catalog;
use crate::data::loader::ResourceSource;
use crate::data::model::{FilterConfig, Observation};
use crate::error::{FilterError, Result};
use crate::flux::effective_fluxes;
use crate::magnitude::{ab_magnitude, distance_constant};

// ---------------------------------------------------------------------------
// Process inputs / outputs
// ---------------------------------------------------------------------------

/// One batch of observations as the outer pipeline hands it over.
///
/// `luminosities`, `bands` and `seds` are parallel, one entry per
/// observation. `band_wavelengths` holds one grid per catalog band, in
/// catalog order; observation `i` uses the grid of `bands[i]`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProcessInput {
    pub lumdist: f64,
    pub luminosities: Vec<f64>,
    pub bands: Vec<String>,
    pub seds: Vec<Vec<f64>>,
    #[serde(rename = "bandwavelengths")]
    pub band_wavelengths: Vec<Vec<f64>>,
}

/// Magnitudes in observation order. Non-detections are `+inf`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessOutput {
    pub model_magnitudes: Vec<f64>,
}

/// Answer to [`FilterModule::request`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RequestResponse {
    BandNames(Vec<String>),
    /// `(min_wave, max_wave)` per band, catalog order.
    BandWavelengths(Vec<(f64, f64)>),
    /// Vega-to-AB offset per band, catalog order.
    BandOffsets(Vec<f64>),
    /// Unrecognized kind; serializes as `[]`.
    Empty(Vec<String>),
}

// ---------------------------------------------------------------------------
// FilterModule – the pipeline stage
// ---------------------------------------------------------------------------

/// SED-to-magnitude stage backed by an immutable, shared [`Catalog`].
///
/// Cloning is cheap and every clone reads the same catalog, so parallel
/// sampler chains can each hold one.
#[derive(Debug, Clone)]
pub struct FilterModule {
    catalog: Arc<Catalog>,
}

impl FilterModule {
    /// Build the catalog for `config`. All file access happens here.
    pub fn construct(config: &FilterConfig, resources: &dyn ResourceSource) -> Result<Self> {
        let catalog = Catalog::build(&config.selectors, resources)?;
        Ok(Self::from_catalog(Arc::new(catalog)))
    }

    pub fn from_catalog(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Model magnitude for every observation in `input`, order preserved.
    pub fn process(&self, input: &ProcessInput) -> Result<ProcessOutput> {
        let n = input.luminosities.len();
        if input.bands.len() != n || input.seds.len() != n {
            return Err(FilterError::InputShape(format!(
                "{n} luminosities, {} bands, {} SEDs",
                input.bands.len(),
                input.seds.len()
            )));
        }
        if input.band_wavelengths.len() != self.catalog.len() {
            return Err(FilterError::InputShape(format!(
                "{} band wavelength grids for {} catalog bands",
                input.band_wavelengths.len(),
                self.catalog.len()
            )));
        }

        let dist_const = distance_constant(input.lumdist)?;

        let mut observations = Vec::with_capacity(n);
        for (band, sed) in input.bands.iter().zip(&input.seds) {
            let bi = self
                .catalog
                .band_index(band)
                .ok_or_else(|| FilterError::UnknownBand(band.clone()))?;
            observations.push(Observation {
                band,
                sed,
                grid: &input.band_wavelengths[bi],
            });
        }

        let model_magnitudes = effective_fluxes(&self.catalog, &observations)?
            .into_iter()
            .map(|flux| ab_magnitude(flux, dist_const))
            .collect::<Result<Vec<_>>>()?;

        Ok(ProcessOutput { model_magnitudes })
    }

    pub fn band_names(&self) -> Vec<String> {
        self.catalog.band_names().into_iter().map(str::to_string).collect()
    }

    /// Query catalog metadata by name. Unknown kinds answer an empty sequence.
    pub fn request(&self, kind: &str) -> RequestResponse {
        match kind {
            "bandnames" => RequestResponse::BandNames(self.band_names()),
            "bandwavelengths" => {
                RequestResponse::BandWavelengths(self.catalog.iter().map(|f| f.wave_range()).collect())
            }
            "bandoffsets" => {
                RequestResponse::BandOffsets(self.catalog.iter().map(|f| f.ab_vega_offset()).collect())
            }
            _ => RequestResponse::Empty(Vec::new()),
        }
    }
}
