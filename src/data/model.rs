use std::collections::BTreeSet;

use serde::Deserialize;

use crate::bandpass::trapezoid;
use crate::error::{FilterError, Result};

// ---------------------------------------------------------------------------
// BandSelector – one user request for a (band, system, instrument) triple
// ---------------------------------------------------------------------------

/// A user-supplied request for filters.
///
/// An empty `band` is a wildcard: every filter of each matching rule is
/// selected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BandSelector {
    pub band: String,
    pub system: String,
    pub instrument: String,
}

impl BandSelector {
    pub fn new(band: &str, system: &str, instrument: &str) -> Self {
        Self {
            band: band.to_string(),
            system: system.to_string(),
            instrument: instrument.to_string(),
        }
    }

    pub fn is_wildcard(&self) -> bool {
        self.band.is_empty()
    }
}

/// Construction-time configuration handed over by the outer pipeline.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub selectors: Vec<BandSelector>,
}

// ---------------------------------------------------------------------------
// FilterRule – one entry of the rules document
// ---------------------------------------------------------------------------

/// Where a filter's curve lives and how its magnitudes relate to Vega.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FilterSpec {
    pub path: String,
    #[serde(rename = "AB-Vega", default)]
    pub ab_vega: f64,
}

/// A named rule: the systems and instruments it serves and the filters it
/// defines, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterRule {
    pub name: String,
    pub systems: BTreeSet<String>,
    pub instruments: BTreeSet<String>,
    pub filters: Vec<(String, FilterSpec)>,
}

impl FilterRule {
    /// A rule applies when it lists both the selector's system and instrument.
    pub fn matches(&self, selector: &BandSelector) -> bool {
        self.systems.contains(&selector.system) && self.instruments.contains(&selector.instrument)
    }

    /// Filters of this rule picked by `selector`. Does not check [`matches`](Self::matches).
    pub fn selected_filters<'a>(
        &'a self,
        selector: &'a BandSelector,
    ) -> impl Iterator<Item = (&'a str, &'a FilterSpec)> + 'a {
        self.filters
            .iter()
            .filter(move |(name, _)| selector.is_wildcard() || *name == selector.band)
            .map(|(name, spec)| (name.as_str(), spec))
    }
}

// ---------------------------------------------------------------------------
// FilterDefinition – a resolved, validated bandpass
// ---------------------------------------------------------------------------

/// One band of the catalog: its sorted transmission curve plus the values
/// derived from it at load time.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterDefinition {
    band_name: String,
    wavelengths: Vec<f64>,
    transmission: Vec<f64>,
    min_wave: f64,
    max_wave: f64,
    normalization_integral: f64,
    ab_vega_offset: f64,
}

impl FilterDefinition {
    /// Build a definition from an unsorted (wavelength, transmission) table.
    ///
    /// Rows are sorted by wavelength. Fails on fewer than two rows,
    /// non-finite values, repeated wavelengths, or a transmission integral
    /// that is not strictly positive.
    pub fn from_table(
        band_name: &str,
        rows: Vec<(f64, f64)>,
        ab_vega_offset: f64,
    ) -> Result<Self> {
        let load_err = |msg: String| FilterError::CatalogLoad(format!("band '{band_name}': {msg}"));

        if rows.len() < 2 {
            return Err(load_err(format!(
                "transmission curve needs at least 2 rows, got {}",
                rows.len()
            )));
        }
        if let Some((w, t)) = rows.iter().find(|(w, t)| !w.is_finite() || !t.is_finite()) {
            return Err(load_err(format!("non-finite curve sample ({w}, {t})")));
        }

        let mut rows = rows;
        rows.sort_by(|a, b| a.0.total_cmp(&b.0));
        if let Some(pair) = rows.windows(2).find(|pair| pair[0].0 == pair[1].0) {
            return Err(load_err(format!("duplicate wavelength {}", pair[0].0)));
        }

        let (wavelengths, transmission): (Vec<f64>, Vec<f64>) = rows.into_iter().unzip();
        let normalization_integral = trapezoid(&transmission, &wavelengths);
        if !normalization_integral.is_finite() || normalization_integral <= 0.0 {
            return Err(load_err(format!(
                "transmission integral must be positive, got {normalization_integral}"
            )));
        }

        Ok(Self {
            band_name: band_name.to_string(),
            min_wave: wavelengths[0],
            max_wave: wavelengths[wavelengths.len() - 1],
            wavelengths,
            transmission,
            normalization_integral,
            ab_vega_offset,
        })
    }

    pub fn band_name(&self) -> &str {
        &self.band_name
    }

    /// Tabulated wavelengths, strictly increasing.
    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    /// Transmission at each tabulated wavelength.
    pub fn transmission(&self) -> &[f64] {
        &self.transmission
    }

    pub fn min_wave(&self) -> f64 {
        self.min_wave
    }

    pub fn max_wave(&self) -> f64 {
        self.max_wave
    }

    pub fn wave_range(&self) -> (f64, f64) {
        (self.min_wave, self.max_wave)
    }

    /// Trapezoidal integral of the transmission over wavelength.
    pub fn normalization_integral(&self) -> f64 {
        self.normalization_integral
    }

    /// Vega-to-AB offset declared by the rule (0.0 when absent).
    pub fn ab_vega_offset(&self) -> f64 {
        self.ab_vega_offset
    }
}

// ---------------------------------------------------------------------------
// Observation – one SED sample to be pushed through a band
// ---------------------------------------------------------------------------

/// A single SED sample on its wavelength grid, observed through `band`.
#[derive(Debug, Clone, Copy)]
pub struct Observation<'a> {
    pub band: &'a str,
    pub sed: &'a [f64],
    pub grid: &'a [f64],
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rule(systems: &[&str], instruments: &[&str], filters: &[&str]) -> FilterRule {
        FilterRule {
            name: "test".into(),
            systems: systems.iter().map(|s| s.to_string()).collect(),
            instruments: instruments.iter().map(|s| s.to_string()).collect(),
            filters: filters
                .iter()
                .map(|f| {
                    (
                        f.to_string(),
                        FilterSpec {
                            path: format!("{f}.dat"),
                            ab_vega: 0.0,
                        },
                    )
                })
                .collect(),
        }
    }

    #[test]
    fn test_rule_needs_system_and_instrument() {
        let r = rule(&["AB"], &["SDSS"], &["g", "r"]);
        assert!(r.matches(&BandSelector::new("g", "AB", "SDSS")));
        assert!(!r.matches(&BandSelector::new("g", "Vega", "SDSS")));
        assert!(!r.matches(&BandSelector::new("g", "AB", "PS1")));
    }

    #[test]
    fn test_selected_filters_exact_and_wildcard() {
        let r = rule(&["AB"], &["SDSS"], &["u", "g", "r"]);

        let exact = BandSelector::new("g", "AB", "SDSS");
        let names: Vec<&str> = r.selected_filters(&exact).map(|(n, _)| n).collect();
        assert_eq!(names, vec!["g"]);

        let wildcard = BandSelector::new("", "AB", "SDSS");
        let names: Vec<&str> = r.selected_filters(&wildcard).map(|(n, _)| n).collect();
        assert_eq!(names, vec!["u", "g", "r"]);

        let missing = BandSelector::new("z", "AB", "SDSS");
        assert_eq!(r.selected_filters(&missing).count(), 0);
    }

    #[test]
    fn test_from_table_sorts_and_integrates() {
        let def = FilterDefinition::from_table(
            "V",
            vec![(5000.0, 1.0), (4000.0, 1.0), (4500.0, 1.0)],
            0.02,
        )
        .unwrap();

        assert_eq!(def.wavelengths(), &[4000.0, 4500.0, 5000.0]);
        assert_eq!(def.wave_range(), (4000.0, 5000.0));
        assert_relative_eq!(def.normalization_integral(), 1000.0, epsilon = 1e-12);
        assert_eq!(def.ab_vega_offset(), 0.02);
    }

    #[test]
    fn test_from_table_rejects_bad_curves() {
        let too_short = FilterDefinition::from_table("x", vec![(4000.0, 1.0)], 0.0);
        assert!(matches!(too_short, Err(FilterError::CatalogLoad(_))));

        let duplicate =
            FilterDefinition::from_table("x", vec![(4000.0, 1.0), (4000.0, 0.5), (4100.0, 1.0)], 0.0);
        assert!(matches!(duplicate, Err(FilterError::CatalogLoad(_))));

        let dark = FilterDefinition::from_table("x", vec![(4000.0, 0.0), (4100.0, 0.0)], 0.0);
        assert!(matches!(dark, Err(FilterError::CatalogLoad(_))));

        let nan = FilterDefinition::from_table("x", vec![(4000.0, f64::NAN), (4100.0, 1.0)], 0.0);
        assert!(matches!(nan, Err(FilterError::CatalogLoad(_))));
    }

    #[test]
    fn test_selector_deserializes_with_defaults() {
        let sel: BandSelector =
            serde_json::from_str(r#"{"system": "AB", "instrument": "SDSS"}"#).unwrap();
        assert!(sel.is_wildcard());
        assert_eq!(sel.system, "AB");
    }
}
