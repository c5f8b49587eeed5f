use std::collections::HashMap;

use log::{debug, info, warn};

use super::loader::{parse_curve, parse_rules, ResourceSource};
use super::model::{BandSelector, FilterDefinition, FilterRule, FilterSpec};
use crate::error::{FilterError, Result};

// ---------------------------------------------------------------------------
// Catalog – immutable band name → FilterDefinition mapping
// ---------------------------------------------------------------------------

/// Every band resolved from the selectors, with its loaded curve.
///
/// Built once; all accessors take `&self`, so a catalog can be shared
/// (e.g. behind an `Arc`) across any number of concurrent readers.
#[derive(Debug, Clone)]
pub struct Catalog {
    /// Definitions in band declaration order.
    filters: Vec<FilterDefinition>,
    /// band name → position in `filters`.
    index: HashMap<String, usize>,
}

/// A filter picked by a selector, before its curve is loaded.
struct Selection<'a> {
    band: &'a str,
    spec: &'a FilterSpec,
}

impl Catalog {
    /// Resolve `selectors` against the rules from `resources` and load every
    /// selected curve.
    ///
    /// Selector resolution completes before any curve is read, so a
    /// selector that matches nothing fails without touching curve files.
    pub fn build(selectors: &[BandSelector], resources: &dyn ResourceSource) -> Result<Self> {
        let rules = parse_rules(&resources.read_rules()?)?;
        let selections = resolve(selectors, &rules)?;

        let mut curves: HashMap<&str, Vec<(f64, f64)>> = HashMap::new();
        let mut filters: Vec<FilterDefinition> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for sel in selections {
            let rows = match curves.get(sel.spec.path.as_str()) {
                Some(rows) => rows.clone(),
                None => {
                    let bytes = resources.read_curve(&sel.spec.path)?;
                    let rows = parse_curve(&bytes, &sel.spec.path)?;
                    debug!("Loaded {} samples from {}", rows.len(), sel.spec.path);
                    curves.insert(sel.spec.path.as_str(), rows.clone());
                    rows
                }
            };
            let def = FilterDefinition::from_table(sel.band, rows, sel.spec.ab_vega)?;

            match index.get(sel.band) {
                Some(&i) if filters[i] == def => {
                    warn!("Band '{}' resolved more than once; keeping one copy", sel.band);
                }
                Some(_) => {
                    return Err(FilterError::AmbiguousBand {
                        band: sel.band.to_string(),
                    });
                }
                None => {
                    debug!(
                        "Band '{}': {:.1}-{:.1}, integral {:.4e}",
                        sel.band,
                        def.min_wave(),
                        def.max_wave(),
                        def.normalization_integral()
                    );
                    index.insert(sel.band.to_string(), filters.len());
                    filters.push(def);
                }
            }
        }

        info!("Filter catalog built with {} bands", filters.len());
        Ok(Self { filters, index })
    }

    /// Band names in declaration order.
    pub fn band_names(&self) -> Vec<&str> {
        self.filters.iter().map(FilterDefinition::band_name).collect()
    }

    pub fn definition(&self, band: &str) -> Result<&FilterDefinition> {
        self.band_index(band)
            .map(|i| &self.filters[i])
            .ok_or_else(|| FilterError::UnknownBand(band.to_string()))
    }

    pub fn wave_range(&self, band: &str) -> Result<(f64, f64)> {
        self.definition(band).map(FilterDefinition::wave_range)
    }

    pub fn ab_vega_offset(&self, band: &str) -> Result<f64> {
        self.definition(band).map(FilterDefinition::ab_vega_offset)
    }

    /// Position of `band` in [`band_names`](Self::band_names).
    pub fn band_index(&self, band: &str) -> Option<usize> {
        self.index.get(band).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FilterDefinition> {
        self.filters.iter()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Selector resolution
// ---------------------------------------------------------------------------

/// Expand selectors into the ordered list of filters they pick.
///
/// Fails when a selector matches no rule, or when its matching rules define
/// no filter it asks for.
fn resolve<'a>(
    selectors: &'a [BandSelector],
    rules: &'a [FilterRule],
) -> Result<Vec<Selection<'a>>> {
    let mut selections = Vec::new();

    for selector in selectors {
        let matching: Vec<&FilterRule> = rules.iter().filter(|r| r.matches(selector)).collect();
        if matching.is_empty() {
            return Err(FilterError::Config(format!(
                "no filter rule covers system '{}' with instrument '{}'",
                selector.system, selector.instrument
            )));
        }

        let before = selections.len();
        for rule in matching {
            for (band, spec) in rule.selected_filters(selector) {
                debug!("Selector {selector:?} picked '{band}' from rule '{}'", rule.name);
                selections.push(Selection { band, spec });
            }
        }

        if selections.len() == before {
            return Err(FilterError::Config(if selector.is_wildcard() {
                format!(
                    "rules for system '{}' / instrument '{}' define no filters",
                    selector.system, selector.instrument
                )
            } else {
                format!(
                    "band '{}' is not defined for system '{}' / instrument '{}'",
                    selector.band, selector.system, selector.instrument
                )
            }));
        }
    }

    Ok(selections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bandpass::trapezoid;
    use crate::data::loader::MemoryResources;
    use approx::assert_relative_eq;

    const RULES: &str = r#"{
        "SDSS": {
            "systems": ["AB"],
            "instruments": ["SDSS"],
            "filters": {
                "u": {"path": "u.dat"},
                "g": {"path": "g.dat", "AB-Vega": -0.08},
                "r": {"path": "r.dat", "AB-Vega": 0.16}
            }
        },
        "SDSS-copy": {
            "systems": ["AB"],
            "instruments": ["SDSS-alt"],
            "filters": {
                "g": {"path": "g.dat", "AB-Vega": -0.08}
            }
        },
        "Other": {
            "systems": ["AB"],
            "instruments": ["Other"],
            "filters": {
                "g": {"path": "g_other.dat"}
            }
        },
        "Broken": {
            "systems": ["AB"],
            "instruments": ["Broken"],
            "filters": {
                "bad": {"path": "bad.dat"}
            }
        }
    }"#;

    fn resources() -> MemoryResources {
        MemoryResources::new(RULES)
            .with_curve("u.dat", "3500 0.2\n3000 0.0\n4000 0.0\n")
            .with_curve("g.dat", "4000 1\n4500 1\n5000 1\n")
            .with_curve("r.dat", "5500 0.0\n6200 0.9\n7000 0.0\n")
            .with_curve("g_other.dat", "4100 1\n4600 1\n5100 1\n")
            .with_curve("bad.dat", "4000 1\n4500 oops\n5000 1\n")
    }

    #[test]
    fn test_single_band() {
        let catalog =
            Catalog::build(&[BandSelector::new("g", "AB", "SDSS")], &resources()).unwrap();
        assert_eq!(catalog.band_names(), vec!["g"]);

        let g = catalog.definition("g").unwrap();
        assert_relative_eq!(g.normalization_integral(), 1000.0, epsilon = 1e-12);
        assert_eq!(catalog.wave_range("g").unwrap(), (4000.0, 5000.0));
        assert_eq!(catalog.ab_vega_offset("g").unwrap(), -0.08);
    }

    #[test]
    fn test_wildcard_resolves_every_filter_in_order() {
        let catalog =
            Catalog::build(&[BandSelector::new("", "AB", "SDSS")], &resources()).unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.band_names(), vec!["u", "g", "r"]);
        assert_eq!(catalog.band_index("r"), Some(2));
    }

    #[test]
    fn test_integrals_match_independent_trapezoid() {
        let catalog =
            Catalog::build(&[BandSelector::new("", "AB", "SDSS")], &resources()).unwrap();
        for def in catalog.iter() {
            let expected = trapezoid(def.transmission(), def.wavelengths());
            assert_eq!(def.normalization_integral(), expected);
            assert!(def.wavelengths().windows(2).all(|w| w[0] < w[1]));
        }
        // Unsorted file is sorted on load
        let u = catalog.definition("u").unwrap();
        assert_eq!(u.wavelengths(), &[3000.0, 3500.0, 4000.0]);
    }

    #[test]
    fn test_identical_duplicates_collapse() {
        let selectors = [
            BandSelector::new("g", "AB", "SDSS"),
            BandSelector::new("g", "AB", "SDSS-alt"),
            BandSelector::new("", "AB", "SDSS"),
        ];
        let catalog = Catalog::build(&selectors, &resources()).unwrap();
        assert_eq!(catalog.band_names(), vec!["g", "u", "r"]);
    }

    #[test]
    fn test_conflicting_duplicates_are_ambiguous() {
        let selectors = [
            BandSelector::new("g", "AB", "SDSS"),
            BandSelector::new("g", "AB", "Other"),
        ];
        let err = Catalog::build(&selectors, &resources()).unwrap_err();
        assert!(matches!(err, FilterError::AmbiguousBand { band } if band == "g"));
    }

    #[test]
    fn test_unmatched_selector_fails_before_loading_curves() {
        // No curve files at all: resolution must fail first.
        let bare = MemoryResources::new(RULES);
        let err = Catalog::build(&[BandSelector::new("X", "Y", "Z")], &bare).unwrap_err();
        assert!(matches!(err, FilterError::Config(_)));

        // A later bad selector also stops the build before curve loading.
        let selectors = [
            BandSelector::new("g", "AB", "SDSS"),
            BandSelector::new("g", "Vega", "SDSS"),
        ];
        let err = Catalog::build(&selectors, &bare).unwrap_err();
        assert!(matches!(err, FilterError::Config(_)));
    }

    #[test]
    fn test_unresolved_band_is_config_error() {
        let err =
            Catalog::build(&[BandSelector::new("z", "AB", "SDSS")], &resources()).unwrap_err();
        assert!(matches!(err, FilterError::Config(_)));
    }

    #[test]
    fn test_malformed_curve_fails_build() {
        let err =
            Catalog::build(&[BandSelector::new("bad", "AB", "Broken")], &resources()).unwrap_err();
        assert!(matches!(err, FilterError::CatalogLoad(_)));
    }

    #[test]
    fn test_missing_curve_fails_build() {
        let res = MemoryResources::new(RULES);
        let err = Catalog::build(&[BandSelector::new("g", "AB", "SDSS")], &res).unwrap_err();
        assert!(matches!(err, FilterError::CatalogLoad(_)));
    }

    #[test]
    fn test_unknown_band_lookup() {
        let catalog =
            Catalog::build(&[BandSelector::new("g", "AB", "SDSS")], &resources()).unwrap();
        assert!(matches!(
            catalog.definition("V"),
            Err(FilterError::UnknownBand(b)) if b == "V"
        ));
        assert!(catalog.wave_range("V").is_err());
        assert_eq!(catalog.band_index("V"), None);
    }

    #[test]
    fn test_empty_selectors_build_empty_catalog() {
        let catalog = Catalog::build(&[], &resources()).unwrap();
        assert!(catalog.is_empty());
    }
}
