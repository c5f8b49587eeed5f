use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use serde_json::Value as JsonValue;

use super::model::{FilterRule, FilterSpec};
use crate::error::{FilterError, Result};

// ---------------------------------------------------------------------------
// Resource location
// ---------------------------------------------------------------------------

/// Supplies the rules document and curve bytes by logical name.
///
/// The catalog builder only talks to this trait, so it never needs to know
/// whether curves come from disk, an archive or memory.
pub trait ResourceSource {
    /// The rules document as JSON text.
    fn read_rules(&self) -> Result<String>;

    /// Raw contents of the curve file named `path` by a rule.
    fn read_curve(&self, path: &str) -> Result<Vec<u8>>;
}

/// Rules file and curve directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct DirResources {
    rules_path: PathBuf,
    curves_dir: PathBuf,
}

impl DirResources {
    pub fn new(rules_path: impl Into<PathBuf>, curves_dir: impl Into<PathBuf>) -> Self {
        Self {
            rules_path: rules_path.into(),
            curves_dir: curves_dir.into(),
        }
    }

    /// Conventional layout: `<root>/filterrules.json` and `<root>/filters/`.
    pub fn from_root(root: &Path) -> Self {
        Self::new(root.join("filterrules.json"), root.join("filters"))
    }
}

impl ResourceSource for DirResources {
    fn read_rules(&self) -> Result<String> {
        std::fs::read_to_string(&self.rules_path).map_err(|e| {
            FilterError::CatalogLoad(format!(
                "reading rules {}: {e}",
                self.rules_path.display()
            ))
        })
    }

    fn read_curve(&self, path: &str) -> Result<Vec<u8>> {
        let full = self.curves_dir.join(path);
        std::fs::read(&full).map_err(|e| {
            FilterError::CatalogLoad(format!("reading curve {}: {e}", full.display()))
        })
    }
}

/// Rules and curves held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryResources {
    rules: String,
    curves: HashMap<String, Vec<u8>>,
}

impl MemoryResources {
    pub fn new(rules: impl Into<String>) -> Self {
        Self {
            rules: rules.into(),
            curves: HashMap::new(),
        }
    }

    pub fn with_curve(mut self, path: &str, contents: impl Into<Vec<u8>>) -> Self {
        self.curves.insert(path.to_string(), contents.into());
        self
    }
}

impl ResourceSource for MemoryResources {
    fn read_rules(&self) -> Result<String> {
        Ok(self.rules.clone())
    }

    fn read_curve(&self, path: &str) -> Result<Vec<u8>> {
        self.curves
            .get(path)
            .cloned()
            .ok_or_else(|| FilterError::CatalogLoad(format!("no curve named '{path}'")))
    }
}

// ---------------------------------------------------------------------------
// Rules document
// ---------------------------------------------------------------------------

/// Expected JSON schema, rule and filter order preserved:
///
/// ```json
/// {
///   "SDSS": {
///     "systems": ["AB"],
///     "instruments": ["SDSS"],
///     "filters": {
///       "g": { "path": "SDSS_g.dat", "AB-Vega": 0.0 },
///       ...
///     }
///   },
///   ...
/// }
/// ```
///
/// Missing `systems`, `instruments` or `filters` keys read as empty.
pub fn parse_rules(text: &str) -> Result<Vec<FilterRule>> {
    let root: JsonValue = serde_json::from_str(text)
        .map_err(|e| FilterError::CatalogLoad(format!("parsing rules JSON: {e}")))?;

    let rules = root
        .as_object()
        .ok_or_else(|| FilterError::CatalogLoad("expected top-level JSON object".into()))?;

    rules
        .iter()
        .map(|(name, body)| parse_rule(name, body))
        .collect()
}

fn parse_rule(name: &str, body: &JsonValue) -> Result<FilterRule> {
    let obj = body
        .as_object()
        .ok_or_else(|| FilterError::CatalogLoad(format!("rule '{name}' is not a JSON object")))?;

    let systems = json_string_set(obj.get("systems"), name, "systems")?;
    let instruments = json_string_set(obj.get("instruments"), name, "instruments")?;

    let mut filters = Vec::new();
    if let Some(val) = obj.get("filters") {
        let entries = val.as_object().ok_or_else(|| {
            FilterError::CatalogLoad(format!("rule '{name}': 'filters' is not an object"))
        })?;
        for (band, spec) in entries {
            let spec: FilterSpec = serde_json::from_value(spec.clone()).map_err(|e| {
                FilterError::CatalogLoad(format!("rule '{name}', filter '{band}': {e}"))
            })?;
            filters.push((band.clone(), spec));
        }
    }

    Ok(FilterRule {
        name: name.to_string(),
        systems,
        instruments,
        filters,
    })
}

fn json_string_set(val: Option<&JsonValue>, rule: &str, key: &str) -> Result<BTreeSet<String>> {
    let Some(val) = val else {
        return Ok(BTreeSet::new());
    };
    let arr = val.as_array().ok_or_else(|| {
        FilterError::CatalogLoad(format!("rule '{rule}': '{key}' is not an array"))
    })?;

    arr.iter()
        .enumerate()
        .map(|(j, v)| {
            v.as_str().map(str::to_string).ok_or_else(|| {
                FilterError::CatalogLoad(format!("rule '{rule}', {key}[{j}]: not a string"))
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Transmission curves
// ---------------------------------------------------------------------------

/// Parse a headerless, space-separated transmission table.
///
/// Each row is `<wavelength> <transmission> [extra columns...]`; runs of
/// whitespace count as one separator and extra columns are ignored. Blank
/// rows are skipped. Rows are returned in file order.
pub fn parse_curve(bytes: &[u8], path: &str) -> Result<Vec<(f64, f64)>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b' ')
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result
            .map_err(|e| FilterError::CatalogLoad(format!("{path}, row {row_no}: {e}")))?;

        let mut fields = record.iter().flat_map(|f| f.split_whitespace());
        let Some(first) = fields.next() else {
            continue;
        };
        let second = fields.next().ok_or_else(|| {
            FilterError::CatalogLoad(format!("{path}, row {row_no}: expected two columns"))
        })?;

        rows.push((
            parse_float(first, path, row_no)?,
            parse_float(second, path, row_no)?,
        ));
    }

    if rows.len() < 2 {
        return Err(FilterError::CatalogLoad(format!(
            "{path}: expected at least 2 rows, got {}",
            rows.len()
        )));
    }
    Ok(rows)
}

fn parse_float(tok: &str, path: &str, row: usize) -> Result<f64> {
    tok.parse::<f64>().map_err(|_| {
        FilterError::CatalogLoad(format!("{path}, row {row}: '{tok}' is not a number"))
    })
}
