/// Data layer: rules, transmission curves, and the filter catalog.
///
/// Architecture:
/// ```text
///  filterrules.json + curve files
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  ResourceSource → FilterRule list, curve rows
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ catalog   │  selectors → resolved bands → validated FilterDefinitions
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  model    │  immutable FilterDefinition per band
///   └──────────┘
/// ```

pub mod catalog;
pub mod loader;
pub mod model;
