use thiserror::Error;

// ---------------------------------------------------------------------------
// FilterError – everything the catalog and the flux pipeline can report
// ---------------------------------------------------------------------------

/// Errors raised while building a filter catalog or evaluating magnitudes.
///
/// `Config`, `CatalogLoad` and `AmbiguousBand` only occur at construction;
/// a catalog that exists is complete and validated. The remaining variants
/// come out of `process` and point at mis-wired inputs upstream.
#[derive(Debug, Error)]
pub enum FilterError {
    /// A selector matched no rule, or a requested band was never resolved.
    #[error("config error: {0}")]
    Config(String),

    /// Rules document or transmission curve missing, unreadable or malformed.
    #[error("catalog load error: {0}")]
    CatalogLoad(String),

    /// Two resolved filters share a band name but not a curve.
    #[error("ambiguous catalog: band '{band}' resolves to differing filter definitions")]
    AmbiguousBand { band: String },

    /// An observation referenced a band the catalog does not contain.
    #[error("unknown band: '{0}'")]
    UnknownBand(String),

    /// Negative flux, non-finite input or an unusable wavelength grid.
    #[error("numeric error: {0}")]
    Numeric(String),

    /// Parallel inputs to `process` disagree in length.
    #[error("input shape error: {0}")]
    InputShape(String),
}

pub type Result<T> = std::result::Result<T, FilterError>;
