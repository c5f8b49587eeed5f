use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;

use bandpass_mag::{DirResources, FilterConfig, FilterModule, ProcessInput};

/// Build a filter catalog and evaluate AB magnitudes for a batch of SEDs.
#[derive(Parser, Debug)]
#[command(author, version, about = "Broadband AB magnitudes from SED samples")]
struct Args {
    /// Directory holding `filterrules.json` and a `filters/` curve directory
    #[arg(long)]
    root: Option<PathBuf>,

    /// Rules document (overrides the one under --root)
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Directory of transmission curves (overrides the one under --root)
    #[arg(long)]
    curves: Option<PathBuf>,

    /// JSON file with `{"selectors": [{"band", "system", "instrument"}, ...]}`
    #[arg(long)]
    selectors: PathBuf,

    /// JSON observation batch; magnitudes are printed as JSON (`null` marks a non-detection)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Catalog query to print: bandnames, bandwavelengths or bandoffsets
    #[arg(long)]
    request: Vec<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let resources = resources_from_args(&args)?;
    let config: FilterConfig = read_json(&args.selectors).context("reading selectors")?;
    let module = FilterModule::construct(&config, &resources).context("building filter catalog")?;
    log::info!("Catalog bands: {}", module.band_names().join(", "));

    for kind in &args.request {
        let answer = module.request(kind);
        println!("{}", serde_json::to_string(&answer)?);
    }

    if let Some(path) = &args.input {
        let input: ProcessInput = read_json(path).context("reading observation batch")?;
        let output = module
            .process(&input)
            .with_context(|| format!("processing {}", path.display()))?;
        println!("{}", serde_json::to_string_pretty(&output)?);
    }

    Ok(())
}

fn resources_from_args(args: &Args) -> Result<DirResources> {
    let root = args.root.as_deref();
    let rules = match (&args.rules, root) {
        (Some(rules), _) => rules.clone(),
        (None, Some(root)) => root.join("filterrules.json"),
        (None, None) => bail!("either --root or --rules is required"),
    };
    let curves = match (&args.curves, root) {
        (Some(curves), _) => curves.clone(),
        (None, Some(root)) => root.join("filters"),
        (None, None) => rules
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };
    Ok(DirResources::new(rules, curves))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}
