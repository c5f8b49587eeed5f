use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::json;

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// Gaussian bandpass tabulated every 10 Å over ±4σ, with a dummy third column.
fn bandpass_table(center: f64, sigma: f64, peak: f64) -> Result<String> {
    let lo = center - 4.0 * sigma;
    let n = (8.0 * sigma / 10.0).round() as usize;
    let mut out = String::new();
    for i in 0..=n {
        let w = lo + 10.0 * i as f64;
        writeln!(out, "{w:.1}  {:.6}  0", gaussian(w, center, sigma, peak))?;
    }
    Ok(out)
}

/// Blackbody-shaped SED (arbitrary units) on a uniform wavelength grid.
fn blackbody(grid: &[f64], temperature: f64) -> Vec<f64> {
    // hc/k in Å·K
    const HC_OVER_K: f64 = 1.438_777e8;
    grid.iter()
        .map(|&w| 1.0e20 / (w.powi(5) * ((HC_OVER_K / (w * temperature)).exp() - 1.0)))
        .collect()
}

fn main() -> Result<()> {
    let root = std::env::args().nth(1).unwrap_or_else(|| "sample_filters".to_string());
    let root = Path::new(&root);
    let curves = root.join("filters");
    std::fs::create_dir_all(&curves).with_context(|| format!("creating {}", curves.display()))?;

    // (band, center Å, sigma Å, peak, AB-Vega)
    let bands = [
        ("B", 4400.0, 400.0, 0.9, -0.09),
        ("V", 5500.0, 350.0, 0.95, 0.02),
        ("R", 6500.0, 600.0, 0.85, 0.21),
    ];

    let mut filters = serde_json::Map::new();
    for &(band, center, sigma, peak, ab_vega) in &bands {
        let file = format!("Demo_{band}.dat");
        std::fs::write(curves.join(&file), bandpass_table(center, sigma, peak)?)
            .with_context(|| format!("writing {file}"))?;
        filters.insert(band.to_string(), json!({ "path": file, "AB-Vega": ab_vega }));
    }

    let rules = json!({
        "Demo": {
            "systems": ["Vega", "AB"],
            "instruments": ["DemoCam"],
            "filters": filters,
        }
    });
    std::fs::write(root.join("filterrules.json"), serde_json::to_string_pretty(&rules)?)?;

    let selectors = json!({
        "selectors": [{ "band": "", "system": "Vega", "instrument": "DemoCam" }]
    });
    std::fs::write(root.join("selectors.json"), serde_json::to_string_pretty(&selectors)?)?;

    // One uniform grid per band, covering the curve with some overhang
    let grids: Vec<Vec<f64>> = bands
        .iter()
        .map(|&(_, center, sigma, _, _)| {
            let lo = center - 5.0 * sigma;
            (0..200).map(|i| lo + i as f64 * 10.0 * sigma / 199.0).collect()
        })
        .collect();

    let temperatures = [4000.0, 8000.0, 16000.0];
    let mut obs_bands = Vec::new();
    let mut seds = Vec::new();
    for &temperature in &temperatures {
        for (bi, &(band, ..)) in bands.iter().enumerate() {
            obs_bands.push(band);
            seds.push(blackbody(&grids[bi], temperature));
        }
    }

    let observations = json!({
        "lumdist": 40.0,
        "luminosities": vec![1.0e42; obs_bands.len()],
        "bands": obs_bands,
        "seds": seds,
        "bandwavelengths": grids,
    });
    std::fs::write(
        root.join("observations.json"),
        serde_json::to_string(&observations)?,
    )?;

    println!(
        "Wrote {} filters and {} observations to {}",
        bands.len(),
        obs_bands.len(),
        root.display()
    );
    Ok(())
}
