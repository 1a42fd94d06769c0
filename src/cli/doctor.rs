//! `konvoi doctor` — configuration sanity checks.

use std::path::Path;

use anyhow::Result;

use crate::config::KonvoiConfig;

/// Validate the loaded configuration and depot table; print a summary.
pub fn run(config_path: &Path, config: &KonvoiConfig) -> Result<()> {
    println!("konvoi doctor");
    println!();

    if config_path.exists() {
        println!("  config:   {} (loaded)", config_path.display());
    } else {
        println!(
            "  config:   {} (missing — using defaults)",
            config_path.display()
        );
    }

    println!("  store:    {}", config.store.base_url);
    println!("  geocode:  {}", config.geocoding.endpoint);
    println!("  distance: {}", config.distance.endpoint);
    println!(
        "  fallback: straight-line × {}",
        config.distance.winding_factor
    );
    println!("  artifacts: {}", config.artifacts.dir.display());

    let table = config.depot_table();
    match table.validate() {
        Ok(()) => {
            println!("  depots:   {} configured, all valid", table.len());
        }
        Err((name, err)) => {
            println!("  depots:   INVALID — '{name}': {err}");
            println!();
            println!("To fix: correct the depot entry in the config file.");
            anyhow::bail!("depot table validation failed");
        }
    }

    if !(1.0..=2.0).contains(&config.distance.winding_factor) {
        println!();
        println!(
            "WARNING: winding factor {} is outside the plausible 1.0–2.0 range.",
            config.distance.winding_factor
        );
    }

    println!();
    println!("All checks passed.");
    Ok(())
}
