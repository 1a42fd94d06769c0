//! `konvoi preview` — derive route, distance, and cost split from a draft.

use std::path::Path;

use anyhow::Result;

use crate::config::KonvoiConfig;
use crate::format::OutputFormat;
use crate::merge::{self, MergeContext, MergePreview};
use crate::model::participation::MergeDraft;
use crate::store::OrderStore;

/// Run the preview and print it; optionally write the artifact.
pub fn run(
    store: &dyn OrderStore,
    config: &KonvoiConfig,
    draft_path: &Path,
    format: OutputFormat,
    no_artifact: bool,
) -> Result<()> {
    let draft = MergeDraft::load(draft_path).map_err(|e| anyhow::anyhow!("{e}"))?;

    let depots = config.depot_table();
    let geocoder = super::build_geocoder(config)?;
    let distance_provider = super::build_distance_provider(config)?;
    let ctx = MergeContext {
        store,
        depots: &depots,
        geocoder: &geocoder,
        distance_provider: &distance_provider,
        winding_factor: config.distance.winding_factor,
    };

    let preview = merge::preview(&ctx, &draft).map_err(|e| anyhow::anyhow!("{e}"))?;

    if format == OutputFormat::Json {
        println!("{}", format.serialize(&preview)?);
    } else {
        print_preview(&preview);
    }

    if !no_artifact {
        let path = merge::write_preview_artifact(&config.artifacts.dir, &preview)
            .map_err(|e| anyhow::anyhow!("{e}"))?;
        println!("Preview artifact: {}", path.display());
    }

    Ok(())
}

fn print_preview(preview: &MergePreview) {
    println!("Merge preview {}", &preview.merge_id[..12]);
    println!();
    println!("Route ({} stops):", preview.route_sequence.len());
    for stop in &preview.route_sequence {
        println!("  {}. {:<40} {}", stop.position, stop.description, stop.address);
    }
    println!();

    let degraded_note = if preview.degraded {
        format!("  [degraded: {}]", preview.distance_source)
    } else {
        String::new()
    };
    println!(
        "Distance: {} km{degraded_note}",
        preview.total_distance_km
    );
    println!(
        "Price:    {} PLN total, {} PLN/km",
        preview.total_price, preview.price_per_km
    );
    for (donor, cost) in &preview.per_donor {
        println!("  {donor}: {cost} PLN");
    }
    println!("  primary remainder: {} PLN", preview.primary_remainder);

    if preview.over_allocated {
        println!();
        println!(
            "WARNING: donor costs exceed the total price — commit will refuse this draft."
        );
    }
    for warning in &preview.warnings {
        println!();
        println!(
            "WARNING: stop {} ({}) unresolved: {}",
            warning.rank, warning.location, warning.detail
        );
    }

    println!();
    println!("Next: konvoi commit --draft <file>");
}
