//! `konvoi commit` — persist a merge draft atomically.

use std::path::Path;

use anyhow::Result;

use crate::config::KonvoiConfig;
use crate::merge::{self, MergeContext};
use crate::model::participation::MergeDraft;
use crate::render;
use crate::store::OrderStore;

/// Run the commit flow against the store.
pub fn run(store: &dyn OrderStore, config: &KonvoiConfig, draft_path: &Path) -> Result<()> {
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

    let outcome = merge::commit(&ctx, &draft).map_err(|e| anyhow::anyhow!("{e}"))?;
    let record = &outcome.record;

    println!(
        "Merged {} donor(s) into {}.",
        record.original_transports.len(),
        record.primary_order_id
    );
    println!("  Merge id:  {}", &record.merge_id[..12]);
    println!("  Distance:  {} km{}", record.total_distance, if outcome.degraded {
        " (degraded estimate)"
    } else {
        ""
    });
    println!(
        "  Costs:     {} PLN total, {} PLN primary remainder",
        record.total_merged_cost, record.primary_remainder
    );
    println!("  Map link:  {}", render::map_link(record));
    println!("Next: konvoi unmerge {} (to reverse)", record.primary_order_id);
    Ok(())
}
