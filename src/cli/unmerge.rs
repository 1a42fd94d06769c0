//! `konvoi unmerge` — reverse a committed merge.

use anyhow::Result;

use crate::merge;
use crate::store::OrderStore;

/// Reverse the merge on the given primary order.
pub fn run(store: &dyn OrderStore, order_id: &str) -> Result<()> {
    let id = super::orders::parse_order_id(order_id)?;

    let report = merge::unmerge(store, &id).map_err(|e| anyhow::anyhow!("{e}"))?;

    println!("Unmerged {}.", report.primary);
    println!("  Merge id: {}", &report.merge_id[..12]);
    if report.restored_donors.is_empty() {
        println!("  No donor orders remained to restore.");
    } else {
        println!("  Restored donor(s):");
        for donor in &report.restored_donors {
            println!("    {donor}");
        }
    }
    println!("Next: konvoi orders");
    Ok(())
}
