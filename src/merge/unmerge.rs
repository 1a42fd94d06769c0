//! The unmerge operation: full reversal of a committed merge.
//!
//! Donors were never mutated beyond their status at commit time, so the
//! restoration is exact: each one returns to independent `new` state with
//! its route and cost fields verbatim, the primary's response and merge
//! fields are cleared, and the record is deleted. There is no partial
//! unmerge — the store applies the reversal atomically.

use tracing::info;

use crate::error::MergeError;
use crate::model::types::OrderId;
use crate::store::{OrderStore, StoreError};

// ---------------------------------------------------------------------------
// UnmergeReport
// ---------------------------------------------------------------------------

/// What an unmerge restored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnmergeReport {
    /// The primary order whose merge was reversed.
    pub primary: OrderId,
    /// The merge id of the deleted record.
    pub merge_id: String,
    /// Donors restored to status `new`, in record order.
    pub restored_donors: Vec<OrderId>,
}

// ---------------------------------------------------------------------------
// unmerge
// ---------------------------------------------------------------------------

/// Reverse the merge carried by `primary`.
///
/// # Errors
///
/// Returns [`MergeError::NotMerged`] if the order exists but carries no
/// merge record, and store errors for anything else.
pub fn unmerge(store: &dyn OrderStore, primary: &OrderId) -> Result<UnmergeReport, MergeError> {
    let order = store.get(primary)?;
    let Some(record) = order.merge_record else {
        return Err(MergeError::NotMerged {
            order: primary.clone(),
        });
    };

    let outcome = store.unmerge(primary).map_err(|e| match e {
        StoreError::NotMerged { order } => MergeError::NotMerged { order },
        other => MergeError::Store(other),
    })?;

    info!(
        primary = %primary,
        restored = outcome.restored_donors.len(),
        merge_id = %record.merge_id,
        "merge reversed"
    );

    Ok(UnmergeReport {
        primary: primary.clone(),
        merge_id: record.merge_id,
        restored_donors: outcome.restored_donors,
    })
}
