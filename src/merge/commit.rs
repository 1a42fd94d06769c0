//! The commit operation: all-or-nothing persistence of a merge.
//!
//! Commit re-derives everything from the draft (same path as the preview),
//! refuses over-allocation, re-validates donor availability, and then
//! hands the store one atomic payload. A failure at any step leaves every
//! order untouched — there is no state in which the primary is committed
//! with only some donors absorbed.

use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{info, warn};

use crate::error::MergeError;
use crate::model::participation::MergeDraft;
use crate::model::record::{MergeRecord, OriginalTransport};
use crate::store::{MergeCommitPayload, MergedDonor, ParticipationWire, StoreError};

use super::{MergeContext, assemble};

// ---------------------------------------------------------------------------
// CommitOutcome
// ---------------------------------------------------------------------------

/// What a successful commit persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct CommitOutcome {
    /// The record now attached to the primary order.
    pub record: MergeRecord,
    /// Whether the persisted distance is a degraded value.
    pub degraded: bool,
}

// ---------------------------------------------------------------------------
// commit
// ---------------------------------------------------------------------------

/// Commit a merge draft against the order store.
///
/// # Errors
///
/// - [`MergeError::OverAllocated`] when donor costs exceed the total price
///   (the zero-clamped preview remainder is display-only — commit checks
///   the real sum).
/// - [`MergeError::DonorNotAvailable`] when a donor was taken between
///   drafting and commit; the whole commit fails, nothing is persisted.
/// - Composition and store errors as produced by the pipeline.
pub fn commit(ctx: &MergeContext<'_>, draft: &MergeDraft) -> Result<CommitOutcome, MergeError> {
    // Re-validate and re-derive immediately before the store call; the
    // preview the dispatcher saw may be arbitrarily stale.
    let assembly = assemble(ctx, draft)?;

    if assembly.breakdown.over_allocated {
        return Err(MergeError::OverAllocated {
            total_price: draft.total_price,
            assigned: assembly.breakdown.assigned_total(),
        });
    }

    // The composer guarantees these invariants; a violation here is a
    // bug, and nothing may be persisted.
    assembly.measured.sequence.validate()?;

    if assembly.measured.distance.degraded {
        warn!(
            merge_id = %assembly.merge_id,
            "committing with a degraded distance value"
        );
    }

    let record = MergeRecord {
        merge_id: assembly.merge_id.clone(),
        primary_order_id: assembly.primary.id.clone(),
        original_transports: assembly
            .donors
            .iter()
            .map(|(order, participation)| OriginalTransport {
                id: order.id.clone(),
                order_number: order.order_number.clone(),
                mpk: order.mpk.clone(),
                cost_assigned: participation.assigned_cost,
                route: order.route_summary(),
                responsible_person: order.responsible_person.clone(),
            })
            .collect(),
        total_merged_cost: draft.total_price,
        primary_remainder: assembly.breakdown.primary_remainder,
        total_distance: assembly.measured.distance.total_km,
        degraded_distance: assembly.measured.distance.degraded,
        merged_at: now_unix_ms(),
        merged_by: draft.merged_by.clone(),
        route_sequence: assembly.stops.clone(),
    };

    let payload = MergeCommitPayload {
        driver: draft.driver.clone(),
        vehicle: draft.vehicle.clone(),
        carrier: draft.carrier.clone(),
        total_price: draft.total_price,
        distance_km: assembly.measured.distance.total_km,
        price_per_km: assembly.price_per_km,
        merged_donors: assembly
            .donors
            .iter()
            .map(|(order, participation)| MergedDonor {
                id: order.id.clone(),
                participation: ParticipationWire::from(participation),
                assigned_cost: participation.assigned_cost,
            })
            .collect(),
        route_sequence: assembly.stops,
        admin_notes: draft.admin_notes.clone(),
        merge_record: record.clone(),
    };

    ctx.store
        .commit_merge(&assembly.primary.id, &payload)
        .map_err(|e| match e {
            StoreError::DonorUnavailable { order, status } => {
                MergeError::DonorNotAvailable { order, status }
            }
            other => MergeError::Store(other),
        })?;

    info!(
        primary = %record.primary_order_id,
        donors = record.original_transports.len(),
        distance_km = record.total_distance,
        merge_id = %record.merge_id,
        "merge committed"
    );

    Ok(CommitOutcome {
        degraded: record.degraded_distance,
        record,
    })
}

/// Wall-clock unix milliseconds; informational only.
fn now_unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
