//! The merge engine: compose, measure, allocate, commit, unmerge.
//!
//! [`preview`] and [`commit::commit`] share one assembly path, so the
//! numbers the dispatcher approves are exactly the numbers that get
//! persisted — the cost breakdown and distance are recomputed from the
//! draft on both calls, never cached across edits.

pub mod commit;
pub mod compose;
pub mod cost;
pub mod preview;
pub mod unmerge;

pub use commit::{CommitOutcome, commit};
pub use compose::compose;
pub use cost::{CostBreakdown, allocate, price_per_km};
pub use preview::{MergePreview, PreviewWarning, write_preview_artifact};
pub use unmerge::{UnmergeReport, unmerge};

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::depot::DepotTable;
use crate::error::MergeError;
use crate::model::order::TransportOrder;
use crate::model::participation::{MergeDraft, RouteParticipation};
use crate::model::record::{self, RouteStop};
use crate::model::route::RoutePoint;
use crate::model::types::{Location, OrderId};
use crate::providers::{Geocode, RoadDistance};
use crate::route::{self, Measured};
use crate::store::OrderStore;

// ---------------------------------------------------------------------------
// MergeContext
// ---------------------------------------------------------------------------

/// The collaborators one merge workflow needs.
pub struct MergeContext<'a> {
    pub store: &'a dyn OrderStore,
    pub depots: &'a DepotTable,
    pub geocoder: &'a dyn Geocode,
    pub distance_provider: &'a dyn RoadDistance,
    /// Multiplier for the straight-line fallback, typically 1.3.
    pub winding_factor: f64,
}

// ---------------------------------------------------------------------------
// Assembly — shared by preview and commit
// ---------------------------------------------------------------------------

/// Everything derived from a draft in one pass.
pub(crate) struct Assembly {
    pub primary: TransportOrder,
    pub donors: Vec<(TransportOrder, RouteParticipation)>,
    pub measured: Measured,
    pub breakdown: CostBreakdown,
    pub merge_id: String,
    pub stops: Vec<RouteStop>,
    pub price_per_km: Decimal,
}

/// Fetch the participants and derive route, distance, and costs.
///
/// Donor availability is checked here so a stale draft fails fast with the
/// offending donor named; commit re-runs this immediately before the
/// store call, which re-validates once more inside its transaction.
pub(crate) fn assemble(ctx: &MergeContext<'_>, draft: &MergeDraft) -> Result<Assembly, MergeError> {
    let primary = ctx.store.get(&draft.primary)?;
    if !primary.is_available_for_merge() {
        let reason = if primary.merge_record.is_some() {
            "it already carries a merge".to_owned()
        } else if primary.response.is_some() {
            "it has already been answered".to_owned()
        } else {
            format!("its status is {}", primary.status)
        };
        return Err(MergeError::InvalidOrder {
            order: primary.id.clone(),
            reason,
        });
    }

    let mut donors = Vec::with_capacity(draft.donors.len());
    for selection in &draft.donors {
        let order = ctx.store.get(&selection.order)?;
        if !order.is_available_for_merge() {
            let status = if order.response.is_some() {
                "already answered".to_owned()
            } else {
                order.status.to_string()
            };
            return Err(MergeError::DonorNotAvailable {
                order: order.id.clone(),
                status,
            });
        }
        donors.push((order, selection.participation.clone()));
    }

    let sequence = compose(&primary, &donors, draft.primary_unloading_rank)?;
    let measured = route::resolve_and_measure(
        sequence,
        ctx.depots,
        ctx.geocoder,
        ctx.distance_provider,
        ctx.winding_factor,
    );

    let per_donor: BTreeMap<OrderId, Decimal> = draft
        .donors
        .iter()
        .filter_map(|d| {
            d.participation
                .assigned_cost
                .map(|cost| (d.order.clone(), cost))
        })
        .collect();
    let breakdown = allocate(draft.total_price, per_donor);

    let merge_id = record::compute_merge_id(draft);
    let stops = record::stops_from_sequence(&measured.sequence, |p| canonical_address(ctx.depots, p));
    let price_per_km = cost::price_per_km(draft.total_price, measured.distance.total_km);

    Ok(Assembly {
        primary,
        donors,
        measured,
        breakdown,
        merge_id,
        stops,
        price_per_km,
    })
}

/// Canonical display line for a stop: depot table text when available,
/// otherwise the raw location line.
fn canonical_address(depots: &DepotTable, point: &RoutePoint) -> String {
    match &point.location {
        Location::Depot(name) => depots
            .get(name)
            .map_or_else(|| name.clone(), crate::depot::Depot::address_line),
        Location::Address(addr) => addr.display_line(),
    }
}

// ---------------------------------------------------------------------------
// preview
// ---------------------------------------------------------------------------

/// Build the live preview for a draft. Pure read: nothing is persisted.
///
/// # Errors
/// Returns [`MergeError`] for unusable drafts, unavailable participants,
/// or store failures. Resolution/distance degradation is *not* an error —
/// it shows up in `degraded` and `warnings`.
pub fn preview(ctx: &MergeContext<'_>, draft: &MergeDraft) -> Result<MergePreview, MergeError> {
    let assembly = assemble(ctx, draft)?;

    let warnings = assembly
        .measured
        .resolution
        .failures
        .iter()
        .map(|f| PreviewWarning {
            rank: f.rank,
            location: f.location.clone(),
            detail: f.detail.clone(),
        })
        .collect();

    Ok(MergePreview {
        merge_id: assembly.merge_id,
        primary: assembly.primary.id.clone(),
        donors: draft.donors.iter().map(|d| d.order.clone()).collect(),
        route_sequence: assembly.stops,
        total_distance_km: assembly.measured.distance.total_km,
        degraded: assembly.measured.distance.degraded,
        distance_source: preview::distance_source_label(assembly.measured.distance.source),
        total_price: draft.total_price,
        per_donor: assembly.breakdown.per_donor.clone(),
        primary_remainder: assembly.breakdown.primary_remainder,
        over_allocated: assembly.breakdown.over_allocated,
        price_per_km: assembly.price_per_km,
        warnings,
    })
}
