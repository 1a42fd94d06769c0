//! The persisted merge record and its deterministic identifier.
//!
//! A [`MergeRecord`] is written onto the primary order at commit time and
//! is the only artifact later flows read: the route renderer, the CMR and
//! invoice documents, and the unmerge operation all reconstruct state from
//! it without recomputation. Donor orders may be deleted or archived after
//! the fact, so the record carries serialized stops, not live references.
//!
//! # Merge ID
//!
//! `merge_id` is a stable identifier: `sha256(primary || sorted donor
//! selections || total price)`. The same draft always produces the same
//! ID; `merged_at`/`merged_by` are deliberately excluded so a re-merge of
//! identical inputs is recognizable as identical.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::model::participation::MergeDraft;
use crate::model::route::{PointKind, RoutePoint, RouteSequence};
use crate::model::types::{Address, Mpk, OrderId};

// ---------------------------------------------------------------------------
// OriginalTransport
// ---------------------------------------------------------------------------

/// A donor order as it looked when it was absorbed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginalTransport {
    pub id: OrderId,
    pub order_number: String,
    pub mpk: Mpk,
    /// The slice of the total price assigned to this donor (absent when
    /// the dispatcher left it unassigned).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_assigned: Option<Decimal>,
    /// City-level route summary, e.g. `"Łódź → Warszawa"`.
    pub route: String,
    pub responsible_person: String,
}

// ---------------------------------------------------------------------------
// RouteStop
// ---------------------------------------------------------------------------

/// One serialized stop of the merged run.
///
/// `transport_id` is `None` for the primary order's own stops. `location`
/// is the structured address when the stop came from a free-form address,
/// `None` for named depots; `address` always carries the display line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStop {
    #[serde(rename = "type")]
    pub kind: PointKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport_id: Option<OrderId>,
    /// 1-based position in the run.
    #[serde(rename = "order")]
    pub position: u32,
    #[serde(default)]
    pub location: Option<Address>,
    pub description: String,
    pub address: String,
}

// ---------------------------------------------------------------------------
// MergeRecord
// ---------------------------------------------------------------------------

/// Persisted outcome of a committed merge, attached to the primary order.
///
/// Round-trips through JSON: rendering a map link or a shipment document
/// from a stored record reproduces the exact stop order the composer
/// produced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeRecord {
    /// Deterministic id over the merge inputs (see module docs).
    pub merge_id: String,
    pub primary_order_id: OrderId,
    /// The absorbed donor orders, in draft order.
    pub original_transports: Vec<OriginalTransport>,
    /// The negotiated price for the whole run.
    pub total_merged_cost: Decimal,
    /// Remainder attributed to the primary order after donor assignments.
    pub primary_remainder: Decimal,
    /// Total route distance in whole kilometers.
    pub total_distance: u32,
    /// Whether the distance came from the straight-line fallback or the
    /// sequence had unresolved stops.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub degraded_distance: bool,
    /// Wall-clock unix milliseconds at commit (informational).
    pub merged_at: u64,
    pub merged_by: String,
    pub route_sequence: Vec<RouteStop>,
}

impl MergeRecord {
    /// Ids of the absorbed donors, in record order.
    #[must_use]
    pub fn donor_ids(&self) -> Vec<&OrderId> {
        self.original_transports.iter().map(|t| &t.id).collect()
    }

    /// Reconstruct the ordered stop list; positions are already 1..=n.
    #[must_use]
    pub fn stops(&self) -> &[RouteStop] {
        &self.route_sequence
    }
}

/// Serialize a composed sequence into record stops.
///
/// `canonical_address` supplies the display line per point (depot canonical
/// text or address line); the structured location is carried only for
/// address-based stops.
#[must_use]
pub fn stops_from_sequence(
    sequence: &RouteSequence,
    canonical_address: impl Fn(&RoutePoint) -> String,
) -> Vec<RouteStop> {
    sequence
        .points()
        .iter()
        .map(|point| RouteStop {
            kind: point.kind,
            transport_id: point.owner.donor_id().cloned(),
            position: point.rank,
            location: point.location.address().cloned(),
            description: point.description.clone(),
            address: canonical_address(point),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// merge_id computation
// ---------------------------------------------------------------------------

/// Compute the deterministic merge id for a draft.
///
/// Algorithm: SHA-256 over the primary id, each donor's id + participation
/// flags + requested ranks + assigned cost (donors sorted by id so draft
/// order does not matter), and the total price. Returns lowercase hex.
#[must_use]
pub fn compute_merge_id(draft: &MergeDraft) -> String {
    let mut hasher = Sha256::new();

    hasher.update(draft.primary.as_str().as_bytes());
    hasher.update(b"\n");

    let mut donors: Vec<_> = draft.donors.iter().collect();
    donors.sort_by(|a, b| a.order.cmp(&b.order));
    for donor in donors {
        let p = &donor.participation;
        hasher.update(donor.order.as_str().as_bytes());
        hasher.update(b":");
        hasher.update([u8::from(p.use_loading), u8::from(p.use_unloading)]);
        hasher.update(rank_bytes(p.loading_rank));
        hasher.update(rank_bytes(p.unloading_rank));
        if let Some(cost) = p.assigned_cost {
            hasher.update(cost.to_string().as_bytes());
        }
        hasher.update(b"\n");
    }
    hasher.update(b"---\n");

    if let Some(rank) = draft.primary_unloading_rank {
        hasher.update(rank.to_be_bytes());
    }
    hasher.update(b"\n");
    hasher.update(draft.total_price.to_string().as_bytes());

    let digest = hasher.finalize();
    let mut hex = String::with_capacity(64);
    for byte in &digest {
        use std::fmt::Write as _;
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}

fn rank_bytes(rank: Option<u32>) -> [u8; 5] {
    let mut out = [0u8; 5];
    if let Some(r) = rank {
        out[0] = 1;
        out[1..].copy_from_slice(&r.to_be_bytes());
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
