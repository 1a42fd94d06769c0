//! The order-store collaborator.
//!
//! konvoi does not persist orders itself. All reads and the two mutating
//! operations (atomic merge commit, unmerge) go through the [`OrderStore`]
//! trait. Two backends exist: [`http::HttpOrderStore`] for the real store
//! service and [`memory::InMemoryOrderStore`], which implements the same
//! contract with genuine all-or-nothing semantics and backs the test
//! suite and the CLI demo mode.

pub mod http;
pub mod memory;

pub use http::HttpOrderStore;
pub use memory::InMemoryOrderStore;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::model::order::TransportOrder;
use crate::model::participation::RouteParticipation;
use crate::model::record::{MergeRecord, RouteStop};
use crate::model::types::OrderId;

// ---------------------------------------------------------------------------
// OrderStore trait
// ---------------------------------------------------------------------------

/// Request/response contract with the order store.
pub trait OrderStore: Send + Sync {
    /// All orders with status `new` — the "available to merge" worklist.
    ///
    /// # Errors
    /// Returns [`StoreError`] on transport or protocol failure.
    fn list_new(&self) -> Result<Vec<TransportOrder>, StoreError>;

    /// One order with full fields.
    ///
    /// # Errors
    /// Returns [`StoreError::OrderNotFound`] for an unknown id.
    fn get(&self, id: &OrderId) -> Result<TransportOrder, StoreError>;

    /// Commit a merge onto the primary order, atomically.
    ///
    /// The store must apply the whole payload or nothing: the primary's
    /// response and merge record are set and every donor flips to
    /// `merged-donor` in one step. Donor availability is re-validated
    /// inside the commit.
    ///
    /// # Errors
    /// Returns [`StoreError::DonorUnavailable`] if any donor is no longer
    /// mergeable; nothing is changed in that case.
    fn commit_merge(
        &self,
        primary: &OrderId,
        payload: &MergeCommitPayload,
    ) -> Result<(), StoreError>;

    /// Reverse a committed merge: restore every donor to `new`, clear the
    /// primary's response and record, delete the record.
    ///
    /// # Errors
    /// Returns [`StoreError::NotMerged`] if the primary carries no merge.
    fn unmerge(&self, primary: &OrderId) -> Result<UnmergeOutcome, StoreError>;
}

/// What an unmerge restored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnmergeOutcome {
    /// Donors restored to independent `new` status, in record order.
    pub restored_donors: Vec<OrderId>,
}

// ---------------------------------------------------------------------------
// MergeCommitPayload
// ---------------------------------------------------------------------------

/// Participation as sent to the store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipationWire {
    pub use_loading: bool,
    pub use_unloading: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loading_rank: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unloading_rank: Option<u32>,
}

impl From<&RouteParticipation> for ParticipationWire {
    fn from(p: &RouteParticipation) -> Self {
        Self {
            use_loading: p.use_loading,
            use_unloading: p.use_unloading,
            loading_rank: p.loading_rank,
            unloading_rank: p.unloading_rank,
        }
    }
}

/// One absorbed donor in the commit payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedDonor {
    pub id: OrderId,
    pub participation: ParticipationWire,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_cost: Option<Decimal>,
}

/// The `PUT order/{id}` body that commits a merge server-side.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeCommitPayload {
    pub driver: String,
    pub vehicle: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrier: Option<String>,
    pub total_price: Decimal,
    pub distance_km: u32,
    /// Total price divided by distance, 2-decimal rounded; zero distance
    /// yields zero.
    pub price_per_km: Decimal,
    pub merged_donors: Vec<MergedDonor>,
    pub route_sequence: Vec<RouteStop>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub admin_notes: String,
    /// The full record persisted verbatim on the primary order.
    pub merge_record: MergeRecord,
}

// ---------------------------------------------------------------------------
// StoreError
// ---------------------------------------------------------------------------

/// Order-store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("store returned HTTP {code}: {detail}")]
    Status { code: u16, detail: String },

    #[error("store response could not be decoded: {0}")]
    Decode(String),

    #[error("order '{order}' not found in the store")]
    OrderNotFound { order: OrderId },

    #[error("donor '{order}' is not available to merge ({status})")]
    DonorUnavailable { order: OrderId, status: String },

    #[error("order '{order}' carries no merge to reverse")]
    NotMerged { order: OrderId },

    #[error("primary order '{order}' cannot carry a merge ({reason})")]
    PrimaryUnusable { order: OrderId, reason: String },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
