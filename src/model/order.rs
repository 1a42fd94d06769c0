//! Transport orders and carrier responses.
//!
//! A [`TransportOrder`] is the unit the dispatcher works with: created by a
//! requester, answered or merged by a dispatcher, archived on completion.
//! The engine never persists orders itself — they live in the order store
//! and are fetched/updated through the [`crate::store::OrderStore`] seam.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::model::record::MergeRecord;
use crate::model::types::{Address, Location, Mpk, OrderId, OrderStatus};

// ---------------------------------------------------------------------------
// CarrierResponse
// ---------------------------------------------------------------------------

/// The dispatcher's answer to an order: who drives what, for how much.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarrierResponse {
    pub carrier: String,
    pub driver: String,
    pub vehicle: String,
    pub price: Decimal,
}

// ---------------------------------------------------------------------------
// TransportOrder
// ---------------------------------------------------------------------------

/// An order for physical movement of goods.
///
/// `location` is where the goods are picked up (named depot or own-pickup
/// address); `delivery` is the destination address. A merged donor keeps
/// all of its own fields verbatim — only `status` changes — so unmerge
/// needs no reconstruction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportOrder {
    pub id: OrderId,
    /// Human-facing order number, e.g. `"ZT/2026/0147"`.
    pub order_number: String,
    pub location: Location,
    pub delivery: Address,
    pub mpk: Mpk,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub documents: Vec<String>,
    pub client_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
    /// The requester accountable for this order.
    pub responsible_person: String,
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<CarrierResponse>,
    /// Present only on a primary order that currently carries a merge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_record: Option<MergeRecord>,
}

impl TransportOrder {
    /// Whether this order can still join a merge: unanswered, status `new`,
    /// and not itself carrying a merge.
    #[must_use]
    pub fn is_available_for_merge(&self) -> bool {
        self.status == OrderStatus::New && self.response.is_none() && self.merge_record.is_none()
    }

    /// City-level route summary, e.g. `"Białystok → Warszawa"`.
    #[must_use]
    pub fn route_summary(&self) -> String {
        let origin = match &self.location {
            Location::Depot(name) => name.clone(),
            Location::Address(addr) => addr.city.clone(),
        };
        format!("{origin} → {}", self.delivery.city)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
