//! CostAllocator: split one negotiated price across the source orders.
//!
//! The allocation must reconcile exactly: the primary remainder plus every
//! donor assignment equals the total price, with no leakage and no double
//! counting. Over-allocation is *surfaced*, never silently clamped away —
//! the zero-clamp on the displayed remainder is a display convenience, and
//! the commit step refuses to persist while `over_allocated` is set.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::model::types::OrderId;

// ---------------------------------------------------------------------------
// CostBreakdown
// ---------------------------------------------------------------------------

/// The split of a total price across donors and the primary order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CostBreakdown {
    /// The negotiated price for the whole run.
    pub total_price: Decimal,
    /// Per-donor assignments, keyed by donor order id.
    pub per_donor: BTreeMap<OrderId, Decimal>,
    /// `max(0, total_price − Σ per_donor)`; the clamp is display-only and
    /// `over_allocated` says whether it fired.
    pub primary_remainder: Decimal,
    /// Donor assignments exceed the total price; commit must refuse.
    pub over_allocated: bool,
}

impl CostBreakdown {
    /// Sum of all donor assignments.
    #[must_use]
    pub fn assigned_total(&self) -> Decimal {
        self.per_donor.values().copied().sum()
    }
}

// ---------------------------------------------------------------------------
// allocate
// ---------------------------------------------------------------------------

/// Compute the cost breakdown for a total price and donor assignments.
///
/// Idempotent: the same inputs always produce the same breakdown, and the
/// same call serves both the live preview and the final commit value, so
/// the two can never drift apart.
#[must_use]
pub fn allocate(total_price: Decimal, per_donor: BTreeMap<OrderId, Decimal>) -> CostBreakdown {
    let assigned: Decimal = per_donor.values().copied().sum();
    let over_allocated = assigned > total_price;
    let primary_remainder = if over_allocated {
        Decimal::ZERO
    } else {
        total_price - assigned
    };
    CostBreakdown {
        total_price,
        per_donor,
        primary_remainder,
        over_allocated,
    }
}

/// Price per kilometer, rounded to 2 decimals; zero distance yields zero.
#[must_use]
pub fn price_per_km(total_price: Decimal, distance_km: u32) -> Decimal {
    if distance_km == 0 {
        return Decimal::ZERO;
    }
    (total_price / Decimal::from(distance_km)).round_dp(2)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
