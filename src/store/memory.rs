//! In-memory order store with real atomic semantics.
//!
//! Used by the test suite and the CLI's demo mode. The whole store sits
//! behind one mutex: commit re-validates every donor and then applies all
//! mutations while still holding the lock, so a failed validation leaves
//! every order exactly as it was — the same all-or-nothing contract the
//! real store service provides with a database transaction.

use std::collections::BTreeMap;
use std::sync::Mutex;

use tracing::{info, warn};

use crate::model::order::{CarrierResponse, TransportOrder};
use crate::model::types::{OrderId, OrderStatus};
use crate::store::{MergeCommitPayload, OrderStore, StoreError, UnmergeOutcome};

/// Thread-safe in-memory backend.
pub struct InMemoryOrderStore {
    orders: Mutex<BTreeMap<OrderId, TransportOrder>>,
}

impl InMemoryOrderStore {
    /// Create a store seeded with `orders`.
    #[must_use]
    pub fn new(orders: impl IntoIterator<Item = TransportOrder>) -> Self {
        let map = orders.into_iter().map(|o| (o.id.clone(), o)).collect();
        Self {
            orders: Mutex::new(map),
        }
    }

    /// Create an empty store.
    #[must_use]
    pub fn empty() -> Self {
        Self::new([])
    }

    /// Insert or replace one order (test/demo seeding).
    pub fn put(&self, order: TransportOrder) {
        self.lock().insert(order.id.clone(), order);
    }

    /// Snapshot of one order, if present.
    #[must_use]
    pub fn snapshot(&self, id: &OrderId) -> Option<TransportOrder> {
        self.lock().get(id).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<OrderId, TransportOrder>> {
        // A poisoned lock means a panic mid-mutation in another test
        // thread; the data is still the best available.
        self.orders
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Default for InMemoryOrderStore {
    fn default() -> Self {
        Self::empty()
    }
}

impl OrderStore for InMemoryOrderStore {
    fn list_new(&self) -> Result<Vec<TransportOrder>, StoreError> {
        let orders = self.lock();
        Ok(orders
            .values()
            .filter(|o| o.status == OrderStatus::New)
            .cloned()
            .collect())
    }

    fn get(&self, id: &OrderId) -> Result<TransportOrder, StoreError> {
        self.lock()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::OrderNotFound { order: id.clone() })
    }

    fn commit_merge(
        &self,
        primary: &OrderId,
        payload: &MergeCommitPayload,
    ) -> Result<(), StoreError> {
        let mut orders = self.lock();

        // Validate everything before touching anything.
        let primary_order = orders
            .get(primary)
            .ok_or_else(|| StoreError::OrderNotFound {
                order: primary.clone(),
            })?;
        if primary_order.merge_record.is_some() {
            return Err(StoreError::PrimaryUnusable {
                order: primary.clone(),
                reason: "it already carries a merge".to_owned(),
            });
        }
        if primary_order.response.is_some() {
            return Err(StoreError::PrimaryUnusable {
                order: primary.clone(),
                reason: "it has already been answered".to_owned(),
            });
        }
        if primary_order.status != OrderStatus::New {
            return Err(StoreError::PrimaryUnusable {
                order: primary.clone(),
                reason: format!("status is {}", primary_order.status),
            });
        }

        for donor in &payload.merged_donors {
            let order = orders.get(&donor.id).ok_or_else(|| StoreError::OrderNotFound {
                order: donor.id.clone(),
            })?;
            if !order.is_available_for_merge() {
                let status = if order.response.is_some() {
                    "already answered".to_owned()
                } else {
                    order.status.to_string()
                };
                return Err(StoreError::DonorUnavailable {
                    order: donor.id.clone(),
                    status,
                });
            }
        }

        // All checks passed — apply the whole payload under the same lock.
        for donor in &payload.merged_donors {
            if let Some(order) = orders.get_mut(&donor.id) {
                order.status = OrderStatus::MergedDonor;
            }
        }

        if let Some(order) = orders.get_mut(primary) {
            order.response = Some(CarrierResponse {
                carrier: payload.carrier.clone().unwrap_or_default(),
                driver: payload.driver.clone(),
                vehicle: payload.vehicle.clone(),
                price: payload.total_price,
            });
            order.distance_km = Some(payload.distance_km);
            if !payload.admin_notes.is_empty() {
                order.notes = payload.admin_notes.clone();
            }
            order.merge_record = Some(payload.merge_record.clone());
        }

        info!(
            primary = %primary,
            donors = payload.merged_donors.len(),
            merge_id = %payload.merge_record.merge_id,
            "merge committed"
        );
        Ok(())
    }

    fn unmerge(&self, primary: &OrderId) -> Result<UnmergeOutcome, StoreError> {
        let mut orders = self.lock();

        let record = {
            let primary_order = orders
                .get(primary)
                .ok_or_else(|| StoreError::OrderNotFound {
                    order: primary.clone(),
                })?;
            primary_order
                .merge_record
                .clone()
                .ok_or_else(|| StoreError::NotMerged {
                    order: primary.clone(),
                })?
        };

        let mut restored = Vec::new();
        for donor_id in record.donor_ids() {
            match orders.get_mut(donor_id) {
                Some(order) => {
                    // Donors were only status-changed at commit, so a
                    // status flip is a full restoration.
                    order.status = OrderStatus::New;
                    restored.push(donor_id.clone());
                }
                None => {
                    warn!(donor = %donor_id, "donor no longer in store, skipping restore");
                }
            }
        }

        if let Some(order) = orders.get_mut(primary) {
            order.response = None;
            order.distance_km = None;
            order.merge_record = None;
        }

        info!(primary = %primary, restored = restored.len(), "merge reversed");
        Ok(UnmergeOutcome {
            restored_donors: restored,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::record::{MergeRecord, OriginalTransport};
    use crate::model::types::{Address, Location, Mpk};
    use rust_decimal_macros::dec;

    fn order(id: &str) -> TransportOrder {
        TransportOrder {
            id: OrderId::new(id).unwrap(),
            order_number: format!("ZT/2026/{id}"),
            location: Location::Depot("bialystok".to_owned()),
            delivery: Address {
                city: "Warszawa".to_owned(),
                postal_code: "00-001".to_owned(),
                street: "Towarowa 5".to_owned(),
            },
            mpk: Mpk::new("MPK-501").unwrap(),
            documents: vec![],
            client_name: "Alfa".to_owned(),
            notes: String::new(),
            responsible_person: "j.kowalska".to_owned(),
            status: OrderStatus::New,
            distance_km: None,
            response: None,
            merge_record: None,
        }
    }

    fn record(primary: &str, donors: &[&str]) -> MergeRecord {
        MergeRecord {
            merge_id: "f".repeat(64),
            primary_order_id: OrderId::new(primary).unwrap(),
            original_transports: donors
                .iter()
                .map(|id| OriginalTransport {
                    id: OrderId::new(id).unwrap(),
                    order_number: format!("ZT/2026/{id}"),
                    mpk: Mpk::new("MPK-502").unwrap(),
                    cost_assigned: Some(dec!(200.00)),
                    route: "Łódź → Warszawa".to_owned(),
                    responsible_person: "m.wisniewski".to_owned(),
                })
                .collect(),
            total_merged_cost: dec!(900.00),
            primary_remainder: dec!(700.00),
            total_distance: 193,
            degraded_distance: false,
            merged_at: 1,
            merged_by: "j.kowalska".to_owned(),
            route_sequence: vec![],
        }
    }

    fn payload(primary: &str, donors: &[&str]) -> MergeCommitPayload {
        MergeCommitPayload {
            driver: "A. Nowak".to_owned(),
            vehicle: "WB 12345".to_owned(),
            carrier: None,
            total_price: dec!(900.00),
            distance_km: 193,
            price_per_km: dec!(4.66),
            merged_donors: donors
                .iter()
                .map(|id| crate::store::MergedDonor {
                    id: OrderId::new(id).unwrap(),
                    participation: crate::store::ParticipationWire {
                        use_loading: false,
                        use_unloading: true,
                        loading_rank: None,
                        unloading_rank: Some(2),
                    },
                    assigned_cost: Some(dec!(200.00)),
                })
                .collect(),
            route_sequence: vec![],
            admin_notes: String::new(),
            merge_record: record(primary, donors),
        }
    }

    // -- listing --

    #[test]
    fn list_new_filters_by_status() {
        let store = InMemoryOrderStore::new([order("TR-1001"), order("TR-1002")]);
        let mut answered = order("TR-1003");
        answered.status = OrderStatus::Completed;
        store.put(answered);

        let listed = store.list_new().unwrap();
        assert_eq!(listed.len(), 2);
    }

    #[test]
    fn get_unknown_order_fails() {
        let store = InMemoryOrderStore::empty();
        let id = OrderId::new("TR-9999").unwrap();
        assert!(matches!(
            store.get(&id),
            Err(StoreError::OrderNotFound { .. })
        ));
    }

    // -- commit atomicity --

    #[test]
    fn commit_flips_donors_and_sets_primary() {
        let store = InMemoryOrderStore::new([order("TR-1001"), order("TR-1002")]);
        let primary = OrderId::new("TR-1001").unwrap();

        store
            .commit_merge(&primary, &payload("TR-1001", &["TR-1002"]))
            .unwrap();

        let committed = store.snapshot(&primary).unwrap();
        assert!(committed.merge_record.is_some());
        assert_eq!(committed.distance_km, Some(193));
        assert_eq!(committed.response.as_ref().unwrap().price, dec!(900.00));

        let donor = store.snapshot(&OrderId::new("TR-1002").unwrap()).unwrap();
        assert_eq!(donor.status, OrderStatus::MergedDonor);
    }

    #[test]
    fn commit_with_stale_donor_changes_nothing() {
        let store = InMemoryOrderStore::new([order("TR-1001"), order("TR-1002")]);
        let mut taken = order("TR-1003");
        taken.status = OrderStatus::MergedDonor;
        store.put(taken);
        let primary = OrderId::new("TR-1001").unwrap();

        let err = store
            .commit_merge(&primary, &payload("TR-1001", &["TR-1002", "TR-1003"]))
            .unwrap_err();
        assert!(matches!(err, StoreError::DonorUnavailable { .. }));

        // Nothing moved — not even the available donor.
        let untouched = store.snapshot(&OrderId::new("TR-1002").unwrap()).unwrap();
        assert_eq!(untouched.status, OrderStatus::New);
        let primary_order = store.snapshot(&primary).unwrap();
        assert!(primary_order.merge_record.is_none());
        assert!(primary_order.response.is_none());
    }

    #[test]
    fn commit_rejects_already_merged_primary() {
        let store = InMemoryOrderStore::new([order("TR-1001"), order("TR-1002")]);
        let primary = OrderId::new("TR-1001").unwrap();
        store
            .commit_merge(&primary, &payload("TR-1001", &["TR-1002"]))
            .unwrap();

        let err = store
            .commit_merge(&primary, &payload("TR-1001", &["TR-1002"]))
            .unwrap_err();
        assert!(matches!(err, StoreError::PrimaryUnusable { .. }));
    }

    // -- unmerge --

    #[test]
    fn unmerge_restores_everything() {
        let store = InMemoryOrderStore::new([order("TR-1001"), order("TR-1002")]);
        let primary = OrderId::new("TR-1001").unwrap();
        store
            .commit_merge(&primary, &payload("TR-1001", &["TR-1002"]))
            .unwrap();

        let outcome = store.unmerge(&primary).unwrap();
        assert_eq!(outcome.restored_donors.len(), 1);

        let donor = store.snapshot(&OrderId::new("TR-1002").unwrap()).unwrap();
        assert_eq!(donor.status, OrderStatus::New);
        assert!(donor.is_available_for_merge());

        let restored = store.snapshot(&primary).unwrap();
        assert!(restored.merge_record.is_none());
        assert!(restored.response.is_none());
        assert!(restored.distance_km.is_none());
        assert_eq!(restored.status, OrderStatus::New);
    }

    #[test]
    fn unmerge_without_merge_fails() {
        let store = InMemoryOrderStore::new([order("TR-1001")]);
        let primary = OrderId::new("TR-1001").unwrap();
        assert!(matches!(
            store.unmerge(&primary),
            Err(StoreError::NotMerged { .. })
        ));
    }

    #[test]
    fn unmerge_skips_deleted_donor() {
        let store = InMemoryOrderStore::new([order("TR-1001"), order("TR-1002")]);
        let primary = OrderId::new("TR-1001").unwrap();
        store
            .commit_merge(&primary, &payload("TR-1001", &["TR-1002"]))
            .unwrap();

        // Donor vanishes from the store (archived elsewhere).
        store.lock().remove(&OrderId::new("TR-1002").unwrap());

        let outcome = store.unmerge(&primary).unwrap();
        assert!(outcome.restored_donors.is_empty());
        assert!(store.snapshot(&primary).unwrap().merge_record.is_none());
    }
}
