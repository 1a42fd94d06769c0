//! Shared test fixtures for konvoi integration tests.
//!
//! Everything runs against the in-memory store and fake providers — no
//! network, no filesystem side effects outside temp dirs. City
//! coordinates are real so the haversine numbers are meaningful.

// Each integration test binary compiles its own copy of this module and
// uses a different subset of it.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Mutex;

use rust_decimal::Decimal;

use konvoi::depot::{Depot, DepotTable};
use konvoi::merge::MergeContext;
use konvoi::model::order::TransportOrder;
use konvoi::model::participation::{DonorSelection, MergeDraft, RouteParticipation};
use konvoi::model::types::{Address, Coordinates, Location, Mpk, OrderId, OrderStatus};
use konvoi::providers::{DistanceError, Geocode, GeocodeError, RoadDistance};
use konvoi::store::InMemoryOrderStore;

// ---------------------------------------------------------------------------
// Coordinates
// ---------------------------------------------------------------------------

pub fn bialystok() -> Coordinates {
    Coordinates::new(53.1325, 23.1688).unwrap()
}

pub fn warsaw() -> Coordinates {
    Coordinates::new(52.2297, 21.0122).unwrap()
}

pub fn lodz() -> Coordinates {
    Coordinates::new(51.7592, 19.4560).unwrap()
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

pub fn order_id(id: &str) -> OrderId {
    OrderId::new(id).unwrap()
}

/// Primary order: depot Białystok → Warszawa (Towarowa 5).
pub fn primary_order() -> TransportOrder {
    TransportOrder {
        id: order_id("TR-1001"),
        order_number: "ZT/2026/0147".to_owned(),
        location: Location::Depot("bialystok".to_owned()),
        delivery: Address {
            city: "Warszawa".to_owned(),
            postal_code: "00-001".to_owned(),
            street: "Towarowa 5".to_owned(),
        },
        mpk: Mpk::new("MPK-501").unwrap(),
        documents: vec![],
        client_name: "Alfa Sp. z o.o.".to_owned(),
        notes: String::new(),
        responsible_person: "j.kowalska".to_owned(),
        status: OrderStatus::New,
        distance_km: None,
        response: None,
        merge_record: None,
    }
}

/// Donor order: own pickup in Łódź → Warszawa (Składowa 9).
pub fn lodz_donor() -> TransportOrder {
    TransportOrder {
        id: order_id("TR-1002"),
        order_number: "ZT/2026/0152".to_owned(),
        location: Location::Address(Address {
            city: "Łódź".to_owned(),
            postal_code: "90-001".to_owned(),
            street: "Piotrkowska 100".to_owned(),
        }),
        delivery: Address {
            city: "Warszawa".to_owned(),
            postal_code: "01-100".to_owned(),
            street: "Składowa 9".to_owned(),
        },
        mpk: Mpk::new("MPK-502").unwrap(),
        documents: vec![],
        client_name: "Beta S.A.".to_owned(),
        notes: String::new(),
        responsible_person: "m.wisniewski".to_owned(),
        status: OrderStatus::New,
        distance_km: None,
        response: None,
        merge_record: None,
    }
}

// ---------------------------------------------------------------------------
// Drafts
// ---------------------------------------------------------------------------

/// The worked example: total 900 PLN, donor TR-1002 unloading at rank 2
/// for 200 PLN, primary unloading at rank 3.
pub fn example_draft() -> MergeDraft {
    MergeDraft {
        primary: order_id("TR-1001"),
        donors: vec![DonorSelection {
            order: order_id("TR-1002"),
            participation: RouteParticipation {
                use_loading: false,
                use_unloading: true,
                loading_rank: None,
                unloading_rank: Some(2),
                assigned_cost: Some(Decimal::new(20000, 2)),
            },
        }],
        total_price: Decimal::new(90000, 2),
        driver: "A. Nowak".to_owned(),
        vehicle: "WB 12345".to_owned(),
        carrier: None,
        primary_unloading_rank: Some(3),
        admin_notes: String::new(),
        merged_by: "j.kowalska".to_owned(),
    }
}

// ---------------------------------------------------------------------------
// Fake providers
// ---------------------------------------------------------------------------

/// Geocoder fake: resolves known address lines, fails everything else
/// with a non-OK status.
pub struct FakeGeocoder {
    known: BTreeMap<String, Coordinates>,
    calls: Mutex<Vec<String>>,
}

impl FakeGeocoder {
    pub fn new(known: BTreeMap<String, Coordinates>) -> Self {
        Self {
            known,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// All the address lines the standard fixtures use.
    pub fn with_standard_addresses() -> Self {
        let mut known = BTreeMap::new();
        known.insert("Towarowa 5, 00-001 Warszawa".to_owned(), warsaw());
        known.insert("Składowa 9, 01-100 Warszawa".to_owned(), warsaw());
        known.insert("Piotrkowska 100, 90-001 Łódź".to_owned(), lodz());
        Self::new(known)
    }

    /// Drop one address so it fails to resolve.
    pub fn without(mut self, address_line: &str) -> Self {
        self.known.remove(address_line);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Geocode for FakeGeocoder {
    fn geocode(&self, address_text: &str) -> Result<Coordinates, GeocodeError> {
        self.calls.lock().unwrap().push(address_text.to_owned());
        self.known
            .get(address_text)
            .copied()
            .ok_or_else(|| GeocodeError::Status {
                status: "ZERO_RESULTS".to_owned(),
                address: address_text.to_owned(),
            })
    }
}

/// Road-distance fake: a fixed answer or provider failure; records the
/// waypoint counts it was called with.
pub struct FakeDistanceProvider {
    answer: Option<f64>,
    calls: Mutex<Vec<Vec<Coordinates>>>,
}

impl FakeDistanceProvider {
    pub fn answering(km: f64) -> Self {
        Self {
            answer: Some(km),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            answer: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Vec<Coordinates>> {
        self.calls.lock().unwrap().clone()
    }
}

impl RoadDistance for FakeDistanceProvider {
    fn road_distance_km(&self, waypoints: &[Coordinates]) -> Result<f64, DistanceError> {
        self.calls.lock().unwrap().push(waypoints.to_vec());
        self.answer.ok_or(DistanceError::Status {
            status: "UNAVAILABLE".to_owned(),
        })
    }
}

// ---------------------------------------------------------------------------
// Fixture
// ---------------------------------------------------------------------------

/// One fully wired engine context over the in-memory store.
pub struct Fixture {
    pub store: InMemoryOrderStore,
    pub depots: DepotTable,
    pub geocoder: FakeGeocoder,
    pub distance: FakeDistanceProvider,
}

impl Fixture {
    /// Standard setup: primary + Łódź donor seeded, depot table with
    /// Białystok, all fixture addresses geocodable, road provider
    /// answering 193 km.
    pub fn standard() -> Self {
        Self {
            store: InMemoryOrderStore::new([primary_order(), lodz_donor()]),
            depots: depot_table(),
            geocoder: FakeGeocoder::with_standard_addresses(),
            distance: FakeDistanceProvider::answering(193.0),
        }
    }

    pub fn ctx(&self) -> MergeContext<'_> {
        MergeContext {
            store: &self.store,
            depots: &self.depots,
            geocoder: &self.geocoder,
            distance_provider: &self.distance,
            winding_factor: 1.3,
        }
    }
}

pub fn depot_table() -> DepotTable {
    let mut entries = BTreeMap::new();
    entries.insert(
        "bialystok".to_owned(),
        Depot {
            lat: 53.1325,
            lng: 23.1688,
            city: "Białystok".to_owned(),
            postal_code: "15-001".to_owned(),
            street: "Magazynowa 1".to_owned(),
        },
    );
    DepotTable::new(entries)
}
