//! RouteRenderer: turn a persisted merge record back into display forms.
//!
//! Thin adapters only — everything renders from the [`MergeRecord`]
//! without recomputation, so the stop order shown on a map link or a
//! shipment document is exactly the order the composer produced.

use serde::Serialize;

use crate::model::record::{MergeRecord, RouteStop};
use crate::model::route::PointKind;
use crate::model::types::OrderId;

/// Base of the navigable multi-waypoint link.
const MAP_DIR_BASE: &str = "https://www.google.com/maps/dir";

// ---------------------------------------------------------------------------
// Map link
// ---------------------------------------------------------------------------

/// Build a navigable multi-waypoint link for the whole run.
///
/// Stops appear in rank order; each path segment is the stop's canonical
/// address line.
#[must_use]
pub fn map_link(record: &MergeRecord) -> String {
    let mut link = String::from(MAP_DIR_BASE);
    for stop in record.stops() {
        link.push('/');
        link.push_str(&encode_segment(&stop.address));
    }
    link
}

/// Minimal path-segment encoding: spaces and URL-significant characters.
fn encode_segment(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            ' ' => out.push('+'),
            '/' => out.push_str("%2F"),
            '?' => out.push_str("%3F"),
            '#' => out.push_str("%23"),
            '&' => out.push_str("%26"),
            _ => out.push(c),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Document line items
// ---------------------------------------------------------------------------

/// One line of a shipment document (CMR attachment, dispatch sheet).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentLine {
    /// 1-based stop number.
    pub position: u32,
    /// `"Loading"` or `"Unloading"`.
    pub event: String,
    /// Which order the stop belongs to; `None` for the primary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport_id: Option<OrderId>,
    pub description: String,
    pub address: String,
}

/// Shipment-document line items, in stop order.
#[must_use]
pub fn document_lines(record: &MergeRecord) -> Vec<DocumentLine> {
    record.stops().iter().map(line_from_stop).collect()
}

fn line_from_stop(stop: &RouteStop) -> DocumentLine {
    let event = match stop.kind {
        PointKind::Loading => "Loading",
        PointKind::Unloading => "Unloading",
    };
    DocumentLine {
        position: stop.position,
        event: event.to_owned(),
        transport_id: stop.transport_id.clone(),
        description: stop.description.clone(),
        address: stop.address.clone(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::record::OriginalTransport;
    use crate::model::types::{Address, Mpk};
    use rust_decimal_macros::dec;

    fn record() -> MergeRecord {
        MergeRecord {
            merge_id: "a".repeat(64),
            primary_order_id: OrderId::new("TR-1001").unwrap(),
            original_transports: vec![OriginalTransport {
                id: OrderId::new("TR-1002").unwrap(),
                order_number: "ZT/2026/0152".to_owned(),
                mpk: Mpk::new("MPK-502").unwrap(),
                cost_assigned: Some(dec!(200.00)),
                route: "Łódź → Warszawa".to_owned(),
                responsible_person: "m.wisniewski".to_owned(),
            }],
            total_merged_cost: dec!(900.00),
            primary_remainder: dec!(700.00),
            total_distance: 193,
            degraded_distance: false,
            merged_at: 1,
            merged_by: "j.kowalska".to_owned(),
            route_sequence: vec![
                RouteStop {
                    kind: PointKind::Loading,
                    transport_id: None,
                    position: 1,
                    location: None,
                    description: "Loading — depot bialystok".to_owned(),
                    address: "Magazynowa 1, 15-001 Białystok".to_owned(),
                },
                RouteStop {
                    kind: PointKind::Unloading,
                    transport_id: Some(OrderId::new("TR-1002").unwrap()),
                    position: 2,
                    location: Some(Address {
                        city: "Warszawa".to_owned(),
                        postal_code: "01-100".to_owned(),
                        street: "Składowa 9".to_owned(),
                    }),
                    description: "Unloading TR-1002 — Warszawa".to_owned(),
                    address: "Składowa 9, 01-100 Warszawa".to_owned(),
                },
                RouteStop {
                    kind: PointKind::Unloading,
                    transport_id: None,
                    position: 3,
                    location: Some(Address {
                        city: "Warszawa".to_owned(),
                        postal_code: "00-001".to_owned(),
                        street: "Towarowa 5".to_owned(),
                    }),
                    description: "Unloading — Warszawa".to_owned(),
                    address: "Towarowa 5, 00-001 Warszawa".to_owned(),
                },
            ],
        }
    }

    // -- map link --

    #[test]
    fn map_link_lists_stops_in_rank_order() {
        let link = map_link(&record());
        assert!(link.starts_with("https://www.google.com/maps/dir/"));

        let bialystok = link.find("Magazynowa+1").unwrap();
        let skladowa = link.find("Sk\u{142}adowa+9").unwrap();
        let towarowa = link.find("Towarowa+5").unwrap();
        assert!(bialystok < skladowa && skladowa < towarowa);
    }

    #[test]
    fn map_link_encodes_reserved_characters() {
        assert_eq!(encode_segment("a b/c?d#e&f"), "a+b%2Fc%3Fd%23e%26f");
    }

    // -- document lines --

    #[test]
    fn document_lines_round_trip_the_stop_order() {
        let lines = document_lines(&record());
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines.iter().map(|l| l.position).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(lines[0].event, "Loading");
        assert!(lines[0].transport_id.is_none());
        assert_eq!(
            lines[1].transport_id,
            Some(OrderId::new("TR-1002").unwrap())
        );
        assert_eq!(lines[2].address, "Towarowa 5, 00-001 Warszawa");
    }

    #[test]
    fn document_lines_survive_record_serde() {
        let record = record();
        let json = serde_json::to_string(&record).unwrap();
        let reloaded: MergeRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(document_lines(&reloaded), document_lines(&record));
    }
}
