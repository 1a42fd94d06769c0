//! MergeComposer: one ordered stop list out of many orders.
//!
//! Pure function over its inputs. The run always starts at the primary
//! pickup; every other stop carries a dispatcher-requested rank. Points
//! are stable-sorted by requested rank — ties resolve by emission order
//! (primary loading, donor loadings, donor unloadings, primary unloading)
//! — and then the final ranks are reassigned `1..=n`. No reserved numeric
//! bands: requested ranks only decide the sort.

use std::collections::BTreeSet;

use tracing::debug;

use crate::error::MergeError;
use crate::model::order::TransportOrder;
use crate::model::participation::RouteParticipation;
use crate::model::route::{PointKind, PointOwner, RoutePoint, RouteSequence};
use crate::model::types::Location;

/// Requested rank that sorts the primary loading point before every
/// dispatcher-assignable rank.
const PRIMARY_LOADING_KEY: u32 = 0;

/// Compose the merged route for one primary order and its donors.
///
/// `primary_unloading_rank` positions the primary's unloading stop; unset
/// means after all donor stops.
///
/// # Errors
///
/// - [`MergeError::InvalidParticipation`] if a donor selects no event, or
///   selects one without a rank.
/// - [`MergeError::RankCollision`] if one order requests the same rank
///   twice for the same event kind (a configuration bug the insertion-order
///   tie-break cannot disambiguate).
pub fn compose(
    primary: &TransportOrder,
    donors: &[(TransportOrder, RouteParticipation)],
    primary_unloading_rank: Option<u32>,
) -> Result<RouteSequence, MergeError> {
    check_participations(donors)?;

    // (requested rank, point), in emission order; the stable sort keeps
    // that order on rank ties.
    let mut emitted: Vec<(u32, RoutePoint)> = Vec::with_capacity(
        2 + donors
            .iter()
            .map(|(_, p)| p.stop_count())
            .sum::<usize>(),
    );

    emitted.push((
        PRIMARY_LOADING_KEY,
        point(
            PointKind::Loading,
            PointOwner::Primary,
            primary.location.clone(),
        ),
    ));

    let mut max_requested = PRIMARY_LOADING_KEY;

    for (order, participation) in donors {
        if participation.use_loading {
            // Presence checked in check_participations.
            let Some(rank) = participation.loading_rank else {
                continue;
            };
            max_requested = max_requested.max(rank);
            emitted.push((
                rank,
                point(
                    PointKind::Loading,
                    PointOwner::Donor(order.id.clone()),
                    order.location.clone(),
                ),
            ));
        }
    }

    for (order, participation) in donors {
        if participation.use_unloading {
            let Some(rank) = participation.unloading_rank else {
                continue;
            };
            max_requested = max_requested.max(rank);
            emitted.push((
                rank,
                point(
                    PointKind::Unloading,
                    PointOwner::Donor(order.id.clone()),
                    Location::Address(order.delivery.clone()),
                ),
            ));
        }
    }

    let primary_unloading = primary_unloading_rank.unwrap_or(max_requested.saturating_add(1));
    emitted.push((
        primary_unloading,
        point(
            PointKind::Unloading,
            PointOwner::Primary,
            Location::Address(primary.delivery.clone()),
        ),
    ));

    check_collisions(&emitted)?;

    emitted.sort_by_key(|(requested, _)| *requested);

    let points = emitted
        .into_iter()
        .enumerate()
        .map(|(idx, (_, mut p))| {
            // Final ranks are contiguous by construction.
            p.rank = u32::try_from(idx + 1).unwrap_or(u32::MAX);
            p
        })
        .collect();

    let sequence = RouteSequence::new(points)?;
    debug!(stops = sequence.len(), "route composed");
    Ok(sequence)
}

fn point(kind: PointKind, owner: PointOwner, location: Location) -> RoutePoint {
    let description = describe(kind, &owner, &location);
    RoutePoint {
        kind,
        owner,
        rank: 0, // reassigned after the sort
        location,
        coordinates: None,
        description,
    }
}

fn describe(kind: PointKind, owner: &PointOwner, location: &Location) -> String {
    let label = match kind {
        PointKind::Loading => "Loading",
        PointKind::Unloading => "Unloading",
    };
    let place = match location {
        Location::Depot(name) => format!("depot {name}"),
        Location::Address(addr) => addr.city.clone(),
    };
    match owner {
        PointOwner::Primary => format!("{label} — {place}"),
        PointOwner::Donor(id) => format!("{label} {id} — {place}"),
    }
}

fn check_participations(
    donors: &[(TransportOrder, RouteParticipation)],
) -> Result<(), MergeError> {
    for (order, participation) in donors {
        if !participation.participates() {
            return Err(MergeError::InvalidParticipation {
                order: order.id.clone(),
                detail: "neither loading nor unloading selected".to_owned(),
            });
        }
        if participation.use_loading && participation.loading_rank.is_none() {
            return Err(MergeError::InvalidParticipation {
                order: order.id.clone(),
                detail: "loading selected without a loading rank".to_owned(),
            });
        }
        if participation.use_unloading && participation.unloading_rank.is_none() {
            return Err(MergeError::InvalidParticipation {
                order: order.id.clone(),
                detail: "unloading selected without an unloading rank".to_owned(),
            });
        }
    }
    Ok(())
}

fn check_collisions(emitted: &[(u32, RoutePoint)]) -> Result<(), MergeError> {
    let mut seen = BTreeSet::new();
    for (requested, p) in emitted {
        let owner_key = match &p.owner {
            PointOwner::Primary => String::new(),
            PointOwner::Donor(id) => id.as_str().to_owned(),
        };
        if !seen.insert((*requested, p.kind, owner_key)) {
            return Err(MergeError::RankCollision {
                rank: *requested,
                kind: p.kind,
                owner: p.owner.to_string(),
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::{Address, Mpk, OrderId, OrderStatus};
    use proptest::prelude::*;

    fn order(id: &str, pickup: Location, delivery_city: &str) -> TransportOrder {
        TransportOrder {
            id: OrderId::new(id).unwrap(),
            order_number: format!("ZT/2026/{id}"),
            location: pickup,
            delivery: Address {
                city: delivery_city.to_owned(),
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

    fn primary() -> TransportOrder {
        order(
            "TR-1001",
            Location::Depot("bialystok".to_owned()),
            "Warszawa",
        )
    }

    fn lodz_pickup() -> Location {
        Location::Address(Address {
            city: "Łódź".to_owned(),
            postal_code: "90-001".to_owned(),
            street: "Piotrkowska 100".to_owned(),
        })
    }

    fn unloading_only(rank: u32) -> RouteParticipation {
        RouteParticipation {
            use_unloading: true,
            unloading_rank: Some(rank),
            ..Default::default()
        }
    }

    // -- the worked example: P (Białystok → Warszawa), D1 unloading rank 2,
    //    primary unloading rank 3 --

    #[test]
    fn example_scenario_sequence() {
        let donor = order("TR-1002", lodz_pickup(), "Warszawa");
        let seq = compose(&primary(), &[(donor, unloading_only(2))], Some(3)).unwrap();

        assert_eq!(seq.len(), 3);
        let points = seq.points();

        assert_eq!(points[0].rank, 1);
        assert_eq!(points[0].kind, PointKind::Loading);
        assert_eq!(points[0].owner, PointOwner::Primary);
        assert_eq!(points[0].location, Location::Depot("bialystok".to_owned()));

        assert_eq!(points[1].rank, 2);
        assert_eq!(points[1].kind, PointKind::Unloading);
        assert_eq!(
            points[1].owner,
            PointOwner::Donor(OrderId::new("TR-1002").unwrap())
        );

        assert_eq!(points[2].rank, 3);
        assert_eq!(points[2].kind, PointKind::Unloading);
        assert_eq!(points[2].owner, PointOwner::Primary);
    }

    // -- ordering rules --

    #[test]
    fn primary_loading_is_first_even_against_rank_one_donor() {
        let donor = order("TR-1002", lodz_pickup(), "Warszawa");
        let participation = RouteParticipation {
            use_loading: true,
            loading_rank: Some(1),
            ..Default::default()
        };
        let seq = compose(&primary(), &[(donor, participation)], None).unwrap();
        assert_eq!(seq.points()[0].owner, PointOwner::Primary);
        assert_eq!(seq.points()[0].kind, PointKind::Loading);
    }

    #[test]
    fn primary_unloading_defaults_to_last() {
        let d1 = order("TR-1002", lodz_pickup(), "Warszawa");
        let d2 = order("TR-1003", lodz_pickup(), "Kraków");
        let seq = compose(
            &primary(),
            &[(d1, unloading_only(5)), (d2, unloading_only(2))],
            None,
        )
        .unwrap();

        let last = seq.points().last().unwrap();
        assert_eq!(last.owner, PointOwner::Primary);
        assert_eq!(last.kind, PointKind::Unloading);
    }

    #[test]
    fn primary_unloading_can_sit_mid_route() {
        let d1 = order("TR-1002", lodz_pickup(), "Warszawa");
        let d2 = order("TR-1003", lodz_pickup(), "Kraków");
        // Primary unloads at rank 2, before donor TR-1003's stop at rank 4.
        let seq = compose(
            &primary(),
            &[(d1, unloading_only(3)), (d2, unloading_only(4))],
            Some(2),
        )
        .unwrap();

        let points = seq.points();
        assert_eq!(points[1].owner, PointOwner::Primary);
        assert_eq!(points[1].kind, PointKind::Unloading);
        assert_eq!(points[2].owner, PointOwner::Donor(OrderId::new("TR-1002").unwrap()));
    }

    #[test]
    fn donor_rank_ties_preserve_draft_order() {
        let d1 = order("TR-1002", lodz_pickup(), "Warszawa");
        let d2 = order("TR-1003", lodz_pickup(), "Kraków");
        let seq = compose(
            &primary(),
            &[(d1, unloading_only(2)), (d2, unloading_only(2))],
            None,
        )
        .unwrap();

        let points = seq.points();
        assert_eq!(points[1].owner, PointOwner::Donor(OrderId::new("TR-1002").unwrap()));
        assert_eq!(points[2].owner, PointOwner::Donor(OrderId::new("TR-1003").unwrap()));
    }

    #[test]
    fn donor_loading_and_unloading_both_emitted() {
        let donor = order("TR-1002", lodz_pickup(), "Radom");
        let participation = RouteParticipation {
            use_loading: true,
            use_unloading: true,
            loading_rank: Some(2),
            unloading_rank: Some(3),
            assigned_cost: None,
        };
        let seq = compose(&primary(), &[(donor, participation)], None).unwrap();

        assert_eq!(seq.len(), 4);
        assert_eq!(seq.points()[1].kind, PointKind::Loading);
        assert_eq!(seq.points()[1].location, lodz_pickup());
        assert_eq!(seq.points()[2].kind, PointKind::Unloading);
        // Donor unloading goes to the donor's own delivery address.
        match &seq.points()[2].location {
            Location::Address(addr) => assert_eq!(addr.city, "Radom"),
            other => panic!("expected address location, got {other:?}"),
        }
    }

    #[test]
    fn sequence_length_matches_participation_sum() {
        let d1 = order("TR-1002", lodz_pickup(), "Warszawa");
        let d2 = order("TR-1003", lodz_pickup(), "Kraków");
        let both = RouteParticipation {
            use_loading: true,
            use_unloading: true,
            loading_rank: Some(2),
            unloading_rank: Some(4),
            assigned_cost: None,
        };
        let seq = compose(
            &primary(),
            &[(d1, both), (d2, unloading_only(3))],
            None,
        )
        .unwrap();
        assert_eq!(seq.len(), 2 + 2 + 1);
    }

    // -- rejection --

    #[test]
    fn donor_with_no_events_rejected() {
        let donor = order("TR-1002", lodz_pickup(), "Warszawa");
        let err = compose(&primary(), &[(donor, RouteParticipation::default())], None)
            .unwrap_err();
        match err {
            MergeError::InvalidParticipation { order, detail } => {
                assert_eq!(order.as_str(), "TR-1002");
                assert!(detail.contains("neither"));
            }
            other => panic!("expected InvalidParticipation, got {other:?}"),
        }
    }

    #[test]
    fn selected_event_without_rank_rejected() {
        let donor = order("TR-1002", lodz_pickup(), "Warszawa");
        let participation = RouteParticipation {
            use_unloading: true,
            ..Default::default()
        };
        let err = compose(&primary(), &[(donor, participation)], None).unwrap_err();
        assert!(matches!(err, MergeError::InvalidParticipation { .. }));
    }

    #[test]
    fn same_rank_different_kinds_is_no_collision() {
        // One donor loading and unloading at the same rank: different
        // kinds, insertion order breaks the tie.
        let donor = order("TR-1002", lodz_pickup(), "Warszawa");
        let participation = RouteParticipation {
            use_loading: true,
            use_unloading: true,
            loading_rank: Some(2),
            unloading_rank: Some(2),
            assigned_cost: None,
        };
        let seq = compose(&primary(), &[(donor, participation)], None).unwrap();
        assert_eq!(seq.points()[1].kind, PointKind::Loading);
        assert_eq!(seq.points()[2].kind, PointKind::Unloading);
    }

    #[test]
    fn identical_rank_kind_owner_is_a_collision() {
        // Not reachable through a validated draft (duplicate donors are
        // rejected there); the composer still defends against it.
        let d1 = order("TR-1003", lodz_pickup(), "Kraków");
        let d2 = order("TR-1003", lodz_pickup(), "Kraków");
        let err = compose(
            &primary(),
            &[(d1, unloading_only(2)), (d2, unloading_only(2))],
            None,
        )
        .unwrap_err();
        match err {
            MergeError::RankCollision { rank, kind, owner } => {
                assert_eq!(rank, 2);
                assert_eq!(kind, PointKind::Unloading);
                assert_eq!(owner, "TR-1003");
            }
            other => panic!("expected RankCollision, got {other:?}"),
        }
    }

    // -- purity --

    #[test]
    fn compose_is_deterministic() {
        let donor = order("TR-1002", lodz_pickup(), "Warszawa");
        let a = compose(&primary(), &[(donor.clone(), unloading_only(2))], Some(3)).unwrap();
        let b = compose(&primary(), &[(donor, unloading_only(2))], Some(3)).unwrap();
        assert_eq!(a, b);
    }

    // -- rank totality (property) --

    proptest! {
        /// For any participation set, the composed sequence is totally
        /// ordered with contiguous ranks, exactly one primary loading and
        /// one primary unloading, and the invariant length.
        #[test]
        fn rank_totality(
            donor_specs in proptest::collection::vec(
                (any::<bool>(), any::<bool>(), 1u32..20, 1u32..20),
                1..6,
            ),
            primary_rank in proptest::option::of(1u32..25),
        ) {
            let donors: Vec<(TransportOrder, RouteParticipation)> = donor_specs
                .iter()
                .enumerate()
                .map(|(i, &(use_loading, use_unloading, lrank, urank))| {
                    let id = format!("TR-2{i:03}");
                    let participation = RouteParticipation {
                        use_loading,
                        use_unloading: use_unloading || !use_loading,
                        loading_rank: Some(lrank),
                        unloading_rank: Some(urank),
                        assigned_cost: None,
                    };
                    (order(&id, lodz_pickup(), "Warszawa"), participation)
                })
                .collect();

            let expected_len = 2 + donors
                .iter()
                .map(|(_, p)| p.stop_count())
                .sum::<usize>();

            let seq = compose(&primary(), &donors, primary_rank).unwrap();

            prop_assert_eq!(seq.len(), expected_len);
            prop_assert!(seq.validate().is_ok());

            let ranks: Vec<u32> = seq.points().iter().map(|p| p.rank).collect();
            let expected: Vec<u32> = (1..=u32::try_from(expected_len).unwrap()).collect();
            prop_assert_eq!(ranks, expected);
        }
    }
}
