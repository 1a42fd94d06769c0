//! Route-point resolution: depot table first, geocoder for the rest.
//!
//! Resolution is deliberately forgiving. A point whose address cannot be
//! geocoded stays in the sequence unresolved — it is excluded from the
//! distance measurement and reported back, but it never aborts the merge
//! workflow.

use tracing::{debug, warn};

use crate::depot::DepotTable;
use crate::model::route::RouteSequence;
use crate::model::types::Location;
use crate::providers::Geocode;

// ---------------------------------------------------------------------------
// ResolutionReport
// ---------------------------------------------------------------------------

/// One point that could not be resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolutionFailure {
    /// Rank of the affected point.
    pub rank: u32,
    /// The location line that failed.
    pub location: String,
    /// Human-readable failure detail.
    pub detail: String,
}

/// Outcome of resolving a sequence.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolutionReport {
    /// How many points were resolved during this pass (depot hits and
    /// geocoder successes; points that already had coordinates are not
    /// counted).
    pub resolved: usize,
    /// Points left without coordinates, in rank order.
    pub failures: Vec<ResolutionFailure>,
}

impl ResolutionReport {
    /// Whether every point of the sequence now has coordinates.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

// ---------------------------------------------------------------------------
// resolve_points
// ---------------------------------------------------------------------------

/// Fill in coordinates for every unresolved point of `sequence`.
///
/// Named depots resolve from the local table without a network call;
/// free-form addresses go through the geocoder. The sequence ordering is
/// never touched. Failures are collected, not raised.
pub fn resolve_points(
    sequence: &mut RouteSequence,
    depots: &DepotTable,
    geocoder: &dyn Geocode,
) -> ResolutionReport {
    let mut report = ResolutionReport::default();

    for point in sequence.points_mut() {
        if point.is_resolved() {
            continue;
        }

        match &point.location {
            Location::Depot(name) => match depots.get(name) {
                Some(depot) => match depot.coordinates() {
                    Ok(coords) => {
                        point.coordinates = Some(coords);
                        report.resolved += 1;
                    }
                    Err(e) => {
                        warn!(depot = %name, error = %e, "depot has invalid coordinates");
                        report.failures.push(ResolutionFailure {
                            rank: point.rank,
                            location: name.clone(),
                            detail: format!("depot coordinates invalid: {e}"),
                        });
                    }
                },
                None => {
                    warn!(depot = %name, "unknown depot name");
                    report.failures.push(ResolutionFailure {
                        rank: point.rank,
                        location: name.clone(),
                        detail: "depot not found in the configured table".to_owned(),
                    });
                }
            },
            Location::Address(addr) => {
                let line = addr.display_line();
                match geocoder.geocode(&line) {
                    Ok(coords) => {
                        debug!(address = %line, "geocoded");
                        point.coordinates = Some(coords);
                        report.resolved += 1;
                    }
                    Err(e) => {
                        warn!(address = %line, error = %e, "geocoding failed, point stays unresolved");
                        report.failures.push(ResolutionFailure {
                            rank: point.rank,
                            location: line,
                            detail: e.to_string(),
                        });
                    }
                }
            }
        }
    }

    report
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
