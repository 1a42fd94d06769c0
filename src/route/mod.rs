//! Route resolution and distance measurement.
//!
//! [`resolve_and_measure`] is the one entry point the merge pipeline uses:
//! it resolves coordinates for every stop (depot table, then geocoder) and
//! measures the run (road provider, then straight-line fallback). Both
//! halves degrade instead of failing — the result always carries a
//! best-effort distance plus a `degraded` flag for the UI warning.

pub mod distance;
pub mod geo;
pub mod resolve;

pub use distance::{DistanceEstimator, DistanceSource, MeasuredDistance};
pub use resolve::{ResolutionFailure, ResolutionReport, resolve_points};

use crate::depot::DepotTable;
use crate::model::route::RouteSequence;
use crate::providers::{Geocode, RoadDistance};

/// A sequence with coordinates filled in and its measured distance.
#[derive(Clone, Debug)]
pub struct Measured {
    /// The sequence, ordering untouched, coordinates resolved where
    /// possible.
    pub sequence: RouteSequence,
    /// The measured (or fallback) distance.
    pub distance: MeasuredDistance,
    /// What resolution achieved and what it could not.
    pub resolution: ResolutionReport,
}

impl Measured {
    /// Whether anything along the way had to degrade.
    #[must_use]
    pub const fn degraded(&self) -> bool {
        self.distance.degraded
    }
}

/// Resolve all stops of `sequence` and measure the run.
///
/// Resolution order is irrelevant to the result: the final stop ordering
/// is fixed by rank before this function is called, and only coordinate
/// fields are written here.
#[must_use]
pub fn resolve_and_measure(
    mut sequence: RouteSequence,
    depots: &DepotTable,
    geocoder: &dyn Geocode,
    provider: &dyn RoadDistance,
    winding_factor: f64,
) -> Measured {
    let resolution = resolve_points(&mut sequence, depots, geocoder);
    let distance = DistanceEstimator::new(provider, winding_factor).measure(&sequence);
    Measured {
        sequence,
        distance,
        resolution,
    }
}
