//! Distance estimation with a deterministic fallback.
//!
//! The estimator asks the road-distance provider for the full multi-point
//! path. When that fails for any reason, it degrades to the great-circle
//! distance between the first and last resolved stops scaled by the
//! road-winding factor — a best-effort number, clearly flagged. The
//! estimator never raises: a merge preview always gets a distance.

use tracing::{debug, warn};

use crate::model::route::RouteSequence;
use crate::providers::RoadDistance;
use crate::route::geo;

// ---------------------------------------------------------------------------
// MeasuredDistance
// ---------------------------------------------------------------------------

/// How a distance value was obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DistanceSource {
    /// The road-distance provider answered for the full path.
    RoadProvider,
    /// Straight-line estimate between first and last resolved stops,
    /// scaled by the winding factor.
    StraightLineFallback,
    /// Fewer than 2 resolved stops — nothing to measure.
    Unmeasurable,
}

/// A measured route distance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MeasuredDistance {
    /// Total distance rounded to the nearest whole kilometer.
    pub total_km: u32,
    /// Set when the value did not come from the road provider over a
    /// fully resolved sequence.
    pub degraded: bool,
    /// Where the number came from.
    pub source: DistanceSource,
}

// ---------------------------------------------------------------------------
// DistanceEstimator
// ---------------------------------------------------------------------------

/// Measures a composed sequence using the road provider, with the
/// straight-line fallback.
pub struct DistanceEstimator<'a> {
    provider: &'a dyn RoadDistance,
    winding_factor: f64,
}

impl<'a> DistanceEstimator<'a> {
    /// Create an estimator around a provider.
    #[must_use]
    pub const fn new(provider: &'a dyn RoadDistance, winding_factor: f64) -> Self {
        Self {
            provider,
            winding_factor,
        }
    }

    /// Measure the sequence.
    ///
    /// Unresolved points are excluded from the provider call; their
    /// presence alone marks the result degraded. Rounding to whole
    /// kilometers happens here, at the point of return.
    #[must_use]
    pub fn measure(&self, sequence: &RouteSequence) -> MeasuredDistance {
        let waypoints = sequence.resolved_waypoints();
        let has_unresolved = waypoints.len() < sequence.len();

        if waypoints.len() < 2 {
            warn!(
                resolved = waypoints.len(),
                total = sequence.len(),
                "not enough resolved stops to measure a distance"
            );
            return MeasuredDistance {
                total_km: 0,
                degraded: true,
                source: DistanceSource::Unmeasurable,
            };
        }

        match self.provider.road_distance_km(&waypoints) {
            Ok(km) => {
                debug!(km, stops = waypoints.len(), "road distance measured");
                MeasuredDistance {
                    total_km: geo::round_km(km),
                    degraded: has_unresolved,
                    source: DistanceSource::RoadProvider,
                }
            }
            Err(e) => {
                warn!(error = %e, "road-distance provider unavailable, falling back to straight line");
                // Deliberately origin→destination only, not leg-by-leg:
                // the fallback mirrors what a dispatcher would sanity-check
                // on a map.
                let first = waypoints[0];
                let last = waypoints[waypoints.len() - 1];
                let km = geo::winding_estimate_km(first, last, self.winding_factor);
                MeasuredDistance {
                    total_km: geo::round_km(km),
                    degraded: true,
                    source: DistanceSource::StraightLineFallback,
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
