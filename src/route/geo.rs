//! Great-circle math for the straight-line distance fallback.

use crate::model::types::Coordinates;

/// Mean Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Road-winding factor applied to straight-line distances when the road
/// provider is unavailable. Empirical for the regional road network.
pub const DEFAULT_WINDING_FACTOR: f64 = 1.3;

/// Great-circle (haversine) distance between two points, in kilometers.
#[must_use]
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlng = (b.lng - a.lng).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Straight-line estimate scaled by the road-winding factor.
#[must_use]
pub fn winding_estimate_km(a: Coordinates, b: Coordinates, winding_factor: f64) -> f64 {
    haversine_km(a, b) * winding_factor
}

/// Round a distance to the nearest whole kilometer.
///
/// Rounding happens only at the point of return — intermediate math stays
/// in full precision.
#[must_use]
pub fn round_km(km: f64) -> u32 {
    if !km.is_finite() || km <= 0.0 {
        return 0;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    {
        km.round() as u32
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
