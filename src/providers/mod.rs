//! Outbound provider clients: geocoding and road distance.
//!
//! Both are trait seams with blocking HTTP implementations. Every request
//! carries a bounded timeout; callers absorb failures into degraded
//! results rather than propagating them.

pub mod geocoder;
pub mod matrix;

pub use geocoder::{Geocode, GeocodeError, HttpGeocoder};
pub use matrix::{DistanceError, HttpDistanceProvider, RoadDistance};
