//! Road-distance provider client.
//!
//! Returns the driven distance for an ordered multi-point path. Any
//! failure — transport, non-OK status, malformed payload — makes the
//! estimator fall back to the scaled straight-line estimate; it is never
//! surfaced to the dispatcher as an error.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::model::types::Coordinates;

// ---------------------------------------------------------------------------
// RoadDistance trait
// ---------------------------------------------------------------------------

/// Measure the road distance along an ordered path of 2+ waypoints.
pub trait RoadDistance: Send + Sync {
    /// Road distance in kilometers for the full path
    /// origin → intermediates → destination.
    ///
    /// # Errors
    /// Returns [`DistanceError`] on transport failure, a non-OK provider
    /// status, or fewer than 2 waypoints.
    fn road_distance_km(&self, waypoints: &[Coordinates]) -> Result<f64, DistanceError>;
}

// ---------------------------------------------------------------------------
// DistanceError
// ---------------------------------------------------------------------------

/// Why the road distance could not be measured.
#[derive(Debug, thiserror::Error)]
pub enum DistanceError {
    #[error("road-distance request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("road-distance provider returned status '{status}'")]
    Status { status: String },

    #[error("road-distance response is malformed: {detail}")]
    Malformed { detail: String },

    #[error("road distance needs at least 2 waypoints, got {count}")]
    TooFewWaypoints { count: usize },
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DistanceRequest<'a> {
    ordered_waypoints: &'a [Coordinates],
}

#[derive(Debug, Deserialize)]
struct DistanceResponse {
    status: String,
    #[serde(default)]
    rows: Vec<DistanceRow>,
}

#[derive(Debug, Deserialize)]
struct DistanceRow {
    #[serde(default)]
    elements: Vec<DistanceElement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DistanceElement {
    #[serde(default)]
    distance_meters: Option<f64>,
}

// ---------------------------------------------------------------------------
// HttpDistanceProvider
// ---------------------------------------------------------------------------

/// Blocking HTTP client for the external road-distance provider.
pub struct HttpDistanceProvider {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl HttpDistanceProvider {
    /// Build a client with a bounded request timeout.
    ///
    /// # Errors
    /// Returns [`DistanceError::Transport`] if the underlying client
    /// cannot be constructed.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, DistanceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

impl RoadDistance for HttpDistanceProvider {
    fn road_distance_km(&self, waypoints: &[Coordinates]) -> Result<f64, DistanceError> {
        if waypoints.len() < 2 {
            return Err(DistanceError::TooFewWaypoints {
                count: waypoints.len(),
            });
        }

        let response: DistanceResponse = self
            .client
            .post(&self.endpoint)
            .json(&DistanceRequest {
                ordered_waypoints: waypoints,
            })
            .send()?
            .error_for_status()?
            .json()?;

        parse_response(&response)
    }
}

fn parse_response(response: &DistanceResponse) -> Result<f64, DistanceError> {
    if response.status != "OK" {
        return Err(DistanceError::Status {
            status: response.status.clone(),
        });
    }
    let meters = response
        .rows
        .first()
        .and_then(|row| row.elements.first())
        .and_then(|element| element.distance_meters)
        .ok_or_else(|| DistanceError::Malformed {
            detail: "rows[0].elements[0].distanceMeters missing".to_owned(),
        })?;
    if !meters.is_finite() || meters < 0.0 {
        return Err(DistanceError::Malformed {
            detail: format!("distanceMeters is {meters}"),
        });
    }
    Ok(meters / 1000.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
