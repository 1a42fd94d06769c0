//! Geocoding provider client.
//!
//! Resolves free-text addresses to coordinates. The engine treats every
//! failure here — transport error, non-OK status, garbage coordinates —
//! as a recoverable resolution failure: the affected route point simply
//! stays unresolved.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::model::types::{Coordinates, ValidationError};

// ---------------------------------------------------------------------------
// Geocode trait
// ---------------------------------------------------------------------------

/// Resolve a free-text address to coordinates.
///
/// Implementations must bound their own latency (the HTTP client uses the
/// configured request timeout) — callers never wait indefinitely.
pub trait Geocode: Send + Sync {
    /// Resolve one address line.
    ///
    /// # Errors
    /// Returns [`GeocodeError`] on transport failure or a non-OK provider
    /// status.
    fn geocode(&self, address_text: &str) -> Result<Coordinates, GeocodeError>;
}

// ---------------------------------------------------------------------------
// GeocodeError
// ---------------------------------------------------------------------------

/// Why an address could not be resolved.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("geocoding request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("geocoder returned status '{status}' for '{address}'")]
    Status { status: String, address: String },

    #[error("geocoder response for '{address}' is missing coordinates")]
    MissingCoordinates { address: String },

    #[error("geocoder returned out-of-range coordinates: {0}")]
    InvalidCoordinates(#[from] ValidationError),
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeocodeRequest<'a> {
    address_text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lng: Option<f64>,
}

// ---------------------------------------------------------------------------
// HttpGeocoder
// ---------------------------------------------------------------------------

/// Blocking HTTP client for the external geocoding provider.
pub struct HttpGeocoder {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl HttpGeocoder {
    /// Build a client with a bounded request timeout.
    ///
    /// # Errors
    /// Returns [`GeocodeError::Transport`] if the underlying client cannot
    /// be constructed.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, GeocodeError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

impl Geocode for HttpGeocoder {
    fn geocode(&self, address_text: &str) -> Result<Coordinates, GeocodeError> {
        let response: GeocodeResponse = self
            .client
            .post(&self.endpoint)
            .json(&GeocodeRequest { address_text })
            .send()?
            .error_for_status()?
            .json()?;

        parse_response(address_text, response)
    }
}

fn parse_response(address: &str, response: GeocodeResponse) -> Result<Coordinates, GeocodeError> {
    if response.status != "OK" {
        return Err(GeocodeError::Status {
            status: response.status,
            address: address.to_owned(),
        });
    }
    let (Some(lat), Some(lng)) = (response.lat, response.lng) else {
        return Err(GeocodeError::MissingCoordinates {
            address: address.to_owned(),
        });
    };
    Ok(Coordinates::new(lat, lng)?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- wire shapes --

    #[test]
    fn request_uses_camel_case_key() {
        let req = GeocodeRequest {
            address_text: "Towarowa 5, 00-001 Warszawa",
        };
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, "{\"addressText\":\"Towarowa 5, 00-001 Warszawa\"}");
    }

    #[test]
    fn ok_response_parses_to_coordinates() {
        let response: GeocodeResponse =
            serde_json::from_str(r#"{"status":"OK","lat":52.2297,"lng":21.0122}"#).unwrap();
        let coords = parse_response("x", response).unwrap();
        assert!((coords.lat - 52.2297).abs() < 1e-9);
    }

    // -- failure classification --

    #[test]
    fn non_ok_status_is_resolution_failure() {
        let response: GeocodeResponse =
            serde_json::from_str(r#"{"status":"ZERO_RESULTS"}"#).unwrap();
        let err = parse_response("Nigdzie 1", response).unwrap_err();
        match err {
            GeocodeError::Status { status, address } => {
                assert_eq!(status, "ZERO_RESULTS");
                assert_eq!(address, "Nigdzie 1");
            }
            other => panic!("expected Status, got {other:?}"),
        }
    }

    #[test]
    fn ok_without_coordinates_is_failure() {
        let response: GeocodeResponse = serde_json::from_str(r#"{"status":"OK"}"#).unwrap();
        assert!(matches!(
            parse_response("x", response),
            Err(GeocodeError::MissingCoordinates { .. })
        ));
    }

    #[test]
    fn out_of_range_coordinates_rejected() {
        let response: GeocodeResponse =
            serde_json::from_str(r#"{"status":"OK","lat":95.0,"lng":0.0}"#).unwrap();
        assert!(matches!(
            parse_response("x", response),
            Err(GeocodeError::InvalidCoordinates(_))
        ));
    }

    #[test]
    fn error_display_names_the_address() {
        let err = GeocodeError::Status {
            status: "DENIED".to_owned(),
            address: "Towarowa 5".to_owned(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("DENIED"));
        assert!(msg.contains("Towarowa 5"));
    }
}
