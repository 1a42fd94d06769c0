//! Core domain types for konvoi.
//!
//! Foundation types used throughout the engine: order identifiers,
//! cost-center codes, geographic coordinates, addresses, and the order
//! lifecycle status.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// OrderId
// ---------------------------------------------------------------------------

/// A validated transport-order identifier.
///
/// Order ids are uppercase alphanumeric with hyphens, 1–32 characters.
/// Examples: `TR-1024`, `FRT-2026-0017`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderId(String);

impl OrderId {
    /// The maximum length of an order id.
    pub const MAX_LEN: usize = 32;

    /// Create a new `OrderId` from a string, validating format.
    ///
    /// # Errors
    /// Returns an error if the id is empty, too long, or contains invalid
    /// characters.
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        Self::validate(s)?;
        Ok(Self(s.to_owned()))
    }

    /// Return the order id as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(s: &str) -> Result<(), ValidationError> {
        if s.is_empty() {
            return Err(ValidationError {
                kind: ErrorKind::OrderId,
                value: s.to_owned(),
                reason: "order id must not be empty".to_owned(),
            });
        }
        if s.len() > Self::MAX_LEN {
            return Err(ValidationError {
                kind: ErrorKind::OrderId,
                value: s.to_owned(),
                reason: format!(
                    "order id must be at most {} characters, got {}",
                    Self::MAX_LEN,
                    s.len()
                ),
            });
        }
        if s.starts_with('-') || s.ends_with('-') {
            return Err(ValidationError {
                kind: ErrorKind::OrderId,
                value: s.to_owned(),
                reason: "order id must not start or end with a hyphen".to_owned(),
            });
        }
        if !s
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(ValidationError {
                kind: ErrorKind::OrderId,
                value: s.to_owned(),
                reason: "order id must contain only uppercase letters (A-Z), digits (0-9), and hyphens (-)"
                    .to_owned(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for OrderId {
    type Err = ValidationError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for OrderId {
    type Error = ValidationError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::validate(&s)?;
        Ok(Self(s))
    }
}

impl From<OrderId> for String {
    fn from(id: OrderId) -> Self {
        id.0
    }
}

// ---------------------------------------------------------------------------
// Mpk
// ---------------------------------------------------------------------------

/// A cost-center code (MPK) attached to an order for accounting.
///
/// Non-empty, at most 16 characters, no surrounding whitespace.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Mpk(String);

impl Mpk {
    /// The maximum length of a cost-center code.
    pub const MAX_LEN: usize = 16;

    /// Create a new `Mpk` from a string, validating format.
    ///
    /// # Errors
    /// Returns an error if the code is empty, too long, or padded with
    /// whitespace.
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        Self::validate(s)?;
        Ok(Self(s.to_owned()))
    }

    /// Return the code as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(s: &str) -> Result<(), ValidationError> {
        if s.is_empty() {
            return Err(ValidationError {
                kind: ErrorKind::Mpk,
                value: s.to_owned(),
                reason: "cost-center code must not be empty".to_owned(),
            });
        }
        if s.len() > Self::MAX_LEN {
            return Err(ValidationError {
                kind: ErrorKind::Mpk,
                value: s.to_owned(),
                reason: format!(
                    "cost-center code must be at most {} characters, got {}",
                    Self::MAX_LEN,
                    s.len()
                ),
            });
        }
        if s.trim() != s {
            return Err(ValidationError {
                kind: ErrorKind::Mpk,
                value: s.to_owned(),
                reason: "cost-center code must not have surrounding whitespace".to_owned(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Mpk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Mpk {
    type Err = ValidationError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Mpk {
    type Error = ValidationError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::validate(&s)?;
        Ok(Self(s))
    }
}

impl From<Mpk> for String {
    fn from(mpk: Mpk) -> Self {
        mpk.0
    }
}

// ---------------------------------------------------------------------------
// Coordinates
// ---------------------------------------------------------------------------

/// A geographic point: latitude and longitude in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in decimal degrees, −90…90.
    pub lat: f64,
    /// Longitude in decimal degrees, −180…180.
    pub lng: f64,
}

impl Coordinates {
    /// Create validated coordinates.
    ///
    /// # Errors
    /// Returns an error if either component is outside its valid range or
    /// not finite.
    pub fn new(lat: f64, lng: f64) -> Result<Self, ValidationError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(ValidationError {
                kind: ErrorKind::Coordinates,
                value: lat.to_string(),
                reason: "latitude must be a finite value in -90..=90".to_owned(),
            });
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(ValidationError {
                kind: ErrorKind::Coordinates,
                value: lng.to_string(),
                reason: "longitude must be a finite value in -180..=180".to_owned(),
            });
        }
        Ok(Self { lat, lng })
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.lat, self.lng)
    }
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A free-form pickup or delivery address on an order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub city: String,
    pub postal_code: String,
    pub street: String,
}

impl Address {
    /// Render the address as a single geocodable line:
    /// `"street, postal_code city"`.
    #[must_use]
    pub fn display_line(&self) -> String {
        format!("{}, {} {}", self.street, self.postal_code, self.city)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_line())
    }
}

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

/// Where an order's goods are picked up or delivered: either a named depot
/// (resolved from the local depot table, no network call) or a free-form
/// address (resolved through the external geocoder).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Location {
    /// A named depot; the name keys into the configured depot table.
    Depot(String),
    /// An own-pickup or delivery address.
    Address(Address),
}

impl Location {
    /// Human-readable line for this location (depot name or address line).
    #[must_use]
    pub fn display_line(&self) -> String {
        match self {
            Self::Depot(name) => name.clone(),
            Self::Address(addr) => addr.display_line(),
        }
    }

    /// The structured address, if this location carries one.
    #[must_use]
    pub const fn address(&self) -> Option<&Address> {
        match self {
            Self::Depot(_) => None,
            Self::Address(addr) => Some(addr),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_line())
    }
}

// ---------------------------------------------------------------------------
// OrderStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of a transport order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    /// Freshly created, unanswered, available to merge.
    #[default]
    New,
    /// Absorbed into a merge as a donor; excluded from the active worklist.
    MergedDonor,
    /// Delivered and archived.
    Completed,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::New => write!(f, "new"),
            Self::MergedDonor => write!(f, "merged-donor"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

// ---------------------------------------------------------------------------
// ValidationError
// ---------------------------------------------------------------------------

/// Which kind of value failed validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    OrderId,
    Mpk,
    Coordinates,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OrderId => write!(f, "order id"),
            Self::Mpk => write!(f, "cost-center code"),
            Self::Coordinates => write!(f, "coordinates"),
        }
    }
}

/// A value failed domain validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationError {
    /// Which kind of value was rejected.
    pub kind: ErrorKind,
    /// The rejected input.
    pub value: String,
    /// Why it was rejected.
    pub reason: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {} '{}': {}", self.kind, self.value, self.reason)
    }
}

impl std::error::Error for ValidationError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
