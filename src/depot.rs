//! The named-depot table.
//!
//! Depots are fixed company locations referenced by name on orders.
//! Their coordinates and canonical address come from configuration — a
//! depot lookup never touches the network.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::types::{Address, Coordinates, ValidationError};

// ---------------------------------------------------------------------------
// Depot
// ---------------------------------------------------------------------------

/// One configured depot: fixed coordinates plus canonical address text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Depot {
    pub lat: f64,
    pub lng: f64,
    pub city: String,
    pub postal_code: String,
    pub street: String,
}

impl Depot {
    /// The depot's coordinates, validated.
    ///
    /// # Errors
    /// Returns an error if the configured values are out of range.
    pub fn coordinates(&self) -> Result<Coordinates, ValidationError> {
        Coordinates::new(self.lat, self.lng)
    }

    /// The depot's canonical structured address.
    #[must_use]
    pub fn address(&self) -> Address {
        Address {
            city: self.city.clone(),
            postal_code: self.postal_code.clone(),
            street: self.street.clone(),
        }
    }

    /// Canonical single-line address text.
    #[must_use]
    pub fn address_line(&self) -> String {
        self.address().display_line()
    }
}

// ---------------------------------------------------------------------------
// DepotTable
// ---------------------------------------------------------------------------

/// Lookup table from depot name to depot, case-insensitive on the name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DepotTable {
    depots: BTreeMap<String, Depot>,
}

impl DepotTable {
    /// Build a table from configured entries; names are normalized to
    /// lowercase.
    #[must_use]
    pub fn new(entries: BTreeMap<String, Depot>) -> Self {
        let depots = entries
            .into_iter()
            .map(|(name, depot)| (name.to_lowercase(), depot))
            .collect();
        Self { depots }
    }

    /// Look up a depot by name (case-insensitive).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Depot> {
        self.depots.get(&name.to_lowercase())
    }

    /// Number of configured depots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.depots.len()
    }

    /// Whether no depots are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.depots.is_empty()
    }

    /// Iterate over `(name, depot)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Depot)> {
        self.depots.iter()
    }

    /// Validate every depot's coordinates; returns the first bad entry.
    ///
    /// # Errors
    /// Returns the depot name and the coordinate error.
    pub fn validate(&self) -> Result<(), (String, ValidationError)> {
        for (name, depot) in &self.depots {
            depot
                .coordinates()
                .map_err(|e| (name.clone(), e))?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
