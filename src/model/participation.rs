//! Per-donor merge configuration and the immutable merge draft.
//!
//! The dispatcher's in-progress selections live in a [`MergeDraft`]: a
//! plain value object passed into the engine functions. Previews and
//! commits are pure functions of a draft plus the fetched orders, so
//! abandoning a draft has no side effect and editing one never leaves
//! stale derived state behind.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::model::types::OrderId;

// ---------------------------------------------------------------------------
// RouteParticipation
// ---------------------------------------------------------------------------

/// Which of a donor's events join the merged run, and where.
///
/// A donor with neither flag set is an invalid configuration — the
/// composer rejects it instead of silently dropping the donor.
///
/// No `deny_unknown_fields` here: this struct is flattened into
/// [`DonorSelection`], and serde does not support the combination.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteParticipation {
    /// Include the donor's loading stop.
    #[serde(default)]
    pub use_loading: bool,
    /// Include the donor's unloading stop.
    #[serde(default)]
    pub use_unloading: bool,
    /// Requested position for the loading stop; required when
    /// `use_loading` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loading_rank: Option<u32>,
    /// Requested position for the unloading stop; required when
    /// `use_unloading` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unloading_rank: Option<u32>,
    /// The slice of the total price assigned to this donor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_cost: Option<Decimal>,
}

impl RouteParticipation {
    /// Whether the donor contributes at least one stop.
    #[must_use]
    pub const fn participates(&self) -> bool {
        self.use_loading || self.use_unloading
    }

    /// Number of stops this participation contributes.
    #[must_use]
    pub fn stop_count(&self) -> usize {
        usize::from(self.use_loading) + usize::from(self.use_unloading)
    }
}

// ---------------------------------------------------------------------------
// DonorSelection
// ---------------------------------------------------------------------------

/// One donor order plus its participation configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DonorSelection {
    /// The donor order id.
    pub order: OrderId,
    #[serde(flatten)]
    pub participation: RouteParticipation,
}

// ---------------------------------------------------------------------------
// MergeDraft
// ---------------------------------------------------------------------------

/// The dispatcher's complete merge configuration, loadable from a TOML
/// file for the CLI or built directly in code.
///
/// ```toml
/// primary = "TR-1001"
/// total_price = "900.00"
/// driver = "A. Nowak"
/// vehicle = "WB 12345"
/// primary_unloading_rank = 3
/// merged_by = "j.kowalska"
///
/// [[donors]]
/// order = "TR-1002"
/// use_unloading = true
/// unloading_rank = 2
/// assigned_cost = "200.00"
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MergeDraft {
    /// The order that survives the merge and carries the record.
    pub primary: OrderId,
    /// Donor orders absorbed into the run.
    pub donors: Vec<DonorSelection>,
    /// The single negotiated price for the whole run.
    pub total_price: Decimal,
    pub driver: String,
    pub vehicle: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrier: Option<String>,
    /// Requested position of the primary unloading stop; unset means
    /// "after all others".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_unloading_rank: Option<u32>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub admin_notes: String,
    /// The dispatcher committing the merge.
    pub merged_by: String,
}

impl MergeDraft {
    /// Parse a draft from TOML text.
    ///
    /// # Errors
    /// Returns a [`DraftError`] on syntax errors or structural problems
    /// (no donors, duplicate donors, primary listed as its own donor).
    pub fn from_toml_str(text: &str) -> Result<Self, DraftError> {
        let draft: Self = toml::from_str(text).map_err(|e| DraftError::Parse(e.to_string()))?;
        draft.check_structure()?;
        Ok(draft)
    }

    /// Load a draft from a TOML file.
    ///
    /// # Errors
    /// Returns a [`DraftError`] if the file cannot be read or parsed.
    pub fn load(path: &std::path::Path) -> Result<Self, DraftError> {
        let text = std::fs::read_to_string(path).map_err(|e| DraftError::Io {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
        Self::from_toml_str(&text)
    }

    /// Donor ids in draft order.
    #[must_use]
    pub fn donor_ids(&self) -> Vec<&OrderId> {
        self.donors.iter().map(|d| &d.order).collect()
    }

    /// Total assigned donor cost (unassigned donors count as zero).
    #[must_use]
    pub fn assigned_total(&self) -> Decimal {
        self.donors
            .iter()
            .filter_map(|d| d.participation.assigned_cost)
            .sum()
    }

    fn check_structure(&self) -> Result<(), DraftError> {
        if self.donors.is_empty() {
            return Err(DraftError::NoDonors);
        }
        for donor in &self.donors {
            if donor.order == self.primary {
                return Err(DraftError::PrimaryAsDonor {
                    order: self.primary.clone(),
                });
            }
        }
        let mut seen = std::collections::BTreeSet::new();
        for donor in &self.donors {
            if !seen.insert(&donor.order) {
                return Err(DraftError::DuplicateDonor {
                    order: donor.order.clone(),
                });
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// DraftError
// ---------------------------------------------------------------------------

/// A merge draft could not be loaded or is structurally unusable.
#[derive(Clone, Debug, PartialEq)]
pub enum DraftError {
    /// The draft file could not be read.
    Io {
        path: std::path::PathBuf,
        detail: String,
    },
    /// The draft text is not valid TOML for a draft.
    Parse(String),
    /// A merge needs at least one donor.
    NoDonors,
    /// The primary order cannot also be a donor.
    PrimaryAsDonor { order: OrderId },
    /// The same donor is listed twice.
    DuplicateDonor { order: OrderId },
}

impl std::fmt::Display for DraftError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, detail } => {
                write!(f, "cannot read draft '{}': {detail}", path.display())
            }
            Self::Parse(detail) => write!(f, "draft parse error: {detail}"),
            Self::NoDonors => write!(
                f,
                "draft has no donors.\n  To fix: add at least one [[donors]] entry."
            ),
            Self::PrimaryAsDonor { order } => write!(
                f,
                "order '{order}' is both the primary and a donor.\n  To fix: remove it from [[donors]]."
            ),
            Self::DuplicateDonor { order } => write!(
                f,
                "donor '{order}' is listed more than once.\n  To fix: keep a single [[donors]] entry per order."
            ),
        }
    }
}

impl std::error::Error for DraftError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
