//! Merge preview types and artifact serialization.
//!
//! A preview describes exactly what a commit *would* persist without
//! touching the store: the composed stop list, the measured distance with
//! its degradation flag, and the cost breakdown. Previews are derived
//! fresh from the draft on every call and are safe to discard.
//!
//! # Artifacts
//!
//! Previews are written via atomic rename (write-to-temp + fsync + rename)
//! to `<artifacts>/merge/<merge_id>/preview.json`. They are disposable and
//! regenerable — running preview again on the same draft produces the same
//! output.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::model::record::RouteStop;
use crate::model::types::OrderId;
use crate::route::DistanceSource;

// ---------------------------------------------------------------------------
// PreviewWarning
// ---------------------------------------------------------------------------

/// A non-fatal problem the dispatcher should see before committing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewWarning {
    /// Rank of the affected stop.
    pub rank: u32,
    /// The location line involved.
    pub location: String,
    /// What went wrong (e.g. a geocoding failure).
    pub detail: String,
}

// ---------------------------------------------------------------------------
// MergePreview
// ---------------------------------------------------------------------------

/// The derived, discard-safe view of an in-progress merge draft.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergePreview {
    /// Stable identifier over the draft inputs.
    pub merge_id: String,
    pub primary: OrderId,
    /// Donor ids in draft order.
    pub donors: Vec<OrderId>,
    /// The composed stop list, serialized exactly as it would be persisted.
    pub route_sequence: Vec<RouteStop>,
    /// Whole-kilometer distance for the run.
    pub total_distance_km: u32,
    /// Set when the distance is a fallback value or stops stayed
    /// unresolved.
    pub degraded: bool,
    /// `"road-provider"`, `"straight-line-fallback"`, or `"unmeasurable"`.
    pub distance_source: String,
    pub total_price: Decimal,
    pub per_donor: BTreeMap<OrderId, Decimal>,
    pub primary_remainder: Decimal,
    pub over_allocated: bool,
    pub price_per_km: Decimal,
    /// Stops that could not be resolved, with details.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<PreviewWarning>,
}

/// Stable artifact label for a distance source.
#[must_use]
pub fn distance_source_label(source: DistanceSource) -> String {
    match source {
        DistanceSource::RoadProvider => "road-provider",
        DistanceSource::StraightLineFallback => "straight-line-fallback",
        DistanceSource::Unmeasurable => "unmeasurable",
    }
    .to_owned()
}

// ---------------------------------------------------------------------------
// Artifact writing
// ---------------------------------------------------------------------------

/// Error type for preview artifact operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PreviewArtifactError {
    /// I/O error.
    Io(String),
    /// Serialization error.
    Serialize(String),
}

impl std::fmt::Display for PreviewArtifactError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "preview artifact I/O error: {msg}"),
            Self::Serialize(msg) => write!(f, "preview artifact serialize error: {msg}"),
        }
    }
}

impl std::error::Error for PreviewArtifactError {}

/// Write the preview to `<artifacts_dir>/merge/<merge_id>/preview.json`.
///
/// The write is atomic (write-to-temp + fsync + rename). Returns the path
/// to the written artifact.
///
/// # Errors
///
/// Returns [`PreviewArtifactError`] on I/O or serialization failure.
pub fn write_preview_artifact(
    artifacts_dir: &Path,
    preview: &MergePreview,
) -> Result<PathBuf, PreviewArtifactError> {
    let artifact_dir = artifacts_dir.join("merge").join(&preview.merge_id);

    fs::create_dir_all(&artifact_dir).map_err(|e| {
        PreviewArtifactError::Io(format!("create dir {}: {e}", artifact_dir.display()))
    })?;

    let final_path = artifact_dir.join("preview.json");
    let tmp_path = artifact_dir.join(".preview.json.tmp");

    let json = serde_json::to_string_pretty(preview)
        .map_err(|e| PreviewArtifactError::Serialize(format!("{e}")))?;

    let mut file = fs::File::create(&tmp_path)
        .map_err(|e| PreviewArtifactError::Io(format!("create {}: {e}", tmp_path.display())))?;
    file.write_all(json.as_bytes())
        .map_err(|e| PreviewArtifactError::Io(format!("write {}: {e}", tmp_path.display())))?;
    file.sync_all()
        .map_err(|e| PreviewArtifactError::Io(format!("fsync {}: {e}", tmp_path.display())))?;
    drop(file);

    fs::rename(&tmp_path, &final_path).map_err(|e| {
        PreviewArtifactError::Io(format!(
            "rename {} → {}: {e}",
            tmp_path.display(),
            final_path.display()
        ))
    })?;

    Ok(final_path)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
