//! konvoi configuration (`.konvoi.toml`).
//!
//! Typed configuration for the order-store endpoint, the two external
//! providers, artifact output, and the named-depot table. Missing fields
//! use sensible defaults; a missing file means all defaults (no error).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::depot::{Depot, DepotTable};
use crate::route::geo::DEFAULT_WINDING_FACTOR;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = ".konvoi.toml";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level konvoi configuration.
///
/// Parsed from `.konvoi.toml`. Missing fields use defaults; missing file →
/// all defaults.
#[derive(Clone, Debug, PartialEq, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct KonvoiConfig {
    /// Order-store settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Geocoding provider settings.
    #[serde(default)]
    pub geocoding: GeocodingConfig,

    /// Road-distance provider settings.
    #[serde(default)]
    pub distance: DistanceConfig,

    /// Preview artifact settings.
    #[serde(default)]
    pub artifacts: ArtifactsConfig,

    /// Named depots: fixed coordinates plus canonical address per name.
    #[serde(default)]
    pub depots: BTreeMap<String, Depot>,
}

impl KonvoiConfig {
    /// Load configuration from `path`. A missing file yields defaults.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the file exists but cannot be read or
    /// parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError {
            path: Some(path.to_path_buf()),
            message: format!("read failed: {e}"),
        })?;
        toml::from_str(&text).map_err(|e| ConfigError {
            path: Some(path.to_path_buf()),
            message: e.to_string(),
        })
    }

    /// Load from `.konvoi.toml` in the working directory.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the file exists but is invalid.
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load(Path::new(CONFIG_FILE))
    }

    /// The depot lookup table built from the config entries.
    #[must_use]
    pub fn depot_table(&self) -> DepotTable {
        DepotTable::new(self.depots.clone())
    }
}

// ---------------------------------------------------------------------------
// StoreConfig
// ---------------------------------------------------------------------------

/// Order-store endpoint settings.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Base URL of the order-store service.
    #[serde(default = "default_store_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: default_store_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

fn default_store_url() -> String {
    "http://localhost:8080".to_owned()
}

const fn default_timeout_seconds() -> u64 {
    10
}

// ---------------------------------------------------------------------------
// GeocodingConfig
// ---------------------------------------------------------------------------

/// Geocoding provider settings.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeocodingConfig {
    /// Geocoding endpoint URL.
    #[serde(default = "default_geocode_endpoint")]
    pub endpoint: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            endpoint: default_geocode_endpoint(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

fn default_geocode_endpoint() -> String {
    "http://localhost:8080/geocode".to_owned()
}

// ---------------------------------------------------------------------------
// DistanceConfig
// ---------------------------------------------------------------------------

/// Road-distance provider settings.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DistanceConfig {
    /// Road-distance endpoint URL.
    #[serde(default = "default_distance_endpoint")]
    pub endpoint: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Multiplier applied to the straight-line fallback distance.
    #[serde(default = "default_winding_factor")]
    pub winding_factor: f64,
}

impl Default for DistanceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_distance_endpoint(),
            timeout_seconds: default_timeout_seconds(),
            winding_factor: default_winding_factor(),
        }
    }
}

fn default_distance_endpoint() -> String {
    "http://localhost:8080/distance".to_owned()
}

const fn default_winding_factor() -> f64 {
    DEFAULT_WINDING_FACTOR
}

// ---------------------------------------------------------------------------
// ArtifactsConfig
// ---------------------------------------------------------------------------

/// Where preview artifacts are written.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArtifactsConfig {
    /// Artifact root directory.
    #[serde(default = "default_artifacts_dir")]
    pub dir: PathBuf,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            dir: default_artifacts_dir(),
        }
    }
}

fn default_artifacts_dir() -> PathBuf {
    PathBuf::from(".konvoi/artifacts")
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// A configuration file could not be loaded or parsed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigError {
    /// Path to the offending file, when known.
    pub path: Option<PathBuf>,
    /// Human-readable description of the problem.
    pub message: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.path {
            Some(path) => write!(
                f,
                "configuration error in '{}': {}\n  To fix: edit the config file and correct the issue.",
                path.display(),
                self.message
            ),
            None => write!(f, "configuration error: {}", self.message),
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
