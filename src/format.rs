//! Output format for structured CLI data.

use anyhow::{Result, bail};
use serde::Serialize;
use std::str::FromStr;

/// Output format for structured data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain text tables — the default for humans.
    #[default]
    Text,
    /// Pretty JSON — machine-parseable.
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => bail!("Invalid format '{}'. Use: text or json", s),
        }
    }
}

impl OutputFormat {
    /// Serialize data to the requested format.
    ///
    /// # Errors
    /// Fails for the text format — callers render text themselves.
    pub fn serialize<T: Serialize>(self, data: &T) -> Result<String> {
        match self {
            Self::Json => serde_json::to_string_pretty(data)
                .map_err(|e| anyhow::anyhow!("JSON serialization failed: {}", e)),
            Self::Text => {
                bail!("Text format should not use serialize()")
            }
        }
    }
}
