use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Dispatch behaviour knobs, usually read from the host's JSON config.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct DispatchConfig {
    /// Check arguments against each binding's signature before calling.
    pub validate_signatures: bool,
    /// Consult per-title workaround entries.
    pub apply_workarounds: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            validate_signatures: true,
            apply_workarounds: true,
        }
    }
}

impl DispatchConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("parse dispatch config")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("read {}", path.display()))?;
        Self::from_json(&text)
            .with_context(|| format!("load {}", path.display()))
    }
}
