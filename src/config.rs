// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Reader configuration: default tessellation and unknown-key handling

use crate::error::ShapeError;
use crate::primitive::DEFAULT_DIV;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::warn;

/// File picked up by [`ShapeConfig::load`] from the working directory.
pub const CONFIG_FILE: &str = "shapekit.toml";

/// What a reader does with a key the primitive does not recognize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownKeyPolicy {
    /// Fail with `ShapeError::UnknownKey`
    #[default]
    Reject,
    /// Log a warning and continue
    Skip,
}

impl FromStr for UnknownKeyPolicy {
    type Err = ShapeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "skip" => Ok(Self::Skip),
            other => Err(ShapeError::Config(format!(
                "unknown key policy '{other}' (expected 'reject' or 'skip')"
            ))),
        }
    }
}

/// Reader configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeConfig {
    /// Division substituted when a document omits `div` or gives 0
    pub default_div: u32,
    pub unknown_keys: UnknownKeyPolicy,
}

impl Default for ShapeConfig {
    fn default() -> Self {
        Self {
            default_div: DEFAULT_DIV,
            unknown_keys: UnknownKeyPolicy::Reject,
        }
    }
}

impl ShapeConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        let config: ShapeConfig =
            toml::from_str(content).map_err(|e| ShapeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config = Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Load `shapekit.toml` if present, then apply environment variable overrides
    pub fn load() -> Result<Self> {
        let mut config = if PathBuf::from(CONFIG_FILE).exists() {
            Self::from_file(CONFIG_FILE)?
        } else {
            Self::default()
        };
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Apply `SHAPEKIT_DEFAULT_DIV` and `SHAPEKIT_UNKNOWN_KEYS` as returned by `lookup`.
    ///
    /// Unusable values are logged and ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(div) = lookup("SHAPEKIT_DEFAULT_DIV") {
            match div.trim().parse::<u32>() {
                Ok(div) if div >= 3 => self.default_div = div,
                _ => warn!(value = %div, "ignoring invalid SHAPEKIT_DEFAULT_DIV"),
            }
        }

        if let Some(policy) = lookup("SHAPEKIT_UNKNOWN_KEYS") {
            match policy.parse() {
                Ok(policy) => self.unknown_keys = policy,
                Err(e) => warn!(error = %e, "ignoring invalid SHAPEKIT_UNKNOWN_KEYS"),
            }
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.default_div < 3 {
            return Err(ShapeError::Config(format!(
                "default_div must be at least 3, got {}",
                self.default_div
            )));
        }
        Ok(())
    }
}
