//! Intake Configuration
//!
//! Session defaults applied to new folders. Tolerances are not configurable;
//! see [`crate::geometry`].

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::layout::PageLayout;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeConfig {
    /// DPI assumed when the file reader cannot tell.
    #[serde(default = "default_dpi")]
    pub default_dpi: u32,
    #[serde(default)]
    pub default_page_layout: PageLayout,
    #[serde(default = "default_quantity")]
    pub default_quantity: u32,
}

fn default_dpi() -> u32 { 300 }
fn default_quantity() -> u32 { 1 }

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            default_dpi: default_dpi(),
            default_page_layout: PageLayout::default(),
            default_quantity: default_quantity(),
        }
    }
}

impl IntakeConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: IntakeConfig = serde_json::from_str(&content)?;
        Ok(config.sanitized())
    }

    /// Replace zero values with the built-in defaults.
    pub fn sanitized(mut self) -> Self {
        if self.default_dpi == 0 {
            self.default_dpi = default_dpi();
        }
        if self.default_quantity == 0 {
            self.default_quantity = default_quantity();
        }
        self
    }
}
