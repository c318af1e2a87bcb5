//! Catalog System - Standard Print Sizes
//!
//! The catalog is supplied from outside and copied into the session once.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::geometry::normalized_ratio;
use crate::ENGINE_VERSION;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Catalog requires engine >= {0}, current is {1}")]
    EngineVersionMismatch(String, String),

    #[error("Invalid version string: {0}")]
    InvalidVersion(String),

    #[error("Invalid catalog entry {index}: {width}x{height}")]
    InvalidEntry { index: usize, width: f64, height: f64 },
}

/// One standard print size, in inches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardSize {
    pub width: f64,
    pub height: f64,
    pub ratio: f64,
    pub label: String,
}

impl StandardSize {
    /// Build an entry, deriving the ratio and, when absent, a `WxH` label.
    pub fn new(width: f64, height: f64, label: Option<String>) -> Self {
        Self {
            width,
            height,
            ratio: normalized_ratio(width, height).unwrap_or(0.0),
            label: label.unwrap_or_else(|| size_label(width, height)),
        }
    }

    pub fn is_landscape(&self) -> bool {
        self.width >= self.height
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

/// `8x10`, `8.5x11`.
pub fn size_label(width: f64, height: f64) -> String {
    format!("{}x{}", width, height)
}

/// On-disk catalog format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogFile {
    #[serde(default = "default_catalog_version")]
    pub catalog_version: String,
    #[serde(default = "default_engine_min_version")]
    pub engine_min_version: String,
    pub sizes: Vec<CatalogEntry>,
}

fn default_catalog_version() -> String { "1.0.0".to_string() }
fn default_engine_min_version() -> String { crate::MIN_ENGINE_VERSION.to_string() }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub label: Option<String>,
}

/// Anything that can hand the session its list of standard sizes.
pub trait CatalogSource {
    fn standard_sizes(&self) -> Result<Vec<StandardSize>, CatalogError>;
}

/// Catalog read from a JSON file.
pub struct JsonCatalogFile {
    path: PathBuf,
}

impl JsonCatalogFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CatalogSource for JsonCatalogFile {
    fn standard_sizes(&self) -> Result<Vec<StandardSize>, CatalogError> {
        let content = fs::read_to_string(&self.path)?;
        let file: CatalogFile = serde_json::from_str(&content)?;
        check_engine_version(&file.engine_min_version)?;

        file.sizes
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                if normalized_ratio(entry.width, entry.height).is_none() || entry.width <= 0.0 {
                    return Err(CatalogError::InvalidEntry {
                        index,
                        width: entry.width,
                        height: entry.height,
                    });
                }
                Ok(StandardSize::new(entry.width, entry.height, entry.label))
            })
            .collect()
    }
}

impl CatalogSource for Vec<StandardSize> {
    fn standard_sizes(&self) -> Result<Vec<StandardSize>, CatalogError> {
        Ok(self.clone())
    }
}

fn check_engine_version(min: &str) -> Result<(), CatalogError> {
    let engine_ver = semver::Version::parse(ENGINE_VERSION)
        .map_err(|_| CatalogError::InvalidVersion(ENGINE_VERSION.to_string()))?;
    let min_ver = semver::Version::parse(min)
        .map_err(|_| CatalogError::InvalidVersion(min.to_string()))?;

    if engine_ver < min_ver {
        return Err(CatalogError::EngineVersionMismatch(
            min.to_string(),
            ENGINE_VERSION.to_string(),
        ));
    }
    Ok(())
}

/// Session snapshot of the catalog. Never changes after loading.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    sizes: Vec<StandardSize>,
}

impl Catalog {
    pub fn new(sizes: Vec<StandardSize>) -> Self {
        Self { sizes }
    }

    pub fn load(source: &dyn CatalogSource) -> Result<Self, CatalogError> {
        let sizes = source.standard_sizes()?;
        tracing::info!(sizes = sizes.len(), "catalog loaded");
        Ok(Self { sizes })
    }

    pub fn load_from_file(path: &Path) -> Result<Self, CatalogError> {
        Self::load(&JsonCatalogFile::new(path))
    }

    pub fn sizes(&self) -> &[StandardSize] {
        &self.sizes
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_label_formatting() {
        assert_eq!(size_label(8.0, 10.0), "8x10");
        assert_eq!(size_label(8.5, 11.0), "8.5x11");
        assert_eq!(StandardSize::new(12.0, 12.0, None).label, "12x12");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"catalogVersion":"2024.1.0","sizes":[{{"width":8,"height":10}},{{"width":11,"height":14,"label":"Large"}}]}}"#
        )
        .unwrap();

        let catalog = Catalog::load_from_file(file.path()).unwrap();
        assert_eq!(catalog.sizes().len(), 2);
        assert_eq!(catalog.sizes()[0].label, "8x10");
        assert_eq!(catalog.sizes()[1].label, "Large");
        assert!((catalog.sizes()[0].ratio - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_newer_engine_requirement() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"engineMinVersion":"99.0.0","sizes":[]}}"#).unwrap();

        let err = Catalog::load_from_file(file.path()).unwrap_err();
        assert!(matches!(err, CatalogError::EngineVersionMismatch(..)));
    }

    #[test]
    fn test_rejects_zero_height_entry() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"sizes":[{{"width":8,"height":0}}]}}"#).unwrap();

        let err = Catalog::load_from_file(file.path()).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidEntry { index: 0, .. }));
    }
}
