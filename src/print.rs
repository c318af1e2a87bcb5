//! Album Spec Authority
//!
//! Records where a folder's album size came from, so that a user override is
//! never silently replaced by detection.

use serde::{Deserialize, Serialize};

use crate::catalog::{size_label, StandardSize};
use crate::geometry::normalized_ratio;

/// Largest album side accepted from a user override (inches).
pub const MAX_USER_DIMENSION: f64 = 40.0;

/// Source of a folder's album size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeSource {
    /// Majority size of the files, no catalog entry close enough
    Detected,
    /// Majority size snapped to a catalog entry
    Catalog,
    /// Chosen by the user
    User,
}

impl Default for SizeSource {
    fn default() -> Self {
        Self::Detected
    }
}

/// Album trim size in inches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumSpec {
    pub source: SizeSource,
    pub width: f64,
    pub height: f64,
    pub ratio: f64,
    pub label: String,
}

impl Default for AlbumSpec {
    fn default() -> Self {
        Self {
            source: SizeSource::Detected,
            width: 0.0,
            height: 0.0,
            ratio: 0.0,
            label: String::new(),
        }
    }
}

impl AlbumSpec {
    pub fn detected(width: f64, height: f64) -> Self {
        Self {
            source: SizeSource::Detected,
            width,
            height,
            ratio: normalized_ratio(width, height).unwrap_or(0.0),
            label: size_label(width, height),
        }
    }

    pub fn from_catalog(size: &StandardSize) -> Self {
        Self {
            source: SizeSource::Catalog,
            width: size.width,
            height: size.height,
            ratio: size.ratio,
            label: size.label.clone(),
        }
    }

    /// Create from user with validation
    pub fn from_user(width: f64, height: f64, label: Option<String>) -> Result<Self, &'static str> {
        if !(width > 0.0 && width <= MAX_USER_DIMENSION) {
            return Err("Width must be between 0 and 40 inches");
        }
        if !(height > 0.0 && height <= MAX_USER_DIMENSION) {
            return Err("Height must be between 0 and 40 inches");
        }
        Ok(Self {
            source: SizeSource::User,
            width,
            height,
            ratio: width / height,
            label: label.unwrap_or_else(|| size_label(width, height)),
        })
    }

    pub fn is_landscape(&self) -> bool {
        self.width >= self.height
    }

    /// Same physical size, ignoring where it came from.
    pub fn same_size(&self, other: &AlbumSpec) -> bool {
        self.width == other.width && self.height == other.height
    }
}
