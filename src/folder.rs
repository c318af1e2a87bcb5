//! Folder Model - Uploaded Files and Order Units

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::StandardSize;
use crate::cover::CoverType;
use crate::geometry::round_tenth;
use crate::layout::{BindingDirection, PageLayout};
use crate::print::AlbumSpec;

/// Metadata for one decoded image, as supplied by the file reader.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub name: String,
    pub byte_size: u64,
    pub pixel_width: u32,
    pub pixel_height: u32,
    #[serde(default)]
    pub dpi: Option<u32>,
    #[serde(default)]
    pub is_blank_page: bool,
}

impl FileMetadata {
    pub fn new(name: impl Into<String>, pixel_width: u32, pixel_height: u32, byte_size: u64) -> Self {
        Self {
            name: name.into(),
            byte_size,
            pixel_width,
            pixel_height,
            dpi: None,
            is_blank_page: false,
        }
    }

    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = Some(dpi);
        self
    }

    pub fn blank(mut self) -> Self {
        self.is_blank_page = true;
        self
    }
}

/// A folder as submitted, before admission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderSubmission {
    pub name: String,
    pub files: Vec<FileMetadata>,
    #[serde(default)]
    pub page_layout: Option<PageLayout>,
    #[serde(default)]
    pub binding_direction: Option<BindingDirection>,
    #[serde(default)]
    pub quantity: Option<u32>,
}

impl FolderSubmission {
    pub fn new(name: impl Into<String>, files: Vec<FileMetadata>) -> Self {
        Self {
            name: name.into(),
            files,
            page_layout: None,
            binding_direction: None,
            quantity: None,
        }
    }

    pub fn with_layout(mut self, layout: PageLayout) -> Self {
        self.page_layout = Some(layout);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileVerdict {
    Exact,
    RatioMatch,
    RatioMismatch,
    #[default]
    Pending,
}

/// Side of the spread the blank fill goes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtensionSide {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverExtension {
    pub original_width_px: u32,
    pub original_width_in: f64,
    pub side: ExtensionSide,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub id: Uuid,
    pub original_name: String,
    pub output_name: String,
    pub page_number: u32,
    pub byte_size: u64,
    /// Pixel size as supplied; never rewritten.
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub dpi: u32,
    /// Effective pixel width (doubled for extended covers).
    pub width_px: u32,
    pub width_in: f64,
    pub height_in: f64,
    /// Ratio of the album page this file produces.
    pub ratio: f64,
    pub cover_type: CoverType,
    pub verdict: FileVerdict,
    pub extension: Option<CoverExtension>,
    pub is_blank_page: bool,
}

impl UploadedFile {
    pub fn from_metadata(meta: &FileMetadata, default_dpi: u32) -> Self {
        let dpi = match meta.dpi {
            Some(d) if d > 0 => d,
            _ => default_dpi.max(1),
        };
        Self {
            id: Uuid::new_v4(),
            original_name: meta.name.clone(),
            output_name: meta.name.clone(),
            page_number: 0,
            byte_size: meta.byte_size,
            pixel_width: meta.pixel_width,
            pixel_height: meta.pixel_height,
            dpi,
            width_px: meta.pixel_width,
            width_in: inches(meta.pixel_width, dpi),
            height_in: inches(meta.pixel_height, dpi),
            ratio: 0.0,
            cover_type: CoverType::InnerPage,
            verdict: FileVerdict::Pending,
            extension: None,
            is_blank_page: meta.is_blank_page,
        }
    }

    /// Drop every derived field back to what the metadata alone implies.
    pub fn reset_derived(&mut self) {
        self.width_px = self.pixel_width;
        self.width_in = inches(self.pixel_width, self.dpi);
        self.height_in = inches(self.pixel_height, self.dpi);
        self.extension = None;
        self.verdict = FileVerdict::Pending;
    }

    pub fn is_extended(&self) -> bool {
        self.extension.is_some()
    }

    /// Identity used for duplicate detection across folders.
    pub fn duplicate_key(&self) -> (&str, u64) {
        (&self.original_name, self.byte_size)
    }
}

/// `pixels / dpi`, one decimal place.
pub fn inches(pixels: u32, dpi: u32) -> f64 {
    round_tenth(pixels as f64 / dpi.max(1) as f64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FolderStatus {
    #[default]
    Pending,
    ExactMatch,
    RatioMatch,
    RatioMismatch,
}

/// An extra print run of the same files at another same-ratio size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalOrder {
    pub size: StandardSize,
    pub quantity: u32,
}

/// A file that failed the ratio check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MismatchFile {
    pub file_id: Uuid,
    pub name: String,
    pub expected: String,
    pub actual: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFolder {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub files: Vec<UploadedFile>,
    pub page_layout: PageLayout,
    pub binding_direction: Option<BindingDirection>,
    pub auto_binding_detected: bool,
    /// Files were reordered by hand; validation keeps their order.
    pub manual_order: bool,
    pub album: AlbumSpec,
    /// User-chosen size that replaces detection on every pass.
    pub spec_override: Option<AlbumSpec>,
    pub page_count: u32,
    pub status: FolderStatus,
    pub approved: bool,
    pub selected: bool,
    pub exact_count: usize,
    pub ratio_match_count: usize,
    pub mismatch_count: usize,
    pub mismatch_files: Vec<MismatchFile>,
    pub available_sizes: Vec<StandardSize>,
    pub additional_orders: Vec<AdditionalOrder>,
    pub quantity: u32,
}

impl UploadedFolder {
    pub fn new(name: impl Into<String>, files: Vec<UploadedFile>, page_layout: PageLayout) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at: Utc::now(),
            files,
            page_layout,
            binding_direction: None,
            auto_binding_detected: false,
            manual_order: false,
            album: AlbumSpec::default(),
            spec_override: None,
            page_count: 0,
            status: FolderStatus::Pending,
            approved: false,
            selected: false,
            exact_count: 0,
            ratio_match_count: 0,
            mismatch_count: 0,
            mismatch_files: vec![],
            available_sizes: vec![],
            additional_orders: vec![],
            quantity: 1,
        }
    }

    /// Eligible to proceed to the cart.
    pub fn is_eligible(&self) -> bool {
        match self.status {
            FolderStatus::ExactMatch => true,
            FolderStatus::RatioMatch => self.approved,
            FolderStatus::Pending | FolderStatus::RatioMismatch => false,
        }
    }

    pub fn file_count(&self) -> u32 {
        self.files.len() as u32
    }
}
