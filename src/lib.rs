//! Photobook Intake - Print-Readiness Validation
//!
//! # Guarantees
//! 1. Cover type and match verdicts are derived, never supplied
//! 2. Every geometry-affecting mutation re-validates the whole folder
//! 3. Re-validation of an unchanged folder is idempotent
//! 4. Mismatches are verdicts, not errors
//! 5. External catalog and cart data are held as copies

pub mod geometry;
pub mod catalog;
pub mod cover;
pub mod layout;
pub mod folder;
pub mod print;
pub mod validation;
pub mod hashing;
pub mod config;
pub mod store;

pub use catalog::{Catalog, CatalogError, CatalogSource, JsonCatalogFile, StandardSize};
pub use config::IntakeConfig;
pub use cover::{classify, CoverType};
pub use folder::{FileMetadata, FileVerdict, FolderStatus, FolderSubmission, UploadedFile, UploadedFolder};
pub use hashing::{canonical_json, folder_fingerprint};
pub use layout::{album_size, page_count, BindingDirection, PageLayout};
pub use print::{AlbumSpec, SizeSource};
pub use store::{AddFolderOutcome, CartItem, FolderStore, StoreError};
pub use validation::{ValidationReport, Validator};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const MIN_ENGINE_VERSION: &str = "1.0.0";
