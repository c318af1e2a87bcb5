//! Folder Store - Session State, Single Entry Point
//!
//! CRITICAL: every mutation that can move geometry re-runs validation through
//! `revalidate`. No setter writes derived fields directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::catalog::{Catalog, StandardSize};
use crate::config::IntakeConfig;
use crate::folder::{AdditionalOrder, FolderStatus, FolderSubmission, UploadedFile, UploadedFolder};
use crate::geometry::ratio_equivalent;
use crate::hashing::folder_fingerprint;
use crate::layout::{page_count, BindingDirection, PageLayout};
use crate::print::AlbumSpec;
use crate::validation::{assign_output_names, ValidationReport, Validator};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Folder not found: {0}")]
    FolderNotFound(Uuid),

    #[error("File index {index} out of range for {len} files")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Quantity must be at least 1")]
    InvalidQuantity,

    #[error("Size {0} does not match the folder's ratio and orientation")]
    IncompatibleSize(String),

    #[error("Additional order {0} not found")]
    AdditionalOrderNotFound(usize),

    #[error("Folder '{0}' cannot be approved in its current state")]
    NotApprovable(String),

    #[error("Folder '{0}' is approved and cannot be selected")]
    AlreadyApproved(String),

    #[error("Invalid album spec: {0}")]
    InvalidSpec(&'static str),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result of submitting a folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFolderOutcome {
    pub added: bool,
    pub folder_id: Option<Uuid>,
    /// Why the folder was rejected, or a warning when it was admitted.
    pub reason: Option<String>,
    pub duplicate_files: usize,
    pub report: Option<ValidationReport>,
}

impl AddFolderOutcome {
    fn rejected(reason: String, duplicate_files: usize) -> Self {
        warn!(%reason, "folder rejected");
        Self {
            added: false,
            folder_id: None,
            reason: Some(reason),
            duplicate_files,
            report: None,
        }
    }
}

/// A folder handed to the cart, with the fingerprint of its final state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub folder: UploadedFolder,
    pub fingerprint: String,
    pub handed_off_at: DateTime<Utc>,
}

/// All in-progress folders of one session.
pub struct FolderStore {
    catalog: Catalog,
    config: IntakeConfig,
    folders: Vec<UploadedFolder>,
    cart: Vec<String>,
}

impl FolderStore {
    pub fn new(catalog: Catalog, config: IntakeConfig) -> Self {
        Self {
            catalog,
            config,
            folders: vec![],
            cart: vec![],
        }
    }

    pub fn with_catalog(catalog: Catalog) -> Self {
        Self::new(catalog, IntakeConfig::default())
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Replace the cart snapshot used for duplicate-name checks.
    pub fn set_cart_snapshot(&mut self, folder_names: Vec<String>) {
        self.cart = folder_names;
    }

    pub fn cart_snapshot(&self) -> &[String] {
        &self.cart
    }

    pub fn folders(&self) -> &[UploadedFolder] {
        &self.folders
    }

    pub fn folder(&self, id: Uuid) -> Option<&UploadedFolder> {
        self.folders.iter().find(|f| f.id == id)
    }

    pub fn folder_by_name(&self, name: &str) -> Option<&UploadedFolder> {
        self.folders.iter().find(|f| f.name == name)
    }

    pub fn len(&self) -> usize {
        self.folders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }

    /// Admit a folder after duplicate checks, validating it on the way in.
    pub fn add_folder(&mut self, submission: FolderSubmission) -> AddFolderOutcome {
        let name = submission.name.trim().to_string();

        if let Some(existing) = self.folder_by_name(&name) {
            return AddFolderOutcome::rejected(
                format!("Folder '{}' is already in progress", existing.name),
                0,
            );
        }
        if self.cart.iter().any(|n| *n == name) {
            return AddFolderOutcome::rejected(format!("Folder '{}' is already in the cart", name), 0);
        }
        if submission.files.is_empty() {
            return AddFolderOutcome::rejected(format!("Folder '{}' contains no image files", name), 0);
        }

        let duplicate_files = {
            let known: HashSet<(&str, u64)> = self
                .folders
                .iter()
                .flat_map(|f| f.files.iter().map(UploadedFile::duplicate_key))
                .collect();
            submission
                .files
                .iter()
                .filter(|m| known.contains(&(m.name.as_str(), m.byte_size)))
                .count()
        };
        let total = submission.files.len();
        if duplicate_files == total {
            return AddFolderOutcome::rejected(
                format!("All {} files in '{}' are already uploaded", total, name),
                duplicate_files,
            );
        }

        let files = submission
            .files
            .iter()
            .map(|meta| UploadedFile::from_metadata(meta, self.config.default_dpi))
            .collect();
        let layout = submission.page_layout.unwrap_or(self.config.default_page_layout);
        let mut folder = UploadedFolder::new(name, files, layout);
        folder.binding_direction = submission.binding_direction;
        folder.quantity = submission
            .quantity
            .filter(|q| *q > 0)
            .unwrap_or(self.config.default_quantity);

        let report = revalidate(&self.catalog, &mut folder);
        let folder_id = folder.id;

        info!(
            folder = %folder.name,
            files = total,
            duplicates = duplicate_files,
            status = ?folder.status,
            "folder added"
        );
        self.folders.push(folder);

        let reason = (duplicate_files > 0).then(|| {
            format!("{} of {} files are already uploaded in this session", duplicate_files, total)
        });

        AddFolderOutcome {
            added: true,
            folder_id: Some(folder_id),
            reason,
            duplicate_files,
            report: Some(report),
        }
    }

    pub fn remove_folder(&mut self, id: Uuid) -> Result<UploadedFolder, StoreError> {
        let idx = self
            .folders
            .iter()
            .position(|f| f.id == id)
            .ok_or(StoreError::FolderNotFound(id))?;
        let folder = self.folders.remove(idx);
        info!(folder = %folder.name, "folder removed");
        Ok(folder)
    }

    /// Drop every in-progress folder.
    pub fn reset(&mut self) {
        info!(folders = self.folders.len(), "session reset");
        self.folders.clear();
    }

    /// Move one file, renumber, and re-derive binding from blank end pages.
    pub fn reorder_files(&mut self, id: Uuid, from: usize, to: usize) -> Result<(), StoreError> {
        let folder = find_mut(&mut self.folders, id)?;
        let len = folder.files.len();
        for index in [from, to] {
            if index >= len {
                return Err(StoreError::IndexOutOfRange { index, len });
            }
        }

        if from != to {
            let file = folder.files.remove(from);
            folder.files.insert(to, file);
        }
        folder.manual_order = true;
        assign_output_names(&mut folder.files);

        let first_blank = folder.files.first().map_or(false, |f| f.is_blank_page);
        let last_blank = folder.files.last().map_or(false, |f| f.is_blank_page);
        folder.binding_direction = Some(BindingDirection::from_blank_ends(first_blank, last_blank));
        folder.auto_binding_detected = first_blank || last_blank;
        folder.page_count = page_count(folder.file_count(), folder.page_layout, folder.binding_direction);

        debug!(
            folder = %folder.name,
            from,
            to,
            binding = ?folder.binding_direction,
            auto = folder.auto_binding_detected,
            "files reordered"
        );
        Ok(())
    }

    pub fn set_folder_page_layout(
        &mut self,
        id: Uuid,
        layout: PageLayout,
    ) -> Result<ValidationReport, StoreError> {
        let folder = find_mut(&mut self.folders, id)?;
        folder.page_layout = layout;
        Ok(revalidate(&self.catalog, folder))
    }

    /// Binding only moves the page count, so validation is not re-run.
    pub fn set_folder_binding_direction(
        &mut self,
        id: Uuid,
        binding: Option<BindingDirection>,
    ) -> Result<u32, StoreError> {
        let folder = find_mut(&mut self.folders, id)?;
        folder.binding_direction = binding;
        folder.auto_binding_detected = false;
        folder.page_count = page_count(folder.file_count(), folder.page_layout, binding);
        Ok(folder.page_count)
    }

    /// Override the album size with a user-chosen one and re-validate against it.
    pub fn change_folder_spec(
        &mut self,
        id: Uuid,
        width: f64,
        height: f64,
        label: Option<String>,
    ) -> Result<ValidationReport, StoreError> {
        let spec = AlbumSpec::from_user(width, height, label).map_err(StoreError::InvalidSpec)?;
        let folder = find_mut(&mut self.folders, id)?;
        folder.spec_override = Some(spec);
        Ok(revalidate(&self.catalog, folder))
    }

    /// Override the album size with a catalog entry.
    pub fn change_folder_size(
        &mut self,
        id: Uuid,
        size: &StandardSize,
    ) -> Result<ValidationReport, StoreError> {
        let folder = find_mut(&mut self.folders, id)?;
        folder.spec_override = Some(AlbumSpec::from_catalog(size));
        Ok(revalidate(&self.catalog, folder))
    }

    /// Go back to the detected size.
    pub fn clear_folder_spec(&mut self, id: Uuid) -> Result<ValidationReport, StoreError> {
        let folder = find_mut(&mut self.folders, id)?;
        folder.spec_override = None;
        Ok(revalidate(&self.catalog, folder))
    }

    /// Accept a ratio-only match. Clears bulk selection.
    pub fn approve_folder(&mut self, id: Uuid) -> Result<(), StoreError> {
        let folder = find_mut(&mut self.folders, id)?;
        match folder.status {
            FolderStatus::ExactMatch | FolderStatus::RatioMatch => {}
            FolderStatus::Pending | FolderStatus::RatioMismatch => {
                return Err(StoreError::NotApprovable(folder.name.clone()));
            }
        }
        folder.approved = true;
        folder.selected = false;
        info!(folder = %folder.name, "folder approved");
        Ok(())
    }

    pub fn revoke_approval(&mut self, id: Uuid) -> Result<(), StoreError> {
        find_mut(&mut self.folders, id)?.approved = false;
        Ok(())
    }

    /// Mark a folder for a bulk action.
    pub fn set_folder_selected(&mut self, id: Uuid, selected: bool) -> Result<(), StoreError> {
        let folder = find_mut(&mut self.folders, id)?;
        if selected && folder.approved {
            return Err(StoreError::AlreadyApproved(folder.name.clone()));
        }
        folder.selected = selected;
        Ok(())
    }

    pub fn set_folder_quantity(&mut self, id: Uuid, quantity: u32) -> Result<(), StoreError> {
        if quantity == 0 {
            return Err(StoreError::InvalidQuantity);
        }
        find_mut(&mut self.folders, id)?.quantity = quantity;
        Ok(())
    }

    /// Bundle another print run at a same-shape size.
    pub fn add_additional_order(
        &mut self,
        id: Uuid,
        size: StandardSize,
        quantity: u32,
    ) -> Result<(), StoreError> {
        if quantity == 0 {
            return Err(StoreError::InvalidQuantity);
        }
        let folder = find_mut(&mut self.folders, id)?;
        if !fits_album(&size, &folder.album) {
            return Err(StoreError::IncompatibleSize(size.label));
        }
        folder.additional_orders.push(AdditionalOrder { size, quantity });
        Ok(())
    }

    pub fn remove_additional_order(
        &mut self,
        id: Uuid,
        index: usize,
    ) -> Result<AdditionalOrder, StoreError> {
        let folder = find_mut(&mut self.folders, id)?;
        if index >= folder.additional_orders.len() {
            return Err(StoreError::AdditionalOrderNotFound(index));
        }
        Ok(folder.additional_orders.remove(index))
    }

    /// Folders allowed to proceed: exact matches and approved ratio matches.
    pub fn selected_folders(&self) -> Vec<&UploadedFolder> {
        self.folders.iter().filter(|f| f.is_eligible()).collect()
    }

    /// Move every eligible folder out of the session and into the cart.
    pub fn hand_off_to_cart(&mut self) -> Result<Vec<CartItem>, StoreError> {
        let handed_off_at = Utc::now();
        let items = self
            .folders
            .iter()
            .filter(|f| f.is_eligible())
            .map(|folder| -> Result<CartItem, StoreError> {
                Ok(CartItem {
                    fingerprint: folder_fingerprint(folder)?,
                    folder: folder.clone(),
                    handed_off_at,
                })
            })
            .collect::<Result<Vec<_>, StoreError>>()?;

        self.folders.retain(|f| !f.is_eligible());
        self.cart.extend(items.iter().map(|item| item.folder.name.clone()));

        info!(folders = items.len(), "folders handed off to cart");
        Ok(items)
    }
}

fn find_mut(folders: &mut [UploadedFolder], id: Uuid) -> Result<&mut UploadedFolder, StoreError> {
    folders
        .iter_mut()
        .find(|f| f.id == id)
        .ok_or(StoreError::FolderNotFound(id))
}

fn fits_album(size: &StandardSize, album: &AlbumSpec) -> bool {
    ratio_equivalent(size.ratio, album.ratio) && size.is_landscape() == album.is_landscape()
}

/// Full validation pass plus the store-level consequences of a changed verdict.
fn revalidate(catalog: &Catalog, folder: &mut UploadedFolder) -> ValidationReport {
    let previous_status = folder.status;
    let previous_album = folder.album.clone();

    let report = Validator::new(catalog.sizes()).validate(folder);

    if folder.approved
        && (folder.status != previous_status || !folder.album.same_size(&previous_album))
    {
        folder.approved = false;
        info!(folder = %folder.name, "approval cleared by re-validation");
    }

    let before = folder.additional_orders.len();
    let album = folder.album.clone();
    folder.additional_orders.retain(|o| fits_album(&o.size, &album));
    let dropped = before - folder.additional_orders.len();
    if dropped > 0 {
        warn!(folder = %folder.name, dropped, "additional orders no longer match the album ratio");
    }

    report
}
