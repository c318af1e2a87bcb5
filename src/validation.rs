//! Folder Validation - Majority Ratio, Per-File Verdicts, Page Order
//!
//! A pass always rewrites every derived field of the folder. Nothing from a
//! previous pass survives except the file order when it was set by hand.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::catalog::{size_label, StandardSize};
use crate::cover::{self, CoverType};
use crate::folder::{FileVerdict, FolderStatus, MismatchFile, UploadedFile, UploadedFolder};
use crate::geometry::{
    available_sizes_for_ratio, closest_standard_size, normalized_ratio, ratio_equivalent,
    EXACT_SIZE_TOLERANCE, SNAP_TOLERANCE,
};
use crate::layout::{album_size, expand_half_width_covers, page_count, PageLayout};
use crate::print::AlbumSpec;

// Per-thread so parallel tests do not see each other's passes.
#[cfg(feature = "test-hooks")]
thread_local! {
    static VALIDATION_CALL_COUNT: std::cell::Cell<u32> = std::cell::Cell::new(0);
}

#[cfg(feature = "test-hooks")]
pub fn get_validation_call_count() -> u32 {
    VALIDATION_CALL_COUNT.with(|c| c.get())
}

#[cfg(feature = "test-hooks")]
pub fn reset_validation_call_count() {
    VALIDATION_CALL_COUNT.with(|c| c.set(0));
}

/// Outcome of one validation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub status: FolderStatus,
    pub album: AlbumSpec,
    pub exact_count: usize,
    pub ratio_match_count: usize,
    pub mismatch_count: usize,
    pub extended_covers: usize,
    pub mismatch_files: Vec<MismatchFile>,
}

impl ValidationReport {
    pub fn has_mismatches(&self) -> bool {
        self.mismatch_count > 0
    }
}

/// Validator over a catalog snapshot.
pub struct Validator<'a> {
    catalog: &'a [StandardSize],
}

impl<'a> Validator<'a> {
    pub fn new(catalog: &'a [StandardSize]) -> Self {
        Self { catalog }
    }

    /// Run a full pass over `folder`, rewriting its derived fields.
    pub fn validate(&self, folder: &mut UploadedFolder) -> ValidationReport {
        #[cfg(feature = "test-hooks")]
        VALIDATION_CALL_COUNT.with(|c| c.set(c.get() + 1));

        let layout = folder.page_layout;

        for file in folder.files.iter_mut() {
            file.reset_derived();
            file.cover_type = cover::classify(&file.original_name);
            let (w, h) = album_size(file.width_in, file.height_in, layout);
            file.ratio = normalized_ratio(w, h).unwrap_or(0.0);
        }

        // Ordering first keeps the majority vote's tie-break stable across passes.
        if !folder.manual_order {
            order_pages(&mut folder.files);
        }

        let album = match &folder.spec_override {
            Some(spec) => spec.clone(),
            None => self.representative(&folder.files, layout),
        };

        for file in folder.files.iter_mut() {
            file.verdict = file_verdict(file, &album, layout);
        }

        let extended_covers =
            expand_half_width_covers(&mut folder.files, album.width, album.height, layout);

        assign_output_names(&mut folder.files);

        let report = summarize(&folder.files, album, layout, extended_covers);

        folder.status = report.status;
        folder.album = report.album.clone();
        folder.exact_count = report.exact_count;
        folder.ratio_match_count = report.ratio_match_count;
        folder.mismatch_count = report.mismatch_count;
        folder.mismatch_files = report.mismatch_files.clone();
        folder.available_sizes =
            available_sizes_for_ratio(self.catalog, report.album.ratio, report.album.is_landscape());
        folder.page_count = page_count(folder.file_count(), layout, folder.binding_direction);

        tracing::debug!(
            folder = %folder.name,
            status = ?folder.status,
            album = %folder.album.label,
            exact = folder.exact_count,
            ratio_match = folder.ratio_match_count,
            mismatch = folder.mismatch_count,
            "folder validated"
        );

        report
    }

    /// Majority album size of the files, snapped to the catalog when close.
    pub fn representative(&self, files: &[UploadedFile], layout: PageLayout) -> AlbumSpec {
        let Some((width, height)) = majority_size(files, layout) else {
            return AlbumSpec::default();
        };

        match closest_standard_size(self.catalog, width, height) {
            Some(size)
                if (size.width - width).abs() <= SNAP_TOLERANCE
                    && (size.height - height).abs() <= SNAP_TOLERANCE =>
            {
                AlbumSpec::from_catalog(&size)
            }
            _ => AlbumSpec::detected(width, height),
        }
    }
}

/// Album size of the first file in the most common ratio bucket.
///
/// Buckets are ratios rounded to three decimals; ties keep the bucket seen first.
pub fn majority_size(files: &[UploadedFile], layout: PageLayout) -> Option<(f64, f64)> {
    // (bucket key, members, index of first member)
    let mut buckets: Vec<(i64, usize, usize)> = Vec::new();

    for (idx, file) in files.iter().enumerate() {
        let (w, h) = album_size(file.width_in, file.height_in, layout);
        let Some(ratio) = normalized_ratio(w, h) else {
            continue;
        };
        let key = (ratio * 1000.0).round() as i64;
        match buckets.iter_mut().find(|(k, _, _)| *k == key) {
            Some(bucket) => bucket.1 += 1,
            None => buckets.push((key, 1, idx)),
        }
    }

    let mut best: Option<(usize, usize)> = None;
    for &(_, count, first) in &buckets {
        match best {
            Some((best_count, _)) if count <= best_count => {}
            _ => best = Some((count, first)),
        }
    }

    best.map(|(_, first)| album_size(files[first].width_in, files[first].height_in, layout))
}

fn file_verdict(file: &UploadedFile, album: &AlbumSpec, layout: PageLayout) -> FileVerdict {
    let (w, h) = album_size(file.width_in, file.height_in, layout);
    let Some(ratio) = normalized_ratio(w, h) else {
        return FileVerdict::RatioMismatch;
    };
    if album.height <= 0.0 {
        return FileVerdict::RatioMismatch;
    }

    let distance = (w - album.width).abs() + (h - album.height).abs();
    if distance < EXACT_SIZE_TOLERANCE {
        FileVerdict::Exact
    } else if ratio_equivalent(ratio, album.ratio) {
        FileVerdict::RatioMatch
    } else {
        FileVerdict::RatioMismatch
    }
}

fn summarize(
    files: &[UploadedFile],
    album: AlbumSpec,
    layout: PageLayout,
    extended_covers: usize,
) -> ValidationReport {
    let mut exact_count = 0;
    let mut ratio_match_count = 0;
    let mut mismatch_files = Vec::new();

    for file in files {
        match file.verdict {
            FileVerdict::Exact => exact_count += 1,
            FileVerdict::RatioMatch => ratio_match_count += 1,
            FileVerdict::RatioMismatch => {
                let (w, h) = album_size(file.width_in, file.height_in, layout);
                mismatch_files.push(MismatchFile {
                    file_id: file.id,
                    name: file.original_name.clone(),
                    expected: format!("{} ({:.3})", album.label, album.ratio),
                    actual: format!("{} ({:.3})", size_label(w, h), file.ratio),
                });
            }
            FileVerdict::Pending => {}
        }
    }

    let status = if files.is_empty() {
        FolderStatus::Pending
    } else if !mismatch_files.is_empty() {
        FolderStatus::RatioMismatch
    } else if ratio_match_count > 0 {
        FolderStatus::RatioMatch
    } else {
        FolderStatus::ExactMatch
    };

    ValidationReport {
        status,
        album,
        exact_count,
        ratio_match_count,
        mismatch_count: mismatch_files.len(),
        extended_covers,
        mismatch_files,
    }
}

/// Fronts first, inner pages in natural name order, backs last.
pub fn order_pages(files: &mut [UploadedFile]) {
    files.sort_by(|a, b| {
        a.cover_type
            .sort_rank()
            .cmp(&b.cover_type.sort_rank())
            .then_with(|| match (a.cover_type, b.cover_type) {
                (CoverType::InnerPage, CoverType::InnerPage) => {
                    natord::compare_ignore_case(&a.original_name, &b.original_name)
                        .then_with(|| natord::compare(&a.original_name, &b.original_name))
                }
                _ => Ordering::Equal,
            })
    });
}

/// Prefix width that keeps lexical and numeric order identical.
pub fn sequence_width(count: usize) -> usize {
    if count < 100 {
        2
    } else {
        count.to_string().len()
    }
}

/// Number pages 1..N in current order and derive output names.
pub fn assign_output_names(files: &mut [UploadedFile]) {
    let width = sequence_width(files.len());
    for (idx, file) in files.iter_mut().enumerate() {
        let number = idx + 1;
        file.page_number = number as u32;
        file.output_name = format!("{:0width$}_{}", number, file.original_name, width = width);
    }
}
