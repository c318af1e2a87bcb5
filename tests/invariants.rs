//! Contract Invariant Tests
//!
//! These tests verify the guarantees the intake makes to its callers.

use photobook_intake::{
    classify, folder_fingerprint, page_count,
    catalog::{Catalog, StandardSize},
    folder::{FileMetadata, FileVerdict, FolderStatus, FolderSubmission},
    layout::{BindingDirection, PageLayout},
    store::FolderStore,
    validation::Validator,
    CoverType,
};

fn create_catalog() -> Catalog {
    Catalog::new(vec![
        StandardSize::new(8.0, 8.0, None),
        StandardSize::new(8.0, 10.0, None),
        StandardSize::new(10.0, 8.0, None),
        StandardSize::new(11.0, 14.0, None),
        StandardSize::new(12.0, 9.0, None),
    ])
}

fn create_store() -> FolderStore {
    FolderStore::with_catalog(create_catalog())
}

/// `n` files of the given pixel size named p1.jpg..pn.jpg
fn pages(n: usize, width: u32, height: u32) -> Vec<FileMetadata> {
    (1..=n)
        .map(|i| FileMetadata::new(format!("p{}.jpg", i), width, height, 10_000 + i as u64))
        .collect()
}

#[test]
fn invariant_revalidation_is_idempotent() {
    let mut store = create_store();
    let mut files = pages(6, 4800, 3000);
    files.push(FileMetadata::new("cover.jpg", 2400, 3000, 1));
    files.push(FileMetadata::new("back.jpg", 2400, 3000, 2));
    files.push(FileMetadata::new("odd.jpg", 3000, 3000, 3));
    let id = store
        .add_folder(FolderSubmission::new("Idem", files).with_layout(PageLayout::Spread))
        .folder_id
        .unwrap();

    let first = store.folder(id).unwrap().clone();
    let catalog = create_catalog();
    let mut again = first.clone();
    Validator::new(catalog.sizes()).validate(&mut again);
    assert_eq!(again, first);
    assert_eq!(folder_fingerprint(&again).unwrap(), folder_fingerprint(&first).unwrap());

    // through the store as well
    store.set_folder_page_layout(id, PageLayout::Spread).unwrap();
    assert_eq!(store.folder(id).unwrap(), &first);
}

#[test]
fn invariant_page_count_examples() {
    assert_eq!(page_count(20, PageLayout::Single, None), 20);
    assert_eq!(page_count(20, PageLayout::Spread, Some(BindingDirection::LeftStartRightEnd)), 40);
    assert_eq!(page_count(20, PageLayout::Spread, Some(BindingDirection::LeftStartLeftEnd)), 39);
    assert_eq!(page_count(20, PageLayout::Spread, Some(BindingDirection::RightStartLeftEnd)), 38);
}

#[test]
fn invariant_cover_priority() {
    assert_eq!(classify("0122.jpg"), CoverType::CombinedCover);
    assert_eq!(classify("첫장.jpg"), CoverType::FrontCover);
}

#[test]
fn invariant_majority_ratio_tolerates_one_outlier() {
    let mut store = create_store();
    // 9 files at 4:3 (12x9), one at 2:1
    let mut files = pages(9, 3600, 2700);
    files.push(FileMetadata::new("stray.jpg", 6000, 3000, 1));
    let id = store
        .add_folder(FolderSubmission::new("Majority", files).with_layout(PageLayout::Single))
        .folder_id
        .unwrap();

    let folder = store.folder(id).unwrap();
    assert_eq!(folder.status, FolderStatus::RatioMismatch);
    assert_eq!(folder.mismatch_files.len(), 1);
    assert_eq!(folder.mismatch_files[0].name, "stray.jpg");
    assert_eq!(folder.exact_count, 9);
    assert_eq!(folder.album.label, "12x9");
    assert!(store.selected_folders().is_empty());
}

#[test]
fn invariant_ratio_equivalent_outlier_is_ratio_match() {
    let mut store = create_store();
    // 9 files at 8x10, one at 11x14 (same ratio class)
    let mut files = pages(9, 2400, 3000);
    files.push(FileMetadata::new("large.jpg", 3300, 4200, 1));
    let id = store
        .add_folder(FolderSubmission::new("Equivalent", files).with_layout(PageLayout::Single))
        .folder_id
        .unwrap();

    let folder = store.folder(id).unwrap();
    assert_eq!(folder.status, FolderStatus::RatioMatch);
    assert_eq!(folder.ratio_match_count, 1);
    assert!(folder.mismatch_files.is_empty());
}

#[test]
fn invariant_duplicate_folder_rejected() {
    let mut store = create_store();
    let first = store.add_folder(FolderSubmission::new("Wedding2024", pages(3, 2400, 3000)));
    assert!(first.added);

    let second = store.add_folder(FolderSubmission::new("Wedding2024", pages(2, 3000, 3000)));
    assert!(!second.added);
    assert!(second.reason.unwrap().contains("Wedding2024"));
    assert_eq!(store.len(), 1);
}

#[test]
fn invariant_half_width_front_cover_extended() {
    let mut store = create_store();
    // spreads 16x10 -> 8x10 pages; the cover is a single 8x10 leaf
    let mut files = pages(4, 4800, 3000);
    files.push(FileMetadata::new("cover.jpg", 2400, 3000, 1));
    let id = store
        .add_folder(FolderSubmission::new("Cover", files).with_layout(PageLayout::Spread))
        .folder_id
        .unwrap();

    let folder = store.folder(id).unwrap();
    let cover = &folder.files[0];
    assert_eq!(cover.original_name, "cover.jpg");
    assert_eq!(cover.cover_type, CoverType::FrontCover);
    assert!(cover.is_extended());
    assert_eq!(cover.verdict, FileVerdict::Exact);
    assert_eq!(cover.width_px, 4800);
    assert_eq!(folder.status, FolderStatus::ExactMatch);

    // single layout never extends covers
    store.set_folder_page_layout(id, PageLayout::Single).unwrap();
    let cover = store
        .folder(id)
        .unwrap()
        .files
        .iter()
        .find(|f| f.original_name == "cover.jpg")
        .unwrap();
    assert!(!cover.is_extended());
    assert_eq!(cover.width_px, 2400);
}

#[test]
fn invariant_blank_first_page_rebinds() {
    let mut store = create_store();
    let mut files = pages(5, 4800, 3000);
    files.push(FileMetadata::new("p9.jpg", 4800, 3000, 1).blank());
    let id = store
        .add_folder(FolderSubmission::new("Blank", files).with_layout(PageLayout::Spread))
        .folder_id
        .unwrap();
    assert_eq!(store.folder(id).unwrap().page_count, 12);

    let last = store.folder(id).unwrap().files.len() - 1;
    assert!(store.folder(id).unwrap().files[last].is_blank_page);
    store.reorder_files(id, last, 0).unwrap();

    let folder = store.folder(id).unwrap();
    assert!(folder.files[0].is_blank_page);
    assert_eq!(folder.files[0].page_number, 1);
    assert!(folder.files[0].output_name.starts_with("01_"));
    assert_eq!(folder.binding_direction, Some(BindingDirection::RightStartRightEnd));
    assert!(folder.auto_binding_detected);
    assert_eq!(folder.page_count, 11);

    // blank at the end closes on the left
    store.reorder_files(id, 0, last).unwrap();
    let folder = store.folder(id).unwrap();
    assert_eq!(folder.binding_direction, Some(BindingDirection::LeftStartLeftEnd));

    store.reorder_files(id, last, 2).unwrap();
    let folder = store.folder(id).unwrap();
    assert_eq!(folder.binding_direction, Some(BindingDirection::LeftStartRightEnd));
    assert!(!folder.auto_binding_detected);
    assert_eq!(folder.page_count, 12);
}

#[test]
fn invariant_sequential_name_width() {
    let mut store = create_store();
    let id = store
        .add_folder(FolderSubmission::new("Big", pages(150, 2400, 3000)).with_layout(PageLayout::Single))
        .folder_id
        .unwrap();
    let folder = store.folder(id).unwrap();
    assert_eq!(folder.files[0].output_name, "001_p1.jpg");
    assert_eq!(folder.files[149].output_name, "150_p150.jpg");

    let small: Vec<_> = (1..=40)
        .map(|i| FileMetadata::new(format!("q{}.jpg", i), 3000, 2400, i))
        .collect();
    let id = store
        .add_folder(FolderSubmission::new("Small", small))
        .folder_id
        .unwrap();
    let folder = store.folder(id).unwrap();
    assert_eq!(folder.files[0].output_name, "01_q1.jpg");
    assert_eq!(folder.files[39].output_name, "40_q40.jpg");
}

#[test]
fn invariant_mismatch_is_not_an_error() {
    let mut store = create_store();
    let files = vec![
        FileMetadata::new("a.jpg", 3000, 3000, 1),
        FileMetadata::new("b.jpg", 6000, 1000, 2),
    ];
    let outcome = store.add_folder(FolderSubmission::new("Odd", files).with_layout(PageLayout::Single));
    assert!(outcome.added);
    assert!(outcome.report.unwrap().has_mismatches());
    assert_eq!(store.len(), 1);
}

#[test]
fn invariant_empty_catalog_still_validates() {
    let mut store = FolderStore::with_catalog(Catalog::default());
    let id = store
        .add_folder(FolderSubmission::new("NoCatalog", pages(2, 2400, 3000)).with_layout(PageLayout::Single))
        .folder_id
        .unwrap();
    let folder = store.folder(id).unwrap();
    assert_eq!(folder.status, FolderStatus::ExactMatch);
    assert_eq!(folder.album.label, "8x10");
    assert!(folder.available_sizes.is_empty());
}

#[cfg(feature = "test-hooks")]
#[test]
fn invariant_mutations_revalidate() {
    use photobook_intake::validation::{get_validation_call_count, reset_validation_call_count};

    let mut store = create_store();
    reset_validation_call_count();
    let id = store
        .add_folder(FolderSubmission::new("Hooks", pages(2, 2400, 3000)))
        .folder_id
        .unwrap();
    assert_eq!(get_validation_call_count(), 1);

    store.set_folder_page_layout(id, PageLayout::Single).unwrap();
    store.change_folder_spec(id, 8.0, 10.0, None).unwrap();
    assert_eq!(get_validation_call_count(), 3);

    store
        .set_folder_binding_direction(id, Some(BindingDirection::LeftStartLeftEnd))
        .unwrap();
    assert_eq!(get_validation_call_count(), 3);
}
