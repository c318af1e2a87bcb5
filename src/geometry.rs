//! Geometry - Ratios, Equivalence, Catalog Lookup
//!
//! Pure numeric helpers. Every tolerance the intake relies on lives here.

use crate::catalog::StandardSize;

/// Two ratios closer than this are the same ratio.
pub const RATIO_TOLERANCE: f64 = 0.01;

/// A file matches a catalog entry outright when both sides are this close (inches).
pub const CATALOG_EXACT_TOLERANCE: f64 = 0.15;

/// The representative size snaps to a catalog entry within this distance per axis (inches).
pub const SNAP_TOLERANCE: f64 = 0.5;

/// Summed |dw| + |dh| below this makes a file an exact match (inches).
pub const EXACT_SIZE_TOLERANCE: f64 = 0.2;

/// Per-axis tolerance for recognising a single-leaf cover (inches).
pub const COVER_EXTENSION_TOLERANCE: f64 = 0.2;

/// Business-equivalent size classes (width, height in inches, portrait).
///
/// Members of one class have different ratios but print operations treat
/// them as interchangeable. Landscape variants are implied.
pub const EQUIVALENT_SIZE_CLASSES: &[&[(f64, f64)]] = &[
    &[(8.0, 11.0), (11.0, 15.0)],
    &[(8.0, 10.0), (11.0, 14.0)],
    &[(8.27, 11.69), (8.0, 11.0)],
];

/// `width / height`, or `None` unless both sides are positive finite numbers.
pub fn normalized_ratio(width: f64, height: f64) -> Option<f64> {
    if !width.is_finite() || !height.is_finite() || height <= 0.0 || width <= 0.0 {
        return None;
    }
    Some(width / height)
}

/// Whether two ratios print as the same shape.
pub fn ratio_equivalent(r1: f64, r2: f64) -> bool {
    if (r1 - r2).abs() < RATIO_TOLERANCE {
        return true;
    }
    EQUIVALENT_SIZE_CLASSES
        .iter()
        .any(|class| class_contains(class, r1) && class_contains(class, r2))
}

fn class_contains(class: &[(f64, f64)], ratio: f64) -> bool {
    class.iter().any(|&(w, h)| {
        (ratio - w / h).abs() < RATIO_TOLERANCE || (ratio - h / w).abs() < RATIO_TOLERANCE
    })
}

/// Nearest catalog entry to a physical size.
///
/// Order of preference: both sides within [`CATALOG_EXACT_TOLERANCE`], then the
/// closest ratio-equivalent entry by summed side difference, then the entry
/// with the closest raw ratio. Ties go to the earlier catalog entry.
pub fn closest_standard_size(
    catalog: &[StandardSize],
    width: f64,
    height: f64,
) -> Option<StandardSize> {
    if let Some(hit) = catalog.iter().find(|s| {
        (s.width - width).abs() <= CATALOG_EXACT_TOLERANCE
            && (s.height - height).abs() <= CATALOG_EXACT_TOLERANCE
    }) {
        return Some(hit.clone());
    }

    let target = normalized_ratio(width, height).unwrap_or(0.0);
    let distance = |s: &StandardSize| (s.width - width).abs() + (s.height - height).abs();

    let equivalent = first_min_by(
        catalog.iter().filter(|s| ratio_equivalent(s.ratio, target)),
        distance,
    );
    if equivalent.is_some() {
        return equivalent.cloned();
    }

    first_min_by(catalog.iter(), |s| (s.ratio - target).abs()).cloned()
}

/// Catalog entries of the same shape and orientation, smallest first.
pub fn available_sizes_for_ratio(
    catalog: &[StandardSize],
    ratio: f64,
    is_landscape: bool,
) -> Vec<StandardSize> {
    let mut sizes: Vec<StandardSize> = catalog
        .iter()
        .filter(|s| ratio_equivalent(s.ratio, ratio) && s.is_landscape() == is_landscape)
        .cloned()
        .collect();
    sizes.sort_by(|a, b| a.area().total_cmp(&b.area()));
    sizes
}

/// Round to one decimal place, the precision inch sizes are kept at.
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// `Iterator::min_by` keeps the last of equal elements; catalog order wants the first.
fn first_min_by<'a, I, F>(items: I, key: F) -> Option<&'a StandardSize>
where
    I: Iterator<Item = &'a StandardSize>,
    F: Fn(&StandardSize) -> f64,
{
    let mut best: Option<(&StandardSize, f64)> = None;
    for item in items {
        let k = key(item);
        match best {
            Some((_, best_k)) if k >= best_k => {}
            _ => best = Some((item, k)),
        }
    }
    best.map(|(item, _)| item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn catalog() -> Vec<StandardSize> {
        vec![
            StandardSize::new(8.0, 8.0, None),
            StandardSize::new(8.0, 10.0, None),
            StandardSize::new(11.0, 14.0, None),
            StandardSize::new(10.0, 8.0, None),
            StandardSize::new(8.0, 11.0, None),
            StandardSize::new(11.0, 15.0, None),
        ]
    }

    #[test]
    fn test_normalized_ratio_rejects_zero_width() {
        assert_eq!(normalized_ratio(0.0, 10.0), None);
        assert_eq!(normalized_ratio(-2.0, 10.0), None);
    }

    #[test]
    fn test_normalized_ratio_rejects_zero_height() {
        assert_eq!(normalized_ratio(10.0, 0.0), None);
        assert_eq!(normalized_ratio(10.0, -1.0), None);
        assert_eq!(normalized_ratio(f64::NAN, 2.0), None);
        assert_eq!(normalized_ratio(8.0, 10.0), Some(0.8));
    }

    #[test]
    fn test_equivalence_classes() {
        assert!(ratio_equivalent(8.0 / 10.0, 11.0 / 14.0));
        assert!(ratio_equivalent(10.0 / 8.0, 14.0 / 11.0));
        assert!(ratio_equivalent(8.0 / 11.0, 11.0 / 15.0));
        assert!(!ratio_equivalent(1.0, 0.8));
        assert!(!ratio_equivalent(8.0 / 10.0, 8.0 / 11.0));
    }

    #[test]
    fn test_closest_exact_hit() {
        let hit = closest_standard_size(&catalog(), 8.1, 9.9).unwrap();
        assert_eq!((hit.width, hit.height), (8.0, 10.0));
    }

    #[test]
    fn test_closest_equivalent_by_distance() {
        let hit = closest_standard_size(&catalog(), 10.6, 13.5).unwrap();
        assert_eq!((hit.width, hit.height), (11.0, 14.0));
    }

    #[test]
    fn test_closest_falls_back_to_raw_ratio() {
        // 2:1 has no equivalent entry; landscape 10x8 is the nearest ratio
        let hit = closest_standard_size(&catalog(), 20.0, 10.0).unwrap();
        assert_eq!((hit.width, hit.height), (10.0, 8.0));
    }

    #[test]
    fn test_closest_tie_keeps_earlier_entry() {
        // 9.5x12 is 3.5in from both 8x10 and 11x14, and ratio-equivalent to each
        let forward = vec![StandardSize::new(8.0, 10.0, None), StandardSize::new(11.0, 14.0, None)];
        let hit = closest_standard_size(&forward, 9.5, 12.0).unwrap();
        assert_eq!((hit.width, hit.height), (8.0, 10.0));

        let reversed: Vec<_> = forward.into_iter().rev().collect();
        let hit = closest_standard_size(&reversed, 9.5, 12.0).unwrap();
        assert_eq!((hit.width, hit.height), (11.0, 14.0));
    }

    #[test]
    fn test_closest_empty_catalog() {
        assert!(closest_standard_size(&[], 8.0, 10.0).is_none());
    }

    #[test]
    fn test_available_sizes_sorted_by_area() {
        let sizes = available_sizes_for_ratio(&catalog(), 0.8, false);
        let dims: Vec<_> = sizes.iter().map(|s| (s.width, s.height)).collect();
        assert_eq!(dims, vec![(8.0, 10.0), (11.0, 14.0)]);

        let landscape = available_sizes_for_ratio(&catalog(), 1.25, true);
        assert_eq!(landscape.len(), 1);
        assert_eq!(landscape[0].label, "10x8");
    }

    proptest! {
        #[test]
        fn prop_ratio_equivalent_symmetric(a in 0.1f64..5.0, b in 0.1f64..5.0) {
            prop_assert_eq!(ratio_equivalent(a, b), ratio_equivalent(b, a));
        }

        #[test]
        fn prop_ratio_equivalent_reflexive(a in 0.01f64..10.0) {
            prop_assert!(ratio_equivalent(a, a));
        }
    }
}
