//! Cover Classifier - File Name Heuristics
//!
//! Rules run in table order and the first hit wins. Combined covers are
//! checked before single covers, and exact names before fuzzy patterns, so an
//! inner page whose name merely contains a cover word stays an inner page.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CoverType {
    FrontCover,
    BackCover,
    CombinedCover,
    InnerPage,
}

impl CoverType {
    /// Position group used when ordering pages: front, inner, back.
    pub fn sort_rank(self) -> u8 {
        match self {
            CoverType::FrontCover | CoverType::CombinedCover => 0,
            CoverType::InnerPage => 1,
            CoverType::BackCover => 2,
        }
    }

    pub fn is_single_cover(self) -> bool {
        matches!(self, CoverType::FrontCover | CoverType::BackCover)
    }
}

pub const FRONT_EXACT: &[&str] = &[
    "표지", "앞표지", "첫장", "앞", "cover", "front", "frontcover", "front_cover", "front-cover",
];

pub const BACK_EXACT: &[&str] = &[
    "뒷표지", "뒷장", "마지막장", "뒤", "back", "backcover", "back_cover", "back-cover",
];

lazy_static! {
    static ref COMBINED_PATTERN: Regex = Regex::new(
        r"(?i)(앞뒤\s*표지|표지\s*펼침|펼침\s*표지|전체\s*표지|full[\s_-]*cover|front[\s_-]*(?:and|&|\+)?[\s_-]*back(?:[\s_.-]|$)|cover[\s_-]*spread|wrap[\s_-]*cover)"
    ).unwrap();

    static ref FRONT_PATTERN: Regex = Regex::new(
        r"(?i)(앞\s*표지|첫\s*장(?:[\s_.-]|$)|^표지(?:[\s_.-]|$)|(?:^|[\s_.-])front(?:[\s_.-]|$)|^cover(?:[\s_.-]|$))"
    ).unwrap();

    static ref BACK_PATTERN: Regex = Regex::new(
        r"(?i)(뒷\s*표지|뒷\s*장(?:[\s_.-]|$)|마지막\s*장(?:[\s_.-]|$)|(?:^|[\s_.-])back(?:[\s_.-]|$))"
    ).unwrap();
}

/// One classification rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverRule {
    /// `0122`-style page range naming a fused first and last page.
    NumericRange,
    ExactFront,
    ExactBack,
    CombinedPattern,
    FrontPattern,
    BackPattern,
}

/// The rule table, in priority order.
pub const RULES: &[(CoverRule, CoverType)] = &[
    (CoverRule::NumericRange, CoverType::CombinedCover),
    (CoverRule::ExactFront, CoverType::FrontCover),
    (CoverRule::ExactBack, CoverType::BackCover),
    (CoverRule::CombinedPattern, CoverType::CombinedCover),
    (CoverRule::FrontPattern, CoverType::FrontCover),
    (CoverRule::BackPattern, CoverType::BackCover),
];

impl CoverRule {
    fn matches(self, name: &str) -> bool {
        match self {
            CoverRule::NumericRange => is_numeric_range(name),
            CoverRule::ExactFront => exact_match(FRONT_EXACT, name),
            CoverRule::ExactBack => exact_match(BACK_EXACT, name),
            CoverRule::CombinedPattern => COMBINED_PATTERN.is_match(name),
            CoverRule::FrontPattern => FRONT_PATTERN.is_match(name),
            CoverRule::BackPattern => BACK_PATTERN.is_match(name),
        }
    }
}

/// File name without its extension, NFC-normalized and trimmed.
pub fn base_name(file_name: &str) -> String {
    let stem = match file_name.rfind('.') {
        Some(idx) if idx > 0 => &file_name[..idx],
        _ => file_name,
    };
    stem.nfc().collect::<String>().trim().to_string()
}

/// Classify a raw file name (extension allowed).
pub fn classify(file_name: &str) -> CoverType {
    classify_base(&base_name(file_name))
}

/// Classify an already-normalized base name.
pub fn classify_base(name: &str) -> CoverType {
    RULES
        .iter()
        .find(|(rule, _)| rule.matches(name))
        .map(|&(_, cover)| cover)
        .unwrap_or(CoverType::InnerPage)
}

fn is_numeric_range(name: &str) -> bool {
    let len = name.len();
    if len < 4 || len % 2 != 0 || !name.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    // compared as digit strings so long names cannot overflow
    let (left, right) = name.split_at(len / 2);
    let left = left.trim_start_matches('0');
    let right = right.trim_start_matches('0');
    left == "1" && (right.len() > 1 || right > "2")
}

fn exact_match(vocabulary: &[&str], name: &str) -> bool {
    let lower = name.to_lowercase();
    vocabulary.iter().any(|word| *word == lower)
}
