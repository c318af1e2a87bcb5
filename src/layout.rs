//! Layout Calculator - Page Count, Trim Size, Cover Extension

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::cover::CoverType;
use crate::folder::{CoverExtension, ExtensionSide, FileVerdict, UploadedFile};
use crate::geometry::{normalized_ratio, round_tenth, COVER_EXTENSION_TOLERANCE};

/// How one uploaded file maps onto album pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageLayout {
    /// One file is one page.
    Single,
    /// One file is an open two-page spread.
    #[default]
    Spread,
}

/// Which side the album opens on and which side it closes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BindingDirection {
    #[default]
    LeftStartRightEnd,
    LeftStartLeftEnd,
    RightStartLeftEnd,
    RightStartRightEnd,
}

impl BindingDirection {
    pub const ALL: [BindingDirection; 4] = [
        BindingDirection::LeftStartRightEnd,
        BindingDirection::LeftStartLeftEnd,
        BindingDirection::RightStartLeftEnd,
        BindingDirection::RightStartRightEnd,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BindingDirection::LeftStartRightEnd => "left-start-right-end",
            BindingDirection::LeftStartLeftEnd => "left-start-left-end",
            BindingDirection::RightStartLeftEnd => "right-start-left-end",
            BindingDirection::RightStartRightEnd => "right-start-right-end",
        }
    }

    /// Binding implied by blank first/last spreads.
    ///
    /// A blank first spread means the album opens on the right-hand page; a
    /// blank last spread means it closes on the left-hand page.
    pub fn from_blank_ends(first_blank: bool, last_blank: bool) -> Self {
        match (first_blank, last_blank) {
            (true, true) => BindingDirection::RightStartLeftEnd,
            (true, false) => BindingDirection::RightStartRightEnd,
            (false, true) => BindingDirection::LeftStartLeftEnd,
            (false, false) => BindingDirection::LeftStartRightEnd,
        }
    }
}

impl fmt::Display for BindingDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BindingDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BindingDirection::ALL
            .into_iter()
            .find(|b| b.as_str() == s)
            .ok_or_else(|| format!("unknown binding direction: {}", s))
    }
}

impl FromStr for PageLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(PageLayout::Single),
            "spread" => Ok(PageLayout::Spread),
            other => Err(format!("unknown page layout: {}", other)),
        }
    }
}

/// Printed page count for `file_count` files.
pub fn page_count(file_count: u32, layout: PageLayout, binding: Option<BindingDirection>) -> u32 {
    let pages = file_count.saturating_mul(2);
    match layout {
        PageLayout::Single => file_count,
        PageLayout::Spread => match binding {
            None | Some(BindingDirection::LeftStartRightEnd) => pages,
            Some(BindingDirection::LeftStartLeftEnd) => pages.saturating_sub(1),
            Some(BindingDirection::RightStartLeftEnd) => pages.saturating_sub(2),
            Some(BindingDirection::RightStartRightEnd) => pages.saturating_sub(1),
        },
    }
}

/// Trim size of one album page for a file of the given size.
pub fn album_size(file_width: f64, file_height: f64, layout: PageLayout) -> (f64, f64) {
    match layout {
        PageLayout::Single => (file_width, file_height),
        PageLayout::Spread => (file_width / 2.0, file_height),
    }
}

/// Pad single-leaf front/back covers out to a full spread.
///
/// Returns the number of covers extended.
pub fn expand_half_width_covers(
    files: &mut [UploadedFile],
    representative_width: f64,
    representative_height: f64,
    layout: PageLayout,
) -> usize {
    if layout != PageLayout::Spread {
        return 0;
    }

    let mut extended = 0;
    for file in files.iter_mut() {
        if !file.cover_type.is_single_cover() || file.extension.is_some() {
            continue;
        }
        let (album_w, album_h) = album_size(file.width_in, file.height_in, layout);
        let half_width = representative_width / 2.0;
        if (album_w - half_width).abs() > COVER_EXTENSION_TOLERANCE
            || (album_h - representative_height).abs() > COVER_EXTENSION_TOLERANCE
        {
            continue;
        }

        let side = match file.cover_type {
            CoverType::FrontCover => ExtensionSide::Left,
            _ => ExtensionSide::Right,
        };
        file.extension = Some(CoverExtension {
            original_width_px: file.width_px,
            original_width_in: file.width_in,
            side,
        });
        file.width_px *= 2;
        file.width_in = round_tenth(file.width_in * 2.0);
        let (album_w, album_h) = album_size(file.width_in, file.height_in, layout);
        file.ratio = normalized_ratio(album_w, album_h).unwrap_or(0.0);
        file.verdict = FileVerdict::Exact;
        extended += 1;
    }
    extended
}
