//! Output page model for the paginated exporter.
//!
//! All lengths are PDF points (1/72 inch), measured top-down from the top
//! edge of the scaled content.

use crate::geometry::{Rect, Size};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Physical page dimensions in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    /// ISO 216 A4 portrait, 210 x 297 mm.
    pub const A4: PageSize = PageSize {
        width: 595.2756,
        height: 841.8898,
    };

    /// US Letter portrait, 8.5 x 11 in.
    pub const LETTER: PageSize = PageSize {
        width: 612.0,
        height: 792.0,
    };

    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

}

impl Default for PageSize {
    fn default() -> Self {
        Self::A4
    }
}

impl FromStr for PageSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a4" => Ok(Self::A4),
            "letter" => Ok(Self::LETTER),
            other => Err(format!("unknown page size '{}' (expected 'a4' or 'letter')", other)),
        }
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}x{:.2}pt", self.width, self.height)
    }
}

/// One output page: the band of scaled content starting at `offset` is
/// aligned to the top edge of the page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSlice {
    pub index: usize,
    pub offset: f32,
    /// Height of content actually visible on this page. Equal to the page
    /// height except possibly on the last page.
    pub visible_height: f32,
}

impl PageSlice {
    /// The part of the page that carries content, top-down from the page's
    /// top edge.
    pub fn visible_area(&self, page_width: f32) -> Rect {
        Rect::new(0.0, 0.0, page_width, self.visible_height)
    }
}

/// The full pagination of one snapshot onto fixed-size pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagePlan {
    pub page: PageSize,
    /// The snapshot scaled uniformly to the page width.
    pub content: Size,
    pub slices: Vec<PageSlice>,
}

impl PagePlan {
    pub fn page_count(&self) -> usize {
        self.slices.len()
    }

    pub fn scaled_height(&self) -> f32 {
        self.content.height
    }
}
