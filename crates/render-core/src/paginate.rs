//! Splits a tall snapshot into fixed-size pages.
//!
//! The snapshot is scaled uniformly to the page width. The first page shows
//! the top `page.height` of the scaled content; every following page shows the
//! next unseen band, aligned to its top edge, until no content remains.

use crate::error::RenderError;
use wayfare_types::{PagePlan, PageSize, PageSlice, Size};

/// Remaining content at or below this height (in points) does not open a
/// new page. Absorbs float error when the page height divides the content.
pub const HEIGHT_TOLERANCE: f32 = 1e-3;

pub const DEFAULT_MAX_PAGES: usize = 200;

/// Plans the pages for a snapshot of `content` pixels on `page`.
///
/// Offsets are computed as `index * page.height` rather than accumulated, so
/// planning the same input always yields identical offsets.
pub fn plan_pages(
    content: Size,
    page: PageSize,
    max_pages: usize,
) -> Result<PagePlan, RenderError> {
    if !content.is_drawable() {
        return Err(RenderError::InvalidGeometry(format!(
            "snapshot must have positive dimensions, got {}x{}",
            content.width, content.height
        )));
    }
    if !page.size().is_drawable() {
        return Err(RenderError::InvalidGeometry(format!(
            "page must have positive dimensions, got {}",
            page
        )));
    }

    let scaled_height = content.height_at_width(page.width);
    if !scaled_height.is_finite() || scaled_height <= 0.0 {
        return Err(RenderError::InvalidGeometry(format!(
            "scaled content height {} is not usable",
            scaled_height
        )));
    }

    let needed = ((scaled_height - HEIGHT_TOLERANCE) / page.height).ceil().max(1.0);
    if needed > max_pages as f32 {
        return Err(RenderError::TooManyPages {
            pages: needed as usize,
            limit: max_pages,
        });
    }
    let page_count = needed as usize;

    let slices = (0..page_count)
        .map(|index| {
            let offset = index as f32 * page.height;
            PageSlice {
                index,
                offset,
                visible_height: (scaled_height - offset).min(page.height),
            }
        })
        .collect();

    log::debug!(
        "Planned {} page(s) for {}x{} snapshot (scaled height {:.2}pt on {})",
        page_count,
        content.width,
        content.height,
        scaled_height,
        page
    );

    Ok(PagePlan {
        page,
        content: Size::new(page.width, scaled_height),
        slices,
    })
}
