use wayfare_types::{PagePlan, PageSlice};

/// Convert a top-down Y coordinate to PDF's bottom-up space.
pub fn flip_y(y: f32, page_height: f32) -> f32 {
    page_height - y
}

/// The `cm` matrix that draws the whole scaled snapshot so the band starting
/// at `slice.offset` sits at the top edge of the page.
///
/// Image XObjects occupy the unit square, so the matrix scales to the scaled
/// content size and translates the image's bottom edge into place.
pub fn band_transform(plan: &PagePlan, slice: &PageSlice) -> [f32; 6] {
    let content = plan.content;
    let bottom = flip_y(content.height - slice.offset, plan.page.height);
    [content.width, 0.0, 0.0, content.height, 0.0, bottom]
}
