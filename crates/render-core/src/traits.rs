use crate::error::RenderError;
use crate::snapshot::RenderSnapshot;
use lopdf::ObjectId;
use std::io::Write;
use wayfare_types::{PagePlan, PageSlice};

/// Handle to an image registered with a renderer.
pub type ImageHandle = ObjectId;

/// Document-level metadata written into the output.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentInfo {
    pub title: Option<String>,
    pub producer: String,
}

impl Default for DocumentInfo {
    fn default() -> Self {
        Self {
            title: None,
            producer: concat!("wayfare ", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// A trait for document renderers, abstracting the PDF-writing primitives.
pub trait DocumentRenderer<W: Write> {
    fn begin_document(&mut self, info: &DocumentInfo) -> Result<(), RenderError>;

    /// Registers the snapshot once; pages refer to it by handle.
    fn add_snapshot(&mut self, snapshot: &RenderSnapshot) -> Result<ImageHandle, RenderError>;

    fn render_page(
        &mut self,
        image: ImageHandle,
        plan: &PagePlan,
        slice: &PageSlice,
    ) -> Result<(), RenderError>;

    fn finish(self: Box<Self>, writer: W) -> Result<W, RenderError>;
}

/// Drives `renderer` through every page of `plan` and writes the result.
pub fn render_document<W: Write>(
    mut renderer: Box<dyn DocumentRenderer<W>>,
    snapshot: &RenderSnapshot,
    plan: &PagePlan,
    info: &DocumentInfo,
    writer: W,
) -> Result<W, RenderError> {
    renderer.begin_document(info)?;
    let image = renderer.add_snapshot(snapshot)?;
    for slice in &plan.slices {
        renderer.render_page(image, plan, slice)?;
    }
    renderer.finish(writer)
}
