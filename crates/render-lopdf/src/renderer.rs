use crate::helpers;
use lopdf::{Document, Object, ObjectId, dictionary};
use std::io::Write;
use wayfare_render_core::{DocumentInfo, DocumentRenderer, ImageHandle, RenderError, RenderSnapshot};
use wayfare_types::{PagePlan, PageSlice};

/// An in-memory PDF renderer using the `lopdf` library.
/// It builds the document's object graph and then writes it to the output stream.
pub struct LopdfRenderer {
    document: Document,
    pages_id: ObjectId,
    resources_id: ObjectId,
    page_ids: Vec<ObjectId>,
    images: Vec<(String, ObjectId)>,
    started: bool,
}

impl LopdfRenderer {
    pub fn new() -> Self {
        let mut document = Document::with_version("1.7");
        let pages_id = document.new_object_id();
        let resources_id = document.new_object_id();

        Self {
            document,
            pages_id,
            resources_id,
            page_ids: Vec::new(),
            images: Vec::new(),
            started: false,
        }
    }

    fn image_name(&self, handle: ImageHandle) -> Result<&str, RenderError> {
        self.images
            .iter()
            .find(|(_, id)| *id == handle)
            .map(|(name, _)| name.as_str())
            .ok_or_else(|| RenderError::Other(format!("unknown image handle {:?}", handle)))
    }

    fn ensure_started(&self) -> Result<(), RenderError> {
        if self.started {
            Ok(())
        } else {
            Err(RenderError::Other("Document not started".into()))
        }
    }
}

impl Default for LopdfRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> DocumentRenderer<W> for LopdfRenderer {
    fn begin_document(&mut self, info: &DocumentInfo) -> Result<(), RenderError> {
        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![],
            "Count" => 0,
        };
        self.document
            .objects
            .insert(self.pages_id, Object::Dictionary(pages_dict));

        let catalog_dict = dictionary! { "Type" => "Catalog", "Pages" => self.pages_id };
        let catalog_id = self.document.add_object(catalog_dict);
        self.document.trailer.set("Root", catalog_id);

        let mut info_dict = dictionary! {
            "Producer" => lopdf::text_string(&info.producer),
        };
        if let Some(title) = &info.title {
            // UTF-16BE with a BOM unless plain ASCII
            info_dict.set("Title", lopdf::text_string(title));
        }
        let info_id = self.document.add_object(info_dict);
        self.document.trailer.set("Info", info_id);

        self.started = true;
        Ok(())
    }

    fn add_snapshot(&mut self, snapshot: &RenderSnapshot) -> Result<ImageHandle, RenderError> {
        self.ensure_started()?;
        let stream = helpers::image_xobject(snapshot)?;
        let image_id = self.document.add_object(stream);
        let name = format!("Im{}", self.images.len() + 1);
        log::debug!(
            "Embedded {}x{} snapshot as /{}",
            snapshot.width(),
            snapshot.height(),
            name
        );
        self.images.push((name, image_id));
        Ok(image_id)
    }

    fn render_page(
        &mut self,
        image: ImageHandle,
        plan: &PagePlan,
        slice: &PageSlice,
    ) -> Result<(), RenderError> {
        self.ensure_started()?;
        let name = self.image_name(image)?;
        let content = helpers::band_content(name, plan, slice);
        let encoded = content.encode()?;
        let content_stream = lopdf::Stream::new(
            dictionary! {"Filter" => "FlateDecode"},
            helpers::compress(&encoded)?,
        );
        let content_id = self.document.add_object(content_stream);

        let page_dict = dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), plan.page.width.into(), plan.page.height.into()],
            "Contents" => content_id,
            "Resources" => self.resources_id,
        };
        let page_id = self.document.add_object(page_dict);
        self.page_ids.push(page_id);
        Ok(())
    }

    fn finish(mut self: Box<Self>, mut writer: W) -> Result<W, RenderError> {
        self.ensure_started()?;

        let mut xobjects = lopdf::Dictionary::new();
        for (name, id) in &self.images {
            xobjects.set(name.as_bytes(), Object::Reference(*id));
        }
        self.document.objects.insert(
            self.resources_id,
            Object::Dictionary(dictionary! { "XObject" => xobjects }),
        );

        if let Some(Object::Dictionary(pages_dict)) = self.document.objects.get_mut(&self.pages_id) {
            let kids: Vec<Object> = self.page_ids.iter().map(|id| Object::from(*id)).collect();
            pages_dict.set("Kids", kids);
            pages_dict.set("Count", self.page_ids.len() as i32);
        }

        self.document.save_to(&mut writer)?;
        log::debug!("Wrote PDF with {} page(s)", self.page_ids.len());
        Ok(writer)
    }
}
