use lopdf::{Document as LopdfDocument, Object};

/// Wrapper around a rendered PDF with helper methods
pub struct GeneratedPdf {
    pub bytes: Vec<u8>,
    pub doc: LopdfDocument,
}

impl GeneratedPdf {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, Box<dyn std::error::Error>> {
        let doc = LopdfDocument::load_mem(&bytes)?;
        Ok(Self { bytes, doc })
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// MediaBox `[x0, y0, x1, y1]` of a 1-based page.
    pub fn media_box(&self, page: u32) -> Vec<f32> {
        let pages = self.doc.get_pages();
        let page_id = pages[&page];
        let dict = self.doc.get_dictionary(page_id).unwrap();
        dict.get(b"MediaBox")
            .unwrap()
            .as_array()
            .unwrap()
            .iter()
            .map(|o| o.as_float().unwrap())
            .collect()
    }

    /// Number of image XObjects stored in the file.
    pub fn image_count(&self) -> usize {
        self.doc
            .objects
            .values()
            .filter(|object| match object {
                Object::Stream(stream) => stream
                    .dict
                    .get(b"Subtype")
                    .and_then(|s| s.as_name())
                    .map(|name| name == b"Image")
                    .unwrap_or(false),
                _ => false,
            })
            .count()
    }
}
