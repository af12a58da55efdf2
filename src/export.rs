//! Snapshot export: decode, plan, render to an in-memory PDF.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use wayfare_render_core::{
    DocumentInfo, RenderError, RenderSnapshot, plan_pages, render_document,
};
use wayfare_render_lopdf::LopdfRenderer;
use wayfare_types::PageSize;

const FALLBACK_FILENAME_STEM: &str = "trip";

/// A finished export, ready to download or attach.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportDocument {
    pub bytes: Vec<u8>,
    pub page_count: usize,
    pub filename: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Exporter {
    page: PageSize,
    max_pages: usize,
}

impl Exporter {
    pub fn new(page: PageSize, max_pages: usize) -> Self {
        Self { page, max_pages }
    }

    /// Renders `image` (PNG or JPEG bytes) into a paginated PDF.
    ///
    /// Nothing is written unless the whole document renders.
    pub fn export(&self, image: &[u8], trip_name: &str) -> Result<ExportDocument, RenderError> {
        let snapshot = RenderSnapshot::decode(image)?;
        let plan = plan_pages(snapshot.size(), self.page, self.max_pages)?;

        let title = trip_name.trim();
        let info = DocumentInfo {
            title: (!title.is_empty()).then(|| title.to_string()),
            ..DocumentInfo::default()
        };

        let bytes = render_document(
            Box::new(LopdfRenderer::new()),
            &snapshot,
            &plan,
            &info,
            Vec::new(),
        )?;

        tracing::debug!(
            "Exported {}x{} snapshot ({:.1}pt tall at page width) to {} page(s), {} bytes",
            snapshot.width(),
            snapshot.height(),
            plan.scaled_height(),
            plan.page_count(),
            bytes.len()
        );

        Ok(ExportDocument {
            bytes,
            page_count: plan.page_count(),
            filename: export_filename(trip_name),
        })
    }

    /// Runs [`Exporter::export`] on the blocking pool.
    pub async fn export_blocking(
        &self,
        image: Vec<u8>,
        trip_name: String,
    ) -> Result<ExportDocument, RenderError> {
        let exporter = *self;
        tokio::task::spawn_blocking(move || exporter.export(&image, &trip_name))
            .await
            .map_err(|e| RenderError::Other(format!("export task failed: {}", e)))?
    }
}

/// Decodes the snapshot payload of a request. Accepts a bare base64 string or
/// a `data:<mime>;base64,` URL. An absent or empty payload is
/// `TemplateNotFound`.
pub fn decode_snapshot_base64(payload: Option<&str>) -> Result<Vec<u8>, RenderError> {
    let payload = payload.map(str::trim).unwrap_or_default();
    let encoded = match payload.strip_prefix("data:") {
        Some(rest) => rest
            .split_once(',')
            .map(|(_, data)| data)
            .ok_or_else(|| RenderError::InvalidSnapshot("malformed data URL".into()))?,
        None => payload,
    };
    if encoded.is_empty() {
        return Err(RenderError::TemplateNotFound);
    }

    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| RenderError::InvalidSnapshot(format!("invalid base64: {}", e)))
}

/// `<trip name>_itinerary.pdf`, safe for a `Content-Disposition` header.
pub fn export_filename(trip_name: &str) -> String {
    let mut stem = String::with_capacity(trip_name.len());
    let mut in_space = false;
    for ch in trip_name.trim().chars() {
        if ch.is_whitespace() {
            if !in_space {
                stem.push('_');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        if ch.is_control() || matches!(ch, '"' | '\\' | '/') {
            continue;
        }
        stem.push(ch);
    }
    if stem.is_empty() {
        stem.push_str(FALLBACK_FILENAME_STEM);
    }
    format!("{}_itinerary.pdf", stem)
}

/// `Content-Disposition` value for a download. Non-ASCII names get an
/// ASCII `filename` plus an RFC 5987 `filename*`.
pub fn content_disposition(filename: &str) -> String {
    if filename.is_ascii() {
        return format!("attachment; filename=\"{}\"", filename);
    }
    let fallback: String = filename
        .chars()
        .map(|c| if c.is_ascii() { c } else { '_' })
        .collect();
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(filename)
    )
}
