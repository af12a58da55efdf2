use super::parse_json;
use crate::error::Result;
use crate::export::{content_disposition, decode_snapshot_base64};
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderName, HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use serde::Deserialize;

pub const PAGE_COUNT_HEADER: &str = "x-page-count";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub trip_name: Option<String>,
    pub snapshot_base64: Option<String>,
}

/// Synchronous export endpoint
/// Returns the paginated PDF as a download
pub async fn export_pdf(State(state): State<AppState>, body: Bytes) -> Result<impl IntoResponse> {
    let request: ExportRequest = parse_json(&body)?;
    let image = decode_snapshot_base64(request.snapshot_base64.as_deref())?;
    let trip_name = request.trip_name.unwrap_or_default();

    let _permit = state.export_permit()?;
    let document = state.exporter.export_blocking(image, trip_name).await?;

    tracing::info!(
        "Export completed: {} ({} page(s), {} bytes)",
        document.filename,
        document.page_count,
        document.bytes.len()
    );

    let disposition = HeaderValue::from_str(&content_disposition(&document.filename))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment; filename=\"trip_itinerary.pdf\""));

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (header::CONTENT_DISPOSITION, disposition),
            (
                HeaderName::from_static(PAGE_COUNT_HEADER),
                HeaderValue::from(document.page_count),
            ),
        ],
        document.bytes,
    ))
}
