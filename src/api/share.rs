use super::{non_blank, parse_json};
use crate::backend::TripRepository;
use crate::error::{Result, ServiceError};
use crate::export::decode_snapshot_base64;
use crate::itinerary::{TripSummary, share_subject};
use crate::state::AppState;
use axum::{Json, body::Bytes, extract::State};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wayfare_mail::{Attachment, EmailJob, MailError, itinerary_attachment_name};

const FALLBACK_TRIP_NAME: &str = "Trip";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRequest {
    pub email: Option<String>,
    pub trip_name: Option<String>,
    pub snapshot_base64: Option<String>,
    pub trip_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareResponse {
    pub message: &'static str,
    pub message_id: String,
    pub pages: usize,
}

/// Exports the snapshot and mails it as the itinerary attachment.
pub async fn share_trip(State(state): State<AppState>, body: Bytes) -> Result<Json<ShareResponse>> {
    let request: ShareRequest = parse_json(&body)?;
    let to = non_blank(request.email.as_deref())
        .ok_or(MailError::MissingRecipient)?
        .to_string();
    let trip_name = non_blank(request.trip_name.as_deref())
        .unwrap_or(FALLBACK_TRIP_NAME)
        .to_string();
    let trip_id = non_blank(request.trip_id.as_deref())
        .map(|id| {
            Uuid::parse_str(id)
                .map_err(|e| ServiceError::InvalidRequest(format!("invalid tripId '{}': {}", id, e)))
        })
        .transpose()?;

    let image = decode_snapshot_base64(request.snapshot_base64.as_deref())?;

    let summary = match (trip_id, state.backend.as_deref()) {
        (Some(id), Some(client)) => {
            let bundle = TripRepository::new(client).load_bundle(id).await?;
            Some(TripSummary::from_bundle(&bundle))
        }
        (Some(id), None) => {
            tracing::debug!("Backend disabled, sharing trip {} without summary", id);
            None
        }
        (None, _) => None,
    };

    let document = {
        let _permit = state.export_permit()?;
        state
            .exporter
            .export_blocking(image, trip_name.clone())
            .await?
    };

    let html = state
        .templates
        .share_email_html(&trip_name, summary.as_ref())?;
    let job = EmailJob::new(to, share_subject(&trip_name), html).with_attachment(
        Attachment::pdf_bytes(itinerary_attachment_name(&trip_name), &document.bytes),
    );

    tracing::info!(
        "Sharing '{}' with {} ({} page(s))",
        trip_name,
        job.to,
        document.page_count
    );
    let sent = state.mailer.send(&job).await?;

    Ok(Json(ShareResponse {
        message: "Email sent",
        message_id: sent.message_id,
        pages: document.page_count,
    }))
}
