use super::{non_blank, parse_json};
use crate::error::Result;
use crate::state::AppState;
use axum::{Json, body::Bytes, extract::State};
use serde::{Deserialize, Serialize};
use wayfare_mail::{Attachment, EmailJob, MailError, itinerary_attachment_name};

/// Trip name used for the attachment when the caller sends a PDF without one.
const FALLBACK_TRIP_NAME: &str = "Trip";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailRequest {
    pub email: Option<String>,
    pub subject: Option<String>,
    pub html: Option<String>,
    pub trip_name: Option<String>,
    pub pdf_base64: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailResponse {
    pub message: &'static str,
    pub message_id: String,
}

impl EmailRequest {
    /// The job to send. Fails before any transport work when the recipient
    /// is missing.
    pub fn into_job(self) -> std::result::Result<EmailJob, MailError> {
        let to = non_blank(self.email.as_deref())
            .ok_or(MailError::MissingRecipient)?
            .to_string();

        let mut job = EmailJob::new(
            to,
            self.subject.unwrap_or_default(),
            self.html.unwrap_or_default(),
        );
        if let Some(pdf) = non_blank(self.pdf_base64.as_deref()) {
            let trip_name = self.trip_name.as_deref().unwrap_or(FALLBACK_TRIP_NAME);
            job = job.with_attachment(Attachment::pdf(itinerary_attachment_name(trip_name), pdf));
        }
        Ok(job)
    }
}

/// Mail relay endpoint
///
/// Forwards one message to the configured transport and reports the
/// transport's message id.
pub async fn send_trip_email(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<EmailResponse>> {
    let request: EmailRequest = parse_json(&body)?;
    let job = request.into_job()?;

    tracing::info!(
        "Sending email to {} via {} ({} attachment(s))",
        job.to,
        state.mailer.name(),
        job.attachment_count()
    );
    let sent = state.mailer.send(&job).await?;
    tracing::info!("Email sent successfully: {}", sent.message_id);

    Ok(Json(EmailResponse {
        message: "Email sent",
        message_id: sent.message_id,
    }))
}
