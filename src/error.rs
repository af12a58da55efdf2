use crate::backend::BackendError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use wayfare_mail::MailError;
use wayfare_render_core::RenderError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Mail(#[from] MailError),

    #[error("Export failed: {0}")]
    Export(#[from] RenderError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Backend is not configured")]
    BackendDisabled,

    #[error("Service overloaded, please try again later")]
    ServiceOverloaded,

    #[error("Email template failed: {0}")]
    Template(#[from] handlebars::RenderError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            // Everything past recipient validation is one "send failed" path.
            Self::Mail(MailError::MissingRecipient) => StatusCode::BAD_REQUEST,
            Self::Mail(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Export(err) => match err {
                RenderError::TemplateNotFound
                | RenderError::InvalidSnapshot(_)
                | RenderError::InvalidGeometry(_) => StatusCode::BAD_REQUEST,
                RenderError::TooManyPages { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Backend(BackendError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Backend(_) => StatusCode::BAD_GATEWAY,
            Self::BackendDisabled | Self::ServiceOverloaded => StatusCode::SERVICE_UNAVAILABLE,
            Self::Template(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }

        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ServiceError::Mail(MailError::MissingRecipient).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::Mail(MailError::Smtp("timeout".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ServiceError::Export(RenderError::TemplateNotFound).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::Export(RenderError::TooManyPages { pages: 9, limit: 2 }).status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            ServiceError::Backend(BackendError::NotFound {
                table: "trips".into()
            })
            .status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_mail_error_text_is_surfaced() {
        let err = ServiceError::Mail(MailError::Smtp("535 bad credentials".into()));
        assert_eq!(err.to_string(), "SMTP error: 535 bad credentials");
    }
}
