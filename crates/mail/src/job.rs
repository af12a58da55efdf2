use crate::MailError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// A file attached to an [`EmailJob`], carried base64-encoded as received.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub content_base64: String,
}

impl Attachment {
    pub fn pdf(filename: impl Into<String>, content_base64: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            content_type: PDF_CONTENT_TYPE.to_string(),
            content_base64: content_base64.into(),
        }
    }

    /// Encodes raw bytes as a PDF attachment.
    pub fn pdf_bytes(filename: impl Into<String>, bytes: &[u8]) -> Self {
        Self::pdf(filename, STANDARD.encode(bytes))
    }

    /// Decodes the payload. Whitespace (line-wrapped base64) is ignored.
    pub fn decode(&self) -> Result<Vec<u8>, MailError> {
        let compact: String = self
            .content_base64
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| MailError::InvalidAttachment(format!("{}: {}", self.filename, e)))
    }
}

/// One outbound message.
#[derive(Debug, Clone, PartialEq)]
pub struct EmailJob {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub attachment: Option<Attachment>,
}

impl EmailJob {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            html: html.into(),
            attachment: None,
        }
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    /// Only the recipient is required; every other field is sent as given.
    pub fn validate(&self) -> Result<(), MailError> {
        if self.to.trim().is_empty() {
            return Err(MailError::MissingRecipient);
        }
        Ok(())
    }

    pub fn attachment_count(&self) -> usize {
        usize::from(self.attachment.is_some())
    }
}

/// Result of a successful send.
#[derive(Debug, Clone, PartialEq)]
pub struct SentEmail {
    pub message_id: String,
}

/// `<trip name>_Itinerary.pdf`, with every whitespace run replaced by `_`.
pub fn itinerary_attachment_name(trip_name: &str) -> String {
    format!("{}_Itinerary.pdf", underscore_whitespace(trip_name))
}

pub(crate) fn underscore_whitespace(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut in_space = false;
    for ch in value.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push('_');
            }
            in_space = true;
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    out
}
