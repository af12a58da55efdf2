//! Outbound email for the trip relay.
//!
//! An [`EmailJob`] is a single fire-and-forget message: one recipient, a
//! subject, an HTML body and at most one base64-encoded attachment. Jobs are
//! handed to a [`Mailer`]; there is no retry and no delivery tracking.
//!
//! # Transports
//!
//! | Mailer | Use |
//! |--------|-----|
//! | [`SmtpMailer`] | lettre async SMTP, configured by [`MailerConfig`] |
//! | [`MemoryMailer`] | logs jobs and keeps the most recent in memory |
//!
//! # Environment Variables
//!
//! [`MailerConfig::with_env_overrides`] reads:
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `SMTP_HOST` | SMTP server hostname |
//! | `SMTP_PORT` | Port (default: 587) |
//! | `SMTP_USER` | Username for authentication |
//! | `SMTP_PASS` | Password for authentication |
//! | `SMTP_FROM` | Sender mailbox |

mod job;
mod mailer;
mod memory;

pub use job::{Attachment, EmailJob, SentEmail, itinerary_attachment_name};
pub use mailer::{DEFAULT_FROM, Mailer, MailerConfig, SmtpMailer, TlsMode};
pub use memory::MemoryMailer;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Recipient email is required")]
    MissingRecipient,

    #[error("missing required config: {0}")]
    MissingConfig(String),

    #[error("invalid email address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("invalid attachment: {0}")]
    InvalidAttachment(String),

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("SMTP error: {0}")]
    Smtp(String),
}
