use crate::MailError;
use crate::job::{EmailJob, SentEmail};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment as MimeAttachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_FROM: &str = "\"DreamWeaver Trips\" <no-reply@dreamweaver.com>";

/// Anything that can deliver an [`EmailJob`].
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, job: &EmailJob) -> Result<SentEmail, MailError>;

    /// Short transport name for logs.
    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TlsMode {
    /// Plain connection upgraded with STARTTLS (port 587).
    #[default]
    StartTls,
    /// Implicit TLS (port 465).
    Tls,
    /// No encryption. Local relays only.
    None,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_from")]
    pub from: String,
    #[serde(default)]
    pub tls: TlsMode,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_port() -> u16 {
    587
}

fn default_from() -> String {
    DEFAULT_FROM.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            username: String::new(),
            password: String::new(),
            from: default_from(),
            tls: TlsMode::default(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl MailerConfig {
    /// Applies the conventional `SMTP_*` variables from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.overlay(|key| std::env::var(key).ok())
    }

    /// Applies `SMTP_*` overrides from `lookup`. Empty values are ignored and
    /// an unparsable port keeps the current one.
    pub fn overlay(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(host) = get("SMTP_HOST") {
            self.host = host;
        }
        if let Some(port) = get("SMTP_PORT").and_then(|p| p.trim().parse().ok()) {
            self.port = port;
        }
        if let Some(user) = get("SMTP_USER") {
            self.username = user;
        }
        if let Some(pass) = get("SMTP_PASS") {
            self.password = pass;
        }
        if let Some(from) = get("SMTP_FROM") {
            self.from = from;
        }
        self
    }
}

/// Sends jobs through an async SMTP connection pool.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &MailerConfig) -> Result<Self, MailError> {
        if config.host.trim().is_empty() {
            return Err(MailError::MissingConfig("mail.host".into()));
        }
        let from = parse_mailbox(&config.from)?;

        let builder = match config.tls {
            TlsMode::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .map_err(|e| MailError::Smtp(e.to_string()))?,
            TlsMode::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(|e| MailError::Smtp(e.to_string()))?,
            TlsMode::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host),
        };

        let mut builder = builder
            .port(config.port)
            .timeout(Some(Duration::from_secs(config.timeout_secs)));
        if !config.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ));
        }

        log::info!(
            "SMTP mailer configured for {}:{} ({:?})",
            config.host,
            config.port,
            config.tls
        );

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    /// Builds the MIME message and its `Message-ID`.
    pub fn build_message(&self, job: &EmailJob) -> Result<(Message, String), MailError> {
        build_message(&self.from, job)
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, job: &EmailJob) -> Result<SentEmail, MailError> {
        job.validate()?;
        let (message, message_id) = self.build_message(job)?;

        log::info!("Sending email to {} via SMTP", job.to);
        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::Smtp(e.to_string()))?;
        log::info!("Email sent successfully: {}", message_id);

        Ok(SentEmail { message_id })
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}

pub(crate) fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address
        .trim()
        .parse::<Mailbox>()
        .map_err(|e| MailError::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        })
}

pub(crate) fn new_message_id(from: &Mailbox) -> String {
    format!("<{}@{}>", uuid::Uuid::new_v4(), from.email.domain())
}

pub(crate) fn build_message(from: &Mailbox, job: &EmailJob) -> Result<(Message, String), MailError> {
    let to = parse_mailbox(&job.to)?;
    let message_id = new_message_id(from);

    let builder = Message::builder()
        .from(from.clone())
        .to(to)
        .subject(job.subject.clone())
        .message_id(Some(message_id.clone()));

    let html = SinglePart::html(job.html.clone());
    let message = match &job.attachment {
        Some(attachment) => {
            let bytes = attachment.decode()?;
            let content_type = ContentType::parse(&attachment.content_type)
                .map_err(|e| MailError::InvalidAttachment(e.to_string()))?;
            let part = MimeAttachment::new(attachment.filename.clone()).body(bytes, content_type);
            builder.multipart(MultiPart::mixed().singlepart(html).singlepart(part))
        }
        None => builder.singlepart(html),
    }
    .map_err(|e| MailError::Build(e.to_string()))?;

    Ok((message, message_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::Attachment;
    use std::collections::HashMap;

    fn formatted(job: &EmailJob) -> String {
        let from = parse_mailbox(DEFAULT_FROM).unwrap();
        let (message, _) = build_message(&from, job).unwrap();
        String::from_utf8_lossy(&message.formatted()).into_owned()
    }

    #[test]
    fn test_defaults_follow_gmail_starttls() {
        let config = MailerConfig::default();
        assert_eq!(config.host, "smtp.gmail.com");
        assert_eq!(config.port, 587);
        assert_eq!(config.tls, TlsMode::StartTls);
        assert_eq!(config.from, DEFAULT_FROM);
    }

    #[test]
    fn test_env_overlay() {
        let env: HashMap<&str, &str> = [
            ("SMTP_HOST", "mail.example.org"),
            ("SMTP_PORT", "2525"),
            ("SMTP_USER", "relay"),
            ("SMTP_PASS", ""),
        ]
        .into_iter()
        .collect();

        let config = MailerConfig::default().overlay(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.host, "mail.example.org");
        assert_eq!(config.port, 2525);
        assert_eq!(config.username, "relay");
        assert_eq!(config.password, "");
        assert_eq!(config.from, DEFAULT_FROM);
    }

    #[test]
    fn test_bad_port_is_ignored() {
        let config = MailerConfig::default().overlay(|k| (k == "SMTP_PORT").then(|| "abc".into()));
        assert_eq!(config.port, 587);
    }

    #[test]
    fn test_message_without_attachment_is_single_part() {
        let job = EmailJob::new("friend@example.com", "Trip", "<h1>Hello</h1>");
        let raw = formatted(&job);
        assert!(raw.contains("Subject: Trip"));
        assert!(raw.contains("Content-Type: text/html"));
        assert!(!raw.contains("multipart/mixed"));
        assert!(!raw.contains("Content-Disposition: attachment"));
    }

    #[test]
    fn test_message_with_attachment() {
        let job = EmailJob::new("friend@example.com", "Trip", "<h1>Hello</h1>")
            .with_attachment(Attachment::pdf_bytes("Goa_Trip_Itinerary.pdf", b"%PDF-1.7"));
        let raw = formatted(&job);
        assert!(raw.contains("multipart/mixed"));
        assert_eq!(raw.matches("Content-Disposition: attachment").count(), 1);
        assert!(raw.contains("Goa_Trip_Itinerary.pdf"));
        assert!(raw.contains("application/pdf"));
    }

    #[test]
    fn test_message_id_uses_sender_domain() {
        let from = parse_mailbox(DEFAULT_FROM).unwrap();
        let job = EmailJob::new("friend@example.com", "", "");
        let (message, id) = build_message(&from, &job).unwrap();
        assert!(id.starts_with('<'));
        assert!(id.ends_with("@dreamweaver.com>"));
        let raw = String::from_utf8_lossy(&message.formatted()).into_owned();
        assert!(raw.contains(&id));
    }

    #[test]
    fn test_invalid_recipient() {
        let from = parse_mailbox(DEFAULT_FROM).unwrap();
        let job = EmailJob::new("not an address", "", "");
        assert!(matches!(
            build_message(&from, &job),
            Err(MailError::InvalidAddress { .. })
        ));
    }

    #[tokio::test]
    async fn test_smtp_mailer_rejects_missing_recipient_before_connecting() {
        let config = MailerConfig {
            host: "127.0.0.1".into(),
            port: 1,
            tls: TlsMode::None,
            ..MailerConfig::default()
        };
        let mailer = SmtpMailer::new(&config).unwrap();
        let err = mailer.send(&EmailJob::new("", "s", "h")).await.unwrap_err();
        assert!(matches!(err, MailError::MissingRecipient));
    }

    #[tokio::test]
    async fn test_unreachable_server_reports_smtp_error() {
        let config = MailerConfig {
            host: "127.0.0.1".into(),
            port: 1,
            tls: TlsMode::None,
            timeout_secs: 2,
            ..MailerConfig::default()
        };
        let mailer = SmtpMailer::new(&config).unwrap();
        let err = mailer
            .send(&EmailJob::new("friend@example.com", "s", "h"))
            .await
            .unwrap_err();
        assert!(matches!(err, MailError::Smtp(_)));
        assert!(!err.to_string().is_empty());
    }
}
