use crate::MailError;
use crate::job::{EmailJob, SentEmail};
use crate::mailer::{Mailer, build_message, parse_mailbox};
use async_trait::async_trait;
use lettre::message::Mailbox;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Recent jobs kept by default.
const DEFAULT_RETAINED: usize = 64;

/// Builds every message exactly as the SMTP path would, then keeps the most
/// recent ones in memory instead of delivering them.
pub struct MemoryMailer {
    from: Mailbox,
    sent: Mutex<VecDeque<EmailJob>>,
    retained: usize,
    failure: Option<String>,
}

impl MemoryMailer {
    pub fn new(from: &str) -> Result<Self, MailError> {
        Ok(Self {
            from: parse_mailbox(from)?,
            sent: Mutex::new(VecDeque::new()),
            retained: DEFAULT_RETAINED,
            failure: None,
        })
    }

    /// Keeps at most `retained` jobs, dropping the oldest. Zero only logs.
    pub fn with_retained(mut self, retained: usize) -> Self {
        self.retained = retained;
        self
    }

    /// A mailer whose transport always fails with `message`.
    pub fn failing(from: &str, message: impl Into<String>) -> Result<Self, MailError> {
        Ok(Self {
            failure: Some(message.into()),
            ..Self::new(from)?
        })
    }

    pub fn sent(&self) -> Vec<EmailJob> {
        self.sent
            .lock()
            .map(|jobs| jobs.iter().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, job: &EmailJob) -> Result<SentEmail, MailError> {
        job.validate()?;
        let (_, message_id) = build_message(&self.from, job)?;

        if let Some(reason) = &self.failure {
            return Err(MailError::Smtp(reason.clone()));
        }

        log::info!(
            "Recorded email to {} ({} attachment(s), subject {:?}): {}",
            job.to,
            job.attachment_count(),
            job.subject,
            message_id
        );
        if self.retained > 0 {
            if let Ok(mut sent) = self.sent.lock() {
                if sent.len() == self.retained {
                    sent.pop_front();
                }
                sent.push_back(job.clone());
            }
        }
        Ok(SentEmail { message_id })
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
