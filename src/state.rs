use crate::backend::BackendClient;
use crate::config::Config;
use crate::error::ServiceError;
use crate::export::Exporter;
use crate::itinerary::EmailTemplates;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use wayfare_mail::Mailer;

/// Shared application state accessible to all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,

    /// Outbound mail transport
    pub mailer: Arc<dyn Mailer>,

    /// `None` when no backend URL is configured
    pub backend: Option<Arc<BackendClient>>,

    pub exporter: Exporter,

    pub templates: Arc<EmailTemplates>,

    /// Limits concurrent exports
    pub export_semaphore: Arc<Semaphore>,
}

impl AppState {
    pub fn new(
        config: Config,
        mailer: Arc<dyn Mailer>,
        backend: Option<BackendClient>,
        templates: EmailTemplates,
    ) -> Self {
        let export_semaphore = Arc::new(Semaphore::new(config.export.max_concurrent));
        let exporter = Exporter::new(
            config.page_size().unwrap_or_default(),
            config.export.max_pages,
        );

        Self {
            config: Arc::new(config),
            mailer,
            backend: backend.map(Arc::new),
            exporter,
            templates: Arc::new(templates),
            export_semaphore,
        }
    }

    pub fn backend(&self) -> Result<&BackendClient, ServiceError> {
        self.backend.as_deref().ok_or(ServiceError::BackendDisabled)
    }

    /// A slot for one export, or `ServiceOverloaded` when all are taken.
    pub fn export_permit(&self) -> Result<OwnedSemaphorePermit, ServiceError> {
        self.export_semaphore
            .clone()
            .try_acquire_owned()
            .map_err(|_| ServiceError::ServiceOverloaded)
    }
}
