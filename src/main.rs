use anyhow::Context;
use std::sync::Arc;
use wayfare::{
    api,
    backend::BackendClient,
    config::{Config, MailTransport},
    itinerary::EmailTemplates,
    state::AppState,
    telemetry,
};
use wayfare_mail::{Mailer, MemoryMailer, SmtpMailer};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    telemetry::init_tracing(config.log.format);

    tracing::info!("Starting wayfare...");

    let mailer = build_mailer(&config)?;
    tracing::info!("Mail transport: {}", mailer.name());

    let backend = if config.backend_enabled() {
        let client = BackendClient::new(&config.backend).context("Failed to build backend client")?;
        tracing::info!("Backend: {}", config.backend.url);
        Some(client)
    } else {
        tracing::warn!("backend.url is empty; trip summary and community routes will return 503");
        None
    };

    if config.api_key().is_none() {
        tracing::warn!("server.api_key is not set; /api/v1 routes are open");
    }

    let addr = config.bind_address();
    let templates = EmailTemplates::new().context("Failed to register email templates")?;
    let state = AppState::new(config, mailer, backend, templates);
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("wayfare listening on {}", addr);
    tracing::info!("Endpoints:");
    tracing::info!("  - POST /functions/v1/send-trip-email (mail relay)");
    tracing::info!("  - POST /api/v1/email");
    tracing::info!("  - POST /api/v1/export");
    tracing::info!("  - POST /api/v1/trips/share");
    tracing::info!("  - GET  /api/v1/trips/{{id}}/summary");
    tracing::info!("  - GET  /api/v1/community/posts");
    tracing::info!("  - GET  /health");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shut down cleanly");
    Ok(())
}

fn build_mailer(config: &Config) -> anyhow::Result<Arc<dyn Mailer>> {
    let mailer: Arc<dyn Mailer> = match config.mail.transport {
        MailTransport::Smtp => Arc::new(
            SmtpMailer::new(&config.mailer_config()).context("Failed to configure SMTP transport")?,
        ),
        MailTransport::Log => Arc::new(
            MemoryMailer::new(&config.mail.from)
                .context("Invalid mail.from address")?
                .with_retained(0),
        ),
    };
    Ok(mailer)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
