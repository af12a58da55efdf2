//! Wayfare command-line client
//!
//! Renders itinerary PDFs locally and talks to a running relay.
//!
//! # Usage
//!
//! ```bash
//! # Paginate a snapshot into a PDF
//! wayfare-cli export itinerary.png --trip-name "Summer in Rome" --out rome.pdf
//!
//! # Send an email through the relay, optionally attaching a PDF
//! wayfare-cli send friend@example.com --trip-name "Summer in Rome" --pdf rome.pdf
//!
//! # Health check
//! wayfare-cli health
//! ```

use anyhow::{Context, bail};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use clap::{Parser, Subcommand};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;
use wayfare::api::RELAY_PATH;
use wayfare::export::Exporter;
use wayfare::itinerary::{EmailTemplates, share_subject};
use wayfare_render_core::DEFAULT_MAX_PAGES;
use wayfare_types::PageSize;

#[derive(Parser)]
#[command(name = "wayfare-cli")]
#[command(about = "Wayfare itinerary export and mail relay client")]
struct Cli {
    /// Service base URL
    #[arg(long, default_value = "http://localhost:3000", env = "WAYFARE_URL")]
    api_base: String,

    /// Request timeout in seconds
    #[arg(long, default_value = "30")]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a snapshot image into a paginated PDF
    Export {
        /// PNG or JPEG snapshot
        image: PathBuf,

        #[arg(long, default_value = "")]
        trip_name: String,

        /// Output path; defaults to `<trip name>_itinerary.pdf`
        #[arg(long)]
        out: Option<PathBuf>,

        /// `a4` or `letter`
        #[arg(long, default_value = "a4")]
        page_size: PageSize,

        #[arg(long, default_value_t = DEFAULT_MAX_PAGES)]
        max_pages: usize,
    },

    /// Send an email through the relay
    Send {
        /// Recipient address
        email: String,

        #[arg(long, default_value = "Trip")]
        trip_name: String,

        /// Subject; defaults to `<trip name> - Trip Itinerary`
        #[arg(long)]
        subject: Option<String>,

        /// PDF to attach
        #[arg(long)]
        pdf: Option<PathBuf>,
    },

    /// Run health check
    Health,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RelayRequest {
    email: String,
    subject: String,
    html: String,
    trip_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pdf_base64: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = Client::builder()
        .timeout(Duration::from_secs(cli.timeout))
        .build()?;

    match cli.command {
        Commands::Export {
            image,
            trip_name,
            out,
            page_size,
            max_pages,
        } => {
            let bytes = tokio::fs::read(&image)
                .await
                .with_context(|| format!("Failed to read {}", image.display()))?;
            let document = Exporter::new(page_size, max_pages)
                .export_blocking(bytes, trip_name)
                .await?;
            let out = out.unwrap_or_else(|| PathBuf::from(&document.filename));
            tokio::fs::write(&out, &document.bytes)
                .await
                .with_context(|| format!("Failed to write {}", out.display()))?;
            println!(
                "[INFO] Wrote {} ({} page(s), {} bytes)",
                out.display(),
                document.page_count,
                document.bytes.len()
            );
        }
        Commands::Send {
            email,
            trip_name,
            subject,
            pdf,
        } => {
            let pdf_base64 = match pdf {
                Some(path) => {
                    let bytes = tokio::fs::read(&path)
                        .await
                        .with_context(|| format!("Failed to read {}", path.display()))?;
                    Some(STANDARD.encode(bytes))
                }
                None => None,
            };
            let html = EmailTemplates::new()?.share_email_html(&trip_name, None)?;
            let request = RelayRequest {
                email,
                subject: subject.unwrap_or_else(|| share_subject(&trip_name)),
                html,
                trip_name,
                pdf_base64,
            };

            let url = format!("{}{}", cli.api_base.trim_end_matches('/'), RELAY_PATH);
            let response = client.post(&url).json(&request).send().await?;
            let status = response.status();
            let body: Value = response.json().await.unwrap_or(Value::Null);
            if !status.is_success() {
                bail!("Relay returned {}: {}", status, body["error"]);
            }
            println!("[INFO] Email sent: {}", body["messageId"]);
        }
        Commands::Health => {
            let url = format!("{}/health", cli.api_base.trim_end_matches('/'));
            let response = client.get(&url).send().await?;
            let status = response.status();
            let body: Value = response.json().await.unwrap_or(Value::Null);
            if !status.is_success() {
                bail!("Health check failed: {}", status);
            }
            println!("[INFO] Health check passed: {}", body);
        }
    }

    Ok(())
}
