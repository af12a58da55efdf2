use serde::Deserialize;
use std::path::{Path, PathBuf};
use wayfare_mail::{MailerConfig, TlsMode};
use wayfare_types::PageSize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub mail: MailConfig,
    pub export: ExportConfig,
    pub backend: BackendConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_request_size_mb: usize,
    /// When set, `/api/v1/*` requires this key.
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailTransport {
    Smtp,
    /// Keep messages in memory and log them.
    Log,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub transport: MailTransport,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
    pub tls: TlsMode,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    pub page_size: String,
    pub max_pages: usize,
    pub max_concurrent: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Project URL of the hosted backend. Empty disables backend features.
    pub url: String,
    pub anon_key: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    pub format: LogFormat,
}

const DEFAULT_CONFIG_FILE: &str = "config/default";

impl Config {
    /// Loads defaults, then the config file, then `WAYFARE__*` environment
    /// variables, then the conventional `SMTP_*` variables.
    ///
    /// The file is `$WAYFARE_CONFIG` if set, otherwise `config/default.toml`
    /// when it exists.
    pub fn load() -> Result<Self, config::ConfigError> {
        let file = std::env::var("WAYFARE_CONFIG")
            .ok()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .or_else(|| {
                let default = PathBuf::from(format!("{}.toml", DEFAULT_CONFIG_FILE));
                default.exists().then_some(default)
            });

        let mut builder = Self::defaults()?;
        if let Some(path) = &file {
            builder = builder.add_source(config::File::from(path.as_path()));
        }
        builder = builder.add_source(
            config::Environment::with_prefix("WAYFARE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let mut config: Config = builder.build()?.try_deserialize()?;
        config.apply_smtp_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Loads from a config file only, without consulting the environment.
    pub fn from_file(path: &Path) -> Result<Self, config::ConfigError> {
        let config: Config = Self::defaults()?
            .add_source(config::File::from(path))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Parses TOML on top of the defaults.
    pub fn from_toml_str(toml: &str) -> Result<Self, config::ConfigError> {
        let config: Config = Self::defaults()?
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        let mail = MailerConfig::default();
        config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000_i64)?
            .set_default("server.max_request_size_mb", 25_i64)?
            .set_default("mail.transport", "smtp")?
            .set_default("mail.host", mail.host)?
            .set_default("mail.port", mail.port as i64)?
            .set_default("mail.username", mail.username)?
            .set_default("mail.password", mail.password)?
            .set_default("mail.from", mail.from)?
            .set_default("mail.tls", "starttls")?
            .set_default("mail.timeout_secs", mail.timeout_secs as i64)?
            .set_default("export.page_size", "a4")?
            .set_default("export.max_pages", wayfare_render_core::DEFAULT_MAX_PAGES as i64)?
            .set_default("export.max_concurrent", 4_i64)?
            .set_default("backend.url", "")?
            .set_default("backend.anon_key", "")?
            .set_default("backend.timeout_secs", 15_i64)?
            .set_default("log.format", "text")
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        self.page_size()?;
        if self.export.max_pages == 0 {
            return Err(config::ConfigError::Message(
                "export.max_pages must be at least 1".into(),
            ));
        }
        if self.export.max_concurrent == 0 {
            return Err(config::ConfigError::Message(
                "export.max_concurrent must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub(crate) fn apply_smtp_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let merged = self.mailer_config().overlay(lookup);
        self.mail.host = merged.host;
        self.mail.port = merged.port;
        self.mail.username = merged.username;
        self.mail.password = merged.password;
        self.mail.from = merged.from;
    }

    pub fn page_size(&self) -> Result<PageSize, config::ConfigError> {
        self.export
            .page_size
            .parse()
            .map_err(config::ConfigError::Message)
    }

    pub fn mailer_config(&self) -> MailerConfig {
        MailerConfig {
            host: self.mail.host.clone(),
            port: self.mail.port,
            username: self.mail.username.clone(),
            password: self.mail.password.clone(),
            from: self.mail.from.clone(),
            tls: self.mail.tls,
            timeout_secs: self.mail.timeout_secs,
        }
    }

    pub fn backend_enabled(&self) -> bool {
        !self.backend.url.trim().is_empty()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn max_request_bytes(&self) -> usize {
        self.server.max_request_size_mb * 1024 * 1024
    }

    /// The API key, treating an empty string as unset.
    pub fn api_key(&self) -> Option<&str> {
        self.server
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
    }
}
