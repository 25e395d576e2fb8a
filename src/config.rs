use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub discogs: DiscogsConfig,
    pub rate_limit: RateLimitConfig,
    pub poller: PollerConfig,
    pub notifications: NotificationsConfig,
    pub scraper: ScraperConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscogsConfig {
    pub api_base_url: String,
    pub username: String,
    pub token: String,
    pub currency: Option<String>,
    pub user_agent: String,
    pub request_timeout: u64,
    /// Substring a list description must contain to be watched.
    pub notify_tag: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub requests: u32,
    pub window_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerConfig {
    /// Pause between cycles. Zero runs cycles back to back.
    pub cycle_delay_ms: u64,
    pub watchlist_retry_attempts: usize,
    pub watchlist_retry_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    pub queue_size: usize,
    pub workers: usize,
    pub to_address: Option<String>,
    pub smtp: SmtpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from_address: Option<String>,
    pub from_name: String,
    /// Upgrade the connection with STARTTLS (port 587).
    pub use_tls: bool,
    /// Open the connection over TLS instead (SMTPS, port 465).
    #[serde(default)]
    pub implicit_tls: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    pub base_url: String,
    pub user_agent: String,
    pub request_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
    pub directory: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default"))
            // Add environment-specific config
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add local config (ignored by git)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables with prefix "WATCHER_"
            .add_source(Environment::with_prefix("WATCHER").separator("__"))
            .build()?;

        Self::finish(s.try_deserialize()?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::from(path))
            .add_source(Environment::with_prefix("WATCHER").separator("__"))
            .build()?;

        Self::finish(s.try_deserialize()?)
    }

    fn finish(mut config: AppConfig) -> Result<Self, ConfigError> {
        config.apply_legacy_env(|name| env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Fill gaps from the variable names used by older `.env` deployments.
    /// Ports always carry a default, so `SMTP_TLS_PORT` and `PORT` override
    /// the configured value instead of filling it.
    fn apply_legacy_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        let var = |name: &str| var(name).filter(|value| !value.is_empty());

        if self.discogs.token.is_empty() {
            if let Some(token) = var("DISCOGS_TOKEN") {
                self.discogs.token = token;
            }
        }

        if self.discogs.username.is_empty() {
            if let Some(username) = var("DISCOGS_USERNAME") {
                self.discogs.username = username;
            }
        }

        if self.discogs.currency.is_none() {
            self.discogs.currency = var("CURRENCY");
        }

        if self.notifications.to_address.is_none() {
            self.notifications.to_address = var("USER_EMAIL");
        }

        let smtp = &mut self.notifications.smtp;
        if smtp.host.is_empty() {
            if let Some(host) = var("SMTP_ADDRESS") {
                smtp.host = host;
            }
        }

        if let Some(port) = var("SMTP_TLS_PORT").and_then(|p| p.parse().ok()) {
            smtp.port = port;
        }

        if smtp.username.is_none() {
            smtp.username = var("SMTP_USERNAME");
        }

        if smtp.password.is_none() {
            smtp.password = var("SMTP_PASSWORD");
        }

        // The SMTP login doubles as the sender address.
        if smtp.from_address.is_none() {
            smtp.from_address = smtp.username.clone();
        }

        if let Some(port) = var("PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }

        if var("VERBOSE").is_some_and(|v| v == "true") {
            self.logging.level = "debug".to_string();
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        // Validate Discogs configuration
        if Url::parse(&self.discogs.api_base_url).is_err() {
            return Err(ConfigError::Message("Invalid discogs.api_base_url format".into()));
        }

        if self.discogs.username.is_empty() {
            return Err(ConfigError::Message("Discogs username must be set".into()));
        }

        if self.discogs.token.is_empty() {
            return Err(ConfigError::Message("Discogs token must be set".into()));
        }

        if self.discogs.notify_tag.is_empty() {
            return Err(ConfigError::Message("Discogs notify_tag cannot be empty".into()));
        }

        // Validate rate limit configuration
        if self.rate_limit.requests == 0 {
            return Err(ConfigError::Message("Rate limit requests must be greater than 0".into()));
        }

        if self.rate_limit.window_secs == 0 {
            return Err(ConfigError::Message("Rate limit window_secs must be greater than 0".into()));
        }

        // Validate notification configuration
        if self.notifications.queue_size == 0 {
            return Err(ConfigError::Message("Notification queue_size must be greater than 0".into()));
        }

        if self.notifications.workers == 0 {
            return Err(ConfigError::Message("Notification workers must be greater than 0".into()));
        }

        if self.notifications.smtp.port == 0 {
            return Err(ConfigError::Message("SMTP port must be greater than 0".into()));
        }

        if self.notifications.smtp.implicit_tls && !self.notifications.smtp.use_tls {
            return Err(ConfigError::Message("SMTP implicit_tls requires use_tls".into()));
        }

        // Validate scraper configuration
        if Url::parse(&self.scraper.base_url).is_err() {
            return Err(ConfigError::Message("Invalid scraper.base_url format".into()));
        }

        // Validate server configuration
        if self.server.enabled && self.server.port == 0 {
            return Err(ConfigError::Message("Server port must be greater than 0".into()));
        }

        if self.metrics.enabled && self.metrics.port == 0 {
            return Err(ConfigError::Message("Metrics port must be greater than 0".into()));
        }

        Ok(())
    }

    /// SMTP is only used when a host, sender and recipient are all known.
    pub fn email_enabled(&self) -> bool {
        !self.notifications.smtp.host.is_empty()
            && self.notifications.smtp.from_address.is_some()
            && self.notifications.to_address.is_some()
    }
}
