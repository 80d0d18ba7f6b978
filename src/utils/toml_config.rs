//! TOML-based configuration for hatch-server
//!
//! This module provides declarative configuration for the HTTP server, the
//! contact-form mail relay and the FAQ rule table via a TOML file
//! (`hatch.toml`).
//!
//! # Hot Reloading
//!
//! Configuration changes are automatically detected and applied at runtime.
//! Use `HatchConfigManager` for thread-safe access to the current configuration
//! and to the FAQ responder built from it.

use crate::faq::{FaqError, FaqResponder};
use arc_swap::ArcSwap;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Root configuration structure loaded from hatch.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HatchConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// SMTP relay for the contact form
    #[serde(default)]
    pub mail: MailConfig,

    /// FAQ rule table for the chat endpoint
    #[serde(default)]
    pub faq: FaqConfig,
}

// ============= Server Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Allowed CORS origins. Empty means any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Maximum accepted request body size
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_body_limit() -> usize {
    64 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            cors_origins: Vec::new(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

// ============= Mail Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,

    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    #[serde(default)]
    pub tls: SmtpTls,

    /// Environment variable containing the SMTP username (also the sender)
    #[serde(default = "default_username_env")]
    pub username_env: String,

    /// Environment variable containing the SMTP password
    #[serde(default = "default_password_env")]
    pub password_env: String,

    /// Where submissions are delivered. Defaults to the SMTP user.
    #[serde(default)]
    pub recipient: Option<String>,

    #[serde(default = "default_from_name")]
    pub from_name: String,

    /// Brand line printed in the email footer
    #[serde(default = "default_brand")]
    pub brand: String,

    #[serde(default = "default_tagline")]
    pub tagline: String,
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    465
}

fn default_username_env() -> String {
    "EMAIL_USER".to_string()
}

fn default_password_env() -> String {
    "EMAIL_PASS".to_string()
}

fn default_from_name() -> String {
    "S-HATCH Contact Form".to_string()
}

fn default_brand() -> String {
    "S-HATCH AI Solutions".to_string()
}

fn default_tagline() -> String {
    "Transform your business with cutting-edge AI technology".to_string()
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            tls: SmtpTls::default(),
            username_env: default_username_env(),
            password_env: default_password_env(),
            recipient: None,
            from_name: default_from_name(),
            brand: default_brand(),
            tagline: default_tagline(),
        }
    }
}

/// How the SMTP connection is secured
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpTls {
    /// TLS from the first byte (port 465)
    #[default]
    Implicit,
    /// Plain connection upgraded with STARTTLS (port 587)
    Starttls,
}

// ============= FAQ Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaqConfig {
    /// Append the built-in rules after the configured ones
    #[serde(default = "default_true")]
    pub include_builtin: bool,

    /// Overrides the default fallback reply
    #[serde(default)]
    pub fallback: Option<String>,

    /// Extra rules, highest priority first
    #[serde(default)]
    pub rules: Vec<FaqRuleConfig>,
}

fn default_true() -> bool {
    true
}

impl Default for FaqConfig {
    fn default() -> Self {
        Self {
            include_builtin: true,
            fallback: None,
            rules: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaqRuleConfig {
    /// Case-insensitive regular expression
    pub pattern: String,
    pub answer: String,
}

// ============= Configuration Loading & Validation =============

/// Configuration warnings that don't prevent operation but may indicate issues
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub kind: ConfigWarningKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigWarningKind {
    MissingMailCredentials,
    DuplicateFaqPattern,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),

    #[error("FAQ error: {0}")]
    Faq(#[from] FaqError),

    #[error("Watch error: {0}")]
    WatchError(#[from] notify::Error),
}

impl HatchConfig {
    /// Load and validate configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: HatchConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration for internal consistency
    ///
    /// Mail credentials are deliberately not required here: the server runs
    /// without them and the contact endpoint reports the missing configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must be non-zero".to_string(),
            ));
        }

        if self.server.body_limit_bytes == 0 {
            return Err(ConfigError::ValidationError(
                "server.body_limit_bytes must be non-zero".to_string(),
            ));
        }

        if self
            .server
            .log_level
            .parse::<tracing_subscriber::filter::LevelFilter>()
            .is_err()
        {
            return Err(ConfigError::ValidationError(format!(
                "server.log_level '{}' is not a valid level",
                self.server.log_level
            )));
        }

        if self.mail.smtp_host.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "mail.smtp_host must not be empty".to_string(),
            ));
        }

        if self.mail.smtp_port == 0 {
            return Err(ConfigError::ValidationError(
                "mail.smtp_port must be non-zero".to_string(),
            ));
        }

        if let Some(ref recipient) = self.mail.recipient {
            if recipient.parse::<lettre::Address>().is_err() {
                return Err(ConfigError::ValidationError(format!(
                    "mail.recipient '{}' is not a valid email address",
                    recipient
                )));
            }
        }

        // Compiles every pattern and checks the table is non-empty
        FaqResponder::from_config(&self.faq)?;

        Ok(())
    }

    /// Validate configuration with warnings for suspicious but legal settings
    pub fn validate_with_warnings(&self) -> Result<Vec<ConfigWarning>, ConfigError> {
        self.validate()?;

        let mut warnings = Vec::new();
        warnings.extend(self.check_mail_credentials());
        warnings.extend(self.check_duplicate_patterns());

        Ok(warnings)
    }

    fn check_mail_credentials(&self) -> Vec<ConfigWarning> {
        [&self.mail.username_env, &self.mail.password_env]
            .into_iter()
            .filter(|name| self.resolve_env(name).is_none())
            .map(|name| ConfigWarning {
                kind: ConfigWarningKind::MissingMailCredentials,
                message: format!(
                    "Environment variable '{}' is not set; the contact form will not send email",
                    name
                ),
            })
            .collect()
    }

    fn check_duplicate_patterns(&self) -> Vec<ConfigWarning> {
        let mut seen = HashSet::new();

        self.faq
            .rules
            .iter()
            .map(|rule| rule.pattern.as_str())
            .filter(|pattern| !seen.insert(pattern.to_lowercase()))
            .map(|pattern| ConfigWarning {
                kind: ConfigWarningKind::DuplicateFaqPattern,
                message: format!(
                    "FAQ pattern '{}' appears more than once; only the first can ever match",
                    pattern
                ),
            })
            .collect()
    }

    /// Get a resolved value from an env var reference
    pub fn resolve_env(&self, env_name: &str) -> Option<String> {
        std::env::var(env_name).ok().filter(|v| !v.is_empty())
    }

    /// Get the SMTP username from the environment
    pub fn mail_username(&self) -> Result<String, ConfigError> {
        self.resolve_env(&self.mail.username_env)
            .ok_or_else(|| ConfigError::MissingEnvVar(self.mail.username_env.clone()))
    }

    /// Get the SMTP password from the environment
    pub fn mail_password(&self) -> Result<String, ConfigError> {
        self.resolve_env(&self.mail.password_env)
            .ok_or_else(|| ConfigError::MissingEnvVar(self.mail.password_env.clone()))
    }

    /// Address the server listens on, as `host:port`
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

// ============= Hot Reloading Configuration Manager =============

/// Thread-safe configuration manager with hot reloading support
///
/// The FAQ responder is rebuilt together with the configuration, so readers
/// always get a table that matches the config they see.
pub struct HatchConfigManager {
    config: Arc<ArcSwap<HatchConfig>>,
    faq: Arc<ArcSwap<FaqResponder>>,
    config_path: PathBuf,
    watcher: RwLock<Option<RecommendedWatcher>>,
}

impl HatchConfigManager {
    /// Create a new configuration manager and load the initial config
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        // Convert to absolute path for reliable file watching
        let path = path.as_ref();
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(ConfigError::ReadError)?
                .join(path)
        };

        let (config, faq) = load_snapshot(&path)?;

        Ok(Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            faq: Arc::new(ArcSwap::from_pointee(faq)),
            config_path: path,
            watcher: RwLock::new(None),
        })
    }

    /// Create a config manager directly from a config (useful for testing)
    /// This won't have file watching capabilities.
    pub fn from_config(config: HatchConfig) -> Result<Self, ConfigError> {
        let faq = FaqResponder::from_config(&config.faq)?;

        Ok(Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            faq: Arc::new(ArcSwap::from_pointee(faq)),
            config_path: PathBuf::from("hatch.toml"),
            watcher: RwLock::new(None),
        })
    }

    /// Get the current configuration (lockless read)
    pub fn config(&self) -> Arc<HatchConfig> {
        self.config.load_full()
    }

    /// Get the current FAQ responder (lockless read)
    pub fn faq(&self) -> Arc<FaqResponder> {
        self.faq.load_full()
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Manually reload the configuration from disk
    ///
    /// On failure the previous configuration stays active.
    pub fn reload(&self) -> Result<(), ConfigError> {
        info!("Reloading configuration from {:?}", self.config_path);

        let (config, faq) = load_snapshot(&self.config_path)?;
        store_snapshot(&self.config, &self.faq, config, faq);

        info!("Configuration reloaded successfully");
        Ok(())
    }

    /// Start watching for configuration file changes
    pub fn start_watching(&mut self) -> Result<(), ConfigError> {
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();

        let config_path = self.config_path.clone();
        let config_arc = Arc::clone(&self.config);
        let faq_arc = Arc::clone(&self.faq);

        let watched_name = config_path.file_name().map(|n| n.to_os_string());
        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                Ok(event) => {
                    let touches_config = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|n| n.to_os_string()) == watched_name);
                    if touches_config && (event.kind.is_modify() || event.kind.is_create()) {
                        // Send reload signal (debounced in the receiver)
                        let _ = tx.send(());
                    }
                }
                Err(e) => {
                    error!("Config watcher error: {:?}", e);
                }
            }
        })?;

        // Watch the config file's parent directory so editors that replace
        // the file are still picked up
        if let Some(parent) = self.config_path.parent() {
            watcher.watch(parent, RecursiveMode::NonRecursive)?;
        }

        *self.watcher.write() = Some(watcher);

        tokio::spawn(async move {
            while next_change_batch(&mut rx, RELOAD_DEBOUNCE).await {
                match load_snapshot(&config_path) {
                    Ok((config, faq)) => {
                        store_snapshot(&config_arc, &faq_arc, config, faq);
                        info!("Configuration hot-reloaded successfully");
                    }
                    Err(e) => {
                        warn!(
                            "Failed to hot-reload config: {}. Keeping previous config.",
                            e
                        );
                    }
                }
            }
        });

        info!("Configuration hot-reload watcher started");
        Ok(())
    }

    /// Stop watching for configuration changes
    pub fn stop_watching(&self) {
        *self.watcher.write() = None;
        info!("Configuration hot-reload watcher stopped");
    }
}

impl Clone for HatchConfigManager {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            faq: Arc::clone(&self.faq),
            config_path: self.config_path.clone(),
            watcher: RwLock::new(None), // Watcher is not cloned
        }
    }
}

/// Quiet period after the last change event before reloading
const RELOAD_DEBOUNCE: Duration = Duration::from_millis(500);

/// Wait for a change event, then let the burst settle.
///
/// Sleeps for `quiet` and drains every event that arrived meanwhile, so a
/// burst of saves yields one reload that sees the last write. Returns
/// `false` once the watcher side has gone away.
async fn next_change_batch(rx: &mut mpsc::UnboundedReceiver<()>, quiet: Duration) -> bool {
    if rx.recv().await.is_none() {
        return false;
    }

    loop {
        tokio::time::sleep(quiet).await;
        let mut drained = false;
        while rx.try_recv().is_ok() {
            drained = true;
        }
        if !drained {
            return true;
        }
    }
}

fn load_snapshot(path: &Path) -> Result<(HatchConfig, FaqResponder), ConfigError> {
    let config = HatchConfig::load(path)?;
    let faq = FaqResponder::from_config(&config.faq)?;
    Ok((config, faq))
}

fn store_snapshot(
    config_slot: &ArcSwap<HatchConfig>,
    faq_slot: &ArcSwap<FaqResponder>,
    config: HatchConfig,
    faq: FaqResponder,
) {
    faq_slot.store(Arc::new(faq));
    config_slot.store(Arc::new(config));
}
