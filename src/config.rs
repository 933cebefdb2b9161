//! Configuration file parser for ~/.config/feedwindow/config.toml.
//!
//! The config file is optional — a missing file yields `Config::default()`.
//! Unknown keys are silently ignored by serde (with `deny_unknown_fields` off),
//! though we log a warning when the file contains potential typos.
use secrecy::SecretString;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::feed::FetchSettings;

/// Environment variable that overrides `auth_token` from the config file.
pub const AUTH_TOKEN_ENV: &str = "FEEDWINDOW_AUTH_TOKEN";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Connector configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
/// Missing keys fall back to `Default::default()`.
///
/// Custom Debug impl masks `auth_token` so it never reaches logs.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// RSS/Atom document to fetch. May be overridden on the command line.
    pub feed_url: Option<String>,

    /// Proxy URL applied to every request (e.g. "http://proxy:3128").
    pub proxy: Option<String>,

    /// User-Agent header sent with feed requests.
    pub user_agent: String,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Maximum feed document size in bytes.
    pub max_feed_size_bytes: usize,

    /// Retries for 429/5xx responses. 0 = fail on first error.
    pub max_retries: u32,

    /// Bearer token for authenticated feeds (alternative to
    /// FEEDWINDOW_AUTH_TOKEN). Env var takes precedence.
    pub auth_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let transport = FetchSettings::default();
        Self {
            feed_url: None,
            proxy: None,
            user_agent: transport.user_agent,
            timeout_secs: transport.timeout.as_secs(),
            max_feed_size_bytes: transport.max_feed_size,
            max_retries: transport.max_retries,
            auth_token: None,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("feed_url", &self.feed_url)
            .field("proxy", &self.proxy.as_ref().map(|_| "[REDACTED]"))
            .field("user_agent", &self.user_agent)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_feed_size_bytes", &self.max_feed_size_bytes)
            .field("max_retries", &self.max_retries)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → silently accepted (serde default behavior), logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // File deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        // Parse the TOML content first as a raw table to detect unknown keys
        if let Ok(raw) = content.parse::<toml::Table>() {
            let known_keys = [
                "feed_url",
                "proxy",
                "user_agent",
                "timeout_secs",
                "max_feed_size_bytes",
                "max_retries",
                "auth_token",
            ];
            for key in raw.keys() {
                if !known_keys.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(
            path = %path.display(),
            feed_url = config.feed_url.as_deref().unwrap_or("-"),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Transport settings, with the auth token taken from
    /// [`AUTH_TOKEN_ENV`] when set.
    pub fn fetch_settings(&self) -> FetchSettings {
        self.fetch_settings_with_token(std::env::var(AUTH_TOKEN_ENV).ok())
    }

    /// Transport settings; `env_token` wins over the configured token.
    pub fn fetch_settings_with_token(&self, env_token: Option<String>) -> FetchSettings {
        let token = env_token
            .filter(|t| !t.trim().is_empty())
            .or_else(|| self.auth_token.clone())
            .map(SecretString::from);

        FetchSettings {
            user_agent: self.user_agent.clone(),
            proxy: self.proxy.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            max_feed_size: self.max_feed_size_bytes,
            max_retries: self.max_retries,
            auth_token: token,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
