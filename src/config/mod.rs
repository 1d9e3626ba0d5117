//! Server configuration loaded from a TOML file.
//!
//! Every section and field has a default, so an empty or missing file yields
//! a working in-memory server with push delivery disabled.

mod defaults;

use crate::reminder::domain::{ScheduleGating, VapidPublicKey};
use crate::task::domain::{ReminderLead, UserId};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// File path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid configuration TOML.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// File path.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP listener settings.
    pub server: ServerConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Reminder dispatch settings.
    pub reminder: ReminderConfig,
    /// Push delivery settings.
    pub push: PushConfig,
    /// Bearer token registry.
    pub auth: AuthConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "defaults::host")]
    pub host: String,
    /// Bind port.
    #[serde(default = "defaults::port")]
    pub port: u16,
    /// Default tracing filter, overridden by `RUST_LOG`.
    #[serde(default = "defaults::log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: defaults::host(),
            port: defaults::port(),
            log_level: defaults::log_level(),
        }
    }
}

/// Database settings.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL URL. In-memory storage is used when absent.
    #[serde(default)]
    pub url: Option<String>,
    /// Connection pool size.
    #[serde(default = "defaults::pool_size")]
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            pool_size: defaults::pool_size(),
        }
    }
}

// The URL may carry a password.
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &self.url.as_ref().map(|_| "<redacted>"))
            .field("pool_size", &self.pool_size)
            .finish()
    }
}

/// Reminder dispatch settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReminderConfig {
    /// Whether the dispatch loop runs.
    #[serde(default = "defaults::enabled")]
    pub enabled: bool,
    /// Whether schedules restrict dispatch days.
    #[serde(default)]
    pub schedule_gating: ScheduleGating,
    /// Lead time applied to tasks created without one.
    #[serde(default = "defaults::default_lead_minutes")]
    pub default_lead_minutes: u32,
    /// Whether per-user quiet hours suppress dispatch.
    #[serde(default = "defaults::enabled")]
    pub quiet_hours: bool,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::enabled(),
            schedule_gating: ScheduleGating::default(),
            default_lead_minutes: defaults::default_lead_minutes(),
            quiet_hours: defaults::enabled(),
        }
    }
}

impl ReminderConfig {
    /// Returns the configured default lead, falling back to five minutes
    /// when the value is out of range.
    #[must_use]
    pub fn default_lead(&self) -> ReminderLead {
        ReminderLead::new(self.default_lead_minutes).unwrap_or_else(|err| {
            warn!(error = %err, "invalid default_lead_minutes; using the built-in default");
            ReminderLead::DEFAULT
        })
    }
}

/// Push delivery settings.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct PushConfig {
    /// Base64 VAPID public key handed to browsers.
    #[serde(default)]
    pub vapid_public_key: Option<String>,
    /// Push relay URL.
    #[serde(default)]
    pub relay_url: Option<String>,
    /// Relay request timeout in seconds.
    #[serde(default = "defaults::relay_timeout_secs")]
    pub relay_timeout_secs: u64,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            vapid_public_key: None,
            relay_url: None,
            relay_timeout_secs: defaults::relay_timeout_secs(),
        }
    }
}

impl fmt::Debug for PushConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushConfig")
            .field(
                "vapid_public_key",
                &self.vapid_public_key.as_ref().map(|_| "<redacted>"),
            )
            .field("relay_url", &self.relay_url)
            .field("relay_timeout_secs", &self.relay_timeout_secs)
            .finish()
    }
}

/// Push settings that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPush {
    /// Validated VAPID public key.
    pub vapid_key: VapidPublicKey,
    /// Relay URL.
    pub relay_url: String,
    /// Relay request timeout.
    pub timeout: Duration,
}

impl PushConfig {
    /// Returns validated push settings, or `None` when push is unconfigured.
    ///
    /// A key that does not decode to 65 bytes leaves push unconfigured.
    #[must_use]
    pub fn resolve(&self) -> Option<ResolvedPush> {
        let raw_key = self.vapid_public_key.as_deref()?;
        let relay_url = self
            .relay_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())?;
        match VapidPublicKey::parse(raw_key) {
            Ok(vapid_key) => Some(ResolvedPush {
                vapid_key,
                relay_url: relay_url.to_owned(),
                timeout: Duration::from_secs(self.relay_timeout_secs),
            }),
            Err(err) => {
                warn!(error = %err, "ignoring push configuration");
                None
            }
        }
    }
}

/// Bearer token registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Registered tokens.
    pub tokens: Vec<TokenEntry>,
}

/// Maps the SHA-256 digest of a bearer token to a user.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct TokenEntry {
    /// User the token authenticates.
    pub user_id: UserId,
    /// Lowercase hex SHA-256 digest of the token.
    pub token_sha256: String,
}

impl fmt::Debug for TokenEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenEntry")
            .field("user_id", &self.user_id)
            .field("token_sha256", &"<redacted>")
            .finish()
    }
}

impl Config {
    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or field values.
    pub fn from_toml(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Loads configuration from `path`, using defaults when the file does
    /// not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read and
    /// [`ConfigError::Parse`] when it is malformed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!(path = %path.display(), "config file not found; using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&text, path)?;
        info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }
}
