//! # Client Configuration
//!
//! Where the remote service lives and how long to wait for it.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     FNS_BASE_URL=https://proverkacheka.nalog.ru:9999                   │
//! │     FNS_REQUEST_TIMEOUT_SECS=30                                        │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/fns-receipt/fns.toml (Linux)                             │
//! │     ~/Library/Application Support/ru.fns.receipt/fns.toml (macOS)      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # fns.toml
//! [service]
//! base_url = "https://proverkacheka.nalog.ru:9999"
//! request_timeout_secs = 30
//! connect_timeout_secs = 10
//!
//! [device]
//! id = ""   # device-id header
//! os = ""   # device-os header
//! ```
//!
//! Credentials are not configuration: the receipt fetch takes them per call.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{FnsError, FnsResult};

/// Production address of the receipt-check service.
pub const DEFAULT_BASE_URL: &str = "https://proverkacheka.nalog.ru:9999";

// =============================================================================
// Service Settings
// =============================================================================

/// Connection settings for the remote service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSettings {
    /// Scheme, host and port of the service. Paths are appended per operation.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Whole-request timeout enforced by the transport (seconds).
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// TCP/TLS connect timeout (seconds).
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

impl Default for ServiceSettings {
    fn default() -> Self {
        ServiceSettings {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

// =============================================================================
// Device Settings
// =============================================================================

/// Identification headers sent with the receipt fetch.
///
/// The service requires both headers to be present; empty values are accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSettings {
    /// Value of the `device-id` header.
    #[serde(default)]
    pub id: String,

    /// Value of the `device-os` header.
    #[serde(default)]
    pub os: String,
}

// =============================================================================
// Main Client Configuration
// =============================================================================

/// Complete client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub service: ServiceSettings,

    #[serde(default)]
    pub device: DeviceSettings,
}

impl ClientConfig {
    /// Creates a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a default config pointed at another service address.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let mut config = Self::default();
        config.service.base_url = base_url.into();
        config
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (fns.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> FnsResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading client config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load client config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> FnsResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| FnsError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| FnsError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| FnsError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Client config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> FnsResult<()> {
        self.base_url()?;

        if self.service.request_timeout_secs == 0 {
            return Err(FnsError::InvalidConfig(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Parses the base URL, accepting only `http` and `https`.
    pub fn base_url(&self) -> FnsResult<Url> {
        let url = Url::parse(&self.service.base_url)?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(FnsError::InvalidUrl(format!(
                "Service URL must start with http:// or https://, got: {}",
                self.service.base_url
            )));
        }

        if url.cannot_be_a_base() {
            return Err(FnsError::InvalidUrl(format!(
                "Service URL cannot carry a path: {}",
                self.service.base_url
            )));
        }

        Ok(url)
    }

    /// Returns the whole-request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.service.request_timeout_secs)
    }

    /// Returns the connect timeout.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.service.connect_timeout_secs)
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("FNS_BASE_URL") {
            debug!(url = %url, "Overriding service URL from environment");
            self.service.base_url = url;
        }

        if let Ok(secs) = std::env::var("FNS_REQUEST_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(s) => self.service.request_timeout_secs = s,
                Err(_) => warn!(value = %secs, "Ignoring non-numeric FNS_REQUEST_TIMEOUT_SECS"),
            }
        }

        if let Ok(secs) = std::env::var("FNS_CONNECT_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(s) => self.service.connect_timeout_secs = s,
                Err(_) => warn!(value = %secs, "Ignoring non-numeric FNS_CONNECT_TIMEOUT_SECS"),
            }
        }

        if let Ok(id) = std::env::var("FNS_DEVICE_ID") {
            self.device.id = id;
        }

        if let Ok(os) = std::env::var("FNS_DEVICE_OS") {
            self.device.os = os;
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("ru", "fns", "receipt")
            .map(|dirs| dirs.config_dir().join("fns.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.service.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
        assert_eq!(config.device, DeviceSettings::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ClientConfig::with_base_url("ftp://proverkacheka.nalog.ru");
        assert!(matches!(config.validate(), Err(FnsError::InvalidUrl(_))));

        config.service.base_url = "not a url".into();
        assert!(matches!(config.validate(), Err(FnsError::InvalidUrl(_))));

        config.service.base_url = "http://127.0.0.1:8080".into();
        assert!(config.validate().is_ok());

        config.service.request_timeout_secs = 0;
        assert!(matches!(config.validate(), Err(FnsError::InvalidConfig(_))));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ClientConfig = toml::from_str(
            r#"
            [device]
            id = "scanner-7"
            "#,
        )
        .unwrap();

        assert_eq!(config.device.id, "scanner-7");
        assert_eq!(config.device.os, "");
        assert_eq!(config.service.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_toml_serialization() {
        let config = ClientConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[service]"));
        assert!(toml_str.contains("[device]"));
    }

    #[test]
    fn test_save_and_load_explicit_path() {
        let path = std::env::temp_dir().join(format!("fns-config-{}.toml", std::process::id()));

        let mut config = ClientConfig::with_base_url("http://127.0.0.1:9999");
        config.service.request_timeout_secs = 5;
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let reloaded: ClientConfig = toml::from_str(&contents).unwrap();
        assert_eq!(reloaded.service.base_url, "http://127.0.0.1:9999");
        assert_eq!(reloaded.service.request_timeout_secs, 5);

        std::fs::remove_file(&path).unwrap();
    }
}
