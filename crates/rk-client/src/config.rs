//! Client configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

/// Environment variable enabling request/response logging.
pub const ENV_LOG_ENABLED: &str = "RESTKIT_LOG_ENABLED";
/// Environment variable naming the log file.
pub const ENV_LOG_FILE: &str = "RESTKIT_LOG_FILE";

/// Configuration for the HTTP client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout.
    pub timeout: Duration,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Pool idle timeout.
    pub pool_idle_timeout: Duration,
    /// Maximum idle connections per host.
    pub pool_max_idle_per_host: usize,
    /// User-Agent header value.
    pub user_agent: String,
    /// Whether to log request/response summaries.
    pub enable_tracing: bool,
    /// Server certificate verification.
    pub tls: TlsVerification,
    /// Outgoing interface: an IP address to bind, or an interface name.
    pub interface: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 10,
            user_agent: crate::USER_AGENT.to_string(),
            enable_tracing: false,
            tls: TlsVerification::Enabled,
            interface: None,
        }
    }
}

impl ClientConfig {
    /// Create a new client config builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

/// Builder for ClientConfig.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set connection timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set pool idle timeout.
    pub fn with_pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.pool_idle_timeout = timeout;
        self
    }

    /// Set maximum idle connections per host.
    pub fn with_pool_max_idle(mut self, max: usize) -> Self {
        self.config.pool_max_idle_per_host = max;
        self
    }

    /// Set custom User-Agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Enable or disable request/response logging.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.config.enable_tracing = enabled;
        self
    }

    /// Apply a [`LogConfig`]; only its `enabled` flag affects the client.
    pub fn with_log_config(mut self, log: &LogConfig) -> Self {
        self.config.enable_tracing = log.enabled;
        self
    }

    /// Set certificate verification.
    pub fn with_tls_verification(mut self, tls: TlsVerification) -> Self {
        self.config.tls = tls;
        self
    }

    /// Bind outgoing connections to an IP address or interface name.
    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        self.config.interface = Some(interface.into());
        self
    }

    /// Build the client configuration.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

/// Server certificate verification.
///
/// Deserializes from `true`, `false`, or a path to a PEM CA bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// Verify against the built-in roots.
    #[default]
    Enabled,
    /// Accept any certificate.
    Disabled,
    /// Verify against the roots in this PEM file as well.
    CaBundle(PathBuf),
}

impl<'de> Deserialize<'de> for TlsVerification {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Flag(bool),
            Path(PathBuf),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Flag(true) => TlsVerification::Enabled,
            Raw::Flag(false) => TlsVerification::Disabled,
            Raw::Path(path) => TlsVerification::CaBundle(path),
        })
    }
}

/// Request/response log settings (`log.enabled`, `log.file`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Emit request/response summaries.
    pub enabled: bool,
    /// Append events to this file instead of stderr.
    pub file: Option<PathBuf>,
}

impl LogConfig {
    /// Load from `RESTKIT_LOG_ENABLED` and `RESTKIT_LOG_FILE`.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let enabled = lookup(ENV_LOG_ENABLED)
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);
        let file = lookup(ENV_LOG_FILE)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);
        Self { enabled, file }
    }
}
