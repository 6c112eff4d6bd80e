//! Declarative auth configuration.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::basic::BasicAuth;
use crate::bearer::BearerToken;
use crate::error::{Error, ErrorKind, Result};
use crate::strategy::AuthStrategy;

/// Environment variable holding a bearer token.
pub const ENV_AUTH_TOKEN: &str = "RESTKIT_AUTH_TOKEN";
/// Environment variable holding the basic auth user.
pub const ENV_AUTH_USER: &str = "RESTKIT_AUTH_USER";
/// Environment variable holding the basic auth secret.
pub const ENV_AUTH_SECRET: &str = "RESTKIT_AUTH_SECRET";

/// Auth settings as they appear in a config file.
///
/// ```json
/// { "type": "bearer", "token": "abc" }
/// { "type": "basic", "user": "svc", "secret": "s3cret" }
/// { "type": "none" }
/// ```
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthConfig {
    /// No credentials.
    #[default]
    None,
    /// HTTP basic auth.
    Basic {
        #[serde(default)]
        user: Option<String>,
        #[serde(default)]
        secret: Option<String>,
    },
    /// Bearer token header.
    Bearer {
        #[serde(default)]
        token: Option<String>,
    },
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthConfig::None => f.write_str("None"),
            AuthConfig::Basic { user, .. } => f
                .debug_struct("Basic")
                .field("user", user)
                .field("secret", &"[REDACTED]")
                .finish(),
            AuthConfig::Bearer { .. } => f
                .debug_struct("Bearer")
                .field("token", &"[REDACTED]")
                .finish(),
        }
    }
}

impl AuthConfig {
    /// Parse auth settings out of an arbitrary JSON value.
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| {
            Error::with_source(ErrorKind::InvalidSettings(e.to_string()), e)
        })
    }

    /// Build a strategy for the named kind from loose settings.
    ///
    /// This is the factory entry point for configuration maps that keep the
    /// strategy name beside its settings (`"bearer"` + `{"token": ..}` or a
    /// bare token string).
    pub fn strategy_for(kind: &str, settings: &Value) -> Result<Option<Arc<dyn AuthStrategy>>> {
        tracing::debug!(kind, "Building auth strategy");
        match kind {
            "none" => Ok(None),
            "basic" => Ok(Some(Arc::new(BasicAuth::from_settings(settings)))),
            "bearer" => Ok(Some(Arc::new(BearerToken::from_settings(settings)))),
            other => Err(Error::new(ErrorKind::InvalidSettings(format!(
                "unknown auth type '{other}'"
            )))),
        }
    }

    /// Load auth settings from environment variables.
    ///
    /// `RESTKIT_AUTH_TOKEN` selects bearer auth; otherwise
    /// `RESTKIT_AUTH_USER` (with optional `RESTKIT_AUTH_SECRET`) selects basic
    /// auth. With neither set the result is [`AuthConfig::None`].
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(token) = lookup(ENV_AUTH_TOKEN) {
            return AuthConfig::Bearer { token: Some(token) };
        }
        match lookup(ENV_AUTH_USER) {
            Some(user) => AuthConfig::Basic {
                user: Some(user),
                secret: lookup(ENV_AUTH_SECRET),
            },
            None => AuthConfig::None,
        }
    }

    /// Turn the settings into a strategy; `None` means no auth.
    pub fn into_strategy(self) -> Option<Arc<dyn AuthStrategy>> {
        match self {
            AuthConfig::None => None,
            AuthConfig::Basic { user, secret } => {
                let settings = serde_json::json!({ "user": user, "secret": secret });
                Some(Arc::new(BasicAuth::from_settings(&settings)))
            }
            AuthConfig::Bearer { token } => {
                let settings = token.map(Value::String).unwrap_or(Value::Null);
                Some(Arc::new(BearerToken::from_settings(&settings)))
            }
        }
    }
}
