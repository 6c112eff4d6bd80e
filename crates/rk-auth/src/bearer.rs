//! Bearer token authentication.

use serde_json::Value;

use crate::strategy::{AuthStrategy, AuthTarget};

/// Bearer token: adds `Authorization: Bearer <token>`.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken {
    token: Option<String>,
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerToken")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl BearerToken {
    /// Create a bearer token strategy.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    /// Build from settings: either a mapping with a `token` field or the
    /// token itself as a bare scalar.
    pub fn from_settings(settings: &Value) -> Self {
        let token = match settings {
            Value::Object(map) => crate::setting_str(map.get("token")),
            other => crate::setting_str(Some(other)),
        };
        Self { token }
    }

    /// The header value this strategy attaches.
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.token.as_deref().unwrap_or_default())
    }
}

impl AuthStrategy for BearerToken {
    fn authorize(&self, target: &mut dyn AuthTarget) {
        target.add_header("Authorization", &self.header_value());
    }
}
