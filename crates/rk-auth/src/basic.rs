//! HTTP basic authentication.

use serde_json::Value;

use crate::strategy::{AuthStrategy, AuthTarget, ConnectionAuth};

/// Basic auth: hands a `(user, secret)` pair to the transport.
///
/// Headers are left alone; the transport encodes the pair itself.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    user: Option<String>,
    secret: Option<String>,
}

impl std::fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuth")
            .field("user", &self.user)
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl BasicAuth {
    /// Create a basic auth strategy.
    pub fn new(user: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            user: Some(user.into()),
            secret: Some(secret.into()),
        }
    }

    /// Build from a settings mapping with `user` and `secret` fields.
    ///
    /// Missing fields (or a settings value that isn't a mapping) yield
    /// empty credentials rather than an error.
    pub fn from_settings(settings: &Value) -> Self {
        Self {
            user: crate::setting_str(settings.get("user")),
            secret: crate::setting_str(settings.get("secret")),
        }
    }

    /// The configured user, if any.
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }
}

impl AuthStrategy for BasicAuth {
    fn authorize(&self, target: &mut dyn AuthTarget) {
        target.set_connection_auth(ConnectionAuth::new(self.user.clone(), self.secret.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::testing::RecordingTarget;
    use serde_json::json;

    #[test]
    fn test_authorize_sets_connection_pair() {
        let mut target = RecordingTarget::default();
        BasicAuth::new("u", "p").authorize(&mut target);

        assert_eq!(
            target.connection_auth,
            Some(ConnectionAuth::new(Some("u".into()), Some("p".into())))
        );
        assert!(target.headers.is_empty());
    }

    #[test]
    fn test_from_settings() {
        let auth = BasicAuth::from_settings(&json!({"user": "svc", "secret": "s3cret"}));
        assert_eq!(auth, BasicAuth::new("svc", "s3cret"));
    }

    #[test]
    fn test_from_settings_missing_fields() {
        let auth = BasicAuth::from_settings(&json!({"user": "svc"}));
        assert_eq!(auth.user(), Some("svc"));

        let mut target = RecordingTarget::default();
        auth.authorize(&mut target);
        assert_eq!(
            target.connection_auth,
            Some(ConnectionAuth::new(Some("svc".into()), None))
        );

        let auth = BasicAuth::from_settings(&json!("not-a-map"));
        assert_eq!(auth.user(), None);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let debug = format!("{:?}", BasicAuth::new("svc", "s3cret"));
        assert!(!debug.contains("s3cret"));
    }
}
