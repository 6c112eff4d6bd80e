//! The authorization contract shared by every credential strategy.
//!
//! A strategy never sees a client's internals. It receives an
//! [`AuthTarget`], which only allows adding a header or setting the
//! transport-level credential pair.

use std::fmt::Debug;

/// Transport-level credentials consumed by the HTTP layer at dispatch time.
///
/// Either half may be missing; the transport decides what an absent value
/// means. The secret is redacted in Debug output.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct ConnectionAuth {
    /// User name half of the pair.
    pub user: Option<String>,
    /// Password half of the pair.
    pub secret: Option<String>,
}

impl Debug for ConnectionAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionAuth")
            .field("user", &self.user)
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl ConnectionAuth {
    /// Build a credential pair.
    pub fn new(user: Option<String>, secret: Option<String>) -> Self {
        Self { user, secret }
    }

    /// The pair as plain values, missing halves rendered as empty strings.
    pub fn pair(&self) -> (&str, &str) {
        (
            self.user.as_deref().unwrap_or_default(),
            self.secret.as_deref().unwrap_or_default(),
        )
    }
}

/// Whatever a strategy is allowed to mutate.
///
/// Implemented by the client itself and by the per-request content the
/// client assembles, so a strategy can authorize either.
pub trait AuthTarget {
    /// Add or replace a header on the outgoing request state.
    fn add_header(&mut self, name: &str, value: &str);

    /// Set the transport-level credential pair.
    fn set_connection_auth(&mut self, auth: ConnectionAuth);
}

/// A pluggable policy for attaching credentials to outgoing requests.
///
/// New variants only need to implement [`authorize`](AuthStrategy::authorize).
pub trait AuthStrategy: Debug + Send + Sync {
    /// Attach credentials to the target.
    fn authorize(&self, target: &mut dyn AuthTarget);
}
