//! # rk-auth
//!
//! Credential strategies for restkit clients.
//!
//! A strategy attaches credentials to an outgoing request through the narrow
//! [`AuthTarget`] contract: it may add a header or set a transport-level
//! credential pair, nothing else.
//!
//! ## Supported Strategies
//!
//! - **[`BasicAuth`]** - `(user, secret)` pair handed to the transport
//! - **[`BearerToken`]** - `Authorization: Bearer <token>` header
//!
//! Implement [`AuthStrategy`] for anything else (API keys, signed headers).
//!
//! ## Example
//!
//! ```rust
//! use restkit_auth::{AuthConfig, AuthStrategy, BearerToken};
//! use serde_json::json;
//!
//! let token = BearerToken::from_settings(&json!({ "token": "abc" }));
//! assert_eq!(token.header_value(), "Bearer abc");
//!
//! // From a config file section
//! let strategy = AuthConfig::from_value(json!({ "type": "basic", "user": "svc" }))
//!     .unwrap()
//!     .into_strategy();
//! assert!(strategy.is_some());
//! ```

mod basic;
mod bearer;
mod config;
mod error;
mod strategy;

pub use basic::BasicAuth;
pub use bearer::BearerToken;
pub use config::{AuthConfig, ENV_AUTH_SECRET, ENV_AUTH_TOKEN, ENV_AUTH_USER};
pub use error::{Error, ErrorKind, Result};
pub use strategy::{AuthStrategy, AuthTarget, ConnectionAuth};

/// Read a settings field as text; numbers and booleans are stringified.
fn setting_str(value: Option<&serde_json::Value>) -> Option<String> {
    match value? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
