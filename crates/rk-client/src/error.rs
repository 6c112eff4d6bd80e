//! Error types for rk-client.

use crate::validation::ValidationErrors;

/// Result type alias for rk-client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for rk-client operations.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional source error.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Create a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Create a new error with the given kind and source.
    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }

    /// Returns true if the remote resource was not found (HTTP 404).
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, ErrorKind::NotFound { .. })
    }

    /// Returns true if the request never left because params failed validation.
    pub fn is_validation_error(&self) -> bool {
        matches!(self.kind, ErrorKind::ValidationFailed(_))
    }

    /// Returns true for failures reported by the transport layer.
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Http { .. } | ErrorKind::Timeout | ErrorKind::Connection(_)
        )
    }

    /// HTTP status associated with this error, if there is one.
    pub fn status(&self) -> Option<u16> {
        match &self.kind {
            ErrorKind::Http { status, .. } => Some(*status),
            ErrorKind::InvalidResponse { status } => Some(*status),
            ErrorKind::NotFound { .. } => Some(404),
            _ => None,
        }
    }

    /// Per-field validation messages, if this is a validation failure.
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match &self.kind {
            ErrorKind::ValidationFailed(errors) => Some(errors),
            _ => None,
        }
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// The client has no base URL configured.
    #[error("Base URL not defined for client [{client}]")]
    MissingBaseUrl { client: String },

    /// Declared parameter rules rejected the current params.
    #[error("Validation failed: {0}")]
    ValidationFailed(ValidationErrors),

    /// The transport reported HTTP 404 for a method.
    ///
    /// `method` is the short endpoint name, `endpoint` its fully-qualified
    /// cache name.
    #[error("Not found: {method} ({url}): {message}")]
    NotFound {
        method: String,
        endpoint: String,
        url: String,
        message: String,
    },

    /// Decoded status code outside `[200, 300)`.
    #[error("Not a valid response: status {status}")]
    InvalidResponse { status: u16 },

    /// The server answered with an error status (4xx/5xx).
    #[error("HTTP error: {status} {reason}")]
    Http {
        status: u16,
        reason: String,
        body: String,
    },

    /// Request timeout.
    #[error("Request timeout")]
    Timeout,

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(String),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Auth settings could not be applied.
    #[error("Auth error: {0}")]
    Auth(String),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            ErrorKind::Timeout
        } else if err.is_connect() {
            ErrorKind::Connection(err.to_string())
        } else if let Some(status) = err.status() {
            ErrorKind::Http {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
                body: String::new(),
            }
        } else {
            ErrorKind::Other(err.to_string())
        };

        Error::with_source(kind, err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::with_source(ErrorKind::Json(err.to_string()), err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::with_source(ErrorKind::InvalidUrl(err.to_string()), err)
    }
}

impl From<restkit_auth::Error> for Error {
    fn from(err: restkit_auth::Error) -> Self {
        Error::with_source(ErrorKind::Auth(err.kind.to_string()), err)
    }
}
