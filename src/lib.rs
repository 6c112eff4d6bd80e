//! # restkit
//!
//! Typed REST API clients built from declarative method descriptors.
//!
//! Describe each API call once as an [`Endpoint`], bind it to a shared
//! [`RestClient`], and read the response. The first read sends the request;
//! later reads come from the method's cache.
//!
//! ## Security
//!
//! - Secrets (passwords, tokens) are redacted in Debug output
//! - Request logging masks `Authorization` and cookie headers
//! - Auth is applied per request, never to the shared client state
//!
//! ## Crates
//!
//! - **restkit-client** - Client, method descriptors, validation, response cache
//! - **restkit-auth** - Credential strategies: basic auth, bearer token
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::collections::HashMap;
//! use restkit::{AuthConfig, ClientConfig, Endpoint, RestClient, RestMethod};
//!
//! struct GetUser(u64);
//!
//! impl Endpoint for GetUser {
//!     fn url_path(&self) -> &str {
//!         "/users/{id}"
//!     }
//!
//!     fn token_values(&self) -> HashMap<String, String> {
//!         HashMap::from([("id".to_string(), self.0.to_string())])
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = RestClient::new(ClientConfig::default())?
//!         .with_base_url("https://api.example.com");
//!     client.set_auth(AuthConfig::from_env().into_strategy());
//!
//!     let mut method = RestMethod::new(&client, GetUser(7));
//!     let name = method.response_or("name", "unknown".into()).await?;
//!     println!("{name}");
//!
//!     Ok(())
//! }
//! ```

// Re-export all crates for convenient access
pub use restkit_auth as auth;
pub use restkit_client as client;

// Re-export commonly used types at the top level
pub use restkit_auth::{AuthConfig, AuthStrategy, BasicAuth, BearerToken};
pub use restkit_client::{
    ClientConfig, Endpoint, Error, ErrorKind, HttpMethod, LogConfig, PostParamsMode, RestClient,
    RestMethod, Result,
};
