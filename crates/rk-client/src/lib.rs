//! # rk-client
//!
//! REST client infrastructure built around declarative method descriptors.
//!
//! This crate provides:
//! - [`RestClient`]: base URL, shared headers, pluggable auth, HTTP transport
//! - [`Endpoint`]: the static description of one API call
//! - [`RestMethod`]: one call of an endpoint, with params, validation and a
//!   lazily-filled response cache
//! - Parameter validation rules, cache-key derivation, response transforms
//! - Request/response tracing
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     RestMethod<Endpoint>                    │
//! │  - Path tokens, headers, query/post params                  │
//! │  - Validation before send                                   │
//! │  - Response cached after the first round trip               │
//! └─────────────────────────────────────────────────────────────┘
//!                              │ dispatch
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        RestClient                           │
//! │  - Base URL + shared headers                                │
//! │  - Per-request auth (restkit-auth strategies)               │
//! │  - Body encoding, query flattening, 404 remapping           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use restkit_auth::BearerToken;
//! use restkit_client::{ClientConfig, Endpoint, HttpMethod, RestClient, RestMethod};
//!
//! struct CreateUser;
//!
//! impl Endpoint for CreateUser {
//!     fn url_path(&self) -> &str { "/users" }
//!     fn http_method(&self) -> HttpMethod { HttpMethod::Post }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), restkit_client::Error> {
//!     let client = RestClient::new(ClientConfig::default())?
//!         .with_base_url("https://api.example.com")
//!         .with_auth(Arc::new(BearerToken::new("token")));
//!
//!     let mut method = RestMethod::new(&client, CreateUser);
//!     method.add_post_param("name", "Ada");
//!     let id = method.response_get("id").await?.cloned();
//!     println!("created {id:?}");
//!     Ok(())
//! }
//! ```

pub mod cache;
mod client;
mod config;
mod error;
pub mod logging;
mod method;
mod request;
mod response;
pub mod transform;
pub mod validation;

pub use cache::{CacheStore, MemoryCache};
pub use client::{format_date_with_time_offset, RestClient, DATE_WITH_OFFSET_FORMAT};
pub use config::{
    ClientConfig, ClientConfigBuilder, LogConfig, TlsVerification, ENV_LOG_ENABLED, ENV_LOG_FILE,
};
pub use error::{Error, ErrorKind, Result};
pub use method::{Endpoint, RestMethod};
pub use request::{
    flatten_params, to_ascii_json, HeaderBag, HttpMethod, PostParamsMode, RequestBody,
    RequestContent,
};
pub use response::{lookup, lookup_in, Response};
pub use validation::{Rule, RuleSet, ValidationErrors};

/// User-Agent string for the client
pub const USER_AGENT: &str = concat!("restkit/", env!("CARGO_PKG_VERSION"));
