//! API method descriptors and the lazily-sent method handle.
//!
//! An [`Endpoint`] statically describes one API call: its path template,
//! verb, encoding, parameter rules and response handling. A [`RestMethod`]
//! pairs an endpoint with a [`RestClient`], carries the per-call headers and
//! params, and caches the decoded response after the first round trip.
//!
//! ```rust,no_run
//! use std::collections::HashMap;
//! use restkit_client::{ClientConfig, Endpoint, RestClient, RestMethod};
//!
//! struct GetUser {
//!     id: u64,
//! }
//!
//! impl Endpoint for GetUser {
//!     fn url_path(&self) -> &str {
//!         "/users/{id}"
//!     }
//!
//!     fn token_values(&self) -> HashMap<String, String> {
//!         HashMap::from([("id".to_string(), self.id.to_string())])
//!     }
//! }
//!
//! # async fn run() -> restkit_client::Result<()> {
//! let client = RestClient::new(ClientConfig::default())?.with_base_url("https://api.example.com");
//! let mut method = RestMethod::new(&client, GetUser { id: 7 });
//!
//! // The first read sends the request; later reads use the cached body.
//! let name = method.response_or("name", "unknown".into()).await?;
//! let status = method.response_status().await?;
//! # let _ = (name, status);
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::cache::{compose_cache_key, CacheStore, DEFAULT_GLUE};
use crate::client::RestClient;
use crate::error::{Error, ErrorKind, Result};
use crate::request::{HeaderBag, HttpMethod, PostParamsMode};
use crate::response::{lookup, lookup_in, Response};
use crate::validation::RuleSet;

/// Static description of one API call.
///
/// Only [`url_path`](Endpoint::url_path) is required.
pub trait Endpoint: Send + Sync {
    /// Path template relative to the client's base URL, with `{token}`
    /// placeholders filled from [`token_values`](Endpoint::token_values).
    fn url_path(&self) -> &str;

    /// HTTP verb.
    fn http_method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    /// Values for the `{token}` placeholders in the path.
    fn token_values(&self) -> HashMap<String, String> {
        HashMap::new()
    }

    /// Headers every new method handle starts with.
    fn default_headers(&self) -> HeaderBag {
        HeaderBag::new()
    }

    /// Body encoding for post params.
    fn post_params_mode(&self) -> PostParamsMode {
        PostParamsMode::Json
    }

    /// Whether the client's auth strategy applies to this call.
    fn auth_enabled(&self) -> bool {
        true
    }

    /// Rules checked against the query params before sending.
    fn query_param_rules(&self) -> RuleSet {
        RuleSet::new()
    }

    /// Rules checked against the post params before sending.
    fn post_param_rules(&self) -> RuleSet {
        RuleSet::new()
    }

    /// Decode the raw response into a JSON tree.
    fn decode(&self, response: &Response) -> Result<Value> {
        response.json_value()
    }

    /// The status code the method is judged by.
    fn extract_status(&self, response: &Response) -> u16 {
        response.status()
    }

    /// Rewrite params right before they are encoded.
    ///
    /// Called with the post params and [`HttpMethod::Post`], then with the
    /// query params and [`HttpMethod::Get`]. An empty result sends nothing.
    fn prepare_params(&self, params: Map<String, Value>, _verb: HttpMethod) -> Map<String, Value> {
        params
    }

    /// Post-process the decoded body before it is cached.
    fn handle_response(&self, body: Value) -> Value {
        body
    }

    /// Short type name, used in logs and errors.
    fn name(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Fully-qualified name the cache key is derived from.
    fn cache_name(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }

    /// Extra cache key parts distinguishing calls of the same endpoint.
    fn cache_key_suffix(&self) -> Vec<String> {
        Vec::new()
    }
}

fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[derive(Debug, Clone)]
struct SentResponse {
    raw: Response,
    status: u16,
    body: Value,
}

/// One call of an [`Endpoint`] through a [`RestClient`].
///
/// The handle starts unsent. Reading the response through any of the
/// `response*` accessors sends it once; after that the cached response is
/// returned without touching the network. [`send`](RestMethod::send) always
/// performs a new round trip and replaces the cache.
///
/// If the round trip fails before a response arrives, the cache is left as
/// it was. If the response arrives but its status is outside `[200, 300)`,
/// the response is cached and `send` returns
/// [`ErrorKind::InvalidResponse`]; later reads see the cached response.
pub struct RestMethod<'c, E: Endpoint> {
    client: &'c RestClient,
    endpoint: E,
    headers: HeaderBag,
    query_params: Map<String, Value>,
    post_params: Map<String, Value>,
    sent: Option<SentResponse>,
}

impl<E: Endpoint> std::fmt::Debug for RestMethod<'_, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestMethod")
            .field("endpoint", &self.endpoint.name())
            .field("client", &self.client.name())
            .field("headers", &self.headers.redacted())
            .field("query_params", &self.query_params)
            .field("post_params", &self.post_params)
            .field("status", &self.cached_status())
            .finish()
    }
}

impl<'c, E: Endpoint> RestMethod<'c, E> {
    /// Bind an endpoint to a client.
    pub fn new(client: &'c RestClient, endpoint: E) -> Self {
        let headers = endpoint.default_headers();
        Self {
            client,
            endpoint,
            headers,
            query_params: Map::new(),
            post_params: Map::new(),
            sent: None,
        }
    }

    /// The client this method dispatches through.
    pub fn client(&self) -> &'c RestClient {
        self.client
    }

    /// The endpoint description.
    pub fn endpoint(&self) -> &E {
        &self.endpoint
    }

    /// Mutable access to the endpoint, e.g. to change path token values.
    pub fn endpoint_mut(&mut self) -> &mut E {
        &mut self.endpoint
    }

    /// Short endpoint name.
    pub fn name(&self) -> &str {
        self.endpoint.name()
    }

    /// The path with `{token}` placeholders filled in.
    ///
    /// Placeholders without a value are left as written.
    pub fn url_path(&self) -> String {
        let template = self.endpoint.url_path();
        let values = self.endpoint.token_values();
        if values.is_empty() {
            return template.to_string();
        }

        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            let Some(close) = rest[open..].find('}').map(|i| open + i) else {
                break;
            };
            out.push_str(&rest[..open]);
            let token = &rest[open + 1..close];
            match values.get(token) {
                Some(value) if !token.is_empty() => out.push_str(value),
                _ => out.push_str(&rest[open..=close]),
            }
            rest = &rest[close + 1..];
        }
        out.push_str(rest);
        out
    }

    /// Add or replace a header.
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.headers.insert(name, value);
        self
    }

    /// Replace all headers.
    pub fn set_headers(&mut self, headers: HeaderBag) -> &mut Self {
        self.headers = headers;
        self
    }

    /// Current headers.
    pub fn headers(&self) -> &HeaderBag {
        &self.headers
    }

    /// Add or replace a query param.
    pub fn add_query_param(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.query_params.insert(key.into(), value.into());
        self
    }

    /// Replace all query params.
    pub fn set_query_params(&mut self, params: Map<String, Value>) -> &mut Self {
        self.query_params = params;
        self
    }

    /// Current query params.
    pub fn query_params(&self) -> &Map<String, Value> {
        &self.query_params
    }

    /// Add or replace a post param.
    pub fn add_post_param(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.post_params.insert(key.into(), value.into());
        self
    }

    /// Replace all post params.
    pub fn set_post_params(&mut self, params: Map<String, Value>) -> &mut Self {
        self.post_params = params;
        self
    }

    /// Current post params.
    pub fn post_params(&self) -> &Map<String, Value> {
        &self.post_params
    }

    /// Look up one post param by dotted key.
    pub fn post_param(&self, key: &str) -> Option<&Value> {
        lookup_in(&self.post_params, key)
    }

    /// Check the params against the endpoint's rules: query first, then post.
    pub fn validate(&self) -> Result<()> {
        let checks = [
            (self.endpoint.query_param_rules(), &self.query_params),
            (self.endpoint.post_param_rules(), &self.post_params),
        ];
        for (rules, params) in checks {
            if rules.is_empty() {
                continue;
            }
            rules
                .validate(params)
                .map_err(|errors| Error::new(ErrorKind::ValidationFailed(errors)))?;
        }
        Ok(())
    }

    /// Validate, dispatch and cache the response. Always one round trip.
    pub async fn send(&mut self) -> Result<&mut Self> {
        self.validate()?;

        let client = self.client;
        let raw = client.dispatch(self).await?;
        let status = self.endpoint.extract_status(&raw);
        let body = self.endpoint.handle_response(self.endpoint.decode(&raw)?);
        self.sent = Some(SentResponse { raw, status, body });

        if !(200..300).contains(&status) {
            return Err(Error::new(ErrorKind::InvalidResponse { status }));
        }
        Ok(self)
    }

    /// Send only if nothing has been sent yet.
    pub async fn ensure_sent(&mut self) -> Result<()> {
        if self.sent.is_none() {
            self.send().await?;
        }
        Ok(())
    }

    async fn sent_response(&mut self) -> Result<&SentResponse> {
        self.ensure_sent().await?;
        self.sent
            .as_ref()
            .ok_or_else(|| Error::new(ErrorKind::Other(format!("{} has no response", self.name()))))
    }

    /// The whole decoded body.
    pub async fn response(&mut self) -> Result<&Value> {
        Ok(&self.sent_response().await?.body)
    }

    /// The whole decoded body, or `default` when it is `null` (e.g. empty).
    pub async fn response_or_default(&mut self, default: Value) -> Result<Value> {
        match self.response().await? {
            Value::Null => Ok(default),
            body => Ok(body.clone()),
        }
    }

    /// One value from the body by dotted key.
    pub async fn response_get(&mut self, key: &str) -> Result<Option<&Value>> {
        Ok(lookup(&self.sent_response().await?.body, key))
    }

    /// One value from the body, or `default` when absent.
    pub async fn response_or(&mut self, key: &str, default: Value) -> Result<Value> {
        Ok(self.response_get(key).await?.cloned().unwrap_or(default))
    }

    /// One value from the body, or the result of `default` when absent.
    pub async fn response_or_else<F>(&mut self, key: &str, default: F) -> Result<Value>
    where
        F: FnOnce() -> Value,
    {
        Ok(self.response_get(key).await?.cloned().unwrap_or_else(default))
    }

    /// One value from the body deserialized into `T`.
    pub async fn response_as<T: DeserializeOwned>(&mut self, key: &str) -> Result<Option<T>> {
        match self.response_get(key).await? {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }

    /// The status the response was judged by.
    pub async fn response_status(&mut self) -> Result<u16> {
        Ok(self.sent_response().await?.status)
    }

    /// The raw response snapshot.
    pub async fn raw_response(&mut self) -> Result<&Response> {
        Ok(&self.sent_response().await?.raw)
    }

    /// Returns true once a response has been cached.
    pub fn is_sent(&self) -> bool {
        self.sent.is_some()
    }

    /// Cached body, without sending.
    pub fn cached_response(&self) -> Option<&Value> {
        self.sent.as_ref().map(|sent| &sent.body)
    }

    /// Cached status, without sending.
    pub fn cached_status(&self) -> Option<u16> {
        self.sent.as_ref().map(|sent| sent.status)
    }

    /// Cached raw response, without sending.
    pub fn cached_raw_response(&self) -> Option<&Response> {
        self.sent.as_ref().map(|sent| &sent.raw)
    }

    /// Cache key for this call: endpoint cache name plus its key suffix.
    pub fn cache_key(&self) -> String {
        self.compose_cache_key(&self.endpoint.cache_key_suffix())
    }

    /// Cache key for this endpoint with an explicit suffix.
    pub fn compose_cache_key<S: AsRef<str>>(&self, suffix: &[S]) -> String {
        compose_cache_key(&self.endpoint.cache_name(), suffix, DEFAULT_GLUE)
    }

    /// Drop any externally cached copy of this call's response.
    pub fn clear_cache(&self, store: &dyn CacheStore) -> bool {
        store.forget(&self.cache_key())
    }
}
