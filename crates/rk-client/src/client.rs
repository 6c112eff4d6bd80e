//! REST client: base URL, shared headers, auth, and the HTTP transport.

use std::fmt::Display;
use std::net::IpAddr;
use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone};
use restkit_auth::{AuthConfig, AuthStrategy, AuthTarget, ConnectionAuth};
use tracing::{info, instrument};
use serde_json::Value;
use url::Url;

use crate::config::{ClientConfig, TlsVerification};
use crate::error::{Error, ErrorKind, Result};
use crate::method::{Endpoint, RestMethod};
use crate::request::{HeaderBag, HttpMethod, RequestContent};
use crate::response::Response;

/// Timestamp layout used by [`format_date_with_time_offset`].
pub const DATE_WITH_OFFSET_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// A REST API client shared by any number of methods.
///
/// Holds the base URL, headers sent with every call (initially
/// `Content-Type: application/json`), an optional auth strategy and
/// transport credentials. Cloning is cheap; clones share the connection
/// pool.
#[derive(Clone)]
pub struct RestClient {
    name: String,
    base_url: Option<String>,
    headers: HeaderBag,
    auth: Option<Arc<dyn AuthStrategy>>,
    connection_auth: Option<ConnectionAuth>,
    http: reqwest::Client,
    config: ClientConfig,
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("name", &self.name)
            .field("base_url", &self.base_url)
            .field("headers", &self.headers.redacted())
            .field("auth", &self.auth)
            .field("connection_auth", &self.connection_auth)
            .finish_non_exhaustive()
    }
}

impl RestClient {
    /// Create a client with no base URL and no auth.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = build_http_client(&config)?;
        let mut headers = HeaderBag::new();
        headers.insert("Content-Type", "application/json");

        Ok(Self {
            name: "RestClient".to_string(),
            base_url: None,
            headers,
            auth: None,
            connection_auth: None,
            http,
            config,
        })
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.set_base_url(base_url);
        self
    }

    /// Set the name used in logs and errors.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Attach an auth strategy.
    pub fn with_auth(mut self, auth: Arc<dyn AuthStrategy>) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Add a header sent with every call.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Client name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Base URL, if configured.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Replace the base URL.
    pub fn set_base_url(&mut self, base_url: impl Into<String>) {
        self.base_url = Some(base_url.into());
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Attached auth strategy.
    pub fn auth(&self) -> Option<&Arc<dyn AuthStrategy>> {
        self.auth.as_ref()
    }

    /// Replace or remove the auth strategy.
    pub fn set_auth(&mut self, auth: Option<Arc<dyn AuthStrategy>>) {
        self.auth = auth;
    }

    /// Replace the auth strategy with one built from a named kind and its
    /// settings (`"basic"`, `"bearer"` or `"none"`).
    pub fn set_auth_from(&mut self, kind: &str, settings: &Value) -> Result<()> {
        self.auth = AuthConfig::strategy_for(kind, settings)?;
        Ok(())
    }

    /// Add or replace a header sent with every call.
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.headers.insert(name, value);
        self
    }

    /// Replace all client headers.
    pub fn set_headers(&mut self, headers: HeaderBag) -> &mut Self {
        self.headers = headers;
        self
    }

    /// Headers sent with every call.
    pub fn headers(&self) -> &HeaderBag {
        &self.headers
    }

    /// Set transport credentials sent with every call.
    pub fn set_connection_auth(&mut self, auth: Option<ConnectionAuth>) {
        self.connection_auth = auth;
    }

    /// Transport credentials, if any.
    pub fn connection_auth(&self) -> Option<&ConnectionAuth> {
        self.connection_auth.as_ref()
    }

    /// Apply the attached strategy to the client itself, so every later
    /// call carries its credentials regardless of the method's auth flag.
    pub fn authorize(&mut self) {
        if let Some(auth) = self.auth.clone() {
            auth.authorize(self);
        }
    }

    /// Absolute URL for a method.
    pub fn request_url_for<E: Endpoint>(&self, method: &RestMethod<'_, E>) -> Result<String> {
        let base = self
            .base_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                Error::new(ErrorKind::MissingBaseUrl {
                    client: self.name.clone(),
                })
            })?;

        let path = method.url_path();
        let separator = if path.starts_with('/') { "" } else { "/" };
        Ok(format!("{}{separator}{path}", base.trim_end_matches('/')))
    }

    /// Assemble headers, credentials, body and query for one call.
    ///
    /// Params pass through [`Endpoint::prepare_params`] before encoding.
    ///
    /// Auth is applied to a copy of the client state, so concurrent calls
    /// never observe each other's credentials. Method headers win over
    /// client headers.
    pub fn prepare_content<E: Endpoint>(&self, method: &RestMethod<'_, E>) -> Result<RequestContent> {
        let endpoint = method.endpoint();
        let mut content = RequestContent {
            headers: self.headers.clone(),
            connection_auth: self.connection_auth.clone(),
            ..RequestContent::default()
        };

        if endpoint.auth_enabled() {
            if let Some(auth) = &self.auth {
                auth.authorize(&mut content);
            }
        }
        content.headers.extend(method.headers());

        let post_params = endpoint.prepare_params(method.post_params().clone(), HttpMethod::Post);
        if !post_params.is_empty() {
            content = content.post_params(&post_params, endpoint.post_params_mode())?;
        }
        let query_params = endpoint.prepare_params(method.query_params().clone(), HttpMethod::Get);
        if !query_params.is_empty() {
            content = content.query_params(&query_params);
        }
        Ok(content)
    }

    /// Send a method and return the raw response.
    ///
    /// HTTP 404 becomes [`ErrorKind::NotFound`]; every other failure is
    /// returned unchanged.
    #[instrument(skip_all, fields(client = %self.name, method = %method.name()))]
    pub async fn dispatch<E: Endpoint>(&self, method: &RestMethod<'_, E>) -> Result<Response> {
        let url = self.request_url_for(method)?;
        let content = self.prepare_content(method)?;
        let verb = method.endpoint().http_method();

        match self.send_raw(verb, &url, content, method.name()).await {
            Err(err) if matches!(err.kind, ErrorKind::Http { status: 404, .. }) => {
                let message = err.to_string();
                Err(Error::with_source(
                    ErrorKind::NotFound {
                        method: method.name().to_string(),
                        endpoint: method.endpoint().cache_name(),
                        url,
                        message,
                    },
                    err,
                ))
            }
            other => other,
        }
    }

    /// Perform one HTTP request.
    ///
    /// Statuses of 400 and above are returned as [`ErrorKind::Http`] with the
    /// response body attached. `label` names the caller in log events.
    pub async fn send_raw(
        &self,
        verb: HttpMethod,
        url: &str,
        content: RequestContent,
        label: &str,
    ) -> Result<Response> {
        let mut url = Url::parse(url)?;
        if !content.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&content.query);
        }

        if self.config.enable_tracing {
            info!(label, verb = %verb, url = %url, "REST >>>> called");
            info!(params = %content.log_summary(), "REST params");
        }

        let mut request = self.http.request(verb.to_reqwest(), url.as_str());
        for (name, value) in content.headers.iter() {
            request = request.header(name, value);
        }
        if let Some(auth) = &content.connection_auth {
            let (user, secret) = auth.pair();
            request = request.basic_auth(user, Some(secret));
        }
        if let Some(body) = &content.body {
            request = request.body(body.encode()?);
        }

        let response = Response::from_reqwest(request.send().await?).await?;
        let status = response.status();

        if status >= 400 {
            if self.config.enable_tracing {
                info!(
                    status,
                    reason = response.reason_phrase(),
                    headers = ?response.header_pairs(),
                    "REST [error] result"
                );
                info!(status, body = response.text(), "<<<< REST");
            }
            return Err(Error::new(ErrorKind::Http {
                status,
                reason: response.reason_phrase().to_string(),
                body: response.text().to_string(),
            }));
        }

        if self.config.enable_tracing {
            info!(status, headers = ?response.header_pairs(), "REST [success] result headers");
            info!(status, body = response.text(), "REST [success] result");
        }
        Ok(response)
    }
}

impl AuthTarget for RestClient {
    fn add_header(&mut self, name: &str, value: &str) {
        self.headers.insert(name, value);
    }

    fn set_connection_auth(&mut self, auth: ConnectionAuth) {
        self.connection_auth = Some(auth);
    }
}

fn build_http_client(config: &ClientConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .pool_idle_timeout(config.pool_idle_timeout)
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .user_agent(&config.user_agent)
        .gzip(true)
        .deflate(true);

    builder = match &config.tls {
        TlsVerification::Enabled => builder,
        TlsVerification::Disabled => builder.danger_accept_invalid_certs(true),
        TlsVerification::CaBundle(path) => {
            let pem = std::fs::read(path).map_err(|e| {
                Error::with_source(
                    ErrorKind::Config(format!("cannot read CA bundle {}", path.display())),
                    e,
                )
            })?;
            let cert = reqwest::Certificate::from_pem(&pem)
                .map_err(|e| Error::with_source(ErrorKind::Config(e.to_string()), e))?;
            builder.add_root_certificate(cert)
        }
    };

    if let Some(interface) = config.interface.as_deref() {
        builder = match interface.parse::<IpAddr>() {
            Ok(addr) => builder.local_address(addr),
            Err(_) => bind_interface_name(builder, interface)?,
        };
    }

    builder
        .build()
        .map_err(|e| Error::with_source(ErrorKind::Config(e.to_string()), e))
}

#[cfg(target_os = "linux")]
fn bind_interface_name(
    builder: reqwest::ClientBuilder,
    interface: &str,
) -> Result<reqwest::ClientBuilder> {
    Ok(builder.interface(interface))
}

#[cfg(not(target_os = "linux"))]
fn bind_interface_name(
    _builder: reqwest::ClientBuilder,
    interface: &str,
) -> Result<reqwest::ClientBuilder> {
    Err(Error::new(ErrorKind::Config(format!(
        "binding to interface '{interface}' needs an IP address on this platform"
    ))))
}

/// Format a timestamp as `YYYY-MM-DDTHH:MM:SS+HH:MM`; `None` means now.
pub fn format_date_with_time_offset<Tz>(date: Option<DateTime<Tz>>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match date {
        Some(date) => date.format(DATE_WITH_OFFSET_FORMAT).to_string(),
        None => Local::now().format(DATE_WITH_OFFSET_FORMAT).to_string(),
    }
}
