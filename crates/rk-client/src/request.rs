//! Request vocabulary: verbs, post-param encodings, headers and the
//! per-call content bag the client hands to the transport.

use std::fmt;
use std::io;
use std::str::FromStr;

use restkit_auth::{AuthTarget, ConnectionAuth};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, ErrorKind, Result};

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Options,
}

impl HttpMethod {
    /// Convert to reqwest::Method.
    pub fn to_reqwest(self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Options => reqwest::Method::OPTIONS,
        }
    }

    /// The verb as it goes on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "OPTIONS" => Ok(HttpMethod::Options),
            other => Err(Error::new(ErrorKind::Config(format!(
                "unsupported HTTP method '{other}'"
            )))),
        }
    }
}

/// How post params are written into the request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PostParamsMode {
    /// `application/x-www-form-urlencoded`.
    #[serde(rename = "form")]
    Form,
    /// JSON with non-ASCII characters written as `\uXXXX` escapes.
    #[default]
    #[serde(rename = "json")]
    Json,
    /// JSON with UTF-8 written verbatim; forces `Content-Type: application/json`.
    #[serde(rename = "json-unescaped-unicode")]
    JsonUnescapedUnicode,
}

/// Ordered header mapping with unique keys.
///
/// Keys compare ignoring ASCII case, the way HTTP does. Overwriting a key
/// keeps its original position and takes the new spelling and value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderBag {
    entries: Vec<(String, String)>,
}

impl HeaderBag {
    /// An empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a header.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .entries
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
        {
            Some(entry) => *entry = (name, value),
            None => self.entries.push((name, value)),
        }
    }

    /// Get a header by name, ignoring ASCII case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Returns true if a header with this name is present.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Remove a header, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self
            .entries
            .iter()
            .position(|(existing, _)| existing.eq_ignore_ascii_case(name))?;
        Some(self.entries.remove(index).1)
    }

    /// A copy of `self` with `other` laid on top; `other` wins on collision.
    pub fn merged(&self, other: &HeaderBag) -> HeaderBag {
        let mut merged = self.clone();
        merged.extend(other);
        merged
    }

    /// Insert every header from `other`.
    pub fn extend(&mut self, other: &HeaderBag) {
        for (name, value) in &other.entries {
            self.insert(name.clone(), value.clone());
        }
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Number of headers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the bag is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy with credential-bearing values masked, for logs.
    pub fn redacted(&self) -> HeaderBag {
        let entries = self
            .entries
            .iter()
            .map(|(name, value)| {
                if is_sensitive_header(name) {
                    (name.clone(), "[REDACTED]".to_string())
                } else {
                    (name.clone(), value.clone())
                }
            })
            .collect();
        HeaderBag { entries }
    }
}

fn is_sensitive_header(name: &str) -> bool {
    name.eq_ignore_ascii_case("authorization")
        || name.eq_ignore_ascii_case("proxy-authorization")
        || name.eq_ignore_ascii_case("cookie")
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for HeaderBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bag = HeaderBag::new();
        for (name, value) in iter {
            bag.insert(name, value);
        }
        bag
    }
}

impl Serialize for HeaderBag {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Request body content.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Pairs written as `application/x-www-form-urlencoded`.
    Form(Vec<(String, String)>),
    /// A JSON tree written with non-ASCII characters escaped.
    Json(Value),
    /// Bytes sent verbatim.
    Raw(String),
}

impl RequestBody {
    /// Build the body for `params` under the given mode.
    pub fn for_params(params: &Map<String, Value>, mode: PostParamsMode) -> Result<Self> {
        Ok(match mode {
            PostParamsMode::Form => RequestBody::Form(flatten_params(params)),
            PostParamsMode::Json => RequestBody::Json(Value::Object(params.clone())),
            PostParamsMode::JsonUnescapedUnicode => {
                RequestBody::Raw(serde_json::to_string(params)?)
            }
        })
    }

    /// Serialize the body to the wire format.
    pub fn encode(&self) -> Result<String> {
        match self {
            RequestBody::Form(pairs) => serde_urlencoded::to_string(pairs).map_err(|e| {
                Error::with_source(ErrorKind::Other(format!("form encoding failed: {e}")), e)
            }),
            RequestBody::Json(value) => to_ascii_json(value),
            RequestBody::Raw(text) => Ok(text.clone()),
        }
    }
}

/// Everything the transport needs besides verb and URL.
#[derive(Debug, Clone, Default)]
pub struct RequestContent {
    /// Headers in the order they were declared.
    pub headers: HeaderBag,
    /// Flattened query pairs.
    pub query: Vec<(String, String)>,
    /// Optional body.
    pub body: Option<RequestBody>,
    /// Transport-level credentials.
    pub connection_auth: Option<ConnectionAuth>,
}

impl RequestContent {
    /// Empty content.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Attach params as the query string.
    pub fn query_params(mut self, params: &Map<String, Value>) -> Self {
        self.query = flatten_params(params);
        self
    }

    /// Attach post params encoded per `mode`, adjusting Content-Type to match.
    pub fn post_params(mut self, params: &Map<String, Value>, mode: PostParamsMode) -> Result<Self> {
        self.body = Some(RequestBody::for_params(params, mode)?);
        match mode {
            PostParamsMode::Form => self
                .headers
                .insert("Content-Type", "application/x-www-form-urlencoded"),
            PostParamsMode::Json => {
                if !self.headers.contains("Content-Type") {
                    self.headers.insert("Content-Type", "application/json");
                }
            }
            PostParamsMode::JsonUnescapedUnicode => {
                self.headers.insert("Content-Type", "application/json")
            }
        }
        Ok(self)
    }

    /// Set a body directly.
    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Summary for tracing, with credentials masked.
    pub(crate) fn log_summary(&self) -> Value {
        let body = self.body.as_ref().map(|body| match body.encode() {
            Ok(text) => Value::String(text),
            Err(_) => Value::String("<unencodable>".to_string()),
        });
        serde_json::json!({
            "headers": self.headers.redacted(),
            "query": self.query,
            "body": body,
            "auth": self.connection_auth.as_ref().map(|auth| auth.user.clone()),
        })
    }
}

impl AuthTarget for RequestContent {
    fn add_header(&mut self, name: &str, value: &str) {
        self.headers.insert(name, value);
    }

    fn set_connection_auth(&mut self, auth: ConnectionAuth) {
        self.connection_auth = Some(auth);
    }
}

/// Flatten a param mapping into `key=value` pairs.
///
/// Booleans become `1`/`0`, `null` is dropped, arrays use `key[0]`, objects
/// use `key[sub]`, recursively.
pub fn flatten_params(params: &Map<String, Value>) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (key, value) in params {
        flatten_into(key, value, &mut pairs);
    }
    pairs
}

fn flatten_into(prefix: &str, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Null => {}
        Value::Bool(b) => out.push((prefix.to_string(), if *b { "1" } else { "0" }.to_string())),
        Value::Number(n) => out.push((prefix.to_string(), n.to_string())),
        Value::String(s) => out.push((prefix.to_string(), s.clone())),
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten_into(&format!("{prefix}[{index}]"), item, out);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                flatten_into(&format!("{prefix}[{key}]"), item, out);
            }
        }
    }
}

/// JSON formatter that writes every non-ASCII char as `\uXXXX`.
struct AsciiFormatter;

impl serde_json::ser::Formatter for AsciiFormatter {
    fn write_string_fragment<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        let mut start = 0;
        for (index, ch) in fragment.char_indices() {
            if ch.is_ascii() {
                continue;
            }
            writer.write_all(&fragment.as_bytes()[start..index])?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{unit:04x}")?;
            }
            start = index + ch.len_utf8();
        }
        writer.write_all(&fragment.as_bytes()[start..])
    }
}

/// Serialize to JSON with non-ASCII characters escaped.
pub fn to_ascii_json(value: &Value) -> Result<String> {
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, AsciiFormatter);
    value.serialize(&mut serializer)?;
    String::from_utf8(buf).map_err(|e| {
        Error::with_source(ErrorKind::Other("JSON output was not UTF-8".to_string()), e)
    })
}
