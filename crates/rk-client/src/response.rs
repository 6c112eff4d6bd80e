//! HTTP response snapshots and JSON path lookup.

use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::Result;

/// A fully-read HTTP response.
///
/// The transport body is consumed once when the response arrives, so the
/// snapshot can be cached on a method and read any number of times.
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    reason: String,
    headers: HeaderMap,
    body: String,
}

impl Response {
    /// Build a snapshot from parts.
    pub fn new(status: u16, headers: HeaderMap, body: impl Into<String>) -> Self {
        let reason = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or_default()
            .to_string();
        Self {
            status,
            reason,
            headers,
            body: body.into(),
        }
    }

    /// Read a reqwest response to completion.
    pub(crate) async fn from_reqwest(response: reqwest::Response) -> Result<Self> {
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.text().await?;
        Ok(Self::new(status, headers, body))
    }

    /// Get the HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Canonical reason phrase for the status (`"Not Found"`), empty if unknown.
    pub fn reason_phrase(&self) -> &str {
        &self.reason
    }

    /// Returns true if the response status is successful (2xx).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Get a header value.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// All response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get the Content-Type header.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Get the response body as text.
    pub fn text(&self) -> &str {
        &self.body
    }

    /// Deserialize the response body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Decode the body into a generic JSON tree; an empty body is `null`.
    pub fn json_value(&self) -> Result<Value> {
        if self.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        self.json()
    }

    /// Headers as `name -> value` pairs for logging.
    pub(crate) fn header_pairs(&self) -> Vec<(String, String)> {
        self.headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    value.to_str().unwrap_or("<binary>").to_string(),
                )
            })
            .collect()
    }
}

/// Look up a dotted key path in a JSON tree.
///
/// A key that exists literally wins (`"a.b"` as a single key); otherwise the
/// key is split on `.` and each segment descends into an object by name or
/// into an array by index.
pub fn lookup<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => lookup_in(map, key),
        Value::Array(_) => descend(value, key),
        _ => None,
    }
}

/// [`lookup`] starting from an object map.
pub fn lookup_in<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    if let Some(value) = map.get(key) {
        return Some(value);
    }
    if !key.contains('.') {
        return None;
    }
    let (head, rest) = key.split_once('.')?;
    descend(map.get(head)?, rest)
}

fn descend<'a>(mut current: &'a Value, path: &str) -> Option<&'a Value> {
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}
