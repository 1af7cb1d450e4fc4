//! Request/response descriptions and the executor seam

use crate::error::{Error, Result};
use crate::types::{JsonValue, Method};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, SET_COOKIE};
use serde::de::DeserializeOwned;
use url::Url;

/// A fully assembled request, ready to be executed
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    /// HTTP method
    pub method: Method,
    /// Absolute URL including the query string
    pub url: Url,
    /// Final header set (defaults, cookie header and explicit headers merged)
    pub headers: HeaderMap,
    /// JSON body, only ever present for POST/PUT/PATCH
    pub body: Option<JsonValue>,
}

impl PreparedRequest {
    /// Look up a header value as a string
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Raw response returned by an [`Executor`]
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body bytes
    pub body: Bytes,
}

impl RawResponse {
    /// Create a response from its parts
    pub fn new(status: u16, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// True for 2xx statuses
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as (lossy) UTF-8 text
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body)
            .map_err(|e| Error::decode(format!("Failed to parse JSON: {e}")))
    }

    /// All `Set-Cookie` header values that are valid strings
    pub fn set_cookies(&self) -> impl Iterator<Item = &str> {
        self.headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
    }

    /// Turn a non-2xx response into [`Error::HttpStatus`]
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::http_status(self.status, self.text()))
        }
    }
}

/// Executes prepared requests
///
/// This is the seam between request construction and the network. The
/// default implementation is [`super::HttpClient`]; tests and embedders can
/// supply their own.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Perform the request and return the raw response
    async fn execute(&self, request: PreparedRequest) -> Result<RawResponse>;
}
