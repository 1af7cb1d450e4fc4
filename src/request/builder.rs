//! Declarative request builder
//!
//! Accumulates path, query parameters, headers and body, then assembles a
//! [`PreparedRequest`] and executes it through the owning [`Session`].

use super::response::{EmptyResponse, ErrorResponse};
use super::session::Session;
use crate::error::{Error, Result};
use crate::http::{PreparedRequest, RawResponse};
use crate::types::{BodyPolicy, JsonObject, JsonValue, Method};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, COOKIE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;
use url::Url;

/// Builder for a single request
///
/// ```ignore
/// let users: Vec<User> = session
///     .get("/users")
///     .param("role", Some("admin"))
///     .header("Accept-Language", "en")
///     .array()
///     .await?;
/// ```
#[derive(Debug)]
pub struct RequestBuilder<'a> {
    session: &'a Session,
    path: String,
    method: Method,
    headers: Vec<(String, String)>,
    params: Vec<(String, Vec<Option<String>>)>,
    document: Option<std::result::Result<JsonValue, String>>,
    fields: JsonObject,
}

impl<'a> RequestBuilder<'a> {
    pub(crate) fn new(session: &'a Session, path: String, method: Method) -> Self {
        Self {
            session,
            path,
            method,
            headers: Vec::new(),
            params: Vec::new(),
            document: None,
            fields: JsonObject::new(),
        }
    }

    /// Request path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Request method
    pub fn method(&self) -> Method {
        self.method
    }

    /// Add a query parameter value; repeated names accumulate in order
    #[must_use]
    pub fn param<V: Into<String>>(mut self, name: impl Into<String>, value: Option<V>) -> Self {
        self.values_for(name.into()).push(value.map(Into::into));
        self
    }

    /// Add several values for one query parameter
    #[must_use]
    pub fn params<I, V>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<V>>,
        V: Into<String>,
    {
        let slot = self.values_for(name.into());
        slot.extend(values.into_iter().map(|v| v.map(Into::into)));
        self
    }

    /// Set a header; explicit headers override defaults and the cookie header
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    /// Set a structured body document; takes precedence over named fields
    #[must_use]
    pub fn dto<T: Serialize + ?Sized>(mut self, body: &T) -> Self {
        self.document = Some(serde_json::to_value(body).map_err(|e| e.to_string()));
        self
    }

    /// Set the body document from a JSON value
    #[must_use]
    pub fn json(mut self, body: JsonValue) -> Self {
        self.document = Some(Ok(body));
        self
    }

    /// Set a named body field
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    fn values_for(&mut self, name: String) -> &mut Vec<Option<String>> {
        let index = match self.params.iter().position(|(n, _)| *n == name) {
            Some(index) => index,
            None => {
                self.params.push((name, Vec::new()));
                self.params.len() - 1
            }
        };
        &mut self.params[index].1
    }

    /// Assemble the request without executing it
    pub async fn build(&self) -> Result<PreparedRequest> {
        let url = self.build_url()?;
        let body = self.build_body()?;
        let headers = self.build_headers().await?;

        Ok(PreparedRequest {
            method: self.method,
            url,
            headers,
            body,
        })
    }

    fn build_url(&self) -> Result<Url> {
        let raw = if self.path.starts_with("http://") || self.path.starts_with("https://") {
            self.path.clone()
        } else if self.path.is_empty() {
            self.session.base_url().to_string()
        } else {
            let base = self.session.base_url().trim_end_matches('/');
            let path = self.path.trim_start_matches('/');
            format!("{base}/{path}")
        };

        let mut url = Url::parse(&raw)?;
        if self.params.iter().any(|(_, values)| !values.is_empty()) {
            let mut query = url.query_pairs_mut();
            for (name, values) in &self.params {
                for value in values {
                    query.append_pair(name, value.as_deref().unwrap_or(""));
                }
            }
        }
        Ok(url)
    }

    fn build_body(&self) -> Result<Option<JsonValue>> {
        let body = match &self.document {
            Some(Ok(document)) => Some(document.clone()),
            Some(Err(message)) => {
                return Err(Error::Encode {
                    message: message.clone(),
                })
            }
            None if !self.fields.is_empty() => Some(JsonValue::Object(self.fields.clone())),
            None => None,
        };

        if body.is_none() || self.method.allows_body() {
            return Ok(body);
        }

        match self.session.body_policy() {
            BodyPolicy::Reject => Err(Error::BodyNotAllowed {
                method: self.method.to_string(),
            }),
            BodyPolicy::Ignore => {
                warn!("dropping body attached to {} {}", self.method, self.path);
                Ok(None)
            }
        }
    }

    async fn build_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        for (name, value) in self.session.default_headers() {
            insert_header(&mut headers, name, value)?;
        }

        let explicit_cookie = self
            .headers
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case(COOKIE.as_str()));
        if !explicit_cookie && !headers.contains_key(COOKIE) {
            if let Some(cookie) = self.session.cookies().header_value().await {
                insert_header(&mut headers, COOKIE.as_str(), &cookie)?;
            }
        }

        for (name, value) in &self.headers {
            insert_header(&mut headers, name, value)?;
        }

        Ok(headers)
    }

    /// Build and execute, returning the raw response
    pub async fn send(self) -> Result<RawResponse> {
        let request = self.build().await?;
        self.session.execute(request).await
    }

    /// Execute and decode a single JSON object
    pub async fn object<T: DeserializeOwned>(self) -> Result<T> {
        self.send().await?.error_for_status()?.json()
    }

    /// Execute and decode a JSON array
    pub async fn array<T: DeserializeOwned>(self) -> Result<Vec<T>> {
        self.send().await?.error_for_status()?.json()
    }

    /// Execute and accept any (or no) body
    pub async fn empty(self) -> Result<EmptyResponse> {
        let response = self.send().await?.error_for_status()?;
        if is_blank(&response) {
            return Ok(EmptyResponse::default());
        }
        Ok(EmptyResponse {
            body: response.json()?,
        })
    }

    /// Execute and decode an error payload, whatever the status
    pub async fn error_response(self) -> Result<ErrorResponse> {
        let response = self.send().await?;
        let mut decoded = if is_blank(&response) {
            ErrorResponse::default()
        } else {
            response.json::<ErrorResponse>()?
        };
        decoded.status = response.status;
        Ok(decoded)
    }
}

fn is_blank(response: &RawResponse) -> bool {
    response.body.iter().all(u8::is_ascii_whitespace)
}

fn insert_header(headers: &mut HeaderMap, name: &str, value: &str) -> Result<()> {
    let header_name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| Error::invalid_header(name, e.to_string()))?;
    let header_value =
        HeaderValue::from_str(value).map_err(|e| Error::invalid_header(name, e.to_string()))?;
    headers.insert(header_name, header_value);
    Ok(())
}
