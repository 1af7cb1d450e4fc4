//! Session: shared base URL, executor, cookie jar and observer

use super::builder::RequestBuilder;
use super::observer::{RequestObserver, TracingObserver};
use crate::config::ClientConfig;
use crate::cookie::CookieJar;
use crate::error::Result;
use crate::http::{Executor, HttpClient, HttpClientConfig, PreparedRequest, RawResponse};
use crate::types::{BodyPolicy, Method};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Entry point for building requests
///
/// Cloning is cheap; clones share the executor and the cookie jar.
#[derive(Clone)]
pub struct Session {
    base_url: String,
    body_policy: BodyPolicy,
    default_headers: HashMap<String, String>,
    executor: Arc<dyn Executor>,
    cookies: CookieJar,
    observer: Option<Arc<dyn RequestObserver>>,
}

impl Session {
    /// Create a session over an arbitrary executor
    pub fn new(config: ClientConfig, executor: Arc<dyn Executor>) -> Self {
        let observer: Option<Arc<dyn RequestObserver>> = if config.print_log {
            Some(Arc::new(TracingObserver))
        } else {
            None
        };

        Self {
            base_url: config.base_url,
            body_policy: config.body_policy,
            default_headers: config.default_headers,
            executor,
            cookies: CookieJar::new(),
            observer,
        }
    }

    /// Create a session backed by [`HttpClient`] built from `config.http`
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let client = HttpClient::with_config(HttpClientConfig::from(&config.http))?;
        Ok(Self::new(config, Arc::new(client)))
    }

    /// Install an observer, replacing any existing one
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn RequestObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Use an existing cookie jar (e.g. shared with another session)
    #[must_use]
    pub fn with_cookie_jar(mut self, jar: CookieJar) -> Self {
        self.cookies = jar;
        self
    }

    /// Start building a request
    pub fn create(&self, path: impl Into<String>, method: Method) -> RequestBuilder<'_> {
        RequestBuilder::new(self, path.into(), method)
    }

    /// Start building a GET request
    pub fn get(&self, path: impl Into<String>) -> RequestBuilder<'_> {
        self.create(path, Method::GET)
    }

    /// Start building a POST request
    pub fn post(&self, path: impl Into<String>) -> RequestBuilder<'_> {
        self.create(path, Method::POST)
    }

    /// Start building a PUT request
    pub fn put(&self, path: impl Into<String>) -> RequestBuilder<'_> {
        self.create(path, Method::PUT)
    }

    /// Start building a PATCH request
    pub fn patch(&self, path: impl Into<String>) -> RequestBuilder<'_> {
        self.create(path, Method::PATCH)
    }

    /// Start building a DELETE request
    pub fn delete(&self, path: impl Into<String>) -> RequestBuilder<'_> {
        self.create(path, Method::DELETE)
    }

    /// Base URL requests are resolved against
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Body policy for non-mutating methods
    pub fn body_policy(&self) -> BodyPolicy {
        self.body_policy
    }

    /// Headers added to every request
    pub fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// The session cookie jar
    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }

    /// Execute a prepared request, ingesting cookies and notifying the observer
    pub async fn execute(&self, request: PreparedRequest) -> Result<RawResponse> {
        if let Some(observer) = &self.observer {
            observer.on_request(&request);
        }

        let response = self.executor.execute(request.clone()).await?;

        let stored = self.cookies.ingest(response.set_cookies()).await;
        if stored > 0 {
            debug!("{} cookie(s) updated from {}", stored, request.url);
        }

        if let Some(observer) = &self.observer {
            observer.on_response(&request, &response);
        }

        Ok(response)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url)
            .field("body_policy", &self.body_policy)
            .field("has_observer", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}
