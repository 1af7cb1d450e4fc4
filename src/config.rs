//! Configuration types
//!
//! This module contains the configuration structures for sessions, the HTTP
//! executor and paginated fetch profiles. All of them deserialize from YAML
//! (and therefore JSON) via the loader module.

use crate::types::{BackoffType, BodyPolicy, Method};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

// ============================================================================
// Client / Session Config
// ============================================================================

/// Configuration for a [`crate::request::Session`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL every request path is appended to
    #[serde(default)]
    pub base_url: String,

    /// Log every request and response through the tracing observer
    #[serde(default)]
    pub print_log: bool,

    /// Behaviour when a body is attached to a non-mutating method
    #[serde(default)]
    pub body_policy: BodyPolicy,

    /// Headers sent with every request (explicit request headers win)
    #[serde(default)]
    pub default_headers: HashMap<String, String>,

    /// HTTP executor configuration
    #[serde(default)]
    pub http: HttpConfig,
}

impl ClientConfig {
    /// Create a config for the given base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Enable or disable request/response logging
    #[must_use]
    pub fn print_log(mut self, enabled: bool) -> Self {
        self.print_log = enabled;
        self
    }

    /// Set the body policy
    #[must_use]
    pub fn body_policy(mut self, policy: BodyPolicy) -> Self {
        self.body_policy = policy;
        self
    }

    /// Add a default header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    /// Replace the HTTP executor configuration
    #[must_use]
    pub fn http(mut self, http: HttpConfig) -> Self {
        self.http = http;
        self
    }
}

// ============================================================================
// HTTP Config
// ============================================================================

/// HTTP executor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Maximum number of retries
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Retry backoff configuration
    #[serde(default)]
    pub retry_backoff: BackoffConfig,

    /// Rate limiting configuration (disabled when absent)
    #[serde(default)]
    pub rate_limit: Option<RateLimitConfig>,

    /// User agent override
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
            retry_backoff: BackoffConfig::default(),
            rate_limit: None,
            user_agent: None,
        }
    }
}

/// Retry backoff configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Backoff type
    #[serde(rename = "type", default)]
    pub backoff_type: BackoffType,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_backoff")]
    pub initial_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_backoff")]
    pub max_ms: u64,
}

fn default_initial_backoff() -> u64 {
    100
}

fn default_max_backoff() -> u64 {
    60_000
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            backoff_type: BackoffType::default(),
            initial_ms: default_initial_backoff(),
            max_ms: default_max_backoff(),
        }
    }
}

/// Token bucket rate limit for the executor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Requests per second
    pub requests_per_second: u32,

    /// Burst size
    #[serde(default)]
    pub burst_size: Option<u32>,
}

// ============================================================================
// Paginated Fetch Profile
// ============================================================================

/// Describes how one page of a JSON endpoint is requested
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageQuery {
    /// Request path, appended to the session base URL
    pub path: String,

    /// HTTP method
    #[serde(default)]
    pub method: Method,

    /// Query parameter carrying the page number
    #[serde(default = "default_page_param")]
    pub page_param: String,

    /// Query parameter carrying the page size, if the API takes one
    #[serde(default)]
    pub size_param: Option<String>,

    /// Number of items requested per page
    pub page_size: usize,

    /// Page number sent for the first page (usually 0 or 1)
    #[serde(default)]
    pub start_page: usize,

    /// Dot path to the records array in the response body
    #[serde(default)]
    pub records_path: Option<String>,

    /// Extra query parameters sent with every page request
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

fn default_page_param() -> String {
    "page".to_string()
}

impl PageQuery {
    /// Create a page query for `path` with the given page size
    pub fn new(path: impl Into<String>, page_size: usize) -> Self {
        Self {
            path: path.into(),
            method: Method::GET,
            page_param: default_page_param(),
            size_param: None,
            page_size,
            start_page: 0,
            records_path: None,
            params: BTreeMap::new(),
        }
    }

    /// Set the page parameter name
    #[must_use]
    pub fn page_param(mut self, name: impl Into<String>) -> Self {
        self.page_param = name.into();
        self
    }

    /// Set the size parameter name
    #[must_use]
    pub fn size_param(mut self, name: impl Into<String>) -> Self {
        self.size_param = Some(name.into());
        self
    }

    /// Set the first page number
    #[must_use]
    pub fn start_page(mut self, start: usize) -> Self {
        self.start_page = start;
        self
    }

    /// Set the records path
    #[must_use]
    pub fn records_path(mut self, path: impl Into<String>) -> Self {
        self.records_path = Some(path.into());
        self
    }

    /// Add a fixed query parameter
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// A complete paginated fetch setup: session config, page query and throttle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchProfile {
    /// Session configuration
    pub client: ClientConfig,

    /// Page query
    pub query: PageQuery,

    /// Minimum milliseconds between successful page fetches
    #[serde(default)]
    pub min_interval_ms: u64,
}

impl FetchProfile {
    /// Minimum interval between successful fetches
    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_builder() {
        let config = ClientConfig::new("https://api.example.com")
            .print_log(true)
            .body_policy(BodyPolicy::Ignore)
            .header("X-Client", "pagefetch");

        assert_eq!(config.base_url, "https://api.example.com");
        assert!(config.print_log);
        assert_eq!(config.body_policy, BodyPolicy::Ignore);
        assert_eq!(
            config.default_headers.get("X-Client"),
            Some(&"pagefetch".to_string())
        );
        assert_eq!(config.http.timeout_seconds, 30);
        assert!(config.http.rate_limit.is_none());
    }

    #[test]
    fn test_page_query_defaults() {
        let query: PageQuery = serde_yaml::from_str("path: /items\npage_size: 20").unwrap();
        assert_eq!(query.method, Method::GET);
        assert_eq!(query.page_param, "page");
        assert_eq!(query.start_page, 0);
        assert!(query.size_param.is_none());
        assert!(query.params.is_empty());
    }

    #[test]
    fn test_fetch_profile_interval() {
        let profile = FetchProfile {
            client: ClientConfig::new("http://localhost"),
            query: PageQuery::new("/items", 10),
            min_interval_ms: 1500,
        };
        assert_eq!(profile.min_interval(), Duration::from_millis(1500));
    }
}
