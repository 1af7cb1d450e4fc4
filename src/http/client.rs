//! HTTP client with retry and rate limiting
//!
//! Provides the default [`Executor`] implementation on top of reqwest:
//! - Automatic retries with configurable backoff
//! - Rate limiting to prevent API throttling
//! - Error classification for retry decisions
//!
//! Non-2xx responses that are not retried are handed back as
//! [`RawResponse`] so callers can decode typed error bodies.

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use super::types::{Executor, PreparedRequest, RawResponse};
use crate::config::HttpConfig;
use crate::error::{is_retryable_status, Error, Result};
use crate::types::BackoffType;
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout
    pub timeout: Duration,
    /// Maximum number of retries
    pub max_retries: u32,
    /// Initial delay for backoff
    pub initial_backoff: Duration,
    /// Maximum delay for backoff
    pub max_backoff: Duration,
    /// Type of backoff strategy
    pub backoff_type: BackoffType,
    /// Rate limiter configuration
    pub rate_limit: Option<RateLimiterConfig>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(60),
            backoff_type: BackoffType::Exponential,
            rate_limit: None,
            user_agent: format!("pagefetch/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

impl From<&HttpConfig> for HttpClientConfig {
    fn from(http: &HttpConfig) -> Self {
        let defaults = Self::default();
        Self {
            timeout: Duration::from_secs(http.timeout_seconds),
            max_retries: http.max_retries,
            initial_backoff: Duration::from_millis(http.retry_backoff.initial_ms),
            max_backoff: Duration::from_millis(http.retry_backoff.max_ms),
            backoff_type: http.retry_backoff.backoff_type,
            rate_limit: http.rate_limit.as_ref().map(|limit| {
                RateLimiterConfig::new(
                    limit.requests_per_second,
                    limit.burst_size.unwrap_or(limit.requests_per_second),
                )
            }),
            user_agent: http.user_agent.clone().unwrap_or(defaults.user_agent),
        }
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set max retries
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Set backoff configuration
    pub fn backoff(mut self, backoff_type: BackoffType, initial: Duration, max: Duration) -> Self {
        self.config.backoff_type = backoff_type;
        self.config.initial_backoff = initial;
        self.config.max_backoff = max;
        self
    }

    /// Set rate limiter
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Disable rate limiting
    pub fn no_rate_limit(mut self) -> Self {
        self.config.rate_limit = None;
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// Outcome of a single network attempt
enum Attempt {
    Done(RawResponse),
    Retry { delay: Duration, error: Error },
    Fail(Error),
}

/// HTTP client with retry and rate limiting
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    rate_limiter: Option<RateLimiter>,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            client,
            config,
            rate_limiter,
        })
    }

    /// Get the underlying reqwest client
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Get the client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Check if rate limiting is enabled
    pub fn has_rate_limiter(&self) -> bool {
        self.rate_limiter.is_some()
    }

    /// Execute a prepared request, retrying transient failures
    ///
    /// Timeouts, connection errors and retryable statuses are retried up to
    /// `max_retries` times. A 429 waits for `Retry-After`; once retries run
    /// out it becomes [`Error::RateLimited`]. Any other final status is
    /// returned as a [`RawResponse`].
    pub async fn send(&self, request: &PreparedRequest) -> Result<RawResponse> {
        let max_retries = self.config.max_retries;
        let mut last_error = None;

        for attempt in 0..=max_retries {
            if let Some(limiter) = &self.rate_limiter {
                limiter.wait().await;
            }

            let can_retry = attempt < max_retries;
            let (delay, error) = match self.attempt(request, attempt, can_retry).await {
                Attempt::Done(response) => return Ok(response),
                Attempt::Fail(error) => return Err(error),
                Attempt::Retry { delay, error } => (delay, error),
            };

            warn!(
                method = %request.method,
                url = %request.url,
                attempt = attempt + 1,
                of = max_retries + 1,
                ?delay,
                error = %error,
                "retrying request"
            );
            tokio::time::sleep(delay).await;
            last_error = Some(error);
        }

        Err(last_error.unwrap_or(Error::MaxRetriesExceeded { max_retries }))
    }

    async fn attempt(&self, request: &PreparedRequest, attempt: u32, can_retry: bool) -> Attempt {
        let mut builder = self
            .client
            .request(request.method.into(), request.url.clone())
            .headers(request.headers.clone())
            .timeout(self.config.timeout);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                let error = Error::Timeout {
                    timeout_ms: self.config.timeout.as_millis() as u64,
                };
                return self.retry_or_fail(attempt, can_retry, error);
            }
            Err(e) if e.is_connect() => {
                return self.retry_or_fail(attempt, can_retry, Error::Http(e));
            }
            Err(e) => return Attempt::Fail(Error::Http(e)),
        };

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = retry_after_seconds(&response);
            let error = Error::RateLimited {
                retry_after_seconds: retry_after,
            };
            return if can_retry {
                Attempt::Retry {
                    delay: Duration::from_secs(retry_after),
                    error,
                }
            } else {
                Attempt::Fail(error)
            };
        }

        if can_retry && is_retryable_status(status.as_u16()) {
            let error = Error::http_status(status.as_u16(), String::new());
            return self.retry_or_fail(attempt, true, error);
        }

        debug!(
            method = %request.method,
            url = %request.url,
            status = status.as_u16(),
            "request completed"
        );
        match into_raw(response).await {
            Ok(raw) => Attempt::Done(raw),
            Err(e) => Attempt::Fail(e),
        }
    }

    fn retry_or_fail(&self, attempt: u32, can_retry: bool, error: Error) -> Attempt {
        if can_retry {
            Attempt::Retry {
                delay: self.calculate_backoff(attempt),
                error,
            }
        } else {
            Attempt::Fail(error)
        }
    }

    /// Calculate backoff delay for a given attempt
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let delay = match self.config.backoff_type {
            BackoffType::Constant => self.config.initial_backoff,
            BackoffType::Linear => self.config.initial_backoff * (attempt + 1),
            BackoffType::Exponential => {
                let factor = 2u32.saturating_pow(attempt);
                self.config.initial_backoff.saturating_mul(factor)
            }
        };

        std::cmp::min(delay, self.config.max_backoff)
    }
}

#[async_trait]
impl Executor for HttpClient {
    async fn execute(&self, request: PreparedRequest) -> Result<RawResponse> {
        self.send(&request).await
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

/// Read a reqwest response into a [`RawResponse`]
async fn into_raw(response: Response) -> Result<RawResponse> {
    let status = response.status().as_u16();
    let headers = response.headers().clone();
    let body = response.bytes().await?;
    Ok(RawResponse::new(status, headers, body))
}

/// Seconds to wait according to `Retry-After`, 60 when absent or not a number
fn retry_after_seconds(response: &Response) -> u64 {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok())
        .unwrap_or(60)
}
