//! HTTP execution module
//!
//! Provides the [`Executor`] seam and its reqwest-backed implementation.
//!
//! # Features
//!
//! - **Automatic Retries**: Configurable retry logic with backoff
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Raw Responses**: Status, headers and body bytes for any status code

mod client;
mod rate_limit;
mod types;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use types::{Executor, PreparedRequest, RawResponse};

#[cfg(test)]
mod tests;
