//! Tests for the HTTP execution module

use super::*;
use crate::config::{BackoffConfig, HttpConfig, RateLimitConfig};
use crate::error::Error;
use crate::types::{BackoffType, Method};
use reqwest::header::{HeaderMap, HeaderValue};
use std::time::Duration;
use url::Url;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn prepared(method: Method, url: &str) -> PreparedRequest {
    PreparedRequest {
        method,
        url: Url::parse(url).unwrap(),
        headers: HeaderMap::new(),
        body: None,
    }
}

fn fast_client(max_retries: u32) -> HttpClient {
    let config = HttpClientConfig::builder()
        .max_retries(max_retries)
        .backoff(
            BackoffType::Constant,
            Duration::from_millis(10),
            Duration::from_secs(1),
        )
        .no_rate_limit()
        .build();
    HttpClient::with_config(config).unwrap()
}

// ============================================================================
// Config Tests
// ============================================================================

#[test]
fn test_http_client_config_default() {
    let config = HttpClientConfig::default();
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert_eq!(config.max_retries, 3);
    assert!(config.rate_limit.is_none());
    assert!(config.user_agent.starts_with("pagefetch/"));
}

#[test]
fn test_http_client_config_builder() {
    let config = HttpClientConfig::builder()
        .timeout(Duration::from_secs(60))
        .max_retries(5)
        .backoff(
            BackoffType::Linear,
            Duration::from_millis(200),
            Duration::from_secs(30),
        )
        .rate_limit(RateLimiterConfig::new(5, 5))
        .user_agent("test-agent/1.0")
        .build();

    assert_eq!(config.timeout, Duration::from_secs(60));
    assert_eq!(config.max_retries, 5);
    assert_eq!(config.backoff_type, BackoffType::Linear);
    assert_eq!(config.initial_backoff, Duration::from_millis(200));
    assert_eq!(config.max_backoff, Duration::from_secs(30));
    assert_eq!(config.rate_limit, Some(RateLimiterConfig::new(5, 5)));
    assert_eq!(config.user_agent, "test-agent/1.0");
}

#[test]
fn test_http_client_config_from_http_config() {
    let http = HttpConfig {
        timeout_seconds: 7,
        max_retries: 1,
        retry_backoff: BackoffConfig {
            backoff_type: BackoffType::Constant,
            initial_ms: 50,
            max_ms: 500,
        },
        rate_limit: Some(RateLimitConfig {
            requests_per_second: 3,
            burst_size: None,
        }),
        user_agent: Some("custom/2".to_string()),
    };

    let config = HttpClientConfig::from(&http);
    assert_eq!(config.timeout, Duration::from_secs(7));
    assert_eq!(config.max_retries, 1);
    assert_eq!(config.backoff_type, BackoffType::Constant);
    assert_eq!(config.initial_backoff, Duration::from_millis(50));
    assert_eq!(config.max_backoff, Duration::from_millis(500));
    // burst defaults to the per-second rate
    assert_eq!(config.rate_limit, Some(RateLimiterConfig::new(3, 3)));
    assert_eq!(config.user_agent, "custom/2");
}

// ============================================================================
// RawResponse Tests
// ============================================================================

#[test]
fn test_raw_response_helpers() {
    let mut headers = HeaderMap::new();
    headers.append("set-cookie", HeaderValue::from_static("a=1; Path=/"));
    headers.append("set-cookie", HeaderValue::from_static("b=2"));

    let response = RawResponse::new(201, headers, r#"{"id": 9}"#);
    assert!(response.is_success());
    assert_eq!(response.set_cookies().collect::<Vec<_>>(), vec!["a=1; Path=/", "b=2"]);

    let value: serde_json::Value = response.json().unwrap();
    assert_eq!(value["id"], 9);
}

#[test]
fn test_raw_response_error_for_status() {
    let response = RawResponse::new(404, HeaderMap::new(), "missing");
    let err = response.error_for_status().unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 404, ref body } if body == "missing"));
}

#[test]
fn test_raw_response_invalid_json() {
    let response = RawResponse::new(200, HeaderMap::new(), "not json");
    let err = response.json::<serde_json::Value>().unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
}

// ============================================================================
// Execution Tests
// ============================================================================

#[tokio::test]
async fn test_execute_get() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/users"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "users": [{"id": 1, "name": "Alice"}]
        })))
        .mount(&mock_server)
        .await;

    let client = fast_client(0);
    let response = client
        .execute(prepared(
            Method::GET,
            &format!("{}/api/users?page=2", mock_server.uri()),
        ))
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    let body: serde_json::Value = response.json().unwrap();
    assert_eq!(body["users"][0]["name"], "Alice");
}

#[tokio::test]
async fn test_execute_post_with_headers_and_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/items"))
        .and(header("X-Request-Id", "req-456"))
        .and(body_json(serde_json::json!({"name": "test"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": 123})))
        .mount(&mock_server)
        .await;

    let mut request = prepared(Method::POST, &format!("{}/api/items", mock_server.uri()));
    request
        .headers
        .insert("x-request-id", HeaderValue::from_static("req-456"));
    request.body = Some(serde_json::json!({"name": "test"}));

    let response = fast_client(0).execute(request).await.unwrap();
    assert_eq!(response.status, 201);
}

#[tokio::test]
async fn test_client_error_is_returned_as_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = fast_client(3)
        .execute(prepared(
            Method::GET,
            &format!("{}/api/missing", mock_server.uri()),
        ))
        .await
        .unwrap();

    assert_eq!(response.status, 404);
    assert_eq!(response.text(), "Not found");
}

#[tokio::test]
async fn test_retry_on_500() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .mount(&mock_server)
        .await;

    let response = fast_client(3)
        .execute(prepared(
            Method::GET,
            &format!("{}/api/flaky", mock_server.uri()),
        ))
        .await
        .unwrap();

    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn test_server_error_after_retries_is_returned() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/always-fail"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let response = fast_client(2)
        .execute(prepared(
            Method::GET,
            &format!("{}/api/always-fail", mock_server.uri()),
        ))
        .await
        .unwrap();

    assert_eq!(response.status, 503);
    assert!(response.error_for_status().is_err());
}

#[tokio::test]
async fn test_rate_limit_retry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/limited"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "0")
                .set_body_string("Rate limited"),
        )
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/limited"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let response = fast_client(2)
        .execute(prepared(
            Method::GET,
            &format!("{}/api/limited", mock_server.uri()),
        ))
        .await
        .unwrap();

    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn test_rate_limit_exhausted() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/limited"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
        .mount(&mock_server)
        .await;

    let err = fast_client(1)
        .execute(prepared(
            Method::GET,
            &format!("{}/api/limited", mock_server.uri()),
        ))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::RateLimited {
            retry_after_seconds: 0
        }
    ));
}

#[tokio::test]
async fn test_with_rate_limiter() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/data"))
        .respond_with(ResponseTemplate::new(200))
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .rate_limit(RateLimiterConfig::new(100, 10))
        .build();
    let client = HttpClient::with_config(config).unwrap();
    assert!(client.has_rate_limiter());

    for _ in 0..3 {
        let response = client
            .execute(prepared(
                Method::GET,
                &format!("{}/api/data", mock_server.uri()),
            ))
            .await
            .unwrap();
        assert_eq!(response.status, 200);
    }
}

// ============================================================================
// Backoff Tests
// ============================================================================

fn backoff_client(backoff_type: BackoffType, max: Duration) -> HttpClient {
    let config = HttpClientConfig::builder()
        .backoff(backoff_type, Duration::from_millis(100), max)
        .build();
    HttpClient::with_config(config).unwrap()
}

#[test]
fn test_calculate_backoff_constant() {
    let client = backoff_client(BackoffType::Constant, Duration::from_secs(10));
    assert_eq!(client.calculate_backoff(0), Duration::from_millis(100));
    assert_eq!(client.calculate_backoff(5), Duration::from_millis(100));
}

#[test]
fn test_calculate_backoff_linear() {
    let client = backoff_client(BackoffType::Linear, Duration::from_secs(10));
    assert_eq!(client.calculate_backoff(0), Duration::from_millis(100));
    assert_eq!(client.calculate_backoff(1), Duration::from_millis(200));
    assert_eq!(client.calculate_backoff(2), Duration::from_millis(300));
}

#[test]
fn test_calculate_backoff_exponential() {
    let client = backoff_client(BackoffType::Exponential, Duration::from_secs(10));
    assert_eq!(client.calculate_backoff(0), Duration::from_millis(100));
    assert_eq!(client.calculate_backoff(1), Duration::from_millis(200));
    assert_eq!(client.calculate_backoff(3), Duration::from_millis(800));
}

#[test]
fn test_calculate_backoff_respects_max() {
    let client = backoff_client(BackoffType::Exponential, Duration::from_millis(500));
    assert_eq!(client.calculate_backoff(10), Duration::from_millis(500));
    assert_eq!(client.calculate_backoff(40), Duration::from_millis(500));
}

#[test]
fn test_http_client_debug() {
    let client = HttpClient::new().unwrap();
    let debug_str = format!("{client:?}");
    assert!(debug_str.contains("HttpClient"));
    assert!(debug_str.contains("has_rate_limiter"));
}
