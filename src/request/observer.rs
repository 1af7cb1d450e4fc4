//! Request/response observer hook

use crate::http::{PreparedRequest, RawResponse};
use tracing::info;

/// Observes every request a session sends and every response it receives
pub trait RequestObserver: Send + Sync {
    /// Called after the request is built, before it is executed
    fn on_request(&self, request: &PreparedRequest);

    /// Called after the response arrived and cookies were ingested
    fn on_response(&self, request: &PreparedRequest, response: &RawResponse);
}

/// Logs requests and responses at `info` level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl RequestObserver for TracingObserver {
    fn on_request(&self, request: &PreparedRequest) {
        let body = request
            .body
            .as_ref()
            .map_or_else(|| "-".to_string(), ToString::to_string);
        info!(
            ">> {} {}: headers={:?}, body={}",
            request.method, request.url, request.headers, body
        );
    }

    fn on_response(&self, request: &PreparedRequest, response: &RawResponse) {
        info!(
            "<< {} {} {}: headers={:?}, body={}",
            request.method,
            request.url,
            response.status,
            response.headers,
            response.text()
        );
    }
}
