//! Session cookie jar
//!
//! Cookies are stored as name → optional value. The jar is written only by
//! response processing (`Set-Cookie`) and read only while building the
//! `Cookie` header of the next request. Clones share the same storage.

use cookie::Cookie;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Shared cookie storage for a session
#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    entries: Arc<RwLock<BTreeMap<String, Option<String>>>>,
}

impl CookieJar {
    /// Create an empty jar
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a cookie
    pub async fn set(&self, name: impl Into<String>, value: Option<String>) {
        self.entries.write().await.insert(name.into(), value);
    }

    /// Get a cookie. The outer `Option` is presence, the inner one the value.
    pub async fn get(&self, name: &str) -> Option<Option<String>> {
        self.entries.read().await.get(name).cloned()
    }

    /// Remove a cookie, returning whether it was present
    pub async fn remove(&self, name: &str) -> bool {
        self.entries.write().await.remove(name).is_some()
    }

    /// Remove every cookie
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Number of stored cookies
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// True when no cookies are stored
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Copy of the current contents
    pub async fn snapshot(&self) -> BTreeMap<String, Option<String>> {
        self.entries.read().await.clone()
    }

    /// Render the `Cookie` header value, `None` when the jar is empty
    ///
    /// Entries are joined with `"; "`; valueless entries render as the bare name.
    pub async fn header_value(&self) -> Option<String> {
        let entries = self.entries.read().await;
        if entries.is_empty() {
            return None;
        }

        let rendered = entries
            .iter()
            .map(|(name, value)| match value {
                Some(value) => format!("{name}={value}"),
                None => name.clone(),
            })
            .collect::<Vec<_>>()
            .join("; ");
        Some(rendered)
    }

    /// Store every cookie found in a list of `Set-Cookie` header values
    ///
    /// Returns the number of cookies stored.
    pub async fn ingest<'a, I>(&self, set_cookie_headers: I) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        let parsed: Vec<_> = set_cookie_headers
            .into_iter()
            .filter_map(parse_set_cookie)
            .collect();
        if parsed.is_empty() {
            return 0;
        }

        let mut entries = self.entries.write().await;
        for (name, value) in &parsed {
            debug!(cookie = %name, "cookie updated");
            entries.insert(name.clone(), value.clone());
        }
        parsed.len()
    }
}

/// Parse the leading `name[=value]` pair of a `Set-Cookie` header
///
/// Attributes such as `Path` or `HttpOnly` are not cookies and are dropped.
pub fn parse_set_cookie(header: &str) -> Option<(String, Option<String>)> {
    let pair = header.split(';').next().unwrap_or("").trim();
    if pair.is_empty() {
        return None;
    }

    if !pair.contains('=') {
        return Some((pair.to_string(), None));
    }

    match Cookie::parse(header.trim()) {
        Ok(cookie) => Some((cookie.name().to_string(), Some(cookie.value().to_string()))),
        Err(e) => {
            warn!(error = %e, "ignoring unparsable Set-Cookie header");
            None
        }
    }
}
