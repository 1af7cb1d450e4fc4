//! Ready-made delegate that pages a JSON endpoint

use super::delegate::FetchDelegate;
use crate::config::PageQuery;
use crate::error::{Error, Result};
use crate::request::{extract_records, Session};
use crate::types::JsonValue;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// Pages a JSON endpoint described by a [`PageQuery`] through a [`Session`]
///
/// Page `n` (zero-based) is requested with `page_param = start_page + n`.
/// Items delivered to `on_success` accumulate until drained with
/// [`take_items`](Self::take_items) or [`clear`](Self::clear).
pub struct EndpointDelegate<T> {
    session: Session,
    query: PageQuery,
    items: Mutex<Vec<T>>,
    complete: AtomicBool,
}

impl<T> EndpointDelegate<T> {
    /// Create a delegate for `query` over `session`
    pub fn new(session: Session, query: PageQuery) -> Self {
        Self {
            session,
            query,
            items: Mutex::new(Vec::new()),
            complete: AtomicBool::new(false),
        }
    }

    /// The page query
    pub fn query(&self) -> &PageQuery {
        &self.query
    }

    /// The session requests go through
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Copy of the items collected so far
    pub fn items(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.lock_items().clone()
    }

    /// Drain the items collected so far
    pub fn take_items(&self) -> Vec<T> {
        std::mem::take(&mut *self.lock_items())
    }

    /// True once the last page has been delivered
    pub fn is_complete(&self) -> bool {
        self.complete.load(Ordering::Acquire)
    }

    /// Forget collected items and the completion flag
    pub fn clear(&self) {
        self.lock_items().clear();
        self.complete.store(false, Ordering::Release);
    }

    fn lock_items(&self) -> MutexGuard<'_, Vec<T>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl<T> FetchDelegate for EndpointDelegate<T>
where
    T: DeserializeOwned + Send + 'static,
{
    type Item = T;

    async fn page_size(&self) -> Result<usize> {
        Ok(self.query.page_size)
    }

    async fn fetch_page(&self, page_index: usize) -> Result<Vec<T>> {
        let page = self.query.start_page + page_index;
        let mut request = self
            .session
            .create(self.query.path.as_str(), self.query.method)
            .param(self.query.page_param.as_str(), Some(page.to_string()));

        if let Some(size_param) = &self.query.size_param {
            request = request.param(size_param.as_str(), Some(self.query.page_size.to_string()));
        }
        for (name, value) in &self.query.params {
            request = request.param(name.as_str(), Some(value.as_str()));
        }

        let body: JsonValue = request.object().await?;
        let records = extract_records(&body, self.query.records_path.as_deref())?;
        debug!(page, records = records.len(), "page decoded");

        records
            .into_iter()
            .enumerate()
            .map(|(i, record)| {
                serde_json::from_value(record)
                    .map_err(|e| Error::decode(format!("record {i} of page {page}: {e}")))
            })
            .collect()
    }

    fn on_success(&self, items: Vec<T>, is_last: bool) {
        self.lock_items().extend(items);
        if is_last {
            self.complete.store(true, Ordering::Release);
        }
    }

    fn on_failure(&self, error: &Error) -> bool {
        warn!(
            path = %self.query.path,
            retryable = error.is_retryable(),
            error = %error,
            "page request failed"
        );
        true
    }
}

impl<T> std::fmt::Debug for EndpointDelegate<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointDelegate")
            .field("query", &self.query)
            .field("items", &self.lock_items().len())
            .field("complete", &self.is_complete())
            .finish_non_exhaustive()
    }
}
