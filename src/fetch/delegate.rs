//! Delegate trait consumed by the fetch coordinator

use super::types::CancelReason;
use crate::error::{Error, Result};
use async_trait::async_trait;

/// Page I/O and outcome callbacks for a [`super::ContinuousFetchContext`]
///
/// The async methods are awaited by the coordinator while it holds the
/// fetching permit. The `on_*` notifications run on the coordinator's
/// [`super::CallbackQueue`], one at a time.
#[async_trait]
pub trait FetchDelegate: Send + Sync + 'static {
    /// Item type produced by a page
    type Item: Send + 'static;

    /// Last chance to veto a fetch that passed every guard
    async fn will_fetch(&self) -> Result<bool> {
        Ok(true)
    }

    /// Number of items a full page holds
    async fn page_size(&self) -> Result<usize>;

    /// Fetch the page at `page_index` (zero-based)
    async fn fetch_page(&self, page_index: usize) -> Result<Vec<Self::Item>>;

    /// A page arrived; `is_last` is set when it was short
    fn on_success(&self, _items: Vec<Self::Item>, _is_last: bool) {}

    /// A page failed. Return `true` to hand the error back to the caller of `fetch()`.
    fn on_failure(&self, _error: &Error) -> bool {
        true
    }

    /// A guard rejected a `fetch()` call
    fn on_cancel(&self, _reason: CancelReason) {}
}
