//! Paginated fetch coordinator

use super::delegate::FetchDelegate;
use super::queue::CallbackQueue;
use super::types::{CancelReason, FetchOutcome};
use crate::error::{Error, Result};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::{debug, warn};

#[derive(Debug)]
struct CursorState {
    page_index: usize,
    has_more_contents: bool,
    is_fetching: bool,
    last_fetch: Option<Instant>,
}

impl Default for CursorState {
    fn default() -> Self {
        Self {
            page_index: 0,
            has_more_contents: true,
            is_fetching: false,
            last_fetch: None,
        }
    }
}

fn lock_state(state: &Mutex<CursorState>) -> MutexGuard<'_, CursorState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Exclusive right to run one fetch. Dropping it clears the fetching flag
/// and wakes `reset()` waiters, whichever way the fetch ended.
struct FetchPermit<'a> {
    state: &'a Mutex<CursorState>,
    idle: &'a Notify,
}

impl Drop for FetchPermit<'_> {
    fn drop(&mut self) {
        lock_state(self.state).is_fetching = false;
        self.idle.notify_waiters();
    }
}

/// Coordinates "load more" paging over a [`FetchDelegate`]
///
/// At most one fetch runs at a time. Calls that arrive while a fetch is in
/// flight, after the resource is exhausted, or before `min_interval` has
/// passed since the last successful fetch are cancelled and reported to
/// [`FetchDelegate::on_cancel`]. A page shorter than the delegate's page
/// size marks the resource exhausted until [`reset`](Self::reset).
///
/// ```ignore
/// let context = ContinuousFetchContext::with_interval(delegate, Duration::from_secs(1));
/// match context.fetch().await? {
///     FetchOutcome::Fetched { is_last, .. } => { /* render more rows */ }
///     FetchOutcome::Cancelled(reason) => debug!(%reason, "skipped"),
///     FetchOutcome::Suppressed => {}
/// }
/// ```
pub struct ContinuousFetchContext<D: FetchDelegate> {
    delegate: Arc<D>,
    min_interval: Duration,
    state: Mutex<CursorState>,
    idle: Notify,
    callbacks: CallbackQueue,
}

impl<D: FetchDelegate> ContinuousFetchContext<D> {
    /// Create a coordinator with no interval between fetches
    ///
    /// Spawns a fresh [`CallbackQueue`], so this must run inside a Tokio runtime.
    pub fn new(delegate: Arc<D>) -> Self {
        Self::with_interval(delegate, Duration::ZERO)
    }

    /// Create a coordinator that waits `min_interval` after each successful fetch
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime, since it spawns a
    /// [`CallbackQueue`].
    pub fn with_interval(delegate: Arc<D>, min_interval: Duration) -> Self {
        Self {
            delegate,
            min_interval,
            state: Mutex::new(CursorState::default()),
            idle: Notify::new(),
            callbacks: CallbackQueue::spawn(),
        }
    }

    /// Deliver notifications on an existing queue
    #[must_use]
    pub fn with_callback_queue(mut self, queue: CallbackQueue) -> Self {
        self.callbacks = queue;
        self
    }

    /// Index of the next page to fetch
    pub fn page_index(&self) -> usize {
        lock_state(&self.state).page_index
    }

    /// False once a short page has been seen
    pub fn has_more_contents(&self) -> bool {
        lock_state(&self.state).has_more_contents
    }

    /// True while a fetch is in flight
    pub fn is_fetching(&self) -> bool {
        lock_state(&self.state).is_fetching
    }

    /// Minimum time between successful fetches
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// The delegate
    pub fn delegate(&self) -> &Arc<D> {
        &self.delegate
    }

    /// The queue notifications are delivered on
    pub fn callback_queue(&self) -> &CallbackQueue {
        &self.callbacks
    }

    /// Fetch the next page
    ///
    /// Guard rejections are not errors: they come back as
    /// [`FetchOutcome::Cancelled`]. `Err` is returned only for a failed page
    /// that `on_failure` chose to propagate, or when `will_fetch` itself fails.
    pub async fn fetch(&self) -> Result<FetchOutcome> {
        let (permit, page_index) = match self.try_begin() {
            Ok(claimed) => claimed,
            Err(reason) => return Ok(self.cancel(reason).await),
        };

        match self.delegate.will_fetch().await {
            Ok(true) => {}
            Ok(false) => {
                drop(permit);
                return Ok(self.cancel(CancelReason::WillFetchReturnedFalse).await);
            }
            Err(e) => {
                drop(permit);
                return Err(e);
            }
        }

        debug!(page_index, "fetching page");
        match self.load_page(page_index).await {
            Ok((items, page_size)) => {
                let outcome = self.complete(page_index, items, page_size).await;
                drop(permit);
                Ok(outcome)
            }
            Err(error) => {
                let result = self.fail(page_index, error).await;
                drop(permit);
                result
            }
        }
    }

    /// Rewind to the first page
    ///
    /// Waits for an in-flight fetch to finish first. `last_fetch` is kept,
    /// so the interval guard still applies to the next fetch.
    pub async fn reset(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = lock_state(&self.state);
                if !state.is_fetching {
                    state.page_index = 0;
                    state.has_more_contents = true;
                    debug!("fetch context reset");
                    return;
                }
            }

            notified.await;
        }
    }

    fn try_begin(&self) -> std::result::Result<(FetchPermit<'_>, usize), CancelReason> {
        let mut state = lock_state(&self.state);

        if state.is_fetching {
            return Err(CancelReason::AlreadyFetching);
        }
        if !state.has_more_contents {
            return Err(CancelReason::NoMoreContent);
        }
        if let Some(last) = state.last_fetch {
            if last.elapsed() < self.min_interval {
                return Err(CancelReason::IntervalNotElapsed);
            }
        }

        state.is_fetching = true;
        let permit = FetchPermit {
            state: &self.state,
            idle: &self.idle,
        };
        Ok((permit, state.page_index))
    }

    async fn load_page(&self, page_index: usize) -> Result<(Vec<D::Item>, usize)> {
        let page_size = self.delegate.page_size().await?;
        if page_size == 0 {
            return Err(Error::invalid_value(
                "page_size",
                "must be greater than zero",
            ));
        }
        let items = self.delegate.fetch_page(page_index).await?;
        Ok((items, page_size))
    }

    async fn complete(&self, page_index: usize, items: Vec<D::Item>, page_size: usize) -> FetchOutcome {
        let count = items.len();
        let has_more = count == page_size;

        {
            let mut state = lock_state(&self.state);
            state.page_index += 1;
            state.has_more_contents = has_more;
            state.last_fetch = Some(Instant::now());
        }
        debug!(page_index, count, page_size, has_more, "page fetched");

        let is_last = !has_more;
        let delegate = Arc::clone(&self.delegate);
        if let Err(e) = self
            .callbacks
            .run(move || delegate.on_success(items, is_last))
            .await
        {
            warn!(error = %e, "success notification failed");
        }

        FetchOutcome::Fetched {
            page_index,
            count,
            is_last,
        }
    }

    async fn fail(&self, page_index: usize, error: Error) -> Result<FetchOutcome> {
        debug!(page_index, error = %error, "page fetch failed");

        let error = Arc::new(error);
        let shared = Arc::clone(&error);
        let delegate = Arc::clone(&self.delegate);
        let propagate = match self
            .callbacks
            .run(move || delegate.on_failure(&shared))
            .await
        {
            Ok(propagate) => propagate,
            Err(e) => {
                warn!(error = %e, "failure notification failed, propagating");
                true
            }
        };

        if !propagate {
            return Ok(FetchOutcome::Suppressed);
        }
        Err(Arc::try_unwrap(error).unwrap_or_else(|error| Error::other(error.to_string())))
    }

    async fn cancel(&self, reason: CancelReason) -> FetchOutcome {
        debug!(%reason, "fetch cancelled");
        let delegate = Arc::clone(&self.delegate);
        if let Err(e) = self.callbacks.run(move || delegate.on_cancel(reason)).await {
            warn!(error = %e, "cancel notification failed");
        }
        FetchOutcome::Cancelled(reason)
    }
}

impl<D: FetchDelegate> std::fmt::Debug for ContinuousFetchContext<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = lock_state(&self.state);
        f.debug_struct("ContinuousFetchContext")
            .field("page_index", &state.page_index)
            .field("has_more_contents", &state.has_more_contents)
            .field("is_fetching", &state.is_fetching)
            .field("min_interval", &self.min_interval)
            .finish_non_exhaustive()
    }
}
