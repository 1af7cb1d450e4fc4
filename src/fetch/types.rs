//! Fetch outcome types

use std::fmt;

/// Why a `fetch()` call did not run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CancelReason {
    /// Another fetch is in flight
    AlreadyFetching,
    /// A previous page came back short; call `reset()` to start over
    NoMoreContent,
    /// The minimum interval since the last successful fetch has not passed
    IntervalNotElapsed,
    /// The delegate declined through `will_fetch`
    WillFetchReturnedFalse,
}

impl CancelReason {
    /// Stable snake_case name, used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AlreadyFetching => "already_fetching",
            Self::NoMoreContent => "no_more_content",
            Self::IntervalNotElapsed => "interval_not_elapsed",
            Self::WillFetchReturnedFalse => "will_fetch_returned_false",
        }
    }
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a single `fetch()` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A page was fetched and delivered to `on_success`
    Fetched {
        /// Zero-based index of the page that was fetched
        page_index: usize,
        /// Number of items on the page
        count: usize,
        /// True when this page exhausted the resource
        is_last: bool,
    },
    /// A guard rejected the call; `on_cancel` was notified
    Cancelled(CancelReason),
    /// The fetch failed and `on_failure` chose not to propagate the error
    Suppressed,
}

impl FetchOutcome {
    /// True for [`FetchOutcome::Fetched`]
    pub fn is_fetched(&self) -> bool {
        matches!(self, Self::Fetched { .. })
    }

    /// The cancellation reason, if any
    pub fn cancel_reason(&self) -> Option<CancelReason> {
        match self {
            Self::Cancelled(reason) => Some(*reason),
            _ => None,
        }
    }
}
