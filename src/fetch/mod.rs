//! Paginated fetch module
//!
//! Backpressure-aware "load more" paging.
//!
//! # Overview
//!
//! - `ContinuousFetchContext` - cursor state, guards and the single-flight permit
//! - `FetchDelegate` - page I/O and outcome callbacks supplied by the caller
//! - `CallbackQueue` - serial task the delegate callbacks run on
//! - `EndpointDelegate` - delegate that pages a JSON endpoint through a `Session`
//!
//! Guards are evaluated in a fixed order: already fetching, no more content,
//! interval not elapsed, then the delegate's own `will_fetch` veto.

mod context;
mod delegate;
mod endpoint;
mod queue;
mod types;

pub use context::ContinuousFetchContext;
pub use delegate::FetchDelegate;
pub use endpoint::EndpointDelegate;
pub use queue::CallbackQueue;
pub use types::{CancelReason, FetchOutcome};
