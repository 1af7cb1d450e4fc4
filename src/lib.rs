// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # pagefetch
//!
//! Declarative HTTP request building and backpressure-aware paginated fetching.
//!
//! ## Features
//!
//! - **Request Builder**: Path, repeated query parameters, headers and JSON bodies
//! - **Typed Decoding**: Objects, arrays, empty acknowledgements and error payloads
//! - **Session Cookies**: `Set-Cookie` ingestion and `Cookie` header synthesis
//! - **Resilient Executor**: Retry with backoff, `Retry-After` and rate limiting
//! - **Paginated Fetching**: Single-flight "load more" paging with interval throttling
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pagefetch::{ClientConfig, ContinuousFetchContext, EndpointDelegate, PageQuery, Session};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> pagefetch::Result<()> {
//!     let session = Session::from_config(ClientConfig::new("https://api.example.com"))?;
//!     let query = PageQuery::new("/users", 50).start_page(1).records_path("data");
//!     let delegate = Arc::new(EndpointDelegate::<serde_json::Value>::new(session, query));
//!
//!     let context = ContinuousFetchContext::new(delegate.clone());
//!     while context.fetch().await?.is_fetched() {
//!         for user in delegate.take_items() {
//!             println!("{user}");
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │          ContinuousFetchContext  (guards, cursor, permit)    │
//! │   fetch() → FetchOutcome            reset()                  │
//! └──────────────────────────────────────────────────────────────┘
//!                │ FetchDelegate              │ CallbackQueue
//! ┌──────────────┴─────────────┬──────────────┴─────────────────┐
//! │   Request                  │   HTTP                         │
//! ├────────────────────────────┼────────────────────────────────┤
//! │ Session / RequestBuilder   │ Executor trait                 │
//! │ Cookie jar                 │ HttpClient (retry, backoff)    │
//! │ Typed decoding             │ Rate limiter                   │
//! └────────────────────────────┴────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Session, executor and profile configuration
pub mod config;

/// YAML loader for fetch profiles
pub mod loader;

/// HTTP executor with retry and rate limiting
pub mod http;

/// Session cookie jar
pub mod cookie;

/// Request construction and typed decoding
pub mod request;

/// Paginated fetch coordination
pub mod fetch;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::{ClientConfig, FetchProfile, PageQuery};
pub use fetch::{
    CallbackQueue, CancelReason, ContinuousFetchContext, EndpointDelegate, FetchDelegate,
    FetchOutcome,
};
pub use loader::{load_profile, load_profile_from_str};
pub use request::{RequestBuilder, Session};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
