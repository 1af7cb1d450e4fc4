//! Request construction module
//!
//! Declarative request building on top of an [`crate::http::Executor`].
//!
//! # Overview
//!
//! - `Session` - base URL, executor, cookie jar and optional observer
//! - `RequestBuilder` - path, query, headers and body assembly
//! - Typed decoding: single object, array, empty acknowledgement, error payload
//!
//! Query parameters keep insertion order and may repeat. A `Cookie` header
//! set on the builder replaces the one synthesized from the session jar.
//! Bodies are only sent with POST, PUT and PATCH.

mod builder;
mod observer;
mod response;
mod session;

pub use builder::RequestBuilder;
pub use observer::{RequestObserver, TracingObserver};
pub use response::{extract_records, EmptyResponse, ErrorResponse};
pub use session::Session;
