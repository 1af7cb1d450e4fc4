//! CLI module
//!
//! Command-line interface for paging through an endpoint.
//!
//! # Commands
//!
//! - `run` - Page an endpoint described by a profile, one JSON item per line
//! - `validate` - Check a profile without sending requests

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::{Runner, RunSummary};
