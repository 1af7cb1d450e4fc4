//! Profile loader module
//!
//! Parse paginated fetch profiles from YAML (or JSON) files.
//!
//! # Overview
//!
//! The loader module provides:
//! - `load_profile` - Read and validate a profile file
//! - `load_profile_from_str` - Parse and validate an inline profile
//! - `validate_profile` - Re-check a profile after overrides

mod parser;

pub use parser::{load_profile, load_profile_from_str, validate_profile};
