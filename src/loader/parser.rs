//! YAML parser for fetch profiles
//!
//! Parses and validates profile files.

use crate::config::FetchProfile;
use crate::error::{Error, Result};
use std::fs;
use std::path::Path;
use url::Url;

/// Load a fetch profile from a file path
///
/// # Examples
///
/// ```ignore
/// let profile = load_profile("./profiles/users.yaml")?;
/// ```
pub fn load_profile(path: impl AsRef<Path>) -> Result<FetchProfile> {
    let path = path.as_ref();

    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            Error::config(format!(
                "Failed to read profile '{}': {}",
                path.display(),
                e
            ))
        }
    })?;
    load_profile_from_str(&content)
}

/// Load a fetch profile from a YAML string
pub fn load_profile_from_str(yaml: &str) -> Result<FetchProfile> {
    let profile: FetchProfile = serde_yaml::from_str(yaml)
        .map_err(|e| Error::config(format!("Failed to parse profile YAML: {e}")))?;

    validate_profile(&profile)?;
    Ok(profile)
}

/// Validate a fetch profile
pub fn validate_profile(profile: &FetchProfile) -> Result<()> {
    if profile.client.base_url.is_empty() {
        return Err(Error::invalid_value("client.base_url", "cannot be empty"));
    }
    Url::parse(&profile.client.base_url)?;

    let query = &profile.query;
    if query.path.is_empty() {
        return Err(Error::invalid_value("query.path", "cannot be empty"));
    }
    if query.page_param.is_empty() {
        return Err(Error::invalid_value("query.page_param", "cannot be empty"));
    }
    if query.page_size == 0 {
        return Err(Error::invalid_value(
            "query.page_size",
            "must be greater than zero",
        ));
    }
    if query.method.allows_body() {
        return Err(Error::invalid_value(
            "query.method",
            format!("{} is not supported for page queries", query.method),
        ));
    }

    if let Some(limit) = &profile.client.http.rate_limit {
        if limit.requests_per_second == 0 {
            return Err(Error::invalid_value(
                "client.http.rate_limit.requests_per_second",
                "must be greater than zero",
            ));
        }
    }

    Ok(())
}
