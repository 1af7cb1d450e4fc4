//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::FetchProfile;
use crate::error::{Result, ResultExt};
use crate::fetch::{CancelReason, ContinuousFetchContext, EndpointDelegate, FetchOutcome};
use crate::loader::{load_profile, validate_profile};
use crate::request::Session;
use crate::types::JsonValue;
use serde::Serialize;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Totals for one `run` invocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Pages fetched
    pub pages: usize,
    /// Items emitted
    pub items: usize,
    /// True when the endpoint ran out of pages
    pub complete: bool,
}

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Run {
                profile,
                pages,
                base_url,
                print_log,
            } => {
                let profile = Self::load(profile, base_url.as_deref(), *print_log)?;
                let summary = Self::fetch_pages(&profile, *pages, |item| {
                    self.output_message(item);
                })
                .await?;
                info!(
                    pages = summary.pages,
                    items = summary.items,
                    complete = summary.complete,
                    "run finished"
                );
                Ok(())
            }
            Commands::Validate { profile } => self.validate(profile),
        }
    }

    /// Load a profile and apply command-line overrides
    fn load(path: &Path, base_url: Option<&str>, print_log: bool) -> Result<FetchProfile> {
        let mut profile = load_profile(path)?;
        if let Some(base_url) = base_url {
            profile.client.base_url = base_url.to_string();
            validate_profile(&profile)?;
        }
        if print_log {
            profile.client.print_log = true;
        }
        Ok(profile)
    }

    /// Page through the profile's endpoint, handing every item to `emit`
    ///
    /// Stops on the last page, on any cancellation other than the interval
    /// guard, or after `max_pages` pages.
    pub async fn fetch_pages<F>(
        profile: &FetchProfile,
        max_pages: Option<usize>,
        mut emit: F,
    ) -> Result<RunSummary>
    where
        F: FnMut(&JsonValue),
    {
        let session =
            Session::from_config(profile.client.clone()).context("Failed to create HTTP session")?;
        let delegate = Arc::new(EndpointDelegate::<JsonValue>::new(
            session,
            profile.query.clone(),
        ));
        let context =
            ContinuousFetchContext::with_interval(Arc::clone(&delegate), profile.min_interval());

        let mut summary = RunSummary::default();
        loop {
            if max_pages.is_some_and(|max| summary.pages >= max) {
                debug!(pages = summary.pages, "page limit reached");
                break;
            }

            match context.fetch().await? {
                FetchOutcome::Fetched { is_last, .. } => {
                    summary.pages += 1;
                    for item in delegate.take_items() {
                        emit(&item);
                        summary.items += 1;
                    }
                    if is_last {
                        summary.complete = true;
                        break;
                    }
                    if !profile.min_interval().is_zero() {
                        tokio::time::sleep(profile.min_interval()).await;
                    }
                }
                FetchOutcome::Cancelled(CancelReason::IntervalNotElapsed) => {
                    tokio::time::sleep(profile.min_interval()).await;
                }
                FetchOutcome::Cancelled(reason) => {
                    debug!(%reason, "paging stopped");
                    break;
                }
                FetchOutcome::Suppressed => break,
            }
        }

        Ok(summary)
    }

    /// Validate a profile
    fn validate(&self, path: &Path) -> Result<()> {
        let profile = load_profile(path)?;

        self.output_message(&json!({
            "type": "LOG",
            "log": {
                "level": "INFO",
                "message": format!(
                    "Profile '{}' is valid: {} {}{} ({} per page)",
                    path.display(),
                    profile.query.method,
                    profile.client.base_url.trim_end_matches('/'),
                    profile.query.path,
                    profile.query.page_size
                )
            }
        }));

        Ok(())
    }

    /// Output a message
    fn output_message(&self, msg: &JsonValue) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}
