//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Paginated fetch CLI
#[derive(Parser, Debug)]
#[command(name = "pagefetch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Page through the endpoint described by a profile
    Run {
        /// Fetch profile (YAML or JSON)
        #[arg(short, long)]
        profile: PathBuf,

        /// Stop after this many pages
        #[arg(long)]
        pages: Option<usize>,

        /// Override the profile's base URL
        #[arg(long)]
        base_url: Option<String>,

        /// Log every request and response
        #[arg(long)]
        print_log: bool,
    },

    /// Validate a fetch profile
    Validate {
        /// Fetch profile (YAML or JSON)
        #[arg(short, long)]
        profile: PathBuf,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One JSON document per line
    Json,
    /// Indented JSON
    Pretty,
}
