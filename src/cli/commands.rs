//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// pageflow pagination driver
#[derive(Parser, Debug)]
#[command(name = "pageflow")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Include the items of every state in the output
    #[arg(long, global = true)]
    pub show_items: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Page through an HTTP source defined in YAML
    Fetch {
        /// Source definition file (YAML)
        #[arg(short, long)]
        source: PathBuf,

        /// Items per page (overrides the source definition)
        #[arg(long)]
        page_size: Option<usize>,

        /// Stop after this many pages
        #[arg(long)]
        max_pages: Option<usize>,

        /// Retries per failed page before giving up
        #[arg(long, default_value = "1")]
        retries: usize,
    },

    /// Page through a synthetic in-memory source
    Demo {
        /// Number of items in the source
        #[arg(long, default_value = "45")]
        total: usize,

        /// Items per page
        #[arg(long, default_value = "10")]
        page_size: usize,

        /// Fail the first request at this offset
        #[arg(long)]
        fail_at: Option<usize>,

        /// Stop after this many pages
        #[arg(long)]
        max_pages: Option<usize>,

        /// Retries per failed page before giving up
        #[arg(long, default_value = "1")]
        retries: usize,
    },

    /// Validate a source definition
    Validate {
        /// Source definition file (YAML)
        #[arg(short, long)]
        source: PathBuf,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one state per line)
    Json,
    /// Human-readable output
    Pretty,
}
