//! CLI module for Teve.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Teve - TV Show Recommendations with RAG
///
/// Ask questions about a pre-built catalog of television shows, in English
/// or Russian, and get answers grounded in the catalog.
#[derive(Parser, Debug)]
#[command(name = "teve")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Teve and verify configuration
    Init,

    /// Check configuration and catalog status
    Doctor,

    /// Ask for show recommendations (English or Russian)
    Ask {
        /// The query, e.g. "comedy about space"
        query: String,

        /// Number of catalog entries to ground the answer on
        /// (overrides the configured rag.top_k)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Also translate an English answer to Russian
        #[arg(short, long)]
        translate: bool,
    },

    /// Search the catalog and show raw retrieval hits
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value = "5")]
        limit: usize,
    },

    /// Show the raw prompt components for a query without generating
    Inspect {
        /// The query to inspect
        query: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
