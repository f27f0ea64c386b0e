//! Command-line argument parsing for scoperag
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::types::RequesterContext;

/// scoperag - Access-scoped document retrieval
#[derive(Parser, Debug)]
#[command(name = "scoperag")]
#[command(version)]
#[command(about = "Retrieve only the documents a requester is allowed to see", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress everything but results and errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Seed the demonstration corpus and run its six scenarios
    ///
    /// The corpus is written to a temp directory with user xattrs. When the
    /// filesystem rejects xattrs the demo falls back to an in-memory corpus
    /// unless --require-xattr is given.
    Demo {
        /// Keep the corpus in memory instead of writing files with xattrs
        #[arg(long, conflicts_with = "require_xattr")]
        in_memory: bool,

        /// Fail instead of falling back when xattrs are unsupported
        #[arg(long)]
        require_xattr: bool,

        /// Print only admitted document ids per scenario
        #[arg(long)]
        brief: bool,
    },

    /// Load a corpus and run one query for one requester
    Query {
        /// Query text
        #[arg(value_name = "QUERY")]
        query: String,

        /// TOML corpus manifest
        #[arg(long, conflicts_with = "dir", required_unless_present = "dir")]
        manifest: Option<PathBuf>,

        /// Directory of files carrying user.* extended attributes
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Requester claim (repeatable), e.g. -C user_id=123 -C "location=New York"
        #[arg(short = 'C', long = "context", value_name = "KEY=VALUE")]
        context: Vec<String>,

        /// Show which check withheld each denied document
        #[arg(long)]
        explain: bool,

        /// Emit the retrieval outcome as JSON
        #[arg(long, conflicts_with = "explain")]
        json: bool,
    },

    /// Check whether a directory supports user extended attributes
    CheckXattr {
        /// Directory to probe (system temp dir by default)
        dir: Option<PathBuf>,
    },

    /// Display current configuration
    Config,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }
}

/// Parse repeated `KEY=VALUE` arguments into a requester context
pub fn parse_context(pairs: &[String]) -> Result<RequesterContext, String> {
    RequesterContext::from_pairs(pairs)
}

impl Verbosity {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "quiet",
            Verbosity::Normal => "normal",
            Verbosity::Verbose => "verbose",
            Verbosity::VeryVerbose => "very_verbose",
        }
    }

    /// Check if should show progress spinners
    pub fn show_progress(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }

    /// Check if should show per-document decisions
    pub fn show_decisions(&self) -> bool {
        matches!(self, Verbosity::Verbose | Verbosity::VeryVerbose)
    }
}
