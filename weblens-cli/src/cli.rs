//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Weblens -- batch analytics for web-server access logs.
///
/// Use `weblens <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "weblens", version, about, long_about = None)]
pub struct Cli {
    /// Path to the weblens.toml configuration file.
    #[arg(short, long, default_value = "weblens.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table / text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

/// Supported result-set export formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExportFormat {
    /// Delimited text, one file per result set.
    Csv,
    /// Pretty-printed JSON arrays, one file per result set.
    Json,
}

impl ExportFormat {
    /// File-extension style name of the format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze an access-log file and export all six result sets.
    Analyze(AnalyzeArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- analyze ----

/// Run a one-shot analysis over a delimited access-log file.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Input access-log file (delimited text, five positional fields).
    pub input: PathBuf,

    /// Output directory for result sets (default: from config).
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Export format for the result sets.
    #[arg(long, default_value = "csv")]
    pub format: ExportFormat,

    /// Override the input field delimiter (single byte).
    #[arg(long)]
    pub delimiter: Option<String>,

    /// Override the top-N threshold for visited pages.
    #[arg(long)]
    pub top: Option<usize>,

    /// Treat the first line as data instead of a header.
    #[arg(long)]
    pub no_skip_header: bool,

    /// Compute views sequentially instead of in parallel tasks.
    #[arg(long)]
    pub sequential: bool,
}

// ---- config ----

/// Manage configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file without running anything.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Section to display (general, analytics).
        #[arg(long)]
        section: Option<String>,
    },
}
