//! CLI argument parsing using clap derive API
//!
//! Purely declarative: no side effects or I/O happen here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// weblog-hunter -- automatic reconnaissance on web server access logs.
///
/// Use `weblog-hunter <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "weblog-hunter", version, about, long_about = None)]
pub struct Cli {
    /// Path to a configuration file (.toml, or .yaml/.yml).
    ///
    /// When omitted, `weblog-hunter.toml` in the working directory is used if present.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Verbose diagnostics (debug-level logging).
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Quiet mode: no terminal summary, errors only.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Terminal output format (reports are controlled by `analyze --format`).
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Terminal output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table / text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse access logs, score source IPs and write reports.
    Analyze(AnalyzeArgs),

    /// List attack categories and tool fingerprints in the signature catalog.
    Signatures,

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- analyze ----

/// Report format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// Markdown report.
    Md,
    /// JSON report.
    Json,
    /// Self-contained HTML report.
    Html,
    /// All of the above.
    All,
}

/// Analyze access logs.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Access log file or directory of logs (.log/.gz/.txt). May be repeated.
    #[arg(short, long = "input", required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,

    /// Report output path. The extension is replaced per format.
    ///
    /// Defaults to `report` inside the configured output directory.
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Report format (default: formats from the configuration file).
    #[arg(short, long)]
    pub format: Option<FormatArg>,

    /// Number of suspicious IPs to detail.
    #[arg(long)]
    pub top: Option<usize>,

    /// Request-count floor shown as advisory context (IPs below it are still ranked).
    #[arg(long = "min-req")]
    pub min_requests: Option<usize>,
}

// ---- config ----

/// Manage weblog-hunter configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, analysis, ingest, output).
        #[arg(long)]
        section: Option<String>,
    },
}
