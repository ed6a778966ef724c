//! weblog-hunter -- threat hunting over web server access logs.
//!
//! Parses Apache/Nginx access logs, detects attack signatures and client
//! tools, scores source IPs and writes Markdown/JSON/HTML reports.

mod cli;
mod commands;
mod error;
mod logging;
mod output;
mod report;

use std::path::Path;

use clap::Parser;
use tracing::debug;

use weblog_hunter_core::config::{GeneralConfig, HunterConfig};

use cli::{Cli, Commands};
use error::CliError;
use output::OutputWriter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        eprintln!("error: {err}");
        std::process::exit(err.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let Cli {
        config,
        log_level,
        verbose,
        quiet,
        output,
        command,
    } = cli;

    let config_path = commands::config::resolve_config_path(config.as_deref());
    let writer = OutputWriter::new(output);

    match command {
        // `config` reports load failures itself instead of aborting on them.
        Commands::Config(args) => {
            init_logging(&GeneralConfig::default(), log_level, quiet, verbose)?;
            commands::config::execute(args, config_path.as_deref(), &writer).await
        }
        Commands::Analyze(args) => {
            let config = prepare(config_path.as_deref(), log_level, quiet, verbose).await?;
            commands::analyze::execute(args, &config, quiet, &writer).await
        }
        Commands::Signatures => {
            prepare(config_path.as_deref(), log_level, quiet, verbose).await?;
            commands::signatures::execute(&writer)
        }
    }
}

/// Load the effective configuration and initialise logging from it.
async fn prepare(
    config_path: Option<&Path>,
    log_level: Option<String>,
    quiet: bool,
    verbose: bool,
) -> Result<HunterConfig, CliError> {
    let config = commands::config::load_effective(config_path).await?;
    init_logging(&config.general, log_level, quiet, verbose)?;
    debug!(
        source = ?config_path,
        top_n = config.analysis.top_n,
        formats = ?config.output.formats,
        "configuration loaded"
    );
    Ok(config)
}

fn init_logging(
    general: &GeneralConfig,
    log_level: Option<String>,
    quiet: bool,
    verbose: bool,
) -> Result<(), CliError> {
    let mut general = general.clone();
    if let Some(level) = log_level {
        general.log_level = level;
    }
    logging::init_tracing(&general, quiet, verbose).map_err(|e| CliError::Config(e.to_string()))
}
