//! `weblog-hunter config` command handler, plus effective-config loading
//! shared by every command.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use weblog_hunter_core::config::HunterConfig;
use weblog_hunter_core::error::HunterError;

use crate::cli::{ConfigAction, ConfigArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "weblog-hunter.toml";

/// Label used in reports when no file is involved.
const DEFAULTS_SOURCE: &str = "(built-in defaults)";

/// Pick the config file to load, if any.
///
/// An explicit path is always returned (missing files surface as errors later).
/// Otherwise `weblog-hunter.toml` is used only when it exists.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let candidate = PathBuf::from(DEFAULT_CONFIG_FILE);
            candidate.is_file().then_some(candidate)
        }
    }
}

/// Load the effective configuration: file (if any), env overrides, validation.
pub async fn load_effective(path: Option<&Path>) -> Result<HunterConfig, HunterError> {
    match path {
        Some(path) => HunterConfig::load(path).await,
        None => {
            let mut config = HunterConfig::default();
            config.apply_env_overrides();
            config.validate()?;
            Ok(config)
        }
    }
}

fn source_label(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| DEFAULTS_SOURCE.to_owned())
}

/// Execute the `config` command.
pub async fn execute(
    args: ConfigArgs,
    config_path: Option<&Path>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(config_path, writer).await,
        ConfigAction::Show { section } => execute_show(config_path, section, writer).await,
    }
}

/// Load and validate the configuration, reporting the outcome.
///
/// # Errors
///
/// Returns `CliError::Config` if the file is missing, malformed or invalid.
async fn execute_validate(
    config_path: Option<&Path>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let source = source_label(config_path);
    info!(source = %source, "validating configuration");

    let report = match load_effective(config_path).await {
        Ok(_) => ConfigValidationReport {
            source,
            valid: true,
            errors: Vec::new(),
        },
        Err(e) => ConfigValidationReport {
            source,
            valid: false,
            errors: vec![e.to_string()],
        },
    };

    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }

    Ok(())
}

/// Display the effective configuration (file + env overrides + defaults).
async fn execute_show(
    config_path: Option<&Path>,
    section: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let source = source_label(config_path);
    info!(source = %source, "loading configuration");

    let config = load_effective(config_path).await?;
    let report = ConfigReport::build(source, &config, section.as_deref())?;
    writer.render(&report)
}

/// Configuration display report.
///
/// `config_toml` is only used for text rendering; JSON output carries the
/// structured `config` value instead.
#[derive(Debug, Serialize)]
pub struct ConfigReport {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    pub config: toml::Value,
    #[serde(skip)]
    pub config_toml: String,
}

impl ConfigReport {
    fn build(
        source: String,
        config: &HunterConfig,
        section: Option<&str>,
    ) -> Result<Self, CliError> {
        let value = match section {
            None => toml::Value::try_from(config),
            Some("general") => toml::Value::try_from(&config.general),
            Some("analysis") => toml::Value::try_from(&config.analysis),
            Some("ingest") => toml::Value::try_from(&config.ingest),
            Some("output") => toml::Value::try_from(&config.output),
            Some(other) => {
                return Err(CliError::Command(format!(
                    "unknown section: {other} (expected: general, analysis, ingest, output)"
                )));
            }
        }
        .map_err(|e| CliError::Command(format!("failed to serialize configuration: {e}")))?;

        let config_toml = toml::to_string_pretty(&value)
            .unwrap_or_else(|e| format!("(serialization error: {e})"));

        Ok(Self {
            source,
            section: section.map(str::to_owned),
            config: value,
            config_toml,
        })
    }
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        match &self.section {
            Some(section) => {
                let section_label = format!("[{section}]");
                writeln!(
                    w,
                    "Configuration {} (source: {})",
                    section_label.bold(),
                    self.source
                )?;
            }
            None => writeln!(w, "Configuration (source: {})", self.source.bold())?,
        }

        writeln!(w)?;
        write!(w, "{}", self.config_toml)?;

        Ok(())
    }
}

/// Configuration validation report.
#[derive(Serialize)]
pub struct ConfigValidationReport {
    pub source: String,
    pub valid: bool,
    /// Validation error messages (empty if valid)
    pub errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Config Validation: {}", self.source.bold())?;

        if self.valid {
            writeln!(w, "  Result: {}", "VALID".green().bold())?;
        } else {
            writeln!(w, "  Result: {}", "INVALID".red().bold())?;
            for err in &self.errors {
                writeln!(w, "  Error: {}", err.red())?;
            }
        }

        Ok(())
    }
}
