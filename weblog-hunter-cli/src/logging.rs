//! Logging initialization for the weblog-hunter binary.
//!
//! Configures `tracing-subscriber` from the `[general]` section of
//! `HunterConfig`. Logs go to stderr so that stdout stays free for
//! command output (`--output json` in particular).

use anyhow::Result;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use weblog_hunter_core::config::GeneralConfig;

/// Pick the effective filter directive.
///
/// `--quiet` wins over everything, `--verbose` raises to debug,
/// otherwise the configured level is used.
pub fn effective_level(config: &GeneralConfig, quiet: bool, verbose: bool) -> String {
    if quiet {
        "error".to_owned()
    } else if verbose {
        "debug".to_owned()
    } else {
        config.log_level.clone()
    }
}

/// Initialize the global tracing subscriber.
///
/// Must be called exactly once, before any tracing macros are used.
/// `RUST_LOG` takes precedence over the computed level.
pub fn init_tracing(config: &GeneralConfig, quiet: bool, verbose: bool) -> Result<()> {
    let level = effective_level(config, quiet, verbose);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    match config.log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .try_init()
                .map_err(|e| {
                    anyhow::anyhow!("failed to initialize JSON tracing subscriber: {}", e)
                })?;
        }
        "pretty" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .pretty()
                        .with_writer(std::io::stderr),
                )
                .try_init()
                .map_err(|e| {
                    anyhow::anyhow!("failed to initialize pretty tracing subscriber: {}", e)
                })?;
        }
        _ => {
            return Err(anyhow::anyhow!(
                "unknown log format '{}', expected 'json' or 'pretty'",
                config.log_format
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_overrides_verbose_and_config() {
        let config = GeneralConfig::default();
        assert_eq!(effective_level(&config, true, true), "error");
    }

    #[test]
    fn verbose_raises_to_debug() {
        let config = GeneralConfig::default();
        assert_eq!(effective_level(&config, false, true), "debug");
    }

    #[test]
    fn config_level_is_used_by_default() {
        let config = GeneralConfig {
            log_level: "warn".to_owned(),
            ..GeneralConfig::default()
        };
        assert_eq!(effective_level(&config, false, false), "warn");
    }
}
