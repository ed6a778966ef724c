//! Report renderers (Markdown, JSON, HTML)
//!
//! Renderers are pure functions over an [`AnalysisResult`] snapshot.
//! They never call back into the analyzer; everything they print is
//! already computed and ordered.

pub mod html;
pub mod json;
pub mod markdown;

use std::path::{Path, PathBuf};

use tracing::{debug, info};
use weblog_hunter_core::types::AnalysisResult;

use crate::cli::FormatArg;
use crate::error::CliError;

/// Maximum number of SQLi endpoints listed in report tables.
pub const MAX_LISTED_ENDPOINTS: usize = 10;

/// A single report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Markdown,
    Json,
    Html,
}

impl ReportFormat {
    /// Every format, in write order.
    pub const ALL: [ReportFormat; 3] = [Self::Markdown, Self::Json, Self::Html];

    /// File extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Json => "json",
            Self::Html => "html",
        }
    }

    /// Parse a configured format name (`md`, `json`, `html`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "md" | "markdown" => Some(Self::Markdown),
            "json" => Some(Self::Json),
            "html" => Some(Self::Html),
            _ => None,
        }
    }

    /// Render the result in this format.
    pub fn render(&self, result: &AnalysisResult) -> Result<String, CliError> {
        match self {
            Self::Markdown => markdown::render(result).map_err(render_failed),
            Self::Json => json::render(result),
            Self::Html => html::render(result).map_err(render_failed),
        }
    }
}

fn render_failed(e: std::fmt::Error) -> CliError {
    CliError::Command(format!("failed to render report: {e}"))
}

/// Resolve the formats to write.
///
/// `--format` wins over `[output].formats`. Duplicates are dropped, order is kept.
pub fn resolve_formats(
    arg: Option<FormatArg>,
    configured: &[String],
) -> Result<Vec<ReportFormat>, CliError> {
    let mut formats = match arg {
        Some(FormatArg::Md) => vec![ReportFormat::Markdown],
        Some(FormatArg::Json) => vec![ReportFormat::Json],
        Some(FormatArg::Html) => vec![ReportFormat::Html],
        Some(FormatArg::All) => ReportFormat::ALL.to_vec(),
        None => configured
            .iter()
            .map(|name| {
                ReportFormat::from_name(name).ok_or_else(|| {
                    CliError::Config(format!("unknown output format '{name}'"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?,
    };
    let mut seen = Vec::with_capacity(formats.len());
    formats.retain(|f| {
        if seen.contains(f) {
            false
        } else {
            seen.push(*f);
            true
        }
    });
    if formats.is_empty() {
        return Err(CliError::Config(
            "no report formats selected (output.formats is empty)".to_owned(),
        ));
    }
    Ok(formats)
}

/// Compute the output path for one format.
///
/// A single format keeps an explicit extension on `base`; otherwise the
/// extension is replaced with the format's own.
pub fn report_path(base: &Path, format: ReportFormat, single: bool) -> PathBuf {
    if single && base.extension().is_some() {
        base.to_path_buf()
    } else {
        base.with_extension(format.extension())
    }
}

/// Render and write every selected report. Returns the written paths.
pub async fn write_reports(
    result: &AnalysisResult,
    base: &Path,
    formats: &[ReportFormat],
) -> Result<Vec<PathBuf>, CliError> {
    let single = formats.len() == 1;
    let mut written = Vec::with_capacity(formats.len());

    for format in formats {
        let path = report_path(base, *format, single);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let body = format.render(result)?;
        tokio::fs::write(&path, body).await?;
        debug!(path = %path.display(), format = format.extension(), "report written");
        written.push(path);
    }

    info!(count = written.len(), "reports written");
    Ok(written)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_formats_flag_wins() {
        let formats = resolve_formats(Some(FormatArg::Html), &["md".to_owned()]).unwrap();
        assert_eq!(formats, vec![ReportFormat::Html]);
    }

    #[test]
    fn test_resolve_formats_all() {
        let formats = resolve_formats(Some(FormatArg::All), &[]).unwrap();
        assert_eq!(formats, ReportFormat::ALL.to_vec());
    }

    #[test]
    fn test_resolve_formats_from_config_dedups() {
        let configured = vec!["json".to_owned(), "md".to_owned(), "json".to_owned()];
        let formats = resolve_formats(None, &configured).unwrap();
        assert_eq!(formats, vec![ReportFormat::Json, ReportFormat::Markdown]);
    }

    #[test]
    fn test_resolve_formats_rejects_unknown_and_empty() {
        let err = resolve_formats(None, &["pdf".to_owned()]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        let err = resolve_formats(None, &[]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_report_path_single_keeps_explicit_extension() {
        let path = report_path(Path::new("out/scan.txt"), ReportFormat::Markdown, true);
        assert_eq!(path, PathBuf::from("out/scan.txt"));

        let path = report_path(Path::new("out/scan"), ReportFormat::Json, true);
        assert_eq!(path, PathBuf::from("out/scan.json"));
    }

    #[test]
    fn test_report_path_multi_replaces_extension() {
        let path = report_path(Path::new("out/report.md"), ReportFormat::Html, false);
        assert_eq!(path, PathBuf::from("out/report.html"));
    }

    #[tokio::test]
    async fn test_write_reports_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("nested/deeper/report");
        let result = fixtures::sample_result();

        let written = write_reports(&result, &base, &ReportFormat::ALL)
            .await
            .unwrap();

        assert_eq!(written.len(), 3);
        for (path, ext) in written.iter().zip(["md", "json", "html"]) {
            assert_eq!(path.extension().and_then(|e| e.to_str()), Some(ext));
            assert!(path.exists(), "{} should exist", path.display());
        }
    }
}
