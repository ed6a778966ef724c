//! `weblog-hunter analyze` command handler
//!
//! ingest -> analyze -> write reports -> terminal summary.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use weblog_hunter_core::config::HunterConfig;
use weblog_hunter_core::types::AnalysisResult;
use weblog_hunter_engine::{
    AnalyzerConfig, FileFailure, IngestorConfig, LogIngestor, ParserRouter, SignatureDetector,
    ThreatAnalyzer,
};

use crate::cli::AnalyzeArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};
use crate::report;

/// Report file stem used when `--out` is not given.
pub const DEFAULT_REPORT_STEM: &str = "report";

/// Number of IPs listed in the terminal summary.
const SUMMARY_IPS: usize = 5;

/// Execute the `analyze` command.
pub async fn execute(
    args: AnalyzeArgs,
    config: &HunterConfig,
    quiet: bool,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let top_n = args.top.unwrap_or(config.analysis.top_n);
    let min_requests = args.min_requests.unwrap_or(config.analysis.min_requests);
    let formats = report::resolve_formats(args.format, &config.output.formats)?;
    let base = report_base(args.out.as_deref(), &config.output.directory);

    // Catalog and parameter errors surface before any input is read.
    let detector = SignatureDetector::builtin()?;
    let analyzer = ThreatAnalyzer::new(detector, AnalyzerConfig::from_core(&config.analysis))?;
    let ingestor = LogIngestor::new(
        ParserRouter::with_defaults()?,
        IngestorConfig::from_core(&config.ingest),
    )?;

    info!(inputs = args.inputs.len(), top_n, min_requests, "starting analysis");
    let mut ingest = ingestor.ingest_paths(&args.inputs).await;

    for failure in &ingest.file_failures {
        warn!(path = %failure.path.display(), reason = %failure.reason, "input skipped");
    }
    if ingest.files_read == 0 && !ingest.file_failures.is_empty() {
        return Err(CliError::Command(format!(
            "no input files were readable ({} failed)",
            ingest.file_failures.len()
        )));
    }

    let mut result = analyzer.analyze(&mut ingest.events, top_n, min_requests)?;
    result.files_read = ingest.files_read;
    result.parse_failures = ingest.parse_failures;

    let written = report::write_reports(&result, &base, &formats).await?;

    if !quiet {
        writer.render(&AnalyzeSummary::new(&result, &ingest.file_failures, written))?;
    }

    Ok(())
}

/// Base path for report files.
fn report_base(out: Option<&Path>, directory: &str) -> PathBuf {
    match out {
        Some(path) => path.to_path_buf(),
        None => Path::new(directory).join(DEFAULT_REPORT_STEM),
    }
}

/// Terminal summary of one analysis run.
#[derive(Debug, Serialize)]
pub struct AnalyzeSummary {
    pub files_read: usize,
    pub parsed_events: usize,
    pub parse_failures: usize,
    pub unique_ips: usize,
    pub file_failures: Vec<FileFailure>,
    pub top_ips: Vec<SummaryIp>,
    pub top_sqli_endpoint: Option<String>,
    pub tools: Vec<String>,
    pub inferred_scrape_target: Option<String>,
    pub reports: Vec<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct SummaryIp {
    pub ip: String,
    pub score: f64,
    pub requests: usize,
    pub categories: Vec<String>,
}

impl AnalyzeSummary {
    pub fn new(result: &AnalysisResult, failures: &[FileFailure], reports: Vec<PathBuf>) -> Self {
        Self {
            files_read: result.files_read,
            parsed_events: result.parsed_events,
            parse_failures: result.parse_failures,
            unique_ips: result.unique_ips,
            file_failures: failures.to_vec(),
            top_ips: result
                .top_suspicious_ips
                .iter()
                .take(SUMMARY_IPS)
                .map(|ip| SummaryIp {
                    ip: ip.ip.clone(),
                    score: ip.score,
                    requests: ip.request_count,
                    categories: ip
                        .attack_categories
                        .iter()
                        .map(|c| c.label().to_owned())
                        .collect(),
                })
                .collect(),
            top_sqli_endpoint: result.vulnerable_endpoints.first().map(|e| e.path.clone()),
            tools: result
                .tools_first_seen
                .iter()
                .map(|s| s.tool.clone())
                .collect(),
            inferred_scrape_target: result.inferred_scrape_target.clone(),
            reports,
        }
    }
}

impl Render for AnalyzeSummary {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "{}", "Analysis complete".bold())?;
        writeln!(
            w,
            "  Files: {} read, {} failed",
            self.files_read,
            self.file_failures.len()
        )?;
        writeln!(
            w,
            "  Events: {} parsed, {} unparseable, {} unique IPs",
            self.parsed_events, self.parse_failures, self.unique_ips
        )?;
        for failure in &self.file_failures {
            writeln!(
                w,
                "  {} {}: {}",
                "skipped".yellow(),
                failure.path.display(),
                failure.reason
            )?;
        }

        writeln!(w)?;
        if self.top_ips.is_empty() {
            writeln!(w, "  No suspicious IPs (no events parsed)")?;
        } else {
            writeln!(w, "{:<4} {:<40} {:>8} {:>9}  Attacks", "#", "IP", "Score", "Requests")?;
            writeln!(w, "{}", "-".repeat(80))?;
            for (rank, ip) in self.top_ips.iter().enumerate() {
                let score = format!("{:.2}", ip.score);
                let score = if ip.score > 10.0 {
                    score.red().bold()
                } else if ip.score > 5.0 {
                    score.yellow()
                } else {
                    score.green()
                };
                writeln!(
                    w,
                    "{:<4} {:<40} {:>8} {:>9}  {}",
                    rank + 1,
                    ip.ip,
                    score,
                    ip.requests,
                    ip.categories.join(", ")
                )?;
            }
        }

        writeln!(w)?;
        if !self.tools.is_empty() {
            writeln!(w, "  Tools (first seen order): {}", self.tools.join(", "))?;
        }
        if let Some(endpoint) = &self.top_sqli_endpoint {
            writeln!(w, "  Top SQLi endpoint: {}", endpoint.red())?;
        }
        if let Some(target) = &self.inferred_scrape_target {
            writeln!(w, "  Likely scraping target: {}", target.yellow())?;
        }
        for path in &self.reports {
            writeln!(w, "  {} {}", "wrote".green(), path.display())?;
        }

        Ok(())
    }
}
