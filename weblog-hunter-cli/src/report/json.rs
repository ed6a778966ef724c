//! JSON report
//!
//! A `summary` block for quick triage, followed by the full per-IP and
//! per-endpoint detail exactly as the analyzer produced it.

use serde::Serialize;
use weblog_hunter_core::types::{AnalysisResult, EndpointVulnerability, IpAnalysis};

use super::MAX_LISTED_ENDPOINTS;
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    summary: Summary<'a>,
    top_ips_detail: &'a [IpAnalysis],
    vulnerable_endpoints: &'a [EndpointVulnerability],
}

#[derive(Debug, Serialize)]
struct Summary<'a> {
    files_read: usize,
    parsed_events: usize,
    parse_failures: usize,
    unique_ips: usize,
    min_requests: usize,
    top_suspicious_ips: Vec<&'a str>,
    tools_by_first_seen: Vec<(&'a str, String)>,
    top_sqli_endpoints: Vec<&'a str>,
    inferred_scrape_section: Option<&'a str>,
}

impl<'a> JsonReport<'a> {
    fn from_result(result: &'a AnalysisResult) -> Self {
        let summary = Summary {
            files_read: result.files_read,
            parsed_events: result.parsed_events,
            parse_failures: result.parse_failures,
            unique_ips: result.unique_ips,
            min_requests: result.min_requests,
            top_suspicious_ips: result
                .top_suspicious_ips
                .iter()
                .map(|ip| ip.ip.as_str())
                .collect(),
            tools_by_first_seen: result
                .tools_first_seen
                .iter()
                .map(|s| (s.tool.as_str(), s.first_seen.to_rfc3339()))
                .collect(),
            top_sqli_endpoints: result
                .vulnerable_endpoints
                .iter()
                .take(MAX_LISTED_ENDPOINTS)
                .map(|e| e.path.as_str())
                .collect(),
            inferred_scrape_section: result.inferred_scrape_target.as_deref(),
        };
        Self {
            summary,
            top_ips_detail: &result.top_suspicious_ips,
            vulnerable_endpoints: &result.vulnerable_endpoints,
        }
    }
}

/// Render the JSON report (pretty-printed, trailing newline).
pub fn render(result: &AnalysisResult) -> Result<String, CliError> {
    let mut body = serde_json::to_string_pretty(&JsonReport::from_result(result))?;
    body.push('\n');
    Ok(body)
}
