//! Markdown report

use std::fmt::Write;

use weblog_hunter_core::types::{AnalysisResult, IpAnalysis};

use super::MAX_LISTED_ENDPOINTS;

/// Render the full Markdown report.
pub fn render(result: &AnalysisResult) -> Result<String, std::fmt::Error> {
    let mut out = String::new();

    writeln!(out, "# Web Log Recon Report\n")?;
    writeln!(out, "- Files read: **{}**", result.files_read)?;
    writeln!(out, "- Parsed events: **{}**", result.parsed_events)?;
    writeln!(
        out,
        "- Parse failures (non-matching lines): **{}**",
        result.parse_failures
    )?;
    writeln!(out, "- Unique source IPs: **{}**\n", result.unique_ips)?;

    write_top_ips(&mut out, result)?;
    write_tools(&mut out, result)?;
    write_endpoints(&mut out, result)?;
    write_scrape_target(&mut out, result)?;

    writeln!(out, "## Per-IP movement (top suspicious IPs)\n")?;
    for ip in &result.top_suspicious_ips {
        write_ip_detail(&mut out, ip, result.min_requests)?;
    }

    Ok(out)
}

fn write_top_ips(out: &mut String, result: &AnalysisResult) -> std::fmt::Result {
    writeln!(out, "## Top suspicious IPs (auto-scored)\n")?;
    if result.top_suspicious_ips.is_empty() {
        return writeln!(out, "No events were parsed.\n");
    }

    writeln!(out, "| Rank | IP | Score | Requests | Attack categories |")?;
    writeln!(out, "|---:|---|---:|---:|---|")?;
    for (rank, ip) in result.top_suspicious_ips.iter().enumerate() {
        let categories = if ip.attack_categories.is_empty() {
            "-".to_owned()
        } else {
            ip.attack_categories
                .iter()
                .map(|c| c.label())
                .collect::<Vec<_>>()
                .join(", ")
        };
        writeln!(
            out,
            "| {} | {} | {:.2} | {} | {} |",
            rank + 1,
            ip.ip,
            ip.score,
            ip.request_count,
            categories
        )?;
    }
    writeln!(out)
}

fn write_tools(out: &mut String, result: &AnalysisResult) -> std::fmt::Result {
    writeln!(out, "## Attacker tools (by first appearance in logs)\n")?;
    if result.tools_first_seen.is_empty() {
        writeln!(out, "- No tool fingerprints found in User-Agent fields.")?;
    }
    for sighting in &result.tools_first_seen {
        writeln!(
            out,
            "- **{}**: first seen {}",
            sighting.tool,
            sighting.first_seen.to_rfc3339()
        )?;
    }
    writeln!(out)
}

fn write_endpoints(out: &mut String, result: &AnalysisResult) -> std::fmt::Result {
    writeln!(out, "## Likely vulnerable SQLi endpoints (ranked)\n")?;
    let Some(top) = result.vulnerable_endpoints.first() else {
        return writeln!(out, "- No SQLi signatures found.\n");
    };

    writeln!(
        out,
        "| Rank | Endpoint | SQLi hits | SQLi+5xx | Unique payloads |"
    )?;
    writeln!(out, "|---:|---|---:|---:|---:|")?;
    for (rank, endpoint) in result
        .vulnerable_endpoints
        .iter()
        .take(MAX_LISTED_ENDPOINTS)
        .enumerate()
    {
        writeln!(
            out,
            "| {} | `{}` | {} | {} | {} |",
            rank + 1,
            endpoint.path,
            endpoint.match_count,
            endpoint.server_error_count,
            endpoint.unique_payloads
        )?;
    }
    writeln!(out)?;

    writeln!(out, "### Example SQLi requests targeting `{}`", top.path)?;
    for url in &top.examples {
        writeln!(out, "- `{url}`")?;
    }
    writeln!(out)
}

fn write_scrape_target(out: &mut String, result: &AnalysisResult) -> std::fmt::Result {
    writeln!(out, "## Inferred section used for email scraping\n")?;
    match &result.inferred_scrape_target {
        Some(path) => writeln!(
            out,
            "- Most likely section: **`{path}`** (identity/user endpoint repeatedly hit by top suspicious IPs)\n"
        ),
        None => writeln!(
            out,
            "- Could not infer a scraping section (no repeated identity endpoint hits among top suspicious IPs).\n"
        ),
    }
}

fn write_ip_detail(out: &mut String, ip: &IpAnalysis, min_requests: usize) -> std::fmt::Result {
    writeln!(out, "### {}", ip.ip)?;
    writeln!(out, "- Requests: **{}** (score {:.2})", ip.request_count, ip.score)?;
    if ip.below_min_requests {
        writeln!(
            out,
            "- Low volume: below the advisory floor of {min_requests} requests"
        )?;
    }

    let mut statuses: Vec<String> = ip
        .status_codes
        .iter()
        .map(|(code, count)| format!("{code}:{count}"))
        .collect();
    if ip.unknown_status_count > 0 {
        statuses.push(format!("-:{}", ip.unknown_status_count));
    }
    writeln!(out, "- Status codes: {}", statuses.join(", "))?;
    writeln!(
        out,
        "- Error ratio: {:.0}%, peak {} req/min",
        ip.error_ratio * 100.0,
        ip.max_requests_per_minute
    )?;
    writeln!(
        out,
        "- Login attempts: {}, identity queries: {}, sensitive requests: {}, API requests: {}",
        ip.login_attempts, ip.identity_queries, ip.sensitive_requests, ip.api_requests
    )?;
    if !ip.tools_used.is_empty() {
        writeln!(out, "- Tools: {}", ip.tools_used.join(", "))?;
    }

    writeln!(out, "- Top endpoints:")?;
    for (path, count) in &ip.top_paths {
        writeln!(out, "  - `{path}`: {count}")?;
    }

    if !ip.abnormal_examples.is_empty() {
        writeln!(out, "- Abnormal query examples:")?;
        for example in &ip.abnormal_examples {
            let labels: Vec<&str> = example.categories.iter().map(|c| c.label()).collect();
            let status = example
                .status
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".to_owned());
            writeln!(
                out,
                "  - **{}** `{}` (status {status})",
                labels.join(","),
                example.request
            )?;
        }
    }
    writeln!(out)
}
