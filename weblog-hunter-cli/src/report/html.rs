//! Self-contained HTML report
//!
//! Every value that originates from a log line (IPs, paths, URLs, tool names)
//! passes through [`escape`] before it is written.

use std::fmt::Write;

use weblog_hunter_core::types::{AnalysisResult, IpAnalysis};

use super::MAX_LISTED_ENDPOINTS;

const STYLE: &str = r#"
* { margin: 0; padding: 0; box-sizing: border-box; }
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; line-height: 1.6; color: #333; background: #f5f5f5; padding: 20px; }
.container { max-width: 1200px; margin: 0 auto; background: white; padding: 30px; border-radius: 8px; box-shadow: 0 2px 8px rgba(0,0,0,0.1); }
h1 { color: #2c3e50; margin-bottom: 20px; padding-bottom: 10px; border-bottom: 3px solid #3498db; }
h2 { color: #34495e; margin: 30px 0 15px; padding-bottom: 8px; border-bottom: 2px solid #ecf0f1; }
h3 { color: #7f8c8d; margin: 20px 0 10px; }
.summary { display: grid; grid-template-columns: repeat(auto-fit, minmax(200px, 1fr)); gap: 15px; margin: 20px 0; }
.summary-item { background: #ecf0f1; padding: 15px; border-radius: 5px; text-align: center; }
.summary-item .label { font-size: 0.9em; color: #7f8c8d; margin-bottom: 5px; }
.summary-item .value { font-size: 1.8em; font-weight: bold; color: #2c3e50; }
table { width: 100%; border-collapse: collapse; margin: 15px 0; }
th, td { padding: 12px; text-align: left; border-bottom: 1px solid #ecf0f1; }
th { background: #34495e; color: white; font-weight: 600; }
tr:hover { background: #f8f9fa; }
.high-score { color: #e74c3c; font-weight: bold; }
.medium-score { color: #f39c12; font-weight: bold; }
.low-score { color: #27ae60; }
.tool-badge, .attack-badge { display: inline-block; padding: 3px 8px; margin: 2px; color: white; border-radius: 3px; font-size: 0.85em; }
.tool-badge { background: #3498db; }
.attack-badge { background: #e74c3c; }
code { background: #f8f9fa; padding: 2px 6px; border-radius: 3px; font-family: 'Courier New', monospace; font-size: 0.9em; }
.ip-detail { background: #f8f9fa; padding: 20px; margin: 15px 0; border-radius: 5px; border-left: 4px solid #3498db; }
.endpoint-list { list-style: none; }
.endpoint-list li { padding: 8px; margin: 5px 0; background: #f8f9fa; border-radius: 3px; }
.abnormal-example { margin: 5px 0; padding: 8px; background: #fff5f5; border-left: 3px solid #e74c3c; border-radius: 3px; font-size: 0.9em; }
"#;

/// Escape text for use in HTML element content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// CSS class for a suspicion score.
fn score_class(score: f64) -> &'static str {
    if score > 10.0 {
        "high-score"
    } else if score > 5.0 {
        "medium-score"
    } else {
        "low-score"
    }
}

/// Render the HTML report.
pub fn render(result: &AnalysisResult) -> Result<String, std::fmt::Error> {
    let mut out = String::new();

    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, "<html lang=\"en\">\n<head>")?;
    writeln!(out, "<meta charset=\"UTF-8\">")?;
    writeln!(
        out,
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">"
    )?;
    writeln!(out, "<title>Web Log Recon Report</title>")?;
    writeln!(out, "<style>{STYLE}</style>\n</head>\n<body>")?;
    writeln!(out, "<div class=\"container\">")?;
    writeln!(out, "<h1>Web Log Recon Report</h1>")?;

    writeln!(out, "<div class=\"summary\">")?;
    for (label, value) in [
        ("Files Processed", result.files_read),
        ("Events Parsed", result.parsed_events),
        ("Parse Failures", result.parse_failures),
        ("Unique IPs", result.unique_ips),
    ] {
        writeln!(
            out,
            "<div class=\"summary-item\"><div class=\"label\">{label}</div><div class=\"value\">{value}</div></div>"
        )?;
    }
    writeln!(out, "</div>")?;

    write_top_ips(&mut out, result)?;
    write_tools(&mut out, result)?;
    write_endpoints(&mut out, result)?;

    writeln!(out, "<h2>Inferred Email Scraping Section</h2>")?;
    match &result.inferred_scrape_target {
        Some(path) => {
            writeln!(
                out,
                "<p>Most likely section: <strong><code>{}</code></strong></p>",
                escape(path)
            )?;
            writeln!(
                out,
                "<p><em>This identity/user endpoint was repeatedly hit by top suspicious IPs.</em></p>"
            )?;
        }
        None => writeln!(
            out,
            "<p>Could not infer a scraping section (no repeated identity endpoint hits among top suspicious IPs).</p>"
        )?,
    }

    writeln!(out, "<h2>Per-IP Movement Details</h2>")?;
    for ip in &result.top_suspicious_ips {
        write_ip_detail(&mut out, ip)?;
    }

    writeln!(out, "</div>\n</body>\n</html>")?;
    Ok(out)
}

fn write_top_ips(out: &mut String, result: &AnalysisResult) -> std::fmt::Result {
    writeln!(out, "<h2>Top Suspicious IPs</h2>")?;
    if result.top_suspicious_ips.is_empty() {
        return writeln!(out, "<p>No events were parsed.</p>");
    }

    writeln!(
        out,
        "<table>\n<thead><tr><th>Rank</th><th>IP Address</th><th>Score</th><th>Requests</th><th>Attacks</th><th>Tools</th></tr></thead>\n<tbody>"
    )?;
    for (rank, ip) in result.top_suspicious_ips.iter().enumerate() {
        let attacks: String = ip
            .attack_categories
            .iter()
            .map(|c| format!("<span class=\"attack-badge\">{}</span>", escape(c.label())))
            .collect();
        let tools: String = ip
            .tools_used
            .iter()
            .map(|t| format!("<span class=\"tool-badge\">{}</span>", escape(t)))
            .collect();
        writeln!(
            out,
            "<tr><td>{}</td><td><strong>{}</strong></td><td class=\"{}\">{:.2}</td><td>{}</td><td>{attacks}</td><td>{tools}</td></tr>",
            rank + 1,
            escape(&ip.ip),
            score_class(ip.score),
            ip.score,
            ip.request_count
        )?;
    }
    writeln!(out, "</tbody>\n</table>")
}

fn write_tools(out: &mut String, result: &AnalysisResult) -> std::fmt::Result {
    writeln!(out, "<h2>Attacker Tools (First Appearance)</h2>")?;
    if result.tools_first_seen.is_empty() {
        return writeln!(out, "<p>No tool fingerprints found in User-Agent fields.</p>");
    }
    writeln!(out, "<ul>")?;
    for sighting in &result.tools_first_seen {
        writeln!(
            out,
            "<li><strong>{}</strong>: first seen {}</li>",
            escape(&sighting.tool),
            sighting.first_seen.to_rfc3339()
        )?;
    }
    writeln!(out, "</ul>")
}

fn write_endpoints(out: &mut String, result: &AnalysisResult) -> std::fmt::Result {
    writeln!(out, "<h2>Likely Vulnerable SQLi Endpoints</h2>")?;
    let Some(top) = result.vulnerable_endpoints.first() else {
        return writeln!(out, "<p>No SQLi signatures found.</p>");
    };

    writeln!(
        out,
        "<table>\n<thead><tr><th>Rank</th><th>Endpoint</th><th>SQLi Hits</th><th>SQLi+5xx</th><th>Unique Payloads</th></tr></thead>\n<tbody>"
    )?;
    for (rank, endpoint) in result
        .vulnerable_endpoints
        .iter()
        .take(MAX_LISTED_ENDPOINTS)
        .enumerate()
    {
        writeln!(
            out,
            "<tr><td>{}</td><td><code>{}</code></td><td>{}</td><td>{}</td><td>{}</td></tr>",
            rank + 1,
            escape(&endpoint.path),
            endpoint.match_count,
            endpoint.server_error_count,
            endpoint.unique_payloads
        )?;
    }
    writeln!(out, "</tbody>\n</table>")?;

    writeln!(out, "<h3>Example SQLi Requests (Top Endpoint)</h3>")?;
    writeln!(out, "<ul class=\"endpoint-list\">")?;
    for url in &top.examples {
        writeln!(out, "<li><code>{}</code></li>", escape(url))?;
    }
    writeln!(out, "</ul>")
}

fn write_ip_detail(out: &mut String, ip: &IpAnalysis) -> std::fmt::Result {
    writeln!(out, "<div class=\"ip-detail\">")?;
    writeln!(out, "<h3>{}</h3>", escape(&ip.ip))?;
    writeln!(
        out,
        "<p><strong>Requests:</strong> {}{}</p>",
        ip.request_count,
        if ip.below_min_requests {
            " <em>(below advisory request floor)</em>"
        } else {
            ""
        }
    )?;

    let mut statuses: Vec<String> = ip
        .status_codes
        .iter()
        .map(|(code, count)| format!("{code}:{count}"))
        .collect();
    if ip.unknown_status_count > 0 {
        statuses.push(format!("-:{}", ip.unknown_status_count));
    }
    writeln!(
        out,
        "<p><strong>Status codes:</strong> {}</p>",
        statuses.join(", ")
    )?;
    writeln!(
        out,
        "<p><strong>Peak rate:</strong> {} req/min</p>",
        ip.max_requests_per_minute
    )?;

    writeln!(out, "<p><strong>Top Endpoints:</strong></p>")?;
    writeln!(out, "<ul class=\"endpoint-list\">")?;
    for (path, count) in &ip.top_paths {
        writeln!(out, "<li><code>{}</code>: {count} requests</li>", escape(path))?;
    }
    writeln!(out, "</ul>")?;

    if !ip.abnormal_examples.is_empty() {
        writeln!(out, "<p><strong>Abnormal Query Examples:</strong></p>")?;
        for example in &ip.abnormal_examples {
            let badges: String = example
                .categories
                .iter()
                .map(|c| format!("<span class=\"attack-badge\">{}</span>", escape(c.label())))
                .collect();
            let status = example
                .status
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".to_owned());
            writeln!(
                out,
                "<div class=\"abnormal-example\">{badges}<br><code>{}</code> (status {status})</div>",
                escape(&example.request)
            )?;
        }
    }
    writeln!(out, "</div>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures::sample_result;

    #[test]
    fn test_escape_special_characters() {
        assert_eq!(
            escape(r#"<script>alert("x")</script> & 'y'"#),
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt; &amp; &#39;y&#39;"
        );
        assert_eq!(escape("/plain/path"), "/plain/path");
    }

    #[test]
    fn test_score_class_thresholds() {
        assert_eq!(score_class(10.5), "high-score");
        assert_eq!(score_class(10.0), "medium-score");
        assert_eq!(score_class(5.0), "low-score");
        assert_eq!(score_class(0.0), "low-score");
    }

    #[test]
    fn test_html_escapes_log_content() {
        let html = render(&sample_result()).unwrap();
        assert!(!html.contains("<script>"), "raw payload must not reach the page");
        assert!(html.contains("/item?id=1&#39;&lt;script&gt;"));
    }

    #[test]
    fn test_html_structure() {
        let html = render(&sample_result()).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.trim_end().ends_with("</html>"));
        assert!(html.contains("<td class=\"high-score\">11.50</td>"));
        assert!(html.contains("<span class=\"tool-badge\">sqlmap</span>"));
        assert!(html.contains("<code>/api/users</code>"));
    }

    #[test]
    fn test_html_empty_result() {
        let html = render(&AnalysisResult::default()).unwrap();
        assert!(html.contains("No SQLi signatures found."));
        assert!(html.contains("Could not infer a scraping section"));
    }
}
