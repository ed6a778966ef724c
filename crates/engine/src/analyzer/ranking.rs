//! 순위 결정 -- IP, SQLi 엔드포인트, 도구 최초 관측, 스크래핑 대상 추정
//!
//! 모든 정렬은 전순서(total order)이며 동률 처리 규칙이 고정되어 있어
//! 같은 입력에 대해 항상 같은 결과를 냅니다.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use weblog_hunter_core::types::{
    AttackCategory, EndpointVulnerability, IpAnalysis, LogEvent, ToolSighting, UNKNOWN_TOOL,
};

use crate::config::PAYLOAD_PREFIX_CHARS;
use crate::signature::SignatureDetector;

/// 스크래핑 대상으로 인정하기 위한 최소 합산 요청 수
pub const MIN_SCRAPE_HITS: usize = 2;

/// IP 순위 비교: 점수 내림차순 → 요청 수 내림차순 → IP 문자열 오름차순
pub fn compare_ips(a: &IpAnalysis, b: &IpAnalysis) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.request_count.cmp(&a.request_count))
        .then_with(|| a.ip.cmp(&b.ip))
}

/// IP 분석 결과를 정렬하고 상위 `top_n`개만 남깁니다.
pub fn rank_ips(mut analyses: Vec<IpAnalysis>, top_n: usize) -> Vec<IpAnalysis> {
    analyses.sort_by(compare_ips);
    analyses.truncate(top_n);
    analyses
}

#[derive(Default)]
struct EndpointAccumulator {
    match_count: usize,
    server_error_count: usize,
    payloads: BTreeSet<String>,
    examples: Vec<String>,
}

/// SQLi 매칭 엔드포인트 순위를 만듭니다.
///
/// 매칭 수 내림차순, 동률이면 path 오름차순. 매칭이 없는 엔드포인트는 제외합니다.
/// 이벤트는 이미 enrich되어 있어야 합니다.
pub fn rank_endpoints(events: &[LogEvent], max_examples: usize) -> Vec<EndpointVulnerability> {
    let mut by_path: BTreeMap<&str, EndpointAccumulator> = BTreeMap::new();

    for event in events
        .iter()
        .filter(|e| e.attacks.contains(&AttackCategory::Sqli))
    {
        let acc = by_path.entry(event.path.as_str()).or_default();
        acc.match_count += 1;
        if event.is_server_error() {
            acc.server_error_count += 1;
        }
        acc.payloads
            .insert(event.url.chars().take(PAYLOAD_PREFIX_CHARS).collect());
        if acc.examples.len() < max_examples {
            acc.examples.push(event.url.clone());
        }
    }

    let mut ranked: Vec<EndpointVulnerability> = by_path
        .into_iter()
        .map(|(path, acc)| EndpointVulnerability {
            path: path.to_owned(),
            match_count: acc.match_count,
            server_error_count: acc.server_error_count,
            unique_payloads: acc.payloads.len(),
            examples: acc.examples,
        })
        .collect();

    // path 오름차순으로 수집되었으므로 안정 정렬만으로 동률 규칙 충족
    ranked.sort_by(|a, b| b.match_count.cmp(&a.match_count));
    ranked
}

/// 도구별 최초 관측 시각을 수집합니다.
///
/// 수집 순서대로 훑어 처음 본 도구만 기록하고 이후 관측은 무시합니다.
/// 타임스탬프가 없는 이벤트와 `unknown` 도구는 건너뜁니다.
/// 결과는 최초 관측 시각 오름차순입니다 (동률이면 먼저 관측된 순).
pub fn first_seen_tools(events: &[LogEvent]) -> Vec<ToolSighting> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut sightings = Vec::new();

    for event in events {
        let (Some(tool), Some(ts)) = (event.tool.as_deref(), event.timestamp) else {
            continue;
        };
        if tool == UNKNOWN_TOOL || !seen.insert(tool) {
            continue;
        }
        sightings.push(ToolSighting {
            tool: tool.to_owned(),
            first_seen: ts,
        });
    }

    sightings.sort_by(|a, b| a.first_seen.cmp(&b.first_seen));
    sightings
}

/// 상위 의심 IP들이 반복적으로 요청한 사용자/계정 엔드포인트를 추정합니다.
///
/// 점수가 0인(정상) IP는 의심 IP로 세지 않습니다. 상위 IP들의 합산 요청 수가 가장 많은 식별 엔드포인트를 고릅니다.
/// 동률이면 2xx 응답이 많은 쪽, 그다음 path 오름차순입니다.
/// 합산 요청 수가 [`MIN_SCRAPE_HITS`] 미만이거나 후보가 없으면 `None`입니다.
pub fn infer_scrape_target(
    events: &[LogEvent],
    top_ips: &[IpAnalysis],
    detector: &SignatureDetector,
) -> Option<String> {
    let suspects: BTreeSet<&str> = top_ips
        .iter()
        .filter(|ip| ip.score > 0.0)
        .map(|ip| ip.ip.as_str())
        .collect();
    if suspects.is_empty() {
        return None;
    }

    // path -> (요청 수, 2xx 수)
    let mut candidates: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for event in events {
        if !suspects.contains(event.ip.as_str()) || !detector.is_identity_endpoint(&event.path) {
            continue;
        }
        let entry = candidates.entry(event.path.as_str()).or_insert((0, 0));
        entry.0 += 1;
        if event.is_success() {
            entry.1 += 1;
        }
    }

    candidates
        .into_iter()
        .filter(|(_, (hits, _))| *hits >= MIN_SCRAPE_HITS)
        .min_by(|(path_a, (hits_a, ok_a)), (path_b, (hits_b, ok_b))| {
            hits_b
                .cmp(hits_a)
                .then_with(|| ok_b.cmp(ok_a))
                .then_with(|| path_a.cmp(path_b))
        })
        .map(|(path, _)| path.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn analysis(ip: &str, score: f64, requests: usize) -> IpAnalysis {
        IpAnalysis {
            ip: ip.to_owned(),
            request_count: requests,
            score,
            status_codes: BTreeMap::new(),
            unknown_status_count: 0,
            error_ratio: 0.0,
            endpoints: BTreeMap::new(),
            top_paths: Vec::new(),
            abnormal_count: 0,
            attack_categories: Vec::new(),
            login_attempts: 0,
            identity_queries: 0,
            sensitive_requests: 0,
            api_requests: 0,
            session_param_requests: 0,
            max_requests_per_minute: 0,
            tools_used: Vec::new(),
            abnormal_examples: Vec::new(),
            below_min_requests: false,
        }
    }

    fn event(ip: &str, url: &str, status: u16, ts: Option<&str>, tool: &str) -> LogEvent {
        let (path, query) = LogEvent::split_url(url);
        LogEvent {
            ip: ip.to_owned(),
            timestamp: ts.and_then(|t| DateTime::parse_from_rfc3339(t).ok()),
            method: "GET".to_owned(),
            url: url.to_owned(),
            path,
            query,
            protocol: None,
            status: Some(status),
            size: None,
            referer: None,
            user_agent: String::new(),
            attacks: BTreeSet::new(),
            tool: Some(tool.to_owned()),
        }
    }

    fn sqli(mut e: LogEvent) -> LogEvent {
        e.attacks.insert(AttackCategory::Sqli);
        e
    }

    #[test]
    fn ip_ties_break_by_count_then_ip() {
        let ranked = rank_ips(
            vec![
                analysis("10.0.0.2", 1.0, 5),
                analysis("10.0.0.10", 1.0, 5),
                analysis("10.0.0.3", 1.0, 9),
                analysis("10.0.0.1", 2.0, 1),
            ],
            10,
        );
        let order: Vec<&str> = ranked.iter().map(|a| a.ip.as_str()).collect();
        assert_eq!(order, vec!["10.0.0.1", "10.0.0.3", "10.0.0.10", "10.0.0.2"]);
    }

    #[test]
    fn rank_ips_truncates() {
        let ranked = rank_ips(
            vec![analysis("a", 1.0, 1), analysis("b", 2.0, 1), analysis("c", 3.0, 1)],
            2,
        );
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].ip, "c");
    }

    #[test]
    fn endpoints_rank_by_count_then_path() {
        let events = vec![
            sqli(event("1.1.1.1", "/b?id=1'", 500, None, "curl")),
            sqli(event("1.1.1.1", "/a?id=1'", 200, None, "curl")),
            sqli(event("1.1.1.1", "/c?id=1'", 200, None, "curl")),
            sqli(event("1.1.1.1", "/c?id=2'", 200, None, "curl")),
            event("1.1.1.1", "/d", 200, None, "curl"),
        ];
        let ranked = rank_endpoints(&events, 5);
        let order: Vec<&str> = ranked.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(order, vec!["/c", "/a", "/b"]);
        assert_eq!(ranked[0].unique_payloads, 2);
        assert_eq!(ranked[2].server_error_count, 1);
    }

    #[test]
    fn endpoint_payloads_use_truncated_prefix() {
        let long = "x".repeat(300);
        let events = vec![
            sqli(event("1.1.1.1", &format!("/q?id='{long}a"), 200, None, "curl")),
            sqli(event("1.1.1.1", &format!("/q?id='{long}b"), 200, None, "curl")),
        ];
        let ranked = rank_endpoints(&events, 1);
        assert_eq!(ranked[0].match_count, 2);
        assert_eq!(ranked[0].unique_payloads, 1);
        assert_eq!(ranked[0].examples.len(), 1);
    }

    #[test]
    fn tools_first_seen_never_updated() {
        let events = vec![
            event("1.1.1.1", "/", 200, Some("2024-01-01T00:00:01Z"), "curl"),
            event("1.1.1.1", "/", 200, Some("2024-01-01T00:00:00Z"), "sqlmap"),
            event("1.1.1.1", "/", 200, Some("2023-12-31T00:00:00Z"), "curl"),
            event("1.1.1.1", "/", 200, Some("2023-01-01T00:00:00Z"), "unknown"),
            event("1.1.1.1", "/", 200, None, "nikto"),
        ];
        let sightings = first_seen_tools(&events);
        let tools: Vec<&str> = sightings.iter().map(|s| s.tool.as_str()).collect();
        assert_eq!(tools, vec!["sqlmap", "curl"]);
        assert_eq!(
            sightings[1].first_seen,
            DateTime::parse_from_rfc3339("2024-01-01T00:00:01Z").unwrap()
        );
    }

    #[test]
    fn scrape_target_prefers_most_hits() {
        let detector = SignatureDetector::builtin().unwrap();
        let events = vec![
            event("1.1.1.1", "/api/users/list", 200, None, "curl"),
            event("1.1.1.1", "/api/users/list", 200, None, "curl"),
            event("2.2.2.2", "/api/users/list", 200, None, "curl"),
            event("1.1.1.1", "/account", 200, None, "curl"),
            event("1.1.1.1", "/account", 200, None, "curl"),
            event("9.9.9.9", "/account", 200, None, "curl"),
            event("9.9.9.9", "/account", 200, None, "curl"),
        ];
        let top = vec![analysis("1.1.1.1", 1.0, 4), analysis("2.2.2.2", 1.0, 1)];
        assert_eq!(
            infer_scrape_target(&events, &top, &detector).as_deref(),
            Some("/api/users/list")
        );
    }

    #[test]
    fn scrape_target_tie_prefers_successful_path() {
        let detector = SignatureDetector::builtin().unwrap();
        let events = vec![
            event("1.1.1.1", "/profile", 404, None, "curl"),
            event("1.1.1.1", "/profile", 404, None, "curl"),
            event("1.1.1.1", "/users", 200, None, "curl"),
            event("1.1.1.1", "/users", 404, None, "curl"),
        ];
        let top = vec![analysis("1.1.1.1", 1.0, 4)];
        assert_eq!(
            infer_scrape_target(&events, &top, &detector).as_deref(),
            Some("/users")
        );
    }

    #[test]
    fn scrape_target_absent_without_identity_paths() {
        let detector = SignatureDetector::builtin().unwrap();
        let events = vec![
            event("1.1.1.1", "/products/1", 200, None, "curl"),
            event("1.1.1.1", "/products/1", 200, None, "curl"),
        ];
        let top = vec![analysis("1.1.1.1", 1.0, 2)];
        assert!(infer_scrape_target(&events, &top, &detector).is_none());
    }

    #[test]
    fn benign_top_ips_give_no_scrape_target() {
        let detector = SignatureDetector::builtin().unwrap();
        let events: Vec<LogEvent> = (0..100)
            .map(|_| event("1.1.1.1", "/account/profile", 200, None, "browser"))
            .collect();
        let top = vec![analysis("1.1.1.1", 0.0, 100)];
        assert!(infer_scrape_target(&events, &top, &detector).is_none());
    }

    #[test]
    fn single_hit_is_not_a_scrape_target() {
        let detector = SignatureDetector::builtin().unwrap();
        let events = vec![event("1.1.1.1", "/account", 200, None, "curl")];
        let top = vec![analysis("1.1.1.1", 1.0, 1)];
        assert!(infer_scrape_target(&events, &top, &detector).is_none());
    }
}
