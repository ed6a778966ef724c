//! IP별 집계

use std::collections::{BTreeMap, BTreeSet, HashMap};

use weblog_hunter_core::config::ScoreWeights;
use weblog_hunter_core::types::{
    AbnormalRequest, AttackCategory, IpAnalysis, LogEvent, UNKNOWN_TOOL,
};

use super::scoring::{ScoreInputs, suspicion_score};
use crate::signature::SignatureDetector;

/// 한 IP의 누적 상태
#[derive(Debug)]
pub(crate) struct IpProfile {
    ip: String,
    request_count: usize,
    status_codes: BTreeMap<u16, usize>,
    unknown_status_count: usize,
    error_count: usize,
    endpoints: BTreeMap<String, usize>,
    abnormal_count: usize,
    categories: BTreeSet<AttackCategory>,
    login_attempts: usize,
    identity_queries: usize,
    sensitive_requests: usize,
    api_requests: usize,
    session_param_requests: usize,
    // 분 단위 epoch -> 요청 수
    per_minute: HashMap<i64, usize>,
    tools: BTreeSet<String>,
    abnormal_examples: Vec<AbnormalRequest>,
}

impl IpProfile {
    pub(crate) fn new(ip: &str) -> Self {
        Self {
            ip: ip.to_owned(),
            request_count: 0,
            status_codes: BTreeMap::new(),
            unknown_status_count: 0,
            error_count: 0,
            endpoints: BTreeMap::new(),
            abnormal_count: 0,
            categories: BTreeSet::new(),
            login_attempts: 0,
            identity_queries: 0,
            sensitive_requests: 0,
            api_requests: 0,
            session_param_requests: 0,
            per_minute: HashMap::new(),
            tools: BTreeSet::new(),
            abnormal_examples: Vec::new(),
        }
    }

    /// 이벤트 하나를 반영합니다. 이벤트는 이미 enrich되어 있어야 합니다.
    pub(crate) fn observe(
        &mut self,
        event: &LogEvent,
        detector: &SignatureDetector,
        max_examples: usize,
    ) {
        self.request_count += 1;

        match event.status {
            Some(status) => *self.status_codes.entry(status).or_insert(0) += 1,
            None => self.unknown_status_count += 1,
        }
        if event.is_error_status() {
            self.error_count += 1;
        }

        *self.endpoints.entry(event.path.clone()).or_insert(0) += 1;

        if detector.is_login_endpoint(&event.path) {
            self.login_attempts += 1;
        }
        if detector.is_identity_endpoint(&event.path) {
            self.identity_queries += 1;
        }
        if detector.is_sensitive_endpoint(&event.path) {
            self.sensitive_requests += 1;
        }
        if detector.is_api_endpoint(&event.path) {
            self.api_requests += 1;
        }
        if detector.has_session_parameter(&event.url) {
            self.session_param_requests += 1;
        }

        if let Some(ts) = event.timestamp {
            let minute = ts.timestamp().div_euclid(60);
            *self.per_minute.entry(minute).or_insert(0) += 1;
        }

        if let Some(tool) = event.tool.as_deref() {
            if tool != UNKNOWN_TOOL {
                self.tools.insert(tool.to_owned());
            }
        }

        if event.is_abnormal() {
            self.abnormal_count += 1;
            self.categories.extend(event.attacks.iter().copied());
            if self.abnormal_examples.len() < max_examples {
                self.abnormal_examples.push(AbnormalRequest {
                    categories: event.attacks.iter().copied().collect(),
                    request: event.request_target(),
                    status: event.status,
                    timestamp: event.timestamp,
                });
            }
        }
    }

    /// 점수를 계산해 최종 분석 결과로 변환합니다.
    pub(crate) fn finish(
        self,
        weights: &ScoreWeights,
        min_requests: usize,
        top_paths: usize,
    ) -> IpAnalysis {
        let inputs = ScoreInputs {
            distinct_categories: self.categories.len(),
            request_count: self.request_count,
            error_count: self.error_count,
            distinct_endpoints: self.endpoints.len(),
            abnormal_count: self.abnormal_count,
            login_attempts: self.login_attempts,
            min_requests,
        };
        let score = suspicion_score(&inputs, weights);

        let mut paths: Vec<(String, usize)> = self
            .endpoints
            .iter()
            .map(|(path, count)| (path.clone(), *count))
            .collect();
        // BTreeMap 순회가 path 오름차순이므로 안정 정렬로 동률은 path 순서 유지
        paths.sort_by(|a, b| b.1.cmp(&a.1));
        paths.truncate(top_paths);

        IpAnalysis {
            ip: self.ip,
            request_count: self.request_count,
            score,
            status_codes: self.status_codes,
            unknown_status_count: self.unknown_status_count,
            error_ratio: inputs.error_ratio(),
            endpoints: self.endpoints,
            top_paths: paths,
            abnormal_count: self.abnormal_count,
            attack_categories: self.categories.into_iter().collect(),
            login_attempts: self.login_attempts,
            identity_queries: self.identity_queries,
            sensitive_requests: self.sensitive_requests,
            api_requests: self.api_requests,
            session_param_requests: self.session_param_requests,
            max_requests_per_minute: self.per_minute.values().copied().max().unwrap_or(0),
            tools_used: self.tools.into_iter().collect(),
            abnormal_examples: self.abnormal_examples,
            below_min_requests: self.request_count < min_requests,
        }
    }
}
