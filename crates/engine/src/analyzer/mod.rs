//! 위협 분석기 -- 이벤트 enrich, IP별 집계, 점수, 순위
//!
//! # 처리 순서
//! 1. 모든 이벤트를 [`SignatureDetector`]로 한 번씩 enrich
//! 2. 출발지 IP별로 집계 ([`profile`])
//! 3. IP별 의심 점수 계산 ([`scoring`])
//! 4. IP 순위, SQLi 엔드포인트 순위, 도구 최초 관측, 스크래핑 대상 추정 ([`ranking`])
//!
//! 분석기는 I/O를 하지 않으며, 같은 입력과 파라미터에 대해 항상 같은
//! [`AnalysisResult`]를 만듭니다.
//!
//! # 사용 예시
//! ```ignore
//! let analyzer = ThreatAnalyzer::with_defaults()?;
//! let result = analyzer.analyze(&mut events, 10, 50)?;
//! if let Some(top) = result.top_ip() {
//!     println!("{} score={:.2}", top.ip, top.score);
//! }
//! ```

pub(crate) mod profile;
pub mod ranking;
pub mod scoring;

pub use ranking::{
    MIN_SCRAPE_HITS, first_seen_tools, infer_scrape_target, rank_endpoints, rank_ips,
};
pub use scoring::{ScoreInputs, suspicion_score};

use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use metrics::{counter, histogram};
use tracing::{debug, info};

use weblog_hunter_core::metrics as names;
use weblog_hunter_core::types::{AnalysisResult, AttackCategory, LogEvent};

use crate::config::AnalyzerConfig;
use crate::error::EngineError;
use crate::signature::SignatureDetector;

use self::profile::IpProfile;

/// 위협 분석기
pub struct ThreatAnalyzer {
    detector: SignatureDetector,
    config: AnalyzerConfig,
}

impl ThreatAnalyzer {
    /// 탐지기와 설정으로 분석기를 생성합니다.
    pub fn new(detector: SignatureDetector, config: AnalyzerConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self { detector, config })
    }

    /// 기본 카탈로그와 기본 설정으로 분석기를 생성합니다.
    pub fn with_defaults() -> Result<Self, EngineError> {
        Self::new(SignatureDetector::builtin()?, AnalyzerConfig::default())
    }

    /// 사용 중인 탐지기
    pub fn detector(&self) -> &SignatureDetector {
        &self.detector
    }

    /// 분석기 설정
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// 이벤트를 분석합니다.
    ///
    /// 이벤트는 제자리에서 enrich되며, 이미 enrich된 이벤트는 다시 평가하지 않습니다.
    /// `min_requests`는 참고값이며 IP를 제외하지 않습니다.
    ///
    /// # Errors
    /// `top_n`이 0이면 [`EngineError::Config`]를 반환합니다.
    pub fn analyze(
        &self,
        events: &mut [LogEvent],
        top_n: usize,
        min_requests: usize,
    ) -> Result<AnalysisResult, EngineError> {
        if top_n == 0 {
            return Err(EngineError::Config {
                field: "top_n".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        let started = Instant::now();

        if events.is_empty() {
            debug!("no events to analyze");
            return Ok(AnalysisResult {
                min_requests,
                ..AnalysisResult::default()
            });
        }

        let mut detections: BTreeMap<AttackCategory, u64> = BTreeMap::new();
        for event in events.iter_mut() {
            self.detector.enrich(event);
            for category in &event.attacks {
                *detections.entry(*category).or_insert(0) += 1;
            }
        }
        for (category, count) in &detections {
            counter!(names::ATTACK_DETECTIONS_TOTAL, names::LABEL_CATEGORY => category.as_str())
                .increment(*count);
        }

        let mut profiles: HashMap<&str, IpProfile> = HashMap::new();
        for event in events.iter() {
            profiles
                .entry(event.ip.as_str())
                .or_insert_with(|| IpProfile::new(&event.ip))
                .observe(event, &self.detector, self.config.max_abnormal_examples);
        }
        let unique_ips = profiles.len();

        let analyses = profiles
            .into_values()
            .map(|profile| {
                profile.finish(&self.config.weights, min_requests, self.config.top_paths)
            })
            .collect();
        let top_suspicious_ips = rank_ips(analyses, top_n);

        let vulnerable_endpoints = rank_endpoints(events, self.config.max_endpoint_examples);
        let tools_first_seen = first_seen_tools(events);
        let inferred_scrape_target =
            infer_scrape_target(events, &top_suspicious_ips, &self.detector);

        let elapsed = started.elapsed();
        histogram!(names::ANALYSIS_DURATION_SECONDS).record(elapsed.as_secs_f64());

        info!(
            events = events.len(),
            unique_ips,
            vulnerable_endpoints = vulnerable_endpoints.len(),
            tools = tools_first_seen.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "analysis completed"
        );

        Ok(AnalysisResult {
            files_read: 0,
            parsed_events: events.len(),
            parse_failures: 0,
            unique_ips,
            min_requests,
            top_suspicious_ips,
            vulnerable_endpoints,
            tools_first_seen,
            inferred_scrape_target,
        })
    }
}
