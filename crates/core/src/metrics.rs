//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()`, `metrics::histogram!()`
//! 매크로를 호출합니다. 전역 레코더가 설치되지 않으면 호출은 no-op입니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `weblog_hunter_`
//! - 접미어: `_total` (counter), `_seconds` (histogram/latency)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(weblog_hunter_core::metrics::LINES_PARSED_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 공격 카테고리 레이블 키 (sqli, traversal, xss, ...)
pub const LABEL_CATEGORY: &str = "category";

// ─── Ingest 메트릭 ──────────────────────────────────────────────────

/// 파싱에 성공한 라인 수 (counter)
pub const LINES_PARSED_TOTAL: &str = "weblog_hunter_lines_parsed_total";

/// 파싱에 실패한 라인 수 (counter)
pub const PARSE_FAILURES_TOTAL: &str = "weblog_hunter_parse_failures_total";

/// 읽기에 성공한 파일 수 (counter)
pub const FILES_READ_TOTAL: &str = "weblog_hunter_files_read_total";

/// 읽기에 실패한 파일 수 (counter)
pub const FILE_FAILURES_TOTAL: &str = "weblog_hunter_file_failures_total";

// ─── Analysis 메트릭 ────────────────────────────────────────────────

/// 탐지된 공격 시그니처 수 (counter, label: category)
pub const ATTACK_DETECTIONS_TOTAL: &str = "weblog_hunter_attack_detections_total";

/// 분석 한 번의 소요 시간 (histogram, 초)
pub const ANALYSIS_DURATION_SECONDS: &str = "weblog_hunter_analysis_duration_seconds";

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 후 한 번만 호출해야 합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_histogram};

    describe_counter!(
        LINES_PARSED_TOTAL,
        "Total number of access log lines parsed into events"
    );
    describe_counter!(
        PARSE_FAILURES_TOTAL,
        "Total number of access log lines that matched no supported format"
    );
    describe_counter!(FILES_READ_TOTAL, "Total number of log files read");
    describe_counter!(
        FILE_FAILURES_TOTAL,
        "Total number of log files that could not be read or decompressed"
    );
    describe_counter!(
        ATTACK_DETECTIONS_TOTAL,
        "Attack signature matches per category"
    );
    describe_histogram!(
        ANALYSIS_DURATION_SECONDS,
        "Time to analyze one batch of events in seconds"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_METRIC_NAMES: &[&str] = &[
        LINES_PARSED_TOTAL,
        PARSE_FAILURES_TOTAL,
        FILES_READ_TOTAL,
        FILE_FAILURES_TOTAL,
        ATTACK_DETECTIONS_TOTAL,
        ANALYSIS_DURATION_SECONDS,
    ];

    #[test]
    fn all_metrics_start_with_prefix() {
        for name in ALL_METRIC_NAMES {
            assert!(
                name.starts_with("weblog_hunter_"),
                "Metric '{name}' does not start with 'weblog_hunter_' prefix"
            );
        }
    }

    #[test]
    fn counters_end_with_total() {
        for name in &ALL_METRIC_NAMES[..5] {
            assert!(name.ends_with("_total"), "counter '{name}' lacks _total");
        }
    }

    #[test]
    fn describe_all_does_not_panic() {
        describe_all();
    }

    #[test]
    fn label_key_is_lowercase() {
        assert_eq!(LABEL_CATEGORY.to_lowercase(), LABEL_CATEGORY);
    }
}
