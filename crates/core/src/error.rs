//! 에러 타입 — 도메인별 에러 정의
//!
//! 분류는 다음과 같습니다.
//! - 라인 단위 파싱 실패: 복구 가능, 카운트만 하고 계속 진행 ([`ParseError`])
//! - 파일 단위 I/O 실패: 복구 가능, 나머지 파일 처리 계속 ([`IngestError`])
//! - 시그니처 카탈로그 구성 오류: 시작 시점에 치명적 ([`AnalysisError::Catalog`])
//! - 잘못된 파라미터: 분석 전에 거부 ([`ConfigError`])

/// weblog-hunter 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum HunterError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 파싱 에러
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// 입력 수집 에러
    #[error("ingest error: {0}")]
    Ingest(#[from] IngestError),

    /// 분석 에러
    #[error("analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 파싱 에러
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// 어떤 형식에도 맞지 않음
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// 파싱 실패
    #[error("parse failed at offset {offset}: {reason}")]
    Failed { offset: usize, reason: String },

    /// 입력 데이터 초과
    #[error("input too large: {size} bytes (max: {max})")]
    TooLarge { size: usize, max: usize },
}

/// 입력 수집 에러
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// 파일을 읽을 수 없음
    #[error("unreadable source {path}: {reason}")]
    Unreadable { path: String, reason: String },

    /// 압축 해제 실패
    #[error("failed to decompress {path}: {reason}")]
    Decompress { path: String, reason: String },
}

/// 분석 에러
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// 시그니처 카탈로그 구성 오류
    #[error("signature catalog error: {0}")]
    Catalog(String),

    /// 잘못된 분석 파라미터
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts_to_top_level() {
        let err: HunterError = ConfigError::InvalidValue {
            field: "analysis.top_n".to_owned(),
            reason: "must be greater than 0".to_owned(),
        }
        .into();
        assert!(matches!(err, HunterError::Config(_)));
        assert!(err.to_string().contains("analysis.top_n"));
    }

    #[test]
    fn ingest_error_display() {
        let err = IngestError::Unreadable {
            path: "/var/log/nginx/access.log".to_owned(),
            reason: "permission denied".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("access.log"));
        assert!(msg.contains("permission denied"));
    }

    #[test]
    fn analysis_error_display() {
        let err = AnalysisError::InvalidParameter {
            name: "top_n".to_owned(),
            reason: "must be greater than 0".to_owned(),
        };
        assert!(err.to_string().contains("top_n"));
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: HunterError = io.into();
        assert!(matches!(err, HunterError::Io(_)));
    }
}
