//! 분석 엔진 에러 타입
//!
//! [`EngineError`]는 파싱, 수집, 시그니처 카탈로그, 분석 파라미터 에러를 표현합니다.
//! `From<EngineError> for HunterError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.

use weblog_hunter_core::error::{
    AnalysisError, ConfigError, HunterError, IngestError, ParseError,
};

/// 분석 엔진 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// 로그 라인 파싱 실패
    #[error("parse error: {format} at offset {offset}: {reason}")]
    Parse {
        /// 파서 형식 (combined, common 등)
        format: String,
        /// 실패 위치 (바이트 오프셋)
        offset: usize,
        /// 실패 사유
        reason: String,
    },

    /// 지원하지 않는 로그 형식
    #[error("unsupported log format: {0}")]
    UnsupportedFormat(String),

    /// 라인 길이 초과
    #[error("line too long: {size} bytes (max: {max})")]
    LineTooLong {
        /// 실제 길이
        size: usize,
        /// 허용 최대 길이
        max: usize,
    },

    /// 시그니처 카탈로그 구성 오류 (잘못된 패턴 등)
    #[error("signature error: '{name}': {reason}")]
    Signature {
        /// 시그니처 이름 (카테고리 또는 도구)
        name: String,
        /// 에러 사유
        reason: String,
    },

    /// 입력 파일을 읽을 수 없음
    #[error("ingest error: {path}: {reason}")]
    Ingest {
        /// 파일 경로
        path: String,
        /// 에러 사유
        reason: String,
    },

    /// 압축 해제 실패
    #[error("decompress error: {path}: {reason}")]
    Decompress {
        /// 파일 경로
        path: String,
        /// 에러 사유
        reason: String,
    },

    /// 설정/파라미터 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// 정규식 컴파일 에러
    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl From<EngineError> for HunterError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Parse {
                format,
                offset,
                reason,
            } => HunterError::Parse(ParseError::Failed {
                offset,
                reason: format!("{format}: {reason}"),
            }),
            EngineError::UnsupportedFormat(format) => {
                HunterError::Parse(ParseError::UnsupportedFormat(format))
            }
            EngineError::LineTooLong { size, max } => {
                HunterError::Parse(ParseError::TooLarge { size, max })
            }
            EngineError::Signature { name, reason } => {
                HunterError::Analysis(AnalysisError::Catalog(format!("{name}: {reason}")))
            }
            EngineError::Ingest { path, reason } => {
                HunterError::Ingest(IngestError::Unreadable { path, reason })
            }
            EngineError::Decompress { path, reason } => {
                HunterError::Ingest(IngestError::Decompress { path, reason })
            }
            EngineError::Config { field, reason } => {
                HunterError::Config(ConfigError::InvalidValue { field, reason })
            }
            EngineError::Io(e) => HunterError::Io(e),
            EngineError::Regex(e) => HunterError::Analysis(AnalysisError::Catalog(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_display() {
        let err = EngineError::Parse {
            format: "combined".to_owned(),
            offset: 0,
            reason: "no structural match".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("combined"));
        assert!(msg.contains("no structural match"));
    }

    #[test]
    fn signature_error_maps_to_catalog() {
        let err: HunterError = EngineError::Signature {
            name: "sqli".to_owned(),
            reason: "unclosed group".to_owned(),
        }
        .into();
        assert!(matches!(
            err,
            HunterError::Analysis(AnalysisError::Catalog(_))
        ));
    }

    #[test]
    fn config_error_maps_to_invalid_value() {
        let err: HunterError = EngineError::Config {
            field: "top_n".to_owned(),
            reason: "must be greater than 0".to_owned(),
        }
        .into();
        assert!(matches!(
            err,
            HunterError::Config(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn ingest_error_maps_to_unreadable() {
        let err: HunterError = EngineError::Ingest {
            path: "/var/log/nginx/access.log".to_owned(),
            reason: "permission denied".to_owned(),
        }
        .into();
        assert!(matches!(
            err,
            HunterError::Ingest(IngestError::Unreadable { .. })
        ));
    }

    #[test]
    fn line_too_long_maps_to_too_large() {
        let err: HunterError = EngineError::LineTooLong { size: 10, max: 5 }.into();
        assert!(matches!(
            err,
            HunterError::Parse(ParseError::TooLarge { size: 10, max: 5 })
        ));
    }
}
