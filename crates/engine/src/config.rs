//! 엔진 설정
//!
//! [`AnalyzerConfig`]와 [`IngestorConfig`]는 core의
//! [`HunterConfig`](weblog_hunter_core::config::HunterConfig) 섹션에서 파생됩니다.
//!
//! # 사용 예시
//! ```ignore
//! use weblog_hunter_core::config::HunterConfig;
//! use weblog_hunter_engine::config::{AnalyzerConfig, IngestorConfig};
//!
//! let core_config = HunterConfig::default();
//! let analyzer = AnalyzerConfig::from_core(&core_config.analysis);
//! let ingestor = IngestorConfig::from_core(&core_config.ingest);
//! ```

use serde::{Deserialize, Serialize};

use weblog_hunter_core::config::{AnalysisConfig, IngestConfig, ScoreWeights};

use crate::error::EngineError;

/// IP별 상위 path 개수
pub const DEFAULT_TOP_PATHS: usize = 10;

/// 페이로드 고유성 판단에 쓰는 URL 접두어 길이 (문자 수)
pub const PAYLOAD_PREFIX_CHARS: usize = 200;

/// 분석기 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// IP당 비정상 요청 예시 최대 개수
    pub max_abnormal_examples: usize,
    /// 엔드포인트당 예시 요청 최대 개수
    pub max_endpoint_examples: usize,
    /// IP당 상위 path 개수
    pub top_paths: usize,
    /// 점수 가중치
    pub weights: ScoreWeights,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_abnormal_examples: 8,
            max_endpoint_examples: 5,
            top_paths: DEFAULT_TOP_PATHS,
            weights: ScoreWeights::default(),
        }
    }
}

impl AnalyzerConfig {
    /// core의 `AnalysisConfig`에서 분석기 설정을 생성합니다.
    pub fn from_core(core: &AnalysisConfig) -> Self {
        Self {
            max_abnormal_examples: core.max_abnormal_examples,
            max_endpoint_examples: core.max_endpoint_examples,
            weights: core.weights,
            ..Self::default()
        }
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.top_paths == 0 {
            return Err(EngineError::Config {
                field: "top_paths".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }
        self.weights
            .validate()
            .map_err(|e| EngineError::Config {
                field: "weights".to_owned(),
                reason: e.to_string(),
            })
    }
}

/// 분석기 설정 빌더
#[derive(Default)]
pub struct AnalyzerConfigBuilder {
    config: AnalyzerConfig,
}

impl AnalyzerConfigBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// IP당 비정상 요청 예시 최대 개수를 설정합니다.
    pub fn max_abnormal_examples(mut self, max: usize) -> Self {
        self.config.max_abnormal_examples = max;
        self
    }

    /// 엔드포인트당 예시 최대 개수를 설정합니다.
    pub fn max_endpoint_examples(mut self, max: usize) -> Self {
        self.config.max_endpoint_examples = max;
        self
    }

    /// IP당 상위 path 개수를 설정합니다.
    pub fn top_paths(mut self, count: usize) -> Self {
        self.config.top_paths = count;
        self
    }

    /// 점수 가중치를 설정합니다.
    pub fn weights(mut self, weights: ScoreWeights) -> Self {
        self.config.weights = weights;
        self
    }

    /// 설정을 검증하고 `AnalyzerConfig`를 생성합니다.
    pub fn build(self) -> Result<AnalyzerConfig, EngineError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// 입력 수집기 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestorConfig {
    /// 디렉토리 입력 시 처리할 파일 확장자 (점 없이)
    pub extensions: Vec<String>,
    /// 최대 라인 길이 (바이트)
    pub max_line_length: usize,
    /// 동시에 읽을 최대 파일 수
    pub concurrency: usize,
}

impl Default for IngestorConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["log".to_owned(), "gz".to_owned(), "txt".to_owned()],
            max_line_length: 64 * 1024, // 64KB
            concurrency: 4,
        }
    }
}

impl IngestorConfig {
    /// core의 `IngestConfig`에서 수집기 설정을 생성합니다.
    pub fn from_core(core: &IngestConfig) -> Self {
        Self {
            extensions: core.extensions.clone(),
            max_line_length: core.max_line_length,
            concurrency: core.concurrency,
        }
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), EngineError> {
        const MAX_CONCURRENCY: usize = 256;

        if self.concurrency == 0 || self.concurrency > MAX_CONCURRENCY {
            return Err(EngineError::Config {
                field: "concurrency".to_owned(),
                reason: format!("must be 1-{MAX_CONCURRENCY}"),
            });
        }

        if self.max_line_length == 0 {
            return Err(EngineError::Config {
                field: "max_line_length".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        if let Some(ext) = self
            .extensions
            .iter()
            .find(|ext| ext.is_empty() || ext.contains(['/', '\\']))
        {
            return Err(EngineError::Config {
                field: "extensions".to_owned(),
                reason: format!("invalid extension '{ext}'"),
            });
        }

        Ok(())
    }

    /// 파일 이름이 허용된 확장자로 끝나는지 확인합니다.
    ///
    /// 앞에 붙은 점은 무시합니다 (`.log`와 `log`는 같음).
    pub fn accepts_extension(&self, ext: &str) -> bool {
        self.extensions
            .iter()
            .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configs_are_valid() {
        AnalyzerConfig::default().validate().unwrap();
        IngestorConfig::default().validate().unwrap();
    }

    #[test]
    fn from_core_preserves_values() {
        let core = AnalysisConfig {
            max_abnormal_examples: 3,
            max_endpoint_examples: 2,
            ..Default::default()
        };
        let config = AnalyzerConfig::from_core(&core);
        assert_eq!(config.max_abnormal_examples, 3);
        assert_eq!(config.max_endpoint_examples, 2);
        assert_eq!(config.top_paths, DEFAULT_TOP_PATHS);
    }

    #[test]
    fn builder_rejects_negative_weights() {
        let weights = ScoreWeights {
            volume: -0.1,
            ..Default::default()
        };
        assert!(AnalyzerConfigBuilder::new().weights(weights).build().is_err());
    }

    #[test]
    fn builder_creates_valid_config() {
        let config = AnalyzerConfigBuilder::new()
            .max_abnormal_examples(1)
            .top_paths(3)
            .build()
            .unwrap();
        assert_eq!(config.max_abnormal_examples, 1);
        assert_eq!(config.top_paths, 3);
    }

    #[test]
    fn ingestor_rejects_zero_concurrency() {
        let config = IngestorConfig {
            concurrency: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn ingestor_rejects_path_like_extension() {
        let config = IngestorConfig {
            extensions: vec!["../log".to_owned()],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn accepts_extension_ignores_leading_dot_and_case() {
        let config = IngestorConfig {
            extensions: vec![".log".to_owned(), "GZ".to_owned()],
            ..Default::default()
        };
        assert!(config.accepts_extension("log"));
        assert!(config.accepts_extension("gz"));
        assert!(!config.accepts_extension("txt"));
    }
}
