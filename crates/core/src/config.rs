//! 설정 관리 — weblog-hunter 설정 파일 파싱 및 런타임 설정
//!
//! [`HunterConfig`]는 모든 섹션의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`WEBLOG_HUNTER_ANALYSIS_TOP_N=20` 형식)
//! 3. 설정 파일 (`weblog-hunter.toml`, 또는 `.yaml`/`.yml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), weblog_hunter_core::error::HunterError> {
//! use weblog_hunter_core::config::HunterConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = HunterConfig::load("weblog-hunter.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = HunterConfig::parse("[analysis]\ntop_n = 20")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, HunterError};

/// 지원하는 리포트 형식
pub const VALID_OUTPUT_FORMATS: [&str; 3] = ["md", "json", "html"];

/// weblog-hunter 통합 설정
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HunterConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 분석 설정
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// 입력 수집 설정
    #[serde(default, alias = "performance")]
    pub ingest: IngestConfig,
    /// 리포트 출력 설정
    #[serde(default)]
    pub output: OutputConfig,
}

impl HunterConfig {
    /// 설정 파일을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, HunterError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 설정 파일을 로드합니다 (환경변수 오버라이드 없음).
    ///
    /// 확장자가 `.yaml`/`.yml`이면 YAML로, 그 외에는 TOML로 파싱합니다.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, HunterError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                HunterError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                HunterError::Io(e)
            }
        })?;

        let is_yaml = path
            .extension()
            .is_some_and(|ext| ext == "yaml" || ext == "yml");

        let config = if is_yaml {
            Self::parse_yaml(&content)?
        } else {
            Self::parse(&content)?
        };
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, HunterError> {
        toml::from_str(toml_str).map_err(|e| {
            HunterError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// YAML 문자열에서 설정을 파싱합니다.
    ///
    /// 빈 문서는 기본값으로 취급합니다.
    pub fn parse_yaml(yaml_str: &str) -> Result<Self, HunterError> {
        if yaml_str.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml_str).map_err(|e| {
            HunterError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `WEBLOG_HUNTER_{SECTION}_{FIELD}`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "WEBLOG_HUNTER_GENERAL_LOG_LEVEL");
        override_string(
            &mut self.general.log_format,
            "WEBLOG_HUNTER_GENERAL_LOG_FORMAT",
        );

        // Analysis
        override_usize(&mut self.analysis.top_n, "WEBLOG_HUNTER_ANALYSIS_TOP_N");
        override_usize(
            &mut self.analysis.min_requests,
            "WEBLOG_HUNTER_ANALYSIS_MIN_REQUESTS",
        );
        override_usize(
            &mut self.analysis.max_abnormal_examples,
            "WEBLOG_HUNTER_ANALYSIS_MAX_ABNORMAL_EXAMPLES",
        );
        override_usize(
            &mut self.analysis.max_endpoint_examples,
            "WEBLOG_HUNTER_ANALYSIS_MAX_ENDPOINT_EXAMPLES",
        );

        // Ingest
        override_csv(&mut self.ingest.extensions, "WEBLOG_HUNTER_INGEST_EXTENSIONS");
        override_usize(
            &mut self.ingest.max_line_length,
            "WEBLOG_HUNTER_INGEST_MAX_LINE_LENGTH",
        );
        override_usize(
            &mut self.ingest.concurrency,
            "WEBLOG_HUNTER_INGEST_CONCURRENCY",
        );

        // Output
        override_csv(&mut self.output.formats, "WEBLOG_HUNTER_OUTPUT_FORMATS");
        override_string(&mut self.output.directory, "WEBLOG_HUNTER_OUTPUT_DIRECTORY");
    }

    /// 설정값의 유효성을 검증합니다.
    ///
    /// 잘못된 값은 조용히 보정하지 않고 에러로 반환합니다.
    pub fn validate(&self) -> Result<(), HunterError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        self.analysis.validate()?;

        if self.ingest.concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                field: "ingest.concurrency".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        if self.ingest.max_line_length == 0 {
            return Err(ConfigError::InvalidValue {
                field: "ingest.max_line_length".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        for format in &self.output.formats {
            if !VALID_OUTPUT_FORMATS.contains(&format.as_str()) {
                return Err(ConfigError::InvalidValue {
                    field: "output.formats".to_owned(),
                    reason: format!(
                        "unknown format '{format}', must be one of: {}",
                        VALID_OUTPUT_FORMATS.join(", ")
                    ),
                }
                .into());
            }
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 분석 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// 리포트할 상위 의심 IP 수
    #[serde(alias = "top_ips")]
    pub top_n: usize,
    /// 요청 수 기준선 (제외 필터가 아닌 참고값)
    pub min_requests: usize,
    /// IP당 비정상 요청 예시 최대 개수
    pub max_abnormal_examples: usize,
    /// 엔드포인트당 예시 요청 최대 개수
    pub max_endpoint_examples: usize,
    /// 점수 가중치
    #[serde(default)]
    pub weights: ScoreWeights,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_n: 10,
            min_requests: 50,
            max_abnormal_examples: 8,
            max_endpoint_examples: 5,
            weights: ScoreWeights::default(),
        }
    }
}

impl AnalysisConfig {
    /// 분석 설정의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.top_n == 0 {
            return Err(ConfigError::InvalidValue {
                field: "analysis.top_n".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }
        self.weights.validate()
    }
}

/// 의심 점수 가중치
///
/// 정책 상수이며 설정으로 덮어쓸 수 있습니다.
/// 모든 값은 0 이상의 유한한 실수여야 합니다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    /// 서로 다른 공격 카테고리 하나당 가중치
    pub attack_category: f64,
    /// 4xx/5xx 비율 가중치
    pub error_ratio: f64,
    /// 엔드포인트 다양성 가중치
    pub endpoint_diversity: f64,
    /// 비정상 요청 비율 가중치
    pub abnormal_ratio: f64,
    /// 로그인 엔드포인트 비율 가중치
    pub login_ratio: f64,
    /// 요청량 증폭 가중치
    pub volume: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            attack_category: 1.0,
            error_ratio: 0.6,
            endpoint_diversity: 0.4,
            abnormal_ratio: 0.8,
            login_ratio: 0.3,
            volume: 0.5,
        }
    }
}

impl ScoreWeights {
    /// 가중치 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let named = [
            ("attack_category", self.attack_category),
            ("error_ratio", self.error_ratio),
            ("endpoint_diversity", self.endpoint_diversity),
            ("abnormal_ratio", self.abnormal_ratio),
            ("login_ratio", self.login_ratio),
            ("volume", self.volume),
        ];
        for (name, value) in named {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidValue {
                    field: format!("analysis.weights.{name}"),
                    reason: format!("must be a finite, non-negative number (got {value})"),
                });
            }
        }
        Ok(())
    }
}

/// 입력 수집 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// 디렉토리 입력 시 처리할 파일 확장자
    pub extensions: Vec<String>,
    /// 최대 라인 길이 (바이트, 초과 시 파싱 실패로 집계)
    pub max_line_length: usize,
    /// 동시에 읽을 최대 파일 수
    #[serde(alias = "threads")]
    pub concurrency: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["log".to_owned(), "gz".to_owned(), "txt".to_owned()],
            max_line_length: 64 * 1024, // 64KB
            concurrency: 4,
        }
    }
}

/// 리포트 출력 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// 리포트 형식 (md, json, html)
    pub formats: Vec<String>,
    /// 출력 디렉토리
    pub directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            formats: vec!["md".to_owned()],
            directory: ".".to_owned(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn default_config_has_sane_values() {
        let config = HunterConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.analysis.top_n, 10);
        assert_eq!(config.analysis.min_requests, 50);
        assert_eq!(config.output.formats, vec!["md"]);
        assert_eq!(config.ingest.concurrency, 4);
    }

    #[test]
    fn default_config_passes_validation() {
        HunterConfig::default().validate().unwrap();
    }

    #[test]
    fn parse_empty_toml_uses_defaults() {
        let config = HunterConfig::parse("").unwrap();
        assert_eq!(config, HunterConfig::default());
    }

    #[test]
    fn parse_partial_toml_merges_with_defaults() {
        let toml = r#"
[analysis]
top_n = 25

[analysis.weights]
volume = 0.0
"#;
        let config = HunterConfig::parse(toml).unwrap();
        assert_eq!(config.analysis.top_n, 25);
        assert_eq!(config.analysis.min_requests, 50);
        assert_eq!(config.analysis.weights.volume, 0.0);
        assert_eq!(config.analysis.weights.attack_category, 1.0);
    }

    #[test]
    fn parse_negative_min_requests_is_config_error() {
        let err = HunterConfig::parse("[analysis]\nmin_requests = -5").unwrap_err();
        assert!(matches!(
            err,
            HunterError::Config(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn parse_yaml_nested_sections() {
        let yaml = r#"
analysis:
  min_requests: 100
  top_ips: 20
output:
  formats: [md, json]
  directory: reports
performance:
  threads: 8
"#;
        let config = HunterConfig::parse_yaml(yaml).unwrap();
        assert_eq!(config.analysis.min_requests, 100);
        assert_eq!(config.analysis.top_n, 20);
        assert_eq!(config.output.formats, vec!["md", "json"]);
        assert_eq!(config.output.directory, "reports");
        assert_eq!(config.ingest.concurrency, 8);
    }

    #[test]
    fn parse_empty_yaml_uses_defaults() {
        assert_eq!(HunterConfig::parse_yaml("  \n").unwrap(), HunterConfig::default());
    }

    #[test]
    fn validate_rejects_zero_top_n() {
        let mut config = HunterConfig::default();
        config.analysis.top_n = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("top_n"));
    }

    #[test]
    fn validate_rejects_negative_weight() {
        let mut config = HunterConfig::default();
        config.analysis.weights.error_ratio = -1.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("error_ratio"));
    }

    #[test]
    fn validate_rejects_nan_weight() {
        let mut config = HunterConfig::default();
        config.analysis.weights.volume = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_unknown_output_format() {
        let mut config = HunterConfig::default();
        config.output.formats = vec!["pdf".to_owned()];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("pdf"));
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut config = HunterConfig::default();
        config.general.log_level = "verbose".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_level"));
    }

    #[test]
    fn validate_rejects_zero_concurrency() {
        let mut config = HunterConfig::default();
        config.ingest.concurrency = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn env_override_top_n() {
        let mut config = HunterConfig::default();
        // SAFETY: serial 테스트이므로 다른 스레드가 환경변수를 동시에 읽지 않습니다.
        unsafe { std::env::set_var("WEBLOG_HUNTER_ANALYSIS_TOP_N", "3") };
        config.apply_env_overrides();
        unsafe { std::env::remove_var("WEBLOG_HUNTER_ANALYSIS_TOP_N") };
        assert_eq!(config.analysis.top_n, 3);
    }

    #[test]
    #[serial]
    fn env_override_invalid_number_keeps_original() {
        let mut config = HunterConfig::default();
        // SAFETY: serial 테스트이므로 다른 스레드가 환경변수를 동시에 읽지 않습니다.
        unsafe { std::env::set_var("WEBLOG_HUNTER_ANALYSIS_MIN_REQUESTS", "lots") };
        config.apply_env_overrides();
        unsafe { std::env::remove_var("WEBLOG_HUNTER_ANALYSIS_MIN_REQUESTS") };
        assert_eq!(config.analysis.min_requests, 50);
    }

    #[test]
    #[serial]
    fn env_override_csv_trims_and_skips_empty() {
        let mut val = vec!["log".to_owned()];
        // SAFETY: serial 테스트이므로 다른 스레드가 환경변수를 동시에 읽지 않습니다.
        unsafe { std::env::set_var("TEST_WEBLOG_HUNTER_CSV", "log, gz,, txt") };
        override_csv(&mut val, "TEST_WEBLOG_HUNTER_CSV");
        unsafe { std::env::remove_var("TEST_WEBLOG_HUNTER_CSV") };
        assert_eq!(val, vec!["log", "gz", "txt"]);
    }

    #[test]
    fn config_serialize_roundtrip() {
        let config = HunterConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed = HunterConfig::parse(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[tokio::test]
    async fn from_file_not_found() {
        let err = HunterConfig::from_file("/nonexistent/path/weblog-hunter.toml")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            HunterError::Config(ConfigError::FileNotFound { .. })
        ));
    }
}
