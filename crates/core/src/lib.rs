//! weblog-hunter 공통 크레이트
//!
//! 파서, 탐지기, 분석기, 리포터가 공유하는 타입, 에러, 설정, 메트릭 이름을 정의합니다.
//! 실제 파싱/탐지/분석 로직은 `weblog-hunter-engine` 크레이트에 있습니다.

pub mod config;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod types;

// --- 주요 타입 re-export ---
// 각 모듈의 핵심 타입을 크레이트 루트에서 바로 사용할 수 있도록 합니다.

// 에러
pub use error::{AnalysisError, ConfigError, HunterError, IngestError, ParseError};

// 설정
pub use config::{AnalysisConfig, HunterConfig, IngestConfig, OutputConfig, ScoreWeights};

// 파이프라인 trait
pub use pipeline::LineParser;

// 도메인 타입
pub use types::{
    AbnormalRequest, AnalysisResult, AttackCategory, EndpointVulnerability, IpAnalysis, LogEvent,
    ToolSighting, UNKNOWN_TOOL,
};
