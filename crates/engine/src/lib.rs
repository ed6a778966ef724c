//! weblog-hunter 분석 엔진
//!
//! 웹 서버 접근 로그를 파싱하고, 공격 시그니처와 클라이언트 도구를 탐지하며,
//! 출발지 IP별 의심 점수를 계산해 순위를 매깁니다.
//!
//! # 모듈 구성
//!
//! - [`parser`]: Apache combined / Nginx common 형식 파서와 라우터
//! - [`ingest`]: 파일/디렉토리/`.gz` 입력 수집 (부분 실패 허용, 결정적 순서)
//! - [`signature`]: 공격 카테고리/도구 지문 카탈로그와 탐지기
//! - [`analyzer`]: IP별 집계, 점수, 순위, 스크래핑 대상 추정
//! - [`config`]: 엔진 설정 (core 설정에서 파생)
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! files/dirs/.gz -> LogIngestor -> ParserRouter -> Vec<LogEvent>
//!                                                     |
//!                         SignatureDetector <- ThreatAnalyzer -> AnalysisResult
//! ```

pub mod analyzer;
pub mod config;
pub mod error;
pub mod ingest;
pub mod parser;
pub mod signature;

// --- 주요 타입 re-export ---

// 분석기
pub use analyzer::ThreatAnalyzer;

// 설정
pub use config::{AnalyzerConfig, AnalyzerConfigBuilder, IngestorConfig};

// 에러
pub use error::EngineError;

// 수집기
pub use ingest::{FileFailure, IngestReport, LogIngestor};

// 파서
pub use parser::{CombinedLogParser, CommonLogParser, ParserRouter};

// 시그니처
pub use signature::{SignatureCatalog, SignatureDetector};
