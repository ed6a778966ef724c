//! Apache combined/extended 로그 파서
//!
//! # 형식
//! ```text
//! IP IDENT USER [TIMESTAMP] "METHOD URL HTTP/VER" STATUS SIZE "REFERER" "USER-AGENT"
//! ```
//!
//! Referer/User-Agent 쌍이 없는 common 형식도 이 파서가 처리합니다.
//! 상태 코드는 세 자리 숫자여야 하며, 그렇지 않은 라인은
//! 다음 파서([`CommonLogParser`](super::CommonLogParser))로 넘어갑니다.
//!
//! # 사용 예시
//! ```ignore
//! use weblog_hunter_engine::parser::CombinedLogParser;
//! use weblog_hunter_core::pipeline::LineParser;
//!
//! let parser = CombinedLogParser::new()?;
//! let event = parser.parse_line(
//!     r#"10.0.0.1 - - [10/Apr/2021:12:01:55 +0000] "GET /a?b=1 HTTP/1.1" 200 12 "-" "curl/7.68""#,
//! )?;
//! assert_eq!(event.path, "/a");
//! ```

use regex::Regex;

use weblog_hunter_core::error::HunterError;
use weblog_hunter_core::pipeline::LineParser;
use weblog_hunter_core::types::LogEvent;

use super::fields::RequestFields;
use crate::error::EngineError;

/// 형식 이름
pub const COMBINED_FORMAT: &str = "combined";

/// 양끝 고정, 길이 제한 클래스만 사용하는 combined 로그 패턴
///
/// 헤더 값 안에 `\"` 이스케이프가 있으면 끝까지 매칭되지 않으므로
/// 라인은 [`CommonLogParser`](super::CommonLogParser)로 넘어갑니다.
const COMBINED_PATTERN: &str = concat!(
    r#"^(?P<ip>\S{1,255})\s+\S+\s+\S+\s+\[(?P<ts>[^\]]{1,64})\]\s+"#,
    r#""(?P<method>[A-Z]{1,16})\s+(?P<url>\S+)(?:\s+(?P<protocol>HTTP/[^"\s]{1,16}))?"\s+"#,
    r#"(?P<status>\d{3})\s+(?P<size>\S{1,32})"#,
    r#"(?:\s+"(?P<referer>[^"]*)"\s+"(?P<ua>[^"]*)")?\s*$"#,
);

/// Apache combined/extended 로그 파서
pub struct CombinedLogParser {
    pattern: Regex,
}

impl CombinedLogParser {
    /// 패턴을 컴파일하여 새 파서를 생성합니다.
    pub fn new() -> Result<Self, EngineError> {
        Ok(Self {
            pattern: Regex::new(COMBINED_PATTERN)?,
        })
    }
}

impl LineParser for CombinedLogParser {
    fn format_name(&self) -> &str {
        COMBINED_FORMAT
    }

    fn parse_line(&self, line: &str) -> Result<LogEvent, HunterError> {
        let caps = self
            .pattern
            .captures(line)
            .ok_or_else(|| EngineError::Parse {
                format: COMBINED_FORMAT.to_owned(),
                offset: 0,
                reason: "line does not match combined log layout".to_owned(),
            })?;

        let field = |name: &str| caps.name(name).map(|m| m.as_str());

        let fields = RequestFields {
            ip: field("ip").unwrap_or_default(),
            timestamp: field("ts").unwrap_or_default(),
            method: field("method").unwrap_or_default(),
            url: field("url").unwrap_or_default(),
            protocol: field("protocol"),
            status: field("status").unwrap_or_default(),
            size: field("size").unwrap_or_default(),
            referer: field("referer"),
            user_agent: field("ua"),
        };

        Ok(fields.into_event())
    }
}
