//! Nginx 스타일 관대한(lenient) 로그 파서
//!
//! combined 파서가 거부한 라인을 최선 노력 방식으로 분해합니다.
//!
//! - 상태 코드/응답 크기가 `-`이거나 숫자가 아니면 `None`
//! - 요청 라인의 메서드 대소문자를 가리지 않음
//! - Referer/User-Agent 안의 `\"` 이스케이프 허용
//!
//! 요청 라인에 메서드와 URL이 모두 없으면 (`"-"` 등) 파싱 실패입니다.

use regex::Regex;

use weblog_hunter_core::error::HunterError;
use weblog_hunter_core::pipeline::LineParser;
use weblog_hunter_core::types::LogEvent;

use super::fields::RequestFields;
use crate::error::EngineError;

/// 형식 이름
pub const COMMON_FORMAT: &str = "common";

const COMMON_PATTERN: &str = concat!(
    r#"^(?P<ip>\S{1,255})\s+\S+\s+\S+\s+\[(?P<ts>[^\]]{1,64})\]\s+"#,
    r#""(?P<request>(?:[^"\\]|\\.)*)"\s+"#,
    r#"(?P<status>\S{1,8})\s+(?P<size>\S{1,32})"#,
    r#"(?:\s+"(?P<referer>(?:[^"\\]|\\.)*)"\s+"(?P<ua>(?:[^"\\]|\\.)*)")?"#,
);

/// 요청 라인 메서드 최대 길이
const MAX_METHOD_LEN: usize = 32;

/// Nginx 스타일 관대한 로그 파서
pub struct CommonLogParser {
    pattern: Regex,
}

impl CommonLogParser {
    /// 패턴을 컴파일하여 새 파서를 생성합니다.
    pub fn new() -> Result<Self, EngineError> {
        Ok(Self {
            pattern: Regex::new(COMMON_PATTERN)?,
        })
    }

    fn parse_error(offset: usize, reason: impl Into<String>) -> EngineError {
        EngineError::Parse {
            format: COMMON_FORMAT.to_owned(),
            offset,
            reason: reason.into(),
        }
    }
}

impl LineParser for CommonLogParser {
    fn format_name(&self) -> &str {
        COMMON_FORMAT
    }

    fn parse_line(&self, line: &str) -> Result<LogEvent, HunterError> {
        let caps = self
            .pattern
            .captures(line)
            .ok_or_else(|| Self::parse_error(0, "line does not match common log layout"))?;

        let request = caps
            .name("request")
            .ok_or_else(|| Self::parse_error(0, "missing request line"))?;

        // METHOD URL [PROTOCOL]
        let mut tokens = request.as_str().split_ascii_whitespace();
        let (method, url) = match (tokens.next(), tokens.next()) {
            (Some(method), Some(url)) => (method, url),
            _ => {
                return Err(Self::parse_error(
                    request.start(),
                    "request line has no method and target",
                )
                .into());
            }
        };

        if method.len() > MAX_METHOD_LEN || !method.bytes().all(|b| b.is_ascii_alphabetic()) {
            return Err(Self::parse_error(request.start(), "invalid request method").into());
        }

        let field = |name: &str| caps.name(name).map(|m| m.as_str());

        let fields = RequestFields {
            ip: field("ip").unwrap_or_default(),
            timestamp: field("ts").unwrap_or_default(),
            method,
            url,
            protocol: tokens.next(),
            status: field("status").unwrap_or_default(),
            size: field("size").unwrap_or_default(),
            referer: field("referer"),
            user_agent: field("ua"),
        };

        Ok(fields.into_event())
    }
}
