//! 로그 라인 파싱 모듈 -- 접근 로그 형식별 파서
//!
//! [`ParserRouter`]는 등록된 파서를 고정된 우선순위로 시도하여 형식을 자동 판별합니다.
//! 각 파서는 core의 [`LineParser`](weblog_hunter_core::pipeline::LineParser) trait을 구현합니다.
//!
//! # 지원 형식 (시도 순서)
//! 1. Apache combined/extended ([`CombinedLogParser`])
//! 2. Nginx 스타일 관대한 변형 ([`CommonLogParser`])
//!
//! 모든 패턴은 시작 고정이며, `regex` 크레이트는 선형 시간 매칭을 보장합니다.
//! 라인 길이 상한은 라우터에서 먼저 검사합니다.
//!
//! # 사용 예시
//! ```ignore
//! use weblog_hunter_engine::parser::ParserRouter;
//!
//! let router = ParserRouter::with_defaults()?;
//! let event = router.parse(r#"1.2.3.4 - - [10/Apr/2021:12:01:55 +0000] "GET / HTTP/1.1" 200 1"#)?;
//! ```

pub mod combined;
pub mod common;
mod fields;

pub use combined::CombinedLogParser;
pub use common::CommonLogParser;

use weblog_hunter_core::error::HunterError;
use weblog_hunter_core::pipeline::LineParser;
use weblog_hunter_core::types::LogEvent;

use crate::error::EngineError;

/// 기본 최대 라인 길이 (바이트)
pub const DEFAULT_MAX_LINE_LENGTH: usize = 64 * 1024; // 64KB

/// 파서 라우터 -- 로그 형식을 자동 감지하여 적절한 파서를 선택합니다.
///
/// 등록된 파서 목록을 순회하며, 첫 번째로 파싱에 성공한 파서의 결과를 반환합니다.
/// 모든 파서가 실패하면 마지막 파서의 에러를 반환합니다.
pub struct ParserRouter {
    /// 등록된 파서 목록 (순서대로 시도)
    parsers: Vec<Box<dyn LineParser>>,
    /// 최대 허용 라인 길이 (바이트)
    max_line_length: usize,
}

impl ParserRouter {
    /// 파서가 없는 라우터를 생성합니다.
    pub fn new() -> Self {
        Self {
            parsers: Vec::new(),
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }

    /// 기본 파서 세트 (combined → common)로 라우터를 생성합니다.
    pub fn with_defaults() -> Result<Self, EngineError> {
        Ok(Self::new()
            .register(Box::new(CombinedLogParser::new()?))
            .register(Box::new(CommonLogParser::new()?)))
    }

    /// 파서를 등록합니다. 등록 순서대로 시도됩니다.
    pub fn register(mut self, parser: Box<dyn LineParser>) -> Self {
        self.parsers.push(parser);
        self
    }

    /// 최대 라인 길이를 설정합니다.
    pub fn with_max_line_length(mut self, max: usize) -> Self {
        self.max_line_length = max;
        self
    }

    /// 한 줄을 파싱합니다.
    ///
    /// 줄 끝의 `\r`/`\n`은 제거합니다. 길이 상한을 넘는 라인은 패턴을 시도하지 않고 실패합니다.
    pub fn parse(&self, line: &str) -> Result<LogEvent, HunterError> {
        let line = line.trim_end_matches(['\r', '\n']);

        if line.len() > self.max_line_length {
            return Err(EngineError::LineTooLong {
                size: line.len(),
                max: self.max_line_length,
            }
            .into());
        }

        if line.trim().is_empty() {
            return Err(EngineError::Parse {
                format: "router".to_owned(),
                offset: 0,
                reason: "empty line".to_owned(),
            }
            .into());
        }

        let mut last_error = None;

        for parser in &self.parsers {
            match parser.parse_line(line) {
                Ok(event) => return Ok(event),
                Err(e) => last_error = Some(e),
            }
        }

        Err(last_error.unwrap_or_else(|| {
            EngineError::UnsupportedFormat("no parsers registered".to_owned()).into()
        }))
    }

    /// 특정 형식 이름의 파서로 직접 파싱합니다.
    pub fn parse_with(&self, format_name: &str, line: &str) -> Result<LogEvent, HunterError> {
        self.parsers
            .iter()
            .find(|p| p.format_name() == format_name)
            .ok_or_else(|| EngineError::UnsupportedFormat(format_name.to_owned()))?
            .parse_line(line)
    }

    /// 등록된 파서 형식 이름 목록을 반환합니다.
    pub fn registered_formats(&self) -> Vec<&str> {
        self.parsers.iter().map(|p| p.format_name()).collect()
    }

    /// 최대 라인 길이를 반환합니다.
    pub fn max_line_length(&self) -> usize {
        self.max_line_length
    }
}

impl Default for ParserRouter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weblog_hunter_core::error::ParseError;

    const COMBINED_LINE: &str = r#"192.0.2.1 - - [10/Apr/2021:12:01:55 +0000] "GET /products?id=5 HTTP/1.1" 200 512 "-" "Mozilla/5.0 Firefox/88.0""#;

    #[test]
    fn empty_router_returns_error() {
        let router = ParserRouter::new();
        let err = router.parse(COMBINED_LINE).unwrap_err();
        assert!(matches!(
            err,
            HunterError::Parse(ParseError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn with_defaults_has_parsers_in_priority_order() {
        let router = ParserRouter::with_defaults().unwrap();
        assert_eq!(router.registered_formats(), vec!["combined", "common"]);
    }

    #[test]
    fn combined_line_parses() {
        let router = ParserRouter::with_defaults().unwrap();
        let event = router.parse(COMBINED_LINE).unwrap();
        assert_eq!(event.path, "/products");
        assert_eq!(event.status, Some(200));
    }

    #[test]
    fn falls_back_to_common_parser() {
        let router = ParserRouter::with_defaults().unwrap();
        let line = r#"192.0.2.1 - - [10/Apr/2021:12:01:55 +0000] "GET /x HTTP/1.1" - -"#;
        let event = router.parse(line).unwrap();
        assert_eq!(event.status, None);
        assert!(router.parse_with("combined", line).is_err());
    }

    #[test]
    fn escaped_quotes_route_to_common_parser() {
        let router = ParserRouter::with_defaults().unwrap();

        let line = r#"192.0.2.1 - - [10/Apr/2021:12:01:55 +0000] "GET /x HTTP/1.1" 200 10 "-" "evil \"agent\" sqlmap/1.5""#;
        let event = router.parse(line).unwrap();
        assert_eq!(event.user_agent, r#"evil \"agent\" sqlmap/1.5"#);
        assert_eq!(event.status, Some(200));

        let line = r#"192.0.2.1 - - [10/Apr/2021:12:01:55 +0000] "GET /x HTTP/1.1" 200 10 "http://a/\"b\"" "curl/8.0""#;
        let event = router.parse(line).unwrap();
        assert_eq!(event.referer.as_deref(), Some(r#"http://a/\"b\""#));
        assert_eq!(event.user_agent, "curl/8.0");
    }

    #[test]
    fn trailing_newline_is_stripped() {
        let router = ParserRouter::with_defaults().unwrap();
        let line = format!("{COMBINED_LINE}\r\n");
        let event = router.parse(&line).unwrap();
        assert_eq!(event.user_agent, "Mozilla/5.0 Firefox/88.0");
    }

    #[test]
    fn too_long_line_is_rejected() {
        let router = ParserRouter::with_defaults()
            .unwrap()
            .with_max_line_length(16);
        let err = router.parse(COMBINED_LINE).unwrap_err();
        assert!(matches!(err, HunterError::Parse(ParseError::TooLarge { .. })));
    }

    #[test]
    fn empty_and_whitespace_lines_fail() {
        let router = ParserRouter::with_defaults().unwrap();
        assert!(router.parse("").is_err());
        assert!(router.parse("   \t").is_err());
    }

    #[test]
    fn parse_with_unknown_format_returns_error() {
        let router = ParserRouter::with_defaults().unwrap();
        assert!(router.parse_with("w3c", COMBINED_LINE).is_err());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn arbitrary_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..2000)) {
                let router = ParserRouter::with_defaults().unwrap();
                let line = String::from_utf8_lossy(&bytes);
                let _ = router.parse(&line);
            }

            #[test]
            fn repeated_characters_are_rejected(ch in "[\\[\"a -]", len in 1usize..5000) {
                let router = ParserRouter::with_defaults().unwrap();
                let line = ch.repeat(len);
                prop_assert!(router.parse(&line).is_err());
            }

            #[test]
            fn formatted_line_roundtrips_tokens(
                ip in "[0-9]{1,3}\\.[0-9]{1,3}\\.[0-9]{1,3}\\.[0-9]{1,3}",
                method in "(GET|POST|PUT|DELETE|HEAD)",
                path in "/[a-zA-Z0-9_/.-]{0,40}",
                query in proptest::option::of("[a-zA-Z0-9=&%]{1,30}"),
                status in 100u16..600,
                size in proptest::option::of(0u64..10_000_000),
            ) {
                let router = ParserRouter::with_defaults().unwrap();
                let url = match &query {
                    Some(q) => format!("{path}?{q}"),
                    None => path.clone(),
                };
                let size_token = size.map(|s| s.to_string()).unwrap_or_else(|| "-".to_owned());
                let line = format!(
                    "{ip} - - [10/Apr/2021:12:01:55 +0000] \"{method} {url} HTTP/1.1\" {status} {size_token} \"-\" \"agent\""
                );

                let event = router.parse(&line).unwrap();
                prop_assert_eq!(&event.ip, &ip);
                prop_assert_eq!(&event.method, &method);
                prop_assert_eq!(&event.path, &path);
                prop_assert_eq!(&event.query, &query);
                prop_assert_eq!(event.request_target(), url);
                prop_assert_eq!(event.status, Some(status));
                prop_assert_eq!(event.size, size);
            }
        }
    }
}
