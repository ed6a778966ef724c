//! 파서 공용 필드 변환 헬퍼
//!
//! 형식별 파서가 정규식 캡처를 [`LogEvent`] 필드로 바꿀 때 사용합니다.
//! 깨진 필드는 에러 대신 `None`으로 내려 부분 레코드를 만듭니다.

use chrono::{DateTime, FixedOffset, NaiveDateTime};

use weblog_hunter_core::types::LogEvent;

/// Apache/Nginx 타임스탬프 형식 (타임존 포함)
const TIMESTAMP_FORMAT_TZ: &str = "%d/%b/%Y:%H:%M:%S %z";

/// 타임존이 없는 타임스탬프 형식 (UTC로 간주)
const TIMESTAMP_FORMAT_NAIVE: &str = "%d/%b/%Y:%H:%M:%S";

/// `10/Apr/2021:12:01:55 +0000` 형식의 타임스탬프를 파싱합니다.
///
/// 타임존이 없으면 UTC로 간주하고, 형식이 깨졌으면 `None`을 반환합니다.
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    DateTime::parse_from_str(raw, TIMESTAMP_FORMAT_TZ)
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT_NAIVE)
                .ok()
                .map(|naive| naive.and_utc().fixed_offset())
        })
}

/// 상태 코드 토큰을 파싱합니다. 숫자가 아니면 `None`.
pub(crate) fn parse_status(raw: &str) -> Option<u16> {
    raw.parse::<u16>().ok()
}

/// 응답 크기 토큰을 파싱합니다. `-` 또는 숫자가 아니면 `None`.
pub(crate) fn parse_size(raw: &str) -> Option<u64> {
    if raw == "-" {
        return None;
    }
    raw.parse::<u64>().ok()
}

/// 비어 있거나 `-`인 헤더 값을 `None`으로 바꿉니다.
pub(crate) fn optional_header(raw: Option<&str>) -> Option<String> {
    raw.filter(|v| !v.is_empty() && *v != "-")
        .map(str::to_owned)
}

/// 분해된 요청 필드
pub(crate) struct RequestFields<'a> {
    pub ip: &'a str,
    pub timestamp: &'a str,
    pub method: &'a str,
    pub url: &'a str,
    pub protocol: Option<&'a str>,
    pub status: &'a str,
    pub size: &'a str,
    pub referer: Option<&'a str>,
    pub user_agent: Option<&'a str>,
}

impl RequestFields<'_> {
    /// 탐지 결과가 비어 있는 이벤트를 생성합니다.
    pub(crate) fn into_event(self) -> LogEvent {
        let (path, query) = LogEvent::split_url(self.url);
        LogEvent {
            ip: self.ip.to_owned(),
            timestamp: parse_timestamp(self.timestamp),
            method: self.method.to_owned(),
            url: self.url.to_owned(),
            path,
            query,
            protocol: self.protocol.map(str::to_owned),
            status: parse_status(self.status),
            size: parse_size(self.size),
            referer: optional_header(self.referer),
            user_agent: self.user_agent.unwrap_or_default().to_owned(),
            attacks: Default::default(),
            tool: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn timestamp_with_offset() {
        let ts = parse_timestamp("10/Apr/2021:12:01:55 +0900").unwrap();
        assert_eq!(ts.year(), 2021);
        assert_eq!(ts.hour(), 12);
        assert_eq!(ts.offset().local_minus_utc(), 9 * 3600);
    }

    #[test]
    fn timestamp_without_offset_is_utc() {
        let ts = parse_timestamp("10/Apr/2021:12:01:55").unwrap();
        assert_eq!(ts.offset().local_minus_utc(), 0);
        assert_eq!(ts.minute(), 1);
    }

    #[test]
    fn malformed_timestamp_is_none() {
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("32/Foo/2021:99:99:99 +0000").is_none());
    }

    #[test]
    fn status_and_size_degrade_to_none() {
        assert_eq!(parse_status("404"), Some(404));
        assert_eq!(parse_status("-"), None);
        assert_eq!(parse_size("-"), None);
        assert_eq!(parse_size("12a"), None);
        assert_eq!(parse_size("2326"), Some(2326));
    }

    #[test]
    fn dash_header_is_none() {
        assert_eq!(optional_header(Some("-")), None);
        assert_eq!(optional_header(Some("")), None);
        assert_eq!(
            optional_header(Some("https://example.com/")),
            Some("https://example.com/".to_owned())
        );
    }
}
