//! 도메인 타입 — 파싱 이벤트와 분석 결과 스냅샷
//!
//! 파서, 탐지기, 분석기, 리포터가 공유하는 데이터 구조를 정의합니다.
//! [`AnalysisResult`]는 분석기가 만든 뒤 변경되지 않는 순수 데이터이며,
//! 리포터는 분석기 메서드를 호출하지 않고 직렬화만으로 출력을 만듭니다.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// 알 수 없는 도구 이름 (User-Agent가 비었거나 어떤 시그니처에도 매칭되지 않음)
pub const UNKNOWN_TOOL: &str = "unknown";

/// 공격 카테고리
///
/// 하나의 URL이 여러 카테고리에 동시에 매칭될 수 있으므로
/// 이벤트에는 집합(`BTreeSet`)으로 저장합니다.
/// 선언 순서가 곧 정렬 순서이며 리포트 출력 순서입니다.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AttackCategory {
    /// SQL 인젝션
    Sqli,
    /// 경로 순회 / 로컬 파일 포함
    Traversal,
    /// 크로스 사이트 스크립팅
    Xss,
    /// 서버 측 요청 위조
    Ssrf,
    /// OS 명령 인젝션
    CommandInjection,
    /// 원격 코드 실행
    Rce,
    /// XML 외부 엔티티
    Xxe,
    /// LDAP 인젝션
    LdapInjection,
    /// NoSQL 인젝션
    NosqlInjection,
}

impl AttackCategory {
    /// 모든 카테고리 (선언 순서)
    pub const ALL: [AttackCategory; 9] = [
        Self::Sqli,
        Self::Traversal,
        Self::Xss,
        Self::Ssrf,
        Self::CommandInjection,
        Self::Rce,
        Self::Xxe,
        Self::LdapInjection,
        Self::NosqlInjection,
    ];

    /// 리포트에 표시할 짧은 라벨
    pub fn label(&self) -> &'static str {
        match self {
            Self::Sqli => "SQLi",
            Self::Traversal => "Traversal/LFI",
            Self::Xss => "XSS",
            Self::Ssrf => "SSRF",
            Self::CommandInjection => "CMDi/Shell",
            Self::Rce => "RCE",
            Self::Xxe => "XXE",
            Self::LdapInjection => "LDAP Injection",
            Self::NosqlInjection => "NoSQL Injection",
        }
    }

    /// 메트릭 레이블 등에 쓰는 snake_case 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sqli => "sqli",
            Self::Traversal => "traversal",
            Self::Xss => "xss",
            Self::Ssrf => "ssrf",
            Self::CommandInjection => "command_injection",
            Self::Rce => "rce",
            Self::Xxe => "xxe",
            Self::LdapInjection => "ldap_injection",
            Self::NosqlInjection => "nosql_injection",
        }
    }
}

impl fmt::Display for AttackCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 파싱된 접근 로그 한 줄
///
/// `attacks`와 `tool`은 파싱 직후 비어 있고,
/// [`LogEvent::enrich`]로 정확히 한 번 채워집니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEvent {
    /// 출발지 IP 토큰 (유효한 주소일 필요는 없음)
    pub ip: String,
    /// 요청 시각 (형식이 깨진 경우 `None`)
    pub timestamp: Option<DateTime<FixedOffset>>,
    /// HTTP 메서드
    pub method: String,
    /// 원본 요청 URL
    pub url: String,
    /// `?` 이전 부분
    pub path: String,
    /// `?` 이후 부분 (`?`가 없으면 `None`)
    pub query: Option<String>,
    /// HTTP 프로토콜 버전 (예: `HTTP/1.1`)
    pub protocol: Option<String>,
    /// 상태 코드 (숫자가 아니면 `None`)
    pub status: Option<u16>,
    /// 응답 크기 (`-` 또는 숫자가 아니면 `None`)
    pub size: Option<u64>,
    /// Referer 헤더
    pub referer: Option<String>,
    /// User-Agent 헤더 (없으면 빈 문자열)
    pub user_agent: String,
    /// 탐지된 공격 카테고리
    #[serde(default)]
    pub attacks: BTreeSet<AttackCategory>,
    /// 탐지된 클라이언트 도구
    #[serde(default)]
    pub tool: Option<String>,
}

impl LogEvent {
    /// URL을 path와 query로 분해합니다.
    ///
    /// 첫 번째 `?`에서 나누며, 두 값을 `?`로 다시 이으면 원본 URL이 됩니다.
    pub fn split_url(url: &str) -> (String, Option<String>) {
        match url.split_once('?') {
            Some((path, query)) => (path.to_owned(), Some(query.to_owned())),
            None => (url.to_owned(), None),
        }
    }

    /// path와 query를 원본 URL 형태로 다시 조합합니다.
    pub fn request_target(&self) -> String {
        match &self.query {
            Some(query) => format!("{}?{}", self.path, query),
            None => self.path.clone(),
        }
    }

    /// 탐지 결과를 이벤트에 기록합니다.
    ///
    /// 이미 기록된 이벤트는 변경하지 않으며 `false`를 반환합니다.
    pub fn enrich(&mut self, attacks: BTreeSet<AttackCategory>, tool: String) -> bool {
        if self.is_enriched() {
            return false;
        }
        self.attacks = attacks;
        self.tool = Some(tool);
        true
    }

    /// 탐지 결과가 기록되었는지 여부
    pub fn is_enriched(&self) -> bool {
        self.tool.is_some()
    }

    /// 하나 이상의 공격 시그니처에 매칭되었는지 여부
    pub fn is_abnormal(&self) -> bool {
        !self.attacks.is_empty()
    }

    /// 4xx/5xx 응답인지 여부
    pub fn is_error_status(&self) -> bool {
        self.status.is_some_and(|s| (400..=599).contains(&s))
    }

    /// 5xx 응답인지 여부
    pub fn is_server_error(&self) -> bool {
        self.status.is_some_and(|s| (500..=599).contains(&s))
    }

    /// 2xx 응답인지 여부
    pub fn is_success(&self) -> bool {
        self.status.is_some_and(|s| (200..=299).contains(&s))
    }
}

impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = self
            .status
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_owned());
        write!(f, "{} \"{} {}\" {}", self.ip, self.method, self.url, status)
    }
}

/// IP별 비정상 요청 예시
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbnormalRequest {
    /// 매칭된 공격 카테고리
    pub categories: Vec<AttackCategory>,
    /// path + query
    pub request: String,
    /// 응답 상태 코드
    pub status: Option<u16>,
    /// 요청 시각
    pub timestamp: Option<DateTime<FixedOffset>>,
}

/// 출발지 IP 하나에 대한 분석 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpAnalysis {
    /// IP 토큰
    pub ip: String,
    /// 요청 수
    pub request_count: usize,
    /// 의심 점수 (확률이 아닌 순위 신호)
    pub score: f64,
    /// 상태 코드별 요청 수
    pub status_codes: BTreeMap<u16, usize>,
    /// 상태 코드를 알 수 없는 요청 수
    pub unknown_status_count: usize,
    /// 4xx/5xx 비율
    pub error_ratio: f64,
    /// 엔드포인트(path)별 요청 수
    pub endpoints: BTreeMap<String, usize>,
    /// 가장 많이 요청한 path (최대 10개, 많은 순)
    pub top_paths: Vec<(String, usize)>,
    /// 공격 시그니처에 매칭된 요청 수
    pub abnormal_count: usize,
    /// 관측된 서로 다른 공격 카테고리
    pub attack_categories: Vec<AttackCategory>,
    /// 로그인/인증 엔드포인트 요청 수
    pub login_attempts: usize,
    /// 사용자/계정 엔드포인트 요청 수
    pub identity_queries: usize,
    /// 민감 데이터 엔드포인트(export, backup, dump 등) 요청 수
    pub sensitive_requests: usize,
    /// API 엔드포인트 요청 수
    pub api_requests: usize,
    /// 세션 파라미터가 포함된 요청 수
    pub session_param_requests: usize,
    /// 분당 최대 요청 수
    pub max_requests_per_minute: usize,
    /// 사용된 도구 (정렬됨)
    pub tools_used: Vec<String>,
    /// 비정상 요청 예시 (최초 관측 순)
    pub abnormal_examples: Vec<AbnormalRequest>,
    /// 요청 수가 `min_requests` 미만인지 여부 (리포터 참고용)
    pub below_min_requests: bool,
}

/// SQLi 시그니처가 관측된 엔드포인트
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointVulnerability {
    /// 엔드포인트 path
    pub path: String,
    /// SQLi 매칭 요청 수
    pub match_count: usize,
    /// SQLi 매칭 요청 중 5xx 응답 수
    pub server_error_count: usize,
    /// 서로 다른 페이로드 수
    pub unique_payloads: usize,
    /// 예시 요청 URL
    pub examples: Vec<String>,
}

/// 도구 최초 관측 기록
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSighting {
    /// 도구 이름
    pub tool: String,
    /// 최초 관측 시각
    pub first_seen: DateTime<FixedOffset>,
}

/// 분석 결과 스냅샷
///
/// 모든 중첩 분석 객체를 소유하며, 생성 이후에는 변경되지 않습니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// 읽은 파일 수 (호출자가 채움)
    pub files_read: usize,
    /// 파싱 성공 이벤트 수
    pub parsed_events: usize,
    /// 파싱 실패 라인 수 (호출자가 채움)
    pub parse_failures: usize,
    /// 서로 다른 출발지 IP 수
    pub unique_ips: usize,
    /// 분석 시 사용한 `min_requests` (리포터 참고용)
    pub min_requests: usize,
    /// 의심 IP 순위 (상위 N개)
    pub top_suspicious_ips: Vec<IpAnalysis>,
    /// SQLi 엔드포인트 순위
    pub vulnerable_endpoints: Vec<EndpointVulnerability>,
    /// 도구별 최초 관측 (시각 오름차순)
    pub tools_first_seen: Vec<ToolSighting>,
    /// 스크래핑 대상으로 추정되는 엔드포인트
    pub inferred_scrape_target: Option<String>,
}

impl AnalysisResult {
    /// 가장 의심스러운 IP를 반환합니다.
    pub fn top_ip(&self) -> Option<&IpAnalysis> {
        self.top_suspicious_ips.first()
    }
}
