//! 시그니처 모듈 -- 공격 카테고리 패턴과 클라이언트 도구 지문
//!
//! [`SignatureCatalog`]는 정적 패턴 테이블을 한 번 컴파일해 보관하는 순수 조회 구조입니다.
//! [`SignatureDetector`]는 카탈로그를 사용해 URL과 User-Agent를 판정합니다.
//!
//! # 구성
//! - 공격 패턴: 카테고리당 정규식 하나, 모든 카테고리를 평가하여 집합으로 누적
//! - 도구 지문: `(이름, 패턴)` 순서 목록, 위에서부터 첫 매칭이 이김
//! - 브라우저 토큰 / 봇 패턴: 도구 지문이 없을 때의 기본 분류
//! - 엔드포인트 힌트: 계정, 로그인, 민감 데이터, API, 세션 파라미터
//!
//! 패턴 컴파일 실패는 빌드가 깨진 것이므로 시작 시점에 에러로 반환합니다.

mod decode;
pub mod detector;

pub use detector::SignatureDetector;

use std::collections::HashSet;

use regex::Regex;

use weblog_hunter_core::types::AttackCategory;

use crate::error::EngineError;

/// 기본 공격 패턴 테이블 (대소문자 무시, 퍼센트 디코딩된 URL에 적용)
pub const BUILTIN_ATTACK_PATTERNS: &[(AttackCategory, &str)] = &[
    (
        AttackCategory::Sqli,
        r"(?i)(\bunion\b|\bselect\b|\binformation_schema\b|\bsleep\s*\(|\bbenchmark\s*\(|--|/\*|\*/|%27|'|\bor\s+1=1\b|\band\s+1=1\b)",
    ),
    (
        AttackCategory::Traversal,
        r"(?i)(\.\./|%2e%2e%2f|%2e%2e\\|/etc/passwd|win\.ini|\.\.\\|%5c%2e%2e)",
    ),
    (
        AttackCategory::Xss,
        r"(?i)(<script|%3cscript|onerror=|onload=|alert\s*\(|javascript:|<iframe|<img\s+src|eval\s*\(|<svg|onmouseover=)",
    ),
    (
        AttackCategory::Ssrf,
        r"(?i)(https?://|%3a%2f%2f|169\.254\.169\.254|localhost|127\.0\.0\.1|0\.0\.0\.0|::1|\[::1\]|metadata\.google\.internal)",
    ),
    (
        AttackCategory::CommandInjection,
        r"(?i)(\bcat\b|\bwget\b|\bcurl\b|;|\|\||&&|\b/bin/sh\b|\bpowershell\b|\bexec\b|\bsystem\b|\$\(|`|<\(|>\()",
    ),
    (
        AttackCategory::Rce,
        r#"(?i)(eval\(|exec\(|system\(|passthru\(|shell_exec\(|phpinfo\(|assert\(|preg_replace\s*\(.*/e["']?\s*,|create_function\()"#,
    ),
    (
        AttackCategory::Xxe,
        r#"(?i)(<!ENTITY\s+\w+\s+SYSTEM|<!DOCTYPE.*ENTITY|SYSTEM\s+["']file:|SYSTEM\s+["']http)"#,
    ),
    (AttackCategory::LdapInjection, r"(?i)(\*\)|\(\||&\(|\|\()"),
    (
        AttackCategory::NosqlInjection,
        r"(?i)(\$ne|\$gt|\$lt|\$where|\$regex|\[\$)",
    ),
];

/// 기본 도구 지문 테이블 (우선순위 순)
pub const BUILTIN_TOOL_PATTERNS: &[(&str, &str)] = &[
    ("sqlmap", r"(?i)\bsqlmap\b"),
    ("curl", r"(?i)\bcurl/\d"),
    ("python-requests", r"(?i)\bpython-requests\b"),
    ("go-http-client", r"(?i)\bgo-http-client\b"),
    ("nikto", r"(?i)\bnikto\b"),
    ("acunetix", r"(?i)\bacunetix\b"),
    ("nmap", r"(?i)\bnmap\b"),
    ("masscan", r"(?i)\bmasscan\b"),
    ("wget", r"(?i)\bwget/\d"),
    ("gobuster", r"(?i)\bgobuster\b"),
    ("dirbuster", r"(?i)\bdirbuster\b"),
    ("burpsuite", r"(?i)\bburp\b"),
    ("zaproxy", r"(?i)\bzap\b"),
    ("wpscan", r"(?i)\bwpscan\b"),
    ("metasploit", r"(?i)\bmetasploit\b"),
    ("nuclei", r"(?i)\bnuclei\b"),
    ("sqlninja", r"(?i)\bsqlninja\b"),
    ("havij", r"(?i)\bhavij\b"),
    ("httperf", r"(?i)\bhttperf\b"),
    ("jmeter", r"(?i)\bjmeter\b"),
];

/// 표준 브라우저 토큰 (대소문자 구분)
pub const BROWSER_TOKENS: &[&str] = &["Mozilla/", "Chrome/", "Safari/", "Firefox/"];

/// 브라우저로 분류된 User-Agent의 도구 이름
pub const BROWSER_TOOL: &str = "browser";

/// 봇으로 분류된 User-Agent의 도구 이름
pub const BOT_TOOL: &str = "bot";

const BOT_PATTERN: &str = r"(?i)(bot|crawler|spider|scraper|slurp|googlebot|bingbot|yandexbot|baiduspider|facebookexternalhit|twitterbot)";

const IDENTITY_HINT_PATTERN: &str =
    r"(?i)(whoami|profile|account|user|users|customer|customers|admin|member)";

const LOGIN_HINT_PATTERN: &str = r"(?i)(login|signin|auth|token|session|oauth|sso|authenticate)";

const SENSITIVE_HINT_PATTERN: &str = r"(?i)(/export|/download|/backup|/dump|/database|/admin/users|/api/users|\.sql|\.db|\.bak)";

const API_HINT_PATTERN: &str = r"(?i)(/api/|/rest/|/graphql|/v\d+/|\.json|\.xml)";

const SESSION_HINT_PATTERN: &str = r"(?i)(session|sessionid|sid|jsessionid|phpsessid)";

/// 컴파일된 공격 시그니처
#[derive(Debug, Clone)]
pub struct AttackSignature {
    /// 공격 카테고리
    pub category: AttackCategory,
    /// 컴파일된 패턴
    pub pattern: Regex,
}

/// 컴파일된 도구 지문
#[derive(Debug, Clone)]
pub struct ToolSignature {
    /// 도구 이름
    pub name: String,
    /// 컴파일된 패턴
    pub pattern: Regex,
}

/// 엔드포인트 이름 힌트
#[derive(Debug, Clone)]
pub struct EndpointHints {
    /// 사용자/계정 조회 엔드포인트
    pub identity: Regex,
    /// 로그인/인증 엔드포인트
    pub login: Regex,
    /// 민감 데이터 엔드포인트
    pub sensitive: Regex,
    /// API 엔드포인트
    pub api: Regex,
    /// 세션 파라미터
    pub session: Regex,
}

impl EndpointHints {
    fn builtin() -> Result<Self, EngineError> {
        Ok(Self {
            identity: compile("identity_hint", IDENTITY_HINT_PATTERN)?,
            login: compile("login_hint", LOGIN_HINT_PATTERN)?,
            sensitive: compile("sensitive_hint", SENSITIVE_HINT_PATTERN)?,
            api: compile("api_hint", API_HINT_PATTERN)?,
            session: compile("session_hint", SESSION_HINT_PATTERN)?,
        })
    }
}

/// 시그니처 카탈로그
///
/// 생성 이후 변경되지 않으며 `Arc`로 여러 탐지기가 공유할 수 있습니다.
#[derive(Debug, Clone)]
pub struct SignatureCatalog {
    attacks: Vec<AttackSignature>,
    tools: Vec<ToolSignature>,
    bot: Regex,
    hints: EndpointHints,
}

impl SignatureCatalog {
    /// 기본 테이블로 카탈로그를 생성합니다.
    pub fn builtin() -> Result<Self, EngineError> {
        Self::from_tables(BUILTIN_ATTACK_PATTERNS, BUILTIN_TOOL_PATTERNS)
    }

    /// 주어진 패턴 테이블로 카탈로그를 생성합니다.
    ///
    /// 엔드포인트 힌트와 봇 패턴은 기본값을 사용합니다.
    ///
    /// # Errors
    /// - 패턴이 비어 있거나 컴파일되지 않는 경우
    /// - 도구 이름이 비어 있거나 중복된 경우
    pub fn from_tables(
        attacks: &[(AttackCategory, &str)],
        tools: &[(&str, &str)],
    ) -> Result<Self, EngineError> {
        let attacks = attacks
            .iter()
            .map(|(category, pattern)| {
                Ok(AttackSignature {
                    category: *category,
                    pattern: compile(category.as_str(), pattern)?,
                })
            })
            .collect::<Result<Vec<_>, EngineError>>()?;

        let mut seen = HashSet::new();
        let mut compiled_tools = Vec::with_capacity(tools.len());
        for (name, pattern) in tools {
            if name.trim().is_empty() {
                return Err(EngineError::Signature {
                    name: (*name).to_owned(),
                    reason: "tool name must not be empty".to_owned(),
                });
            }
            if !seen.insert(*name) {
                return Err(EngineError::Signature {
                    name: (*name).to_owned(),
                    reason: "duplicate tool name".to_owned(),
                });
            }
            compiled_tools.push(ToolSignature {
                name: (*name).to_owned(),
                pattern: compile(name, pattern)?,
            });
        }

        let catalog = Self {
            attacks,
            tools: compiled_tools,
            bot: compile(BOT_TOOL, BOT_PATTERN)?,
            hints: EndpointHints::builtin()?,
        };

        tracing::debug!(
            attack_signatures = catalog.attacks.len(),
            tool_signatures = catalog.tools.len(),
            "signature catalog compiled"
        );

        Ok(catalog)
    }

    /// 공격 시그니처 목록 (테이블 순서)
    pub fn attack_signatures(&self) -> &[AttackSignature] {
        &self.attacks
    }

    /// 도구 지문 목록 (우선순위 순)
    pub fn tool_signatures(&self) -> &[ToolSignature] {
        &self.tools
    }

    /// 봇 User-Agent 패턴
    pub fn bot_pattern(&self) -> &Regex {
        &self.bot
    }

    /// 엔드포인트 힌트
    pub fn hints(&self) -> &EndpointHints {
        &self.hints
    }
}

/// 패턴을 컴파일하고 실패를 시그니처 에러로 변환합니다.
fn compile(name: &str, pattern: &str) -> Result<Regex, EngineError> {
    if pattern.is_empty() {
        return Err(EngineError::Signature {
            name: name.to_owned(),
            reason: "pattern must not be empty".to_owned(),
        });
    }
    Regex::new(pattern).map_err(|e| EngineError::Signature {
        name: name.to_owned(),
        reason: format!("invalid pattern: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_compiles() {
        let catalog = SignatureCatalog::builtin().unwrap();
        assert_eq!(catalog.attack_signatures().len(), AttackCategory::ALL.len());
        assert_eq!(catalog.tool_signatures().len(), BUILTIN_TOOL_PATTERNS.len());
    }

    #[test]
    fn builtin_covers_every_category() {
        let catalog = SignatureCatalog::builtin().unwrap();
        for category in AttackCategory::ALL {
            assert!(
                catalog
                    .attack_signatures()
                    .iter()
                    .any(|sig| sig.category == category),
                "missing signature for {category}"
            );
        }
    }

    #[test]
    fn tool_priority_order_is_preserved() {
        let catalog = SignatureCatalog::builtin().unwrap();
        let names: Vec<&str> = catalog
            .tool_signatures()
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(names.first(), Some(&"sqlmap"));
        assert_eq!(names.get(1), Some(&"curl"));
        assert_eq!(names.last(), Some(&"jmeter"));
    }

    #[test]
    fn malformed_attack_pattern_is_fatal() {
        let err = SignatureCatalog::from_tables(&[(AttackCategory::Sqli, "(unclosed")], &[])
            .unwrap_err();
        match err {
            EngineError::Signature { name, .. } => assert_eq!(name, "sqli"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_pattern_is_rejected() {
        assert!(SignatureCatalog::from_tables(&[], &[("curl", "")]).is_err());
    }

    #[test]
    fn duplicate_tool_name_is_rejected() {
        let result =
            SignatureCatalog::from_tables(&[], &[("curl", r"curl/\d"), ("curl", r"curl")]);
        assert!(matches!(result, Err(EngineError::Signature { .. })));
    }
}
