//! 시그니처 탐지기 -- URL 공격 카테고리와 User-Agent 도구 판정
//!
//! [`SignatureDetector`]는 상태가 없으며 같은 입력에 항상 같은 결과를 냅니다.

use std::collections::BTreeSet;
use std::sync::Arc;

use weblog_hunter_core::types::{AttackCategory, LogEvent, UNKNOWN_TOOL};

use super::decode::percent_decode;
use super::{BOT_TOOL, BROWSER_TOKENS, BROWSER_TOOL, SignatureCatalog};
use crate::error::EngineError;

/// 시그니처 탐지기
#[derive(Debug, Clone)]
pub struct SignatureDetector {
    catalog: Arc<SignatureCatalog>,
}

impl SignatureDetector {
    /// 카탈로그로 탐지기를 생성합니다.
    pub fn new(catalog: Arc<SignatureCatalog>) -> Self {
        Self { catalog }
    }

    /// 기본 카탈로그로 탐지기를 생성합니다.
    pub fn builtin() -> Result<Self, EngineError> {
        Ok(Self::new(Arc::new(SignatureCatalog::builtin()?)))
    }

    /// 사용 중인 카탈로그
    pub fn catalog(&self) -> &SignatureCatalog {
        &self.catalog
    }

    /// URL(path + query)에 매칭되는 모든 공격 카테고리를 반환합니다.
    ///
    /// 조기 종료 없이 모든 카테고리를 평가합니다.
    pub fn detect_attacks(&self, url: &str) -> BTreeSet<AttackCategory> {
        let decoded = percent_decode(url);
        self.catalog
            .attack_signatures()
            .iter()
            .filter(|sig| sig.pattern.is_match(&decoded))
            .map(|sig| sig.category)
            .collect()
    }

    /// User-Agent에서 클라이언트 도구를 판정합니다.
    ///
    /// 순서: 도구 지문(첫 매칭) → 브라우저 토큰 → 봇 패턴 → `unknown`
    pub fn detect_tool(&self, user_agent: &str) -> String {
        if user_agent.trim().is_empty() {
            return UNKNOWN_TOOL.to_owned();
        }

        if let Some(tool) = self
            .catalog
            .tool_signatures()
            .iter()
            .find(|tool| tool.pattern.is_match(user_agent))
        {
            return tool.name.clone();
        }

        if BROWSER_TOKENS.iter().any(|token| user_agent.contains(token)) {
            return BROWSER_TOOL.to_owned();
        }

        if self.is_bot_user_agent(user_agent) {
            return BOT_TOOL.to_owned();
        }

        UNKNOWN_TOOL.to_owned()
    }

    /// 이벤트에 탐지 결과를 기록합니다.
    ///
    /// 이미 기록된 이벤트는 건드리지 않고 `false`를 반환합니다.
    pub fn enrich(&self, event: &mut LogEvent) -> bool {
        if event.is_enriched() {
            return false;
        }
        let attacks = self.detect_attacks(&event.url);
        let tool = self.detect_tool(&event.user_agent);
        event.enrich(attacks, tool)
    }

    /// 사용자/계정 조회 엔드포인트인지 여부
    pub fn is_identity_endpoint(&self, path: &str) -> bool {
        self.catalog.hints().identity.is_match(path)
    }

    /// 로그인/인증 엔드포인트인지 여부
    pub fn is_login_endpoint(&self, path: &str) -> bool {
        self.catalog.hints().login.is_match(path)
    }

    /// 민감 데이터 엔드포인트인지 여부
    pub fn is_sensitive_endpoint(&self, path: &str) -> bool {
        self.catalog.hints().sensitive.is_match(path)
    }

    /// API 엔드포인트인지 여부
    pub fn is_api_endpoint(&self, path: &str) -> bool {
        self.catalog.hints().api.is_match(path)
    }

    /// URL에 세션 파라미터가 포함되어 있는지 여부
    pub fn has_session_parameter(&self, url: &str) -> bool {
        self.catalog.hints().session.is_match(url)
    }

    /// 봇 User-Agent인지 여부
    pub fn is_bot_user_agent(&self, user_agent: &str) -> bool {
        self.catalog.bot_pattern().is_match(user_agent)
    }
}
