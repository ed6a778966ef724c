//! 의심 점수 계산
//!
//! ```text
//! base  = w_cat * 공격 카테고리 수
//!       + w_err * 에러 비율
//!       + w_div * (1 - 1 / 엔드포인트 수)
//!       + w_abn * 비정상 요청 비율
//!       + w_login * 로그인 요청 비율
//! score = base * (1 + w_vol * min(요청 수 / max(min_requests, 1), 1))
//! ```
//!
//! - 카테고리 수와 에러 비율에 대해 단조 비감소
//! - 요청량은 곱셈 증폭이므로 `base`가 0이면 요청량과 무관하게 0
//!   (200만 받는 단일 엔드포인트 대량 요청 IP는 0점)

use weblog_hunter_core::config::ScoreWeights;

/// 점수 계산 입력
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreInputs {
    /// 서로 다른 공격 카테고리 수
    pub distinct_categories: usize,
    /// 요청 수
    pub request_count: usize,
    /// 4xx/5xx 요청 수
    pub error_count: usize,
    /// 서로 다른 엔드포인트 수
    pub distinct_endpoints: usize,
    /// 비정상 요청 수
    pub abnormal_count: usize,
    /// 로그인 엔드포인트 요청 수
    pub login_attempts: usize,
    /// 분석 시 `min_requests`
    pub min_requests: usize,
}

impl ScoreInputs {
    fn ratio(part: usize, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            (part as f64 / total as f64).clamp(0.0, 1.0)
        }
    }

    /// 4xx/5xx 비율
    pub fn error_ratio(&self) -> f64 {
        Self::ratio(self.error_count, self.request_count)
    }

    fn endpoint_diversity(&self) -> f64 {
        if self.distinct_endpoints == 0 {
            0.0
        } else {
            1.0 - 1.0 / self.distinct_endpoints as f64
        }
    }

    fn volume_factor(&self) -> f64 {
        let floor = self.min_requests.max(1) as f64;
        (self.request_count as f64 / floor).min(1.0)
    }
}

/// 가중치에 따라 의심 점수를 계산합니다.
pub fn suspicion_score(inputs: &ScoreInputs, weights: &ScoreWeights) -> f64 {
    let base = weights.attack_category * inputs.distinct_categories as f64
        + weights.error_ratio * inputs.error_ratio()
        + weights.endpoint_diversity * inputs.endpoint_diversity()
        + weights.abnormal_ratio * ScoreInputs::ratio(inputs.abnormal_count, inputs.request_count)
        + weights.login_ratio * ScoreInputs::ratio(inputs.login_attempts, inputs.request_count);

    base * (1.0 + weights.volume * inputs.volume_factor())
}
