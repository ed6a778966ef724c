//! 파이프라인 trait — 로그 형식 확장 포인트 정의

use crate::error::HunterError;
use crate::types::LogEvent;

/// 접근 로그 라인 파서 trait
///
/// 새로운 로그 라인 형식을 지원하려면 이 trait을 구현합니다.
/// 구현체는 입력 내용을 해석하거나 실행하지 않고 구조만 분해해야 합니다.
///
/// # 구현 예시
/// ```ignore
/// struct MyParser;
///
/// impl LineParser for MyParser {
///     fn format_name(&self) -> &str { "custom" }
///     fn parse_line(&self, line: &str) -> Result<LogEvent, HunterError> {
///         todo!()
///     }
/// }
/// ```
pub trait LineParser: Send + Sync {
    /// 지원하는 로그 형식 이름
    fn format_name(&self) -> &str;

    /// 한 줄을 이벤트로 파싱
    ///
    /// 구조적으로 인식할 수 없는 라인만 에러를 반환합니다.
    /// 타임스탬프, 상태 코드, 응답 크기가 깨진 경우는 `None`으로 채워 성공 처리합니다.
    fn parse_line(&self, line: &str) -> Result<LogEvent, HunterError>;
}
