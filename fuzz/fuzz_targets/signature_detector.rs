#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use weblog_hunter_core::types::UNKNOWN_TOOL;
use weblog_hunter_engine::SignatureDetector;

/// 퍼저용 구조적 입력
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    url: String,
    user_agent: String,
}

fuzz_target!(|input: FuzzInput| {
    let Ok(detector) = SignatureDetector::builtin() else {
        return;
    };

    // 같은 입력은 항상 같은 판정
    let attacks = detector.detect_attacks(&input.url);
    assert_eq!(attacks, detector.detect_attacks(&input.url));

    let tool = detector.detect_tool(&input.user_agent);
    assert!(!tool.is_empty());
    if input.user_agent.trim().is_empty() {
        assert_eq!(tool, UNKNOWN_TOOL);
    }

    let _ = detector.is_identity_endpoint(&input.url);
    let _ = detector.has_session_parameter(&input.url);
});
