#![no_main]

use libfuzzer_sys::fuzz_target;
use weblog_hunter_engine::ParserRouter;

fuzz_target!(|data: &[u8]| {
    let Ok(router) = ParserRouter::with_defaults() else {
        return;
    };
    let line = String::from_utf8_lossy(data);

    // 파싱 성공 시 path는 항상 url의 접두사
    if let Ok(event) = router.parse(&line) {
        assert!(event.url.starts_with(&event.path));
        assert!(!event.ip.is_empty());
    }
});
