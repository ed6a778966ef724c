#![no_main]

use libfuzzer_sys::fuzz_target;
use weblog_hunter_engine::{LogIngestor, ThreatAnalyzer};

fuzz_target!(|data: &[u8]| {
    let (Ok(ingestor), Ok(analyzer)) = (LogIngestor::with_defaults(), ThreatAnalyzer::with_defaults())
    else {
        return;
    };

    let text = String::from_utf8_lossy(data);
    let mut report = ingestor.ingest_lines(text.lines());
    let Ok(result) = analyzer.analyze(&mut report.events, 5, 1) else {
        return;
    };

    // 점수는 유한한 비음수, 순위는 내림차순
    for ip in &result.top_suspicious_ips {
        assert!(ip.score.is_finite() && ip.score >= 0.0);
    }
    for pair in result.top_suspicious_ips.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    assert!(result.top_suspicious_ips.len() <= 5);
});
