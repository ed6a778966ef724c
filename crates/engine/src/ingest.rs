//! 입력 수집기 -- 파일/디렉토리/`.gz`를 읽어 이벤트 시퀀스로 변환합니다.
//!
//! # 순서 보장
//! - 디렉토리는 재귀적으로 탐색하며, 입력 하나 안의 파일은 경로의 사전순으로 정렬합니다.
//! - 파일은 세마포어로 제한된 개수만큼 병렬로 읽지만,
//!   결과는 파일 인덱스 순서로 합쳐지므로 최종 이벤트 순서는 항상 `파일 → 라인` 순서입니다.
//!
//! # 부분 실패 허용
//! - 파싱할 수 없는 라인은 카운트만 하고 계속 진행합니다.
//! - 읽을 수 없는 파일(권한, 존재하지 않음, 압축 손상)은 실패로 기록하고 나머지 파일을 계속 처리합니다.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use flate2::read::MultiGzDecoder;
use metrics::counter;
use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{debug, info, trace, warn};

use weblog_hunter_core::metrics as names;
use weblog_hunter_core::types::LogEvent;

use crate::config::IngestorConfig;
use crate::error::EngineError;
use crate::parser::ParserRouter;

/// 읽기에 실패한 입력
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    /// 파일 또는 디렉토리 경로
    pub path: PathBuf,
    /// 실패 사유
    pub reason: String,
}

/// 수집 결과
#[derive(Debug, Default)]
pub struct IngestReport {
    /// 파싱된 이벤트 (파일 → 라인 순서)
    pub events: Vec<LogEvent>,
    /// 파싱 실패 라인 수
    pub parse_failures: usize,
    /// 실제로 읽은 파일 수
    pub files_read: usize,
    /// 읽기에 실패한 입력
    pub file_failures: Vec<FileFailure>,
}

/// 한 파일(또는 라인 묶음)의 파싱 결과
#[derive(Debug, Default)]
struct ParsedChunk {
    events: Vec<LogEvent>,
    failures: usize,
}

/// 입력 수집기
pub struct LogIngestor {
    router: Arc<ParserRouter>,
    config: IngestorConfig,
}

impl LogIngestor {
    /// 라우터와 설정으로 수집기를 생성합니다.
    ///
    /// 라우터의 최대 라인 길이는 설정값으로 덮어씁니다.
    pub fn new(router: ParserRouter, config: IngestorConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let router = router.with_max_line_length(config.max_line_length);
        Ok(Self {
            router: Arc::new(router),
            config,
        })
    }

    /// 기본 파서와 기본 설정으로 수집기를 생성합니다.
    pub fn with_defaults() -> Result<Self, EngineError> {
        Self::new(ParserRouter::with_defaults()?, IngestorConfig::default())
    }

    /// 이미 디코딩된 텍스트 라인을 파싱합니다.
    ///
    /// 빈 줄은 건너뛰며 실패로 세지 않습니다. `files_read`는 0입니다.
    pub fn ingest_lines<I, S>(&self, lines: I) -> IngestReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut chunk = ParsedChunk::default();
        for line in lines {
            parse_one(&self.router, line.as_ref(), &mut chunk);
        }
        record_parse_metrics(&chunk);

        IngestReport {
            events: chunk.events,
            parse_failures: chunk.failures,
            files_read: 0,
            file_failures: Vec::new(),
        }
    }

    /// 입력 경로(파일 또는 디렉토리)에서 처리할 파일 목록을 만듭니다.
    ///
    /// 입력 순서는 유지하고, 디렉토리 안의 파일은 사전순으로 정렬합니다.
    /// 명시적으로 지정한 파일은 확장자와 관계없이 포함합니다.
    pub async fn discover(&self, inputs: &[PathBuf]) -> (Vec<PathBuf>, Vec<FileFailure>) {
        let mut files = Vec::new();
        let mut failures = Vec::new();

        for input in inputs {
            match tokio::fs::metadata(input).await {
                Ok(meta) if meta.is_dir() => {
                    let mut found = self.walk_directory(input, &mut failures).await;
                    found.sort();
                    debug!(dir = %input.display(), files = found.len(), "discovered log files");
                    files.extend(found);
                }
                Ok(_) => files.push(input.clone()),
                Err(e) => {
                    warn!(path = %input.display(), error = %e, "input is not accessible, skipping");
                    failures.push(FileFailure {
                        path: input.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        (files, failures)
    }

    /// 디렉토리를 재귀적으로 탐색합니다. 심볼릭 링크 디렉토리는 따라가지 않습니다.
    async fn walk_directory(&self, root: &Path, failures: &mut Vec<FileFailure>) -> Vec<PathBuf> {
        let mut found = Vec::new();
        let mut pending = vec![root.to_path_buf()];

        while let Some(dir) = pending.pop() {
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "failed to read directory, skipping");
                    failures.push(FileFailure {
                        path: dir,
                        reason: format!("failed to read directory: {e}"),
                    });
                    continue;
                }
            };

            loop {
                let entry = match entries.next_entry().await {
                    Ok(Some(entry)) => entry,
                    Ok(None) => break,
                    Err(e) => {
                        failures.push(FileFailure {
                            path: dir.clone(),
                            reason: format!("failed to read directory entry: {e}"),
                        });
                        break;
                    }
                };

                let path = entry.path();
                let file_type = match entry.file_type().await {
                    Ok(ft) => ft,
                    Err(e) => {
                        failures.push(FileFailure {
                            path,
                            reason: e.to_string(),
                        });
                        continue;
                    }
                };

                if file_type.is_dir() {
                    pending.push(path);
                    continue;
                }

                let accepted = path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| self.config.accepts_extension(ext));
                if !accepted {
                    trace!(path = %path.display(), "skipping file with unlisted extension");
                    continue;
                }

                if file_type.is_symlink() {
                    // 링크 대상이 일반 파일일 때만 포함
                    match tokio::fs::metadata(&path).await {
                        Ok(meta) if meta.is_file() => found.push(path),
                        _ => trace!(path = %path.display(), "skipping non-file symlink"),
                    }
                } else if file_type.is_file() {
                    found.push(path);
                }
            }
        }

        found
    }

    /// 입력 경로에서 모든 로그를 읽어 파싱합니다.
    ///
    /// 파일 단위 실패는 [`IngestReport::file_failures`]에 기록되며 전체 실행을 중단하지 않습니다.
    pub async fn ingest_paths(&self, inputs: &[PathBuf]) -> IngestReport {
        let (files, mut file_failures) = self.discover(inputs).await;

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency));
        let mut handles = Vec::with_capacity(files.len());

        for path in &files {
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    file_failures.push(FileFailure {
                        path: path.clone(),
                        reason: format!("ingest scheduler unavailable: {e}"),
                    });
                    continue;
                }
            };
            let router = Arc::clone(&self.router);
            let task_path = path.clone();

            let handle = tokio::spawn(async move {
                let result = read_and_parse(router, &task_path).await;
                drop(permit);
                (task_path, result)
            });
            handles.push(handle);
        }

        // 파일 인덱스 순서로 합쳐 완료 순서와 무관하게 결과를 고정
        let mut report = IngestReport::default();
        for handle in handles {
            match handle.await {
                Ok((path, Ok(chunk))) => {
                    debug!(
                        path = %path.display(),
                        events = chunk.events.len(),
                        failures = chunk.failures,
                        "file parsed"
                    );
                    report.files_read += 1;
                    report.parse_failures += chunk.failures;
                    report.events.extend(chunk.events);
                }
                Ok((path, Err(e))) => {
                    warn!(path = %path.display(), error = %e, "failed to read log file, skipping");
                    file_failures.push(FileFailure {
                        path,
                        reason: e.to_string(),
                    });
                }
                Err(e) => {
                    warn!(error = %e, "ingest task failed");
                    file_failures.push(FileFailure {
                        path: PathBuf::new(),
                        reason: format!("ingest task failed: {e}"),
                    });
                }
            }
        }
        report.file_failures = file_failures;

        counter!(names::FILES_READ_TOTAL).increment(report.files_read as u64);
        counter!(names::FILE_FAILURES_TOTAL).increment(report.file_failures.len() as u64);
        counter!(names::LINES_PARSED_TOTAL).increment(report.events.len() as u64);
        counter!(names::PARSE_FAILURES_TOTAL).increment(report.parse_failures as u64);

        info!(
            files_read = report.files_read,
            file_failures = report.file_failures.len(),
            events = report.events.len(),
            parse_failures = report.parse_failures,
            "ingest completed"
        );

        report
    }
}

/// 파일 하나를 읽고 (필요하면 압축을 풀고) 파싱합니다.
async fn read_and_parse(router: Arc<ParserRouter>, path: &Path) -> Result<ParsedChunk, EngineError> {
    let raw = tokio::fs::read(path).await.map_err(|e| EngineError::Ingest {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let is_gzip = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"));
    let display = path.display().to_string();

    // 압축 해제와 정규식 매칭은 CPU 작업이므로 블로킹 풀에서 수행
    tokio::task::spawn_blocking(move || {
        let text = if is_gzip {
            decompress_gzip(&raw, &display)?
        } else {
            raw
        };
        Ok(parse_bytes(&router, &text))
    })
    .await
    .map_err(|e| EngineError::Ingest {
        path: path.display().to_string(),
        reason: format!("parse worker failed: {e}"),
    })?
}

/// gzip(멀티 멤버 포함) 데이터를 해제합니다.
fn decompress_gzip(data: &[u8], path: &str) -> Result<Vec<u8>, EngineError> {
    let mut decoder = MultiGzDecoder::new(data);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| EngineError::Decompress {
            path: path.to_owned(),
            reason: e.to_string(),
        })?;
    Ok(decompressed)
}

/// 바이트 버퍼를 줄 단위로 파싱합니다. UTF-8이 아닌 바이트는 손실 변환합니다.
fn parse_bytes(router: &ParserRouter, data: &[u8]) -> ParsedChunk {
    let mut chunk = ParsedChunk::default();
    for raw_line in data.split(|&b| b == b'\n') {
        let line = String::from_utf8_lossy(raw_line);
        parse_one(router, &line, &mut chunk);
    }
    chunk
}

fn parse_one(router: &ParserRouter, line: &str, chunk: &mut ParsedChunk) {
    if line.trim().is_empty() {
        return;
    }
    match router.parse(line) {
        Ok(event) => chunk.events.push(event),
        Err(e) => {
            trace!(error = %e, "unparseable line");
            chunk.failures += 1;
        }
    }
}

fn record_parse_metrics(chunk: &ParsedChunk) {
    counter!(names::LINES_PARSED_TOTAL).increment(chunk.events.len() as u64);
    counter!(names::PARSE_FAILURES_TOTAL).increment(chunk.failures as u64);
}
