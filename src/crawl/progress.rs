// src/crawl/progress.rs
// =============================================================================
// Where per-page progress goes while a crawl runs.
//
// The dispatcher calls the sink once per finished page, from a single task,
// so lines from different workers never interleave.
// =============================================================================

use std::io::Write;

use super::worker::PageReport;

pub trait ProgressSink: Send + Sync {
    fn page_crawled(&self, report: &PageReport);
}

// Human-readable output: the page, then each link it found
//
//   http://example.com
//   	 http://example.com/a
//   	 http://example.com/b
#[derive(Debug, Default)]
pub struct TextProgress;

impl ProgressSink for TextProgress {
    fn page_crawled(&self, report: &PageReport) {
        let mut out = std::io::stdout().lock();
        let mut result = writeln!(out, "{}", report.url);
        for link in &report.links {
            result = result.and_then(|_| writeln!(out, "\t {}", link));
        }
        if let Err(e) = result {
            tracing::debug!(error = %e, "could not write progress");
        }
    }
}

// One JSON object per line, per page
#[derive(Debug, Default)]
pub struct JsonProgress;

impl ProgressSink for JsonProgress {
    fn page_crawled(&self, report: &PageReport) {
        match serde_json::to_string(report) {
            Ok(line) => {
                if let Err(e) = writeln!(std::io::stdout().lock(), "{}", line) {
                    tracing::debug!(error = %e, "could not write progress");
                }
            }
            Err(e) => tracing::warn!(url = %report.url, error = %e, "could not serialize page report"),
        }
    }
}

#[derive(Debug, Default)]
pub struct SilentProgress;

impl ProgressSink for SilentProgress {
    fn page_crawled(&self, _report: &PageReport) {}
}
