// src/crawl/coordinator.rs
// =============================================================================
// The crawl coordinator: starts everything, waits, and hands back the result.
//
// What happens in `Crawler::crawl`:
// 1. Create the visited set and the two channels (work out, reports back)
// 2. Start the worker pool
// 3. Seed the dispatcher with the root URL and let it run
// 4. When the dispatcher says we're done (or Ctrl-C fires), stop the workers
//    and return every URL that was claimed
//
// Normal completion and interruption take exactly the same path out; the
// only difference is the `completion` field of the report.
// =============================================================================

use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::budget::CrawlBudget;
use super::dispatcher::{CrawlCompletion, Dispatcher};
use super::progress::{ProgressSink, SilentProgress};
use super::visited::VisitedSet;
use super::worker::{WorkerPool, DEFAULT_WORKERS};
use crate::fetch::{Fetcher, LinkExtractor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlConfig {
    /// Number of concurrent workers (at least 1).
    pub workers: usize,
    pub budget: CrawlBudget,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            budget: CrawlBudget::unbounded(),
        }
    }
}

// Everything a finished (or interrupted) crawl produced
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub root: String,
    /// Every URL that was claimed for crawling. This is the crawl's answer.
    pub visited: HashSet<String>,
    pub completion: CrawlCompletion,
    pub pages_fetched: usize,
    pub pages_failed: usize,
    pub elapsed: Duration,
}

impl CrawlReport {
    pub fn pages_crawled(&self) -> usize {
        self.visited.len()
    }

    pub fn was_interrupted(&self) -> bool {
        self.completion == CrawlCompletion::Interrupted
    }

    pub fn summary(&self) -> CrawlSummary {
        CrawlSummary {
            root: self.root.clone(),
            pages_crawled: self.pages_crawled(),
            pages_fetched: self.pages_fetched,
            pages_failed: self.pages_failed,
            completion: self.completion,
            elapsed_ms: u64::try_from(self.elapsed.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

// The final line(s) of output, in serializable form for --json
#[derive(Debug, Clone, Serialize)]
pub struct CrawlSummary {
    pub root: String,
    pub pages_crawled: usize,
    pub pages_fetched: usize,
    pub pages_failed: usize,
    pub completion: CrawlCompletion,
    pub elapsed_ms: u64,
}

pub struct Crawler {
    config: CrawlConfig,
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn LinkExtractor>,
    progress: Arc<dyn ProgressSink>,
}

impl Crawler {
    pub fn new(
        config: CrawlConfig,
        fetcher: Arc<dyn Fetcher>,
        extractor: Arc<dyn LinkExtractor>,
    ) -> Self {
        Self {
            config,
            fetcher,
            extractor,
            progress: Arc::new(SilentProgress),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    // Crawls outward from `root` until the budget is spent, the links run
    // out, or `cancel` fires
    //
    // `root` should already have passed `is_valid_url`. If it hasn't, nothing
    // is claimed and the report comes back empty.
    pub async fn crawl(&self, root: &str, cancel: CancellationToken) -> CrawlReport {
        let started = Instant::now();
        tracing::info!(
            root,
            workers = self.config.workers,
            budget = %self.config.budget,
            "starting crawl"
        );

        let visited = Arc::new(VisitedSet::new());
        let (work_tx, work_rx) = mpsc::unbounded_channel();
        let (report_tx, report_rx) = mpsc::unbounded_channel();

        let pool = WorkerPool::spawn(
            self.config.workers,
            work_rx,
            report_tx,
            Arc::clone(&self.fetcher),
            Arc::clone(&self.extractor),
            cancel.child_token(),
        );

        let dispatcher = Dispatcher::new(
            Arc::clone(&visited),
            self.config.budget,
            work_tx,
            Arc::clone(&self.progress),
        );

        let (completion, stats) = dispatcher
            .run(vec![root.to_string()], report_rx, cancel)
            .await;

        // In-flight fetches (if any) are abandoned here, not awaited
        pool.shutdown();

        CrawlReport {
            root: root.to_string(),
            visited: visited.snapshot(),
            completion,
            pages_fetched: stats.pages_fetched,
            pages_failed: stats.pages_failed,
            elapsed: started.elapsed(),
        }
    }
}
