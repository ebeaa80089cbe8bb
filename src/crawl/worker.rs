// src/crawl/worker.rs
// =============================================================================
// The worker pool: N tasks that fetch pages and extract their links.
//
// Each worker repeatedly:
// 1. Takes one URL from the shared work queue
// 2. Fetches it
// 3. Extracts the links (or reports zero links if the fetch failed)
// 4. Sends a PageReport back to the dispatcher
//
// Exactly one report is sent per URL taken from the queue, success or not.
// That report is how the dispatcher knows the URL is no longer in flight.
//
// Workers share nothing except the two channels. They never wait on each
// other; the only place crawling decisions happen is the dispatcher.
// =============================================================================

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::fetch::{FetchError, Fetcher, LinkExtractor};

/// Default number of concurrent workers.
pub const DEFAULT_WORKERS: usize = 20;

// The outcome of crawling one URL
//
// `links` is the page's link batch: document order, duplicates included,
// empty when the fetch failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageReport {
    pub url: String,
    pub links: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FetchError>,
}

impl PageReport {
    pub fn fetched(url: String, links: Vec<String>) -> Self {
        Self { url, links, error: None }
    }

    pub fn failed(url: String, error: FetchError) -> Self {
        Self {
            url,
            links: Vec::new(),
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

// The receiving end of the work queue, shared by every worker.
// tokio's mpsc has a single consumer, so workers take turns through a Mutex.
type SharedQueue = Arc<Mutex<mpsc::UnboundedReceiver<String>>>;

pub struct WorkerPool {
    tasks: JoinSet<()>,
    cancel: CancellationToken,
}

impl WorkerPool {
    // Starts `size` workers pulling from `queue` and reporting to `reports`
    pub fn spawn(
        size: usize,
        queue: mpsc::UnboundedReceiver<String>,
        reports: mpsc::UnboundedSender<PageReport>,
        fetcher: Arc<dyn Fetcher>,
        extractor: Arc<dyn LinkExtractor>,
        cancel: CancellationToken,
    ) -> Self {
        let queue: SharedQueue = Arc::new(Mutex::new(queue));
        let mut tasks = JoinSet::new();

        for id in 0..size.max(1) {
            tasks.spawn(run_worker(
                id,
                Arc::clone(&queue),
                reports.clone(),
                Arc::clone(&fetcher),
                Arc::clone(&extractor),
                cancel.clone(),
            ));
        }

        tracing::debug!(workers = tasks.len(), "worker pool started");
        Self { tasks, cancel }
    }

    // Stops every worker without waiting for in-flight fetches
    pub fn shutdown(mut self) {
        self.cancel.cancel();
        self.tasks.abort_all();
        tracing::debug!("worker pool stopped");
    }
}

async fn run_worker(
    id: usize,
    queue: SharedQueue,
    reports: mpsc::UnboundedSender<PageReport>,
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn LinkExtractor>,
    cancel: CancellationToken,
) {
    loop {
        // Wait for the next URL, unless the crawl is being torn down
        let url = tokio::select! {
            _ = cancel.cancelled() => break,
            url = next_url(&queue) => match url {
                Some(url) => url,
                // The dispatcher dropped its sender: the crawl is over
                None => break,
            },
        };

        tracing::trace!(worker = id, %url, "picked up");

        // The page runs in its own task so a panic in a collaborator still
        // turns into a report instead of leaving the URL pending forever.
        let page = tokio::spawn(crawl_page(
            Arc::clone(&fetcher),
            Arc::clone(&extractor),
            url.clone(),
        ));
        let abort = page.abort_handle();

        // Wait for the page. On cancel, abort it so it can't outlive the crawl.
        let report = tokio::select! {
            _ = cancel.cancelled() => {
                abort.abort();
                break;
            }
            joined = page => match joined {
                Ok(report) => report,
                Err(e) => {
                    tracing::error!(%url, error = %e, "page task failed");
                    PageReport::failed(url, FetchError::Other(format!("crawl task failed: {}", e)))
                }
            },
        };

        // Closed reports channel: the dispatcher has already returned
        if reports.send(report).is_err() {
            break;
        }
    }

    tracing::trace!(worker = id, "worker exiting");
}

async fn next_url(queue: &SharedQueue) -> Option<String> {
    queue.lock().await.recv().await
}

// Fetches one page and extracts its links
//
// A failed fetch is not retried and doesn't stop the crawl; it just means
// this page contributes no new links.
//
// Relative links are resolved against the URL the body came from (which
// differs from `url` after a redirect). The report keeps the requested URL,
// since that is the one that was claimed.
pub async fn crawl_page(
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn LinkExtractor>,
    url: String,
) -> PageReport {
    match fetcher.fetch(&url).await {
        Ok(page) => {
            let links = extractor.extract(&page.url, &page.body);
            tracing::debug!(%url, final_url = %page.url, links = links.len(), "page crawled");
            PageReport::fetched(url, links)
        }
        Err(error) => {
            tracing::warn!(%url, %error, "fetch failed");
            PageReport::failed(url, error)
        }
    }
}
