// src/crawl/dispatcher.rs
// =============================================================================
// The dispatcher: the single authority on what gets crawled and when the
// crawl is over.
//
// How it works:
// 1. A batch of links comes in (the root URL, or a worker's PageReport)
// 2. Each link is claimed in the visited set; new ones go to the workers
// 3. Every claimed URL is "pending" until its PageReport comes back
// 4. When nothing is pending, no more links can ever show up: we're done
//
// The dispatcher runs as one task and owns the claimed count and the pending
// count outright. Workers only talk to it through channels, so submitting a
// batch and checking for completion can never race with each other.
//
// Budget: once the claimed count reaches the budget we stop claiming. Pages
// already handed to workers still report back (each fetch is bounded by the
// HTTP timeout), and the crawl ends when the last of them arrives.
// =============================================================================

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::budget::CrawlBudget;
use super::progress::ProgressSink;
use super::visited::VisitedSet;
use super::worker::PageReport;
use crate::fetch::is_valid_url;

// Why a crawl stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlCompletion {
    /// The claimed count reached the budget.
    BudgetReached,
    /// Nothing left in flight and nothing left to claim.
    FrontierExhausted,
    /// Cancelled from outside (Ctrl-C).
    Interrupted,
}

// Counts the dispatcher keeps while it runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub claimed: usize,
    pub pages_fetched: usize,
    pub pages_failed: usize,
}

pub struct Dispatcher {
    visited: Arc<VisitedSet>,
    budget: CrawlBudget,
    work_tx: mpsc::UnboundedSender<String>,
    progress: Arc<dyn ProgressSink>,
    stats: DispatchStats,
    // Claimed URLs whose PageReport hasn't come back yet
    pending: usize,
}

impl Dispatcher {
    pub fn new(
        visited: Arc<VisitedSet>,
        budget: CrawlBudget,
        work_tx: mpsc::UnboundedSender<String>,
        progress: Arc<dyn ProgressSink>,
    ) -> Self {
        Self {
            visited,
            budget,
            work_tx,
            progress,
            stats: DispatchStats::default(),
            pending: 0,
        }
    }

    // Claims and dispatches every new URL in `batch`, in order
    //
    // Duplicates (within the batch or already claimed) and invalid URLs are
    // dropped silently. If the budget runs out part way through, the rest of
    // the batch is discarded.
    //
    // Returns how many URLs were dispatched.
    pub fn submit(&mut self, batch: &[String]) -> usize {
        let mut dispatched = 0;

        for url in batch {
            // Step 1: Stop claiming once the budget is spent
            if self.budget.is_exhausted(self.stats.claimed) {
                tracing::debug!(budget = %self.budget, "budget reached, discarding rest of batch");
                break;
            }

            // Step 2: Never hand a worker something it can't fetch
            if !is_valid_url(url) {
                tracing::debug!(%url, "skipping invalid url");
                continue;
            }

            // Step 3: Claim. Claim and dispatch are one step: there is no
            // window where a URL has been checked but not yet claimed.
            if !self.visited.try_claim(url) {
                continue;
            }

            // Step 4: Count it as pending *before* sending, so completion()
            // can't see zero while this URL is on its way to a worker
            self.stats.claimed += 1;
            self.pending += 1;

            if self.work_tx.send(url.clone()).is_err() {
                // No worker will ever pick this up, so it must not hold the
                // crawl open.
                tracing::warn!(%url, "worker pool is gone, url claimed but not fetched");
                self.pending -= 1;
                continue;
            }

            tracing::debug!(%url, claimed = self.stats.claimed, pending = self.pending, "dispatched");
            dispatched += 1;
        }

        dispatched
    }

    // Handles one finished page: it is no longer pending, and its links are
    // the next batch to submit.
    pub fn record(&mut self, report: PageReport) {
        // This URL is no longer in flight
        self.pending = self.pending.saturating_sub(1);

        if report.is_ok() {
            self.stats.pages_fetched += 1;
        } else {
            self.stats.pages_failed += 1;
        }

        self.progress.page_crawled(&report);

        // Its links may add new pending work before the next completion check
        self.submit(&report.links);
    }

    // The crawl is complete once nothing is pending. Whether it ended on the
    // budget or ran out of links decides how we report it.
    pub fn completion(&self) -> Option<CrawlCompletion> {
        if self.pending > 0 {
            return None;
        }

        if self.budget.is_exhausted(self.stats.claimed) {
            Some(CrawlCompletion::BudgetReached)
        } else {
            Some(CrawlCompletion::FrontierExhausted)
        }
    }

    // Seeds the crawl with `seed`, then processes reports until the crawl is
    // complete or `cancel` fires
    //
    // Dropping `self` at the end closes the work queue, which tells idle
    // workers to exit.
    pub async fn run(
        mut self,
        seed: Vec<String>,
        mut reports: mpsc::UnboundedReceiver<PageReport>,
        cancel: CancellationToken,
    ) -> (CrawlCompletion, DispatchStats) {
        self.submit(&seed);

        loop {
            // Checked after every submit, so a finished crawl is noticed at once
            if let Some(done) = self.completion() {
                tracing::info!(?done, visited = self.visited.len(), "crawl complete");
                return (done, self.stats);
            }

            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    tracing::info!(
                        claimed = self.stats.claimed,
                        pending = self.pending,
                        "crawl interrupted"
                    );
                    return (CrawlCompletion::Interrupted, self.stats);
                }

                report = reports.recv() => match report {
                    Some(report) => self.record(report),
                    None => {
                        // Every worker is gone while pages are still pending.
                        // Nothing can arrive any more, so stop here.
                        tracing::warn!(pending = self.pending, "all workers exited early");
                        return (CrawlCompletion::FrontierExhausted, self.stats);
                    }
                },
            }
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why one task instead of a lock?
//    - Only this task ever touches `pending` and `stats`
//    - So "submit a batch" and "is the crawl over?" happen one after the
//      other, never at the same time, without any Mutex
//
// 2. What does `biased;` do in select!?
//    - Normally select! picks a random ready branch
//    - biased checks branches top to bottom, so Ctrl-C wins over more work
//
// 3. Why is `pending` decremented when a report arrives?
//    - Each worker sends exactly one report per URL, success or failure
//    - So "report received" means "that URL is no longer in flight"
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::progress::SilentProgress;

    fn dispatcher(
        budget: CrawlBudget,
    ) -> (Dispatcher, mpsc::UnboundedReceiver<String>, Arc<VisitedSet>) {
        let visited = Arc::new(VisitedSet::new());
        let (work_tx, work_rx) = mpsc::unbounded_channel();
        let dispatcher = Dispatcher::new(
            Arc::clone(&visited),
            budget,
            work_tx,
            Arc::new(SilentProgress),
        );
        (dispatcher, work_rx, visited)
    }

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(url) = rx.try_recv() {
            out.push(url);
        }
        out
    }

    #[test]
    fn test_submit_drops_duplicates() {
        let (mut d, mut rx, visited) = dispatcher(CrawlBudget::unbounded());

        let sent = d.submit(&urls(&["http://a.com/", "http://b.com/", "http://a.com/"]));
        assert_eq!(sent, 2);

        let sent = d.submit(&urls(&["http://b.com/", "http://c.com/"]));
        assert_eq!(sent, 1);

        assert_eq!(drain(&mut rx), urls(&["http://a.com/", "http://b.com/", "http://c.com/"]));
        assert_eq!(visited.len(), 3);
        assert_eq!(d.pending, 3);
    }

    #[test]
    fn test_submit_skips_invalid_urls() {
        let (mut d, mut rx, visited) = dispatcher(CrawlBudget::unbounded());

        d.submit(&urls(&["not a url", "/relative", "http://ok.com/"]));

        assert_eq!(drain(&mut rx), urls(&["http://ok.com/"]));
        assert_eq!(visited.len(), 1);
    }

    #[test]
    fn test_budget_reached_mid_batch() {
        let (mut d, mut rx, _) = dispatcher(CrawlBudget::limited(2));

        d.submit(&urls(&["http://a.com/", "http://b.com/", "http://c.com/"]));
        d.submit(&urls(&["http://d.com/"]));

        assert_eq!(drain(&mut rx), urls(&["http://a.com/", "http://b.com/"]));
        assert_eq!(d.stats.claimed, 2);
    }

    #[test]
    fn test_completion_waits_for_pending() {
        let (mut d, _rx, _) = dispatcher(CrawlBudget::limited(1));

        d.submit(&urls(&["http://a.com/"]));
        assert_eq!(d.completion(), None);

        d.record(PageReport::fetched(
            "http://a.com/".to_string(),
            urls(&["http://b.com/"]),
        ));
        assert_eq!(d.completion(), Some(CrawlCompletion::BudgetReached));
        assert_eq!(d.stats.claimed, 1);
    }

    #[test]
    fn test_failed_page_counts_as_claimed() {
        let (mut d, _rx, visited) = dispatcher(CrawlBudget::unbounded());

        d.submit(&urls(&["http://a.com/"]));
        d.record(PageReport::failed(
            "http://a.com/".to_string(),
            crate::fetch::FetchError::Timeout,
        ));

        assert_eq!(d.completion(), Some(CrawlCompletion::FrontierExhausted));
        assert_eq!(d.stats.pages_failed, 1);
        assert!(visited.snapshot().contains("http://a.com/"));
    }

    #[test]
    fn test_closed_work_queue_does_not_hold_crawl_open() {
        let (mut d, rx, _) = dispatcher(CrawlBudget::unbounded());
        drop(rx);

        d.submit(&urls(&["http://a.com/"]));
        assert_eq!(d.pending, 0);
        assert_eq!(d.completion(), Some(CrawlCompletion::FrontierExhausted));
    }

    #[tokio::test]
    async fn test_run_with_invalid_seed_finishes_empty() {
        let (d, _rx, visited) = dispatcher(CrawlBudget::unbounded());
        let (_report_tx, report_rx) = mpsc::unbounded_channel();

        let (done, stats) = d
            .run(urls(&["www.example.com"]), report_rx, CancellationToken::new())
            .await;

        assert_eq!(done, CrawlCompletion::FrontierExhausted);
        assert_eq!(stats.claimed, 0);
        assert_eq!(visited.len(), 0);
    }

    #[tokio::test]
    async fn test_run_stops_on_cancel() {
        let (d, _rx, visited) = dispatcher(CrawlBudget::unbounded());
        let (_report_tx, report_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let (done, _) = d.run(urls(&["http://a.com/"]), report_rx, cancel).await;

        assert_eq!(done, CrawlCompletion::Interrupted);
        assert_eq!(visited.len(), 1);
    }
}
