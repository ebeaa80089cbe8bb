// src/crawl/visited.rs
// =============================================================================
// The visited set: every URL that has been claimed for crawling.
//
// A URL is claimed at the moment the dispatcher decides to crawl it, not when
// its fetch finishes. Once claimed it is never claimed again, so no page is
// ever fetched twice. The set only grows; there is no removal.
//
// Rust concepts:
// - DashSet: A concurrent HashSet, sharded internally so many tasks can use
//   it at once without one big lock
// - &self methods that mutate: DashSet handles the locking for us, which is
//   why try_claim doesn't need &mut self
// =============================================================================

use dashmap::DashSet;
use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct VisitedSet {
    claimed: DashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `url` for crawling.
    ///
    /// Returns true if this caller now owns crawling `url`, false if it was
    /// already claimed. Across all threads, at most one call per URL ever
    /// returns true.
    pub fn try_claim(&self, url: &str) -> bool {
        // Fast path: skip the String allocation for URLs we've already seen.
        // The insert below is what actually decides ownership.
        if self.claimed.contains(url) {
            return false;
        }
        self.claimed.insert(url.to_string())
    }

    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    /// Copies the claimed URLs out into a plain HashSet.
    pub fn snapshot(&self) -> HashSet<String> {
        self.claimed.iter().map(|url| url.key().clone()).collect()
    }
}
