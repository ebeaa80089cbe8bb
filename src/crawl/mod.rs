// src/crawl/mod.rs
// =============================================================================
// This module is the concurrent crawl engine.
//
// Pieces:
// - visited: The set of claimed URLs (each URL is crawled at most once)
// - budget: Optional cap on how many URLs may be claimed
// - dispatcher: Decides what gets crawled and when the crawl is over
// - worker: The pool of tasks that fetch pages and extract links
// - coordinator: Wires it all together and returns the final visited set
// - progress: Where per-page output goes
//
// Data flow:
//   coordinator seeds dispatcher -> dispatcher sends new URLs to workers ->
//   workers fetch + extract -> workers send link batches back -> repeat
//
// The crawl is breadth-first in spirit but not strictly level by level:
// pages are fetched concurrently, so their order isn't guaranteed.
// =============================================================================

mod budget;
mod coordinator;
mod dispatcher;
mod progress;
mod visited;
mod worker;

pub use budget::CrawlBudget;
pub use coordinator::{CrawlConfig, CrawlReport, Crawler};
pub use progress::{JsonProgress, ProgressSink, TextProgress};
pub use worker::DEFAULT_WORKERS;
