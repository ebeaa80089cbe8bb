// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Usage:
//   link-crawler <ROOT_URL> [MAX_CRAWLS] [--workers N] [--timeout-secs S]
//                [--absolute-only] [--json]
//
// We use clap's "derive" API: the struct below IS the CLI definition.
// Flags can also come from environment variables (LINK_CRAWLER_*).
// =============================================================================

// TypedValueParser brings `.map()` on value parsers into scope (see --workers)
use clap::builder::TypedValueParser;
use clap::Parser;
use std::time::Duration;

use crate::crawl::{CrawlBudget, CrawlConfig, DEFAULT_WORKERS};
use crate::fetch::DEFAULT_TIMEOUT_SECS;

#[derive(Parser, Debug)]
#[command(
    name = "link-crawler",
    version,
    about = "Crawl a website breadth-first, following every link it finds",
    long_about = "link-crawler starts at ROOT_URL, fetches pages with a pool of concurrent \
                  workers, and follows every link it discovers until there are no new links \
                  or MAX_CRAWLS pages have been claimed. Press Ctrl-C to stop early and see \
                  how many pages were crawled."
)]
pub struct Cli {
    /// Absolute URL to start crawling from (e.g., https://example.com)
    pub root_url: String,

    /// Maximum number of pages to crawl (0 or omitted = no limit)
    pub max_crawls: Option<usize>,

    /// Number of pages fetched concurrently
    #[arg(
        long,
        env = "LINK_CRAWLER_WORKERS",
        default_value_t = DEFAULT_WORKERS,
        value_parser = clap::value_parser!(u16).range(1..).map(usize::from)
    )]
    pub workers: usize,

    /// Seconds before a single page fetch gives up
    #[arg(
        long,
        env = "LINK_CRAWLER_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_secs: u64,

    /// Only follow links that are already absolute URLs (ignore "/relative" hrefs)
    #[arg(long)]
    pub absolute_only: bool,

    /// Print one JSON object per page and a JSON summary instead of text
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    pub fn crawl_config(&self) -> CrawlConfig {
        CrawlConfig {
            workers: self.workers,
            budget: CrawlBudget::from_max_crawls(self.max_crawls),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
