// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Validate the root URL (before any crawling starts)
// 3. Build the crawler and run it, with Ctrl-C wired to a cancellation token
// 4. Print the summary and exit with the proper code
//
// Exit codes:
//   0   = crawl finished (including "nothing crawled")
//   2   = bad arguments or startup error (clap also uses 2 for usage errors)
//   130 = interrupted with Ctrl-C (partial results are still printed)
//
// Logging goes to stderr via tracing (set RUST_LOG=debug to see every claim);
// stdout is reserved for the crawl output itself.
// =============================================================================

mod cli;
mod crawl;
mod fetch;

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::io::Write;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::Cli;
use crawl::{CrawlReport, Crawler, JsonProgress, ProgressSink, TextProgress};
use fetch::{is_valid_url, HtmlLinkExtractor, HttpFetcher};

const EXIT_OK: i32 = 0;
const EXIT_ERROR: i32 = 2;
const EXIT_INTERRUPTED: i32 = 130;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_ERROR
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    let crawler = build_crawler(&cli)?;

    // Ctrl-C cancels the token; the crawler returns what it has so far
    // through the same path as a normal finish.
    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_ctrl_c(cancel.clone()));

    let report = crawler.crawl(&cli.root_url, cancel).await;

    write_summary(&mut std::io::stdout().lock(), &report, cli.json)?;
    Ok(exit_code(&report))
}

// Validates the root URL and wires the real fetcher, extractor and output
//
// A bad root is rejected here, before anything is fetched.
fn build_crawler(cli: &Cli) -> Result<Crawler> {
    if !is_valid_url(&cli.root_url) {
        bail!(
            "Invalid URL format: '{}' (expected an absolute URL like https://example.com)",
            cli.root_url
        );
    }

    let fetcher = HttpFetcher::new(cli.timeout()).context("Failed to create HTTP client")?;
    let progress: Arc<dyn ProgressSink> = if cli.json {
        Arc::new(JsonProgress)
    } else {
        Arc::new(TextProgress)
    };

    Ok(Crawler::new(
        cli.crawl_config(),
        Arc::new(fetcher),
        Arc::new(HtmlLinkExtractor::new(cli.absolute_only)),
    )
    .with_progress(progress))
}

async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("interrupt received, stopping crawl");
            cancel.cancel();
        }
        Err(e) => tracing::warn!(error = %e, "could not listen for Ctrl-C"),
    }
}

fn exit_code(report: &CrawlReport) -> i32 {
    if report.was_interrupted() {
        EXIT_INTERRUPTED
    } else {
        EXIT_OK
    }
}

// Prints the final count (text) or the summary object (--json)
fn write_summary(out: &mut impl Write, report: &CrawlReport, json: bool) -> Result<()> {
    if json {
        let summary = serde_json::to_string(&report.summary())?;
        writeln!(out, "{}", summary)?;
        return Ok(());
    }

    if report.was_interrupted() {
        writeln!(out, "Interrupted.")?;
    }
    writeln!(out, "Crawled {} pages", report.pages_crawled())?;
    if report.pages_failed > 0 {
        writeln!(out, "({} of them could not be fetched)", report.pages_failed)?;
    }

    Ok(())
}
