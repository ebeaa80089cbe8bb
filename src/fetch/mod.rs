// src/fetch/mod.rs
// =============================================================================
// The crawler's view of the outside world.
//
// Submodules:
// - http: Downloads a page (the `Fetcher` trait and the reqwest implementation)
// - html: Pulls links out of a page body (the `LinkExtractor` trait)
// - validate: Decides whether a string is a crawlable absolute URL
//
// The crawl engine in src/crawl/ only talks to these through the traits, so
// it can be tested with an in-memory fake web.
// =============================================================================

mod html;
mod http;
mod validate;

pub use html::{HtmlLinkExtractor, LinkExtractor};
pub use http::{FetchError, FetchedPage, Fetcher, HttpFetcher, DEFAULT_TIMEOUT_SECS};
pub use validate::is_valid_url;
