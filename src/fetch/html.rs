// src/fetch/html.rs
// =============================================================================
// This module extracts links from HTML pages.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever, so malformed markup never makes it fail
//
// The result is a "link batch": every crawlable URL on the page, in document
// order. Duplicates are kept on purpose; the dispatcher filters them.
// =============================================================================

use scraper::{Html, Selector};
use url::Url;

use super::validate::is_valid_url;

/// Turns a page body into the URLs it links to.
pub trait LinkExtractor: Send + Sync {
    fn extract(&self, page_url: &str, body: &str) -> Vec<String>;
}

// Extracts <a href> links from HTML
//
// With `absolute_only` set, only hrefs that are already absolute URLs are
// kept (relative ones like "/docs" are dropped). Otherwise relative hrefs
// are resolved against the page they were found on.
#[derive(Debug, Clone, Default)]
pub struct HtmlLinkExtractor {
    absolute_only: bool,
}

impl HtmlLinkExtractor {
    pub fn new(absolute_only: bool) -> Self {
        Self { absolute_only }
    }
}

impl LinkExtractor for HtmlLinkExtractor {
    fn extract(&self, page_url: &str, body: &str) -> Vec<String> {
        let document = Html::parse_document(body);

        // Our selector is a constant and known to be valid
        let selector = Selector::parse("a[href]").unwrap();

        let base = if self.absolute_only {
            None
        } else {
            match Url::parse(page_url) {
                Ok(url) => Some(url),
                Err(e) => {
                    tracing::debug!(page_url, error = %e, "cannot resolve relative links");
                    None
                }
            }
        };

        document
            .select(&selector)
            .filter_map(|element| element.value().attr("href"))
            .filter_map(|href| resolve_href(base.as_ref(), href))
            .collect()
    }
}

// Turns one href into a crawlable absolute URL, if it is one
//
// Absolute hrefs are kept exactly as written: two URLs are the same page only
// if their strings match, so we don't let the url crate rewrite them.
//
// Examples (base = "https://example.com/page/"):
//   "https://other.com"   -> Some("https://other.com")
//   "/docs"               -> Some("https://example.com/docs")
//   "../about"            -> Some("https://example.com/about")
//   "#top"                -> None
//   "mailto:me@x.com"     -> None
fn resolve_href(base: Option<&Url>, href: &str) -> Option<String> {
    let href = href.trim();

    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("javascript:")
        || href.starts_with("data:")
    {
        return None;
    }

    // Already absolute: keep it as written, but only if we can fetch it
    if is_valid_url(href) {
        return is_http(href).then(|| href.to_string());
    }

    // Relative: join it onto the page URL (None when there is no base)
    let resolved = base?.join(href).ok()?.to_string();
    (is_valid_url(&resolved) && is_http(&resolved)).then_some(resolved)
}

// Only http and https pages can be fetched
//
// The url crate lowercases the scheme, so "HTTP://host/" counts too.
fn is_http(url: &str) -> bool {
    Url::parse(url).is_ok_and(|parsed| matches!(parsed.scheme(), "http" | "https"))
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is filter_map?
//    - Like map, but the closure returns Option
//    - None values are dropped, Some(x) values are unwrapped and kept
//    - Perfect for "try to convert each item, skip failures"
//
// 2. What does bool::then do?
//    - cond.then(|| value) returns Some(value) if cond is true, else None
//    - then_some(value) is the same but takes the value directly
//
// 3. What is `base?` doing inside a function returning Option?
//    - The ? operator works on Option too: None returns early with None
// -----------------------------------------------------------------------------
