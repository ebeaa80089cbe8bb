// src/fetch/http.rs
// =============================================================================
// This module downloads pages over HTTP.
//
// Key functionality:
// - The `Fetcher` trait: the only thing the crawl engine knows about HTTP
// - `HttpFetcher`: the real implementation, built on a shared reqwest Client
// - `FetchError`: categorizes failures (timeout, DNS, TLS, status code, ...)
//
// Every request is bounded by the client timeout so a worker can never hang
// forever on an unresponsive host.
//
// Rust concepts:
// - async-trait: Lets a trait have async methods and still be used as
//   Arc<dyn Fetcher>
// - thiserror: Derives Display/Error for our error enum
// =============================================================================

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Default per-request timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Maximum number of redirects followed per request.
const MAX_REDIRECTS: usize = 5;

// Why a fetch failed
//
// For the crawler every variant means the same thing ("this page has no
// links"), but the category shows up in logs and in the --json output.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,
    #[error("could not resolve hostname")]
    Dns,
    #[error("SSL/TLS error")]
    Tls,
    #[error("too many redirects")]
    TooManyRedirects,
    #[error("connection failed")]
    Connect,
    #[error("HTTP {0}")]
    Status(u16),
    #[error("could not read response body: {0}")]
    Body(String),
    #[error("{0}")]
    Other(String),
}

// A downloaded page
//
// `url` is where the body actually came from. After a redirect that is not
// the URL we asked for, and relative links must be resolved against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub url: String,
    pub body: String,
}

impl FetchedPage {
    pub fn new(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            body: body.into(),
        }
    }
}

/// Downloads a page.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

// The production fetcher
//
// Client is cheap to clone (it's an Arc internally), and reusing one client
// gives us connection pooling across all workers.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    // Builds a fetcher whose every request is bounded by `timeout`
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(concat!("link-crawler/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        // Send the GET request (redirects are followed by the client)
        let response = self.client.get(url).send().await.map_err(categorize_error)?;

        // Anything other than 2xx counts as a failed fetch
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        // Remember where we ended up before .text() consumes the response
        let final_url = response.url().to_string();

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Body(e.to_string())
            }
        })?;

        Ok(FetchedPage::new(final_url, body))
    }
}

// Categorizes different error types from reqwest
//
// reqwest doesn't expose DNS or TLS failures as distinct kinds, so for those
// we fall back to looking at the error text.
fn categorize_error(error: reqwest::Error) -> FetchError {
    let error_string = error.to_string().to_lowercase();

    if error.is_timeout() {
        FetchError::Timeout
    } else if error.is_redirect() {
        FetchError::TooManyRedirects
    } else if error.is_connect() {
        if error_string.contains("dns") {
            FetchError::Dns
        } else {
            FetchError::Connect
        }
    } else if error_string.contains("certificate") || error_string.contains("ssl") {
        FetchError::Tls
    } else {
        FetchError::Other(error_string)
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a trait instead of calling reqwest directly?
//    - The crawl engine only needs "give me the body of this URL"
//    - Tests can plug in an in-memory fetcher with a fake link graph
//    - No network is needed to test the engine's concurrency logic
//
// 2. What does #[async_trait] do?
//    - It rewrites `async fn` in the trait into a method returning a boxed
//      future, which is what makes `Arc<dyn Fetcher>` possible
//
// 3. What is map_err?
//    - Converts the error inside a Result into another error type
//    - Here: reqwest::Error -> FetchError
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html><body>Hello world!</body></html>")
            .create_async()
            .await;

        let page = fetcher().fetch(&server.url()).await.unwrap();

        assert!(page.body.contains("Hello world!"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_reports_url_after_redirect() {
        let mut server = mockito::Server::new_async().await;
        let _redirect = server
            .mock("GET", "/docs")
            .with_status(301)
            .with_header("location", &format!("{}/docs/", server.url()))
            .create_async()
            .await;
        let _target = server
            .mock("GET", "/docs/")
            .with_status(200)
            .with_body("<p>docs</p>")
            .create_async()
            .await;

        let url = format!("{}/docs", server.url());
        let page = fetcher().fetch(&url).await.unwrap();

        assert_eq!(page.url, format!("{}/docs/", server.url()));
        assert!(page.body.contains("docs"));
    }

    #[tokio::test]
    async fn test_fetch_non_success_is_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .with_body("not here")
            .create_async()
            .await;

        let url = format!("{}/missing", server.url());
        let result = fetcher().fetch(&url).await;

        assert_eq!(result, Err(FetchError::Status(404)));
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host_is_error() {
        // Port 9 (discard) on localhost is essentially never listening
        let result = fetcher().fetch("http://127.0.0.1:9/").await;
        assert!(result.is_err());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(FetchError::Status(503).to_string(), "HTTP 503");
        assert_eq!(FetchError::Timeout.to_string(), "request timed out");
    }
}
