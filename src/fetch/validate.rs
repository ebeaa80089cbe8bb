// src/fetch/validate.rs
// =============================================================================
// URL validity checking.
//
// A URL is only ever crawled if it is a well-structured absolute URL:
// it must parse, have a scheme, and have a non-empty host.
//
// Two URLs are the same page only if their strings are identical. We do NOT
// normalize (trailing slashes, query order and fragments all matter).
// =============================================================================

use url::Url;

// Tests a string to determine if it is a well-structured absolute URL
//
// Examples:
//   "http://www.example.com" -> true
//   "www.example.com"        -> false (no scheme, so it is a relative path)
//   "https://"               -> false (no host)
//   "mailto:me@example.com"  -> false (no host)
pub fn is_valid_url(candidate: &str) -> bool {
    if candidate.is_empty() {
        return false;
    }

    match Url::parse(candidate) {
        Ok(url) => !url.scheme().is_empty() && url.host_str().is_some_and(|h| !h.is_empty()),
        Err(_) => false,
    }
}
