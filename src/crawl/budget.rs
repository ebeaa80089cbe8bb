// src/crawl/budget.rs
// =============================================================================
// The crawl budget: an optional cap on how many URLs may ever be claimed.
//
// `None` means unbounded. Using Option<usize> instead of an "infinite" number
// keeps the comparison with the claimed count a plain integer comparison.
// =============================================================================

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CrawlBudget(Option<usize>);

impl CrawlBudget {
    pub fn unbounded() -> Self {
        Self(None)
    }

    pub fn limited(max_crawls: usize) -> Self {
        Self(Some(max_crawls))
    }

    // The command line treats 0 (or nothing) as "no limit"
    pub fn from_max_crawls(max_crawls: Option<usize>) -> Self {
        match max_crawls {
            None | Some(0) => Self::unbounded(),
            Some(n) => Self::limited(n),
        }
    }

    /// True once `claimed` has reached the cap. Never true when unbounded.
    pub fn is_exhausted(&self, claimed: usize) -> bool {
        self.0.is_some_and(|cap| claimed >= cap)
    }
}

impl fmt::Display for CrawlBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(cap) => write!(f, "{}", cap),
            None => write!(f, "unbounded"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbounded_never_exhausted() {
        let budget = CrawlBudget::unbounded();
        assert!(!budget.is_exhausted(0));
        assert!(!budget.is_exhausted(usize::MAX));
        assert_eq!(budget.to_string(), "unbounded");
    }

    #[test]
    fn test_limited_exhausted_at_cap() {
        let budget = CrawlBudget::limited(3);
        assert!(!budget.is_exhausted(2));
        assert!(budget.is_exhausted(3));
    }

    #[test]
    fn test_zero_from_command_line_is_unbounded() {
        assert_eq!(CrawlBudget::from_max_crawls(Some(0)), CrawlBudget::unbounded());
        assert_eq!(CrawlBudget::from_max_crawls(None), CrawlBudget::unbounded());
        assert_eq!(CrawlBudget::from_max_crawls(Some(5)), CrawlBudget::limited(5));
    }

    #[test]
    fn test_limited_zero_is_immediately_exhausted() {
        assert!(CrawlBudget::limited(0).is_exhausted(0));
    }
}
