//! Common types used throughout pageflow
//!
//! Shared value types passed between the controller, the fetchers and the
//! CLI.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Page Request
// ============================================================================

/// Window of items requested from a fetcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    /// Maximum number of items to return
    pub limit: usize,
    /// Number of items already fetched in the current session
    pub offset: usize,
}

impl PageRequest {
    /// Create a page request
    pub fn new(limit: usize, offset: usize) -> Self {
        Self { limit, offset }
    }

    /// Exclusive end of the requested window
    pub fn end(&self) -> usize {
        self.offset.saturating_add(self.limit)
    }
}

impl fmt::Display for PageRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "limit={} offset={}", self.limit, self.offset)
    }
}

// ============================================================================
// Page State Kind
// ============================================================================

/// Discriminant of a page state, without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageStateKind {
    /// No fetch has completed yet
    Initial,
    /// A fetch is in flight
    Loading,
    /// Last fetch returned items
    Loaded,
    /// Last fetch returned nothing
    Exhausted,
    /// Last fetch failed
    Failed,
}

impl PageStateKind {
    /// Lowercase name used in logs and CLI output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Loading => "loading",
            Self::Loaded => "loaded",
            Self::Exhausted => "exhausted",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for PageStateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_end() {
        assert_eq!(PageRequest::new(10, 20).end(), 30);
        assert_eq!(PageRequest::new(10, usize::MAX).end(), usize::MAX);
        assert_eq!(PageRequest::new(5, 0).to_string(), "limit=5 offset=0");
    }

    #[test]
    fn test_page_state_kind_serde() {
        let json = serde_json::to_string(&PageStateKind::Exhausted).unwrap();
        assert_eq!(json, "\"exhausted\"");
        let kind: PageStateKind = serde_json::from_str("\"failed\"").unwrap();
        assert_eq!(kind, PageStateKind::Failed);
        assert_eq!(PageStateKind::Loading.to_string(), "loading");
    }
}
