//! Controller types
//!
//! Page states emitted to subscribers and controller configuration.

use crate::error::{Error, ErrorInfo, Result};
use crate::types::PageStateKind;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ============================================================================
// Page State
// ============================================================================

/// State of a paginated list, as seen by subscribers
///
/// Items are shared snapshots: cloning a state never copies the list, and
/// consumers cannot mutate the controller's items through it.
#[derive(Debug, Clone, PartialEq)]
pub enum PageState<T> {
    /// No fetch has completed yet
    Initial,
    /// A fetch is in flight
    Loading {
        /// Items accumulated so far (empty on a fresh load)
        items: Arc<[T]>,
    },
    /// The last fetch returned a non-empty page
    Loaded {
        /// All items of the session
        items: Arc<[T]>,
    },
    /// The last fetch returned an empty page
    Exhausted {
        /// All items of the session
        items: Arc<[T]>,
    },
    /// The last fetch failed
    Failed {
        /// Items retained from before the failed attempt
        items: Arc<[T]>,
        /// What the fetcher raised
        error: ErrorInfo,
    },
}

impl<T> PageState<T> {
    /// Payload-free discriminant
    pub fn kind(&self) -> PageStateKind {
        match self {
            Self::Initial => PageStateKind::Initial,
            Self::Loading { .. } => PageStateKind::Loading,
            Self::Loaded { .. } => PageStateKind::Loaded,
            Self::Exhausted { .. } => PageStateKind::Exhausted,
            Self::Failed { .. } => PageStateKind::Failed,
        }
    }

    /// Items carried by this state
    pub fn items(&self) -> &[T] {
        match self {
            Self::Initial => &[],
            Self::Loading { items }
            | Self::Loaded { items }
            | Self::Exhausted { items }
            | Self::Failed { items, .. } => &items[..],
        }
    }

    /// Number of items carried by this state
    pub fn len(&self) -> usize {
        self.items().len()
    }

    /// Whether this state carries no items
    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    /// Check if this is the initial state
    pub fn is_initial(&self) -> bool {
        matches!(self, Self::Initial)
    }

    /// Check if a fetch is in flight
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    /// Check if a fetch is appending to existing items
    pub fn is_appending(&self) -> bool {
        matches!(self, Self::Loading { items } if !items.is_empty())
    }

    /// Check if this is the loaded state
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded { .. })
    }

    /// Check if the source has run out of items
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }

    /// Check if the last fetch failed
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Error of a failed state
    pub fn error(&self) -> Option<&ErrorInfo> {
        match self {
            Self::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

// ============================================================================
// Controller Config
// ============================================================================

/// Configuration for a pagination controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Number of items requested per fetch
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page_size() -> usize {
    10
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

impl ControllerConfig {
    /// Create a new controller config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set page size
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Check that the config can drive a controller
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::invalid_value(
                "page_size",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}
