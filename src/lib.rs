//! # pageflow
//!
//! A reactive pagination controller for infinite-scroll and "Load More"
//! lists. The controller fetches pages through a pluggable fetcher, tracks
//! the offset of the current session and emits a discrete state for every
//! transition; views subscribe and draw.
//!
//! ## Features
//!
//! - **State machine**: Initial, Loading, Loaded, Exhausted and Failed states
//! - **Append mode**: `load_more()` appends pages and stops at end of data
//! - **Safe refresh**: `load()` starts a new session; stale results are dropped
//! - **Pluggable sources**: async closures, in-memory vectors, HTTP endpoints
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pageflow::{ControllerConfig, PageRequest, PaginationController, fetch_fn};
//!
//! #[tokio::main]
//! async fn main() -> pageflow::Result<()> {
//!     let fetcher = fetch_fn(|req: PageRequest| async move {
//!         Ok((req.offset..req.end()).map(|n| format!("row {n}")).collect())
//!     });
//!     let controller = PaginationController::new(fetcher, ControllerConfig::default())?;
//!
//!     let mut states = controller.subscribe().await?;
//!     controller.load().await?;
//!     controller.load_more().await?;
//!
//!     while let Some(state) = states.try_next_state() {
//!         println!("{} ({} items)", state.kind(), state.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    View (out of crate)                   │
//! │      load() / load_more() / refresh()     subscribe()    │
//! └───────────────────────────┬──────────────────────────────┘
//!                             │
//! ┌───────────────────────────┴──────────────────────────────┐
//! │                  PaginationController<T>                 │
//! │   items · offset · in-flight guard · session generation  │
//! └───────────────────────────┬──────────────────────────────┘
//!                             │ PageRequest { limit, offset }
//! ┌──────────────┬────────────┴─────────┬─────────────────────┐
//! │  FnFetcher   │      VecFetcher      │     HttpFetcher     │
//! │ async closure│   in-memory vector   │ YAML source, reqwest│
//! └──────────────┴──────────────────────┴─────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the crate
pub mod error;

/// Common types
pub mod types;

/// Pagination controller and page states
pub mod controller;

/// Page fetchers
pub mod fetch;

/// HTTP source definitions
pub mod source;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, ErrorInfo, Result};
pub use types::*;

pub use controller::{ControllerConfig, PageState, PageStateStream, PaginationController};
pub use fetch::{fetch_fn, FnFetcher, HttpFetcher, PageFetcher, VecFetcher};
pub use source::{load_source, load_source_from_str, SourceDefinition};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
