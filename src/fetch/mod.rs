//! Fetch module
//!
//! Supports: async closures, in-memory vectors, HTTP offset/limit endpoints
//!
//! # Overview
//!
//! The controller never talks to a data source directly. It asks a
//! [`PageFetcher`] for `limit` items at `offset` and reacts to the result.
//! This module defines that seam and ships the fetchers most applications
//! need.

mod http;
mod types;

pub use http::HttpFetcher;
pub use types::{fetch_fn, FnFetcher, PageFetcher, VecFetcher};

#[cfg(test)]
mod tests;
