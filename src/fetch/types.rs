//! Fetcher trait and in-process fetchers
//!
//! Defines the collaborator the controller calls to obtain a page of items.

use crate::error::{Error, Result};
use crate::types::PageRequest;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Core trait for page sources
///
/// Implementations should return fewer than `limit` items only near the end
/// of the data, and must return items in a stable order so that consecutive
/// windows never overlap within a session.
#[async_trait]
pub trait PageFetcher<T>: Send + Sync
where
    T: Send + 'static,
{
    /// Fetch up to `request.limit` items starting at `request.offset`
    async fn fetch(&self, request: PageRequest) -> Result<Vec<T>>;
}

#[async_trait]
impl<T, F> PageFetcher<T> for Arc<F>
where
    T: Send + 'static,
    F: PageFetcher<T> + ?Sized,
{
    async fn fetch(&self, request: PageRequest) -> Result<Vec<T>> {
        (**self).fetch(request).await
    }
}

// ============================================================================
// Closure Fetcher
// ============================================================================

/// Adapts an async closure into a [`PageFetcher`]
#[derive(Clone)]
pub struct FnFetcher<F> {
    f: F,
}

impl<F> FnFetcher<F> {
    /// Wrap a closure
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

/// Build a fetcher from an async closure
///
/// ```rust,ignore
/// let fetcher = fetch_fn(|req: PageRequest| async move {
///     Ok((req.offset..req.end()).collect::<Vec<usize>>())
/// });
/// ```
pub fn fetch_fn<F>(f: F) -> FnFetcher<F> {
    FnFetcher::new(f)
}

#[async_trait]
impl<T, F, Fut> PageFetcher<T> for FnFetcher<F>
where
    T: Send + 'static,
    F: Fn(PageRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<T>>> + Send + 'static,
{
    async fn fetch(&self, request: PageRequest) -> Result<Vec<T>> {
        (self.f)(request).await
    }
}

// ============================================================================
// In-Memory Fetcher
// ============================================================================

#[derive(Debug, Default)]
struct Ledger {
    requests: Vec<PageRequest>,
    fail_once_at: Option<usize>,
}

/// Serves windows of an in-memory vector
///
/// Every request is recorded, which makes this fetcher handy for asserting
/// which pages a controller asked for.
#[derive(Debug)]
pub struct VecFetcher<T> {
    items: Vec<T>,
    ledger: Mutex<Ledger>,
}

impl<T: Clone> VecFetcher<T> {
    /// Create a fetcher over the given items
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            ledger: Mutex::new(Ledger::default()),
        }
    }

    /// Fail the first request made at `offset`, then serve normally
    #[must_use]
    pub fn with_failure_at(mut self, offset: usize) -> Self {
        self.ledger.get_mut().fail_once_at = Some(offset);
        self
    }

    /// Number of items in the source
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the source holds no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Requests served so far, oldest first
    pub async fn requests(&self) -> Vec<PageRequest> {
        self.ledger.lock().await.requests.clone()
    }

    /// Number of requests served so far
    pub async fn request_count(&self) -> usize {
        self.ledger.lock().await.requests.len()
    }
}

#[async_trait]
impl<T> PageFetcher<T> for VecFetcher<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn fetch(&self, request: PageRequest) -> Result<Vec<T>> {
        let mut ledger = self.ledger.lock().await;
        ledger.requests.push(request);

        if ledger.fail_once_at == Some(request.offset) {
            ledger.fail_once_at = None;
            return Err(Error::fetch(format!(
                "simulated failure at offset {}",
                request.offset
            )));
        }

        let end = request.end().min(self.items.len());
        Ok(self
            .items
            .get(request.offset..end)
            .map(<[T]>::to_vec)
            .unwrap_or_default())
    }
}
