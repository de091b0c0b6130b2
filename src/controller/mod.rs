//! Pagination controller module
//!
//! Owns the loaded items, the fetch offset and the lifecycle state of a
//! paginated list, and emits a [`PageState`] for every transition.
//!
//! # Overview
//!
//! Views drive the controller with three commands:
//! - `load()` / `refresh()` - start a new session from offset 0
//! - `load_more()` - append the next page to the current session
//! - `retry()` - repeat whichever command just failed
//!
//! and observe it through `subscribe()` or the `state()` snapshot.
//!
//! ```text
//!  Initial ──load──▶ Loading ──ok(page)──▶ Loaded ──load_more──▶ Loading
//!                       │   ──ok([])────▶ Exhausted (load_more ignored)
//!                       └── err ────────▶ Failed  ──load_more──▶ Loading (same offset)
//! ```
//!
//! Every `load()` opens a new session generation. Results of fetches started
//! in an older generation are dropped, so the most recently issued `load()`
//! wins even if an earlier fetch resolves after it.

mod subscription;
mod types;

pub use subscription::PageStateStream;
pub use types::{ControllerConfig, PageState};

use crate::error::{Error, Result};
use crate::fetch::PageFetcher;
use crate::types::PageRequest;
use std::fmt;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, trace, warn};

/// Command remembered for `retry()`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Load,
    LoadMore,
}

/// Mutable controller state; only touched under the controller lock
struct Inner<T> {
    items: Arc<[T]>,
    offset: usize,
    state: PageState<T>,
    in_flight: bool,
    generation: u64,
    disposed: bool,
    last_command: Option<Command>,
    subscribers: Vec<mpsc::UnboundedSender<PageState<T>>>,
}

impl<T: Clone> Inner<T> {
    fn ensure_active(&self) -> Result<()> {
        if self.disposed {
            return Err(Error::Disposed);
        }
        Ok(())
    }

    fn is_current(&self, generation: u64) -> bool {
        !self.disposed && self.generation == generation
    }

    /// Outcome for a fetch that resolved after its session ended
    fn discard(&self, generation: u64) -> Result<PageState<T>> {
        if self.disposed {
            debug!("Dropping fetch result of generation {generation}: controller disposed");
            return Err(Error::Disposed);
        }
        debug!(
            "Dropping stale fetch result of generation {generation} (current {})",
            self.generation
        );
        Ok(self.state.clone())
    }

    /// Clear the in-flight flag of a fetch whose command was dropped
    fn release(&mut self, generation: u64, restore: PageState<T>) {
        if !self.is_current(generation) || !self.in_flight {
            return;
        }
        debug!("Fetch of generation {generation} cancelled, releasing in-flight flag");
        self.in_flight = false;
        self.emit(restore);
    }

    fn emit(&mut self, state: PageState<T>) {
        trace!("Emitting {} with {} items", state.kind(), state.len());
        self.subscribers.retain(|tx| tx.send(state.clone()).is_ok());
        self.state = state;
    }
}

/// Armed while a command awaits its fetch
///
/// Dropping it armed means the command future was cancelled mid-fetch; the
/// in-flight flag is cleared and `restore` is emitted in place of `Loading`.
struct FetchGuard<T>
where
    T: Clone + Send + Sync + 'static,
{
    inner: Arc<Mutex<Inner<T>>>,
    generation: u64,
    restore: Option<PageState<T>>,
}

impl<T> FetchGuard<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn new(inner: &Arc<Mutex<Inner<T>>>, generation: u64, restore: PageState<T>) -> Self {
        Self {
            inner: Arc::clone(inner),
            generation,
            restore: Some(restore),
        }
    }

    fn disarm(&mut self) {
        self.restore = None;
    }
}

impl<T> Drop for FetchGuard<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn drop(&mut self) {
        let Some(restore) = self.restore.take() else {
            return;
        };
        let generation = self.generation;

        if let Ok(mut inner) = self.inner.try_lock() {
            inner.release(generation, restore);
            return;
        }

        // Lock is contended; finish the release on the runtime
        let inner = Arc::clone(&self.inner);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    inner.lock().await.release(generation, restore);
                });
            }
            Err(_) => warn!(
                "Fetch of generation {generation} cancelled outside a runtime; in-flight flag kept"
            ),
        }
    }
}

/// Reactive pagination state machine
///
/// Commands take `&self`; share the controller through an `Arc` when a view
/// and background tasks both need it. The lock is never held while the
/// fetcher runs.
pub struct PaginationController<T>
where
    T: Clone + Send + Sync + 'static,
{
    fetcher: Arc<dyn PageFetcher<T>>,
    config: ControllerConfig,
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T> PaginationController<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a controller with an empty list
    pub fn new<F>(fetcher: F, config: ControllerConfig) -> Result<Self>
    where
        F: PageFetcher<T> + 'static,
    {
        Self::with_initial_items(fetcher, config, Vec::new())
    }

    /// Create a controller pre-seeded with a first page of items
    ///
    /// The offset starts at the number of seeded items, and the initial state
    /// is `Loaded` when any were given.
    pub fn with_initial_items<F>(
        fetcher: F,
        config: ControllerConfig,
        initial_items: Vec<T>,
    ) -> Result<Self>
    where
        F: PageFetcher<T> + 'static,
    {
        config.validate()?;

        let items: Arc<[T]> = Arc::from(initial_items);
        let state = if items.is_empty() {
            PageState::Initial
        } else {
            PageState::Loaded {
                items: Arc::clone(&items),
            }
        };
        let fetcher: Arc<dyn PageFetcher<T>> = Arc::new(fetcher);

        Ok(Self {
            fetcher,
            config,
            inner: Arc::new(Mutex::new(Inner {
                offset: items.len(),
                items,
                state,
                in_flight: false,
                generation: 0,
                disposed: false,
                last_command: None,
                subscribers: Vec::new(),
            })),
        })
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Start a new session and fetch the first page
    ///
    /// Emits `Loading` with no items, then `Loaded`, `Exhausted` or `Failed`.
    /// Never merges with items of the previous session. If the returned
    /// future is dropped before the fetch resolves, the session falls back to
    /// `Initial`.
    pub async fn load(&self) -> Result<PageState<T>> {
        let generation = {
            let mut inner = self.inner.lock().await;
            inner.ensure_active()?;

            inner.generation += 1;
            inner.offset = 0;
            inner.items = Arc::from(Vec::<T>::new());
            inner.in_flight = true;
            inner.last_command = Some(Command::Load);

            let items = Arc::clone(&inner.items);
            inner.emit(PageState::Loading { items });
            inner.generation
        };

        let request = PageRequest::new(self.config.page_size, 0);
        debug!("Loading first page ({request}), generation {generation}");
        let mut guard = FetchGuard::new(&self.inner, generation, PageState::Initial);
        let result = self.fetcher.fetch(request).await;

        let mut inner = self.inner.lock().await;
        guard.disarm();
        if !inner.is_current(generation) {
            return inner.discard(generation);
        }
        inner.in_flight = false;

        match result {
            Ok(page) if page.is_empty() => {
                debug!("First page is empty, list exhausted");
                let items = Arc::clone(&inner.items);
                inner.emit(PageState::Exhausted { items });
            }
            Ok(page) => {
                inner.offset = page.len();
                inner.items = Arc::from(page);
                let items = Arc::clone(&inner.items);
                inner.emit(PageState::Loaded { items });
            }
            Err(e) => {
                warn!("Loading first page failed: {e}");
                let items = Arc::clone(&inner.items);
                inner.emit(PageState::Failed {
                    items,
                    error: e.into(),
                });
            }
        }

        Ok(inner.state.clone())
    }

    /// Re-fetch from the start; same as [`load`](Self::load)
    pub async fn refresh(&self) -> Result<PageState<T>> {
        self.load().await
    }

    /// Fetch the next page and append it
    ///
    /// Ignored while a fetch is in flight or once the list is exhausted; the
    /// current state is returned unchanged in that case. A failure leaves the
    /// offset where it was, so the next call retries the same page. Dropping
    /// the returned future mid-fetch restores the state it started from.
    pub async fn load_more(&self) -> Result<PageState<T>> {
        let (generation, request, restore) = {
            let mut inner = self.inner.lock().await;
            inner.ensure_active()?;

            if inner.in_flight {
                debug!("load_more ignored: fetch already in flight");
                return Ok(inner.state.clone());
            }
            if inner.state.is_exhausted() {
                debug!("load_more ignored: list exhausted at offset {}", inner.offset);
                return Ok(inner.state.clone());
            }

            inner.in_flight = true;
            inner.last_command = Some(Command::LoadMore);

            let restore = inner.state.clone();
            let items = Arc::clone(&inner.items);
            inner.emit(PageState::Loading { items });
            (
                inner.generation,
                PageRequest::new(self.config.page_size, inner.offset),
                restore,
            )
        };

        debug!("Loading more ({request}), generation {generation}");
        let mut guard = FetchGuard::new(&self.inner, generation, restore);
        let result = self.fetcher.fetch(request).await;

        let mut inner = self.inner.lock().await;
        guard.disarm();
        if !inner.is_current(generation) {
            return inner.discard(generation);
        }
        inner.in_flight = false;

        match result {
            Ok(page) if page.is_empty() => {
                debug!("No more items at offset {}", inner.offset);
                let items = Arc::clone(&inner.items);
                inner.emit(PageState::Exhausted { items });
            }
            Ok(page) => {
                let added = page.len();
                let mut merged = Vec::with_capacity(inner.items.len() + added);
                merged.extend_from_slice(&inner.items);
                merged.extend(page);

                inner.offset += added;
                inner.items = Arc::from(merged);
                let items = Arc::clone(&inner.items);
                inner.emit(PageState::Loaded { items });
            }
            Err(e) => {
                warn!("Loading more at offset {} failed: {e}", request.offset);
                let items = Arc::clone(&inner.items);
                inner.emit(PageState::Failed {
                    items,
                    error: e.into(),
                });
            }
        }

        Ok(inner.state.clone())
    }

    /// Repeat the command that produced the current `Failed` state
    ///
    /// No-op in any other state.
    pub async fn retry(&self) -> Result<PageState<T>> {
        let command = {
            let inner = self.inner.lock().await;
            inner.ensure_active()?;
            if !inner.state.is_failed() {
                return Ok(inner.state.clone());
            }
            inner.last_command
        };

        match command {
            Some(Command::LoadMore) => self.load_more().await,
            Some(Command::Load) | None => self.load().await,
        }
    }

    /// Detach all subscribers and drop any pending fetch result
    ///
    /// Subscriptions end, and every later command returns
    /// [`Error::Disposed`]. Calling it twice is harmless.
    pub async fn dispose(&self) {
        let mut inner = self.inner.lock().await;
        if inner.disposed {
            return;
        }
        inner.disposed = true;
        inner.in_flight = false;
        inner.subscribers.clear();
        debug!("Pagination controller disposed at offset {}", inner.offset);
    }

    // ========================================================================
    // Observation
    // ========================================================================

    /// Subscribe to state transitions, starting with the current state
    pub async fn subscribe(&self) -> Result<PageStateStream<T>> {
        let mut inner = self.inner.lock().await;
        inner.ensure_active()?;

        let (tx, rx) = mpsc::unbounded_channel();
        // Cannot fail: the receiver is still in scope
        let _ = tx.send(inner.state.clone());
        inner.subscribers.push(tx);
        Ok(PageStateStream::new(rx))
    }

    /// Snapshot of the current state
    pub async fn state(&self) -> PageState<T> {
        self.inner.lock().await.state.clone()
    }

    /// Snapshot of the items of the current session
    pub async fn items(&self) -> Arc<[T]> {
        Arc::clone(&self.inner.lock().await.items)
    }

    /// Number of items fetched in the current session
    pub async fn offset(&self) -> usize {
        self.inner.lock().await.offset
    }

    /// Whether a fetch of the current session is in flight
    pub async fn is_in_flight(&self) -> bool {
        self.inner.lock().await.in_flight
    }

    /// Whether `dispose()` has been called
    pub async fn is_disposed(&self) -> bool {
        self.inner.lock().await.disposed
    }

    /// Number of live subscriptions
    pub async fn subscriber_count(&self) -> usize {
        let mut inner = self.inner.lock().await;
        inner.subscribers.retain(|tx| !tx.is_closed());
        inner.subscribers.len()
    }

    /// Items requested per fetch
    pub fn page_size(&self) -> usize {
        self.config.page_size
    }

    /// Controller configuration
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }
}

impl<T> fmt::Debug for PaginationController<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaginationController")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
