//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::controller::{ControllerConfig, PageState, PaginationController};
use crate::error::{Result, ResultExt};
use crate::fetch::{HttpFetcher, VecFetcher};
use crate::source::load_source;
use crate::types::PageStateKind;
use futures::StreamExt;
use serde::Serialize;
use serde_json::{json, Value};
use std::path::Path;
use tracing::{info, warn};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Fetch {
                source,
                page_size,
                max_pages,
                retries,
            } => self.fetch(source, *page_size, *max_pages, *retries).await,
            Commands::Demo {
                total,
                page_size,
                fail_at,
                max_pages,
                retries,
            } => {
                self.demo(*total, *page_size, *fail_at, *max_pages, *retries)
                    .await
            }
            Commands::Validate { source } => self.validate(source),
        }
    }

    async fn fetch(
        &self,
        source: &Path,
        page_size: Option<usize>,
        max_pages: Option<usize>,
        retries: usize,
    ) -> Result<()> {
        let def = load_source(source)
            .with_context(|| format!("Cannot load source '{}'", source.display()))?;
        let fetcher = HttpFetcher::from_source(&def)?;
        let page_size = page_size
            .or(def.page_size)
            .unwrap_or(ControllerConfig::default().page_size);

        info!("Paging through '{}' at {}", def.name, fetcher.url());
        let controller: PaginationController<Value> =
            PaginationController::new(fetcher, ControllerConfig::new().with_page_size(page_size))?;
        self.run_controller(&controller, max_pages, retries).await
    }

    async fn demo(
        &self,
        total: usize,
        page_size: usize,
        fail_at: Option<usize>,
        max_pages: Option<usize>,
        retries: usize,
    ) -> Result<()> {
        // Ids are numbered by this harness only
        let records: Vec<Value> = (1..=total)
            .map(|id| json!({ "id": id, "title": format!("Item {id}") }))
            .collect();
        let mut fetcher = VecFetcher::new(records);
        if let Some(offset) = fail_at {
            fetcher = fetcher.with_failure_at(offset);
        }

        let controller =
            PaginationController::new(fetcher, ControllerConfig::new().with_page_size(page_size))?;
        self.run_controller(&controller, max_pages, retries).await
    }

    fn validate(&self, source: &Path) -> Result<()> {
        let def = load_source(source)
            .with_context(|| format!("Invalid source '{}'", source.display()))?;
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", json!({ "valid": true, "name": def.name, "url": def.url() }));
            }
            OutputFormat::Pretty => {
                println!("Source '{}' is valid ({})", def.name, def.url());
            }
        }
        Ok(())
    }

    /// Print every transition while driving the controller to the end
    async fn run_controller(
        &self,
        controller: &PaginationController<Value>,
        max_pages: Option<usize>,
        retries: usize,
    ) -> Result<()> {
        let mut states = controller.subscribe().await?;
        let format = self.cli.format;
        let show_items = self.cli.show_items;
        let printer = tokio::spawn(async move {
            while let Some(state) = states.next().await {
                println!("{}", render_state(&state, format, show_items));
            }
        });

        let outcome = drive(controller, max_pages, retries).await;
        controller.dispose().await;
        if let Err(e) = printer.await {
            warn!("State printer stopped unexpectedly: {e}");
        }

        let last = outcome?;
        info!("Finished in state {} with {} items", last.kind(), last.len());
        Ok(())
    }
}

/// Load the first page, then keep loading more until the list is exhausted,
/// `max_pages` pages have loaded, or a page keeps failing after `retries`
/// retries.
pub async fn drive<T>(
    controller: &PaginationController<T>,
    max_pages: Option<usize>,
    retries: usize,
) -> Result<PageState<T>>
where
    T: Clone + Send + Sync + 'static,
{
    let mut state = controller.load().await?;
    let mut pages = 0;
    let mut failures = 0;

    loop {
        match state.kind() {
            PageStateKind::Exhausted => break,
            PageStateKind::Failed => {
                if failures >= retries {
                    warn!("Giving up after {failures} retries");
                    break;
                }
                failures += 1;
                state = controller.retry().await?;
                continue;
            }
            _ => {}
        }

        pages += 1;
        failures = 0;
        if max_pages.is_some_and(|max| pages >= max) {
            break;
        }
        state = controller.load_more().await?;
    }

    Ok(state)
}

#[derive(Serialize)]
struct StateLine<'a, T> {
    state: PageStateKind,
    count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    items: Option<&'a [T]>,
}

/// Render one state as a line of output
pub fn render_state<T: Serialize>(
    state: &PageState<T>,
    format: OutputFormat,
    show_items: bool,
) -> String {
    match format {
        OutputFormat::Json => {
            let line = StateLine {
                state: state.kind(),
                count: state.len(),
                error: state.error().map(|e| e.message()),
                items: show_items.then(|| state.items()),
            };
            serde_json::to_string(&line).unwrap_or_else(|e| {
                warn!("Cannot render {} state: {e}", state.kind());
                json!({ "error": e.to_string() }).to_string()
            })
        }
        OutputFormat::Pretty => {
            let mut line = format!("{:<10} {:>6} items", state.kind().as_str(), state.len());
            if let Some(error) = state.error() {
                line.push_str(&format!("  error: {error}"));
            }
            if show_items {
                for item in state.items() {
                    match serde_json::to_string(item) {
                        Ok(rendered) => line.push_str(&format!("\n  {rendered}")),
                        Err(e) => warn!("Cannot render item: {e}"),
                    }
                }
            }
            line
        }
    }
}
