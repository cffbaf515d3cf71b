//! Crawler module for job board traversal
//!
//! This module contains the core crawling logic, including:
//! - Page rendering through a browser session (or plain HTTP)
//! - Listing page harvesting and pagination
//! - Multi-fallback field extraction on detail pages
//! - Overall crawl coordination

mod coordinator;
mod detail;
mod fetcher;
mod listing;
mod parser;
mod renderer;

pub use coordinator::{CrawlParams, CrawlSettings, Crawler, StopHandle};
pub use detail::{DetailExtractor, DetailOutcome, JobField};
pub use fetcher::{build_http_client, fetch_url, FetchResult, HttpRenderer, HttpRendererFactory};
pub use listing::{build_listing_url, ListingHandler, LISTING_LINK_SELECTORS};
pub use parser::{collapse_whitespace, extract_links, resolve_link};
pub use renderer::{
    BrowserRendererFactory, BrowserSession, PageRenderer, RenderOutcome, RendererFactory,
    ScrollOutcome,
};

use crate::config::{Config, RendererConfig, RendererKind};
use crate::output::CrawlReport;
use crate::storage::open_storage;
use crate::TrawlError;
use std::path::Path;

/// Builds the renderer factory selected by the configuration
pub fn renderer_factory(config: &RendererConfig) -> Box<dyn RendererFactory> {
    match config.kind {
        RendererKind::Browser => Box::new(BrowserRendererFactory::new(config.clone())),
        RendererKind::Http => Box::new(HttpRendererFactory::new(config.clone())),
    }
}

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Open the job database
/// 2. Build the renderer selected in the configuration
/// 3. Initialize a run from the crawl parameters
/// 4. Crawl until the frontier or the page budget is exhausted
/// 5. Export the accepted records
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `config_hash` - Hash of the configuration file, stored with the run
/// * `stop` - Handle that ends the crawl at the next page boundary
///
/// # Example
///
/// ```no_run
/// use job_trawl::config::load_config_with_hash;
/// use job_trawl::config::ConfigOverrides;
/// use job_trawl::crawler::{run_crawl, StopHandle};
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (config, hash) = load_config_with_hash(Path::new("trawl.toml"), &ConfigOverrides::default())?;
/// let report = run_crawl(&config, &hash, StopHandle::new()).await?;
/// println!("saved {} jobs", report.records_saved);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: &Config,
    config_hash: &str,
    stop: StopHandle,
) -> Result<CrawlReport, TrawlError> {
    let storage = open_storage(Path::new(&config.output.database_path))?;
    let settings = CrawlSettings::from_config(config, config_hash);

    let mut crawler = Crawler::new(settings, renderer_factory(&config.renderer), storage)?
        .with_stop_handle(stop);
    crawler.initialize(CrawlParams::from_config(&config.crawl))?;
    crawler.crawl().await
}
