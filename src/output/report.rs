//! Output error types and the per-run crawl report

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write export {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Counters collected while a run executes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// Fetch attempts, including failed and empty renders
    pub pages_fetched: u32,

    /// Renders that failed or returned empty markup
    pub failed_fetches: u32,

    pub detail_pages: u32,
    pub listing_pages: u32,

    /// Records inserted into the database during this run
    pub records_saved: u32,

    /// Detail pages skipped because the URL was already stored
    pub duplicates_skipped: u32,

    /// Detail pages without a job name
    pub rejected: u32,

    /// Pages whose processing raised an error
    pub page_errors: u32,

    /// Whether the CSV export was written
    pub export_written: bool,

    /// Whether the run ended on a stop request
    pub stopped: bool,
}

impl CrawlReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches that produced usable markup
    pub fn pages_rendered(&self) -> u32 {
        self.pages_fetched.saturating_sub(self.failed_fetches)
    }

    /// Returns the share of fetches that produced markup, as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.pages_fetched == 0 {
            return 0.0;
        }
        (self.pages_rendered() as f64 / self.pages_fetched as f64) * 100.0
    }

    /// Logs the run summary
    pub fn log_summary(&self) {
        tracing::info!("=== Crawl Summary ===");
        tracing::info!(
            "Pages fetched: {} ({} failed, {:.1}% rendered)",
            self.pages_fetched,
            self.failed_fetches,
            self.success_rate()
        );
        tracing::info!(
            "Listing pages: {}, detail pages: {}",
            self.listing_pages,
            self.detail_pages
        );
        tracing::info!(
            "Records saved: {}, already stored: {}, rejected: {}",
            self.records_saved,
            self.duplicates_skipped,
            self.rejected
        );
        if self.page_errors > 0 {
            tracing::warn!("Pages with processing errors: {}", self.page_errors);
        }
        if !self.export_written {
            tracing::warn!("CSV export was not written");
        }
        if self.stopped {
            tracing::info!("Run was stopped before the frontier was exhausted");
        }
    }
}
