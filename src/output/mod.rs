//! Output module for run results
//!
//! This module handles:
//! - Exporting the records accepted during a run to CSV
//! - The per-run crawl report
//! - Database statistics for the `--stats` mode

mod export;
mod report;
pub mod stats;

pub use export::{ResultSink, CSV_HEADER};
pub use report::{CrawlReport, OutputError, OutputResult};
pub use stats::{load_statistics, print_statistics, CrawlStatistics};
