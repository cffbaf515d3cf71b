//! Statistics generation from the job database
//!
//! This module provides functionality for extracting and displaying
//! job counts and the outcome of the latest run.

use crate::storage::{JobStore, RunRecord};
use crate::TrawlError;
use chrono::{DateTime, Utc};

/// Database statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Records that are not soft-deleted
    pub active_jobs: u64,

    /// Soft-deleted records
    pub deleted_jobs: u64,

    /// Most recent crawl run, if any
    pub latest_run: Option<RunRecord>,
}

impl CrawlStatistics {
    /// Wall-clock duration of the latest run in seconds, if it finished
    pub fn latest_run_duration_seconds(&self) -> Option<i64> {
        let run = self.latest_run.as_ref()?;
        let started = run.started_at.parse::<DateTime<Utc>>().ok()?;
        let finished = run.finished_at.as_ref()?.parse::<DateTime<Utc>>().ok()?;
        Some((finished - started).num_seconds())
    }
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Successfully loaded statistics
/// * `Err(TrawlError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn JobStore) -> Result<CrawlStatistics, TrawlError> {
    Ok(CrawlStatistics {
        active_jobs: storage.count_jobs()?,
        deleted_jobs: storage.count_deleted_jobs()?,
        latest_run: storage.get_latest_run()?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Job Statistics ===\n");

    println!("Records:");
    println!("  Active jobs: {}", stats.active_jobs);
    println!("  Deleted jobs: {}", stats.deleted_jobs);
    println!();

    match &stats.latest_run {
        Some(run) => {
            println!("Latest Run:");
            println!("  Run ID: {}", run.id);
            println!("  Status: {}", run.status.to_db_string());
            println!("  Started: {}", run.started_at);
            if let Some(finished) = &run.finished_at {
                println!("  Finished: {}", finished);
            }
            if let Some(duration) = stats.latest_run_duration_seconds() {
                println!(
                    "  Duration: {} seconds ({:.2} minutes)",
                    duration,
                    duration as f64 / 60.0
                );
            }
            println!("  Pages fetched: {}", run.pages_fetched);
            println!("  Records saved: {}", run.records_saved);
            println!("  Config hash: {}", run.config_hash);
        }
        None => println!("No crawl runs recorded."),
    }
}
