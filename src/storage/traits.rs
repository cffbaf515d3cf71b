//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::storage::{JobRecord, RunRecord, RunStatus};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for job record persistence
///
/// The crawl loop only needs `exists_by_url` and `insert`; the remaining
/// operations back the statistics mode and run bookkeeping.
pub trait JobStore {
    // ===== Persistence Gate =====

    /// Returns true if a record with exactly this URL exists and is not
    /// soft-deleted
    fn exists_by_url(&self, url: &str) -> StorageResult<bool>;

    /// Inserts a new record and returns its row ID
    ///
    /// There is no merge path. Callers check `exists_by_url` first.
    fn insert(&mut self, record: &JobRecord) -> StorageResult<i64>;

    /// Marks every active record for `url` as deleted
    ///
    /// Returns the number of rows affected.
    fn soft_delete(&mut self, url: &str) -> StorageResult<usize>;

    /// Gets the active record for a URL
    fn get_job_by_url(&self, url: &str) -> StorageResult<Option<JobRecord>>;

    // ===== Statistics =====

    /// Counts records that are not soft-deleted
    fn count_jobs(&self) -> StorageResult<u64>;

    /// Counts soft-deleted records
    fn count_deleted_jobs(&self) -> StorageResult<u64>;

    // ===== Run Management =====

    /// Creates a new crawl run in the `Running` state
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Records the outcome of a run with a finish timestamp
    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        pages_fetched: u32,
        records_saved: u32,
    ) -> StorageResult<()>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;
}
