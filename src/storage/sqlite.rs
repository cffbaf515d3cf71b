//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the JobStore trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{JobStore, StorageError, StorageResult};
use crate::storage::{JobRecord, RunRecord, RunStatus};
use crate::TrawlError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const JOB_COLUMNS: &str = "url, work_name, salary, address, content, years_experience, degree,
     hr_active_time, company_name, is_delete";

const RUN_COLUMNS: &str =
    "id, started_at, finished_at, config_hash, status, pages_fetched, records_saved";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens or creates the database at `path`
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(TrawlError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, TrawlError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, TrawlError> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn job_from_row(row: &Row<'_>) -> rusqlite::Result<JobRecord> {
    Ok(JobRecord {
        url: row.get(0)?,
        work_name: row.get(1)?,
        salary: row.get(2)?,
        address: row.get(3)?,
        content: row.get(4)?,
        years_experience: row.get(5)?,
        degree: row.get(6)?,
        hr_active_time: row.get(7)?,
        company_name: row.get(8)?,
        is_deleted: row.get::<_, i64>(9)? != 0,
    })
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(4)?)
            .unwrap_or(RunStatus::Running),
        pages_fetched: row.get(5)?,
        records_saved: row.get(6)?,
    })
}

impl JobStore for SqliteStorage {
    // ===== Persistence Gate =====

    fn exists_by_url(&self, url: &str) -> StorageResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM job_info WHERE url = ?1 AND is_delete = 0",
            params![url],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn insert(&mut self, record: &JobRecord) -> StorageResult<i64> {
        if !record.has_name() {
            return Err(StorageError::InvalidRecord(format!(
                "job at {} has no name",
                record.url
            )));
        }

        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO job_info (url, work_name, salary, address, content, years_experience,
             degree, hr_active_time, company_name, is_delete, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 0, ?10)",
            params![
                record.url,
                record.work_name,
                record.salary,
                record.address,
                record.content,
                record.years_experience,
                record.degree,
                record.hr_active_time,
                record.company_name,
                now
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn soft_delete(&mut self, url: &str) -> StorageResult<usize> {
        let affected = self.conn.execute(
            "UPDATE job_info SET is_delete = 1 WHERE url = ?1 AND is_delete = 0",
            params![url],
        )?;
        Ok(affected)
    }

    fn get_job_by_url(&self, url: &str) -> StorageResult<Option<JobRecord>> {
        let sql = format!(
            "SELECT {} FROM job_info WHERE url = ?1 AND is_delete = 0",
            JOB_COLUMNS
        );
        let job = self
            .conn
            .query_row(&sql, params![url], job_from_row)
            .optional()?;
        Ok(job)
    }

    // ===== Statistics =====

    fn count_jobs(&self) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM job_info WHERE is_delete = 0",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_deleted_jobs(&self) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM job_info WHERE is_delete = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO crawl_runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        pages_fetched: u32,
        records_saved: u32,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let affected = self.conn.execute(
            "UPDATE crawl_runs SET status = ?1, finished_at = ?2, pages_fetched = ?3,
             records_saved = ?4 WHERE id = ?5",
            params![
                status.to_db_string(),
                now,
                pages_fetched,
                records_saved,
                run_id
            ],
        )?;
        if affected == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        let sql = format!("SELECT {} FROM crawl_runs WHERE id = ?1", RUN_COLUMNS);
        self.conn
            .query_row(&sql, params![run_id], run_from_row)
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let sql = format!(
            "SELECT {} FROM crawl_runs ORDER BY id DESC LIMIT 1",
            RUN_COLUMNS
        );
        let run = self.conn.query_row(&sql, [], run_from_row).optional()?;
        Ok(run)
    }
}
