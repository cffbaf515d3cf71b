//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Job-Trawl database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track crawl runs
CREATE TABLE IF NOT EXISTS crawl_runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    pages_fetched INTEGER NOT NULL DEFAULT 0,
    records_saved INTEGER NOT NULL DEFAULT 0
);

-- Extracted job postings, soft-deleted rows keep is_delete = 1
CREATE TABLE IF NOT EXISTS job_info (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL,
    work_name TEXT NOT NULL,
    salary TEXT,
    address TEXT,
    content TEXT,
    years_experience TEXT,
    degree TEXT,
    hr_active_time TEXT,
    company_name TEXT,
    is_delete INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_job_info_active_url ON job_info(url) WHERE is_delete = 0;
CREATE INDEX IF NOT EXISTS idx_job_info_url ON job_info(url);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
