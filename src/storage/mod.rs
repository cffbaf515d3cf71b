//! Storage module for persisting crawl results
//!
//! This module handles all database operations for the crawler, including:
//! - SQLite database initialization and schema management
//! - The dedup check and insert used by the crawl loop
//! - Soft deletion of job records
//! - Run tracking

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{JobStore, StorageError, StorageResult};

use crate::TrawlError;

use std::path::Path;

/// Initializes or opens a storage database
pub fn open_storage(path: &Path) -> Result<SqliteStorage, TrawlError> {
    SqliteStorage::new(path)
}

/// One job posting extracted from a detail page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobRecord {
    /// Detail page URL, the dedup key together with `is_deleted`
    pub url: String,
    pub work_name: Option<String>,
    pub salary: Option<String>,
    pub address: Option<String>,
    /// Job description text
    pub content: Option<String>,
    pub years_experience: Option<String>,
    pub degree: Option<String>,
    /// When the recruiter was last active, as displayed by the site
    pub hr_active_time: Option<String>,
    pub company_name: Option<String>,
    pub is_deleted: bool,
}

impl JobRecord {
    /// Creates an empty record for `url`
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Returns true if the record has a non-empty job name
    ///
    /// Records without a name are never persisted.
    pub fn has_name(&self) -> bool {
        self.work_name
            .as_deref()
            .map(|name| !name.trim().is_empty())
            .unwrap_or(false)
    }
}

/// Represents a crawl run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
    pub pages_fetched: u32,
    pub records_saved: u32,
}

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Aborted,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Aborted => "aborted",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "aborted" => Some(Self::Aborted),
            _ => None,
        }
    }
}
