//! Job-Trawl: a focused crawler for JavaScript-rendered job boards
//!
//! This crate walks the paginated search results of a job board through a
//! single browser session, extracts one structured record per job detail
//! page, deduplicates against the database before inserting, and exports the
//! accepted records of each run to a CSV file.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Job-Trawl operations
#[derive(Debug, Error)]
pub enum TrawlError {
    #[error("Renderer failed to start: {0}")]
    RendererInit(String),

    #[error("Renderer error: {0}")]
    Renderer(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    StorageError(#[from] storage::StorageError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error("Invalid phase transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlPhase,
        to: state::CrawlPhase,
    },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Job-Trawl operations
pub type Result<T> = std::result::Result<T, TrawlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlParams, Crawler};
pub use output::CrawlReport;
pub use state::{CrawlPhase, Frontier};
pub use storage::JobRecord;
pub use self::url::{classify_page, extract_domain, PageKind};
