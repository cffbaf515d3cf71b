//! Configuration module for Job-Trawl
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use job_trawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("trawl.toml")).unwrap();
//! println!("Crawling '{}' for up to {} pages", config.crawl.query, config.crawl.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlConfig, OutputConfig, RendererConfig, RendererKind, DEFAULT_LISTING_TEMPLATE,
    DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{
    apply_overrides, compute_config_hash, load_config, load_config_with_hash,
    load_config_with_overrides, ConfigOverrides,
};
