use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Run parameters supplied on the command line that replace file values
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub start_url: Option<String>,
    pub query: Option<String>,
    pub city_code: Option<String>,
    pub max_pages: Option<u32>,
}

impl ConfigOverrides {
    pub fn is_empty(&self) -> bool {
        self.start_url.is_none()
            && self.query.is_none()
            && self.city_code.is_none()
            && self.max_pages.is_none()
    }
}

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use job_trawl::config::load_config;
///
/// let config = load_config(Path::new("trawl.toml")).unwrap();
/// println!("Max pages: {}", config.crawl.max_pages);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    load_config_with_overrides(path, &ConfigOverrides::default())
}

/// Loads a configuration file, applies command-line overrides, then validates
pub fn load_config_with_overrides(
    path: &Path,
    overrides: &ConfigOverrides,
) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut config: Config = toml::from_str(&content)?;

    apply_overrides(&mut config, overrides);
    validate(&config)?;

    Ok(config)
}

/// Replaces crawl parameters with any values present in `overrides`
pub fn apply_overrides(config: &mut Config, overrides: &ConfigOverrides) {
    if let Some(start_url) = &overrides.start_url {
        config.crawl.start_url = start_url.clone();
    }
    if let Some(query) = &overrides.query {
        config.crawl.query = query.clone();
    }
    if let Some(city_code) = &overrides.city_code {
        config.crawl.city_code = city_code.clone();
    }
    if let Some(max_pages) = overrides.max_pages {
        config.crawl.max_pages = max_pages;
    }
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Stored with each crawl run so runs can be traced back to the
/// configuration that produced them.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(
    path: &Path,
    overrides: &ConfigOverrides,
) -> Result<(Config, String), ConfigError> {
    let config = load_config_with_overrides(path, overrides)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}
