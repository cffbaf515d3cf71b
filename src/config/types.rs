use serde::Deserialize;

use crate::url::DEFAULT_DETAIL_MARKER;

/// Listing URL template for the default target site
pub const DEFAULT_LISTING_TEMPLATE: &str =
    "https://www.zhipin.com/web/geek/job?query={query}&city={city}&page={page}";

/// Desktop Chrome user agent presented by the browser renderer
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/129.0.6668.101 Safari/537.36";

/// Main configuration structure for Job-Trawl
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub renderer: RendererConfig,
    pub output: OutputConfig,
}

/// Crawl run parameters and politeness settings
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// First URL fetched by every run
    #[serde(rename = "start-url")]
    pub start_url: String,

    /// Search keyword substituted into the listing template
    pub query: String,

    /// Region code substituted into the listing template
    #[serde(rename = "city-code")]
    pub city_code: String,

    /// Maximum number of fetch attempts per run
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Listing URL template with `{query}`, `{city}` and `{page}` placeholders
    #[serde(rename = "listing-url-template", default = "default_listing_template")]
    pub listing_url_template: String,

    /// Path segment identifying detail pages
    #[serde(rename = "detail-marker", default = "default_detail_marker")]
    pub detail_marker: String,

    /// Pause after each processed page (milliseconds)
    #[serde(rename = "politeness-delay-ms", default = "default_politeness_delay")]
    pub politeness_delay_ms: u64,
}

/// How pages are acquired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    /// Drive a Chromium session and return the rendered DOM
    Browser,
    /// Plain HTTP GET, no JavaScript
    Http,
}

/// Page renderer settings
#[derive(Debug, Clone, Deserialize)]
pub struct RendererConfig {
    #[serde(default = "default_renderer_kind")]
    pub kind: RendererKind,

    /// Run Chromium without a visible window
    #[serde(default)]
    pub headless: bool,

    /// Wait after navigation before touching the page (milliseconds)
    #[serde(rename = "settle-delay-ms", default = "default_settle_delay")]
    pub settle_delay_ms: u64,

    /// Wait after a successful scroll (milliseconds)
    #[serde(rename = "scroll-settle-delay-ms", default = "default_scroll_settle_delay")]
    pub scroll_settle_delay_ms: u64,

    #[serde(rename = "window-width", default = "default_window_width")]
    pub window_width: u32,

    #[serde(rename = "window-height", default = "default_window_height")]
    pub window_height: u32,

    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout for browser commands and HTTP requests (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            kind: default_renderer_kind(),
            headless: false,
            settle_delay_ms: default_settle_delay(),
            scroll_settle_delay_ms: default_scroll_settle_delay(),
            window_width: default_window_width(),
            window_height: default_window_height(),
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Path of the CSV file written at the end of each run
    #[serde(rename = "export-path", default = "default_export_path")]
    pub export_path: String,
}

fn default_listing_template() -> String {
    DEFAULT_LISTING_TEMPLATE.to_string()
}

fn default_detail_marker() -> String {
    DEFAULT_DETAIL_MARKER.to_string()
}

fn default_politeness_delay() -> u64 {
    4000
}

fn default_renderer_kind() -> RendererKind {
    RendererKind::Browser
}

fn default_settle_delay() -> u64 {
    4000
}

fn default_scroll_settle_delay() -> u64 {
    3000
}

fn default_window_width() -> u32 {
    1280
}

fn default_window_height() -> u32 {
    700
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_export_path() -> String {
    "boss_zhipin_results.csv".to_string()
}
