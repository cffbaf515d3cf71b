//! HTTP renderer implementation
//!
//! Fetches pages with a plain GET and returns the response body as-is. No
//! JavaScript runs, so this only sees markup the server sends directly. It is
//! useful against static mirrors of the target site and in tests.

use crate::config::RendererConfig;
use crate::crawler::renderer::{PageRenderer, RenderOutcome, RendererFactory};
use crate::TrawlError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Content-Type header value
        content_type: String,
        /// Page body content
        body: String,
    },

    /// Page is not HTML (Content-Type mismatch)
    ContentMismatch {
        /// The actual Content-Type received
        content_type: String,
    },

    /// Non-success HTTP status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, etc.)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    /// Converts the fetch result into a render outcome
    pub fn into_render_outcome(self) -> RenderOutcome {
        match self {
            Self::Success { body, .. } => RenderOutcome::Rendered { html: body },
            Self::ContentMismatch { content_type } => RenderOutcome::Failed {
                reason: format!("not an HTML page: {}", content_type),
            },
            Self::HttpError { status_code } => RenderOutcome::Failed {
                reason: format!("HTTP {}", status_code),
            },
            Self::NetworkError { error } => RenderOutcome::Failed { reason: error },
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The renderer configuration (user agent and timeout)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &RendererConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and classifies the response
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx with an HTML or missing Content-Type | Success |
/// | 2xx with another Content-Type | ContentMismatch |
/// | Any other status | HttpError |
/// | Timeout, refused connection, body read failure | NetworkError |
pub async fn fetch_url(client: &Client, url: &str) -> FetchResult {
    match client.get(url).send().await {
        Ok(response) => {
            let status = response.status();
            let final_url = response.url().to_string();

            if status == StatusCode::TOO_MANY_REQUESTS {
                tracing::warn!("Rate limited while fetching {}", url);
            }

            if !status.is_success() {
                return FetchResult::HttpError {
                    status_code: status.as_u16(),
                };
            }

            let content_type = response
                .headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string();

            if !content_type.is_empty() && !content_type.contains("text/html") {
                return FetchResult::ContentMismatch { content_type };
            }

            match response.text().await {
                Ok(body) => FetchResult::Success {
                    final_url,
                    status_code: status.as_u16(),
                    content_type,
                    body,
                },
                Err(e) => FetchResult::NetworkError {
                    error: e.to_string(),
                },
            }
        }
        Err(e) => {
            if e.is_timeout() {
                FetchResult::NetworkError {
                    error: "Request timeout".to_string(),
                }
            } else if e.is_connect() {
                FetchResult::NetworkError {
                    error: "Connection refused".to_string(),
                }
            } else {
                FetchResult::NetworkError {
                    error: e.to_string(),
                }
            }
        }
    }
}

/// Opens HTTP rendering sessions
pub struct HttpRendererFactory {
    config: RendererConfig,
}

impl HttpRendererFactory {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl RendererFactory for HttpRendererFactory {
    async fn open(&self) -> Result<Box<dyn PageRenderer>, TrawlError> {
        let client = build_http_client(&self.config)
            .map_err(|e| TrawlError::RendererInit(e.to_string()))?;
        Ok(Box::new(HttpRenderer::new(client)))
    }
}

/// A renderer session backed by a reqwest client
pub struct HttpRenderer {
    client: Client,
}

impl HttpRenderer {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageRenderer for HttpRenderer {
    async fn render(&mut self, url: &str) -> RenderOutcome {
        let result = fetch_url(&self.client, url).await;
        if let FetchResult::Success {
            final_url,
            status_code,
            ..
        } = &result
        {
            if final_url != url {
                tracing::debug!("{} redirected to {} ({})", url, final_url, status_code);
            }
        }
        result.into_render_outcome()
    }

    async fn close(self: Box<Self>) -> Result<(), TrawlError> {
        Ok(())
    }
}
