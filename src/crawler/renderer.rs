//! Page rendering through a single browser session
//!
//! The crawl loop owns exactly one `PageRenderer` per run. It is obtained from
//! a `RendererFactory` when the run starts and closed on every exit path.
//! Navigation failures are reported as `RenderOutcome::Failed` and never
//! abort the run; only failing to open the session does.

use crate::config::RendererConfig;
use crate::TrawlError;
use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Scrolls near the bottom of the page so lazily loaded cards render.
/// Evaluates to false when there is no scrollable body.
const SCROLL_SCRIPT: &str = "(() => { \
    if (document.body && document.body.scrollHeight) { \
        window.scrollTo(0, document.body.scrollHeight - 1000); \
        return true; \
    } \
    return false; \
})()";

/// Result of rendering one URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Serialized DOM after the page settled
    Rendered { html: String },

    /// Navigation or capture failed
    Failed { reason: String },
}

impl RenderOutcome {
    /// Returns the markup if rendering succeeded with non-empty content
    pub fn into_html(self) -> Option<String> {
        match self {
            Self::Rendered { html } if !html.trim().is_empty() => Some(html),
            _ => None,
        }
    }

    /// Returns a description of why no usable markup was produced
    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            Self::Rendered { html } if html.trim().is_empty() => Some("empty markup"),
            Self::Rendered { .. } => None,
            Self::Failed { reason } => Some(reason.as_str()),
        }
    }
}

/// Result of the best-effort scroll step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrollOutcome {
    /// The page scrolled; lazy content may still be loading
    Scrolled,

    /// The document had no scrollable body
    NoScrollableBody,

    /// The script threw or its result could not be read
    Failed(String),
}

impl ScrollOutcome {
    /// Interprets the value returned by the scroll script
    pub fn from_script_result(value: Result<bool, String>) -> Self {
        match value {
            Ok(true) => Self::Scrolled,
            Ok(false) => Self::NoScrollableBody,
            Err(e) => Self::Failed(e),
        }
    }
}

/// An open rendering session
#[async_trait]
pub trait PageRenderer: Send {
    /// Loads `url` and returns its markup
    async fn render(&mut self, url: &str) -> RenderOutcome;

    /// Releases the session
    async fn close(self: Box<Self>) -> Result<(), TrawlError>;
}

/// Opens rendering sessions
#[async_trait]
pub trait RendererFactory: Send + Sync {
    /// Starts a new session
    ///
    /// A failure here is fatal for the run.
    async fn open(&self) -> Result<Box<dyn PageRenderer>, TrawlError>;
}

/// Launches a local Chromium and renders pages in a single tab
pub struct BrowserRendererFactory {
    config: RendererConfig,
}

impl BrowserRendererFactory {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    /// Extra Chromium switches passed on launch
    fn launch_args(&self) -> Vec<String> {
        vec![
            "--disable-blink-features=AutomationControlled".to_string(),
            format!("--user-agent={}", self.config.user_agent),
        ]
    }

    fn browser_config(&self) -> Result<BrowserConfig, TrawlError> {
        let mut builder = BrowserConfig::builder()
            .window_size(self.config.window_width, self.config.window_height)
            .request_timeout(Duration::from_secs(self.config.request_timeout_secs))
            .args(self.launch_args());

        if !self.config.headless {
            builder = builder.with_head();
        }

        builder.build().map_err(TrawlError::RendererInit)
    }
}

#[async_trait]
impl RendererFactory for BrowserRendererFactory {
    async fn open(&self) -> Result<Box<dyn PageRenderer>, TrawlError> {
        let (browser, mut handler) = Browser::launch(self.browser_config()?)
            .await
            .map_err(|e| TrawlError::RendererInit(e.to_string()))?;

        // The CDP event loop must be polled for any command to complete
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler_task.abort();
                return Err(TrawlError::RendererInit(e.to_string()));
            }
        };

        tracing::info!(
            "Browser session started ({}x{}, headless: {})",
            self.config.window_width,
            self.config.window_height,
            self.config.headless
        );

        Ok(Box::new(BrowserSession {
            browser,
            page,
            handler_task,
            settle_delay: Duration::from_millis(self.config.settle_delay_ms),
            scroll_settle_delay: Duration::from_millis(self.config.scroll_settle_delay_ms),
        }))
    }
}

/// A running Chromium instance with the one tab used for crawling
pub struct BrowserSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    settle_delay: Duration,
    scroll_settle_delay: Duration,
}

impl BrowserSession {
    async fn scroll_to_bottom(&self) -> ScrollOutcome {
        let value = match self.page.evaluate(SCROLL_SCRIPT).await {
            Ok(result) => result.into_value::<bool>().map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        ScrollOutcome::from_script_result(value)
    }
}

#[async_trait]
impl PageRenderer for BrowserSession {
    async fn render(&mut self, url: &str) -> RenderOutcome {
        if let Err(e) = self.page.goto(url).await {
            return RenderOutcome::Failed {
                reason: format!("navigation failed: {}", e),
            };
        }

        tokio::time::sleep(self.settle_delay).await;

        match self.scroll_to_bottom().await {
            ScrollOutcome::Scrolled => tokio::time::sleep(self.scroll_settle_delay).await,
            ScrollOutcome::NoScrollableBody => {
                tracing::debug!("No scrollable body on {}", url);
            }
            ScrollOutcome::Failed(e) => {
                tracing::debug!("Scroll failed on {}, continuing: {}", url, e);
            }
        }

        match self.page.content().await {
            Ok(html) => RenderOutcome::Rendered { html },
            Err(e) => RenderOutcome::Failed {
                reason: format!("failed to read page content: {}", e),
            },
        }
    }

    async fn close(self: Box<Self>) -> Result<(), TrawlError> {
        let mut session = *self;

        let closed = session
            .browser
            .close()
            .await
            .map_err(|e| TrawlError::Renderer(e.to_string()));
        if closed.is_ok() {
            if let Err(e) = session.browser.wait().await {
                tracing::debug!("Browser process did not exit cleanly: {}", e);
            }
        }
        session.handler_task.abort();

        closed.map(|_| ())
    }
}
