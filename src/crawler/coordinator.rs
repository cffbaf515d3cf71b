//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that coordinates:
//! - Building fresh per-run state from the run parameters
//! - Pulling URLs from the frontier and rendering them
//! - Routing rendered pages to the listing handler or detail extractor
//! - Gating inserts on the database dedup check
//! - Closing the renderer, exporting results, and recording the run

use crate::config::{Config, CrawlConfig};
use crate::crawler::detail::{DetailExtractor, DetailOutcome};
use crate::crawler::listing::ListingHandler;
use crate::crawler::parser::extract_links;
use crate::crawler::renderer::{PageRenderer, RendererFactory};
use crate::output::{CrawlReport, ResultSink};
use crate::state::{CrawlPhase, Frontier};
use crate::storage::{JobStore, RunStatus};
use crate::url::{classify_page, DomainScope, PageKind};
use crate::TrawlError;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Parameters of a single crawl run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlParams {
    pub start_url: String,
    pub query: String,
    pub city_code: String,
    pub max_pages: u32,
}

impl CrawlParams {
    pub fn from_config(config: &CrawlConfig) -> Self {
        Self {
            start_url: config.start_url.clone(),
            query: config.query.clone(),
            city_code: config.city_code.clone(),
            max_pages: config.max_pages,
        }
    }
}

/// Settings shared by every run of one crawler
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    pub listing_url_template: String,
    pub detail_marker: String,
    pub politeness_delay: Duration,
    pub export_path: PathBuf,
    /// Stored with each run record
    pub config_hash: String,
}

impl CrawlSettings {
    pub fn from_config(config: &Config, config_hash: impl Into<String>) -> Self {
        Self {
            listing_url_template: config.crawl.listing_url_template.clone(),
            detail_marker: config.crawl.detail_marker.clone(),
            politeness_delay: Duration::from_millis(config.crawl.politeness_delay_ms),
            export_path: PathBuf::from(&config.output.export_path),
            config_hash: config_hash.into(),
        }
    }
}

/// Requests a running crawl to stop at the next page boundary
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Everything that belongs to one run. Replaced wholesale by `initialize`.
struct CrawlState {
    params: CrawlParams,
    frontier: Frontier,
    scope: DomainScope,
}

/// Crawls one job board search through a single renderer session
pub struct Crawler<S: JobStore> {
    settings: CrawlSettings,
    renderer_factory: Box<dyn RendererFactory>,
    store: S,
    listing: ListingHandler,
    detail: DetailExtractor,
    phase: CrawlPhase,
    state: Option<CrawlState>,
    stop: StopHandle,
}

impl<S: JobStore> Crawler<S> {
    /// Creates an idle crawler
    ///
    /// Fails if any of the built-in selectors does not compile.
    pub fn new(
        settings: CrawlSettings,
        renderer_factory: Box<dyn RendererFactory>,
        store: S,
    ) -> Result<Self, TrawlError> {
        let listing =
            ListingHandler::new(&settings.listing_url_template, &settings.detail_marker)?;
        let detail = DetailExtractor::new()?;

        Ok(Self {
            settings,
            renderer_factory,
            store,
            listing,
            detail,
            phase: CrawlPhase::Idle,
            state: None,
            stop: StopHandle::new(),
        })
    }

    /// Uses an externally owned stop handle
    pub fn with_stop_handle(mut self, stop: StopHandle) -> Self {
        self.stop = stop;
        self
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Prepares a run, discarding any state left by a previous one
    pub fn initialize(&mut self, params: CrawlParams) -> Result<(), TrawlError> {
        let scope = DomainScope::from_start_url(&params.start_url);
        match &scope {
            DomainScope::Restricted(domain) => {
                tracing::info!("Following links within {}", domain);
            }
            DomainScope::Unrestricted => {
                tracing::warn!(
                    "Start URL {} has no usable host, domain filtering is disabled",
                    params.start_url
                );
            }
        }

        let state = CrawlState {
            frontier: Frontier::new(params.max_pages),
            scope,
            params,
        };

        self.transition(CrawlPhase::Initialized)?;
        self.state = Some(state);
        Ok(())
    }

    /// Runs the crawl until the frontier is exhausted, the page budget is
    /// spent, or a stop is requested
    ///
    /// Per-page failures are logged and counted in the report. The only
    /// error returned after initialization is a renderer that fails to open.
    pub async fn crawl(&mut self) -> Result<CrawlReport, TrawlError> {
        let mut state = match (self.phase, self.state.take()) {
            (CrawlPhase::Initialized, Some(state)) => state,
            (phase, _) => {
                return Err(TrawlError::InvalidTransition {
                    from: phase,
                    to: CrawlPhase::Running,
                })
            }
        };

        state.frontier.enqueue(state.params.start_url.clone());
        let run_id = self.begin_run();

        let mut session = match self.renderer_factory.open().await {
            Ok(session) => session,
            Err(e) => {
                tracing::error!("Failed to start renderer: {}", e);
                self.transition(CrawlPhase::Aborted)?;
                self.end_run(run_id, RunStatus::Aborted, &CrawlReport::new());
                return Err(e);
            }
        };
        self.transition(CrawlPhase::Running)?;

        tracing::info!(
            "Starting crawl for '{}' in {} (max {} pages)",
            state.params.query,
            state.params.city_code,
            state.params.max_pages
        );

        let mut report = CrawlReport::new();
        let mut sink = ResultSink::new();
        self.run_loop(&mut state, session.as_mut(), &mut sink, &mut report)
            .await;

        if let Err(e) = session.close().await {
            tracing::warn!("Failed to close renderer: {}", e);
        }

        match sink.write_csv(&self.settings.export_path) {
            Ok(rows) => {
                report.export_written = true;
                tracing::info!(
                    "Exported {} records to {}",
                    rows,
                    self.settings.export_path.display()
                );
            }
            Err(e) => tracing::error!("Export failed: {}", e),
        }

        self.end_run(run_id, RunStatus::Completed, &report);
        self.transition(CrawlPhase::Finished)?;
        report.log_summary();

        Ok(report)
    }

    async fn run_loop(
        &mut self,
        state: &mut CrawlState,
        session: &mut dyn PageRenderer,
        sink: &mut ResultSink,
        report: &mut CrawlReport,
    ) {
        while !state.frontier.is_exhausted() {
            if self.stop.is_stopped() {
                tracing::info!("Stop requested, ending crawl");
                report.stopped = true;
                break;
            }

            let url = match state.frontier.take() {
                Some(url) => url,
                None => break,
            };
            if state.frontier.is_visited(&url) {
                continue;
            }

            tracing::info!(
                "Crawling page {}/{}: {}",
                state.frontier.fetched() + 1,
                state.frontier.max_pages(),
                url
            );

            let outcome = session.render(&url).await;
            state.frontier.mark_visited(&url);
            report.pages_fetched += 1;

            if let Some(reason) = outcome.failure_reason() {
                tracing::warn!("Failed to render {}: {}", url, reason);
                report.failed_fetches += 1;
                continue;
            }
            let html = outcome.into_html().unwrap_or_default();

            if let Err(e) = self.process_page(state, &url, &html, sink, report) {
                tracing::error!("Error processing {}: {}", url, e);
                report.page_errors += 1;
            }

            tokio::time::sleep(self.settings.politeness_delay).await;
        }

        if state.frontier.budget_spent() {
            tracing::info!("Page budget of {} reached", state.frontier.max_pages());
        } else if !report.stopped {
            tracing::info!("Frontier is empty, crawl complete");
        }
    }

    /// Handles one rendered page
    fn process_page(
        &mut self,
        state: &mut CrawlState,
        url: &str,
        html: &str,
        sink: &mut ResultSink,
        report: &mut CrawlReport,
    ) -> Result<(), TrawlError> {
        let base_url = Url::parse(url)?;
        let links = extract_links(html, &base_url, &state.scope);
        let kind = classify_page(url, &self.settings.detail_marker);

        let discovered = match kind {
            PageKind::Detail => {
                report.detail_pages += 1;
                self.handle_detail(url, html, sink, report)?;
                links
            }
            PageKind::Listing => {
                report.listing_pages += 1;
                let mut harvested = self.listing.harvest_detail_links(html, &base_url);
                tracing::info!("Found {} job links on {}", harvested.len(), url);
                harvested.extend(links);
                harvested
            }
        };

        let queued = self.merge_detail_links(state, discovered);
        tracing::debug!("Queued {} new detail pages from {}", queued, url);

        if kind == PageKind::Listing {
            self.enqueue_next_listing(state);
        }

        Ok(())
    }

    fn handle_detail(
        &mut self,
        url: &str,
        html: &str,
        sink: &mut ResultSink,
        report: &mut CrawlReport,
    ) -> Result<(), TrawlError> {
        if self.store.exists_by_url(url)? {
            tracing::debug!("Already stored, skipping {}", url);
            report.duplicates_skipped += 1;
            return Ok(());
        }

        match self.detail.extract(html, url) {
            DetailOutcome::Accepted(record) => {
                self.store.insert(&record)?;
                tracing::info!(
                    "Saved job '{}' from {}",
                    record.work_name.as_deref().unwrap_or_default(),
                    url
                );
                report.records_saved += 1;
                sink.push(record);
            }
            DetailOutcome::Rejected { url, reason } => {
                tracing::warn!("Rejected {}: {}", url, reason);
                report.rejected += 1;
            }
        }

        Ok(())
    }

    /// Adds unvisited in-scope detail links to the frontier
    fn merge_detail_links(&self, state: &mut CrawlState, links: Vec<String>) -> usize {
        links
            .into_iter()
            .filter(|link| classify_page(link, &self.settings.detail_marker).is_detail())
            .filter(|link| state.scope.allows(link))
            .filter(|link| state.frontier.enqueue(link.as_str()))
            .count()
    }

    fn enqueue_next_listing(&self, state: &mut CrawlState) {
        let page = state.frontier.advance_listing_page();
        let next_url =
            self.listing
                .next_listing_url(&state.params.query, &state.params.city_code, page);

        if !state.frontier.within_budget(page) {
            tracing::debug!("Listing page {} is beyond the page budget", page);
            return;
        }
        if state.frontier.is_visited(&next_url) {
            return;
        }
        if state.frontier.enqueue(next_url.as_str()) {
            tracing::debug!("Queued listing page {}: {}", page, next_url);
        }
    }

    fn transition(&mut self, next: CrawlPhase) -> Result<(), TrawlError> {
        if !self.phase.can_transition_to(next) {
            return Err(TrawlError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        tracing::debug!("Crawler phase {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }

    fn begin_run(&mut self) -> Option<i64> {
        match self.store.create_run(&self.settings.config_hash) {
            Ok(run_id) => {
                tracing::debug!("Recording crawl run {}", run_id);
                Some(run_id)
            }
            Err(e) => {
                tracing::warn!("Failed to record run start: {}", e);
                None
            }
        }
    }

    fn end_run(&mut self, run_id: Option<i64>, status: RunStatus, report: &CrawlReport) {
        let Some(run_id) = run_id else {
            return;
        };
        if let Err(e) = self.store.finish_run(
            run_id,
            status,
            report.pages_fetched,
            report.records_saved,
        ) {
            tracing::warn!("Failed to record run {} outcome: {}", run_id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::renderer::RenderOutcome;
    use crate::storage::{JobRecord, RunRecord, SqliteStorage, StorageError, StorageResult};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tempfile::TempDir;

    const START: &str = "https://www.zhipin.com/web/geek/job?query=Java&city=101300600";
    const PAGE_2: &str = "https://www.zhipin.com/web/geek/job?query=Java&city=101300600&page=2";

    fn detail_url(id: u32) -> String {
        format!("https://www.zhipin.com/job_detail/{}.html", id)
    }

    fn listing_html(links: &[String]) -> String {
        let cards: String = links
            .iter()
            .map(|link| format!(r#"<li><a class="job-card-left" href="{}">job</a></li>"#, link))
            .collect();
        format!("<html><body><ul>{}</ul></body></html>", cards)
    }

    fn detail_html(name: &str, links: &[String]) -> String {
        let anchors: String = links
            .iter()
            .map(|link| format!(r#"<a href="{}">more</a>"#, link))
            .collect();
        format!(
            r#"<html><body><div class="name"><h1>{}</h1><span class="salary">10-15K</span></div>{}</body></html>"#,
            name, anchors
        )
    }

    #[derive(Clone, Default)]
    struct Script {
        pages: Arc<HashMap<String, String>>,
        rendered: Arc<Mutex<Vec<String>>>,
        closed: Arc<AtomicBool>,
    }

    impl Script {
        fn new(pages: Vec<(String, String)>) -> Self {
            Self {
                pages: Arc::new(pages.into_iter().collect()),
                ..Self::default()
            }
        }

        fn rendered(&self) -> Vec<String> {
            self.rendered.lock().unwrap().clone()
        }
    }

    struct ScriptedFactory {
        script: Script,
        fail_open: bool,
    }

    #[async_trait]
    impl RendererFactory for ScriptedFactory {
        async fn open(&self) -> Result<Box<dyn PageRenderer>, TrawlError> {
            if self.fail_open {
                return Err(TrawlError::RendererInit("no browser".to_string()));
            }
            Ok(Box::new(ScriptedRenderer {
                script: self.script.clone(),
            }))
        }
    }

    struct ScriptedRenderer {
        script: Script,
    }

    #[async_trait]
    impl PageRenderer for ScriptedRenderer {
        async fn render(&mut self, url: &str) -> RenderOutcome {
            self.script.rendered.lock().unwrap().push(url.to_string());
            match self.script.pages.get(url) {
                Some(html) => RenderOutcome::Rendered { html: html.clone() },
                None => RenderOutcome::Failed {
                    reason: "no such page".to_string(),
                },
            }
        }

        async fn close(self: Box<Self>) -> Result<(), TrawlError> {
            self.script.closed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    fn settings(dir: &TempDir) -> CrawlSettings {
        CrawlSettings {
            listing_url_template: crate::config::DEFAULT_LISTING_TEMPLATE.to_string(),
            detail_marker: crate::url::DEFAULT_DETAIL_MARKER.to_string(),
            politeness_delay: Duration::ZERO,
            export_path: dir.path().join("results.csv"),
            config_hash: "test".to_string(),
        }
    }

    fn params(max_pages: u32) -> CrawlParams {
        CrawlParams {
            start_url: START.to_string(),
            query: "Java".to_string(),
            city_code: "101300600".to_string(),
            max_pages,
        }
    }

    fn crawler(dir: &TempDir, script: &Script) -> Crawler<SqliteStorage> {
        let factory = ScriptedFactory {
            script: script.clone(),
            fail_open: false,
        };
        Crawler::new(
            settings(dir),
            Box::new(factory),
            SqliteStorage::new_in_memory().unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_crawl_requires_initialize() {
        let dir = TempDir::new().unwrap();
        let mut crawler = crawler(&dir, &Script::default());
        let result = crawler.crawl().await;
        assert!(matches!(
            result,
            Err(TrawlError::InvalidTransition {
                from: CrawlPhase::Idle,
                to: CrawlPhase::Running
            })
        ));
    }

    #[tokio::test]
    async fn test_listing_then_details() {
        let dir = TempDir::new().unwrap();
        let details = vec![detail_url(1), detail_url(2)];
        let script = Script::new(vec![
            (START.to_string(), listing_html(&details)),
            (detail_url(1), detail_html("Java开发", &[])),
            (detail_url(2), detail_html("Java架构师", &[])),
        ]);
        let mut crawler = crawler(&dir, &script);
        crawler.initialize(params(10)).unwrap();

        let report = crawler.crawl().await.unwrap();

        assert_eq!(
            script.rendered(),
            vec![START.to_string(), detail_url(1), detail_url(2), PAGE_2.to_string()]
        );
        assert_eq!(report.listing_pages, 1);
        assert_eq!(report.detail_pages, 2);
        assert_eq!(report.records_saved, 2);
        assert_eq!(report.failed_fetches, 1);
        assert!(report.export_written);
        assert_eq!(crawler.store().count_jobs().unwrap(), 2);
        assert_eq!(crawler.phase(), CrawlPhase::Finished);
        assert!(script.closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_page_budget_is_respected() {
        let dir = TempDir::new().unwrap();
        let details: Vec<String> = (1..=10).map(detail_url).collect();
        let mut pages = vec![(START.to_string(), listing_html(&details))];
        for (i, url) in details.iter().enumerate() {
            pages.push((url.clone(), detail_html(&format!("岗位{}", i), &[])));
        }
        let script = Script::new(pages);
        let mut crawler = crawler(&dir, &script);
        crawler.initialize(params(3)).unwrap();

        let report = crawler.crawl().await.unwrap();

        assert_eq!(script.rendered().len(), 3);
        assert_eq!(report.pages_fetched, 3);
        assert_eq!(report.records_saved, 2);
    }

    #[tokio::test]
    async fn test_no_url_is_fetched_twice() {
        let dir = TempDir::new().unwrap();
        let script = Script::new(vec![
            (START.to_string(), listing_html(&[detail_url(1), detail_url(2)])),
            (
                detail_url(1),
                detail_html("A", &[detail_url(2), START.to_string(), detail_url(1)]),
            ),
            (detail_url(2), detail_html("B", &[detail_url(1)])),
        ]);
        let mut crawler = crawler(&dir, &script);
        crawler.initialize(params(50)).unwrap();
        crawler.crawl().await.unwrap();

        let rendered = script.rendered();
        let unique: std::collections::HashSet<_> = rendered.iter().collect();
        assert_eq!(unique.len(), rendered.len());
        assert_eq!(rendered.len(), 4);
    }

    #[tokio::test]
    async fn test_empty_render_is_visited_and_skipped() {
        let dir = TempDir::new().unwrap();
        let script = Script::new(vec![(START.to_string(), String::new())]);
        let mut crawler = crawler(&dir, &script);
        crawler.initialize(params(5)).unwrap();

        let report = crawler.crawl().await.unwrap();

        assert_eq!(script.rendered(), vec![START.to_string()]);
        assert_eq!(report.pages_fetched, 1);
        assert_eq!(report.failed_fetches, 1);
        assert_eq!(report.listing_pages, 0);
        assert_eq!(report.records_saved, 0);
    }

    #[tokio::test]
    async fn test_listing_without_cards_still_paginates() {
        let dir = TempDir::new().unwrap();
        let script = Script::new(vec![(
            START.to_string(),
            "<html><body><p>暂无职位</p></body></html>".to_string(),
        )]);
        let mut crawler = crawler(&dir, &script);
        crawler.initialize(params(2)).unwrap();
        crawler.crawl().await.unwrap();

        assert_eq!(script.rendered(), vec![START.to_string(), PAGE_2.to_string()]);
    }

    #[tokio::test]
    async fn test_nameless_detail_is_rejected() {
        let dir = TempDir::new().unwrap();
        let script = Script::new(vec![
            (START.to_string(), listing_html(&[detail_url(1)])),
            (
                detail_url(1),
                r#"<html><body><span class="salary">10K</span></body></html>"#.to_string(),
            ),
        ]);
        let mut crawler = crawler(&dir, &script);
        crawler.initialize(params(5)).unwrap();

        let report = crawler.crawl().await.unwrap();

        assert_eq!(report.rejected, 1);
        assert_eq!(report.records_saved, 0);
        assert_eq!(crawler.store().count_jobs().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_stored_url_is_not_inserted_again() {
        let dir = TempDir::new().unwrap();
        let script = Script::new(vec![
            (START.to_string(), listing_html(&[detail_url(1), detail_url(2)])),
            (detail_url(1), detail_html("新名称", &[])),
            (detail_url(2), detail_html("B", &[])),
        ]);
        let mut store = SqliteStorage::new_in_memory().unwrap();
        store
            .insert(&JobRecord {
                work_name: Some("旧名称".to_string()),
                ..JobRecord::new(detail_url(1))
            })
            .unwrap();
        let factory = ScriptedFactory {
            script: script.clone(),
            fail_open: false,
        };
        let mut crawler = Crawler::new(settings(&dir), Box::new(factory), store).unwrap();
        crawler.initialize(params(10)).unwrap();

        let report = crawler.crawl().await.unwrap();

        assert_eq!(report.duplicates_skipped, 1);
        assert_eq!(report.records_saved, 1);
        let store = crawler.into_store();
        assert_eq!(store.count_jobs().unwrap(), 2);
        let kept = store.get_job_by_url(&detail_url(1)).unwrap().unwrap();
        assert_eq!(kept.work_name.as_deref(), Some("旧名称"));

        let csv = std::fs::read_to_string(dir.path().join("results.csv")).unwrap();
        assert_eq!(csv.lines().count(), 2);
        assert!(!csv.contains("新名称"));
    }

    #[tokio::test]
    async fn test_offsite_links_are_not_followed() {
        let dir = TempDir::new().unwrap();
        let offsite = "https://jobs.example.com/job_detail/9.html".to_string();
        let script = Script::new(vec![(
            START.to_string(),
            listing_html(&[offsite.clone(), detail_url(1)]),
        )]);
        let mut crawler = crawler(&dir, &script);
        crawler.initialize(params(3)).unwrap();
        crawler.crawl().await.unwrap();

        assert!(!script.rendered().contains(&offsite));
        assert!(script.rendered().contains(&detail_url(1)));
    }

    #[tokio::test]
    async fn test_renderer_open_failure_aborts() {
        let dir = TempDir::new().unwrap();
        let factory = ScriptedFactory {
            script: Script::default(),
            fail_open: true,
        };
        let mut crawler = Crawler::new(
            settings(&dir),
            Box::new(factory),
            SqliteStorage::new_in_memory().unwrap(),
        )
        .unwrap();
        crawler.initialize(params(5)).unwrap();

        let result = crawler.crawl().await;

        assert!(matches!(result, Err(TrawlError::RendererInit(_))));
        assert_eq!(crawler.phase(), CrawlPhase::Aborted);
        let run = crawler.store().get_latest_run().unwrap().unwrap();
        assert_eq!(run.status, RunStatus::Aborted);
        assert!(!dir.path().join("results.csv").exists());
    }

    #[tokio::test]
    async fn test_stop_before_first_page() {
        let dir = TempDir::new().unwrap();
        let script = Script::new(vec![(START.to_string(), listing_html(&[]))]);
        let mut crawler = crawler(&dir, &script);
        crawler.initialize(params(5)).unwrap();
        crawler.stop_handle().stop();

        let report = crawler.crawl().await.unwrap();

        assert!(report.stopped);
        assert_eq!(report.pages_fetched, 0);
        assert!(script.rendered().is_empty());
        assert!(script.closed.load(Ordering::SeqCst));
        assert!(report.export_written);
    }

    #[tokio::test]
    async fn test_reinitialize_starts_fresh() {
        let dir = TempDir::new().unwrap();
        let script = Script::new(vec![(START.to_string(), listing_html(&[]))]);
        let mut crawler = crawler(&dir, &script);

        crawler.initialize(params(1)).unwrap();
        crawler.crawl().await.unwrap();
        crawler.initialize(params(1)).unwrap();
        crawler.crawl().await.unwrap();

        assert_eq!(script.rendered(), vec![START.to_string(), START.to_string()]);
        assert_eq!(crawler.phase(), CrawlPhase::Finished);
    }

    #[tokio::test]
    async fn test_crawl_twice_without_initialize_fails() {
        let dir = TempDir::new().unwrap();
        let script = Script::new(vec![(START.to_string(), listing_html(&[]))]);
        let mut crawler = crawler(&dir, &script);
        crawler.initialize(params(1)).unwrap();
        crawler.crawl().await.unwrap();

        assert!(matches!(
            crawler.crawl().await,
            Err(TrawlError::InvalidTransition { .. })
        ));
    }

    /// Store whose dedup check fails for one URL
    struct FailingLookupStore {
        inner: SqliteStorage,
        failing_url: String,
    }

    impl JobStore for FailingLookupStore {
        fn exists_by_url(&self, url: &str) -> StorageResult<bool> {
            if url == self.failing_url {
                return Err(StorageError::InvalidRecord("lookup failed".to_string()));
            }
            self.inner.exists_by_url(url)
        }

        fn insert(&mut self, record: &JobRecord) -> StorageResult<i64> {
            self.inner.insert(record)
        }

        fn soft_delete(&mut self, url: &str) -> StorageResult<usize> {
            self.inner.soft_delete(url)
        }

        fn get_job_by_url(&self, url: &str) -> StorageResult<Option<JobRecord>> {
            self.inner.get_job_by_url(url)
        }

        fn count_jobs(&self) -> StorageResult<u64> {
            self.inner.count_jobs()
        }

        fn count_deleted_jobs(&self) -> StorageResult<u64> {
            self.inner.count_deleted_jobs()
        }

        fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
            self.inner.create_run(config_hash)
        }

        fn finish_run(
            &mut self,
            run_id: i64,
            status: RunStatus,
            pages_fetched: u32,
            records_saved: u32,
        ) -> StorageResult<()> {
            self.inner.finish_run(run_id, status, pages_fetched, records_saved)
        }

        fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
            self.inner.get_run(run_id)
        }

        fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
            self.inner.get_latest_run()
        }
    }

    #[tokio::test]
    async fn test_page_error_does_not_stop_the_run() {
        let dir = TempDir::new().unwrap();
        let details = vec![detail_url(1), detail_url(2)];
        let script = Script::new(vec![
            (START.to_string(), listing_html(&details)),
            (detail_url(1), detail_html("Java开发", &[])),
            (detail_url(2), detail_html("Java架构师", &[])),
        ]);
        let store = FailingLookupStore {
            inner: SqliteStorage::new_in_memory().unwrap(),
            failing_url: detail_url(1),
        };
        let factory = ScriptedFactory {
            script: script.clone(),
            fail_open: false,
        };
        let mut crawler = Crawler::new(settings(&dir), Box::new(factory), store).unwrap();
        crawler.initialize(params(10)).unwrap();

        let report = crawler.crawl().await.unwrap();

        assert_eq!(report.page_errors, 1);
        assert_eq!(report.detail_pages, 2);
        assert_eq!(report.records_saved, 1);
        assert!(report.export_written);
        assert!(script.rendered().contains(&PAGE_2.to_string()));
        assert!(script.closed.load(Ordering::SeqCst));
        assert_eq!(crawler.phase(), CrawlPhase::Finished);

        let csv = std::fs::read_to_string(dir.path().join("results.csv")).unwrap();
        assert_eq!(csv.lines().count(), 2);
        assert!(csv.contains(&detail_url(2)));

        let run = crawler.store().get_latest_run().unwrap().unwrap();
        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(run.records_saved, 1);
    }

    #[tokio::test]
    async fn test_export_failure_keeps_saved_records() {
        let dir = TempDir::new().unwrap();
        let details = vec![detail_url(1), detail_url(2)];
        let script = Script::new(vec![
            (START.to_string(), listing_html(&details)),
            (detail_url(1), detail_html("Java开发", &[])),
            (detail_url(2), detail_html("Java架构师", &[])),
        ]);
        let mut settings = settings(&dir);
        settings.export_path = dir.path().join("missing").join("results.csv");
        let factory = ScriptedFactory {
            script: script.clone(),
            fail_open: false,
        };
        let mut crawler = Crawler::new(
            settings,
            Box::new(factory),
            SqliteStorage::new_in_memory().unwrap(),
        )
        .unwrap();
        crawler.initialize(params(10)).unwrap();

        let report = crawler.crawl().await.unwrap();

        assert!(!report.export_written);
        assert_eq!(report.records_saved, 2);
        assert!(script.closed.load(Ordering::SeqCst));
        assert_eq!(crawler.phase(), CrawlPhase::Finished);
        assert_eq!(crawler.store().count_jobs().unwrap(), 2);
        assert!(!dir.path().join("missing").exists());

        let run = crawler.store().get_latest_run().unwrap().unwrap();
        assert_eq!(run.status, RunStatus::Completed);
    }
}
