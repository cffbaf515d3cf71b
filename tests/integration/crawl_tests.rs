//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small job board and drive the full
//! crawl cycle end-to-end through the HTTP renderer.

use job_trawl::config::{
    load_config_with_hash, Config, ConfigOverrides, CrawlConfig, OutputConfig, RendererConfig,
    RendererKind,
};
use job_trawl::crawler::{run_crawl, StopHandle};
use job_trawl::output::CSV_HEADER;
use job_trawl::storage::{open_storage, JobStore, RunStatus};
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html")
}

fn listing_page(ids: &[u32]) -> String {
    let cards: String = ids
        .iter()
        .map(|id| {
            format!(
                r#"<li class="job-card-wrapper"><a class="job-card-left" href="/job_detail/{}.html">job {}</a></li>"#,
                id, id
            )
        })
        .collect();
    format!(
        r#"<html><body><div class="job-list-box"><ul>{}</ul></div><a href="/gongsi/1.html">company</a></body></html>"#,
        cards
    )
}

fn detail_page(id: u32) -> String {
    format!(
        r#"<html><body>
        <div class="job-banner">
            <div class="name"><h1>Java开发工程师{id}</h1><span class="salary">15-25K</span></div>
            <p class="text-experience">3-5年</p>
            <p class="text-degree">本科</p>
        </div>
        <div class="job-sec-text">负责第{id}个系统的开发</div>
        <div class="location-address">南宁市青秀区</div>
        <a class="company-name" href="/gongsi/{id}.html">公司{id}</a>
        <a href="/job_detail/1.html">相似职位</a>
        </body></html>"#,
        id = id
    )
}

/// Serves two listing pages (jobs 1-2, then job 3) and the three detail pages
async fn mount_board(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/web/geek/job"))
        .and(query_param("page", "2"))
        .respond_with(html(listing_page(&[3])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/web/geek/job"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/web/geek/job"))
        .respond_with(html(listing_page(&[1, 2])))
        .mount(server)
        .await;

    for id in 1..=3 {
        Mock::given(method("GET"))
            .and(path(format!("/job_detail/{}.html", id)))
            .respond_with(html(detail_page(id)))
            .mount(server)
            .await;
    }
}

fn create_test_config(server: &MockServer, dir: &TempDir, max_pages: u32) -> Config {
    Config {
        crawl: CrawlConfig {
            start_url: format!("{}/web/geek/job?query=Java&city=101300600", server.uri()),
            query: "Java".to_string(),
            city_code: "101300600".to_string(),
            max_pages,
            listing_url_template: format!(
                "{}/web/geek/job?query={{query}}&city={{city}}&page={{page}}",
                server.uri()
            ),
            detail_marker: "/job_detail/".to_string(),
            politeness_delay_ms: 0,
        },
        renderer: RendererConfig {
            kind: RendererKind::Http,
            request_timeout_secs: 5,
            ..RendererConfig::default()
        },
        output: OutputConfig {
            database_path: dir.path().join("jobs.db").display().to_string(),
            export_path: dir.path().join("results.csv").display().to_string(),
        },
    }
}

fn read_export(dir: &TempDir) -> Vec<String> {
    std::fs::read_to_string(dir.path().join("results.csv"))
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_full_crawl_over_http() {
    let server = MockServer::start().await;
    mount_board(&server).await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, &dir, 20);

    let report = run_crawl(&config, "hash", StopHandle::new()).await.unwrap();

    assert_eq!(report.listing_pages, 2);
    assert_eq!(report.detail_pages, 3);
    assert_eq!(report.records_saved, 3);
    assert_eq!(report.failed_fetches, 1);
    assert_eq!(report.pages_fetched, 6);
    assert_eq!(report.page_errors, 0);
    assert!(report.export_written);

    let storage = open_storage(Path::new(&config.output.database_path)).unwrap();
    assert_eq!(storage.count_jobs().unwrap(), 3);

    let url = format!("{}/job_detail/2.html", server.uri());
    let job = storage.get_job_by_url(&url).unwrap().unwrap();
    assert_eq!(job.work_name.as_deref(), Some("Java开发工程师2"));
    assert_eq!(job.salary.as_deref(), Some("15-25K"));
    assert_eq!(job.years_experience.as_deref(), Some("3-5年"));
    assert_eq!(job.degree.as_deref(), Some("本科"));
    assert_eq!(job.company_name.as_deref(), Some("公司2"));

    let run = storage.get_latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.pages_fetched, 6);
    assert_eq!(run.records_saved, 3);

    let lines = read_export(&dir);
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], CSV_HEADER);
    assert_eq!(
        lines[2],
        format!(
            r#""{}","Java开发工程师2","15-25K","南宁市青秀区","3-5年","本科","公司2","负责第2个系统的开发""#,
            url
        )
    );
}

#[tokio::test]
async fn test_each_page_fetched_once() {
    let server = MockServer::start().await;
    mount_board(&server).await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, &dir, 20);

    run_crawl(&config, "hash", StopHandle::new()).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let mut urls: Vec<String> = requests.iter().map(|r| r.url.to_string()).collect();
    let total = urls.len();
    urls.sort();
    urls.dedup();
    assert_eq!(urls.len(), total);
}

#[tokio::test]
async fn test_page_budget_caps_requests() {
    let server = MockServer::start().await;
    mount_board(&server).await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, &dir, 2);

    let report = run_crawl(&config, "hash", StopHandle::new()).await.unwrap();

    assert_eq!(report.pages_fetched, 2);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
    assert_eq!(read_export(&dir).len(), 2);
}

#[tokio::test]
async fn test_second_run_skips_stored_jobs() {
    let server = MockServer::start().await;
    mount_board(&server).await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, &dir, 20);

    run_crawl(&config, "hash", StopHandle::new()).await.unwrap();
    let report = run_crawl(&config, "hash", StopHandle::new()).await.unwrap();

    assert_eq!(report.records_saved, 0);
    assert_eq!(report.duplicates_skipped, 3);
    assert_eq!(read_export(&dir), vec![CSV_HEADER.to_string()]);

    let storage = open_storage(Path::new(&config.output.database_path)).unwrap();
    assert_eq!(storage.count_jobs().unwrap(), 3);
}

#[tokio::test]
async fn test_soft_deleted_job_is_saved_again() {
    let server = MockServer::start().await;
    mount_board(&server).await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, &dir, 20);

    run_crawl(&config, "hash", StopHandle::new()).await.unwrap();
    {
        let mut storage = open_storage(Path::new(&config.output.database_path)).unwrap();
        let url = format!("{}/job_detail/1.html", server.uri());
        assert_eq!(storage.soft_delete(&url).unwrap(), 1);
    }

    let report = run_crawl(&config, "hash", StopHandle::new()).await.unwrap();

    assert_eq!(report.records_saved, 1);
    assert_eq!(report.duplicates_skipped, 2);
    let storage = open_storage(Path::new(&config.output.database_path)).unwrap();
    assert_eq!(storage.count_jobs().unwrap(), 3);
    assert_eq!(storage.count_deleted_jobs().unwrap(), 1);
}

#[tokio::test]
async fn test_unreachable_start_url() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&server, &dir, 5);
    config.crawl.start_url = "http://127.0.0.1:9/web/geek/job".to_string();

    let report = run_crawl(&config, "hash", StopHandle::new()).await.unwrap();

    assert_eq!(report.pages_fetched, 1);
    assert_eq!(report.failed_fetches, 1);
    assert_eq!(report.records_saved, 0);
    assert_eq!(read_export(&dir), vec![CSV_HEADER.to_string()]);
}

#[tokio::test]
async fn test_crawl_from_config_file() {
    let server = MockServer::start().await;
    mount_board(&server).await;
    let dir = TempDir::new().unwrap();

    let config_path = dir.path().join("trawl.toml");
    let mut file = std::fs::File::create(&config_path).unwrap();
    write!(
        file,
        r#"
[crawl]
start-url = "{uri}/web/geek/job?query=Java&city=101300600"
query = "Java"
city-code = "101300600"
max-pages = 500
listing-url-template = "{uri}/web/geek/job?query={{query}}&city={{city}}&page={{page}}"
politeness-delay-ms = 0

[renderer]
kind = "http"

[output]
database-path = "{db}"
export-path = "{csv}"
"#,
        uri = server.uri(),
        db = dir.path().join("jobs.db").display(),
        csv = dir.path().join("results.csv").display(),
    )
    .unwrap();
    drop(file);

    let overrides = ConfigOverrides {
        max_pages: Some(3),
        ..ConfigOverrides::default()
    };
    let (config, hash) = load_config_with_hash(&config_path, &overrides).unwrap();
    assert_eq!(config.crawl.max_pages, 3);

    let report = run_crawl(&config, &hash, StopHandle::new()).await.unwrap();
    assert_eq!(report.pages_fetched, 3);
    assert_eq!(report.records_saved, 2);

    let storage = open_storage(Path::new(&config.output.database_path)).unwrap();
    let run = storage.get_latest_run().unwrap().unwrap();
    assert_eq!(run.config_hash, hash);
}
