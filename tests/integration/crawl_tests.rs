//! Integration tests for the sitemap walker
//!
//! These tests use wiremock to serve sitemap documents and drive the real
//! HTTP fetcher through full runs end-to-end.

use sitemap_walker::config::{FetcherConfig, UserAgentConfig};
use sitemap_walker::crawler::{Engine, EngineOptions, HttpFetcher};
use sitemap_walker::state::StopReason;
use sitemap_walker::storage::CheckpointStore;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Builds a sitemap index listing the given child sitemaps
fn sitemap_index(children: &[String]) -> String {
    let entries: String = children
        .iter()
        .map(|c| format!("  <sitemap><loc>{}</loc></sitemap>\n", c))
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<sitemapindex xmlns=\"{}\">\n{}</sitemapindex>\n",
        NS, entries
    )
}

/// Builds a regular sitemap listing the given page URLs
fn urlset(urls: &[String]) -> String {
    let entries: String = urls
        .iter()
        .map(|u| format!("  <url><loc>{}</loc><lastmod>2024-01-01</lastmod></url>\n", u))
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"{}\">\n{}</urlset>\n",
        NS, entries
    )
}

/// Test user agent; also checked against the request headers
fn test_user_agent() -> UserAgentConfig {
    UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0.0".to_string(),
        contact_url: None,
        contact_email: "test@example.com".to_string(),
    }
}

/// Creates a fetcher with no politeness delay so tests run quickly
fn test_fetcher() -> HttpFetcher {
    let config = FetcherConfig {
        timeout_secs: 5,
        request_interval_ms: 0,
    };
    HttpFetcher::new(&config, &test_user_agent()).expect("Failed to build fetcher")
}

async fn serve(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "application/xml"),
        )
        .mount(server)
        .await;
}

/// Serves index -> child1 (pageA, pageB), child2 (pageC, pageD)
async fn mount_two_child_site(server: &MockServer) -> String {
    let base = server.uri();

    serve(
        server,
        "/sitemap_index.xml",
        sitemap_index(&[format!("{}/child1.xml", base), format!("{}/child2.xml", base)]),
    )
    .await;
    serve(
        server,
        "/child1.xml",
        urlset(&[format!("{}/pageA", base), format!("{}/pageB", base)]),
    )
    .await;
    serve(
        server,
        "/child2.xml",
        urlset(&[format!("{}/pageC", base), format!("{}/pageD", base)]),
    )
    .await;

    format!("{}/sitemap_index.xml", base)
}

fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .expect("Failed to read output")
        .lines()
        .map(str::to_string)
        .collect()
}

fn output_path(dir: &TempDir) -> PathBuf {
    dir.path().join("urls.txt")
}

#[tokio::test]
async fn test_full_walk_of_sitemap_index() {
    let mock_server = MockServer::start().await;
    let root = mount_two_child_site(&mock_server).await;
    let base = mock_server.uri();

    let dir = TempDir::new().expect("Failed to create temp dir");
    let output = output_path(&dir);
    let store = CheckpointStore::for_output(&output);

    let mut engine = Engine::new(EngineOptions::new(&root, &output), test_fetcher(), store.clone());
    let stats = engine.run().await.expect("Run failed");

    assert_eq!(stats.reason, StopReason::Exhausted);
    assert_eq!(stats.sitemaps_processed, 3);
    assert_eq!(
        read_lines(&output),
        vec![
            format!("{}/pageA", base),
            format!("{}/pageB", base),
            format!("{}/pageC", base),
            format!("{}/pageD", base),
        ]
    );

    // Checkpoint is kept by default and records the finished traversal
    let saved = store.load().expect("Checkpoint missing");
    assert!(saved.is_worklist_empty());
    assert_eq!(saved.processed_count(), 3);
    assert_eq!(saved.found_count(), 4);
}

#[tokio::test]
async fn test_requests_carry_user_agent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .and(header("user-agent", "TestBot/1.0.0 (+test@example.com)"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(urlset(&[format!("{}/page1", mock_server.uri())])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let output = output_path(&dir);
    let root = format!("{}/sitemap.xml", mock_server.uri());

    let mut engine = Engine::new(
        EngineOptions::new(&root, &output),
        test_fetcher(),
        CheckpointStore::for_output(&output),
    );
    let stats = engine.run().await.expect("Run failed");

    assert_eq!(stats.urls_found, 1);
}

#[tokio::test]
async fn test_root_not_found_writes_empty_output() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let output = output_path(&dir);
    let store = CheckpointStore::for_output(&output);
    let root = format!("{}/sitemap.xml", mock_server.uri());

    let mut engine = Engine::new(EngineOptions::new(&root, &output), test_fetcher(), store.clone());
    let stats = engine.run().await.expect("Run failed");

    assert_eq!(stats.sitemaps_failed, 1);
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "");

    let saved = store.load().expect("Checkpoint missing");
    assert!(!saved.is_processed(&root));
}

#[tokio::test]
async fn test_malformed_xml_is_skipped() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    serve(
        &mock_server,
        "/sitemap_index.xml",
        sitemap_index(&[format!("{}/broken.xml", base), format!("{}/good.xml", base)]),
    )
    .await;
    serve(&mock_server, "/broken.xml", "<urlset><url><loc>".to_string()).await;
    serve(&mock_server, "/good.xml", urlset(&[format!("{}/page1", base)])).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let output = output_path(&dir);
    let root = format!("{}/sitemap_index.xml", base);

    let mut engine = Engine::new(
        EngineOptions::new(&root, &output),
        test_fetcher(),
        CheckpointStore::for_output(&output),
    );
    let stats = engine.run().await.expect("Run failed");

    assert_eq!(stats.sitemaps_failed, 1);
    assert_eq!(read_lines(&output), vec![format!("{}/page1", base)]);
    assert!(!engine.state().is_processed(&format!("{}/broken.xml", base)));
}

#[tokio::test]
async fn test_limit_then_resume() {
    let mock_server = MockServer::start().await;
    let root = mount_two_child_site(&mock_server).await;
    let base = mock_server.uri();

    let dir = TempDir::new().expect("Failed to create temp dir");
    let output = output_path(&dir);
    let store = CheckpointStore::for_output(&output);

    // First run stops after child1
    let mut options = EngineOptions::new(&root, &output);
    options.limit = NonZeroUsize::new(2);
    let mut engine = Engine::new(options, test_fetcher(), store.clone());
    let stats = engine.run().await.expect("First run failed");

    assert_eq!(stats.reason, StopReason::LimitReached);
    assert_eq!(read_lines(&output).len(), 2);
    let saved = store.load().expect("Checkpoint missing");
    assert_eq!(
        saved.worklist().collect::<Vec<_>>(),
        vec![format!("{}/child2.xml", base)]
    );

    // Second run picks up child2 from the checkpoint
    let mut options = EngineOptions::new(&root, &output);
    options.resume = true;
    let mut engine = Engine::new(options, test_fetcher(), store.clone());
    let stats = engine.run().await.expect("Resumed run failed");

    assert_eq!(stats.reason, StopReason::Exhausted);
    assert_eq!(read_lines(&output).len(), 4);

    // The index and child1 were only fetched by the first run
    let requests = mock_server
        .received_requests()
        .await
        .expect("Request recording disabled");
    let index_hits = requests
        .iter()
        .filter(|r| r.url.path() == "/sitemap_index.xml")
        .count();
    assert_eq!(index_hits, 1);
}

#[tokio::test]
async fn test_state_file_override_and_removal() {
    let mock_server = MockServer::start().await;
    let root = mount_two_child_site(&mock_server).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let output = output_path(&dir);
    let state_path = dir.path().join("custom-state.json");

    let mut options = EngineOptions::new(&root, &output);
    options.remove_checkpoint_on_completion = true;
    let mut engine = Engine::new(options, test_fetcher(), CheckpointStore::new(&state_path));
    engine.run().await.expect("Run failed");

    assert_eq!(read_lines(&output).len(), 4);
    assert!(!state_path.exists());
    assert!(!dir.path().join("urls.txt.state.json").exists());
}
