//! Tests for the cached fetcher.

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::Fetcher;
use crate::cache::DownloadCache;
use crate::error::AbpError;
use std::time::Duration;
use tempfile::TempDir;

fn fetcher_at(root: &std::path::Path) -> Fetcher {
    let cache = DownloadCache::open(root).unwrap();
    Fetcher::with_pause(cache, Duration::ZERO)
}

#[tokio::test]
async fn second_download_with_same_key_skips_the_network() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cards/foo.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"imagebytes".to_vec()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().to_path_buf();
    let url = format!("{}/cards/foo.jpg", mock_server.uri());

    let (first, second) = tokio::task::spawn_blocking(move || {
        let fetcher = fetcher_at(&root);
        let first = fetcher.download(&url, "foo.jpg", "").unwrap();
        let second = fetcher.download(&url, "foo.jpg", "").unwrap();
        (first, second)
    })
    .await
    .unwrap();

    assert_eq!(first, second);
    assert_eq!(std::fs::read(&first).unwrap(), b"imagebytes");
}

#[tokio::test]
async fn failed_download_creates_no_cache_entry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cards/missing.jpg"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().to_path_buf();
    let url = format!("{}/cards/missing.jpg", mock_server.uri());

    let result = tokio::task::spawn_blocking(move || {
        let fetcher = fetcher_at(&root);
        let result = fetcher.download(&url, "missing.jpg", "");
        (result, fetcher.cache().exists("missing.jpg"))
    })
    .await
    .unwrap();

    match result {
        (Err(AbpError::HttpStatus { status, body }), cached) => {
            assert_eq!(status.as_u16(), 404);
            assert_eq!(body, "not here");
            assert!(!cached);
        }
        other => panic!("Expected AbpError::HttpStatus, got: {other:?}"),
    }
}

#[tokio::test]
async fn query_is_url_encoded_and_appended() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "\"Pia Nalaar\" site:mythicspoiler.com"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let root_dir = TempDir::new().unwrap();
    let root = root_dir.path().to_path_buf();
    let url = format!("{}/search?q=", mock_server.uri());

    let text = tokio::task::spawn_blocking(move || {
        let fetcher = fetcher_at(&root);
        fetcher
            .download_text(&url, "\"Pia Nalaar\" site:mythicspoiler.com", "pianalaar_search.html")
            .unwrap()
    })
    .await
    .unwrap();

    assert_eq!(text, "<html></html>");
}

#[tokio::test]
async fn download_text_reads_back_the_cached_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/page.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>cached</html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().to_path_buf();
    let url = format!("{}/page.html", mock_server.uri());

    let (first, second) = tokio::task::spawn_blocking(move || {
        let fetcher = fetcher_at(&root);
        let first = fetcher.download_text(&url, "", "page.html").unwrap();
        // Served from cache; the mock would reject a second request
        let second = fetcher.download_text(&url, "", "page.html").unwrap();
        (first, second)
    })
    .await
    .unwrap();

    assert_eq!(first, "<html>cached</html>");
    assert_eq!(first, second);
}
