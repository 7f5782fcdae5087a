// HTTP fetching against a local mock store

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use merch_watcher::config::WatcherConfig;
use merch_watcher::{
    AppError, Catalog, Fetcher, HttpFetcher, PollLoop, Product, StateTracker, Status, StorefrontClassifier,
};

use super::*;

#[tokio::test]
async fn test_fetch_returns_body_with_user_agent() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products/locket-cd"))
        .and(header("user-agent", "Mozilla/5.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PRE_ORDER_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(&WatcherConfig::default())?;
    let body = fetcher.fetch(&format!("{}/products/locket-cd", server.uri())).await?;

    assert_eq!(body, PRE_ORDER_PAGE);
    Ok(())
}

#[tokio::test]
async fn test_non_success_status_is_an_error() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(&WatcherConfig::default())?;
    let result = fetcher.fetch(&format!("{}/products/missing", server.uri())).await;

    match result {
        Err(AppError::FetchStatus { status, url }) => {
            assert_eq!(status, 404);
            assert!(url.ends_with("/products/missing"));
        }
        other => panic!("expected FetchStatus, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_custom_user_agent() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("user-agent", "merch-watcher-test"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let config = WatcherConfig {
        user_agent: "merch-watcher-test".to_string(),
        ..WatcherConfig::default()
    };
    let fetcher = HttpFetcher::new(&config)?;

    assert_eq!(fetcher.fetch(&server.uri()).await?, "ok");
    Ok(())
}

#[tokio::test]
async fn test_poll_loop_over_http() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products/locket-cd"))
        .respond_with(ResponseTemplate::new(200).set_body_string(IN_STOCK_PAGE))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products/tour-hoodie"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let catalog = Catalog::from_products(vec![
        Product::new("locket cd", format!("{}/products/locket-cd", server.uri()), "madison"),
        Product::new("tour hoodie", format!("{}/products/tour-hoodie", server.uri()), "travis"),
    ])?;
    let tracker = StateTracker::new(&catalog);
    let reporter = Arc::new(RecordingReporter::new());
    let poll_loop = PollLoop::new(
        Arc::new(catalog),
        tracker.clone(),
        Arc::new(StorefrontClassifier),
        reporter.clone(),
        Arc::new(HttpFetcher::new(&WatcherConfig::default())?),
    )
    .with_clock(FixedClock::at(10, 0, 30));

    let summary = poll_loop.run_cycle(&CancellationToken::new()).await;

    assert_eq!(summary.checked, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(tracker.get("locket cd"), Status::InStock);
    assert_eq!(tracker.get("tour hoodie"), Status::SoldOut);
    assert_eq!(reporter.transitions().len(), 1);
    Ok(())
}
