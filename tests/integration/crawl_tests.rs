//! Crawl tests against served listing pages

use crate::{create_test_config, listing_page, serve, serve_status};
use climbwatch::crawler::{crawl, HttpDriverFactory};
use climbwatch::state::{FailureKind, StopReason};
use climbwatch::ClimbError;
use tokio_util::sync::CancellationToken;
use wiremock::MockServer;

#[tokio::test]
async fn test_follows_next_links_to_the_end() {
    let server = MockServer::start().await;
    serve(&server, "/list", listing_page(&["Lilia", "Misi"], Some("/list/2"))).await;
    serve(&server, "/list/2", listing_page(&["Via Carota", "Rezdôra"], Some("/list/3"))).await;
    serve(&server, "/list/3", listing_page(&["Laser Wolf"], None)).await;

    let config = create_test_config(&server, "");
    let factory = HttpDriverFactory::new(&config.driver).unwrap();

    let result = crawl(&config, &factory, &CancellationToken::new())
        .await
        .unwrap();

    let names: Vec<&str> = result.restaurants.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Lilia", "Misi", "Via Carota", "Rezdôra", "Laser Wolf"]);
    let positions: Vec<u32> = result.restaurants.iter().map(|r| r.position).collect();
    assert_eq!(positions, vec![1, 2, 3, 4, 5]);
    assert_eq!(result.pages_visited, 3);
    assert_eq!(result.stop_reason, Some(StopReason::NoNextPage));
}

#[tokio::test]
async fn test_stops_at_page_ceiling() {
    let server = MockServer::start().await;
    serve(&server, "/list", listing_page(&["A1", "A2"], Some("/list/2"))).await;
    serve(&server, "/list/2", listing_page(&["B1", "B2"], Some("/list/3"))).await;
    serve(&server, "/list/3", listing_page(&["C1", "C2"], Some("/list/4"))).await;

    let config = create_test_config(&server, "max-pages = 2");
    let factory = HttpDriverFactory::new(&config.driver).unwrap();

    let result = crawl(&config, &factory, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.total_restaurants, 4);
    assert_eq!(result.pages_visited, 2);
    assert_eq!(result.stop_reason, Some(StopReason::PageCeiling));

    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| r.url.path() != "/list/3"));
}

#[tokio::test]
async fn test_server_error_on_listing_is_fatal() {
    let server = MockServer::start().await;
    serve_status(&server, "/list", 500).await;

    let config = create_test_config(&server, "");
    let factory = HttpDriverFactory::new(&config.driver).unwrap();

    let result = crawl(&config, &factory, &CancellationToken::new()).await;
    assert!(matches!(result, Err(ClimbError::NavigationFailed { .. })));
}

#[tokio::test]
async fn test_rate_limited_pagination_is_blocked() {
    let server = MockServer::start().await;
    serve(&server, "/list", listing_page(&["Lilia", "Misi"], Some("/list/2"))).await;
    serve_status(&server, "/list/2", 429).await;

    let config = create_test_config(&server, "advance-retries = 2");
    let factory = HttpDriverFactory::new(&config.driver).unwrap();

    let result = crawl(&config, &factory, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.total_restaurants, 2);
    match result.stop_reason {
        Some(StopReason::PaginationFailed(failure)) => {
            assert_eq!(failure.kind, FailureKind::Blocked)
        }
        other => panic!("unexpected stop reason {:?}", other),
    }

    // Blocked is never retried
    let requests = server.received_requests().await.unwrap();
    let page_two = requests.iter().filter(|r| r.url.path() == "/list/2").count();
    assert_eq!(page_two, 1);
}

#[tokio::test]
async fn test_empty_listing_is_empty_success() {
    let server = MockServer::start().await;
    serve(&server, "/list", listing_page(&[], None)).await;

    let config = create_test_config(&server, "");
    let factory = HttpDriverFactory::new(&config.driver).unwrap();

    let result = crawl(&config, &factory, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.total_restaurants, 0);
    assert_eq!(result.stop_reason, Some(StopReason::NoDataFound));
}

#[tokio::test]
async fn test_broken_next_link_is_exhausted() {
    let server = MockServer::start().await;
    serve(&server, "/list", listing_page(&["Lilia"], Some("/list/2"))).await;
    serve_status(&server, "/list/2", 404).await;

    let config = create_test_config(&server, "");
    let factory = HttpDriverFactory::new(&config.driver).unwrap();

    let result = crawl(&config, &factory, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.total_restaurants, 1);
    let reason = result.stop_reason.unwrap();
    assert!(reason.is_natural_end());
    assert!(!reason.is_failure());
}
