//! Pipeline tests: produce, persist, backfill

use crate::{create_test_config, listing_page, serve};
use chrono::{Duration, Utc};
use climbwatch::config::SourceMode;
use climbwatch::pipeline;
use climbwatch::storage::{JsonSnapshotStore, SnapshotStore, WriteOutcome};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn with_data_dir(dir: &TempDir, extra: &str) -> String {
    format!(
        "{}\n[output]\ndata-dir = \"{}\"\n",
        extra,
        dir.path().display()
    )
}

#[tokio::test]
async fn test_live_run_writes_todays_snapshot() {
    let server = MockServer::start().await;
    serve(&server, "/list", listing_page(&["Lilia", "Misi"], Some("/list/2"))).await;
    serve(&server, "/list/2", listing_page(&["Via Carota"], None)).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, &with_data_dir(&dir, ""));

    let report = pipeline::run(&config, SourceMode::Live, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.outcome, WriteOutcome::Written);
    assert_eq!(report.total_restaurants, 3);
    assert_eq!(report.backfilled, 0);

    let file = dir
        .path()
        .join(format!("{}.json", report.date.format("%Y-%m-%d")));
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(file).unwrap()).unwrap();

    assert_eq!(json["total_restaurants"], 3);
    assert_eq!(json["restaurants"][2]["name"], "Via Carota");
    assert_eq!(json["restaurants"][2]["position"], 3);
    assert!(json["timestamp"].as_str().unwrap().ends_with('Z'));
    assert!(json.get("stop_reason").is_none());

    let store = JsonSnapshotStore::new(dir.path());
    assert_eq!(store.list_dates().unwrap(), vec![report.date]);
}

#[tokio::test]
async fn test_live_snapshot_stamped_when_crawl_completes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/list"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(listing_page(&["Lilia", "Misi"], None), "text/html")
                .set_delay(std::time::Duration::from_millis(1500)),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, &with_data_dir(&dir, ""));

    let started = Utc::now();
    let report = pipeline::run(&config, SourceMode::Live, &CancellationToken::new())
        .await
        .unwrap();
    let finished = Utc::now();

    let snapshot = JsonSnapshotStore::new(dir.path())
        .read(report.date)
        .unwrap()
        .unwrap();

    assert!(snapshot.timestamp >= started + Duration::milliseconds(1400));
    assert!(snapshot.timestamp <= finished);
    assert_eq!(snapshot.timestamp, report.timestamp);
    assert_eq!(report.date, snapshot.timestamp.date_naive());
}

#[tokio::test]
async fn test_mock_run_backfills_once_and_overwrites_today() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(
        &server,
        &with_data_dir(&dir, ""),
    );
    let store = JsonSnapshotStore::new(dir.path());

    let first = pipeline::run(&config, SourceMode::Mock, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(first.total_restaurants, 20);
    assert_eq!(first.backfilled, 7);
    assert_eq!(store.list_dates().unwrap().len(), 8);

    let yesterday = (Utc::now() - Duration::days(1)).date_naive();
    let history_before = store.read(yesterday).unwrap();

    let second = pipeline::run(&config, SourceMode::Mock, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(second.outcome, WriteOutcome::Overwritten);
    assert_eq!(second.backfilled, 0);
    assert_eq!(store.list_dates().unwrap().len(), 8);
    assert_eq!(store.read(yesterday).unwrap(), history_before);

    // The mock source never touches the listing
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_navigation_failure_writes_nothing() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, &with_data_dir(&dir, ""));

    // Nothing mounted: wiremock answers 404
    let result = pipeline::run(&config, SourceMode::Live, &CancellationToken::new()).await;

    assert!(result.is_err());
    let store = JsonSnapshotStore::new(dir.path());
    assert!(store.list_dates().unwrap().is_empty());
}
