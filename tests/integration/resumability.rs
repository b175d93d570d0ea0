//! Presence-only resumability: existing files are never re-fetched

use map_tile_downloader::address::MapType;
use map_tile_downloader::downloader::{FetchOrchestrator, FontJob, JobSpec, RunTally, TileJob};
use map_tile_downloader::fetcher::{BackoffPolicy, BackoffState};
use std::time::Duration;
use tempfile::tempdir;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_policy() -> BackoffPolicy {
    BackoffPolicy {
        initial_wait: Duration::from_millis(1),
        min_wait: Duration::from_millis(1),
        max_wait: Duration::from_millis(50),
        fail_factor: 2.0,
        success_factor: 0.5,
        max_retries: 2,
        timeout: Duration::from_secs(2),
    }
}

#[tokio::test]
async fn second_run_makes_zero_network_calls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(&b"tile"[..]))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let policy = fast_policy();
    let mut state = BackoffState::new(&policy);
    let mut tally = RunTally::new();
    let mut orchestrator = FetchOrchestrator::new(policy, "k")
        .unwrap()
        .with_base_url(server.uri());

    let job = JobSpec::Tiles(TileJob::full_grid(MapType::Vector, 1, dir.path()));

    let first = orchestrator
        .run_job(&job, &mut state, &mut tally)
        .await
        .unwrap();
    assert_eq!(first.downloaded, 4);
    assert_eq!(server.received_requests().await.unwrap().len(), 4);

    let second = orchestrator
        .run_job(&job, &mut state, &mut tally)
        .await
        .unwrap();
    assert_eq!(second.downloaded, 0);
    assert_eq!(second.skipped, 4);
    // Still only the four original requests.
    assert_eq!(server.received_requests().await.unwrap().len(), 4);
    assert_eq!(tally.total_downloaded(), 4);
}

#[tokio::test]
async fn pre_existing_files_are_authoritative_even_if_truncated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(&b"tile"[..]))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    // An empty (plausibly truncated) file from an earlier interrupted run.
    std::fs::create_dir_all(dir.path().join("1/0")).unwrap();
    std::fs::write(dir.path().join("1/0/0.pbf"), b"").unwrap();

    let policy = fast_policy();
    let mut state = BackoffState::new(&policy);
    let mut tally = RunTally::new();
    let mut orchestrator = FetchOrchestrator::new(policy, "k")
        .unwrap()
        .with_base_url(server.uri());

    let job = JobSpec::Tiles(TileJob::full_grid(MapType::Vector, 1, dir.path()));
    let outcome = orchestrator
        .run_job(&job, &mut state, &mut tally)
        .await
        .unwrap();

    assert_eq!(outcome.downloaded, 3);
    assert_eq!(outcome.skipped, 1);
    // Presence alone decides: the empty file was not replaced.
    assert_eq!(std::fs::read(dir.path().join("1/0/0.pbf")).unwrap(), b"");
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn font_resume_skips_written_ranges() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    // Two ranges already on disk under the display-name directory.
    let font_dir = dir.path().join("Noto Sans Bold");
    std::fs::create_dir_all(&font_dir).unwrap();
    std::fs::write(font_dir.join("0-255.pbf"), b"a").unwrap();
    std::fs::write(font_dir.join("256-511.pbf"), b"b").unwrap();

    let policy = fast_policy();
    let mut state = BackoffState::new(&policy);
    let mut tally = RunTally::new();
    let mut orchestrator = FetchOrchestrator::new(policy, "k")
        .unwrap()
        .with_base_url(server.uri());

    let job = JobSpec::Fonts(FontJob::new("noto-sans-bold", dir.path()));
    let outcome = orchestrator
        .run_job(&job, &mut state, &mut tally)
        .await
        .unwrap();

    // 2 present + 254 no-content; no unit fetched twice.
    assert_eq!(outcome.skipped, 256);
    assert_eq!(outcome.downloaded, 0);
    assert_eq!(server.received_requests().await.unwrap().len(), 254);
}
