//! End-to-end orchestrator behavior against a mock tile server

use map_tile_downloader::address::MapType;
use map_tile_downloader::coords::BoundingBox;
use map_tile_downloader::downloader::{FetchOrchestrator, FontJob, JobSpec, RunTally, TileJob};
use map_tile_downloader::fetcher::{BackoffPolicy, BackoffState};
use std::time::Duration;
use tempfile::tempdir;
use wiremock::matchers::{method, path};
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

fn orchestrator(server: &MockServer) -> FetchOrchestrator {
    FetchOrchestrator::new(fast_policy(), "test-key")
        .unwrap()
        .with_base_url(server.uri())
}

#[tokio::test]
async fn zoom_zero_full_world_downloads_one_tile() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tiles/satellite-v2/0/0/0.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(&b"jpeg"[..]))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let job = JobSpec::Tiles(TileJob::full_grid(MapType::Satellite, 0, dir.path()));
    let policy = fast_policy();
    let mut state = BackoffState::new(&policy);
    let mut tally = RunTally::new();

    let outcome = orchestrator(&server)
        .run_job(&job, &mut state, &mut tally)
        .await
        .unwrap();

    assert_eq!(outcome.downloaded, 1);
    assert_eq!(outcome.failed, 0);
    assert!(!outcome.interrupted);

    let tile = dir.path().join("0/0/0.jpg");
    assert_eq!(std::fs::read(&tile).unwrap(), b"jpeg");
    assert_eq!(tally.total_downloaded(), 1);

    let audit = std::fs::read_to_string(dir.path().join("tile_download.csv")).unwrap();
    assert_eq!(audit.lines().collect::<Vec<_>>(), vec!["z,x,y,status", "0,0,0,1"]);
}

#[tokio::test]
async fn failed_tiles_are_counted_and_do_not_stop_the_job() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tiles/v3/1/0/0.pbf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(&b"pbf"[..]))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let job = JobSpec::Tiles(TileJob::full_grid(MapType::Vector, 1, dir.path()));
    let policy = fast_policy();
    let mut state = BackoffState::new(&policy);
    let mut tally = RunTally::new();

    let outcome = orchestrator(&server)
        .run_job(&job, &mut state, &mut tally)
        .await
        .unwrap();

    assert_eq!(outcome.downloaded, 1);
    assert_eq!(outcome.failed, 3);
    assert_eq!(outcome.skipped, 0);

    // Failures land in the audit log as status 0.
    let audit = std::fs::read_to_string(dir.path().join("tile_download.csv")).unwrap();
    assert_eq!(audit.matches(",1\n").count(), 1);
    assert_eq!(audit.matches(",0\n").count(), 3);
}

#[tokio::test]
async fn out_of_bounds_job_is_a_reported_no_op() {
    let server = MockServer::start().await;

    let dir = tempdir().unwrap();
    let bounds = BoundingBox {
        min_lon: 0.0,
        min_lat: -90.0,
        max_lon: 5.0,
        max_lat: 5.0,
    };
    let job = JobSpec::Tiles(TileJob::bounded(MapType::Satellite, 6, bounds, dir.path()));
    let policy = fast_policy();
    let mut state = BackoffState::new(&policy);
    let mut tally = RunTally::new();

    let outcome = orchestrator(&server)
        .run_job(&job, &mut state, &mut tally)
        .await
        .unwrap();

    assert_eq!(outcome.downloaded, 0);
    assert_eq!(outcome.total(), 0);
    assert!(server.received_requests().await.unwrap().is_empty());
    assert!(!dir.path().join("tile_download.csv").exists());
}

#[tokio::test]
async fn font_job_fetches_all_ranges_and_skips_no_content() {
    let server = MockServer::start().await;
    // Only the first range has glyphs; the rest of the codepoint space
    // answers 204.
    Mock::given(method("GET"))
        .and(path("/fonts/noto-sans-bold/0-255.pbf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(&b"glyphs"[..]))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let job = JobSpec::Fonts(FontJob::new("noto-sans-bold", dir.path()));
    let policy = fast_policy();
    let mut state = BackoffState::new(&policy);
    let mut tally = RunTally::new();

    let outcome = orchestrator(&server)
        .run_job(&job, &mut state, &mut tally)
        .await
        .unwrap();

    assert_eq!(outcome.downloaded, 1);
    assert_eq!(outcome.skipped, 255);
    assert_eq!(outcome.failed, 0);
    assert_eq!(outcome.total(), 256);

    // Files land under the restored display name.
    let glyph_file = dir.path().join("Noto Sans Bold/0-255.pbf");
    assert_eq!(std::fs::read(&glyph_file).unwrap(), b"glyphs");
    assert_eq!(server.received_requests().await.unwrap().len(), 256);
}

#[tokio::test]
async fn tally_accumulates_across_jobs_and_resets_per_job() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(&b"t"[..]))
        .mount(&server)
        .await;

    let dir_a = tempdir().unwrap();
    let dir_b = tempdir().unwrap();
    let policy = fast_policy();
    let mut state = BackoffState::new(&policy);
    let mut tally = RunTally::new();
    let mut orchestrator = orchestrator(&server);

    let job_a = JobSpec::Tiles(TileJob::full_grid(MapType::Vector, 0, dir_a.path()));
    let job_b = JobSpec::Tiles(TileJob::full_grid(MapType::Vector, 1, dir_b.path()));

    orchestrator
        .run_job(&job_a, &mut state, &mut tally)
        .await
        .unwrap();
    assert_eq!(tally.total_downloaded(), 1);
    assert_eq!(tally.downloaded_this_job(), 0);

    orchestrator
        .run_job(&job_b, &mut state, &mut tally)
        .await
        .unwrap();
    assert_eq!(tally.total_downloaded(), 5);
}
