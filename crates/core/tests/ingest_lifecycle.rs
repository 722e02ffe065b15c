//! Catalog ingest lifecycle integration tests.
//!
//! These run against a real database file and a real (XZ-compressed)
//! source file, covering the durability and idempotency guarantees end to
//! end: refresh, aborted refresh, re-ingest with tracked downloads.

use std::io::Write;
use std::sync::Arc;

use chrono::NaiveDate;
use tempfile::TempDir;

use mediathek_core::{
    testing::fixtures, update_catalog, CompositeFilter, DownloadStatus, FilmFilter, IngestError,
    IngestOptions, SqliteFilmStore, UpdateSource, STATUS_CATALOG_SIZE,
};

fn catalog_text() -> String {
    fixtures::filmlist_text(&[
        fixtures::raw_segment("ARD", "News", "Morning Report", "25.01.2024"),
        fixtures::raw_segment("", "News", "Evening Report", "26.01.2024"),
        fixtures::raw_segment("ZDF", "Doku", "Deep Sea", "27.01.2024"),
    ])
}

fn retention() -> Arc<dyn FilmFilter> {
    Arc::new(CompositeFilter::retention(
        NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        30,
        0,
    ))
}

struct TestHarness {
    store: Arc<SqliteFilmStore>,
    temp_dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = Arc::new(
            SqliteFilmStore::new(&temp_dir.path().join("test.db"))
                .expect("Failed to create store"),
        );
        Self { store, temp_dir }
    }

    fn write_source(&self, name: &str, content: &str) -> UpdateSource {
        let path = self.temp_dir.path().join(name);
        if name.ends_with(".xz") {
            let file = std::fs::File::create(&path).unwrap();
            let mut encoder = xz2::write::XzEncoder::new(file, 6);
            encoder.write_all(content.as_bytes()).unwrap();
            encoder.finish().unwrap();
        } else {
            std::fs::write(&path, content).unwrap();
        }
        UpdateSource::File(path)
    }
}

#[tokio::test]
async fn test_refresh_from_compressed_file() {
    let harness = TestHarness::new();
    let source = harness.write_source("filmliste.xz", &catalog_text());

    let report = update_catalog(
        Arc::clone(&harness.store),
        source,
        retention(),
        IngestOptions::default(),
    )
    .await
    .expect("refresh failed");

    assert_eq!(report.parsed, 3);
    assert_eq!(report.kept, 3);
    assert_eq!(harness.store.count_films().unwrap(), 3);

    // carried-forward station was reconstructed before storage
    let inherited = harness
        .store
        .search(&["titel:Evening".to_string()])
        .unwrap();
    assert_eq!(inherited[0].station, "ARD");

    // the refresh stamped the status table for external reporting
    let status = harness.store.read_status(&[STATUS_CATALOG_SIZE]).unwrap();
    assert_eq!(status[0].text.as_deref(), Some("3"));
}

#[tokio::test]
async fn test_aborted_refresh_leaves_previous_catalog_queryable() {
    let harness = TestHarness::new();
    let good = harness.write_source("good.json", &catalog_text());
    update_catalog(
        Arc::clone(&harness.store),
        good,
        retention(),
        IngestOptions::default(),
    )
    .await
    .unwrap();

    // second refresh dies on a malformed segment partway through
    let mut broken = fixtures::raw_segment("ZDF", "Doku", "Broken", "27.01.2024");
    broken.pop();
    let bad_text = fixtures::filmlist_text(&[
        fixtures::raw_segment("ARTE", "Kino", "Replacement", "28.01.2024"),
        broken,
    ]);
    let bad = harness.write_source("bad.json", &bad_text);
    let err = update_catalog(
        Arc::clone(&harness.store),
        bad,
        retention(),
        IngestOptions::default(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, IngestError::Parse(_)));

    // previous catalog unchanged, never a partial new one
    let entries = harness.store.search(&[]).unwrap();
    assert_eq!(entries.len(), 3);
    assert!(entries.iter().all(|e| e.title != "Replacement"));
}

#[tokio::test]
async fn test_downloads_survive_reingest() {
    let harness = TestHarness::new();
    let source = harness.write_source("filmliste.json", &catalog_text());

    update_catalog(
        Arc::clone(&harness.store),
        source.clone(),
        retention(),
        IngestOptions::default(),
    )
    .await
    .unwrap();

    let selected = harness.store.search(&["thema:Doku".to_string()]).unwrap();
    harness
        .store
        .save_downloads(&selected, DownloadStatus::Queued)
        .unwrap();

    // wholesale replace with the same published catalog
    update_catalog(
        Arc::clone(&harness.store),
        source,
        retention(),
        IngestOptions::default(),
    )
    .await
    .unwrap();

    // content-hash ids make the old download row joinable again
    let entries = harness
        .store
        .read_download_entries(&[DownloadStatus::Queued])
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].title, "Deep Sea");
}

#[tokio::test]
async fn test_store_reopens_with_data_intact() {
    let harness = TestHarness::new();
    let source = harness.write_source("filmliste.json", &catalog_text());
    update_catalog(
        Arc::clone(&harness.store),
        source,
        retention(),
        IngestOptions::default(),
    )
    .await
    .unwrap();
    drop(harness.store);

    let reopened = SqliteFilmStore::new(&harness.temp_dir.path().join("test.db")).unwrap();
    assert_eq!(reopened.count_films().unwrap(), 3);
}
