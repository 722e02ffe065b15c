//! Orchestrator runner: worker pool plus single status writer.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::film::FilmEntry;
use crate::store::{DownloadStatus, SqliteFilmStore, STATUS_LAST_DOWNLOAD};

use super::config::DownloaderConfig;
use super::transfer::Transfer;
use super::types::{DownloadError, DownloadEvent, DownloadOutcome, DownloadSummary};

/// Buffer size of the status event channel.
const EVENT_BUFFER_SIZE: usize = 64;

/// Runs transfers for selected entries and tracks their status.
pub struct Downloader {
    store: Arc<SqliteFilmStore>,
    transfer: Arc<dyn Transfer>,
    config: DownloaderConfig,
}

impl Downloader {
    pub fn new(
        store: Arc<SqliteFilmStore>,
        transfer: Arc<dyn Transfer>,
        config: DownloaderConfig,
    ) -> Self {
        Self {
            store,
            transfer,
            config,
        }
    }

    /// Executes one transfer per entry and returns the batch counts.
    ///
    /// With concurrency 1 the selection is processed strictly in order;
    /// otherwise a fixed pool of workers pulls from it unordered. Each
    /// entry goes Active before its transfer and Complete or Failed after,
    /// never skipping a step; a completed entry additionally gets a
    /// provenance row with the produced file path.
    pub async fn run(&self, entries: Vec<FilmEntry>) -> DownloadSummary {
        let total = entries.len();
        if total == 0 {
            info!("no entries selected for download");
            return DownloadSummary::default();
        }

        let (tx, rx) = mpsc::channel(EVENT_BUFFER_SIZE);
        let writer = tokio::spawn(status_writer(Arc::clone(&self.store), rx));

        let queue: Arc<Mutex<VecDeque<FilmEntry>>> =
            Arc::new(Mutex::new(entries.into_iter().collect()));
        let workers = self.config.concurrency.max(1);
        let mut handles = Vec::with_capacity(workers);
        for _ in 0..workers {
            let queue = Arc::clone(&queue);
            let tx = tx.clone();
            let transfer = Arc::clone(&self.transfer);
            let config = self.config.clone();
            handles.push(tokio::spawn(async move {
                loop {
                    let entry = queue.lock().unwrap().pop_front();
                    let Some(entry) = entry else { break };
                    download_one(&config, transfer.as_ref(), entry, &tx).await;
                }
            }));
        }
        drop(tx);
        for handle in handles {
            let _ = handle.await;
        }

        let (complete, failed) = writer.await.unwrap_or((0, 0));
        if let Err(e) = self.store.save_status(STATUS_LAST_DOWNLOAD, None) {
            warn!("failed to stamp download batch status: {e}");
        }
        DownloadSummary {
            total,
            complete,
            failed,
        }
    }
}

/// The one task allowed to write download status. Workers hand it
/// transitions over the channel; it returns the (complete, failed) counts
/// once all workers are done.
async fn status_writer(
    store: Arc<SqliteFilmStore>,
    mut rx: mpsc::Receiver<DownloadEvent>,
) -> (usize, usize) {
    let mut complete = 0;
    let mut failed = 0;
    while let Some(event) = rx.recv().await {
        match event {
            DownloadEvent::Started { id } => {
                if let Err(e) = store.update_download_status(&id, DownloadStatus::Active) {
                    error!("failed to mark {id} active: {e}");
                }
            }
            DownloadEvent::Finished { id, outcome, dest } => {
                let status = match outcome {
                    DownloadOutcome::Complete => {
                        complete += 1;
                        DownloadStatus::Complete
                    }
                    DownloadOutcome::Failed => {
                        failed += 1;
                        DownloadStatus::Failed
                    }
                };
                if let Err(e) = store.update_download_status(&id, status) {
                    error!("failed to mark {id} {status}: {e}");
                }
                if outcome == DownloadOutcome::Complete {
                    if let Err(e) = store.save_recording(&id, &dest) {
                        error!("failed to record file for {id}: {e}");
                    }
                }
            }
        }
    }
    (complete, failed)
}

async fn download_one(
    config: &DownloaderConfig,
    transfer: &dyn Transfer,
    entry: FilmEntry,
    tx: &mpsc::Sender<DownloadEvent>,
) {
    let id = entry.id();
    let (quality, url) = entry.preferred_url(config.quality);
    if quality != config.quality {
        warn!(
            "requested quality {} not available for {}, using {}",
            config.quality,
            truncate(&entry.title),
            quality
        );
    }
    let (dest, playlist) = destination(&config.target_dir, &entry, &url);

    if tx.send(DownloadEvent::Started { id: id.clone() }).await.is_err() {
        return;
    }
    info!("start download ({quality}) {}", truncate(&entry.title));

    let result = match ensure_target_dir(&dest).await {
        Ok(()) => transfer.fetch(&url, &dest, playlist).await,
        Err(e) => Err(e),
    };
    let outcome = match result {
        Ok(()) => DownloadOutcome::Complete,
        Err(e) => {
            error!("download of {} failed: {e}", truncate(&entry.title));
            DownloadOutcome::Failed
        }
    };
    info!(
        "end download ({quality}) {} ({outcome:?})",
        truncate(&entry.title)
    );
    let _ = tx.send(DownloadEvent::Finished { id, outcome, dest }).await;
}

async fn ensure_target_dir(dest: &Path) -> Result<(), DownloadError> {
    let Some(parent) = dest.parent() else {
        return Ok(());
    };
    tokio::fs::create_dir_all(parent)
        .await
        .map_err(|source| DownloadError::Io {
            path: parent.to_path_buf(),
            source,
        })
}

/// Derives the destination path and whether the source is a playlist.
///
/// Playlist sources keep playable media, so their stored extension is
/// normalized to mp4 instead of the playlist extension.
fn destination(target_dir: &Path, entry: &FilmEntry, url: &str) -> (PathBuf, bool) {
    let ext = url.rsplit('.').next().unwrap_or_default().to_lowercase();
    let playlist = ext.starts_with("m3u");
    let ext = if playlist { "mp4".to_string() } else { ext };

    let date = entry.date.map(|d| d.to_string()).unwrap_or_default();
    let name = format!(
        "{}_{}_{}_{}.{}",
        sanitize(&entry.station),
        date,
        sanitize(&entry.topic),
        sanitize(&entry.title),
        ext
    );
    (target_dir.join(name), playlist)
}

/// Replaces characters that would change the path structure.
fn sanitize(component: &str) -> String {
    component
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect()
}

fn truncate(title: &str) -> String {
    title.chars().take(50).collect()
}
