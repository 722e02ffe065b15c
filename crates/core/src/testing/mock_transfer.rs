//! Mock transfer for testing the download orchestrator.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::downloader::{DownloadError, Transfer};

/// A recorded transfer request for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedTransfer {
    pub url: String,
    pub dest: PathBuf,
    pub playlist: bool,
}

/// Mock implementation of the [`Transfer`] seam.
///
/// Records every request and fails those whose URL was registered via
/// [`fail_url`](Self::fail_url); everything else succeeds without touching
/// the filesystem.
#[derive(Debug, Default)]
pub struct MockTransfer {
    transfers: Mutex<Vec<RecordedTransfer>>,
    failing: Mutex<HashSet<String>>,
}

impl MockTransfer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make any request for `url` fail.
    pub fn fail_url(&self, url: &str) {
        self.failing.lock().unwrap().insert(url.to_string());
    }

    /// All requests seen so far, in call order.
    pub fn recorded(&self) -> Vec<RecordedTransfer> {
        self.transfers.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transfer for MockTransfer {
    async fn fetch(&self, url: &str, dest: &Path, playlist: bool) -> Result<(), DownloadError> {
        self.transfers.lock().unwrap().push(RecordedTransfer {
            url: url.to_string(),
            dest: dest.to_path_buf(),
            playlist,
        });
        if self.failing.lock().unwrap().contains(url) {
            return Err(DownloadError::Http {
                url: url.to_string(),
                reason: "mock failure".to_string(),
            });
        }
        Ok(())
    }
}
