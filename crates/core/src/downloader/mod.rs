//! Download orchestrator.
//!
//! Executes one transfer per selected entry with bounded concurrency and
//! tracks per-item status in the store. Workers report transitions over a
//! channel to a single writer task that owns the store handle, so the
//! Active -> Complete|Failed sequence per entry is monotonic and status
//! writes never contend. There is no automatic retry: failed and leftover
//! rows stay selectable by status for an explicitly triggered later run,
//! and a process killed mid-transfer leaves its row Active until an
//! operator re-adds it.

mod config;
mod runner;
mod transfer;
mod types;

pub use config::DownloaderConfig;
pub use runner::Downloader;
pub use transfer::{transfer_from_config, CommandTransfer, HttpTransfer, Transfer};
pub use types::{DownloadError, DownloadOutcome, DownloadSummary};
