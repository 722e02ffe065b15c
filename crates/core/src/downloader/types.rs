//! Types for the download orchestrator.

use std::path::PathBuf;

use thiserror::Error;

/// Terminal result of one transfer attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    Complete,
    Failed,
}

/// Counts for one orchestrator run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    pub total: usize,
    pub complete: usize,
    pub failed: usize,
}

/// Errors for a single transfer. Always isolated to one entry; the
/// orchestrator records a Failed status and moves on.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("request for {url} failed: {reason}")]
    Http { url: String, reason: String },

    #[error("writing {path} failed: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("download command exited with status {status}: {command}")]
    CommandFailed { command: String, status: i32 },

    #[error("spawning download command {command:?} failed: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("download command template is empty")]
    EmptyTemplate,
}

/// Status transitions flowing from workers to the single store writer.
#[derive(Debug)]
pub(crate) enum DownloadEvent {
    Started {
        id: String,
    },
    Finished {
        id: String,
        outcome: DownloadOutcome,
        dest: PathBuf,
    },
}
