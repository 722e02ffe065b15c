//! Download orchestrator configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::film::Quality;

/// Configuration for the download orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloaderConfig {
    /// Number of parallel transfers. 1 processes the selection strictly
    /// sequentially.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Requested quality. Entries missing the variant fall back to what
    /// they have.
    #[serde(default = "default_quality")]
    pub quality: Quality,

    /// Directory downloaded media is placed in, created on demand.
    #[serde(default = "default_target_dir")]
    pub target_dir: PathBuf,

    /// External command template with `{url}` and `{dest}` placeholders.
    /// Empty means direct in-process HTTP transfer.
    #[serde(default)]
    pub command: String,

    /// Alternate template for playlist (m3u) sources.
    #[serde(default)]
    pub playlist_command: String,
}

fn default_concurrency() -> usize {
    2
}

fn default_quality() -> Quality {
    Quality::Hd
}

fn default_target_dir() -> PathBuf {
    PathBuf::from("downloads")
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            quality: default_quality(),
            target_dir: default_target_dir(),
            command: String::new(),
            playlist_command: String::new(),
        }
    }
}
