use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::downloader::DownloaderConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub downloads: DownloaderConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("mediathek.db")
}

/// Catalog refresh configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// Default refresh source: `auto`, `json`, a URL or a local path.
    #[serde(default = "default_source")]
    pub source: String,

    /// Entries older than this many days are not stored.
    #[serde(default = "default_max_age_days")]
    pub max_age_days: i64,

    /// Entries shorter than this are not stored; entries with unknown
    /// duration always are.
    #[serde(default = "default_min_duration")]
    pub min_duration_minutes: u32,

    /// Where the `json` source spec looks for a cached plain snapshot.
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,

    /// Apply carry-forward reconstruction to every positional field
    /// instead of only station and topic.
    #[serde(default)]
    pub inherit_all_fields: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            max_age_days: default_max_age_days(),
            min_duration_minutes: default_min_duration(),
            snapshot_path: default_snapshot_path(),
            inherit_all_fields: false,
        }
    }
}

fn default_source() -> String {
    "auto".to_string()
}

fn default_max_age_days() -> i64 {
    30
}

fn default_min_duration() -> u32 {
    5
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("filmliste.json")
}
