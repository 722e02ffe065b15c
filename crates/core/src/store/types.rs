//! Types for the persistence layer.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::query::QueryError;

/// Lifecycle state of a tracked download.
///
/// Stored as single-character codes for compatibility with the original
/// store layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadStatus {
    /// Selected for a later run.
    Queued,
    /// A worker is transferring it right now.
    Active,
    /// The last attempt failed; stays selectable for another run.
    Failed,
    /// Transferred successfully.
    Complete,
}

impl DownloadStatus {
    /// All states, in lifecycle order.
    pub const ALL: [Self; 4] = [Self::Queued, Self::Active, Self::Failed, Self::Complete];

    /// The single-character code stored in the database.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Queued => "V",
            Self::Active => "A",
            Self::Failed => "F",
            Self::Complete => "K",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "V" => Some(Self::Queued),
            "A" => Some(Self::Active),
            "F" => Some(Self::Failed),
            "K" => Some(Self::Complete),
            _ => None,
        }
    }
}

impl std::fmt::Display for DownloadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Queued => "queued",
            Self::Active => "active",
            Self::Failed => "failed",
            Self::Complete => "complete",
        };
        write!(f, "{name}")
    }
}

impl std::str::FromStr for DownloadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "v" | "queued" => Ok(Self::Queued),
            "a" | "active" => Ok(Self::Active),
            "f" | "failed" => Ok(Self::Failed),
            "k" | "complete" => Ok(Self::Complete),
            _ => Err(format!("invalid download status: {s}")),
        }
    }
}

/// UI-oriented projection of one tracked download joined with its catalog
/// entry.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadListRow {
    pub id: String,
    pub status: DownloadStatus,
    pub status_date: Option<NaiveDate>,
    pub station: String,
    pub topic: String,
    pub title: String,
    pub duration: Option<NaiveTime>,
    pub date: Option<NaiveDate>,
}

/// Provenance row mapping a completed download back to its local file.
#[derive(Debug, Clone, Serialize)]
pub struct Recording {
    pub station: String,
    pub title: String,
    pub description: String,
    pub film_date: Option<NaiveDate>,
    pub file_path: String,
    pub completed_date: Option<NaiveDate>,
}

/// One row of the key/value status table.
#[derive(Debug, Clone, Serialize)]
pub struct StatusEntry {
    pub key: String,
    pub timestamp: DateTime<Utc>,
    pub text: Option<String>,
}

/// Errors for store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Query(#[from] QueryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_round_trip() {
        for status in DownloadStatus::ALL {
            assert_eq!(DownloadStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(DownloadStatus::from_code("X"), None);
    }

    #[test]
    fn test_status_parses_codes_and_names() {
        assert_eq!("V".parse::<DownloadStatus>(), Ok(DownloadStatus::Queued));
        assert_eq!(
            "complete".parse::<DownloadStatus>(),
            Ok(DownloadStatus::Complete)
        );
        assert!("pending".parse::<DownloadStatus>().is_err());
    }
}
