//! Catalog refresh: one streaming pass of parse, filter, bulk load.

use std::io::Read;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::filter::FilmFilter;
use crate::store::{SqliteFilmStore, StoreError};

use super::parser::{EntryStream, InheritFields, ParseError, DEFAULT_CHUNK_SIZE};
use super::source::{open_source, SourceError, UpdateSource};

/// Tuning knobs for one refresh pass.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub chunk_size: usize,
    pub inherit: InheritFields,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            inherit: InheritFields::default(),
        }
    }
}

/// What one refresh did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Entries parsed from the stream.
    pub parsed: u64,
    /// Entries that passed the retention filter and were stored.
    pub kept: u64,
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("ingest task failed: {0}")]
    Join(String),
}

/// Runs one full refresh from an already-open text stream.
///
/// Parse errors abort the run before anything is published; the previous
/// catalog stays live. Blocking - run via [`update_catalog`] or
/// `spawn_blocking` from async contexts.
pub fn ingest_catalog<R: Read>(
    store: &SqliteFilmStore,
    reader: R,
    filter: &dyn FilmFilter,
    options: &IngestOptions,
) -> Result<IngestReport, IngestError> {
    let stream = EntryStream::with_options(reader, options.chunk_size, options.inherit);
    let mut ingest = store.begin_ingest()?;
    let mut report = IngestReport::default();

    for entry in stream {
        let entry = entry?;
        report.parsed += 1;
        if filter.is_permitted(&entry) {
            ingest.insert(&entry)?;
            report.kept += 1;
        }
    }

    ingest.commit()?;
    info!(
        parsed = report.parsed,
        kept = report.kept,
        "catalog refresh complete"
    );
    Ok(report)
}

/// Resolves the source, then runs the blocking refresh pass off the
/// async runtime.
pub async fn update_catalog(
    store: Arc<SqliteFilmStore>,
    source: UpdateSource,
    filter: Arc<dyn FilmFilter>,
    options: IngestOptions,
) -> Result<IngestReport, IngestError> {
    let client = reqwest::Client::new();
    let reader = open_source(&source, &client).await?;
    tokio::task::spawn_blocking(move || ingest_catalog(&store, reader, filter.as_ref(), &options))
        .await
        .map_err(|e| IngestError::Join(e.to_string()))?
}
