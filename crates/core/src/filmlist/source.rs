//! Catalog source resolution: URL or file, XZ-compressed or plain.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use futures::StreamExt;
use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::info;
use xz2::read::XzDecoder;

/// The well-known location of the published catalog.
pub const DEFAULT_CATALOG_URL: &str = "https://liste.mediathekview.de/Filmliste-akt.xz";

/// Where a catalog refresh reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateSource {
    /// The well-known published URL.
    Auto,
    /// A previously cached plain-text snapshot.
    Snapshot(PathBuf),
    Url(String),
    File(PathBuf),
}

impl UpdateSource {
    /// Resolves a CLI/config spec: `auto`, `json`, a URL, or a local path.
    pub fn from_spec(spec: &str, snapshot_path: &Path) -> Self {
        match spec {
            "auto" => Self::Auto,
            "json" => Self::Snapshot(snapshot_path.to_path_buf()),
            s if s.starts_with("http://") || s.starts_with("https://") => Self::Url(s.to_string()),
            s => Self::File(PathBuf::from(s)),
        }
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("fetching {url} failed: {reason}")]
    Http { url: String, reason: String },

    #[error("opening {path} failed: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("spooling catalog stream to disk failed: {0}")]
    Spool(#[source] io::Error),
}

/// A decompressed text stream over the resolved source.
///
/// Remote sources are spooled to a temp file first; the handle keeps the
/// spool alive for as long as the reader is.
pub struct SourceReader {
    inner: Box<dyn Read + Send>,
    _spool: Option<NamedTempFile>,
}

impl Read for SourceReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

/// Opens the source and returns a decompressed text stream.
pub async fn open_source(
    source: &UpdateSource,
    client: &reqwest::Client,
) -> Result<SourceReader, SourceError> {
    match source {
        UpdateSource::Auto => fetch_url(client, DEFAULT_CATALOG_URL).await,
        UpdateSource::Url(url) => fetch_url(client, url).await,
        UpdateSource::Snapshot(path) | UpdateSource::File(path) => open_file(path),
    }
}

fn open_file(path: &Path) -> Result<SourceReader, SourceError> {
    let file = File::open(path).map_err(|source| SourceError::File {
        path: path.to_path_buf(),
        source,
    })?;
    let inner: Box<dyn Read + Send> = if is_xz(path.to_string_lossy().as_ref()) {
        Box::new(XzDecoder::new(file))
    } else {
        Box::new(file)
    };
    Ok(SourceReader {
        inner,
        _spool: None,
    })
}

async fn fetch_url(client: &reqwest::Client, url: &str) -> Result<SourceReader, SourceError> {
    info!("fetching catalog from {url}");
    let response = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| SourceError::Http {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let spool = NamedTempFile::new().map_err(SourceError::Spool)?;
    let handle = spool.reopen().map_err(SourceError::Spool)?;
    let mut writer = BufWriter::new(tokio::fs::File::from_std(handle));
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| SourceError::Http {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        writer.write_all(&chunk).await.map_err(SourceError::Spool)?;
    }
    writer.flush().await.map_err(SourceError::Spool)?;

    let file = spool.reopen().map_err(SourceError::Spool)?;
    let inner: Box<dyn Read + Send> = if is_xz(url) {
        Box::new(XzDecoder::new(file))
    } else {
        Box::new(file)
    };
    Ok(SourceReader {
        inner,
        _spool: Some(spool),
    })
}

fn is_xz(location: &str) -> bool {
    location.ends_with(".xz")
}
